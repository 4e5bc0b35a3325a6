use super::{CleanContext, Pass, PassError};
use crate::dom::{Document, Element, NodeId};

pub const FONT_STYLESHEET: &str = "https://fonts.googleapis.com/css2?family=DM+Sans:wght@400;700&family=Roboto:wght@400;700&display=swap";

pub const CUSTOM_CSS: &str = r#"
body { font-family: 'DM Sans', sans-serif; color: #404040; line-height: 1.5; margin: 20px; }
h1 { font-family: 'Roboto', sans-serif; color: #00c65e; }
h2, h3, h4, h5, h6 { font-family: 'Roboto', sans-serif; color: #046062; }
p { margin-bottom: 1.5em; }
strong { font-weight: bold; }
em { color: #00c65e; font-style: italic; }
a { color: #00c65e; text-decoration: none; }
a:hover { text-decoration: underline; }
ul { margin-bottom: 1.5em; }
li { margin-left: 20px; list-style-type: disc; }
img { border: 1px solid #00c65e; }

table { width: 100%; border-collapse: collapse; margin-bottom: 1.5em; }
th, td { padding: 12px; text-align: left; border-bottom: 1px solid #ddd; vertical-align: top; }
th { background-color: #f2f2f2; font-weight: bold; }
tr:nth-child(even) { background-color: #fafafa; }
tr:hover { background-color: #f5f5f5; }

.column-25 { width: 25%; }
.column-33 { width: 33.333%; }
.column-50 { width: 50%; }
.column-67 { width: 66.666%; }
.column-75 { width: 75%; }
.column-100 { width: 100%; }

.status-gray, .status-green, .status-red, .status-yellow,
.status-blue, .status-purple, .status-teal { color: #FFFFFF; padding: 2px 6px; border-radius: 3px; }
.status-gray { background-color: #7A869A; }
.status-green { background-color: #36B37E; }
.status-red { background-color: #FF5630; }
.status-yellow { background-color: #FFAB00; color: #000000; }
.status-blue { background-color: #0065FF; }
.status-purple { background-color: #6554C0; }
.status-teal { background-color: #00B8D9; }

.expand-box { border: 1px solid #ccc; padding: 10px; margin-bottom: 1.5em; background-color: #f9f9f9; }
.expand-box em { display: block; font-style: italic; margin-bottom: 0.5em; }

.decision-box { border: 1px solid #00c65e; padding: 10px; margin-bottom: 1.5em; background-color: #e6f9ee; }
.decision-box em { display: block; font-style: italic; color: #00c65e; margin-bottom: 0.5em; }
"#;

pub(crate) struct StyleInjection;

impl Pass for StyleInjection {
    fn name(&self) -> &'static str {
        "style-injection"
    }

    fn run(&self, ctx: &mut CleanContext<'_>) -> Result<(), PassError> {
        let doc = &mut *ctx.document;
        let head = doc.ensure_head();

        for style in doc.find_all(|el| el.is("style")) {
            if doc.parent(style) != Some(head) || is_injected_css(doc, style) {
                doc.remove(style);
            }
        }
        for link in doc.find_all(|el| el.is("link") && el.attr("href") == Some(FONT_STYLESHEET)) {
            doc.remove(link);
        }

        let fonts = doc.create_element(
            Element::new("link")
                .with_attr("rel", "stylesheet")
                .with_attr("href", FONT_STYLESHEET),
        );
        doc.append_child(head, fonts);

        let style = doc.create_element(Element::new("style"));
        let css = doc.create_text(CUSTOM_CSS);
        doc.append_child(style, css);
        doc.append_child(head, style);
        Ok(())
    }
}

fn is_injected_css(doc: &Document, style: NodeId) -> bool {
    doc.text_content(style).trim() == CUSTOM_CSS.trim()
}
