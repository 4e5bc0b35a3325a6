use confluence_engine::{CleanerSettings, Document, HtmlCleaner, CUSTOM_CSS};
use pretty_assertions::assert_eq;
use tempfile::TempDir;
use url::Url;

const EXPORT_PAGE: &str = r#"<!DOCTYPE html>
<html>
<head>
  <title>Engineering : Release checklist</title>
  <link rel="stylesheet" href="styles/site.css" type="text/css">
  <meta name="confluence-request-time" content="1">
  <script>var AJS = {};</script>
</head>
<body class="theme-default aui-theme-default">
  <div id="page">
    <div id="main" class="aui-page-panel">
      <div id="breadcrumb-section">
        <ol id="breadcrumbs">
          <li class="first"><span><a href="index.html">Engineering</a></span></li>
          <li><span><a href="Releases_1.html">Releases</a></span></li>
        </ol>
      </div>
      <div class="page-metadata">
        Created by <span class="author">John Doe</span> on 2023-12-28
      </div>
      <div id="main-content" class="wiki-content group">
        <h2 id="Release-Summary" class="confluenceHeading"><strong>Release</strong>   summary</h2>
        <p>Status: <span class="status-macro aui-lozenge aui-lozenge-success">DONE</span></p>
        <p><img class="emoticon emoticon-tick" data-emoji-fallback="✅" src="images/icons/emoticons/check.svg"></p>
        <div class="confluence-information-macro confluence-information-macro-note">
          <div class="confluence-information-macro-body"><p>Read   this   first.</p></div>
        </div>
        <div class="toc-macro client-side-toc-macro"><ul><li>Release summary</li></ul></div>
        <div class="columnLayout two-right-sidebar" data-layout="two-right-sidebar">
          <div class="cell aside"><div class="innerCell"><p>Side</p></div></div>
          <div class="cell normal"><div class="innerCell"><p>Main</p></div></div>
        </div>
        <div class="table-wrap">
          <table class="confluenceTable" border="1" cellpadding="2">
            <tbody><tr><th class="confluenceTh" style="x">H</th><td class="confluenceTd highlight-blue" data-highlight-colour="blue" colspan="2">V</td></tr></tbody>
          </table>
        </div>
        <ul><li class="first" data-x="1" value="3">Item</li></ul>
        <p><a href="https://wiki.example.com/confluence/display/~people/jdoe" class="confluence-userlink">John Doe</a></p>
        <p><a href="javascript:alert(1)" onclick="evil()">click</a></p>
        <div>   </div>
        <div><img src="attachments/12/shot.png?version=1&amp;api=v2"></div>
        <!-- rendered by confluence -->
      </div>
    </div>
    <div id="footer" role="contentinfo"><section class="footer-body"><p>Document generated by Confluence on Jan 01, 2024</p></section></div>
  </div>
</body>
</html>"#;

fn cleaner() -> HtmlCleaner {
    HtmlCleaner::new(CleanerSettings {
        base_url: Some(Url::parse("https://wiki.example.com/export/").unwrap()),
        ..CleanerSettings::default()
    })
}

fn clean(html: &str) -> String {
    let target = TempDir::new().unwrap();
    cleaner().clean_html(html, target.path()).unwrap()
}

fn body_text(html: &str) -> String {
    let doc = Document::parse(html);
    let body = doc.body().unwrap();
    doc.text_content(body)
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

#[test]
fn cleaning_twice_changes_nothing() {
    let once = clean(EXPORT_PAGE);
    let twice = clean(&once);
    assert_eq!(once, twice);
}

#[test]
fn raw_text_elements_are_not_escaped_again_on_each_run() {
    let html = r#"<p>lead</p><noscript><img src="https://a.test/p.gif"></noscript><iframe src="https://v.test">fallback &amp; more</iframe>"#;
    let once = clean(html);
    let twice = clean(&once);
    let thrice = clean(&twice);
    assert_eq!(once, twice);
    assert_eq!(twice, thrice);
    assert!(
        once.contains(r#"<noscript><img src="https://a.test/p.gif"></noscript>"#),
        "{once}"
    );
    assert!(once.contains("fallback &amp; more</iframe>"), "{once}");
    assert!(!once.contains("&amp;amp;"));
    assert!(!once.contains("&lt;img"));
}

#[test]
fn output_is_doctype_prefixed_with_charset_first_in_head() {
    let cleaned = clean(EXPORT_PAGE);
    assert!(cleaned.starts_with("<!DOCTYPE html>\n<html>"));

    let doc = Document::parse(&cleaned);
    let head = doc.head().unwrap();
    let first = doc.child_elements(head, |_| true)[0];
    let meta = doc.element(first).unwrap();
    assert!(meta.is("meta"));
    assert_eq!(meta.attr("charset"), Some("UTF-8"));
    assert!(cleaned.contains(CUSTOM_CSS.trim()));
}

#[test]
fn page_chrome_and_vendor_assets_are_removed() {
    let cleaned = clean(EXPORT_PAGE);
    for gone in [
        "breadcrumb-section",
        "styles/site.css",
        "confluence-request-time",
        "<script",
        "Document generated by Confluence",
        "<!--",
        "toc-macro",
        "javascript:",
        "onclick",
        "data-",
        "main-content",
        "wiki-content",
        "aui-page-panel",
    ] {
        assert!(!cleaned.contains(gone), "`{gone}` survived:\n{cleaned}");
    }
}

#[test]
fn vendor_only_classes_leave_no_class_attribute() {
    let cleaned = clean(EXPORT_PAGE);
    let doc = Document::parse(&cleaned);
    let item = doc.find_first(|el| el.is("li")).unwrap();
    let item = doc.element(item).unwrap();
    assert_eq!(item.attr_names(), vec!["value".to_string()]);

    let body = doc.element(doc.body().unwrap()).unwrap();
    assert!(!body.has_attr("class"));
}

#[test]
fn status_badge_becomes_colored_strong() {
    let cleaned = clean(EXPORT_PAGE);
    assert!(cleaned.contains("<p>Status: <strong class=\"status-green\">DONE</strong></p>"));
}

#[test]
fn emoji_is_replaced_by_its_fallback() {
    let cleaned = clean(EXPORT_PAGE);
    assert!(cleaned.contains("<p>✅</p>"), "{cleaned}");
    assert!(!cleaned.contains("emoticon"));
}

#[test]
fn column_layout_becomes_a_single_row_table() {
    let cleaned = clean(EXPORT_PAGE);
    let doc = Document::parse(&cleaned);
    let cells: Vec<String> = doc
        .find_all(|el| el.is("td") && el.classes().iter().any(|c| c.starts_with("column-")))
        .into_iter()
        .map(|td| doc.element(td).unwrap().classes().join(" "))
        .collect();
    assert_eq!(cells, vec!["column-33", "column-67"]);
    assert!(body_text(&cleaned).contains("Side Main"));
}

fn layout_cells(html: &str) -> Vec<(String, String)> {
    let cleaned = clean(html);
    let doc = Document::parse(&cleaned);
    doc.find_all(|el| el.is("td"))
        .into_iter()
        .map(|td| {
            let class = doc.element(td).unwrap().classes().join(" ");
            (class, doc.text_content(td).trim().to_string())
        })
        .collect()
}

fn share(class: &str) -> f64 {
    match class {
        "column-25" => 25.0,
        "column-33" => 100.0 / 3.0,
        "column-50" => 50.0,
        "column-67" => 200.0 / 3.0,
        "column-75" => 75.0,
        "column-100" => 100.0,
        other => panic!("unexpected width class {other}"),
    }
}

#[test]
fn every_layout_variant_becomes_one_cell_per_column() {
    let cases: &[(&str, &[&str])] = &[
        ("two-equal", &["column-50", "column-50"]),
        ("two-right-sidebar", &["column-33", "column-67"]),
        ("two-left-sidebar", &["column-67", "column-33"]),
        ("three-equal", &["column-33", "column-33", "column-33"]),
        ("three-with-sidebars", &["column-25", "column-50", "column-25"]),
    ];
    for (variant, expected) in cases {
        let cells: String = (0..expected.len())
            .map(|i| {
                format!(
                    r#"<div class="cell normal"><div class="innerCell"><p>{variant} {i}</p></div></div>"#
                )
            })
            .collect();
        let html = format!(
            r#"<div class="columnLayout {variant}" data-layout="{variant}">{cells}</div>"#
        );
        let found = layout_cells(&html);

        let classes: Vec<&str> = found.iter().map(|(class, _)| class.as_str()).collect();
        assert_eq!(classes, expected.to_vec(), "{variant}");
        let texts: Vec<String> = found.iter().map(|(_, text)| text.clone()).collect();
        let wanted: Vec<String> = (0..expected.len()).map(|i| format!("{variant} {i}")).collect();
        assert_eq!(texts, wanted, "{variant}");
        let total: f64 = classes.iter().map(|class| share(class)).sum();
        assert!((total - 100.0).abs() < 1e-9, "{variant} sums to {total}");
    }
}

#[test]
fn unknown_layout_gives_every_column_full_width() {
    let found = layout_cells(
        r#"<div class="columnLayout" data-layout="mystery-layout">
             <div class="cell"><div class="innerCell"><p>One</p></div></div>
             <div class="cell"><div class="innerCell"><p>Two</p></div></div>
           </div>"#,
    );
    assert_eq!(
        found,
        vec![
            ("column-100".to_string(), "One".to_string()),
            ("column-100".to_string(), "Two".to_string()),
        ]
    );
}

#[test]
fn columns_without_inner_wrapper_use_their_own_content() {
    let found = layout_cells(
        r#"<div class="columnLayout two-equal" data-layout="two-equal">
             <div class="cell"><p>Left</p></div>
             <div class="cell"><p>Right</p></div>
           </div>"#,
    );
    assert_eq!(
        found,
        vec![
            ("column-50".to_string(), "Left".to_string()),
            ("column-50".to_string(), "Right".to_string()),
        ]
    );
}

#[test]
fn layout_with_more_columns_than_widths_is_left_alone() {
    let html = r#"<div class="columnLayout two-equal" data-layout="two-equal">
             <div class="cell"><div class="innerCell"><p>A</p></div></div>
             <div class="cell"><div class="innerCell"><p>B</p></div></div>
             <div class="cell"><div class="innerCell"><p>C</p></div></div>
           </div>"#;
    assert!(layout_cells(html).is_empty());
    assert!(body_text(&clean(html)).contains("A B C"));
}

#[test]
fn tables_are_unwrapped_and_normalized() {
    let cleaned = clean(EXPORT_PAGE);
    assert!(!cleaned.contains("table-wrap"));
    let doc = Document::parse(&cleaned);
    let data_table = doc
        .find_all(|el| el.is("table"))
        .into_iter()
        .find(|table| doc.find_first_within(*table, |el| el.is("th")).is_some())
        .unwrap();
    let table = doc.element(data_table).unwrap();
    assert_eq!(table.classes(), ["custom-table".to_string()]);
    assert!(!table.has_attr("border"));
    assert!(!table.has_attr("cellpadding"));

    let th = doc.find_first_within(data_table, |el| el.is("th")).unwrap();
    assert!(doc.element(th).unwrap().attr_names().is_empty());
    let td = doc.find_first_within(data_table, |el| el.is("td")).unwrap();
    let td = doc.element(td).unwrap();
    assert_eq!(td.attr("colspan"), Some("2"));
    assert_eq!(td.classes(), ["highlight-blue".to_string()]);
}

#[test]
fn headings_keep_only_collapsed_text() {
    let cleaned = clean(EXPORT_PAGE);
    assert!(cleaned.contains("<h2>Release summary</h2>"), "{cleaned}");
}

#[test]
fn metadata_line_is_localized() {
    let cleaned = clean(EXPORT_PAGE);
    assert!(body_text(&cleaned).contains("Criado por John Doe em 2023-12-28"));
}

#[test]
fn information_macro_is_unwrapped_and_whitespace_collapsed() {
    let cleaned = clean(EXPORT_PAGE);
    assert!(!cleaned.contains("confluence-information-macro"));
    assert!(cleaned.contains("<p>Read this first.</p>"));
}

#[test]
fn profile_links_collapse_to_text() {
    let cleaned = clean(EXPORT_PAGE);
    assert!(!cleaned.contains("confluence-userlink"));
    assert!(cleaned.contains("<p>John Doe</p>"));
    assert!(cleaned.contains("<p><a>click</a></p>"));
}

#[test]
fn relative_images_resolve_against_base_and_drop_query() {
    let cleaned = clean(EXPORT_PAGE);
    assert!(
        cleaned.contains("<img src=\"https://wiki.example.com/export/attachments/12/shot.png\" alt=\"\">"),
        "{cleaned}"
    );
}

#[test]
fn relative_images_without_base_resolve_under_input_dir() {
    let target = TempDir::new().unwrap();
    let cleaned = HtmlCleaner::new(CleanerSettings::default())
        .clean_html("<p><img src=\"images/a.png?x=1\"></p>", target.path())
        .unwrap();
    let expected = std::env::current_dir()
        .unwrap()
        .join("input")
        .join("images/a.png");
    assert!(
        cleaned.contains(&format!("src=\"{}\"", expected.display())),
        "{cleaned}"
    );
}

#[test]
fn empty_wrappers_go_but_image_holders_stay() {
    let target = TempDir::new().unwrap();
    let cleaned = HtmlCleaner::new(CleanerSettings::default())
        .clean_html(
            "<div>   </div><div><span> </span></div><div><img src=\"https://x.test/a.png\"></div><p><br></p>",
            target.path(),
        )
        .unwrap();
    let doc = Document::parse(&cleaned);
    assert_eq!(doc.find_all(|el| el.is("div")).len(), 1);
    assert_eq!(doc.find_all(|el| el.is("span")).len(), 0);
    assert_eq!(doc.find_all(|el| el.is("p")).len(), 1);
}

#[test]
fn expand_and_decision_macros_are_flattened() {
    let target = TempDir::new().unwrap();
    let html = r#"<div class="expand-container">
        <div class="expand-control"><span class="expand-control-icon"></span><span class="expand-control-text">More details</span></div>
        <div class="expand-content expand-hidden"><p>Hidden body</p></div>
      </div>
      <ul class="decision-list"><li data-decision-state="DECIDED">Ship it</li><li>Then rest</li></ul>"#;
    let mut doc = Document::parse(html);
    cleaner().clean(&mut doc, target.path()).unwrap();

    let expand = doc.find_first(|el| el.has_class("expand-box")).unwrap();
    assert_eq!(
        doc.outer_html(expand),
        "<div class=\"expand-box\"><em>More details</em><p>Hidden body</p></div>"
    );
    let decision = doc.find_first(|el| el.has_class("decision-box")).unwrap();
    let first = doc.child_elements(decision, |_| true)[0];
    assert_eq!(doc.outer_html(first), "<em>DECISÃO</em>");
    let text = doc.text_content(decision);
    assert!(text.contains("Ship it") && text.contains("Then rest"), "{text}");
    assert!(doc.find_first(|el| el.is("li")).is_none());
}

#[test]
fn missing_title_is_backfilled() {
    let target = TempDir::new().unwrap();
    let cleaned = cleaner().clean_html("<p>No head here</p>", target.path()).unwrap();
    assert!(cleaned.contains("<title>Untitled Document</title>"));
}
