use ego_tree::NodeRef;

use super::{Document, Node, NodeId};

const INDENT: &str = "  ";

const VOID_ELEMENTS: &[&str] = &[
    "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "param", "source",
    "track", "wbr",
];

/// Elements whose content the parser keeps as one unescaped text node.
const RAW_TEXT_ELEMENTS: &[&str] = &[
    "script", "style", "noscript", "iframe", "xmp", "noembed", "noframes", "plaintext",
];

const PREFORMATTED_ELEMENTS: &[&str] = &["pre", "textarea"];

const INLINE_ELEMENTS: &[&str] = &[
    "a", "abbr", "b", "bdi", "bdo", "br", "cite", "code", "data", "del", "dfn", "em", "i", "img",
    "ins", "kbd", "label", "mark", "q", "s", "samp", "small", "span", "strong", "sub", "sup",
    "time", "u", "var",
];

impl Document {
    /// Serializes the whole document as indented HTML with a leading doctype.
    ///
    /// Block elements get their own lines; runs of inline content stay on one
    /// line so that re-parsing the output yields the same text.
    pub fn to_pretty_html(&self) -> String {
        let mut out = String::from("<!DOCTYPE html>\n");
        for child in self.tree.root().children() {
            if matches!(child.value(), Node::Doctype(_)) {
                continue;
            }
            write_block(child, 0, &mut out);
        }
        out
    }

    /// Compact serialization of a single node and its subtree.
    pub fn outer_html(&self, id: NodeId) -> String {
        let mut out = String::new();
        if let Some(node) = self.tree.get(id) {
            write_inline(node, &mut out);
        }
        out
    }
}

fn is_inline(node: NodeRef<'_, Node>) -> bool {
    match node.value() {
        Node::Text(_) | Node::Comment(_) => true,
        Node::Element(element) => {
            element.is_any(INLINE_ELEMENTS) && node.children().all(is_inline)
        }
        Node::Document | Node::Doctype(_) => false,
    }
}

fn write_block(node: NodeRef<'_, Node>, depth: usize, out: &mut String) {
    match node.value() {
        Node::Text(text) => {
            let text = text.trim();
            if !text.is_empty() {
                indent(depth, out);
                escape_text(text, out);
                out.push('\n');
            }
        }
        Node::Comment(comment) => {
            indent(depth, out);
            write_comment(comment, out);
            out.push('\n');
        }
        Node::Element(element) => {
            indent(depth, out);
            write_open_tag(element, out);
            if element.is_any(VOID_ELEMENTS) {
                out.push('\n');
                return;
            }
            if element.is_any(RAW_TEXT_ELEMENTS) {
                write_raw_children(node, out);
            } else if element.is_any(PREFORMATTED_ELEMENTS) {
                write_preformatted_children(node, out);
            } else if node.children().all(is_inline) {
                write_children_inline(node, out);
            } else {
                out.push('\n');
                write_mixed_children(node, depth + 1, out);
                indent(depth, out);
            }
            write_close_tag(element.name(), out);
            out.push('\n');
        }
        Node::Document | Node::Doctype(_) => {}
    }
}

/// Block children each get a line; consecutive inline children share one.
fn write_mixed_children(node: NodeRef<'_, Node>, depth: usize, out: &mut String) {
    let mut run = String::new();
    for child in node.children() {
        if is_inline(child) {
            write_inline(child, &mut run);
            continue;
        }
        flush_run(&mut run, depth, out);
        write_block(child, depth, out);
    }
    flush_run(&mut run, depth, out);
}

fn flush_run(run: &mut String, depth: usize, out: &mut String) {
    let trimmed = run.trim();
    if !trimmed.is_empty() {
        indent(depth, out);
        out.push_str(trimmed);
        out.push('\n');
    }
    run.clear();
}

fn write_inline(node: NodeRef<'_, Node>, out: &mut String) {
    match node.value() {
        Node::Text(text) => escape_text(text, out),
        Node::Comment(comment) => write_comment(comment, out),
        Node::Element(element) => {
            write_open_tag(element, out);
            if element.is_any(VOID_ELEMENTS) {
                return;
            }
            if element.is_any(RAW_TEXT_ELEMENTS) {
                write_raw_children(node, out);
            } else if element.is_any(PREFORMATTED_ELEMENTS) {
                write_preformatted_children(node, out);
            } else {
                write_children_inline(node, out);
            }
            write_close_tag(element.name(), out);
        }
        Node::Document => write_children_inline(node, out),
        Node::Doctype(_) => {}
    }
}

fn write_children_inline(node: NodeRef<'_, Node>, out: &mut String) {
    for child in node.children() {
        write_inline(child, out);
    }
}

fn write_raw_children(node: NodeRef<'_, Node>, out: &mut String) {
    for child in node.children() {
        if let Node::Text(text) = child.value() {
            out.push_str(text);
        }
    }
}

fn write_preformatted_children(node: NodeRef<'_, Node>, out: &mut String) {
    // The parser drops one newline right after the opening tag.
    let starts_with_newline = node
        .first_child()
        .and_then(|child| child.value().as_text())
        .is_some_and(|text| text.starts_with('\n'));
    if starts_with_newline {
        out.push('\n');
    }
    write_children_inline(node, out);
}

fn write_open_tag(element: &super::Element, out: &mut String) {
    out.push('<');
    out.push_str(element.name());
    for (name, value) in element.attrs() {
        out.push(' ');
        out.push_str(name);
        out.push_str("=\"");
        escape_attr(&value.to_attr_string(), out);
        out.push('"');
    }
    out.push('>');
}

fn write_close_tag(name: &str, out: &mut String) {
    out.push_str("</");
    out.push_str(name);
    out.push('>');
}

fn write_comment(comment: &str, out: &mut String) {
    out.push_str("<!--");
    out.push_str(comment);
    out.push_str("-->");
}

fn indent(depth: usize, out: &mut String) {
    for _ in 0..depth {
        out.push_str(INDENT);
    }
}

fn escape_text(text: &str, out: &mut String) {
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '\u{a0}' => out.push_str("&nbsp;"),
            _ => out.push(c),
        }
    }
}

fn escape_attr(value: &str, out: &mut String) {
    for c in value.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '"' => out.push_str("&quot;"),
            '\u{a0}' => out.push_str("&nbsp;"),
            _ => out.push(c),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn pretty_output_starts_with_doctype_and_indents_blocks() {
        let doc = Document::parse("<html><head><title>T</title></head><body><div><p>a <b>b</b></p></div></body></html>");
        let html = doc.to_pretty_html();
        assert_eq!(
            html,
            "<!DOCTYPE html>\n<html>\n  <head>\n    <title>T</title>\n  </head>\n  <body>\n    <div>\n      <p>a <b>b</b></p>\n    </div>\n  </body>\n</html>\n"
        );
    }

    #[test]
    fn text_and_attributes_are_escaped() {
        let doc = Document::parse(r#"<p title="a &quot;b&quot; &amp; c">1 &lt; 2 &amp;&amp; 3 &gt; 2</p>"#);
        let p = doc.find_first(|element| element.is("p")).expect("p");
        assert_eq!(
            doc.outer_html(p),
            r#"<p title="a &quot;b&quot; &amp; c">1 &lt; 2 &amp;&amp; 3 &gt; 2</p>"#
        );
    }

    #[test]
    fn void_elements_have_no_close_tag() {
        let doc = Document::parse(r#"<p>x<br><img src="a.png"></p>"#);
        let p = doc.find_first(|element| element.is("p")).expect("p");
        assert_eq!(doc.outer_html(p), r#"<p>x<br><img src="a.png"></p>"#);
    }

    #[test]
    fn preformatted_text_is_kept_verbatim() {
        let doc = Document::parse("<div><pre>  a\n    b</pre><p>x</p></div>");
        let html = doc.to_pretty_html();
        assert!(html.contains("<pre>  a\n    b</pre>"), "{html}");
    }

    #[test]
    fn pretty_output_reparses_to_same_output() {
        let source = "<body><div>lead <em>x</em><table><tr><td>1</td></tr></table>tail</div></body>";
        let first = Document::parse(source).to_pretty_html();
        let second = Document::parse(&first).to_pretty_html();
        assert_eq!(first, second);
    }
}
