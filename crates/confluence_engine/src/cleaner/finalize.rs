//! Last-mile cleanup: empty wrappers, whitespace, and the `<head>` essentials.
use super::{CleanContext, Pass, PassError};
use crate::dom::{Document, Element, NodeId};

const PRUNABLE_WHEN_EMPTY: &[&str] = &["p", "div", "span", "strong", "em", "i", "b"];
const INLINE_FORMATTING: &[&str] = &["strong", "em", "i", "b", "span", "a", "code"];
/// Text under these keeps its whitespace.
const VERBATIM_CONTEXTS: &[&str] = &["pre", "code", "textarea", "script", "style"];

pub(crate) struct EmptyElementPruning;

impl Pass for EmptyElementPruning {
    fn name(&self) -> &'static str {
        "empty-element-pruning"
    }

    fn run(&self, ctx: &mut CleanContext<'_>) -> Result<(), PassError> {
        let doc = &mut *ctx.document;
        // Document order visits parents first; a parent holding only empty
        // children has no text itself and goes with them.
        for node in doc.find_all(|el| el.is_any(PRUNABLE_WHEN_EMPTY)) {
            if doc.is_attached(node) && is_empty(doc, node) {
                doc.remove(node);
            }
        }
        Ok(())
    }
}

fn is_empty(doc: &Document, node: NodeId) -> bool {
    doc.text_content(node).trim().is_empty()
        && doc
            .find_first_within(node, |el| el.is_any(&["img", "br"]))
            .is_none()
}

pub(crate) struct WhitespaceNormalization;

impl Pass for WhitespaceNormalization {
    fn name(&self) -> &'static str {
        "whitespace-normalization"
    }

    fn run(&self, ctx: &mut CleanContext<'_>) -> Result<(), PassError> {
        let doc = &mut *ctx.document;
        let root = doc.root();
        for node in doc.text_nodes_within(root) {
            if doc.has_ancestor(node, |el| el.is_any(VERBATIM_CONTEXTS)) {
                continue;
            }
            let Some(text) = doc.text(node) else {
                continue;
            };
            let mut cleaned = collapse_whitespace(text);
            if !touches_inline(doc, node) {
                cleaned = cleaned.trim().to_string();
            }
            if cleaned.is_empty() {
                doc.remove(node);
            } else if cleaned != text {
                doc.set_text(node, cleaned);
            }
        }
        Ok(())
    }
}

fn is_inline(doc: &Document, node: Option<NodeId>) -> bool {
    node.and_then(|id| doc.element(id))
        .is_some_and(|el| el.is_any(INLINE_FORMATTING))
}

/// Inside, or directly next to, an inline formatting element.
fn touches_inline(doc: &Document, node: NodeId) -> bool {
    is_inline(doc, doc.parent(node))
        || is_inline(doc, doc.prev_sibling(node))
        || is_inline(doc, doc.next_sibling(node))
}

pub(crate) fn collapse_whitespace(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut in_whitespace = false;
    for c in text.chars() {
        if c.is_whitespace() {
            if !in_whitespace {
                out.push(' ');
            }
            in_whitespace = true;
        } else {
            out.push(c);
            in_whitespace = false;
        }
    }
    out
}

pub(crate) struct TitleBackfill;

impl Pass for TitleBackfill {
    fn name(&self) -> &'static str {
        "title-backfill"
    }

    fn run(&self, ctx: &mut CleanContext<'_>) -> Result<(), PassError> {
        let doc = &mut *ctx.document;
        if doc.find_first(|el| el.is("title")).is_some() {
            return Ok(());
        }
        let head = doc.ensure_head();
        let title = doc.create_element(Element::new("title"));
        let text = doc.create_text(ctx.title);
        doc.append_child(title, text);
        doc.append_child(head, title);
        Ok(())
    }
}

pub(crate) struct CharsetMeta;

impl Pass for CharsetMeta {
    fn name(&self) -> &'static str {
        "charset-meta"
    }

    fn run(&self, ctx: &mut CleanContext<'_>) -> Result<(), PassError> {
        let doc = &mut *ctx.document;
        let head = doc.ensure_head();
        let meta = match doc.find_first_within(head, |el| el.is("meta") && el.has_attr("charset")) {
            Some(existing) => {
                doc.update_element(existing, |el| el.set_attr("charset", "UTF-8"));
                existing
            }
            None => doc.create_element(Element::new("meta").with_attr("charset", "UTF-8")),
        };
        if doc.children(head).first() != Some(&meta) {
            doc.prepend_child(head, meta);
        }
        Ok(())
    }
}
