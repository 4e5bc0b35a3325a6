use super::vendor::{is_vendor_attr, is_vendor_class, is_vendor_id};
use super::{CleanContext, Pass, PassError};
use crate::dom::Element;

const TABLE_PRESENTATION_ATTRS: &[&str] = &["border", "cellspacing", "cellpadding", "style"];
const CELL_ATTRS: &[&str] = &["colspan", "rowspan", "class"];
const LIST_ITEM_ATTRS: &[&str] = &["class", "value"];
pub(crate) const TABLE_CLASS: &str = "custom-table";

fn strip_vendor_classes(el: &mut Element) {
    el.retain_classes(|class| !is_vendor_class(class));
}

pub(crate) struct AttributeSanitization;

impl Pass for AttributeSanitization {
    fn name(&self) -> &'static str {
        "attribute-sanitization"
    }

    fn run(&self, ctx: &mut CleanContext<'_>) -> Result<(), PassError> {
        let doc = &mut *ctx.document;
        for node in doc.find_all(|_| true) {
            doc.update_element(node, |el| {
                if el.id().is_some_and(is_vendor_id) {
                    el.remove_attr("id");
                }
                strip_vendor_classes(el);
                el.retain_attrs(|name| !is_vendor_attr(name));
            });
        }
        Ok(())
    }
}

pub(crate) struct TableCleanup;

impl Pass for TableCleanup {
    fn name(&self) -> &'static str {
        "table-cleanup"
    }

    fn run(&self, ctx: &mut CleanContext<'_>) -> Result<(), PassError> {
        let doc = &mut *ctx.document;
        for table in doc.find_all(|el| el.is("table")) {
            doc.update_element(table, |el| {
                strip_vendor_classes(el);
                el.add_class(TABLE_CLASS);
                el.retain_attrs(|name| !TABLE_PRESENTATION_ATTRS.contains(&name));
            });
            for cell in doc.find_within(table, |el| el.is_any(&["td", "th"])) {
                doc.update_element(cell, |el| {
                    strip_vendor_classes(el);
                    el.retain_attrs(|name| CELL_ATTRS.contains(&name));
                });
            }
        }
        Ok(())
    }
}

pub(crate) struct HeadingNormalization;

impl Pass for HeadingNormalization {
    fn name(&self) -> &'static str {
        "heading-normalization"
    }

    fn run(&self, ctx: &mut CleanContext<'_>) -> Result<(), PassError> {
        let doc = &mut *ctx.document;
        for heading in doc.find_all(|el| el.heading_level().is_some()) {
            if !doc.is_attached(heading) {
                continue;
            }
            let Some(name) = doc.element(heading).map(|el| el.name().to_string()) else {
                continue;
            };
            let text = doc
                .text_content(heading)
                .split_whitespace()
                .collect::<Vec<_>>()
                .join(" ");
            let rebuilt = doc.create_element(Element::new(name));
            if !text.is_empty() {
                let text = doc.create_text(text);
                doc.append_child(rebuilt, text);
            }
            doc.replace(heading, rebuilt);
        }
        Ok(())
    }
}

pub(crate) struct ListCleanup;

impl Pass for ListCleanup {
    fn name(&self) -> &'static str {
        "list-cleanup"
    }

    fn run(&self, ctx: &mut CleanContext<'_>) -> Result<(), PassError> {
        let doc = &mut *ctx.document;
        for item in doc.find_all(|el| el.is("li")) {
            doc.update_element(item, |el| {
                strip_vendor_classes(el);
                el.retain_attrs(|name| LIST_ITEM_ATTRS.contains(&name));
            });
        }
        Ok(())
    }
}
