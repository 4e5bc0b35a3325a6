//! Page chrome removal, metadata localization and macro unwrapping.
use super::vendor::{MACRO_CLASSES, MACRO_NAME_ATTR};
use super::{CleanContext, Pass, PassError};
use crate::dom::Element;

const VENDOR_MARKER: &str = "confluence";
const FOOTER_PHRASE: &str = "Document generated by Confluence";
const SITE_STYLESHEET: &str = "styles/site.css";

/// Ordered English -> Portuguese substitutions for the page metadata line.
pub(crate) const METADATA_TRANSLATIONS: &[(&str, &str)] = &[
    ("Created by", "Criado por"),
    ("on", "em"),
    ("Last modified by", "Última modificação por"),
    ("at", "às"),
];

fn is_page_chrome(el: &Element) -> bool {
    let id = el.id().unwrap_or_default();
    match el.name() {
        "div" => {
            matches!(id, "footer" | "footer-logo" | "breadcrumb-section")
                || el.has_class("footer-body")
                || el.attr("role") == Some("contentinfo")
        }
        "section" => el.has_class("footer-body"),
        "script" => true,
        "link" => {
            let href = el.attr("href").unwrap_or_default();
            let is_stylesheet = el.attr("rel").is_some_and(|rel| {
                rel.split_whitespace()
                    .any(|token| token.eq_ignore_ascii_case("stylesheet"))
            });
            (is_stylesheet && href.contains(VENDOR_MARKER)) || href == SITE_STYLESHEET
        }
        "meta" => el
            .attr("name")
            .is_some_and(|name| name.contains(VENDOR_MARKER)),
        _ => false,
    }
}

pub(crate) struct StructuralPruning;

impl Pass for StructuralPruning {
    fn name(&self) -> &'static str {
        "structural-pruning"
    }

    fn run(&self, ctx: &mut CleanContext<'_>) -> Result<(), PassError> {
        let doc = &mut *ctx.document;
        for chrome in doc.find_all(is_page_chrome) {
            doc.remove(chrome);
        }
        for paragraph in doc.find_all(|el| el.is("p")) {
            if doc.text_content(paragraph).contains(FOOTER_PHRASE) {
                doc.remove(paragraph);
            }
        }
        for comment in doc.comments() {
            doc.remove(comment);
        }
        Ok(())
    }
}

pub(crate) struct MetadataLocalization;

impl Pass for MetadataLocalization {
    fn name(&self) -> &'static str {
        "metadata-localization"
    }

    fn run(&self, ctx: &mut CleanContext<'_>) -> Result<(), PassError> {
        let doc = &mut *ctx.document;
        for metadata in doc.find_all(|el| el.has_class("page-metadata")) {
            for text_node in doc.text_nodes_within(metadata) {
                let Some(text) = doc.text(text_node) else {
                    continue;
                };
                let localized = localize(text);
                if localized != text {
                    doc.set_text(text_node, localized);
                }
            }
        }
        Ok(())
    }
}

/// Literal, case-sensitive substring replacement; nothing smarter.
pub(crate) fn localize(text: &str) -> String {
    METADATA_TRANSLATIONS
        .iter()
        .fold(text.to_string(), |acc, (english, portuguese)| {
            acc.replace(english, portuguese)
        })
}

#[derive(Debug, Clone, Copy)]
enum MacroSelector {
    Named,
    Class(&'static str),
}

impl MacroSelector {
    fn matches(self, el: &Element) -> bool {
        match self {
            MacroSelector::Named => el.has_attr(MACRO_NAME_ATTR),
            MacroSelector::Class(class) => el.has_class(class),
        }
    }
}

pub(crate) struct MacroRemoval;

impl Pass for MacroRemoval {
    fn name(&self) -> &'static str {
        "macro-removal"
    }

    fn run(&self, ctx: &mut CleanContext<'_>) -> Result<(), PassError> {
        let doc = &mut *ctx.document;
        // Each selector sees the tree left behind by the previous one.
        let selectors = std::iter::once(MacroSelector::Named)
            .chain(MACRO_CLASSES.iter().copied().map(MacroSelector::Class));
        for selector in selectors {
            for node in doc.find_all(|el| selector.matches(el)) {
                if !doc.is_attached(node) {
                    continue;
                }
                if doc.element(node).is_some_and(|el| el.has_class("toc-macro")) {
                    doc.remove(node);
                } else {
                    doc.unwrap(node);
                }
            }
        }

        for embedded in doc.find_all(|el| el.is_any(&["style", "script"])) {
            if doc.text_content(embedded).contains(VENDOR_MARKER) {
                doc.remove(embedded);
            }
        }
        Ok(())
    }
}
