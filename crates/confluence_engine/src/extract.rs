use crate::dom::Document;

pub const UNTITLED_DOCUMENT: &str = "Untitled Document";

const BREADCRUMB_CONTAINER_ID: &str = "breadcrumb-section";

/// What the organizer needs to know about a page before cleaning it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageInfo {
    pub title: String,
    pub breadcrumbs: Vec<String>,
}

impl PageInfo {
    /// The space a page belongs to is the outermost breadcrumb.
    pub fn space_name(&self) -> Option<&str> {
        self.breadcrumbs.first().map(String::as_str)
    }
}

pub trait Extractor: Send + Sync {
    fn extract(&self, document: &Document) -> PageInfo;
}

/// Reads `<title>` and the anchors of `div#breadcrumb-section`.
#[derive(Debug, Default)]
pub struct BreadcrumbExtractor;

impl Extractor for BreadcrumbExtractor {
    fn extract(&self, document: &Document) -> PageInfo {
        PageInfo {
            title: extract_title(document),
            breadcrumbs: extract_breadcrumbs(document),
        }
    }
}

/// Trimmed `<title>` text, or [`UNTITLED_DOCUMENT`] when missing or blank.
pub fn extract_title(document: &Document) -> String {
    document
        .find_first(|element| element.is("title"))
        .map(|title| document.text_content(title).trim().to_string())
        .filter(|title| !title.is_empty())
        .unwrap_or_else(|| UNTITLED_DOCUMENT.to_string())
}

/// Breadcrumb labels, outermost first. A page without the navigation block
/// yields an empty list.
pub fn extract_breadcrumbs(document: &Document) -> Vec<String> {
    let Some(container) =
        document.find_first(|element| element.id() == Some(BREADCRUMB_CONTAINER_ID))
    else {
        return Vec::new();
    };
    document
        .find_within(container, |element| element.is("a"))
        .into_iter()
        .map(|anchor| document.text_content(anchor).trim().to_string())
        .filter(|label| !label.is_empty())
        .collect()
}

/// Text inside the first pair of parentheses of a title, e.g. the space name
/// in `"Home (Engineering)"`.
pub fn parenthesized_text(title: &str) -> Option<&str> {
    let open = title.find('(')?;
    let close = open + title[open..].find(')')?;
    let inner = title[open + 1..close].trim();
    (!inner.is_empty()).then_some(inner)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parenthesized_text_reads_space_name() {
        assert_eq!(parenthesized_text("Home (Engineering)"), Some("Engineering"));
        assert_eq!(parenthesized_text("Home"), None);
        assert_eq!(parenthesized_text("Home ( )"), None);
    }
}
