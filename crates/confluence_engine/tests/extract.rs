use confluence_engine::{
    extract_breadcrumbs, extract_title, BreadcrumbExtractor, Document, Extractor, PageInfo,
    UNTITLED_DOCUMENT,
};
use pretty_assertions::assert_eq;

#[test]
fn breadcrumbs_are_read_outermost_first() {
    let doc = Document::parse(
        r#"<div id="breadcrumb-section"><span><a>Space</a></span><span><a>Parent</a></span></div>"#,
    );
    assert_eq!(extract_breadcrumbs(&doc), vec!["Space", "Parent"]);
}

#[test]
fn blank_anchors_are_skipped_and_labels_trimmed() {
    let doc = Document::parse(
        r#"<div id="breadcrumb-section"><ol>
            <li><a href="index.html">  Engineering </a></li>
            <li><a href="x.html">   </a></li>
            <li><a href="y.html"><span>Team</span> <em>Notes</em></a></li>
        </ol></div>"#,
    );
    assert_eq!(extract_breadcrumbs(&doc), vec!["Engineering", "Team Notes"]);
}

#[test]
fn pages_without_navigation_have_no_breadcrumbs() {
    let doc = Document::parse("<p><a>Not a breadcrumb</a></p>");
    assert!(extract_breadcrumbs(&doc).is_empty());
}

#[test]
fn title_falls_back_when_missing_or_blank() {
    let titled = Document::parse("<title> Engineering : Home </title>");
    assert_eq!(extract_title(&titled), "Engineering : Home");

    let blank = Document::parse("<title>  </title><p>x</p>");
    assert_eq!(extract_title(&blank), UNTITLED_DOCUMENT);

    let missing = Document::parse("<p>x</p>");
    assert_eq!(extract_title(&missing), "Untitled Document");
}

#[test]
fn extractor_combines_title_and_trail() {
    let doc = Document::parse(
        r#"<html><head><title>Guide</title></head><body>
           <div id="breadcrumb-section"><a>Eng</a><a>Docs</a></div></body></html>"#,
    );
    let info = BreadcrumbExtractor.extract(&doc);
    assert_eq!(
        info,
        PageInfo {
            title: "Guide".to_string(),
            breadcrumbs: vec!["Eng".to_string(), "Docs".to_string()],
        }
    );
    assert_eq!(info.space_name(), Some("Eng"));
}
