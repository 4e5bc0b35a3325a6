//! Vendor markup vocabulary: the class, id and attribute names the exporter
//! emits that carry no meaning outside the wiki.

pub const VENDOR_CLASSES: &[&str] = &[
    // page chrome and layout
    "theme-default",
    "aui-theme-default",
    "first",
    "pagetitle",
    "wiki-content",
    "group",
    "contentLayout2",
    "columnLayout",
    "fixed-width",
    "cell",
    "normal",
    "innerCell",
    // toc, tables, emoticons, images, panels
    "toc-macro",
    "toc-indentation",
    "confluenceTable",
    "confluenceTd",
    "confluenceTh",
    "emoticon",
    "emoticon-blue-star",
    "image-center-wrapper",
    "confluence-embedded-image",
    "image-center",
    "panel",
    "panelContent",
    // tasks, users, dates
    "inline-task-list",
    "placeholder-inline-tasks",
    "confluence-userlink",
    "user-mention",
    "current-user-mention",
    "date-upcoming",
    "date-future",
    // information macro
    "confluence-information-macro",
    "confluence-information-macro-information",
    "confluence-information-macro-icon",
    "confluence-information-macro-body",
    "aui-icon",
    "aui-icon-small",
    "aui-iconfont-info",
    "confluence-embedded-file-wrapper",
    // expand macro
    "expand-container",
    "expand-control",
    "expand-control-icon",
    "expand-control-image",
    "expand-control-text",
    "expand-content",
    // status lozenges
    "status-macro",
    "aui-lozenge",
    "aui-lozenge-progress",
    "aui-lozenge-complete",
    "table-wrapper",
    // task reports
    "task-blanket",
    "aui",
    "tasks-table-interactive",
    "tasks-report",
    "tablesorter-headerRow",
    "header-description",
    "tasks-table-column-unsortable",
    "header-duedate",
    "header-assignee",
    "header-location",
    "tasks-report-date",
    "tasks-report-assignee",
    "task-location",
    // misc
    "greybox",
    "footer-body",
    "external-link",
    "url",
    "fn",
    "aui-page-panel",
    "view",
    "data-colorid",
    "decision-list",
];

pub const VENDOR_IDS: &[&str] = &[
    "page",
    "main",
    "main-header",
    "breadcrumb-section",
    "breadcrumbs",
    "title-heading",
    "title-text",
    "content",
    "main-content",
    "attachments",
    "footer",
    "footer-logo",
    "data-inline-tasks-content-id",
];

pub const VENDOR_ID_PREFIXES: &[&str] = &["expander-"];

pub const VENDOR_ATTR_PREFIX: &str = "data-";

/// Elements the exporter uses as macro wrappers.
pub const MACRO_CLASSES: &[&str] = &[
    "confluence-information-macro",
    "expand-container",
    "confluence-embedded-file-wrapper",
    "contentLayout2",
    "columnLayout",
    "hidden-section",
    "toc-macro",
];

pub const MACRO_NAME_ATTR: &str = "data-macro-name";

pub fn is_vendor_class(class: &str) -> bool {
    VENDOR_CLASSES.contains(&class)
}

pub fn is_vendor_id(id: &str) -> bool {
    VENDOR_IDS.contains(&id) || VENDOR_ID_PREFIXES.iter().any(|prefix| id.starts_with(prefix))
}

pub fn is_vendor_attr(name: &str) -> bool {
    name.starts_with(VENDOR_ATTR_PREFIX)
}
