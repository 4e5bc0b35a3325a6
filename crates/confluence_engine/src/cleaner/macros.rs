//! Rewrites of vendor macros into plain, styleable markup: status lozenges,
//! expand sections, decision lists, column layouts and table wrappers.
use engine_logging::engine_error;

use super::{CleanContext, Pass, PassError};
use crate::dom::{Document, Element, NodeId};

/// Semantic colour of a status badge; rendered as the `status-<colour>` class.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusColor {
    Gray,
    Green,
    Red,
    Yellow,
    Blue,
    Purple,
    Teal,
}

impl StatusColor {
    /// Lozenge classes with a specific colour. A plain `aui-lozenge` is gray.
    const LOZENGES: &'static [(&'static str, StatusColor)] = &[
        ("aui-lozenge-success", StatusColor::Green),
        ("aui-lozenge-error", StatusColor::Red),
        ("aui-lozenge-current", StatusColor::Yellow),
        ("aui-lozenge-complete", StatusColor::Blue),
        ("aui-lozenge-progress", StatusColor::Purple),
        ("aui-lozenge-moved", StatusColor::Teal),
    ];

    /// First specific lozenge class wins; anything else is gray.
    pub fn from_classes<S: AsRef<str>>(classes: &[S]) -> Self {
        classes
            .iter()
            .find_map(|class| {
                Self::LOZENGES
                    .iter()
                    .find(|(name, _)| *name == class.as_ref())
                    .map(|(_, color)| *color)
            })
            .unwrap_or(StatusColor::Gray)
    }

    pub fn class_name(self) -> &'static str {
        match self {
            StatusColor::Gray => "status-gray",
            StatusColor::Green => "status-green",
            StatusColor::Red => "status-red",
            StatusColor::Yellow => "status-yellow",
            StatusColor::Blue => "status-blue",
            StatusColor::Purple => "status-purple",
            StatusColor::Teal => "status-teal",
        }
    }
}

pub(crate) struct StatusBadges;

impl Pass for StatusBadges {
    fn name(&self) -> &'static str {
        "status-badges"
    }

    fn run(&self, ctx: &mut CleanContext<'_>) -> Result<(), PassError> {
        let doc = &mut *ctx.document;
        for badge in doc.find_all(|el| el.is("span") && el.has_class("status-macro")) {
            if !doc.is_attached(badge) {
                continue;
            }
            let color = doc
                .element(badge)
                .map(|el| StatusColor::from_classes(el.classes()))
                .unwrap_or(StatusColor::Gray);
            let label = doc.text_content(badge).trim().to_string();

            let strong = doc.create_element(Element::new("strong").with_attr("class", color.class_name()));
            let text = doc.create_text(label);
            doc.append_child(strong, text);

            if doc.has_ancestor(badge, |el| el.is("p")) {
                doc.replace(badge, strong);
            } else {
                let paragraph = doc.create_element(Element::new("p"));
                doc.append_child(paragraph, strong);
                doc.replace(badge, paragraph);
            }
        }
        Ok(())
    }
}

pub(crate) struct ExpandContainers;

impl Pass for ExpandContainers {
    fn name(&self) -> &'static str {
        "expand-containers"
    }

    fn run(&self, ctx: &mut CleanContext<'_>) -> Result<(), PassError> {
        let doc = &mut *ctx.document;
        for container in doc.find_all(|el| el.is("div") && el.has_class("expand-container")) {
            if !doc.is_attached(container) {
                continue;
            }
            let expand_box = doc.create_element(Element::new("div").with_attr("class", "expand-box"));

            let label = doc
                .find_first_within(container, |el| el.is("div") && el.has_class("expand-control"))
                .and_then(|control| {
                    doc.find_first_within(control, |el| {
                        el.is("span") && el.has_class("expand-control-text")
                    })
                })
                .map(|span| doc.text_content(span).trim().to_string());
            if let Some(label) = label {
                let em = doc.create_element(Element::new("em"));
                let text = doc.create_text(label);
                doc.append_child(em, text);
                doc.append_child(expand_box, em);
            }

            if let Some(content) = doc
                .find_first_within(container, |el| el.is("div") && el.has_class("expand-content"))
            {
                doc.move_children(content, expand_box);
            }
            doc.replace(container, expand_box);
        }
        Ok(())
    }
}

pub(crate) const DECISION_LABEL: &str = "DECISÃO";

pub(crate) struct DecisionLists;

impl Pass for DecisionLists {
    fn name(&self) -> &'static str {
        "decision-lists"
    }

    fn run(&self, ctx: &mut CleanContext<'_>) -> Result<(), PassError> {
        let doc = &mut *ctx.document;
        for list in doc.find_all(|el| el.is("ul") && el.has_class("decision-list")) {
            if !doc.is_attached(list) {
                continue;
            }
            let decision_box =
                doc.create_element(Element::new("div").with_attr("class", "decision-box"));
            let em = doc.create_element(Element::new("em"));
            let text = doc.create_text(DECISION_LABEL);
            doc.append_child(em, text);
            doc.append_child(decision_box, em);

            for item in doc.find_within(list, |el| el.is("li")) {
                doc.move_children(item, decision_box);
            }
            doc.replace(list, decision_box);
        }
        Ok(())
    }
}

/// Percentage label, width class and exact share of each supported column width.
pub const WIDTH_CLASSES: &[(&str, &str, f64)] = &[
    ("25%", "column-25", 25.0),
    ("33%", "column-33", 100.0 / 3.0),
    ("50%", "column-50", 50.0),
    ("67%", "column-67", 200.0 / 3.0),
    ("75%", "column-75", 75.0),
    ("100%", "column-100", 100.0),
];

const LAYOUTS: &[(&str, &[&str])] = &[
    ("two-equal", &["50%", "50%"]),
    ("two-right-sidebar", &["33%", "67%"]),
    ("two-left-sidebar", &["67%", "33%"]),
    ("three-equal", &["33%", "33%", "33%"]),
    ("three-with-sidebars", &["25%", "50%", "25%"]),
];

/// Column widths for a layout variant; unknown variants get `100%` per cell.
pub fn column_widths(variant: &str, cells: usize) -> Vec<&'static str> {
    LAYOUTS
        .iter()
        .find(|(name, _)| *name == variant)
        .map(|(_, widths)| widths.to_vec())
        .unwrap_or_else(|| vec!["100%"; cells])
}

pub fn width_class(percentage: &str) -> Option<&'static str> {
    WIDTH_CLASSES
        .iter()
        .find(|(label, _, _)| *label == percentage)
        .map(|(_, class, _)| *class)
}

pub(crate) struct ColumnLayouts;

impl Pass for ColumnLayouts {
    fn name(&self) -> &'static str {
        "column-layouts"
    }

    fn run(&self, ctx: &mut CleanContext<'_>) -> Result<(), PassError> {
        let doc = &mut *ctx.document;
        for layout in doc.find_all(|el| el.is("div") && el.has_class("columnLayout")) {
            if !doc.is_attached(layout) {
                continue;
            }
            if let Err(err) = convert_layout(doc, layout) {
                engine_error!("Error converting column layout: {err}");
            }
        }
        Ok(())
    }
}

/// `data-layout` wins over a layout class; `None` when neither is present.
fn layout_variant(element: &Element) -> Option<String> {
    if let Some(variant) = element.attr("data-layout").filter(|v| !v.is_empty()) {
        return Some(variant.to_string());
    }
    element
        .classes()
        .iter()
        .find(|class| LAYOUTS.iter().any(|(name, _)| *name == class.as_str()))
        .cloned()
}

fn convert_layout(doc: &mut Document, layout: NodeId) -> Result<(), PassError> {
    let variant = doc
        .element(layout)
        .and_then(layout_variant)
        .unwrap_or_default();
    let cells = doc.child_elements(layout, |el| el.is("div") && el.has_class("cell"));
    let widths = column_widths(&variant, cells.len());
    if cells.len() > widths.len() {
        return Err(PassError::LayoutMismatch {
            variant,
            cells: cells.len(),
            widths: widths.len(),
        });
    }

    // html5ever inserts <tbody> when re-reading a table; build it up front so
    // cleaned output reparses to the same tree.
    let table = doc.create_element(Element::new("table"));
    let body = doc.create_element(Element::new("tbody"));
    let row = doc.create_element(Element::new("tr"));
    doc.append_child(table, body);
    doc.append_child(body, row);

    for (cell, width) in cells.into_iter().zip(widths) {
        let mut td = Element::new("td");
        if let Some(class) = width_class(width) {
            td.set_attr("class", class);
        }
        let td = doc.create_element(td);
        let source = doc
            .find_first_within(cell, |el| el.is("div") && el.has_class("innerCell"))
            .unwrap_or(cell);
        doc.move_children(source, td);
        doc.append_child(row, td);
    }
    doc.replace(layout, table);
    Ok(())
}

pub(crate) struct TableWrappers;

impl Pass for TableWrappers {
    fn name(&self) -> &'static str {
        "table-wrappers"
    }

    fn run(&self, ctx: &mut CleanContext<'_>) -> Result<(), PassError> {
        let doc = &mut *ctx.document;
        for wrapper in doc.find_all(|el| el.is("div") && el.has_class("table-wrap")) {
            if !doc.is_attached(wrapper) {
                continue;
            }
            match doc.find_first_within(wrapper, |el| el.is("table")) {
                Some(table) => doc.replace(wrapper, table),
                None => doc.unwrap(wrapper),
            }
        }
        Ok(())
    }
}
