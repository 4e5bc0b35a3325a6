//! Hierarchical index of an export, built from every page's breadcrumbs.
//!
//! Pages are placed under their breadcrumb path; a title that is also a
//! breadcrumb of other pages is both a document and a folder. The index is
//! rendered either as a nested Markdown outline or as a flat table with one
//! row per folder and per document.
use std::collections::BTreeMap;
use std::fmt;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use engine_logging::{engine_debug, engine_error, engine_info};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::decode::decode_html;
use crate::dom::Document;
use crate::extract::{BreadcrumbExtractor, Extractor, PageInfo};
use crate::persist::{AtomicFileWriter, PersistError};
use crate::scan::html_files;

pub const OUTLINE_FILE: &str = "document_tree.md";
pub const TABLE_FILE: &str = "document_table.csv";
const OUTLINE_HEADER: &str = "# Document Structure\n\n";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TreeFormat {
    /// Nested Markdown outline.
    Tree,
    /// One row per folder and per document, each the full path of names.
    #[default]
    Table,
}

impl TreeFormat {
    pub fn file_name(self) -> &'static str {
        match self {
            TreeFormat::Tree => OUTLINE_FILE,
            TreeFormat::Table => TABLE_FILE,
        }
    }
}

impl FromStr for TreeFormat {
    type Err = TreeError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "tree" => Ok(TreeFormat::Tree),
            "table" => Ok(TreeFormat::Table),
            other => Err(TreeError::UnknownFormat(other.to_string())),
        }
    }
}

impl fmt::Display for TreeFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TreeFormat::Tree => write!(f, "tree"),
            TreeFormat::Table => write!(f, "table"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TreeSettings {
    pub format: TreeFormat,
    /// Field separator of the table encoding; may be longer than one character.
    pub separator: String,
    pub show_filenames: bool,
}

impl Default for TreeSettings {
    fn default() -> Self {
        Self {
            format: TreeFormat::Table,
            separator: ";".to_string(),
            show_filenames: true,
        }
    }
}

#[derive(Debug, Error)]
pub enum TreeError {
    #[error("input directory does not exist: {0}")]
    InputDir(PathBuf),
    #[error("unknown document tree format `{0}` (expected `tree` or `table`)")]
    UnknownFormat(String),
    #[error("table separator must not be empty")]
    EmptySeparator,
    #[error("failed to scan for pages: {0}")]
    Scan(#[from] io::Error),
    #[error("failed to write document tree: {0}")]
    Persist(#[from] PersistError),
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TreeNode {
    pub name: String,
    /// Page file relative to the scanned directory; `None` for pure folders.
    pub path: Option<String>,
    pub children: BTreeMap<String, TreeNode>,
}

impl TreeNode {
    fn named(name: &str) -> Self {
        Self {
            name: name.to_string(),
            ..Self::default()
        }
    }

    /// Folders first, then case-insensitive by name.
    fn sorted_children(&self) -> Vec<&TreeNode> {
        let mut children: Vec<&TreeNode> = self.children.values().collect();
        children.sort_by_key(|child| (child.children.is_empty(), child.name.to_lowercase()));
        children
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DocumentTree {
    root: TreeNode,
}

impl DocumentTree {
    pub fn new() -> Self {
        Self {
            root: TreeNode::named("root"),
        }
    }

    pub fn root(&self) -> &TreeNode {
        &self.root
    }

    pub fn is_empty(&self) -> bool {
        self.root.children.is_empty()
    }

    /// Places a page under its breadcrumb path, creating folders on the way.
    pub fn insert(&mut self, breadcrumbs: &[String], title: &str, path: impl Into<String>) {
        let mut current = &mut self.root;
        for crumb in breadcrumbs {
            current = current
                .children
                .entry(crumb.clone())
                .or_insert_with(|| TreeNode::named(crumb));
        }
        current
            .children
            .entry(title.to_string())
            .or_insert_with(|| TreeNode::named(title))
            .path = Some(path.into());
    }

    pub fn render_outline(&self, show_filenames: bool) -> String {
        let mut lines = Vec::new();
        outline_lines(&self.root, 0, show_filenames, &mut lines);
        let mut out = String::from(OUTLINE_HEADER);
        out.push_str(&lines.join("\n"));
        out.push('\n');
        out
    }

    pub fn table_rows(&self, show_filenames: bool) -> Vec<Vec<String>> {
        let mut rows = Vec::new();
        table_lines(&self.root, &[], show_filenames, &mut rows);
        rows
    }

    pub fn render_table(&self, separator: &str, show_filenames: bool) -> String {
        let mut out = String::new();
        for row in self.table_rows(show_filenames) {
            let fields: Vec<String> = row
                .iter()
                .map(|field| quote_field(field, separator))
                .collect();
            out.push_str(&fields.join(separator));
            out.push('\n');
        }
        out
    }

    pub fn render(&self, settings: &TreeSettings) -> String {
        match settings.format {
            TreeFormat::Tree => self.render_outline(settings.show_filenames),
            TreeFormat::Table => self.render_table(&settings.separator, settings.show_filenames),
        }
    }
}

fn outline_lines(node: &TreeNode, level: usize, show_filenames: bool, lines: &mut Vec<String>) {
    let indent = "  ".repeat(level);
    for child in node.sorted_children() {
        if let Some(path) = &child.path {
            if show_filenames {
                lines.push(format!("{indent}- [{}]({path})", child.name));
            } else {
                lines.push(format!("{indent}- {}", child.name));
            }
        }
        if !child.children.is_empty() {
            lines.push(format!("{indent}- **{}**", child.name));
            outline_lines(child, level + 1, show_filenames, lines);
        }
    }
}

fn table_lines(
    node: &TreeNode,
    prefix: &[String],
    show_filenames: bool,
    rows: &mut Vec<Vec<String>>,
) {
    for child in node.sorted_children() {
        if let Some(path) = &child.path {
            let label = if show_filenames {
                format!("{} ({path})", child.name)
            } else {
                child.name.clone()
            };
            rows.push(extend(prefix, label));
        }
        if !child.children.is_empty() {
            let folder = extend(prefix, child.name.clone());
            rows.push(folder.clone());
            table_lines(child, &folder, show_filenames, rows);
        }
    }
}

fn extend(prefix: &[String], last: String) -> Vec<String> {
    let mut row = prefix.to_vec();
    row.push(last);
    row
}

fn quote_field(field: &str, separator: &str) -> String {
    let needs_quotes = field.contains(separator)
        || field.contains('"')
        || field.contains('\n')
        || field.contains('\r');
    if needs_quotes {
        format!("\"{}\"", field.replace('"', "\"\""))
    } else {
        field.to_string()
    }
}

/// Reads rows written by [`DocumentTree::render_table`]. Quoted fields may
/// contain the separator, doubled quotes and line breaks. Blank lines are skipped.
pub fn parse_table(content: &str, separator: &str) -> Result<Vec<Vec<String>>, TreeError> {
    if separator.is_empty() {
        return Err(TreeError::EmptySeparator);
    }
    let mut rows = Vec::new();
    let mut row = Vec::new();
    let mut field = String::new();
    let mut in_quotes = false;
    let mut rest = content;

    while let Some(c) = rest.chars().next() {
        if in_quotes {
            if rest.starts_with("\"\"") {
                field.push('"');
                rest = &rest[2..];
            } else if c == '"' {
                in_quotes = false;
                rest = &rest[1..];
            } else {
                field.push(c);
                rest = &rest[c.len_utf8()..];
            }
            continue;
        }

        if rest.starts_with(separator) {
            row.push(std::mem::take(&mut field));
            rest = &rest[separator.len()..];
        } else if c == '"' && field.is_empty() {
            in_quotes = true;
            rest = &rest[1..];
        } else if c == '\n' || c == '\r' {
            row.push(std::mem::take(&mut field));
            finish_row(&mut rows, std::mem::take(&mut row));
            rest = rest.strip_prefix("\r\n").unwrap_or(&rest[1..]);
        } else {
            field.push(c);
            rest = &rest[c.len_utf8()..];
        }
    }
    if !field.is_empty() || !row.is_empty() {
        row.push(field);
        finish_row(&mut rows, row);
    }
    Ok(rows)
}

fn finish_row(rows: &mut Vec<Vec<String>>, row: Vec<String>) {
    let blank = row.len() == 1 && row[0].is_empty();
    if !blank {
        rows.push(row);
    }
}

/// A row of the table encoding, classified.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TableEntry {
    Folder(Vec<String>),
    Document {
        breadcrumbs: Vec<String>,
        title: String,
        path: Option<String>,
    },
}

/// Classifies parsed rows. A row is a folder exactly when the next row
/// extends it; every other row is a document.
pub fn table_entries(rows: &[Vec<String>], show_filenames: bool) -> Vec<TableEntry> {
    rows.iter()
        .enumerate()
        .filter_map(|(index, row)| {
            let (last, parents) = row.split_last()?;
            let is_folder = rows
                .get(index + 1)
                .is_some_and(|next| next.len() > row.len() && next.starts_with(row));
            if is_folder {
                return Some(TableEntry::Folder(row.clone()));
            }
            let (title, path) = if show_filenames {
                split_label(last)
            } else {
                (last.clone(), None)
            };
            Some(TableEntry::Document {
                breadcrumbs: parents.to_vec(),
                title,
                path,
            })
        })
        .collect()
}

/// Splits `title (path)` at the ` (` whose parenthesis the final `)` closes,
/// so paths may contain balanced parentheses of their own.
fn split_label(label: &str) -> (String, Option<String>) {
    if !label.ends_with(')') {
        return (label.to_string(), None);
    }
    let mut depth = 0usize;
    let mut balanced = None;
    for (index, c) in label.char_indices().rev() {
        match c {
            ')' => depth += 1,
            '(' => {
                depth -= 1;
                if depth == 0 {
                    balanced = Some(index);
                    break;
                }
            }
            _ => {}
        }
    }
    let open = balanced
        .filter(|&index| label[..index].ends_with(' '))
        .or_else(|| label.rfind(" (").map(|index| index + 1));
    match open {
        Some(open) => (
            label[..open - 1].to_string(),
            Some(label[open + 1..label.len() - 1].to_string()),
        ),
        None => (label.to_string(), None),
    }
}

/// Result of [`DocumentTreeBuilder::export`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TreeExport {
    pub content: String,
    /// Where the content was written; `None` for a dry run.
    pub written_to: Option<PathBuf>,
}

pub struct DocumentTreeBuilder {
    input_dir: PathBuf,
    settings: TreeSettings,
    extractor: Box<dyn Extractor>,
}

impl DocumentTreeBuilder {
    pub fn new(input_dir: impl Into<PathBuf>, settings: TreeSettings) -> Self {
        engine_info!("document tree format: {}", settings.format);
        engine_info!("show filenames: {}", settings.show_filenames);
        Self {
            input_dir: input_dir.into(),
            settings,
            extractor: Box::new(BreadcrumbExtractor),
        }
    }

    /// Scans the input directory recursively and places every page.
    pub fn build(&self) -> Result<DocumentTree, TreeError> {
        if !self.input_dir.is_dir() {
            return Err(TreeError::InputDir(self.input_dir.clone()));
        }
        let files = html_files(&self.input_dir, true)?;
        engine_info!("found {} HTML files", files.len());

        let mut tree = DocumentTree::new();
        for file in files {
            let info = self.page_info(&file);
            let relative = relative_path(&self.input_dir, &file);
            engine_debug!("{} -> {:?} / {}", relative, info.breadcrumbs, info.title);
            tree.insert(&info.breadcrumbs, &info.title, relative);
        }
        Ok(tree)
    }

    /// Renders the tree and, unless `dry_run`, writes it into `output_dir`.
    pub fn export(
        &self,
        tree: &DocumentTree,
        output_dir: &Path,
        dry_run: bool,
    ) -> Result<TreeExport, TreeError> {
        if self.settings.format == TreeFormat::Table && self.settings.separator.is_empty() {
            return Err(TreeError::EmptySeparator);
        }
        let content = tree.render(&self.settings);
        if dry_run {
            return Ok(TreeExport {
                content,
                written_to: None,
            });
        }
        let writer = AtomicFileWriter::new(output_dir.to_path_buf());
        let path = writer.write(self.settings.format.file_name(), &content)?;
        engine_info!("document {} exported to {}", self.settings.format, path.display());
        Ok(TreeExport {
            content,
            written_to: Some(path),
        })
    }

    fn page_info(&self, file: &Path) -> PageInfo {
        match read_page(file) {
            Ok(document) => self.extractor.extract(&document),
            Err(err) => {
                engine_error!("error processing {}: {err}", file.display());
                PageInfo {
                    title: file_stem(file),
                    breadcrumbs: Vec::new(),
                }
            }
        }
    }
}

fn read_page(file: &Path) -> Result<Document, String> {
    let bytes = fs::read(file).map_err(|err| err.to_string())?;
    let decoded = decode_html(&bytes).map_err(|err| err.to_string())?;
    Ok(Document::parse(&decoded.html))
}

fn file_stem(file: &Path) -> String {
    file.file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .unwrap_or_default()
}

/// `/`-separated path of `file` below `base`.
fn relative_path(base: &Path, file: &Path) -> String {
    let relative = file.strip_prefix(base).unwrap_or(file);
    relative
        .components()
        .map(|component| component.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/")
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn crumbs(names: &[&str]) -> Vec<String> {
        names.iter().map(|name| name.to_string()).collect()
    }

    #[test]
    fn folders_sort_before_documents() {
        let mut tree = DocumentTree::new();
        tree.insert(&crumbs(&["Space"]), "zeta", "zeta.html");
        tree.insert(&crumbs(&["Space", "Alpha"]), "Child", "Alpha/Child.html");
        tree.insert(&crumbs(&["Space"]), "Beta", "Beta.html");

        let outline = tree.render_outline(true);
        assert_eq!(
            outline,
            "# Document Structure\n\n\
             - **Space**\n  \
             - **Alpha**\n    \
             - [Child](Alpha/Child.html)\n  \
             - [Beta](Beta.html)\n  \
             - [zeta](zeta.html)\n"
        );
    }

    #[test]
    fn page_that_is_also_a_folder_gets_both_rows() {
        let mut tree = DocumentTree::new();
        tree.insert(&crumbs(&["S"]), "Guide", "Guide.html");
        tree.insert(&crumbs(&["S", "Guide"]), "Part", "Guide/Part.html");

        assert_eq!(
            tree.table_rows(true),
            vec![
                crumbs(&["S"]),
                crumbs(&["S", "Guide (Guide.html)"]),
                crumbs(&["S", "Guide"]),
                crumbs(&["S", "Guide", "Part (Guide/Part.html)"]),
            ]
        );
    }

    #[test]
    fn fields_with_separator_are_quoted() {
        assert_eq!(quote_field("a;b", ";"), "\"a;b\"");
        assert_eq!(quote_field("say \"hi\"", ";"), "\"say \"\"hi\"\"\"");
        assert_eq!(quote_field("plain", " - "), "plain");
    }

    #[test]
    fn parse_table_handles_multi_character_separator() {
        let rows = parse_table("a - \"b - c\" - d\n\ne\n", " - ").expect("parse");
        assert_eq!(rows, vec![crumbs(&["a", "b - c", "d"]), crumbs(&["e"])]);
    }

    #[test]
    fn split_label_keeps_parentheses_in_titles() {
        assert_eq!(
            split_label("Notes (draft) (Notes.html)"),
            ("Notes (draft)".to_string(), Some("Notes.html".to_string()))
        );
        assert_eq!(split_label("Plain"), ("Plain".to_string(), None));
    }

    #[test]
    fn split_label_keeps_parentheses_in_paths() {
        assert_eq!(
            split_label("Plan (Space/Plan (old).html)"),
            ("Plan".to_string(), Some("Space/Plan (old).html".to_string()))
        );
        assert_eq!(
            split_label("Plan (v2) (Space/Plan (v2).html)"),
            ("Plan (v2)".to_string(), Some("Space/Plan (v2).html".to_string()))
        );
    }

    #[test]
    fn table_round_trips_paths_with_parentheses() {
        let mut tree = DocumentTree::new();
        tree.insert(&crumbs(&["Space"]), "Plan", "Space/Plan (old).html");
        let content = tree.render_table(";", true);
        let rows = parse_table(&content, ";").expect("parse");
        assert_eq!(
            table_entries(&rows, true),
            vec![
                TableEntry::Folder(crumbs(&["Space"])),
                TableEntry::Document {
                    breadcrumbs: crumbs(&["Space"]),
                    title: "Plan".to_string(),
                    path: Some("Space/Plan (old).html".to_string()),
                },
            ]
        );
    }

    #[test]
    fn format_parses_case_insensitively() {
        assert_eq!("TREE".parse::<TreeFormat>().expect("format"), TreeFormat::Tree);
        assert!("csv".parse::<TreeFormat>().is_err());
    }
}
