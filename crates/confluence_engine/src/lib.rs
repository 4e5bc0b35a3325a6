//! Confluence export engine: page cleaning, breadcrumb extraction, output
//! organization and the document tree index.
pub mod cleaner;
pub mod dom;
mod decode;
mod docx;
mod extract;
mod fetch;
mod filename;
mod organizer;
mod persist;
mod scan;
mod tree;
mod types;

pub use cleaner::{
    CleanError, CleanerSettings, HtmlCleaner, PassError, CUSTOM_CSS, FONT_STYLESHEET,
};
pub use decode::{decode_html, DecodeError, DecodedHtml};
pub use docx::{DocxConverter, DocxError, PandocConverter, DEFAULT_PANDOC};
pub use dom::{Document, NodeId};
pub use extract::{
    extract_breadcrumbs, extract_title, parenthesized_text, BreadcrumbExtractor, Extractor,
    PageInfo, UNTITLED_DOCUMENT,
};
pub use fetch::{FetchSettings, ImageFetcher, ReqwestImageFetcher};
pub use filename::{image_file_name, sanitize_filename, strip_space_prefix};
pub use organizer::{
    organize_duplicates, page_file_name, FileOutcome, FileProcessor, ProcessError,
    ProcessingStats, ProcessorConfig, SpaceLayout, RESOURCE_FOLDERS,
};
pub use persist::{copy_dir_recursive, ensure_output_dir, AtomicFileWriter, PersistError};
pub use scan::{files_with_extension, html_files};
pub use tree::{
    parse_table, table_entries, DocumentTree, DocumentTreeBuilder, TableEntry, TreeError,
    TreeExport, TreeFormat, TreeNode, TreeSettings, OUTLINE_FILE, TABLE_FILE,
};
pub use types::{FailureKind, FetchError, FetchedImage};
