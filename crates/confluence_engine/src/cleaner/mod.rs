//! The page cleaning pipeline.
//!
//! A fixed, ordered list of [`Pass`]es rewrites the document in place. Content
//! passes run first (emoji, images, links, macros), then structural pruning,
//! then attribute sanitization and finally whitespace/head fix-ups. Running
//! the pipeline over its own output changes nothing.
mod finalize;
mod macros;
mod resources;
mod sanitize;
mod structure;
mod style;
pub mod vendor;

use std::io;
use std::path::{Path, PathBuf};

use engine_logging::{engine_debug, engine_error, engine_warn};
use thiserror::Error;
use url::Url;

use crate::dom::Document;
use crate::extract::extract_title;
use crate::fetch::{FetchSettings, ImageFetcher, ReqwestImageFetcher};
use crate::persist::PersistError;
use crate::types::FetchError;

pub use macros::{column_widths, width_class, StatusColor, WIDTH_CLASSES};
pub use style::{CUSTOM_CSS, FONT_STYLESHEET};

#[derive(Debug, Clone)]
pub struct CleanerSettings {
    /// Base for relative image sources; an absolute `<base href>` in the page
    /// is used when this is unset.
    pub base_url: Option<Url>,
    /// Fallback base for relative image sources, joined onto the working directory.
    pub input_dir: PathBuf,
    pub download_images: bool,
    pub fetch: FetchSettings,
}

impl Default for CleanerSettings {
    fn default() -> Self {
        Self {
            base_url: None,
            input_dir: PathBuf::from("input"),
            download_images: false,
            fetch: FetchSettings::default(),
        }
    }
}

#[derive(Debug, Error)]
pub enum CleanError {
    #[error("pass `{pass}` failed: {source}")]
    Pass {
        pass: &'static str,
        #[source]
        source: PassError,
    },
}

/// Failure inside a single pass, or inside one element of a pass.
#[derive(Debug, Error)]
pub enum PassError {
    #[error("io error: {0}")]
    Io(#[from] io::Error),
    #[error("invalid url: {0}")]
    Url(#[from] url::ParseError),
    #[error("could not store image: {0}")]
    Persist(#[from] PersistError),
    #[error("image fetch failed: {0}")]
    Fetch(#[from] FetchError),
    #[error("layout `{variant}` has {cells} columns but only {widths} widths")]
    LayoutMismatch {
        variant: String,
        cells: usize,
        widths: usize,
    },
}

/// State shared by the passes of one `clean` call.
pub struct CleanContext<'a> {
    pub document: &'a mut Document,
    /// Directory the cleaned page is written to; downloaded images go below it.
    pub target_dir: &'a Path,
    pub title: &'a str,
    pub settings: &'a CleanerSettings,
    pub fetcher: Option<&'a dyn ImageFetcher>,
}

pub trait Pass {
    fn name(&self) -> &'static str;
    fn run(&self, ctx: &mut CleanContext<'_>) -> Result<(), PassError>;
}

/// Execution order. Macro removal runs ahead of attribute sanitization
/// because it selects on the vendor classes and `data-*` attributes that
/// sanitization strips.
const PIPELINE: &[&dyn Pass] = &[
    &resources::EmojiNormalization,
    &resources::ImageNormalization,
    &resources::LinkNormalization,
    &macros::StatusBadges,
    &macros::ExpandContainers,
    &macros::DecisionLists,
    &macros::ColumnLayouts,
    &macros::TableWrappers,
    &structure::StructuralPruning,
    &structure::MetadataLocalization,
    &structure::MacroRemoval,
    &sanitize::AttributeSanitization,
    &sanitize::TableCleanup,
    &sanitize::HeadingNormalization,
    &sanitize::ListCleanup,
    &finalize::EmptyElementPruning,
    &finalize::WhitespaceNormalization,
    &finalize::TitleBackfill,
    &finalize::CharsetMeta,
    &style::StyleInjection,
];

/// Names of the pipeline passes in execution order.
pub fn pass_names() -> Vec<&'static str> {
    PIPELINE.iter().map(|pass| pass.name()).collect()
}

pub struct HtmlCleaner {
    settings: CleanerSettings,
    fetcher: Option<Box<dyn ImageFetcher>>,
}

impl HtmlCleaner {
    /// Builds a cleaner. With `download_images` set, a blocking HTTP client is
    /// created here; if that fails images are left pointing at their source.
    pub fn new(settings: CleanerSettings) -> Self {
        let fetcher: Option<Box<dyn ImageFetcher>> = if settings.download_images {
            match ReqwestImageFetcher::new(settings.fetch.clone()) {
                Ok(fetcher) => Some(Box::new(fetcher)),
                Err(err) => {
                    engine_warn!("Image downloads disabled: {err}");
                    None
                }
            }
        } else {
            None
        };
        Self { settings, fetcher }
    }

    /// Replaces the image fetcher used when `download_images` is set.
    pub fn with_fetcher(mut self, fetcher: Box<dyn ImageFetcher>) -> Self {
        self.fetcher = Some(fetcher);
        self
    }

    /// Runs every pass over `document` and returns the serialized page.
    ///
    /// Per-element problems are logged and skipped inside the passes; an error
    /// returned here means the document as a whole could not be cleaned.
    pub fn clean(&self, document: &mut Document, target_dir: &Path) -> Result<String, CleanError> {
        let title = extract_title(document);
        let fetcher = if self.settings.download_images {
            self.fetcher.as_deref()
        } else {
            None
        };
        let mut ctx = CleanContext {
            document,
            target_dir,
            title: &title,
            settings: &self.settings,
            fetcher,
        };
        for pass in PIPELINE {
            engine_debug!("Running pass {}", pass.name());
            if let Err(source) = pass.run(&mut ctx) {
                engine_error!("Cleaning pass {} failed for '{title}': {source}", pass.name());
                return Err(CleanError::Pass {
                    pass: pass.name(),
                    source,
                });
            }
        }
        Ok(ctx.document.to_pretty_html())
    }

    pub fn clean_html(&self, html: &str, target_dir: &Path) -> Result<String, CleanError> {
        let mut document = Document::parse(html);
        self.clean(&mut document, target_dir)
    }
}
