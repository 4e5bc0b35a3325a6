//! Turns an export directory into a cleaned, breadcrumb-nested document set.
//!
//! The first top-level page names the space; every page then lands in
//! `<output>/<space>/<breadcrumbs[1..]>/<title>.html`. Resource folders are
//! copied alongside, pages are cleaned one at a time, and a page that fails
//! is counted and logged without stopping the run.
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use engine_logging::{engine_debug, engine_error, engine_info, engine_warn};
use thiserror::Error;

use crate::cleaner::{CleanError, CleanerSettings, HtmlCleaner};
use crate::decode::{decode_html, DecodeError};
use crate::docx::{DocxConverter, DocxError, PandocConverter};
use crate::dom::Document;
use crate::extract::{parenthesized_text, BreadcrumbExtractor, Extractor};
use crate::filename::{sanitize_filename, strip_space_prefix};
use crate::persist::{copy_dir_recursive, ensure_output_dir, AtomicFileWriter, PersistError};
use crate::scan::{files_with_extension, html_files};

/// Folders of the export copied verbatim next to the cleaned pages.
pub const RESOURCE_FOLDERS: &[&str] = &["attachments", "images", "styles", "img"];
const ORGANIZED_EXTENSIONS: &[&str] = &["html", "docx"];

#[derive(Debug, Clone)]
pub struct ProcessorConfig {
    pub input_dir: PathBuf,
    pub output_dir: PathBuf,
    pub create_docx: bool,
    /// Compute and log everything, write nothing.
    pub dry_run: bool,
    pub cleaner: CleanerSettings,
}

impl ProcessorConfig {
    pub fn new(input_dir: impl Into<PathBuf>, output_dir: impl Into<PathBuf>) -> Self {
        Self {
            input_dir: input_dir.into(),
            output_dir: output_dir.into(),
            create_docx: false,
            dry_run: false,
            cleaner: CleanerSettings::default(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProcessingStats {
    pub total_input_files: usize,
    pub processed_files: usize,
    pub failed_files: usize,
    pub created_docx: usize,
    pub errors: Vec<String>,
    pub files_not_processed: usize,
}

#[derive(Debug, Error)]
pub enum ProcessError {
    #[error("input directory not found: {0}")]
    InputMissing(PathBuf),
    #[error("input path is not a directory: {0}")]
    NotADirectory(PathBuf),
    #[error("no HTML files found in {0}")]
    NoHtmlFiles(PathBuf),
    #[error("no breadcrumbs or space name in title found in {0}")]
    NoSpaceName(PathBuf),
    #[error("no breadcrumbs found")]
    NoBreadcrumbs,
    #[error("io error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error(transparent)]
    Persist(#[from] PersistError),
    #[error("could not decode {path}: {source}")]
    Decode {
        path: PathBuf,
        #[source]
        source: DecodeError,
    },
    #[error(transparent)]
    Clean(#[from] CleanError),
    #[error("DOCX conversion failed: {0}")]
    Docx(#[from] DocxError),
}

fn io_error(path: &Path) -> impl FnOnce(io::Error) -> ProcessError + '_ {
    move |source| ProcessError::Io {
        path: path.to_path_buf(),
        source,
    }
}

/// Where the space's pages go.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpaceLayout {
    pub base_dir: PathBuf,
    /// Sanitized space name, also stripped from page file names.
    pub space_name: String,
}

/// What happened to one page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileOutcome {
    pub html_path: PathBuf,
    pub docx_path: Option<PathBuf>,
}

pub struct FileProcessor {
    config: ProcessorConfig,
    cleaner: HtmlCleaner,
    extractor: Box<dyn Extractor>,
    converter: Box<dyn DocxConverter>,
    stats: ProcessingStats,
}

impl FileProcessor {
    /// Validates the input directory and creates the output directory.
    pub fn new(config: ProcessorConfig) -> Result<Self, ProcessError> {
        if !config.input_dir.exists() {
            return Err(ProcessError::InputMissing(config.input_dir.clone()));
        }
        if !config.input_dir.is_dir() {
            return Err(ProcessError::NotADirectory(config.input_dir.clone()));
        }
        if !config.dry_run {
            ensure_output_dir(&config.output_dir)?;
        }

        let mut cleaner_settings = config.cleaner.clone();
        if config.dry_run {
            cleaner_settings.download_images = false;
        }
        Ok(Self {
            cleaner: HtmlCleaner::new(cleaner_settings),
            extractor: Box::new(BreadcrumbExtractor),
            converter: Box::new(PandocConverter::default()),
            stats: ProcessingStats::default(),
            config,
        })
    }

    pub fn with_converter(mut self, converter: Box<dyn DocxConverter>) -> Self {
        self.converter = converter;
        self
    }

    /// Processes the whole export. Setup problems abort the run; individual
    /// pages that fail are recorded in the returned statistics.
    pub fn process_files(&mut self) -> Result<ProcessingStats, ProcessError> {
        let files = html_files(&self.config.input_dir, true)
            .map_err(io_error(&self.config.input_dir))?;
        self.stats.total_input_files = files.len();
        engine_info!("Found {} HTML files to process", files.len());

        let layout = match self.setup_directory_structure() {
            Ok(layout) => layout,
            Err(err) => {
                engine_error!("Failed to process files: {err}");
                self.stats.errors.push(err.to_string());
                return Err(err);
            }
        };
        engine_info!("Created directory structure at: {}", layout.base_dir.display());

        for file in &files {
            let relative = file.strip_prefix(&self.config.input_dir).unwrap_or(file);
            match self.process_file(file, &layout) {
                Ok(outcome) => {
                    self.stats.processed_files += 1;
                    if outcome.docx_path.is_some() {
                        self.stats.created_docx += 1;
                    }
                    engine_info!(
                        "Processed {} -> {}",
                        relative.display(),
                        outcome.html_path.display()
                    );
                }
                Err(err) => {
                    self.stats.failed_files += 1;
                    self.stats
                        .errors
                        .push(format!("Error processing {}: {err}", file.display()));
                    engine_error!("Failed to process {}: {err}", relative.display());
                }
            }
        }

        if !self.config.dry_run {
            organize_duplicates(&layout.base_dir);
        }

        let accounted = self.stats.processed_files + self.stats.failed_files;
        self.stats.files_not_processed = self.stats.total_input_files.saturating_sub(accounted);
        if self.stats.files_not_processed > 0 {
            let message = format!(
                "Discrepancy found: {} files were not processed",
                self.stats.files_not_processed
            );
            engine_error!("{message}");
            self.stats.errors.push(message);
        }
        self.log_stats();
        Ok(self.stats.clone())
    }

    /// Names the space from the first top-level page and prepares
    /// `<output>/<space>` with a fresh copy of the resource folders.
    pub fn setup_directory_structure(&self) -> Result<SpaceLayout, ProcessError> {
        let input_dir = &self.config.input_dir;
        let top_level = html_files(input_dir, false).map_err(io_error(input_dir))?;
        let first = top_level
            .first()
            .ok_or_else(|| ProcessError::NoHtmlFiles(input_dir.clone()))?;

        let document = read_document(first)?;
        let info = self.extractor.extract(&document);
        let space_name = info
            .space_name()
            .map(str::to_string)
            .or_else(|| {
                raw_title(&document)
                    .and_then(|title| parenthesized_text(&title).map(str::to_string))
            })
            .ok_or_else(|| ProcessError::NoSpaceName(first.clone()))?;
        let space_name = sanitize_filename(&space_name);
        let base_dir = self.config.output_dir.join(&space_name);

        if self.config.dry_run {
            engine_info!("[dry run] would recreate {}", base_dir.display());
        } else {
            if base_dir.exists() {
                fs::remove_dir_all(&base_dir).map_err(io_error(&base_dir))?;
            }
            fs::create_dir_all(&base_dir).map_err(io_error(&base_dir))?;
            self.copy_resource_folders(&base_dir)?;
        }
        Ok(SpaceLayout {
            base_dir,
            space_name,
        })
    }

    fn copy_resource_folders(&self, base_dir: &Path) -> Result<(), ProcessError> {
        for folder in RESOURCE_FOLDERS {
            let source = self.config.input_dir.join(folder);
            if source.is_dir() {
                let copied = copy_dir_recursive(&source, &base_dir.join(folder))?;
                engine_debug!("Copied resource folder {folder} ({copied} files)");
            }
        }
        Ok(())
    }

    /// Cleans one page into its breadcrumb directory.
    pub fn process_file(
        &self,
        file: &Path,
        layout: &SpaceLayout,
    ) -> Result<FileOutcome, ProcessError> {
        let mut document = read_document(file)?;
        let info = self.extractor.extract(&document);
        let breadcrumbs: Vec<String> = info
            .breadcrumbs
            .iter()
            .map(|crumb| sanitize_filename(crumb))
            .collect();
        if breadcrumbs.is_empty() {
            return Err(ProcessError::NoBreadcrumbs);
        }

        let target_dir = breadcrumbs
            .iter()
            .skip(1)
            .fold(layout.base_dir.clone(), |dir, crumb| dir.join(crumb));
        let file_name = page_file_name(&document, file, &layout.space_name);
        let html_path = target_dir.join(&file_name);

        if self.config.dry_run {
            self.cleaner.clean(&mut document, &target_dir)?;
            engine_info!("[dry run] would write {}", html_path.display());
            return Ok(FileOutcome {
                html_path,
                docx_path: None,
            });
        }

        fs::create_dir_all(&target_dir).map_err(io_error(&target_dir))?;
        let cleaned = self.cleaner.clean(&mut document, &target_dir)?;
        let html_path = AtomicFileWriter::new(target_dir.clone()).write(&file_name, &cleaned)?;

        let docx_path = if self.config.create_docx {
            let docx_path = html_path.with_extension("docx");
            self.converter.convert(&html_path, &docx_path)?;
            Some(docx_path)
        } else {
            None
        };
        Ok(FileOutcome {
            html_path,
            docx_path,
        })
    }

    fn log_stats(&self) {
        let stats = &self.stats;
        engine_info!(
            "Processing complete: {} total, {} processed, {} failed, {} DOCX created, {} not processed",
            stats.total_input_files,
            stats.processed_files,
            stats.failed_files,
            stats.created_docx,
            stats.files_not_processed
        );
        if !stats.errors.is_empty() {
            engine_warn!("{} errors recorded during processing", stats.errors.len());
        }
    }
}

fn read_document(path: &Path) -> Result<Document, ProcessError> {
    let bytes = fs::read(path).map_err(io_error(path))?;
    let decoded = decode_html(&bytes).map_err(|source| ProcessError::Decode {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(Document::parse(&decoded.html))
}

/// Trimmed `<title>` text, `None` when missing or blank.
fn raw_title(document: &Document) -> Option<String> {
    document
        .find_first(|element| element.is("title"))
        .map(|title| document.text_content(title).trim().to_string())
        .filter(|title| !title.is_empty())
}

/// Sanitized title without the `<space>-` prefix, or the file stem for
/// untitled pages, plus `.html`.
pub fn page_file_name(document: &Document, file: &Path, space_name: &str) -> String {
    let name = match raw_title(document) {
        Some(title) => sanitize_filename(&title),
        None => file
            .file_stem()
            .map(|stem| stem.to_string_lossy().into_owned())
            .unwrap_or_default(),
    };
    format!("{}.html", strip_space_prefix(&name, space_name))
}

/// Moves `X.html` / `X.docx` into a sibling directory `X/` when one exists.
pub fn organize_duplicates(base_dir: &Path) {
    for extension in ORGANIZED_EXTENSIONS {
        let files = match files_with_extension(base_dir, extension, true) {
            Ok(files) => files,
            Err(err) => {
                engine_error!("Error scanning {}: {err}", base_dir.display());
                continue;
            }
        };
        for file in files {
            let (Some(parent), Some(stem), Some(name)) =
                (file.parent(), file.file_stem(), file.file_name())
            else {
                continue;
            };
            let folder = parent.join(stem);
            if !folder.is_dir() {
                continue;
            }
            let destination = folder.join(name);
            match fs::rename(&file, &destination) {
                Ok(()) => engine_debug!("Moved {} to {}", file.display(), destination.display()),
                Err(err) => engine_error!("Error organizing {}: {err}", file.display()),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn page_file_name_strips_space_prefix() {
        let document = Document::parse("<title>Eng Onboarding guide</title>");
        let name = page_file_name(&document, Path::new("123.html"), "Eng");
        assert_eq!(name, "Onboarding-guide.html");
    }

    #[test]
    fn page_file_name_falls_back_to_stem() {
        let document = Document::parse("<p>no title</p>");
        assert_eq!(
            page_file_name(&document, Path::new("dir/98765.html"), "Eng"),
            "98765.html"
        );
    }

    #[test]
    fn missing_input_is_fatal() {
        let dir = tempfile::tempdir().expect("tempdir");
        let config = ProcessorConfig::new(dir.path().join("nope"), dir.path().join("out"));
        assert!(matches!(
            FileProcessor::new(config),
            Err(ProcessError::InputMissing(_))
        ));
    }
}
