//! Run configuration: an optional RON file, overridden by command-line flags.
use std::collections::BTreeMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::time::Duration;

use confluence_engine::{CleanerSettings, FetchSettings, TreeFormat, TreeSettings, DEFAULT_PANDOC};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use url::Url;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {path:?}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("failed to parse config {path:?}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: ron::error::SpannedError,
    },
    #[error("invalid base url `{url}`: {source}")]
    BaseUrl {
        url: String,
        #[source]
        source: url::ParseError,
    },
    #[error("unknown log level `{0}`")]
    LogLevel(String),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HttpConfig {
    pub timeout_secs: u64,
    pub max_retries: u32,
    pub user_agent: Option<String>,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            timeout_secs: 30,
            max_retries: 3,
            user_agent: None,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ImagesConfig {
    pub download: bool,
    pub base_url: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DocumentTreeConfig {
    pub format: TreeFormat,
    pub separator: String,
    pub show_filenames: bool,
}

impl Default for DocumentTreeConfig {
    fn default() -> Self {
        let settings = TreeSettings::default();
        Self {
            format: settings.format,
            separator: settings.separator,
            show_filenames: settings.show_filenames,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub input_directory: Option<PathBuf>,
    pub output_directory: Option<PathBuf>,
    pub create_docx: bool,
    /// Program invoked for DOCX conversion.
    pub docx_converter: PathBuf,
    pub log_level: String,
    pub log_file: Option<PathBuf>,
    pub http: HttpConfig,
    pub images: ImagesConfig,
    pub document_tree: DocumentTreeConfig,
    /// Tag name -> classes allowed to survive cleaning. Not applied yet.
    pub standard_html_classes: BTreeMap<String, Vec<String>>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            input_directory: None,
            output_directory: None,
            create_docx: false,
            docx_converter: PathBuf::from(DEFAULT_PANDOC),
            log_level: "info".to_string(),
            log_file: None,
            http: HttpConfig::default(),
            images: ImagesConfig::default(),
            document_tree: DocumentTreeConfig::default(),
            standard_html_classes: BTreeMap::new(),
        }
    }
}

impl AppConfig {
    /// Reads `path` when given; defaults otherwise.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        match path {
            Some(path) => Self::from_file(path),
            None => Ok(Self::default()),
        }
    }

    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        ron::from_str(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn level_filter(&self) -> Result<log::LevelFilter, ConfigError> {
        engine_logging::parse_level(&self.log_level)
            .ok_or_else(|| ConfigError::LogLevel(self.log_level.clone()))
    }

    pub fn fetch_settings(&self) -> FetchSettings {
        let defaults = FetchSettings::default();
        FetchSettings {
            request_timeout: Duration::from_secs(self.http.timeout_secs),
            max_retries: self.http.max_retries,
            user_agent: self
                .http
                .user_agent
                .clone()
                .unwrap_or(defaults.user_agent.clone()),
            ..defaults
        }
    }

    pub fn cleaner_settings(&self) -> Result<CleanerSettings, ConfigError> {
        let base_url = self
            .images
            .base_url
            .as_deref()
            .map(|url| {
                Url::parse(url).map_err(|source| ConfigError::BaseUrl {
                    url: url.to_string(),
                    source,
                })
            })
            .transpose()?;
        let mut settings = CleanerSettings {
            base_url,
            download_images: self.images.download,
            fetch: self.fetch_settings(),
            ..CleanerSettings::default()
        };
        if let Some(input) = &self.input_directory {
            settings.input_dir = input.clone();
        }
        Ok(settings)
    }

    pub fn tree_settings(&self) -> TreeSettings {
        TreeSettings {
            format: self.document_tree.format,
            separator: self.document_tree.separator.clone(),
            show_filenames: self.document_tree.show_filenames,
        }
    }
}
