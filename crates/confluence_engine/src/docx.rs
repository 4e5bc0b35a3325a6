//! DOCX copies of cleaned pages, produced by an external converter.
use std::io;
use std::path::{Path, PathBuf};
use std::process::Command;

use engine_logging::engine_debug;
use thiserror::Error;

pub const DEFAULT_PANDOC: &str = "pandoc";

#[derive(Debug, Error)]
pub enum DocxError {
    #[error("converter `{program}` not found")]
    MissingConverter { program: String },
    #[error("could not run `{program}`: {source}")]
    Spawn {
        program: String,
        #[source]
        source: io::Error,
    },
    #[error("`{program}` exited with {status}: {stderr}")]
    Failed {
        program: String,
        status: String,
        stderr: String,
    },
}

pub trait DocxConverter: Send + Sync {
    fn convert(&self, html_path: &Path, docx_path: &Path) -> Result<(), DocxError>;
}

/// Runs `pandoc <html> -f html -t docx -o <docx>`.
#[derive(Debug, Clone)]
pub struct PandocConverter {
    program: PathBuf,
}

impl Default for PandocConverter {
    fn default() -> Self {
        Self::new(DEFAULT_PANDOC)
    }
}

impl PandocConverter {
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
        }
    }
}

impl DocxConverter for PandocConverter {
    fn convert(&self, html_path: &Path, docx_path: &Path) -> Result<(), DocxError> {
        let program = self.program.display().to_string();
        engine_debug!("{program}: {} -> {}", html_path.display(), docx_path.display());
        let output = Command::new(&self.program)
            .arg(html_path)
            .args(["-f", "html", "-t", "docx", "-o"])
            .arg(docx_path)
            .output()
            .map_err(|source| match source.kind() {
                io::ErrorKind::NotFound => DocxError::MissingConverter {
                    program: program.clone(),
                },
                _ => DocxError::Spawn {
                    program: program.clone(),
                    source,
                },
            })?;
        if !output.status.success() {
            return Err(DocxError::Failed {
                program,
                status: output.status.to_string(),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_program_is_reported_not_panicked() {
        let converter = PandocConverter::new("definitely-not-an-installed-converter");
        let dir = tempfile::tempdir().expect("tempdir");
        let err = converter
            .convert(&dir.path().join("in.html"), &dir.path().join("out.docx"))
            .expect_err("converter is missing");
        assert!(matches!(err, DocxError::MissingConverter { .. }), "{err}");
    }
}
