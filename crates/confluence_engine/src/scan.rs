use std::io;
use std::path::{Path, PathBuf};

/// `*.html` files in `dir` (and below it when `recursive`), sorted by path.
pub fn html_files(dir: &Path, recursive: bool) -> io::Result<Vec<PathBuf>> {
    files_with_extension(dir, "html", recursive)
}

/// Regular files named `*.<extension>`, sorted by path.
pub fn files_with_extension(
    dir: &Path,
    extension: &str,
    recursive: bool,
) -> io::Result<Vec<PathBuf>> {
    let base = dir
        .to_str()
        .ok_or_else(|| io::Error::new(io::ErrorKind::InvalidInput, "path is not valid UTF-8"))?;
    let depth = if recursive { "**/" } else { "" };
    let pattern = format!(
        "{}/{depth}*.{}",
        glob::Pattern::escape(base),
        glob::Pattern::escape(extension)
    );

    let paths = glob::glob(&pattern)
        .map_err(|err| io::Error::new(io::ErrorKind::InvalidInput, err.to_string()))?;
    let mut files = Vec::new();
    for entry in paths {
        let path = entry.map_err(glob::GlobError::into_error)?;
        if path.is_file() {
            files.push(path);
        }
    }
    files.sort();
    Ok(files)
}
