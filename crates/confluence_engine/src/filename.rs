use percent_encoding::percent_decode_str;
use sha2::{Digest, Sha256};
use url::{Position, Url};

const UNTITLED: &str = "untitled";

/// Filesystem-safe name for a page title or breadcrumb label.
///
/// Forbidden characters are dropped, whitespace runs become a single `-`,
/// leading/trailing `-` are trimmed and an empty result becomes `untitled`.
pub fn sanitize_filename(input: &str) -> String {
    let mut cleaned = String::with_capacity(input.len());
    let mut in_whitespace = false;
    for c in input.chars() {
        if c.is_whitespace() {
            if !in_whitespace {
                cleaned.push('-');
            }
            in_whitespace = true;
            continue;
        }
        in_whitespace = false;
        if !is_forbidden(c) {
            cleaned.push(c);
        }
    }
    let mut name = cleaned.trim_matches('-').to_string();
    if name.is_empty() {
        name = UNTITLED.to_string();
    }
    if is_reserved_windows_name(&name) {
        name.push('_');
    }
    name
}

/// Drops a leading `<space>-` from a sanitized page name.
pub fn strip_space_prefix<'a>(name: &'a str, space: &str) -> &'a str {
    if space.is_empty() {
        return name;
    }
    name.strip_prefix(space)
        .and_then(|rest| rest.strip_prefix('-'))
        .filter(|rest| !rest.is_empty())
        .unwrap_or(name)
}

/// Local file name for a downloaded image: `{stem}--{short_hash}.{ext}`, where
/// the stem is the sanitized last path segment (`image` when the URL has none)
/// and the hash covers the URL up to its path.
pub fn image_file_name(url: &Url) -> String {
    let segment = url
        .path_segments()
        .and_then(|mut segments| segments.next_back())
        .unwrap_or_default();
    let decoded = percent_decode_str(segment).decode_utf8_lossy();
    let mut name = sanitize_filename(&decoded);
    if name == UNTITLED {
        name = "image".to_string();
    }
    let hash = short_hash(&url[..Position::AfterPath]);
    match name.rsplit_once('.') {
        Some((stem, extension)) if !stem.is_empty() => format!("{stem}--{hash}.{extension}"),
        _ => format!("{name}--{hash}"),
    }
}

fn short_hash(input: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(input.as_bytes());
    let digest = hasher.finalize();
    let mut hex = String::with_capacity(8);
    for byte in digest.iter().take(4) {
        use std::fmt::Write;
        let _ = write!(&mut hex, "{byte:02x}");
    }
    hex
}

fn is_forbidden(c: char) -> bool {
    matches!(c,
        '\\' | '/' | ':' | '*' | '?' | '"' | '<' | '>' | '|' | '\0'..='\u{1F}'
    )
}

fn is_reserved_windows_name(name: &str) -> bool {
    const RESERVED: &[&str] = &[
        "CON", "PRN", "AUX", "NUL", "COM1", "COM2", "COM3", "COM4", "COM5", "COM6", "COM7", "COM8",
        "COM9", "LPT1", "LPT2", "LPT3", "LPT4", "LPT5", "LPT6", "LPT7", "LPT8", "LPT9",
    ];
    RESERVED.iter().any(|r| r.eq_ignore_ascii_case(name))
}
