//! Emoji, image and link rewriting.
use std::env;
use std::path::Path;

use engine_logging::{engine_debug, engine_warn};
use url::Url;

use super::vendor::is_vendor_class;
use super::{CleanContext, Pass, PassError};
use crate::dom::{Document, Element, NodeId};
use crate::filename::image_file_name;
use crate::persist::AtomicFileWriter;

const IMAGE_ATTRS: &[&str] = &["src", "alt", "title", "width", "height", "style"];
const VENDOR_MARKER: &str = "confluence";
const PEOPLE_MARKER: &str = "people";
/// Subdirectory of the target directory that receives downloaded images.
pub(crate) const IMAGE_DIR: &str = "img";

pub(crate) struct EmojiNormalization;

impl Pass for EmojiNormalization {
    fn name(&self) -> &'static str {
        "emoji-normalization"
    }

    fn run(&self, ctx: &mut CleanContext<'_>) -> Result<(), PassError> {
        let doc = &mut *ctx.document;
        for emoji in doc.find_all(|el| el.is("img") && el.has_class("emoticon")) {
            let Some(element) = doc.element(emoji) else {
                continue;
            };
            match emoji_text(element) {
                Some(text) => {
                    let node = doc.create_text(text);
                    doc.replace(emoji, node);
                }
                None => doc.remove(emoji),
            }
        }
        Ok(())
    }
}

/// Literal fallback first, `:shortname:` second.
fn emoji_text(element: &Element) -> Option<String> {
    if let Some(fallback) = element.attr("data-emoji-fallback").filter(|f| !f.is_empty()) {
        return Some(fallback.to_string());
    }
    element
        .attr("data-emoji-shortname")
        .map(|name| name.trim_matches(':'))
        .filter(|name| !name.is_empty())
        .map(|name| format!(":{name}:"))
}

pub(crate) struct ImageNormalization;

impl Pass for ImageNormalization {
    fn name(&self) -> &'static str {
        "image-normalization"
    }

    fn run(&self, ctx: &mut CleanContext<'_>) -> Result<(), PassError> {
        let base = ctx
            .settings
            .base_url
            .clone()
            .or_else(|| document_base(ctx.document));
        for image in ctx.document.find_all(|el| el.is("img")) {
            if let Err(err) = normalize_image(ctx, image, base.as_ref()) {
                engine_warn!("Skipping image in '{}': {err}", ctx.title);
            }
        }
        Ok(())
    }
}

fn normalize_image(
    ctx: &mut CleanContext<'_>,
    image: NodeId,
    base: Option<&Url>,
) -> Result<(), PassError> {
    let src = ctx
        .document
        .update_element(image, |el| {
            el.retain_attrs(|name| IMAGE_ATTRS.contains(&name));
            if !el.has_attr("alt") {
                el.set_attr("alt", "");
            }
            if el.attr("style").is_some_and(|style| style.contains(VENDOR_MARKER)) {
                el.remove_attr("style");
            }
            el.attr("src").map(str::to_string)
        })
        .flatten();
    let Some(src) = src.filter(|src| !src.trim().is_empty()) else {
        return Ok(());
    };

    let mut new_src = strip_query(src.trim());
    if !is_localized(&new_src, ctx.target_dir) {
        new_src = resolve_src(&new_src, base, &ctx.settings.input_dir)?;
        if let Some(local) = download(ctx, &new_src) {
            new_src = local;
        }
    }
    if new_src != src {
        engine_debug!("Image src {src} -> {new_src}");
        ctx.document.update_element(image, |el| el.set_attr("src", new_src));
    }
    Ok(())
}

/// `src` without query string or fragment.
fn strip_query(src: &str) -> String {
    if let Ok(mut url) = Url::parse(src) {
        url.set_query(None);
        url.set_fragment(None);
        return url.to_string();
    }
    let end = src.find(['?', '#']).unwrap_or(src.len());
    src[..end].to_string()
}

fn is_absolute(src: &str) -> bool {
    src.starts_with('/') || Url::parse(src).is_ok()
}

/// A previous run already stored this image next to the page.
fn is_localized(src: &str, target_dir: &Path) -> bool {
    src.starts_with(&format!("{IMAGE_DIR}/")) && target_dir.join(src).is_file()
}

/// Absolute sources pass through. Relative ones resolve against `base`, or
/// failing that against `<cwd>/<input_dir>`; the latter depends on where the
/// process was started.
fn resolve_src(src: &str, base: Option<&Url>, input_dir: &Path) -> Result<String, PassError> {
    if is_absolute(src) {
        return Ok(src.to_string());
    }
    if let Some(base) = base {
        return Ok(base.join(src)?.to_string());
    }
    let path = env::current_dir()?.join(input_dir).join(src);
    Ok(path.to_string_lossy().into_owned())
}

/// Absolute `<base href>`, if the page declares one.
fn document_base(doc: &Document) -> Option<Url> {
    let base = doc.find_first(|el| el.is("base") && el.has_attr("href"))?;
    let href = doc.element(base)?.attr("href")?;
    Url::parse(href).ok()
}

/// Fetches a remote image into `<target_dir>/img/`. Failures are logged and
/// leave the source untouched.
fn download(ctx: &CleanContext<'_>, src: &str) -> Option<String> {
    let fetcher = ctx.fetcher?;
    let url = Url::parse(src).ok()?;
    if !matches!(url.scheme(), "http" | "https") {
        return None;
    }
    let stored = fetcher.fetch(&url).map_err(PassError::from).and_then(|image| {
        let name = image_file_name(&url);
        AtomicFileWriter::new(ctx.target_dir.join(IMAGE_DIR)).write_bytes(&name, &image.bytes)?;
        Ok(format!("{IMAGE_DIR}/{name}"))
    });
    match stored {
        Ok(local) => Some(local),
        Err(err) => {
            engine_warn!("Keeping remote image {url}: {err}");
            None
        }
    }
}

pub(crate) struct LinkNormalization;

impl Pass for LinkNormalization {
    fn name(&self) -> &'static str {
        "link-normalization"
    }

    fn run(&self, ctx: &mut CleanContext<'_>) -> Result<(), PassError> {
        let doc = &mut *ctx.document;
        for link in doc.find_all(|el| el.is("a")) {
            if !doc.is_attached(link) {
                continue;
            }
            let is_profile_link = doc
                .update_element(link, |el| {
                    el.retain_attrs(|name| !name.starts_with("on"));
                    let href = el.attr("href").unwrap_or_default().to_string();
                    if href.trim_start().to_ascii_lowercase().starts_with("javascript:") {
                        el.remove_attr("href");
                        false
                    } else {
                        href.contains(VENDOR_MARKER) && href.contains(PEOPLE_MARKER)
                    }
                })
                .unwrap_or(false);
            if is_profile_link {
                let text = doc.text_content(link);
                let node = doc.create_text(text);
                doc.replace(link, node);
                continue;
            }
            doc.update_element(link, |el| el.retain_classes(|class| !is_vendor_class(class)));
        }
        Ok(())
    }
}
