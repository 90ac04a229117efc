//! Identity and filename helpers shared by the pipeline stages.
use once_cell::sync::Lazy;
use regex::Regex;
use std::path::{Path, PathBuf};
use unicode_normalization::char::is_combining_mark;
use unicode_normalization::UnicodeNormalization;

/// Suffix marking an optimised, upload-ready image.
pub const WEB_SUFFIX: &str = "_web.jpg";
pub const FALLBACK_ENTITY_ID: &str = "unnamed_film";
pub const MAX_SLUG_LEN: usize = 50;

static DISALLOWED: Lazy<Regex> = Lazy::new(|| Regex::new(r#"[<>:"/\\|?*]"#).unwrap());
static WHITESPACE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").unwrap());
static NON_SLUG: Lazy<Regex> = Lazy::new(|| Regex::new(r"[^a-z0-9]+").unwrap());

/// Turn an entity title into a filesystem-safe token that doubles as its
/// persistent id.
pub fn sanitize_entity_id(title: &str) -> String {
    let replaced = DISALLOWED.replace_all(title, "_");
    let trimmed = replaced.trim().trim_matches('.');
    let collapsed = WHITESPACE.replace_all(trimmed, " ");
    if collapsed.is_empty() {
        FALLBACK_ENTITY_ID.to_string()
    } else {
        collapsed.into_owned()
    }
}

/// A single remote name made safe to use as one local path component:
/// separators become `_` and dot-only names are replaced, so the result
/// can never climb out of the directory it is joined onto.
pub fn path_segment(name: &str) -> String {
    let flattened: String = name
        .chars()
        .map(|c| if c == '/' || c == '\\' || c == '\0' { '_' } else { c })
        .collect();
    match flattened.trim() {
        "" | "." | ".." => "_".to_string(),
        _ => flattened,
    }
}

/// Fold accents, lowercase and hyphenate. The result is at most
/// [`MAX_SLUG_LEN`] ASCII characters with no leading or trailing hyphen.
pub fn slugify(text: &str) -> String {
    let folded: String = text.nfd().filter(|c| !is_combining_mark(*c)).collect();
    let lowered = folded.to_lowercase();
    let hyphenated = NON_SLUG.replace_all(&lowered, "-");
    let mut slug: String = hyphenated.trim_matches('-').chars().take(MAX_SLUG_LEN).collect();
    while slug.ends_with('-') {
        slug.pop();
    }
    slug
}

/// Slug for a post built from its title, section and year. The placeholder
/// title is left out so untitled rows don't all share one prefix.
pub fn post_slug(title: &str, section: &str, year: &str) -> String {
    let parts: Vec<&str> = [
        if title == FALLBACK_ENTITY_ID { "" } else { title },
        section,
        year,
    ]
    .into_iter()
    .filter(|p| !p.trim().is_empty())
    .collect();
    if parts.is_empty() {
        return slugify(FALLBACK_ENTITY_ID);
    }
    slugify(&parts.join(" "))
}

pub fn is_web_ready(file_name: &str) -> bool {
    file_name.to_lowercase().ends_with(WEB_SUFFIX)
}

/// `stills/a.png` → `stills/a_web.jpg`
pub fn optimized_path(original: &Path) -> PathBuf {
    let stem = original
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    original.with_file_name(format!("{}{}", stem, WEB_SUFFIX))
}

/// File name without the web suffix, case preserved.
pub fn strip_web_suffix(file_name: &str) -> &str {
    let cut = file_name.len().saturating_sub(WEB_SUFFIX.len());
    if is_web_ready(file_name) && file_name.is_char_boundary(cut) {
        &file_name[..cut]
    } else {
        file_name
    }
}

/// Lowercased key used to line media up with Drive files: web suffix and
/// extension removed.
pub fn match_key(file_name: &str) -> String {
    let lowered = file_name.to_lowercase();
    let base = lowered.strip_suffix(WEB_SUFFIX).unwrap_or(&lowered);
    match base.rfind('.') {
        Some(dot) => base[..dot].to_string(),
        None => base.to_string(),
    }
}

/// Last URL path segment keyed like [`match_key`]: lowercased, with the web
/// suffix and extension removed.
pub fn url_stem(url: &str) -> String {
    match_key(url.rsplit('/').next().unwrap_or_default())
}
