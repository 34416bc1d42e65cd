//! Standardized filenames and GTD destination paths.
//!
//! Everything here is a pure function of its arguments; callers supply the
//! date and year so results are reproducible.

use crate::{Category, GtdStatus};
use chrono::NaiveDate;
use std::path::Path;

/// Used when a document's stem has no letters or digits at all.
const FALLBACK_SLUG: &str = "document";

/// Lowercase, collapse every run outside `[a-z0-9]` to one hyphen, and trim
/// hyphens from both ends.
///
/// ```
/// assert_eq!(formfile::naming::slugify("My (Special) Form!"), "my-special-form");
/// assert_eq!(formfile::naming::slugify("Blue Cross"), "blue-cross");
/// ```
pub fn slugify(text: &str) -> String {
    let mut slug = String::with_capacity(text.len());
    for c in text.to_lowercase().chars() {
        if c.is_ascii_lowercase() || c.is_ascii_digit() {
            slug.push(c);
        } else if !slug.is_empty() && !slug.ends_with('-') {
            slug.push('-');
        }
    }
    slug.trim_end_matches('-').to_string()
}

/// Capitalize the first letter of every alphabetic run and lowercase the
/// rest: `"car insurance"` → `"Car Insurance"`, `"w-2 forms"` → `"W-2 Forms"`.
pub fn title_case(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut previous_is_letter = false;
    for c in text.chars() {
        if c.is_alphabetic() {
            if previous_is_letter {
                out.extend(c.to_lowercase());
            } else {
                out.extend(c.to_uppercase());
            }
            previous_is_letter = true;
        } else {
            out.push(c);
            previous_is_letter = false;
        }
    }
    out
}

/// `YYYY-MM-DD_<slug>[_<source-slug>].pdf`
///
/// The source part is left out when `source` is absent or slugs to nothing.
pub fn generate_filename(document: &Path, source: Option<&str>, date: NaiveDate) -> String {
    let stem = document
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    let mut slug = slugify(&stem);
    if slug.is_empty() {
        slug = FALLBACK_SLUG.to_string();
    }

    let mut parts = vec![date.format("%Y-%m-%d").to_string(), slug];
    if let Some(source) = source.map(slugify).filter(|s| !s.is_empty()) {
        parts.push(source);
    }
    format!("{}.pdf", parts.join("_"))
}

/// Relative destination of `filename` inside the GTD tree.
///
/// Only `Reference` uses the category (and optional subcategory) plus a year
/// folder; every other status files flat into its base folder. The
/// subcategory always becomes exactly one folder; see [`subcategory_folder`].
pub fn build_destination_path(
    filename: &str,
    category: Category,
    status: GtdStatus,
    subcategory: Option<&str>,
    year: i32,
) -> String {
    let folder = status.folder();
    if status != GtdStatus::Reference {
        return format!("{folder}/{filename}");
    }

    let category = category.title();
    match subcategory.and_then(subcategory_folder) {
        Some(sub) => format!("{folder}/{category}/{sub}/{year}/{filename}"),
        None => format!("{folder}/{category}/{year}/{filename}"),
    }
}

/// Title-cased folder name for a subcategory. Path separators become
/// hyphens and leading or trailing dots are dropped, so the result never
/// adds a level or climbs out of the category. `None` when nothing is left.
pub fn subcategory_folder(subcategory: &str) -> Option<String> {
    let folder: String = title_case(subcategory)
        .chars()
        .map(|c| if matches!(c, '/' | '\\') { '-' } else { c })
        .collect();
    let folder = folder.trim_matches(|c: char| c == '.' || c == '-' || c.is_whitespace());
    (!folder.is_empty()).then(|| folder.to_string())
}

/// Sidecar location for a filed document: the final extension of the last
/// path segment replaced by `.meta.yml` (appended when there is none).
pub fn sidecar_path(dest_path: &str) -> String {
    let name_start = dest_path.rfind('/').map(|i| i + 1).unwrap_or(0);
    let base = match dest_path[name_start..].rfind('.') {
        Some(dot) if dot > 0 => &dest_path[..name_start + dot],
        _ => dest_path,
    };
    format!("{base}.meta.yml")
}
