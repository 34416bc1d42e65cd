//! Audit sidecar generation and (de)serialization.
//!
//! The sidecar is YAML with keys in [`PdfMetadata`] declaration order:
//!
//! ```text
//! original_filename: claim_form.pdf
//! filed_date: 2026-02-27T10:00:00+01:00
//! category: medical
//! subcategory: null
//! source: Blue Cross
//! status: reference
//! …
//! tags:
//! - medical
//! - '2026'
//! - blue-cross
//! ```

use crate::{sensitive, Category, FilingRequest, GtdStatus, PdfMetadata, Result};
use chrono::{DateTime, Datelike, Local};

/// Build the sidecar record for one filing.
///
/// Tags are generated in a fixed order: category, subcategory (if any),
/// four-digit filing year, normalized source (if any), then the request's
/// own tags. Duplicates are kept.
pub fn generate_metadata(
    request: &FilingRequest,
    category: Category,
    status: GtdStatus,
    filed_to: Vec<String>,
    filed_by: &str,
    filed_at: DateTime<Local>,
) -> PdfMetadata {
    let subcategory = request.subcategory.clone().filter(|s| !s.is_empty());
    let source = request.source.clone().filter(|s| !s.is_empty());

    let mut tags = vec![category.as_str().to_string()];
    if let Some(sub) = &subcategory {
        tags.push(sub.clone());
    }
    tags.push(format!("{:04}", filed_at.year()));
    if let Some(src) = &source {
        tags.push(src.to_lowercase().replace(' ', "-"));
    }
    tags.extend(request.tags.iter().cloned());

    let stats = request.fill_stats.unwrap_or_default();

    PdfMetadata {
        original_filename: request
            .document
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default(),
        filed_date: filed_at,
        category,
        subcategory,
        source,
        status,
        follow_up_date: request.follow_up_date,
        fields_filled: stats.fields_filled,
        fields_auto: stats.fields_auto,
        fields_manual: stats.fields_manual,
        sensitive_fields: sensitive::detect_sensitive(&request.fields),
        filed_by: filed_by.to_string(),
        filed_to,
        tags,
    }
}

/// Render the sidecar text.
pub fn to_yaml(metadata: &PdfMetadata) -> Result<String> {
    Ok(serde_yaml::to_string(metadata)?)
}

/// Parse sidecar text back into a record.
pub fn from_yaml(text: &str) -> Result<PdfMetadata> {
    Ok(serde_yaml::from_str(text)?)
}
