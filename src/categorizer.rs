//! Keyword-based document categorization.
//!
//! Each category owns a curated list of phrases. A document's score for a
//! category is the number of those phrases that appear anywhere in its text
//! (filename plus field names and values). The highest score wins; ties go
//! to the category listed first in [`CATEGORY_KEYWORDS`].

use crate::{Category, PdfField};
use std::path::Path;

/// Keyword table in tie-break order.
pub const CATEGORY_KEYWORDS: [(Category, &[&str]); 7] = [
    (
        Category::Medical,
        &[
            "insurance", "doctor", "hospital", "pharmacy", "health",
            "medical", "patient", "diagnosis", "prescription", "clinic",
            "dental", "vision", "therapy", "copay", "deductible",
            "blue cross", "aetna", "cigna", "united health", "kaiser",
        ],
    ),
    (
        Category::Financial,
        &[
            "tax", "bank", "loan", "credit", "investment", "1099",
            "w-2", "w2", "irs", "income", "deposit", "withdrawal",
            "mortgage", "interest", "dividend", "portfolio", "401k",
            "savings", "checking", "routing", "account number",
        ],
    ),
    (
        Category::Legal,
        &[
            "contract", "agreement", "court", "attorney", "will",
            "power of attorney", "notary", "affidavit", "deposition",
            "settlement", "lawsuit", "arbitration", "legal",
        ],
    ),
    (
        Category::Housing,
        &[
            "lease", "rent", "mortgage", "utility", "hoa",
            "landlord", "tenant", "property", "electric", "gas",
            "water", "sewer", "maintenance", "inspection",
        ],
    ),
    (
        Category::Vehicle,
        &[
            "dmv", "registration", "title", "vin", "odometer",
            "vehicle", "auto", "car", "truck", "motorcycle",
            "license plate", "emission", "smog",
        ],
    ),
    (
        Category::Government,
        &[
            "irs", "ssa", "passport", "visa", "license",
            "social security", "citizenship", "immigration",
            "permit", "census", "voter", "selective service",
        ],
    ),
    (
        Category::Personal,
        &[
            "school", "employment", "certificate", "resume",
            "transcript", "diploma", "birth", "marriage", "death",
            "adoption", "membership",
        ],
    ),
];

/// Lowercased text the categorizer scores: the file stem with `_` and `-`
/// turned into spaces, then each field name and each non-empty value.
pub fn document_text(document: &Path, fields: &[PdfField]) -> String {
    let stem = document
        .file_stem()
        .map(|s| s.to_string_lossy().to_lowercase())
        .unwrap_or_default()
        .replace(&['_', '-'][..], " ");

    let mut parts = vec![stem];
    for field in fields {
        parts.push(field.name.to_lowercase());
        if let Some(value) = field.value.as_deref().filter(|v| !v.is_empty()) {
            parts.push(value.to_lowercase());
        }
    }
    parts.join(" ")
}

/// Per-category score: how many of the category's keywords occur in `text`.
pub fn scores(text: &str) -> Vec<(Category, usize)> {
    CATEGORY_KEYWORDS
        .iter()
        .map(|(category, keywords)| {
            let hits = keywords.iter().filter(|kw| text.contains(**kw)).count();
            (*category, hits)
        })
        .collect()
}

/// Pick the best category for `text`; `Uncategorized` when nothing matches.
pub fn categorize_text(text: &str) -> Category {
    let mut best = (Category::Uncategorized, 0);
    for (category, score) in scores(text) {
        if score > best.1 {
            best = (category, score);
        }
    }
    best.0
}

/// Categorize a document from its filename and (optionally) its fields.
pub fn categorize(document: &Path, fields: &[PdfField]) -> Category {
    let text = document_text(document, fields);
    let category = categorize_text(&text);
    tracing::debug!(document = %document.display(), %category, "categorized");
    category
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_keywords_is_uncategorized() {
        assert_eq!(categorize_text("document xyz"), Category::Uncategorized);
        assert_eq!(categorize_text(""), Category::Uncategorized);
    }

    #[test]
    fn tie_goes_to_earlier_category() {
        // one medical hit, one financial hit
        assert_eq!(categorize_text("doctor bank"), Category::Medical);
        // "mortgage" scores for both financial and housing
        assert_eq!(categorize_text("mortgage"), Category::Financial);
        // one vehicle hit, one government hit
        assert_eq!(categorize_text("dmv passport"), Category::Vehicle);
    }

    #[test]
    fn repeated_keyword_counts_once() {
        let text = "tax tax tax doctor hospital";
        assert_eq!(categorize_text(text), Category::Medical);
    }

    #[test]
    fn adding_a_keyword_never_lowers_a_score() {
        let before = scores("lease agreement");
        let after = scores("lease agreement tenant");
        for ((c1, s1), (c2, s2)) in before.iter().zip(after.iter()) {
            assert_eq!(c1, c2);
            assert!(s2 >= s1);
        }
    }

    #[test]
    fn text_uses_stem_and_fields() {
        let fields = vec![
            PdfField::new("Patient_Name"),
            PdfField::new("plan").with_value("Blue Cross"),
            PdfField::new("empty").with_value(""),
        ];
        let text = document_text(Path::new("/tmp/My-Claim_Form.pdf"), &fields);
        assert_eq!(text, "my claim form patient_name plan blue cross empty");
    }
}
