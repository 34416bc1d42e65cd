//! Flags form fields whose names suggest personal identifiers.

use crate::PdfField;
use once_cell::sync::Lazy;
use regex::{Regex, RegexBuilder};

/// Patterns matched case-insensitively against normalized field names.
pub const SENSITIVE_PATTERNS: [&str; 11] = [
    r"ss[n_\- ]?(?:number)?",
    r"social.?security",
    r"tax.?id",
    r"ein",
    r"policy.?number",
    r"account.?(?:number|num|no)",
    r"routing.?(?:number|num|no)",
    r"credit.?card",
    r"passport.?(?:number|num|no)",
    r"driver.?license",
    r"dob|date.?of.?birth",
];

static PATTERNS: Lazy<Vec<Regex>> = Lazy::new(|| {
    SENSITIVE_PATTERNS
        .iter()
        .filter_map(|p| match RegexBuilder::new(p).case_insensitive(true).build() {
            Ok(re) => Some(re),
            Err(e) => {
                tracing::error!(pattern = *p, "invalid sensitive-field pattern: {e}");
                None
            }
        })
        .collect()
});

/// Lowercase and turn `_` / `-` into spaces.
fn normalize_name(name: &str) -> String {
    name.to_lowercase().replace(&['_', '-'][..], " ")
}

/// Whether a field name looks like it holds sensitive data.
pub fn is_sensitive(name: &str) -> bool {
    let normalized = normalize_name(name);
    PATTERNS.iter().any(|re| re.is_match(&normalized))
}

/// Names of the fields that look sensitive, in input order, each at most
/// once.
pub fn detect_sensitive(fields: &[PdfField]) -> Vec<String> {
    let mut flagged: Vec<String> = Vec::new();
    for field in fields {
        if is_sensitive(&field.name) && !flagged.contains(&field.name) {
            flagged.push(field.name.clone());
        }
    }
    flagged
}
