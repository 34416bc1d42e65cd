use chrono::{DateTime, Local, NaiveDate};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;
use thiserror::Error;

// ── PdfField ─────────────────────────────────────────────────────────────────

/// Kind of interactive form field, as declared by the field's `/FT` entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldType {
    #[default]
    Text,
    Checkbox,
    Radio,
    Dropdown,
    Signature,
    Unknown,
}

impl FieldType {
    pub fn as_str(self) -> &'static str {
        match self {
            FieldType::Text => "text",
            FieldType::Checkbox => "checkbox",
            FieldType::Radio => "radio",
            FieldType::Dropdown => "dropdown",
            FieldType::Signature => "signature",
            FieldType::Unknown => "unknown",
        }
    }
}

impl fmt::Display for FieldType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single form field read from a PDF's AcroForm.
///
/// Returned by [`crate::PdfForm::extract_fields`]. The categorizer and the
/// sensitive-field detector only ever read these.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PdfField {
    /// Fully-qualified field name (partial names joined with `.`), unique
    /// within a document.
    pub name: String,

    /// Declared field type.
    pub field_type: FieldType,

    /// Current value, if the field has one.
    pub value: Option<String>,

    /// Choices for dropdown and radio fields; empty for every other type.
    pub options: Vec<String>,

    /// Zero-based index of the page the field's first widget sits on.
    pub page: usize,

    /// Whether the field carries the "required" flag.
    pub required: bool,
}

impl PdfField {
    /// A text field with no value on page 0.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            field_type: FieldType::Text,
            value: None,
            options: Vec::new(),
            page: 0,
            required: false,
        }
    }

    pub fn with_value(mut self, value: impl Into<String>) -> Self {
        self.value = Some(value.into());
        self
    }

    pub fn with_type(mut self, field_type: FieldType) -> Self {
        self.field_type = field_type;
        self
    }
}

/// Result of extracting the fields of one document.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExtractionResult {
    /// Base filename of the source document.
    pub filename: String,
    pub total_fields: usize,
    pub fields: Vec<PdfField>,
}

/// Result of filling a form from a profile.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FillResult {
    pub output_path: PathBuf,
    /// Fields whose normalized name matched a profile key.
    pub fields_filled: usize,
    /// Fields with no matching profile key.
    pub fields_skipped: usize,
    pub fields_total: usize,
}

/// Fill counters recorded in the metadata sidecar.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FillStats {
    pub fields_filled: usize,
    pub fields_auto: usize,
    pub fields_manual: usize,
}

impl From<&FillResult> for FillStats {
    /// Every field filled from a profile counts as auto-filled.
    fn from(result: &FillResult) -> Self {
        Self {
            fields_filled: result.fields_filled,
            fields_auto: result.fields_filled,
            fields_manual: 0,
        }
    }
}

// ── Labels ───────────────────────────────────────────────────────────────────

/// Returned when a category or status label is not recognised.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("unknown {kind} '{value}' (expected one of: {expected})")]
pub struct ParseLabelError {
    pub kind: &'static str,
    pub value: String,
    pub expected: String,
}

/// Filing category. Only affects folder placement for
/// [`GtdStatus::Reference`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Medical,
    Financial,
    Legal,
    Housing,
    Vehicle,
    Government,
    Personal,
    Uncategorized,
}

impl Category {
    /// Every category, in scoring (and tie-break) order, followed by
    /// `Uncategorized`.
    pub const ALL: [Category; 8] = [
        Category::Medical,
        Category::Financial,
        Category::Legal,
        Category::Housing,
        Category::Vehicle,
        Category::Government,
        Category::Personal,
        Category::Uncategorized,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Category::Medical => "medical",
            Category::Financial => "financial",
            Category::Legal => "legal",
            Category::Housing => "housing",
            Category::Vehicle => "vehicle",
            Category::Government => "government",
            Category::Personal => "personal",
            Category::Uncategorized => "uncategorized",
        }
    }

    /// Folder name used under `@Reference/`.
    pub fn title(self) -> String {
        crate::naming::title_case(self.as_str())
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Category {
    type Err = ParseLabelError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let wanted = s.trim().to_lowercase();
        Category::ALL
            .into_iter()
            .find(|c| c.as_str() == wanted)
            .ok_or_else(|| ParseLabelError {
                kind: "category",
                value: s.to_string(),
                expected: Category::ALL.map(Category::as_str).join(", "),
            })
    }
}

/// GTD workflow status; decides the top-level folder.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum GtdStatus {
    Inbox,
    Action,
    WaitingFor,
    #[default]
    Reference,
    Project,
    Archive,
}

impl GtdStatus {
    pub const ALL: [GtdStatus; 6] = [
        GtdStatus::Inbox,
        GtdStatus::Action,
        GtdStatus::WaitingFor,
        GtdStatus::Reference,
        GtdStatus::Project,
        GtdStatus::Archive,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            GtdStatus::Inbox => "inbox",
            GtdStatus::Action => "action",
            GtdStatus::WaitingFor => "waiting-for",
            GtdStatus::Reference => "reference",
            GtdStatus::Project => "project",
            GtdStatus::Archive => "archive",
        }
    }

    /// Base folder for this status.
    pub fn folder(self) -> &'static str {
        match self {
            GtdStatus::Inbox => "@Inbox",
            GtdStatus::Action => "@Action/Next-Actions",
            GtdStatus::WaitingFor => "@Action/Waiting-For",
            GtdStatus::Reference => "@Reference",
            GtdStatus::Project => "@Projects",
            GtdStatus::Archive => "@Archive",
        }
    }

    /// Parse a status label, falling back to `Reference` for anything
    /// unrecognised.
    pub fn parse_lenient(s: &str) -> Self {
        s.parse().unwrap_or_else(|e: ParseLabelError| {
            tracing::warn!("{e}; filing as reference");
            GtdStatus::Reference
        })
    }
}

impl fmt::Display for GtdStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for GtdStatus {
    type Err = ParseLabelError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let wanted = s.trim().to_lowercase();
        GtdStatus::ALL
            .into_iter()
            .find(|st| st.as_str() == wanted)
            .ok_or_else(|| ParseLabelError {
                kind: "status",
                value: s.to_string(),
                expected: GtdStatus::ALL.map(GtdStatus::as_str).join(", "),
            })
    }
}

// ── Filing ───────────────────────────────────────────────────────────────────

/// Everything the caller can say about a document being filed.
///
/// ```
/// use formfile::{FilingRequest, GtdStatus};
///
/// let req = FilingRequest {
///     status: GtdStatus::WaitingFor,
///     tags: vec!["claim".into()],
///     ..FilingRequest::new("claim.pdf")
/// };
/// assert!(req.category.is_none());
/// ```
#[derive(Debug, Clone, Default)]
pub struct FilingRequest {
    pub document: PathBuf,
    /// Category override; detected from filename and fields when `None`.
    pub category: Option<Category>,
    pub status: GtdStatus,
    /// Issuer of the document (e.g. `"Blue Cross"`).
    pub source: Option<String>,
    pub subcategory: Option<String>,
    /// Extracted fields, used for categorization and sensitive-field flags.
    pub fields: Vec<PdfField>,
    pub fill_stats: Option<FillStats>,
    pub follow_up_date: Option<NaiveDate>,
    /// Extra tags appended after the generated ones.
    pub tags: Vec<String>,
}

impl FilingRequest {
    pub fn new(document: impl Into<PathBuf>) -> Self {
        Self {
            document: document.into(),
            ..Default::default()
        }
    }
}

/// Audit sidecar written next to every filed document.
///
/// Field order here is the key order of the serialized YAML.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PdfMetadata {
    pub original_filename: String,
    pub filed_date: DateTime<Local>,
    pub category: Category,
    pub subcategory: Option<String>,
    pub source: Option<String>,
    pub status: GtdStatus,
    pub follow_up_date: Option<NaiveDate>,
    pub fields_filled: usize,
    pub fields_auto: usize,
    pub fields_manual: usize,
    pub sensitive_fields: Vec<String>,
    pub filed_by: String,
    pub filed_to: Vec<String>,
    pub tags: Vec<String>,
}

/// Outcome of [`crate::GtdFiler::file`].
#[derive(Debug, Clone, Serialize)]
pub struct FilingResult {
    /// What the first successful backend returned for the document.
    pub path: String,
    pub category: Category,
    pub status: GtdStatus,
    /// Where the sidecar went. When `metadata_stored` is false this is only
    /// the derived relative path; no backend confirmed the write.
    pub metadata_path: String,
    pub metadata_stored: bool,
    pub filed_at: DateTime<Local>,
    /// One `<backend>:<dest_path>` entry per backend that stored the file,
    /// in configured order.
    pub destinations: Vec<String>,
}
