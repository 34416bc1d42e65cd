//! # formfile
//!
//! A Rust library for reading and filling PDF forms and filing the resulting
//! documents into a "Getting Things Done" folder hierarchy.
//!
//! ## What this crate does
//!
//! 1. **Extract fields**: walks a document's AcroForm and reports every
//!    terminal field with its type, value, options, page and flags.
//! 2. **Fill fields**: writes values from a flat JSON profile into the
//!    fields whose normalized names match the profile keys.
//! 3. **Categorize**: scores the filename and field text against curated
//!    keyword sets (medical, financial, legal, …).
//! 4. **File**: builds a dated, slugged filename and a GTD destination path,
//!    stores the document on every configured [`StorageBackend`], and writes
//!    a YAML metadata sidecar next to it.
//!
//! ## Quick example
//!
//! ```no_run
//! use formfile::{Category, FilingRequest, GtdFiler, LocalBackend, StorageBackend};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let backends: Vec<Box<dyn StorageBackend>> = vec![Box::new(LocalBackend::new("/srv/docs"))];
//! let filer = GtdFiler::new(backends);
//!
//! let request = FilingRequest {
//!     category: Some(Category::Medical),
//!     source: Some("Blue Cross".into()),
//!     ..FilingRequest::new("claim_form.pdf")
//! };
//!
//! let result = filer.file(&request)?;
//! println!("filed to {} ({} destination(s))", result.path, result.destinations.len());
//! # Ok(())
//! # }
//! ```

use std::path::PathBuf;
use thiserror::Error;

pub mod categorizer;
pub mod config;
mod field_discovery;
mod field_parsing;
mod fill_engine;
mod filer;
mod form;
pub mod metadata;
mod models;
pub mod naming;
mod pdf_utils;
pub mod sensitive;
pub mod storage;

pub use config::{BackendSettings, FilerConfig};
pub use fill_engine::normalize_key;
pub use filer::GtdFiler;
pub use form::{extract_fields, fill_pdf, PdfForm};
pub use models::{
    Category, ExtractionResult, FieldType, FillResult, FillStats, FilingRequest, FilingResult,
    GtdStatus, ParseLabelError, PdfField, PdfMetadata,
};
pub use storage::{
    get_backend, DropboxBackend, GoogleDriveBackend, LocalBackend, NextcloudWebDavBackend,
    StorageBackend, StorageError,
};

// ── Error type ───────────────────────────────────────────────────────────────

/// Every error that this crate can produce.
#[derive(Error, Debug)]
pub enum FilerError {
    /// A filesystem I/O error occurred (e.g. when loading or saving a file).
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    /// A document or profile path does not exist.
    #[error("Not found: {}", .0.display())]
    NotFound(PathBuf),

    /// The underlying lopdf parser returned an error.
    #[error("PDF parse error: {0}")]
    ParseError(#[from] lopdf::Error),

    /// The fill profile is not a flat JSON object of scalar values.
    #[error("Invalid profile: {0}")]
    InvalidProfile(String),

    /// A single storage operation failed.
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    /// No configured backend accepted the document, so nothing was filed.
    /// Each entry reads `<backend>: <reason>`.
    #[error("All storage backends failed ({})", .0.join("; "))]
    AllBackendsFailed(Vec<String>),

    /// A backend name did not match any known transport.
    #[error("Unknown storage backend '{name}'. Valid: {valid}")]
    UnknownBackend { name: String, valid: String },

    /// The configuration file or a backend's settings are invalid.
    #[error("Configuration error: {0}")]
    Config(String),

    /// The metadata sidecar could not be serialized or parsed.
    #[error("Metadata error: {0}")]
    Metadata(#[from] serde_yaml::Error),
}

/// Convenience alias used throughout this crate.
pub type Result<T> = std::result::Result<T, FilerError>;
