//! The filing pipeline: categorize, name, fan out to backends, write the
//! sidecar.

use crate::storage::{LocalBackend, StorageBackend};
use crate::{
    categorizer, metadata, naming, sensitive, Category, FilerError, FilingRequest, FilingResult,
    GtdStatus, PdfField, PdfMetadata, Result,
};
use chrono::{DateTime, Datelike, Local, NaiveDate};
use std::path::Path;

/// Default value of the sidecar's `filed_by`.
pub const DEFAULT_FILED_BY: &str = "formfile";

/// Files documents into a GTD tree on one or more storage backends.
///
/// Backends are tried one after another in the order given. A document
/// counts as filed as soon as one of them accepts it.
pub struct GtdFiler {
    backends: Vec<Box<dyn StorageBackend>>,
    filed_by: String,
    clock: fn() -> DateTime<Local>,
}

impl GtdFiler {
    /// With no backends, files into a [`LocalBackend`] at `~/Documents`.
    pub fn new(backends: Vec<Box<dyn StorageBackend>>) -> Self {
        let backends = if backends.is_empty() {
            vec![Box::new(LocalBackend::default()) as Box<dyn StorageBackend>]
        } else {
            backends
        };
        Self {
            backends,
            filed_by: DEFAULT_FILED_BY.to_string(),
            clock: Local::now,
        }
    }

    pub fn with_filed_by(mut self, filed_by: impl Into<String>) -> Self {
        self.filed_by = filed_by.into();
        self
    }

    /// Replace the clock used for filenames, year folders and `filed_date`.
    pub fn with_clock(mut self, clock: fn() -> DateTime<Local>) -> Self {
        self.clock = clock;
        self
    }

    pub fn backends(&self) -> &[Box<dyn StorageBackend>] {
        &self.backends
    }

    pub fn categorize(&self, document: &Path, fields: &[PdfField]) -> Category {
        categorizer::categorize(document, fields)
    }

    pub fn detect_sensitive_fields(&self, fields: &[PdfField]) -> Vec<String> {
        sensitive::detect_sensitive(fields)
    }

    /// Filename for `document`, dated today unless `date` is given.
    pub fn generate_filename(
        &self,
        document: &Path,
        source: Option<&str>,
        date: Option<NaiveDate>,
    ) -> String {
        let date = date.unwrap_or_else(|| (self.clock)().date_naive());
        naming::generate_filename(document, source, date)
    }

    /// Destination path, with the current year for reference filings.
    pub fn build_dest_path(
        &self,
        filename: &str,
        category: Category,
        status: GtdStatus,
        subcategory: Option<&str>,
    ) -> String {
        naming::build_destination_path(filename, category, status, subcategory, (self.clock)().year())
    }

    pub fn generate_metadata(
        &self,
        request: &FilingRequest,
        category: Category,
        filed_to: Vec<String>,
    ) -> PdfMetadata {
        metadata::generate_metadata(
            request,
            category,
            request.status,
            filed_to,
            &self.filed_by,
            (self.clock)(),
        )
    }

    /// File one document.
    ///
    /// Fails with [`FilerError::NotFound`] before touching any backend when
    /// the document is missing, and with [`FilerError::AllBackendsFailed`]
    /// when no backend stored it. A sidecar that no backend accepts only
    /// clears [`FilingResult::metadata_stored`].
    pub fn file(&self, request: &FilingRequest) -> Result<FilingResult> {
        let document = request.document.as_path();
        if !document.exists() {
            return Err(FilerError::NotFound(document.to_path_buf()));
        }

        let now = (self.clock)();
        let category = request
            .category
            .unwrap_or_else(|| self.categorize(document, &request.fields));
        let status = request.status;

        let filename = naming::generate_filename(document, request.source.as_deref(), now.date_naive());
        let dest_path = naming::build_destination_path(
            &filename,
            category,
            status,
            request.subcategory.as_deref(),
            now.year(),
        );

        let mut destinations = Vec::new();
        let mut failures = Vec::new();
        let mut primary: Option<String> = None;
        for backend in &self.backends {
            match backend.store(document, &dest_path) {
                Ok(stored) => {
                    destinations.push(format!("{}:{dest_path}", backend.name()));
                    primary.get_or_insert(stored);
                }
                Err(e) => {
                    tracing::error!("Failed to file to {}: {e}", backend.name());
                    failures.push(format!("{}: {e}", backend.name()));
                }
            }
        }
        let Some(path) = primary else {
            return Err(FilerError::AllBackendsFailed(failures));
        };

        let record = metadata::generate_metadata(
            request,
            category,
            status,
            destinations.clone(),
            &self.filed_by,
            now,
        );
        let yaml = metadata::to_yaml(&record)?;

        let mut stored_at = None;
        for backend in &self.backends {
            match backend.store_metadata(&yaml, &dest_path) {
                Ok(location) => {
                    stored_at = Some(location);
                    break;
                }
                Err(e) => tracing::warn!("Failed to store metadata on {}: {e}", backend.name()),
            }
        }
        let metadata_stored = stored_at.is_some();
        let metadata_path = stored_at.unwrap_or_else(|| {
            tracing::warn!("No backend accepted the metadata sidecar for {dest_path}");
            naming::sidecar_path(&dest_path)
        });

        Ok(FilingResult {
            path,
            category,
            status,
            metadata_path,
            metadata_stored,
            filed_at: now,
            destinations,
        })
    }
}
