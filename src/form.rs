use crate::field_discovery::FieldDiscovery;
use crate::field_parsing::FieldParser;
use crate::fill_engine::{build_mapping, FillEngine};
use crate::{ExtractionResult, FilerError, FillResult, Result};
use lopdf::Document;
use std::path::{Path, PathBuf};

// ── PdfForm ───────────────────────────────────────────────────────────────────

/// Entry point for reading and filling a PDF's interactive form.
///
/// # Creating a form
///
/// ```no_run
/// use formfile::PdfForm;
///
/// // From a file path
/// let form = PdfForm::from_path("claim.pdf").unwrap();
///
/// // From an in-memory buffer
/// let bytes = std::fs::read("claim.pdf").unwrap();
/// let form = PdfForm::from_bytes("claim.pdf", &bytes).unwrap();
/// ```
pub struct PdfForm {
    document: Document,
    filename: String,
}

impl PdfForm {
    // ── Constructors ──────────────────────────────────────────────────────────

    /// Load a PDF from the file system. A missing path is
    /// [`FilerError::NotFound`].
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(FilerError::NotFound(path.to_path_buf()));
        }
        Ok(Self {
            document: Document::load(path)?,
            filename: file_name(path),
        })
    }

    /// Load a PDF from an in-memory byte slice. `filename` is only reported
    /// back in [`ExtractionResult::filename`].
    pub fn from_bytes(filename: &str, data: &[u8]) -> Result<Self> {
        Ok(Self {
            document: Document::load_mem(data)?,
            filename: filename.to_string(),
        })
    }

    // ── Extraction ────────────────────────────────────────────────────────────

    /// List every terminal form field. A document without an AcroForm
    /// yields an empty result, not an error.
    ///
    /// # Example
    ///
    /// ```no_run
    /// use formfile::PdfForm;
    ///
    /// let form = PdfForm::from_path("claim.pdf").unwrap();
    /// for field in form.extract_fields().fields {
    ///     println!("{} ({}) = {:?}", field.name, field.field_type, field.value);
    /// }
    /// ```
    pub fn extract_fields(&self) -> ExtractionResult {
        let discovered = FieldDiscovery::new(&self.document).collect_fields();
        let parser = FieldParser::new(&self.document);
        let fields: Vec<_> = discovered.iter().map(|f| parser.parse(f)).collect();

        ExtractionResult {
            filename: self.filename.clone(),
            total_fields: fields.len(),
            fields,
        }
    }

    // ── Filling ───────────────────────────────────────────────────────────────

    /// Fill the form from a flat JSON `profile` and write the result to
    /// `output`.
    ///
    /// Field names and profile keys are compared after
    /// [`crate::normalize_key`]. Profile keys that match nothing are ignored;
    /// fields that match nothing are counted as skipped.
    pub fn fill<P: AsRef<Path>>(
        &mut self,
        profile: &serde_json::Value,
        output: P,
    ) -> Result<FillResult> {
        let mapping = build_mapping(profile)?;
        let fields = FieldDiscovery::new(&self.document).collect_fields();
        let counts = FillEngine::new(&mut self.document).apply(&fields, &mapping)?;

        let output = output.as_ref();
        self.save(output)?;
        tracing::info!(
            filled = counts.filled,
            skipped = counts.skipped,
            "Filled {} -> {}",
            self.filename,
            output.display()
        );

        Ok(FillResult {
            output_path: output.to_path_buf(),
            fields_filled: counts.filled,
            fields_skipped: counts.skipped,
            fields_total: fields.len(),
        })
    }

    /// Write the document to `path`. The file is replaced only once the
    /// whole document has been serialized.
    pub fn save<P: AsRef<Path>>(&mut self, path: P) -> Result<()> {
        let path = path.as_ref();
        let dir = match path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };
        let mut staged = tempfile::NamedTempFile::new_in(dir)?;
        self.document.save_to(staged.as_file_mut())?;
        staged.persist(path).map_err(|e| e.error)?;
        Ok(())
    }

    // ── Accessors ─────────────────────────────────────────────────────────────

    /// Returns a reference to the underlying [`lopdf::Document`].
    pub fn document(&self) -> &Document {
        &self.document
    }

    pub fn filename(&self) -> &str {
        &self.filename
    }
}

// ── Free functions ────────────────────────────────────────────────────────────

/// Extract all form fields from the PDF at `path`.
pub fn extract_fields<P: AsRef<Path>>(path: P) -> Result<ExtractionResult> {
    Ok(PdfForm::from_path(path)?.extract_fields())
}

/// Fill the PDF at `pdf` from the JSON profile at `profile`.
///
/// `output` defaults to `<stem>_filled.pdf` beside the input.
pub fn fill_pdf<P, Q>(pdf: P, profile: Q, output: Option<&Path>) -> Result<FillResult>
where
    P: AsRef<Path>,
    Q: AsRef<Path>,
{
    let pdf = pdf.as_ref();
    let profile = profile.as_ref();
    if !pdf.exists() {
        return Err(FilerError::NotFound(pdf.to_path_buf()));
    }
    if !profile.exists() {
        return Err(FilerError::NotFound(profile.to_path_buf()));
    }

    let text = std::fs::read_to_string(profile)?;
    let values: serde_json::Value = serde_json::from_str(&text)
        .map_err(|e| FilerError::InvalidProfile(format!("{}: {e}", profile.display())))?;

    let output = output
        .map(Path::to_path_buf)
        .unwrap_or_else(|| default_fill_output(pdf));

    PdfForm::from_path(pdf)?.fill(&values, output)
}

/// `<dir>/<stem>_filled.pdf`
fn default_fill_output(pdf: &Path) -> PathBuf {
    let stem = pdf
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "document".to_string());
    pdf.with_file_name(format!("{stem}_filled.pdf"))
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default()
}
