//! Storage backends that filed documents are copied to.
//!
//! Every transport implements [`StorageBackend`]; [`get_backend`] builds one
//! from its name and a [`BackendSettings`] table.

use crate::naming::sidecar_path;
use crate::{BackendSettings, FilerError};
use std::path::Path;
use thiserror::Error;

mod dropbox;
mod gdrive;
mod local;
mod webdav;

pub use dropbox::DropboxBackend;
pub use gdrive::GoogleDriveBackend;
pub use local::LocalBackend;
pub use webdav::NextcloudWebDavBackend;

/// Names accepted by [`get_backend`], sorted.
pub const BACKEND_NAMES: [&str; 4] = ["dropbox", "gdrive", "local", "nextcloud"];

/// A single storage operation failed.
#[derive(Error, Debug)]
pub enum StorageError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The remote answered with a status the operation does not accept.
    #[error("{backend} request failed ({status}): {body}")]
    Status {
        backend: &'static str,
        status: u16,
        body: String,
    },

    /// The remote answered successfully but with something unusable.
    #[error("API error: {0}")]
    Api(String),

    #[error("Authentication failed: {0}")]
    Auth(String),

    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),
}

impl StorageError {
    /// Build a [`StorageError::Status`] from a failed response, keeping the
    /// first 200 characters of the body.
    pub(crate) fn from_response(backend: &'static str, response: reqwest::blocking::Response) -> Self {
        let status = response.status().as_u16();
        let body: String = response
            .text()
            .unwrap_or_default()
            .chars()
            .take(200)
            .collect();
        StorageError::Status {
            backend,
            status,
            body,
        }
    }
}

/// Convenience alias for backend operations.
pub type StorageResult<T> = std::result::Result<T, StorageError>;

/// A destination that filed documents can be written to.
///
/// Paths are relative to the backend's root and always use `/`.
pub trait StorageBackend {
    /// Stable lowercase identifier (`local`, `nextcloud`, …).
    fn name(&self) -> &str;

    /// Copy `source` to `dest_path`, creating missing folders. Returns an
    /// identifier for the stored file. An existing file is overwritten; a
    /// failed call never leaves a truncated file behind.
    fn store(&self, source: &Path, dest_path: &str) -> StorageResult<String>;

    /// Write the sidecar for the document at `dest_path`.
    fn store_metadata(&self, yaml: &str, dest_path: &str) -> StorageResult<String> {
        self.write_metadata(yaml, &sidecar_path(dest_path))
    }

    /// Write `content` to exactly `path`.
    fn write_metadata(&self, content: &str, path: &str) -> StorageResult<String>;

    /// Create every missing segment of `path`. Safe to call repeatedly.
    fn ensure_directory(&self, path: &str) -> StorageResult<()>;

    /// Whether something exists at `path`. Backends without a path model
    /// answer `false`.
    fn exists(&self, path: &str) -> bool;
}

/// Parent folder of a relative `/` path, or `""` at the root.
pub(crate) fn parent_dir(path: &str) -> &str {
    path.rsplit_once('/').map(|(dir, _)| dir).unwrap_or("")
}

/// Build a backend by name.
///
/// ```
/// use formfile::{get_backend, BackendSettings};
///
/// let settings = BackendSettings { root: Some("/tmp/docs".into()), ..Default::default() };
/// let local = get_backend("local", &settings).unwrap();
/// assert_eq!(local.name(), "local");
///
/// assert!(get_backend("ftp", &settings).is_err());
/// ```
pub fn get_backend(name: &str, settings: &BackendSettings) -> crate::Result<Box<dyn StorageBackend>> {
    let backend: Box<dyn StorageBackend> = match name {
        "local" => Box::new(match &settings.root {
            Some(root) => LocalBackend::new(root),
            None => LocalBackend::default(),
        }),
        "nextcloud" => Box::new(NextcloudWebDavBackend::new(
            require(name, "base_url", &settings.base_url)?,
            require(name, "username", &settings.username)?,
            require(name, "password", &settings.password)?,
        )?),
        "gdrive" => Box::new(GoogleDriveBackend::new(
            require(name, "credentials_path", &settings.credentials_path)?,
            settings.root_folder_id.as_deref().unwrap_or("root"),
        )?),
        "dropbox" => Box::new(DropboxBackend::new(
            require(name, "access_token", &settings.access_token)?,
            settings.root_path.as_deref().unwrap_or("/Documents"),
        )?),
        _ => {
            return Err(FilerError::UnknownBackend {
                name: name.to_string(),
                valid: BACKEND_NAMES.join(", "),
            })
        }
    };
    Ok(backend)
}

fn require<'a>(backend: &str, key: &str, value: &'a Option<String>) -> crate::Result<&'a str> {
    value
        .as_deref()
        .filter(|v| !v.is_empty())
        .ok_or_else(|| FilerError::Config(format!("{backend} backend requires '{key}'")))
}

/// Blocking HTTP client used by the remote backends.
pub(crate) fn http_client(timeout_secs: u64) -> StorageResult<reqwest::blocking::Client> {
    Ok(reqwest::blocking::Client::builder()
        .timeout(std::time::Duration::from_secs(timeout_secs))
        .build()?)
}
