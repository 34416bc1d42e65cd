//! TOML configuration for the filer and its backends.
//!
//! ```toml
//! filed_by = "alice"
//! default_status = "reference"
//! default_backends = ["local", "nextcloud"]
//!
//! [backends.local]
//! root = "~/Documents"
//!
//! [backends.nextcloud]
//! base_url = "https://cloud.example.com/remote.php/dav/files/alice"
//! username = "alice"
//! password = "app-token"
//! ```

use crate::storage::{get_backend, StorageBackend};
use crate::{FilerError, GtdStatus, Result};
use serde::Deserialize;
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

/// Settings for one backend. Which keys are required depends on the backend.
#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct BackendSettings {
    /// `local`: filing root (default `~/Documents`).
    pub root: Option<PathBuf>,
    /// `nextcloud`: WebDAV root of the user's files.
    pub base_url: Option<String>,
    pub username: Option<String>,
    pub password: Option<String>,
    /// `gdrive`: service-account key file.
    pub credentials_path: Option<String>,
    /// `gdrive`: folder the GTD tree lives in (default `root`).
    pub root_folder_id: Option<String>,
    /// `dropbox`: OAuth2 token.
    pub access_token: Option<String>,
    /// `dropbox`: folder the GTD tree lives in (default `/Documents`).
    pub root_path: Option<String>,
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct FilerConfig {
    /// Written to every sidecar's `filed_by`.
    pub filed_by: String,
    /// Status used when a filing names none. Unknown values mean `reference`.
    pub default_status: Option<String>,
    /// Backends used when a filing names none.
    pub default_backends: Vec<String>,
    pub backends: BTreeMap<String, BackendSettings>,
}

impl Default for FilerConfig {
    fn default() -> Self {
        Self {
            filed_by: "formfile".to_string(),
            default_status: None,
            default_backends: vec!["local".to_string()],
            backends: BTreeMap::new(),
        }
    }
}

impl FilerConfig {
    /// Load from `explicit` if given, else from [`default_path`] if that file
    /// exists, else fall back to defaults.
    ///
    /// [`default_path`]: FilerConfig::default_path
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        let path = match explicit {
            Some(path) if !path.exists() => return Err(FilerError::NotFound(path.to_path_buf())),
            Some(path) => path.to_path_buf(),
            None => match Self::default_path().filter(|p| p.exists()) {
                Some(path) => path,
                None => {
                    tracing::debug!("no configuration file, using defaults");
                    return Ok(Self::default());
                }
            },
        };
        tracing::debug!("loading configuration from {}", path.display());
        Self::from_toml(&fs::read_to_string(&path)?)
    }

    pub fn from_toml(text: &str) -> Result<Self> {
        toml::from_str(text).map_err(|e| FilerError::Config(e.to_string()))
    }

    /// `<config_dir>/formfile/config.toml`
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("formfile").join("config.toml"))
    }

    /// Settings for `name`, with `~` expanded in the local root.
    pub fn backend_settings(&self, name: &str) -> BackendSettings {
        let mut settings = self.backends.get(name).cloned().unwrap_or_default();
        settings.root = settings.root.map(|root| expand_home(&root));
        settings
    }

    /// The configured default status; unrecognized text falls back to
    /// `reference` with a warning.
    pub fn default_status(&self) -> GtdStatus {
        self.default_status
            .as_deref()
            .map(GtdStatus::parse_lenient)
            .unwrap_or_default()
    }

    /// Build the named backends, or [`FilerConfig::default_backends`] when
    /// `names` is empty.
    pub fn build_backends(&self, names: &[String]) -> Result<Vec<Box<dyn StorageBackend>>> {
        let names = if names.is_empty() {
            &self.default_backends
        } else {
            names
        };
        names
            .iter()
            .map(|name| get_backend(name, &self.backend_settings(name)))
            .collect()
    }
}

fn expand_home(path: &Path) -> PathBuf {
    match (path.strip_prefix("~"), dirs::home_dir()) {
        (Ok(rest), Some(home)) => home.join(rest),
        _ => path.to_path_buf(),
    }
}
