use super::{http_client, parent_dir, StorageBackend, StorageError, StorageResult};
use reqwest::blocking::{Client, RequestBuilder};
use reqwest::{Method, StatusCode};
use std::fs;
use std::path::Path;
use url::Url;

const UPLOAD_TIMEOUT_SECS: u64 = 60;

/// Files documents to a Nextcloud (or any WebDAV) share.
///
/// `base_url` is the user's WebDAV root, e.g.
/// `https://cloud.example.com/remote.php/dav/files/alice`.
pub struct NextcloudWebDavBackend {
    base_url: Url,
    username: String,
    password: String,
    client: Client,
}

impl NextcloudWebDavBackend {
    pub fn new(base_url: &str, username: &str, password: &str) -> StorageResult<Self> {
        let base_url = Url::parse(base_url)?;
        if base_url.cannot_be_a_base() {
            return Err(StorageError::Api(format!("not a WebDAV root: {base_url}")));
        }
        Ok(Self {
            base_url,
            username: username.to_string(),
            password: password.to_string(),
            client: http_client(UPLOAD_TIMEOUT_SECS)?,
        })
    }

    /// URL of `path` below the share root. Segments are percent-encoded.
    pub fn url_for(&self, path: &str) -> Url {
        let mut url = self.base_url.clone();
        // `new` rejected cannot-be-a-base URLs, so this always succeeds
        if let Ok(mut segments) = url.path_segments_mut() {
            segments
                .pop_if_empty()
                .extend(path.split('/').filter(|s| !s.is_empty()));
        }
        url
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        self.client
            .request(method, self.url_for(path))
            .basic_auth(&self.username, Some(&self.password))
    }

    fn put(&self, path: &str, body: Vec<u8>, content_type: &str) -> StorageResult<()> {
        let response = self
            .request(Method::PUT, path)
            .header(reqwest::header::CONTENT_TYPE, content_type)
            .body(body)
            .send()?;
        match response.status() {
            StatusCode::OK | StatusCode::CREATED | StatusCode::NO_CONTENT => Ok(()),
            _ => Err(StorageError::from_response("nextcloud", response)),
        }
    }
}

impl StorageBackend for NextcloudWebDavBackend {
    fn name(&self) -> &str {
        "nextcloud"
    }

    fn store(&self, source: &Path, dest_path: &str) -> StorageResult<String> {
        self.ensure_directory(parent_dir(dest_path))?;
        self.put(dest_path, fs::read(source)?, "application/pdf")?;
        tracing::info!(
            "Filed {} -> nextcloud:{dest_path}",
            source.file_name().unwrap_or_default().to_string_lossy()
        );
        Ok(format!("nextcloud:{dest_path}"))
    }

    fn write_metadata(&self, content: &str, path: &str) -> StorageResult<String> {
        self.put(path, content.as_bytes().to_vec(), "text/yaml")?;
        Ok(format!("nextcloud:{path}"))
    }

    fn ensure_directory(&self, path: &str) -> StorageResult<()> {
        let mkcol = Method::from_bytes(b"MKCOL").map_err(|e| StorageError::Api(e.to_string()))?;
        let mut current = String::new();
        for part in path.split('/').filter(|p| !p.is_empty()) {
            if !current.is_empty() {
                current.push('/');
            }
            current.push_str(part);

            let response = self.request(mkcol.clone(), &current).send()?;
            let status = response.status();
            // 405: the collection already exists
            if !status.is_success() && status != StatusCode::METHOD_NOT_ALLOWED {
                return Err(StorageError::from_response("nextcloud", response));
            }
        }
        Ok(())
    }

    fn exists(&self, path: &str) -> bool {
        match self.request(Method::HEAD, path).send() {
            Ok(response) => response.status() == StatusCode::OK,
            Err(e) => {
                tracing::debug!("HEAD {path} failed: {e}");
                false
            }
        }
    }
}
