use super::{http_client, StorageBackend, StorageError, StorageResult};
use reqwest::blocking::{Client, Response};
use reqwest::StatusCode;
use serde_json::json;
use std::fs;
use std::path::Path;

const API_URL: &str = "https://api.dropboxapi.com/2";
const CONTENT_URL: &str = "https://content.dropboxapi.com/2";

/// Files documents into a Dropbox account using an OAuth2 access token.
pub struct DropboxBackend {
    access_token: String,
    root_path: String,
    client: Client,
}

impl DropboxBackend {
    /// `root_path` is where the GTD tree lives, e.g. `/Documents`.
    pub fn new(access_token: &str, root_path: &str) -> StorageResult<Self> {
        Ok(Self {
            access_token: access_token.to_string(),
            root_path: root_path.trim_end_matches('/').to_string(),
            client: http_client(60)?,
        })
    }

    /// Absolute Dropbox path of a path relative to the root.
    pub fn full_path(&self, path: &str) -> String {
        format!("{}/{}", self.root_path, path.trim_start_matches('/'))
    }

    fn upload(&self, full_path: &str, body: Vec<u8>) -> StorageResult<()> {
        let arg = json!({ "path": full_path, "mode": "overwrite", "mute": true });
        let response = self
            .client
            .post(format!("{CONTENT_URL}/files/upload"))
            .bearer_auth(&self.access_token)
            .header("Dropbox-API-Arg", header_safe_json(&arg.to_string()))
            .header(reqwest::header::CONTENT_TYPE, "application/octet-stream")
            .body(body)
            .send()?;
        ok_or_status(response)
    }

    fn rpc(&self, endpoint: &str, body: serde_json::Value) -> StorageResult<Response> {
        Ok(self
            .client
            .post(format!("{API_URL}/{endpoint}"))
            .bearer_auth(&self.access_token)
            .json(&body)
            .send()?)
    }
}

impl StorageBackend for DropboxBackend {
    fn name(&self) -> &str {
        "dropbox"
    }

    fn store(&self, source: &Path, dest_path: &str) -> StorageResult<String> {
        let full_path = self.full_path(dest_path);
        self.upload(&full_path, fs::read(source)?)?;
        tracing::info!(
            "Filed {} -> dropbox:{full_path}",
            source.file_name().unwrap_or_default().to_string_lossy()
        );
        Ok(format!("dropbox:{full_path}"))
    }

    fn write_metadata(&self, content: &str, path: &str) -> StorageResult<String> {
        let full_path = self.full_path(path);
        self.upload(&full_path, content.as_bytes().to_vec())?;
        Ok(format!("dropbox:{full_path}"))
    }

    /// Uploads create parent folders implicitly; this exists for callers
    /// that want an empty folder.
    fn ensure_directory(&self, path: &str) -> StorageResult<()> {
        let response = self.rpc(
            "files/create_folder_v2",
            json!({ "path": self.full_path(path), "autorename": false }),
        )?;
        // 409: path/conflict/folder, already there
        if response.status() == StatusCode::CONFLICT {
            return Ok(());
        }
        ok_or_status(response)
    }

    fn exists(&self, path: &str) -> bool {
        match self.rpc("files/get_metadata", json!({ "path": self.full_path(path) })) {
            Ok(response) => response.status().is_success(),
            Err(e) => {
                tracing::debug!("get_metadata {path} failed: {e}");
                false
            }
        }
    }
}

fn ok_or_status(response: Response) -> StorageResult<()> {
    if response.status().is_success() {
        Ok(())
    } else {
        Err(StorageError::from_response("dropbox", response))
    }
}

/// HTTP header values must be ASCII, so Dropbox expects non-ASCII characters
/// in `Dropbox-API-Arg` as `\uXXXX` escapes.
fn header_safe_json(json: &str) -> String {
    let mut out = String::with_capacity(json.len());
    for c in json.chars() {
        if c.is_ascii() {
            out.push(c);
        } else {
            let mut units = [0u16; 2];
            for unit in c.encode_utf16(&mut units) {
                out.push_str(&format!("\\u{unit:04x}"));
            }
        }
    }
    out
}
