use super::{http_client, parent_dir, StorageBackend, StorageError, StorageResult};
use jsonwebtoken::{Algorithm, EncodingKey, Header};
use once_cell::sync::OnceCell;
use reqwest::blocking::{Client, RequestBuilder};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::fs;
use std::path::{Path, PathBuf};

const DRIVE_FILES_URL: &str = "https://www.googleapis.com/drive/v3/files";
const DRIVE_UPLOAD_URL: &str = "https://www.googleapis.com/upload/drive/v3/files";
const DRIVE_SCOPE: &str = "https://www.googleapis.com/auth/drive.file";
const FOLDER_MIME: &str = "application/vnd.google-apps.folder";
const DEFAULT_TOKEN_URI: &str = "https://oauth2.googleapis.com/token";
const TOKEN_LIFETIME_SECS: i64 = 3600;
const MULTIPART_BOUNDARY: &str = "formfile-drive-upload-8d41c2";

/// Fields of a service-account key file that are needed to sign in.
#[derive(Debug, Deserialize)]
struct ServiceAccountKey {
    client_email: String,
    private_key: String,
    #[serde(default)]
    token_uri: Option<String>,
}

#[derive(Debug, Serialize)]
struct Claims<'a> {
    iss: &'a str,
    scope: &'a str,
    aud: &'a str,
    iat: i64,
    exp: i64,
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
}

#[derive(Debug, Deserialize)]
struct FileId {
    id: String,
}

#[derive(Debug, Deserialize)]
struct FileList {
    #[serde(default)]
    files: Vec<FileId>,
}

/// Files documents into Google Drive using a service account.
///
/// Drive has no real paths: each `/` segment of a destination becomes a
/// folder below `root_folder_id`, looked up by name and created on demand.
pub struct GoogleDriveBackend {
    credentials_path: PathBuf,
    root_folder_id: String,
    client: Client,
    token: OnceCell<String>,
}

impl GoogleDriveBackend {
    pub fn new(credentials_path: &str, root_folder_id: &str) -> StorageResult<Self> {
        Ok(Self {
            credentials_path: PathBuf::from(credentials_path),
            root_folder_id: root_folder_id.to_string(),
            client: http_client(60)?,
            token: OnceCell::new(),
        })
    }

    /// Exchange a signed JWT for an access token. Fetched once per backend.
    fn access_token(&self) -> StorageResult<&str> {
        self.token
            .get_or_try_init(|| -> StorageResult<String> {
                let raw = fs::read_to_string(&self.credentials_path)?;
                let key: ServiceAccountKey = serde_json::from_str(&raw)
                    .map_err(|e| StorageError::Auth(format!("invalid credentials file: {e}")))?;
                let token_uri = key.token_uri.as_deref().unwrap_or(DEFAULT_TOKEN_URI);

                let now = chrono::Utc::now().timestamp();
                let claims = Claims {
                    iss: &key.client_email,
                    scope: DRIVE_SCOPE,
                    aud: token_uri,
                    iat: now,
                    exp: now + TOKEN_LIFETIME_SECS,
                };
                let signing_key = EncodingKey::from_rsa_pem(key.private_key.as_bytes())
                    .map_err(|e| StorageError::Auth(e.to_string()))?;
                let assertion = jsonwebtoken::encode(&Header::new(Algorithm::RS256), &claims, &signing_key)
                    .map_err(|e| StorageError::Auth(e.to_string()))?;

                let response = self
                    .client
                    .post(token_uri)
                    .form(&[
                        ("grant_type", "urn:ietf:params:oauth:grant-type:jwt-bearer"),
                        ("assertion", assertion.as_str()),
                    ])
                    .send()?;
                if !response.status().is_success() {
                    return Err(StorageError::from_response("gdrive", response));
                }
                let token: TokenResponse = response.json()?;
                tracing::debug!("obtained Drive token for {}", key.client_email);
                Ok(token.access_token)
            })
            .map(String::as_str)
    }

    fn authorized(&self, builder: RequestBuilder) -> StorageResult<RequestBuilder> {
        Ok(builder.bearer_auth(self.access_token()?))
    }

    fn send_json<T: for<'de> Deserialize<'de>>(&self, builder: RequestBuilder) -> StorageResult<T> {
        let response = self.authorized(builder)?.send()?;
        if !response.status().is_success() {
            return Err(StorageError::from_response("gdrive", response));
        }
        Ok(response.json()?)
    }

    fn find_folder(&self, name: &str, parent_id: &str) -> StorageResult<Option<String>> {
        self.find(&folder_query(name, parent_id))
    }

    fn find_file(&self, name: &str, parent_id: &str) -> StorageResult<Option<String>> {
        self.find(&file_query(name, parent_id))
    }

    fn find(&self, query: &str) -> StorageResult<Option<String>> {
        let list: FileList = self.send_json(
            self.client
                .get(DRIVE_FILES_URL)
                .query(&[("q", query), ("fields", "files(id)")]),
        )?;
        Ok(list.files.into_iter().next().map(|f| f.id))
    }

    fn create_folder(&self, name: &str, parent_id: &str) -> StorageResult<String> {
        let created: FileId = self.send_json(
            self.client
                .post(DRIVE_FILES_URL)
                .query(&[("fields", "id")])
                .json(&json!({ "name": name, "mimeType": FOLDER_MIME, "parents": [parent_id] })),
        )?;
        Ok(created.id)
    }

    /// Walk (and create) one folder per segment of `dir`; returns the leaf id.
    fn ensure_folder_chain(&self, dir: &str) -> StorageResult<String> {
        let mut parent_id = self.root_folder_id.clone();
        for name in dir.split('/').filter(|s| !s.is_empty()) {
            parent_id = match self.find_folder(name, &parent_id)? {
                Some(id) => id,
                None => self.create_folder(name, &parent_id)?,
            };
        }
        Ok(parent_id)
    }

    /// Overwrite the file named like the last segment of `path`, or create
    /// it with its content in a single request. Either way a failed upload
    /// leaves no partial file behind.
    fn upload(&self, path: &str, body: Vec<u8>, mime: &str) -> StorageResult<String> {
        let folder_id = self.ensure_folder_chain(parent_dir(path))?;
        let name = path.rsplit('/').next().unwrap_or(path);

        let request = match self.find_file(name, &folder_id)? {
            Some(id) => {
                tracing::debug!("replacing content of Drive file {id}");
                self.client
                    .patch(media_update_url(&id))
                    .query(&[("uploadType", "media"), ("fields", "id")])
                    .header(reqwest::header::CONTENT_TYPE, mime)
                    .body(body)
            }
            None => {
                let metadata = json!({ "name": name, "parents": [folder_id], "mimeType": mime });
                self.client
                    .post(DRIVE_UPLOAD_URL)
                    .query(&[("uploadType", "multipart"), ("fields", "id")])
                    .header(
                        reqwest::header::CONTENT_TYPE,
                        format!("multipart/related; boundary={MULTIPART_BOUNDARY}"),
                    )
                    .body(multipart_body(&metadata, mime, &body))
            }
        };
        let stored: FileId = self.send_json(request)?;
        Ok(stored.id)
    }
}

impl StorageBackend for GoogleDriveBackend {
    fn name(&self) -> &str {
        "gdrive"
    }

    fn store(&self, source: &Path, dest_path: &str) -> StorageResult<String> {
        let id = self.upload(dest_path, fs::read(source)?, "application/pdf")?;
        tracing::info!(
            "Filed {} -> gdrive:{id}",
            source.file_name().unwrap_or_default().to_string_lossy()
        );
        Ok(format!("gdrive:{id}"))
    }

    fn write_metadata(&self, content: &str, path: &str) -> StorageResult<String> {
        let id = self.upload(path, content.as_bytes().to_vec(), "text/yaml")?;
        Ok(format!("gdrive:{id}"))
    }

    fn ensure_directory(&self, path: &str) -> StorageResult<()> {
        self.ensure_folder_chain(path).map(|_| ())
    }

    fn exists(&self, _path: &str) -> bool {
        false
    }
}

/// Escape a literal for use inside single quotes in a Drive query.
fn escape_query(value: &str) -> String {
    value.replace('\\', "\\\\").replace('\'', "\\'")
}

fn folder_query(name: &str, parent_id: &str) -> String {
    format!(
        "name='{}' and '{}' in parents and mimeType='{FOLDER_MIME}' and trashed=false",
        escape_query(name),
        escape_query(parent_id)
    )
}

fn file_query(name: &str, parent_id: &str) -> String {
    format!(
        "name='{}' and '{}' in parents and mimeType!='{FOLDER_MIME}' and trashed=false",
        escape_query(name),
        escape_query(parent_id)
    )
}

fn media_update_url(file_id: &str) -> String {
    format!("{DRIVE_UPLOAD_URL}/{file_id}")
}

/// `multipart/related` body for a create-with-content upload: the JSON
/// metadata part followed by the media part.
fn multipart_body(metadata: &serde_json::Value, mime: &str, content: &[u8]) -> Vec<u8> {
    let mut body = Vec::with_capacity(content.len() + 256);
    body.extend_from_slice(
        format!(
            "--{MULTIPART_BOUNDARY}\r\nContent-Type: application/json; charset=UTF-8\r\n\r\n{metadata}\r\n\
             --{MULTIPART_BOUNDARY}\r\nContent-Type: {mime}\r\n\r\n"
        )
        .as_bytes(),
    );
    body.extend_from_slice(content);
    body.extend_from_slice(format!("\r\n--{MULTIPART_BOUNDARY}--\r\n").as_bytes());
    body
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn query_literals_are_escaped() {
        assert_eq!(escape_query("Bob's"), "Bob\\'s");
        assert_eq!(escape_query(r"a\b"), r"a\\b");
    }

    #[test]
    fn lookups_distinguish_files_from_folders() {
        assert_eq!(
            file_query("2026-02-27_claim.pdf", "abc"),
            "name='2026-02-27_claim.pdf' and 'abc' in parents \
             and mimeType!='application/vnd.google-apps.folder' and trashed=false"
        );
        assert_eq!(
            folder_query("Bob's", "root"),
            "name='Bob\\'s' and 'root' in parents \
             and mimeType='application/vnd.google-apps.folder' and trashed=false"
        );
    }

    #[test]
    fn existing_files_are_updated_by_id() {
        assert_eq!(
            media_update_url("1AbC"),
            "https://www.googleapis.com/upload/drive/v3/files/1AbC"
        );
    }

    #[test]
    fn new_files_carry_metadata_and_content_together() {
        let metadata = json!({ "name": "x.pdf", "parents": ["p1"], "mimeType": "application/pdf" });
        let body = multipart_body(&metadata, "application/pdf", b"%PDF-1.7");
        let text = String::from_utf8(body).unwrap();

        let parts: Vec<&str> = text.split(&format!("--{MULTIPART_BOUNDARY}")).collect();
        assert_eq!(parts.len(), 4, "{text}");
        assert!(parts[1].contains("application/json"));
        assert!(parts[1].contains(r#""name":"x.pdf""#));
        assert!(parts[2].starts_with("\r\nContent-Type: application/pdf\r\n\r\n%PDF-1.7\r\n"));
        assert_eq!(parts[3], "--\r\n");
    }

    #[test]
    fn missing_credentials_surface_as_io_error() {
        let backend = GoogleDriveBackend::new("/nonexistent/creds.json", "root").unwrap();
        assert!(!backend.exists("@Inbox/doc.pdf"));
        let err = backend.ensure_directory("@Inbox").unwrap_err();
        assert!(matches!(err, StorageError::Io(_)), "got {err:?}");
    }
}
