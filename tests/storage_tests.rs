// Local backend behaviour and the backend factory.

use formfile::storage::BACKEND_NAMES;
use formfile::{get_backend, BackendSettings, FilerError, LocalBackend, StorageBackend};
use std::fs;

// ── LocalBackend ──────────────────────────────────────────────────────────────

#[test]
fn store_creates_parents_and_returns_full_path() {
    let src = tempfile::tempdir().unwrap();
    let root = tempfile::tempdir().unwrap();
    let source = src.path().join("doc.pdf");
    fs::write(&source, b"%PDF-1.7 test").unwrap();

    let backend = LocalBackend::new(root.path());
    let stored = backend.store(&source, "@Inbox/nested/doc.pdf").unwrap();

    let expected = root.path().join("@Inbox/nested/doc.pdf");
    assert_eq!(stored, expected.display().to_string());
    assert_eq!(fs::read(&expected).unwrap(), b"%PDF-1.7 test");
    assert!(backend.exists("@Inbox/nested/doc.pdf"));
    assert!(!backend.exists("@Inbox/other.pdf"));
}

#[test]
fn store_overwrites_existing_file() {
    let src = tempfile::tempdir().unwrap();
    let root = tempfile::tempdir().unwrap();
    let source = src.path().join("doc.pdf");
    let backend = LocalBackend::new(root.path());

    fs::write(&source, b"first").unwrap();
    backend.store(&source, "@Archive/doc.pdf").unwrap();
    fs::write(&source, b"second").unwrap();
    backend.store(&source, "@Archive/doc.pdf").unwrap();

    assert_eq!(fs::read(root.path().join("@Archive/doc.pdf")).unwrap(), b"second");
    let entries = fs::read_dir(root.path().join("@Archive")).unwrap().count();
    assert_eq!(entries, 1, "no temp files left behind");
}

#[test]
fn missing_source_leaves_nothing_behind() {
    let root = tempfile::tempdir().unwrap();
    let backend = LocalBackend::new(root.path());

    assert!(backend
        .store(&root.path().join("absent.pdf"), "@Inbox/doc.pdf")
        .is_err());
    assert!(!backend.exists("@Inbox/doc.pdf"));
}

#[test]
fn metadata_lands_beside_document() {
    let root = tempfile::tempdir().unwrap();
    let backend = LocalBackend::new(root.path());

    let path = backend
        .store_metadata("category: medical\n", "@Reference/Medical/2026/claim.pdf")
        .unwrap();

    let expected = root.path().join("@Reference/Medical/2026/claim.meta.yml");
    assert_eq!(path, expected.display().to_string());
    assert_eq!(fs::read_to_string(expected).unwrap(), "category: medical\n");
}

#[test]
fn ensure_directory_is_idempotent() {
    let root = tempfile::tempdir().unwrap();
    let backend = LocalBackend::new(root.path());
    backend.ensure_directory("@Action/Waiting-For").unwrap();
    backend.ensure_directory("@Action/Waiting-For").unwrap();
    assert!(root.path().join("@Action/Waiting-For").is_dir());
}

#[test]
fn default_root_is_documents() {
    let backend = LocalBackend::default();
    assert!(backend.root().ends_with("Documents"));
}

// ── Factory ───────────────────────────────────────────────────────────────────

#[test]
fn builds_every_known_backend() {
    let settings = BackendSettings {
        root: Some("/tmp/formfile".into()),
        base_url: Some("https://cloud.example.com/remote.php/dav/files/alice".into()),
        username: Some("alice".into()),
        password: Some("secret".into()),
        credentials_path: Some("/etc/formfile/sa.json".into()),
        access_token: Some("sl.token".into()),
        ..Default::default()
    };
    for name in BACKEND_NAMES {
        let backend = get_backend(name, &settings).unwrap();
        assert_eq!(backend.name(), name);
    }
}

#[test]
fn unknown_backend_lists_valid_names() {
    let err = get_backend("ftp", &BackendSettings::default()).err().unwrap();
    assert!(matches!(err, FilerError::UnknownBackend { .. }));
    assert_eq!(
        err.to_string(),
        "Unknown storage backend 'ftp'. Valid: dropbox, gdrive, local, nextcloud"
    );
}

#[test]
fn missing_required_settings_name_the_key() {
    let cases = [
        ("nextcloud", "base_url"),
        ("gdrive", "credentials_path"),
        ("dropbox", "access_token"),
    ];
    for (name, key) in cases {
        let err = get_backend(name, &BackendSettings::default()).err().unwrap();
        match err {
            FilerError::Config(message) => assert!(message.contains(key), "{message}"),
            other => panic!("expected Config error for {name}, got {other:?}"),
        }
    }
}

#[test]
fn nextcloud_needs_credentials_too() {
    let settings = BackendSettings {
        base_url: Some("https://cloud.example.com/dav".into()),
        username: Some("alice".into()),
        ..Default::default()
    };
    let err = get_backend("nextcloud", &settings).err().unwrap();
    assert!(err.to_string().contains("password"));
}
