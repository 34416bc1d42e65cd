// The `formfile` binary: which subcommands read the configuration.

mod common;

use std::path::{Path, PathBuf};
use std::process::{Command, Output};

fn formfile_bin() -> PathBuf {
    PathBuf::from(env!("CARGO_BIN_EXE_formfile"))
}

fn run_cli(home: &Path, args: &[&str]) -> Output {
    Command::new(formfile_bin())
        .args(args)
        .env("HOME", home)
        .env("XDG_CONFIG_HOME", home.join(".config"))
        .env_remove("FORMFILE_CONFIG")
        .env_remove("RUST_LOG")
        .output()
        .expect("failed to execute formfile CLI")
}

fn path_arg(path: &Path) -> &str {
    path.to_str().unwrap()
}

#[test]
fn extract_does_not_read_the_configuration() {
    let dir = tempfile::tempdir().unwrap();
    let pdf = common::write(dir.path(), "claim.pdf", &common::form_pdf());
    let config = common::write(dir.path(), "broken.toml", b"colour = 'blue'");

    let output = run_cli(
        dir.path(),
        &["--config", path_arg(&config), "extract", path_arg(&pdf), "-f", "json"],
    );

    assert!(output.status.success(), "{}", String::from_utf8_lossy(&output.stderr));
    let json: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(json["total_fields"], 5);
}

#[test]
fn filing_reports_a_broken_configuration() {
    let dir = tempfile::tempdir().unwrap();
    let pdf = common::write(dir.path(), "claim.pdf", &common::form_pdf());
    let config = common::write(dir.path(), "broken.toml", b"colour = 'blue'");

    let output = run_cli(dir.path(), &["--config", path_arg(&config), "file", path_arg(&pdf)]);

    assert_eq!(output.status.code(), Some(1));
    assert!(String::from_utf8_lossy(&output.stderr).contains("Error:"));
}

#[test]
fn file_uses_the_configured_local_root() {
    let dir = tempfile::tempdir().unwrap();
    let root = dir.path().join("filing");
    let pdf = common::write(dir.path(), "claim.pdf", &common::form_pdf());
    let config = common::write(
        dir.path(),
        "config.toml",
        format!("[backends.local]\nroot = {:?}\n", path_arg(&root)).as_bytes(),
    );

    let output = run_cli(
        dir.path(),
        &["--config", path_arg(&config), "file", path_arg(&pdf), "-s", "inbox"],
    );

    assert!(output.status.success(), "{}", String::from_utf8_lossy(&output.stderr));
    let filed: Vec<_> = std::fs::read_dir(root.join("@Inbox"))
        .unwrap()
        .map(|entry| entry.unwrap().file_name().to_string_lossy().into_owned())
        .collect();
    assert_eq!(filed.len(), 2, "{filed:?}");
    assert!(filed.iter().any(|name| name.ends_with("_claim.pdf")));
    assert!(filed.iter().any(|name| name.ends_with("_claim.meta.yml")));
}
