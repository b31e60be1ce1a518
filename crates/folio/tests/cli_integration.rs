//! CLI integration tests for the Folio command-line interface.
//!
//! These tests verify:
//! - Help text is displayed correctly
//! - Argument parsing works as expected
//! - Upload, save, scan, copy, delete and cleanup work end to end against
//!   filesystem storage in a temporary directory

use std::path::{Path, PathBuf};

use assert_cmd::Command;
use predicates::prelude::*;
use serde_json::{Value, json};
use tempfile::TempDir;

/// Get a command for the folio binary.
fn folio() -> Command {
    Command::cargo_bin("folio").unwrap()
}

/// A config dir, storage roots and one installed library in a temp dir.
struct Workspace {
    dir: TempDir,
}

impl Workspace {
    fn new() -> Self {
        let dir = TempDir::new().unwrap();
        let root = dir.path();

        let config = format!(
            r#"
[storage]
content_path = "{content}"
temporary_path = "{temporary}"
libraries_path = "{libraries}"

[logging]
file_logging = false
"#,
            content = root.join("content").display(),
            temporary = root.join("tmp").display(),
            libraries = root.join("libraries").display(),
        );
        std::fs::create_dir_all(root.join("config")).unwrap();
        std::fs::write(root.join("config").join("config.toml"), config).unwrap();

        let library = root.join("libraries").join("H5P.Image-1.1");
        std::fs::create_dir_all(&library).unwrap();
        std::fs::write(
            library.join("semantics.json"),
            json!([
                {"name": "file", "type": "image"},
                {"name": "alt", "type": "text"}
            ])
            .to_string(),
        )
        .unwrap();

        std::fs::write(
            root.join("h5p.json"),
            json!({
                "title": "Picture",
                "mainLibrary": "H5P.Image",
                "language": "en",
                "preloadedDependencies": [
                    {"machineName": "H5P.Image", "majorVersion": 1, "minorVersion": 1}
                ]
            })
            .to_string(),
        )
        .unwrap();
        std::fs::write(root.join("photo.jpg"), b"jpeg bytes").unwrap();

        Self { dir }
    }

    fn path(&self) -> &Path {
        self.dir.path()
    }

    fn content_dir(&self) -> PathBuf {
        self.path().join("content")
    }

    fn cmd(&self) -> Command {
        let mut cmd = folio();
        cmd.current_dir(self.path())
            .env_remove("FOLIO_CONFIG_DIR")
            .arg("--config-dir")
            .arg(self.path().join("config"));
        cmd
    }

    fn json(&self, args: &[&str]) -> Value {
        let output = self.cmd().arg("--json").args(args).assert().success();
        serde_json::from_slice(&output.get_output().stdout).unwrap()
    }

    fn write_params(&self, name: &str, params: Value) -> String {
        let path = self.path().join(name);
        std::fs::write(&path, params.to_string()).unwrap();
        path.display().to_string()
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Help and Version Tests
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn test_help_displays() {
    folio()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("Folio"));
}

#[test]
fn test_version_displays() {
    folio()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("folio"));
}

#[test]
fn test_help_lists_subcommands() {
    folio()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("upload"))
        .stdout(predicate::str::contains("save"))
        .stdout(predicate::str::contains("scan"))
        .stdout(predicate::str::contains("cleanup"))
        .stdout(predicate::str::contains("delete"))
        .stdout(predicate::str::contains("copy"))
        .stdout(predicate::str::contains("list"))
        .stdout(predicate::str::contains("config"));
}

#[test]
fn test_save_requires_owner() {
    folio()
        .args(["save", "--params", "p.json", "--metadata", "m.json"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("--owner"));
}

#[test]
fn test_scan_rejects_bad_library_name() {
    folio()
        .args(["scan", "--params", "p.json", "--library", "NoVersion"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("invalid library name"));
}

// ─────────────────────────────────────────────────────────────────────────────
// End-to-end Tests
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn test_upload_save_copy_delete_roundtrip() {
    let ws = Workspace::new();

    let upload = ws.json(&["upload", "photo.jpg", "--owner", "U"]);
    let reference = upload["reference"].as_str().unwrap().to_string();
    let name = upload["name"].as_str().unwrap().to_string();
    assert!(reference.ends_with("#tmp"));
    assert!(name.starts_with("photo-") && name.ends_with(".jpg"));

    let params = ws.write_params(
        "params.json",
        json!({"file": {"path": reference, "mime": "image/jpeg"}, "alt": "A photo"}),
    );
    let saved = ws.json(&["save", "--params", params.as_str(), "--metadata", "h5p.json", "--owner", "U"]);
    let id = saved["content_id"].as_str().unwrap().to_string();
    assert_eq!(saved["params"]["file"]["path"], name.as_str());
    assert_eq!(saved["outcomes"][0]["outcome"], "copied");

    let stored = ws.content_dir().join(&id).join("content").join(&name);
    assert_eq!(std::fs::read(stored).unwrap(), b"jpeg bytes");

    let listed = ws.json(&["list", "--files"]);
    assert_eq!(listed[0]["id"], id.as_str());
    assert_eq!(listed[0]["title"], "Picture");
    assert_eq!(listed[0]["files"][0], name.as_str());

    let copied = ws.json(&["copy", id.as_str(), "--owner", "U"]);
    let copy_id = copied["content_id"].as_str().unwrap().to_string();
    assert_ne!(copy_id, id);
    assert!(ws.content_dir().join(&copy_id).join("content").join(&name).is_file());

    ws.cmd()
        .args(["delete", id.as_str(), "--owner", "U"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Deleted content"));
    assert!(!ws.content_dir().join(&id).exists());
    assert!(ws.content_dir().join(&copy_id).exists());
}

#[test]
fn test_scan_lists_references() {
    let ws = Workspace::new();
    let params = ws.write_params(
        "params.json",
        json!({"file": {"path": "images/a.png#tmp"}, "alt": "x"}),
    );

    let refs = ws.json(&["scan", "--params", params.as_str(), "--library", "H5P.Image 1.1"]);
    assert_eq!(refs[0]["path"], "images/a.png#tmp");
    assert_eq!(refs[0]["temporary"], true);
    assert_eq!(refs[0]["location"], "/file");
}

#[test]
fn test_save_blanks_missing_upload() {
    let ws = Workspace::new();
    let params = ws.write_params("params.json", json!({"file": {"path": "ghost.png#tmp"}}));

    let saved = ws.json(&["save", "--params", params.as_str(), "--metadata", "h5p.json", "--owner", "U"]);
    assert_eq!(saved["params"]["file"]["path"], "");
    assert_eq!(saved["outcomes"][0]["outcome"], "blanked");
}

#[test]
fn test_cleanup_keeps_fresh_uploads() {
    let ws = Workspace::new();
    ws.json(&["upload", "photo.jpg", "--owner", "U"]);

    let result = ws.json(&["cleanup"]);
    assert_eq!(result["files_checked"], 1);
    assert_eq!(result["files_deleted"], 0);
}

#[test]
fn test_delete_unknown_content_fails() {
    let ws = Workspace::new();
    ws.cmd()
        .args(["delete", "missing", "--owner", "U"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Content not found"));
}

#[test]
fn test_config_show_reports_effective_settings() {
    let ws = Workspace::new();

    let shown = ws.json(&["config", "show"]);
    assert_eq!(shown["logging"]["file_logging"], false);
    assert_eq!(shown["temporary_files"]["lifetime_secs"], 86_400);
    assert_eq!(shown["reconciliation"]["hosted_video_mime_types"][0], "video/YouTube");

    ws.cmd()
        .args(["config", "show"])
        .assert()
        .success()
        .stdout(predicate::str::contains("[temporary_files]"))
        .stdout(predicate::str::contains("config.toml"));
}

#[test]
fn test_config_which_lists_layers() {
    let ws = Workspace::new();
    let sources = ws.json(&["config", "which"]);
    assert_eq!(sources[0]["loaded"], true);
    assert_eq!(sources[1]["loaded"], false);
}

#[test]
fn test_config_init_writes_defaults_once() {
    let ws = Workspace::new();
    let config_dir = ws.path().join("fresh");

    folio()
        .current_dir(ws.path())
        .env_remove("FOLIO_CONFIG_DIR")
        .arg("--config-dir")
        .arg(&config_dir)
        .args(["config", "init"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Created config file"));

    let written = std::fs::read_to_string(config_dir.join("config.toml")).unwrap();
    assert!(written.contains("[storage]"));
    assert!(written.contains("max_filename_length = 100"));

    folio()
        .current_dir(ws.path())
        .env_remove("FOLIO_CONFIG_DIR")
        .arg("--config-dir")
        .arg(&config_dir)
        .args(["config", "init"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("already exists"));
}
