//! CLI integration tests

use assert_cmd::prelude::*;
use predicates::prelude::*;
use std::fs::{self, File};
use std::path::Path;
use std::process::Command;
use tempfile::TempDir;
use zip::ZipArchive;

const REPOSITORY_XML: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<addon id="repository.example" name="Example Repo" version="1.0.0" provider-name="me">
  <extension point="xbmc.addon.repository" name="Example">
    <dir><datadir zip="true">https://example.com/</datadir></dir>
  </extension>
</addon>
"#;

fn krs(repo: &Path) -> Command {
    let mut cmd = Command::cargo_bin("krs").unwrap();
    cmd.arg("-C")
        .arg(repo)
        .env_remove("KRS_DATADIR")
        .env_remove("KRS_LOG")
        // git を呼ばずに失敗させる
        .env("KRS_GIT", "krs-test-missing-git");
    cmd
}

fn create_repo(readme: Option<&str>) -> TempDir {
    let temp = TempDir::new().unwrap();
    fs::write(temp.path().join("addon.xml"), REPOSITORY_XML).unwrap();
    if let Some(readme) = readme {
        fs::write(temp.path().join("README.md"), readme).unwrap();
    }
    temp
}

fn create_addon(root: &Path, id: &str) {
    fs::create_dir_all(root).unwrap();
    fs::write(
        root.join("addon.xml"),
        format!(r#"<addon id="{}" name="Local" version="0.2.0"></addon>"#, id),
    )
    .unwrap();
    fs::write(root.join("default.py"), "print('local')").unwrap();
}

fn entry_names(path: &Path) -> Vec<String> {
    let zip = ZipArchive::new(File::open(path).unwrap()).unwrap();
    zip.file_names().map(str::to_string).collect()
}

#[test]
fn test_root_help() {
    Command::cargo_bin("krs")
        .unwrap()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("Kodi add-on repository synchronizer"))
        .stdout(predicate::str::contains("SOURCE FORMATS"));
}

#[test]
fn test_version() {
    Command::cargo_bin("krs")
        .unwrap()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains(env!("CARGO_PKG_VERSION")));
}

#[test]
fn test_missing_readme_fails() {
    let repo = create_repo(None);
    krs(repo.path())
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("README not found"));
}

#[test]
fn test_missing_repository_manifest_fails() {
    let repo = create_repo(Some("# Addons\n"));
    fs::remove_file(repo.path().join("addon.xml")).unwrap();
    krs(repo.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("repository manifest"));
}

#[test]
fn test_readme_without_entries_builds_manifest_only_bundle() {
    let repo = create_repo(Some("# Addons\n\nNothing here yet.\n"));

    krs(repo.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("No add-on sources found"));

    let bundle = repo.path().join("repository.example-1.0.0.zip");
    assert_eq!(entry_names(&bundle), vec!["addon.xml"]);
    assert!(repo.path().join("addons.xml.gz").is_file());
    assert!(repo.path().join("addons.xml.gz.md5").is_file());
}

#[test]
fn test_rerun_produces_identical_artifacts() {
    let repo = create_repo(Some("# Addons\n"));
    let addon = repo.path().join("src/plugin.local");
    create_addon(&addon, "plugin.local");
    let datadir = repo.path().join("public");

    krs(repo.path()).arg("-d").arg(&datadir).arg(&addon).assert().success();
    let bundle = fs::read(datadir.join("repository.example-1.0.0.zip")).unwrap();
    let catalog = fs::read(datadir.join("addons.xml.gz")).unwrap();

    krs(repo.path()).arg("-d").arg(&datadir).arg(&addon).assert().success();
    assert_eq!(fs::read(datadir.join("repository.example-1.0.0.zip")).unwrap(), bundle);
    assert_eq!(fs::read(datadir.join("addons.xml.gz")).unwrap(), catalog);
}

#[test]
fn test_local_folder_source_is_published() {
    let repo = create_repo(Some("# Addons\n"));
    let addon = repo.path().join("src/plugin.local");
    create_addon(&addon, "plugin.local");
    let datadir = repo.path().join("public");

    krs(repo.path())
        .arg("--datadir")
        .arg(&datadir)
        .arg(&addon)
        .assert()
        .success()
        .stdout(predicate::str::contains("plugin.local"));

    assert!(datadir.join("plugin.local/plugin.local-0.2.0.zip").is_file());
    assert!(datadir.join("plugin.local/plugin.local-0.2.0.zip.md5").is_file());
    let names = entry_names(&datadir.join("repository.example-1.0.0.zip"));
    assert!(names.contains(&"plugin.local/default.py".to_string()));
}

#[test]
fn test_dry_run_lists_entries_without_writing() {
    let repo = create_repo(Some(
        "# Addons\n- [Foo](https://example.com/foo)/sub/dir develop\n- [Bar](https://example.com/bar)\n",
    ));

    krs(repo.path())
        .arg("--dry-run")
        .assert()
        .success()
        .stdout(predicate::str::contains("https://example.com/foo"))
        .stdout(predicate::str::contains("develop"))
        .stdout(predicate::str::contains("2 source(s)"));

    assert!(!repo.path().join("repository.example-1.0.0.zip").exists());
}

#[test]
fn test_dry_run_json() {
    let repo = create_repo(Some("- [Foo](https://example.com/foo)\n"));

    krs(repo.path())
        .args(["--dry-run", "--json"])
        .assert()
        .success()
        .stdout(predicate::str::contains(r#""repository_url": "https://example.com/foo""#));
}

#[test]
fn test_failed_entry_is_skipped() {
    let repo = create_repo(Some("- [Foo](https://example.com/foo)\n"));

    krs(repo.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("Failed"));

    assert_eq!(
        entry_names(&repo.path().join("repository.example-1.0.0.zip")),
        vec!["addon.xml"]
    );
}

#[test]
fn test_strict_fails_on_failed_entry() {
    let repo = create_repo(Some("- [Foo](https://example.com/foo)\n"));

    krs(repo.path())
        .arg("--strict")
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("1 source(s) failed"));
}

#[test]
fn test_json_report() {
    let repo = create_repo(Some("- [Foo](https://example.com/foo)\n"));

    let output = krs(repo.path()).arg("--json").output().unwrap();
    assert!(output.status.success());

    let report: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(report["repository"]["id"], "repository.example");
    assert_eq!(report["sources"][0]["status"], "failed");
}

#[test]
fn test_invalid_source_argument_fails() {
    let repo = create_repo(Some("# Addons\n"));

    krs(repo.path())
        .arg("not-a-source")
        .assert()
        .failure()
        .stderr(predicate::str::contains("neither a repository URL"));
}
