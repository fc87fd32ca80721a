use super::*;
use serial_test::serial;
use std::fs;
use tempfile::TempDir;

fn clear_env() {
    std::env::remove_var(KRS_DATADIR);
    std::env::remove_var(KRS_GIT);
}

// === FileConfig ===

#[test]
fn test_file_config_parse() {
    let config = FileConfig::parse(
        r#"
datadir = "public"
readme = "docs/ADDONS.md"
jobs = 4
git = "/usr/local/bin/git"
exclude = ["*.pyc", "__pycache__"]
"#,
    )
    .unwrap();
    assert_eq!(config.datadir, Some(PathBuf::from("public")));
    assert_eq!(config.readme, Some(PathBuf::from("docs/ADDONS.md")));
    assert_eq!(config.jobs, Some(4));
    assert_eq!(config.git.as_deref(), Some("/usr/local/bin/git"));
    assert_eq!(config.exclude, vec!["*.pyc", "__pycache__"]);
}

#[test]
fn test_file_config_rejects_unknown_keys() {
    assert!(FileConfig::parse("unknown = true").is_err());
}

#[test]
fn test_file_config_load_missing_is_default() {
    let temp = TempDir::new().unwrap();
    let config = FileConfig::load(temp.path()).unwrap();
    assert!(config.datadir.is_none());
    assert!(config.exclude.is_empty());
}

#[test]
fn test_file_config_load_invalid() {
    let temp = TempDir::new().unwrap();
    fs::write(temp.path().join(CONFIG_FILE), "jobs = \"many\"").unwrap();
    let err = FileConfig::load(temp.path()).unwrap_err();
    assert!(matches!(err, KrsError::InvalidConfig(_)));
}

// === ExcludeSet ===

#[test]
fn test_exclude_set_defaults() {
    let exclude = ExcludeSet::default();
    assert!(exclude.is_excluded(".git"));
    assert!(exclude.is_excluded(".gitignore"));
    assert!(exclude.is_excluded(".github"));
    assert!(!exclude.is_excluded("addon.xml"));
}

#[test]
fn test_exclude_set_extra_patterns() {
    let exclude = ExcludeSet::new(&["*.pyc", "tests"]).unwrap();
    assert!(exclude.is_excluded("main.pyc"));
    assert!(exclude.is_excluded("tests"));
    assert!(exclude.is_excluded(".gitattributes"));
    assert!(!exclude.is_excluded("main.py"));
}

#[test]
fn test_exclude_set_invalid_pattern() {
    let err = ExcludeSet::new(&["[unclosed"]).unwrap_err();
    assert!(err.to_string().contains("exclude pattern"));
}

// === SyncConfig ===

#[test]
#[serial]
fn test_resolve_defaults() {
    clear_env();
    let temp = TempDir::new().unwrap();
    let config = SyncConfig::resolve(ConfigOverrides {
        repo_dir: Some(temp.path().to_path_buf()),
        ..Default::default()
    })
    .unwrap();

    assert_eq!(config.repo_dir, temp.path());
    assert_eq!(config.datadir, temp.path());
    assert_eq!(config.readme, temp.path().join(DEFAULT_README));
    assert_eq!(config.jobs, 1);
    assert_eq!(config.git, DEFAULT_GIT);
}

#[test]
#[serial]
fn test_resolve_file_values_are_relative_to_repo() {
    clear_env();
    let temp = TempDir::new().unwrap();
    fs::write(
        temp.path().join(CONFIG_FILE),
        "datadir = \"out\"\nreadme = \"ADDONS.md\"\njobs = 3\n",
    )
    .unwrap();

    let config = SyncConfig::resolve(ConfigOverrides {
        repo_dir: Some(temp.path().to_path_buf()),
        ..Default::default()
    })
    .unwrap();

    assert_eq!(config.datadir, temp.path().join("out"));
    assert_eq!(config.readme, temp.path().join("ADDONS.md"));
    assert_eq!(config.jobs, 3);
}

#[test]
#[serial]
fn test_resolve_precedence_cli_env_file() {
    clear_env();
    let temp = TempDir::new().unwrap();
    fs::write(
        temp.path().join(CONFIG_FILE),
        "datadir = \"from-file\"\ngit = \"file-git\"\njobs = 2\n",
    )
    .unwrap();

    std::env::set_var(KRS_DATADIR, "/from/env");
    std::env::set_var(KRS_GIT, "env-git");

    let from_env = SyncConfig::resolve(ConfigOverrides {
        repo_dir: Some(temp.path().to_path_buf()),
        ..Default::default()
    })
    .unwrap();
    assert_eq!(from_env.datadir, PathBuf::from("/from/env"));
    assert_eq!(from_env.git, "env-git");

    let from_cli = SyncConfig::resolve(ConfigOverrides {
        repo_dir: Some(temp.path().to_path_buf()),
        datadir: Some(PathBuf::from("/from/cli")),
        jobs: Some(8),
        ..Default::default()
    })
    .unwrap();
    assert_eq!(from_cli.datadir, PathBuf::from("/from/cli"));
    assert_eq!(from_cli.jobs, 8);

    clear_env();
}

#[test]
#[serial]
fn test_resolve_zero_jobs_rejected() {
    clear_env();
    let temp = TempDir::new().unwrap();
    let err = SyncConfig::resolve(ConfigOverrides {
        repo_dir: Some(temp.path().to_path_buf()),
        jobs: Some(0),
        ..Default::default()
    })
    .unwrap_err();
    assert!(err.to_string().contains("jobs must be at least 1"));
}

#[test]
fn test_resolve_missing_repo_dir() {
    let err = SyncConfig::resolve(ConfigOverrides {
        repo_dir: Some(PathBuf::from("/definitely/not/a/repo")),
        ..Default::default()
    })
    .unwrap_err();
    assert!(err.is_fatal());
}
