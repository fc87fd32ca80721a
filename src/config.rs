//! 実行設定
//!
//! 優先順位: コマンドライン > 環境変数 > `krs.toml` > デフォルト

use crate::env::{EnvVar, KRS_DATADIR, KRS_GIT};
use crate::error::{KrsError, Result};
use glob::Pattern;
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// リポジトリフォルダに置く設定ファイル名
pub const CONFIG_FILE: &str = "krs.toml";

/// デフォルトの入力ドキュメント
pub const DEFAULT_README: &str = "README.md";

/// デフォルトの git 実行ファイル
pub const DEFAULT_GIT: &str = "git";

/// 常に除外するパターン（VCSメタデータ）
const DEFAULT_EXCLUDES: &[&str] = &[".git*"];

/// krs.toml のスキーマ
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FileConfig {
    pub datadir: Option<PathBuf>,
    pub readme: Option<PathBuf>,
    pub jobs: Option<usize>,
    pub git: Option<String>,
    pub exclude: Vec<String>,
}

impl FileConfig {
    /// TOMLからパース
    pub fn parse(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }

    /// リポジトリフォルダから読み込み（存在しなければデフォルト）
    pub fn load(repo_dir: &Path) -> Result<Self> {
        let path = repo_dir.join(CONFIG_FILE);
        if !path.is_file() {
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(&path)?;
        Self::parse(&content).map_err(|e| {
            KrsError::InvalidConfig(format!("{}: {}", path.display(), e))
        })
    }
}

/// コマンドラインから渡される上書き値
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    pub repo_dir: Option<PathBuf>,
    pub datadir: Option<PathBuf>,
    pub readme: Option<PathBuf>,
    pub jobs: Option<usize>,
}

/// ZIP作成時の除外パターン
#[derive(Debug, Clone)]
pub struct ExcludeSet {
    patterns: Vec<Pattern>,
}

impl ExcludeSet {
    /// パターン文字列から作成（デフォルトの除外パターンを含む）
    pub fn new<S: AsRef<str>>(extra: &[S]) -> Result<Self> {
        let patterns = DEFAULT_EXCLUDES
            .iter()
            .copied()
            .chain(extra.iter().map(|s| s.as_ref()))
            .map(|p| {
                Pattern::new(p)
                    .map_err(|e| KrsError::InvalidConfig(format!("exclude pattern '{}': {}", p, e)))
            })
            .collect::<Result<Vec<_>>>()?;
        Ok(Self { patterns })
    }

    /// ファイル名またはディレクトリ名が除外対象か
    pub fn is_excluded(&self, name: &str) -> bool {
        self.patterns.iter().any(|p| p.matches(name))
    }
}

impl Default for ExcludeSet {
    fn default() -> Self {
        Self {
            patterns: DEFAULT_EXCLUDES
                .iter()
                .filter_map(|p| Pattern::new(p).ok())
                .collect(),
        }
    }
}

/// 解決済みの実行設定
#[derive(Debug, Clone)]
pub struct SyncConfig {
    /// リポジトリアドオンのフォルダ（addon.xml と README.md を含む）
    pub repo_dir: PathBuf,
    /// 出力先
    pub datadir: PathBuf,
    pub readme: PathBuf,
    pub jobs: usize,
    pub git: String,
    pub exclude: ExcludeSet,
}

impl SyncConfig {
    /// 上書き値・環境変数・設定ファイルから設定を解決
    pub fn resolve(overrides: ConfigOverrides) -> Result<Self> {
        let repo_dir = match overrides.repo_dir {
            Some(dir) => dir,
            None => std::env::current_dir()?,
        };
        if !repo_dir.is_dir() {
            return Err(KrsError::InvalidConfig(format!(
                "repository folder {} does not exist",
                repo_dir.display()
            )));
        }

        let file = FileConfig::load(&repo_dir)?;
        Self::from_parts(repo_dir, file, overrides.datadir, overrides.readme, overrides.jobs)
    }

    fn from_parts(
        repo_dir: PathBuf,
        file: FileConfig,
        datadir: Option<PathBuf>,
        readme: Option<PathBuf>,
        jobs: Option<usize>,
    ) -> Result<Self> {
        let datadir = datadir
            .or_else(|| EnvVar::get(KRS_DATADIR).map(PathBuf::from))
            .or_else(|| file.datadir.map(|d| repo_dir.join(d)))
            .unwrap_or_else(|| repo_dir.clone());

        let readme = readme.unwrap_or_else(|| {
            repo_dir.join(file.readme.unwrap_or_else(|| PathBuf::from(DEFAULT_README)))
        });

        let jobs = jobs.or(file.jobs).unwrap_or(1);
        if jobs == 0 {
            return Err(KrsError::InvalidConfig("jobs must be at least 1".to_string()));
        }

        let git = EnvVar::get(KRS_GIT)
            .or(file.git)
            .unwrap_or_else(|| DEFAULT_GIT.to_string());

        let exclude = ExcludeSet::new(&file.exclude)?;

        Ok(Self {
            repo_dir,
            datadir,
            readme,
            jobs,
            git,
            exclude,
        })
    }
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
