//! アドオンのソース
//!
//! README のエントリに加えて、コマンドラインからソースを直接指定できる。
//!
//! ## 対応フォーマット
//!
//! - `https://github.com/owner/repo.git` - Git リポジトリ
//! - `https://github.com/owner/repo.git#branch` - ブランチ指定
//! - `https://github.com/owner/repo.git#branch:sub/dir` - ブランチとサブパス指定
//! - `https://github.com/owner/repo.git:sub/dir` - サブパスのみ指定
//! - `/path/to/plugin.video.foo` - ローカルフォルダ
//! - `/path/to/plugin.video.foo-1.0.0.zip` - ローカルZIP

use crate::entry::{is_url, AddonEntry};
use crate::error::{KrsError, Result};
use serde::Serialize;
use std::fmt;
use std::path::PathBuf;

/// アドオンの取得元
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum AddonSource {
    /// Git リポジトリ
    Git(AddonEntry),
    /// ローカルフォルダ
    Folder { path: PathBuf },
    /// ローカルZIPファイル
    Zip { path: PathBuf },
}

impl AddonSource {
    /// コマンドライン引数をパース
    pub fn parse(input: &str) -> Result<Self> {
        let input = input.trim();
        if input.is_empty() {
            return Err(KrsError::InvalidSource("empty source".to_string()));
        }

        if is_url(input) {
            return parse_git_locator(input).map(AddonSource::Git);
        }

        let path = PathBuf::from(input);
        if path.is_dir() {
            return Ok(AddonSource::Folder { path });
        }
        if path.is_file() && has_zip_extension(&path) {
            return Ok(AddonSource::Zip { path });
        }

        Err(KrsError::InvalidSource(format!(
            "{} is neither a repository URL, a folder nor a zip file",
            input
        )))
    }

    /// 表示用ラベル
    pub fn label(&self) -> String {
        match self {
            AddonSource::Git(entry) => entry.label().to_string(),
            AddonSource::Folder { path } | AddonSource::Zip { path } => {
                path.display().to_string()
            }
        }
    }

    /// 種別名
    pub fn kind_name(&self) -> &'static str {
        match self {
            AddonSource::Git(_) => "git",
            AddonSource::Folder { .. } => "folder",
            AddonSource::Zip { .. } => "zip",
        }
    }
}

impl From<AddonEntry> for AddonSource {
    fn from(entry: AddonEntry) -> Self {
        AddonSource::Git(entry)
    }
}

impl fmt::Display for AddonSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AddonSource::Git(entry) => {
                write!(f, "{}", entry.repository_url)?;
                if let Some(branch) = &entry.branch {
                    write!(f, "#{}", branch)?;
                }
                if !entry.relative_path.is_empty() {
                    write!(f, ":{}", entry.relative_path)?;
                }
                Ok(())
            }
            AddonSource::Folder { path } | AddonSource::Zip { path } => {
                write!(f, "{}", path.display())
            }
        }
    }
}

/// `Url[#Branch][:AddonPath]` をパース
///
/// `:` はホスト部（ポート番号）より後ろにあるものだけをサブパスの区切りとみなす。
fn parse_git_locator(input: &str) -> Result<AddonEntry> {
    let (scheme, rest) = input
        .split_once("://")
        .ok_or_else(|| KrsError::InvalidSource(input.to_string()))?;

    let authority_end = rest.find('/').unwrap_or(rest.len());
    let (head, relative_path) = match rest[authority_end..].rfind(':') {
        Some(offset) => {
            let idx = authority_end + offset;
            (&rest[..idx], &rest[idx + 1..])
        }
        None => (rest, ""),
    };

    let (location, branch) = match head.rsplit_once('#') {
        Some((location, branch)) => (location, Some(branch.to_string())),
        None => (head, None),
    };

    let url = format!("{}://{}", scheme, location);
    let description = repository_name(&url);

    AddonEntry::new(description, url, relative_path, branch)
        .ok_or_else(|| KrsError::InvalidSource(format!("invalid repository locator: {}", input)))
}

/// URL の末尾からリポジトリ名を取り出す（`.git` は除去）
fn repository_name(url: &str) -> String {
    let last = url.trim_end_matches('/').rsplit('/').next().unwrap_or(url);
    last.strip_suffix(".git").unwrap_or(last).to_string()
}

fn has_zip_extension(path: &std::path::Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("zip"))
}

#[cfg(test)]
#[path = "source_test.rs"]
mod tests;
