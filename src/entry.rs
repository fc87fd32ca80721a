//! README エントリのパース
//!
//! README.md の箇条書きリンク行からアドオンのソース情報を抽出する。
//! パースは副作用を持たない純粋関数で、ネットワークなしでテストできる。
//!
//! ## 対応フォーマット
//!
//! ```text
//! - [説明](https://github.com/owner/repo)
//! - [説明](https://github.com/owner/repo)/sub/dir
//! - [説明](https://github.com/owner/repo) develop
//! - [説明](https://github.com/owner/repo)/sub/dir develop
//! ```

use regex::Regex;
use serde::Serialize;
use std::path::{Component, Path};
use std::sync::OnceLock;

/// リスト行のパターン: `- [description](url)[/relativePath] [branch]`
const ENTRY_PATTERN: &str = r"^\s*-\s+\[(?P<description>[^\]]*)\]\((?P<url>[^()\s]+)\)(?:/(?P<path>[^\s]*))?(?:[ \t]+(?P<branch>[A-Za-z0-9._/-]+))?\s*$";

/// URLとして扱う入力 (`scheme://host...`)
const URL_PATTERN: &str = r"^[A-Za-z][A-Za-z0-9+.-]*://[^/\s]+";

fn entry_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(ENTRY_PATTERN).expect("entry pattern is valid"))
}

fn url_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(URL_PATTERN).expect("url pattern is valid"))
}

/// README の1行から得られるアドオンのソース情報
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AddonEntry {
    pub description: String,
    pub repository_url: String,
    /// クローンしたリポジトリルートからの相対パス（空ならルート）
    pub relative_path: String,
    /// None の場合はリポジトリのデフォルトブランチ
    pub branch: Option<String>,
}

impl AddonEntry {
    /// 検証済みのエントリを作成
    ///
    /// URL が不正、または相対パスがリポジトリ外を指す場合は None。
    pub fn new(
        description: impl Into<String>,
        repository_url: impl Into<String>,
        relative_path: impl Into<String>,
        branch: Option<String>,
    ) -> Option<Self> {
        let repository_url = repository_url.into();
        let relative_path = normalize_relative_path(&relative_path.into())?;

        if !is_url(&repository_url) {
            return None;
        }

        Some(Self {
            description: description.into(),
            repository_url,
            relative_path,
            branch: branch.filter(|b| !b.is_empty()),
        })
    }

    /// ブランチ名（未指定なら "default"）
    pub fn branch_or_default(&self) -> &str {
        self.branch.as_deref().unwrap_or("default")
    }

    /// 表示用ラベル（説明が空なら URL）
    pub fn label(&self) -> &str {
        if self.description.trim().is_empty() {
            &self.repository_url
        } else {
            &self.description
        }
    }
}

/// 入力が `scheme://host` 形式の URL かどうか
pub fn is_url(input: &str) -> bool {
    url_regex().is_match(input)
}

/// README テキストからエントリを文書順に抽出する
///
/// パターンに一致しない行、および検証に失敗した行は黙ってスキップする。
pub fn parse_entries(markdown: &str) -> Vec<AddonEntry> {
    markdown.lines().filter_map(parse_line).collect()
}

/// 1行をパース
pub fn parse_line(line: &str) -> Option<AddonEntry> {
    let caps = entry_regex().captures(line)?;

    let description = caps.name("description").map_or("", |m| m.as_str());
    let url = caps.name("url").map_or("", |m| m.as_str());
    let path = caps.name("path").map_or("", |m| m.as_str());
    let branch = caps.name("branch").map(|m| m.as_str().to_string());

    let entry = AddonEntry::new(description.trim(), url, path, branch);
    if entry.is_none() {
        tracing::debug!(line = line.trim(), "skipping malformed entry");
    }
    entry
}

/// 相対パスを `/` 区切りに正規化する
///
/// `..`、`.`、絶対パスを含む場合は None。
fn normalize_relative_path(path: &str) -> Option<String> {
    let trimmed = path.trim().trim_matches('/');
    if trimmed.is_empty() {
        return Some(String::new());
    }
    if trimmed.contains('\\') {
        return None;
    }

    let mut parts = Vec::new();
    for component in Path::new(trimmed).components() {
        match component {
            Component::Normal(part) => parts.push(part.to_str()?.to_string()),
            _ => return None,
        }
    }
    Some(parts.join("/"))
}

#[cfg(test)]
#[path = "entry_test.rs"]
mod tests;

#[cfg(test)]
#[path = "entry_proptests.rs"]
mod proptests;
