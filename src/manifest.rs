//! addon.xml の読み込み
//!
//! Kodi アドオンのマニフェスト（`addon.xml`）から id / version などを取り出す。
//! 必要なのはルート要素の属性と `<datadir>` だけなので、正規表現で走査する。

use crate::error::{KrsError, Result};
use regex::Regex;
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

/// マニフェストのファイル名
pub const ADDON_XML: &str = "addon.xml";

/// リポジトリアドオンの拡張ポイント
const REPOSITORY_EXTENSION_POINT: &str = "xbmc.addon.repository";

fn root_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        // 引用符内の `>` は属性値の一部
        Regex::new(r#"<addon\b(?P<attrs>(?:[^>"']|"[^"]*"|'[^']*')*)>"#)
            .expect("root pattern is valid")
    })
}

fn attr_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r#"(?P<key>[A-Za-z_:][-A-Za-z0-9_:.]*)\s*=\s*(?:"(?P<dq>[^"]*)"|'(?P<sq>[^']*)')"#)
            .expect("attribute pattern is valid")
    })
}

fn declaration_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^\s*<\?xml[^>]*\?>\s*").expect("declaration pattern is valid"))
}

fn datadir_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"(?s)<datadir\b[^>]*>(?P<value>.*?)</datadir>").expect("datadir pattern is valid")
    })
}

fn id_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^[a-z0-9._-]+$").expect("id pattern is valid"))
}

fn version_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^(\d+\.\d+\.\d+)").expect("version pattern is valid"))
}

/// アドオンのマニフェスト
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AddonManifest {
    pub id: String,
    /// `N.N.N` に正規化したバージョン（ファイル名に使用）
    pub version: String,
    pub name: Option<String>,
    pub provider: Option<String>,
    /// XML宣言を除いた `<addon>` 要素全体
    #[serde(skip)]
    pub element: String,
}

impl AddonManifest {
    /// addon.xml の内容をパース
    pub fn parse(content: &str) -> Result<Self> {
        let content = content.trim_start_matches('\u{feff}');
        let attrs = root_attributes(content)?;
        let lookup = |key: &str| {
            attrs
                .iter()
                .find(|(k, _)| k == key)
                .map(|(_, v)| v.clone())
        };

        let id = lookup("id")
            .ok_or_else(|| KrsError::InvalidManifest("missing addon id".to_string()))?;
        if !id_regex().is_match(&id) {
            return Err(KrsError::InvalidManifest(format!("Invalid addon ID: {}", id)));
        }

        let raw_version = lookup("version")
            .ok_or_else(|| KrsError::InvalidManifest(format!("missing version for {}", id)))?;
        let version = version_regex()
            .captures(&raw_version)
            .and_then(|c| c.get(1))
            .map(|m| m.as_str().to_string())
            .ok_or_else(|| {
                KrsError::InvalidManifest(format!("Invalid addon version: {}", raw_version))
            })?;

        Ok(Self {
            id,
            version,
            name: lookup("name"),
            provider: lookup("provider-name"),
            element: declaration_regex().replace(content, "").trim().to_string(),
        })
    }

    /// ファイルから読み込み
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            KrsError::InvalidManifest(format!("cannot read {}: {}", path.display(), e))
        })?;
        Self::parse(&content)
    }

    /// アドオンディレクトリから addon.xml を読み込み
    pub fn load_from_dir(dir: &Path) -> Result<Self> {
        let path = dir.join(ADDON_XML);
        if !path.is_file() {
            return Err(KrsError::InvalidManifest(format!(
                "{} not found in {}",
                ADDON_XML,
                dir.display()
            )));
        }
        Self::load(&path)
    }

    /// `<id>-<version>` 形式のファイル名を作成
    pub fn versioned_file_name(&self, stem: &str, extension: &str) -> String {
        format!("{}-{}.{}", stem, self.version, extension)
    }
}

/// リポジトリアドオン自身のマニフェスト
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RepositoryManifest {
    pub id: String,
    pub version: String,
    pub name: Option<String>,
    /// `<datadir>` に記載されたデータディレクトリ（通常はURL）
    pub data_dir: Option<String>,
    /// リポジトリフォルダ内の addon.xml のパス
    pub path: PathBuf,
    #[serde(skip)]
    pub addon: AddonManifest,
}

impl RepositoryManifest {
    /// リポジトリフォルダから addon.xml を読み込み
    pub fn load(repo_dir: &Path) -> Result<Self> {
        let path = repo_dir.join(ADDON_XML);
        let content = std::fs::read_to_string(&path).map_err(|e| {
            KrsError::InvalidManifest(format!(
                "repository manifest {} unreadable: {}",
                path.display(),
                e
            ))
        })?;
        Self::parse(&content, path)
    }

    /// 内容をパース
    pub fn parse(content: &str, path: PathBuf) -> Result<Self> {
        let addon = AddonManifest::parse(content)?;

        if !content.contains(REPOSITORY_EXTENSION_POINT) {
            tracing::warn!(
                id = %addon.id,
                "manifest does not declare the {} extension point",
                REPOSITORY_EXTENSION_POINT
            );
        }

        let data_dir = datadir_regex()
            .captures(content)
            .and_then(|c| c.name("value"))
            .map(|m| unescape(m.as_str().trim()))
            .filter(|s| !s.is_empty());

        Ok(Self {
            id: addon.id.clone(),
            version: addon.version.clone(),
            name: addon.name.clone(),
            data_dir,
            path,
            addon,
        })
    }

    /// 配布アーカイブのファイル名 (`<repo-id>-<version>.zip`)
    pub fn archive_file_name(&self) -> String {
        self.addon.versioned_file_name(&self.id, "zip")
    }
}

/// ルート `<addon>` 要素の属性一覧
fn root_attributes(content: &str) -> Result<Vec<(String, String)>> {
    let caps = root_regex()
        .captures(content)
        .ok_or_else(|| KrsError::InvalidManifest("no <addon> root element".to_string()))?;
    let attrs = caps.name("attrs").map_or("", |m| m.as_str());

    Ok(attr_regex()
        .captures_iter(attrs)
        .map(|c| {
            let key = c["key"].to_string();
            let value = c
                .name("dq")
                .or_else(|| c.name("sq"))
                .map_or("", |m| m.as_str());
            (key, unescape(value))
        })
        .collect())
}

/// XMLの定義済み実体参照を展開
fn unescape(value: &str) -> String {
    value
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&apos;", "'")
        .replace("&amp;", "&")
}

#[cfg(test)]
#[path = "manifest_test.rs"]
mod tests;
