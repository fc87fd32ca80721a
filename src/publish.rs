//! アドオンの公開
//!
//! データディレクトリに Kodi リポジトリのレイアウトで配置する。
//!
//! ```text
//! <datadir>/<id>/<id>-<version>.zip
//! <datadir>/<id>/<id>-<version>.zip.md5
//! <datadir>/<id>/addon.xml
//! <datadir>/<id>/icon.png
//! <datadir>/<id>/fanart.jpg
//! <datadir>/<id>/changelog-<version>.txt
//! ```

use crate::archive::ArchiveWriter;
use crate::checksum::write_checksum_file;
use crate::config::ExcludeSet;
use crate::error::Result;
use crate::manifest::{AddonManifest, ADDON_XML};
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};

/// アドオンフォルダの横に置く画像ファイル
pub const ASSET_FILES: &[&str] = &["icon.png", "fanart.jpg"];

const CHANGELOG_STEM: &str = "changelog";
const CHANGELOG_FILE: &str = "changelog.txt";

/// ZIPに含める範囲
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ZipContents {
    /// フォルダ全体
    Tree,
    /// addon.xml・画像・changelog のみ（リポジトリアドオン自身）
    InfoFiles,
}

/// 公開結果
#[derive(Debug, Clone, Serialize)]
pub struct PublishedAddon {
    pub id: String,
    pub version: String,
    pub zip_path: PathBuf,
    /// 今回ZIPを作成したか（既存のバージョンは作り直さない）
    pub created: bool,
}

/// アドオンをデータディレクトリに公開する
pub fn publish_addon(
    manifest: &AddonManifest,
    addon_dir: &Path,
    datadir: &Path,
    contents: ZipContents,
    exclude: &ExcludeSet,
) -> Result<PublishedAddon> {
    let target_dir = datadir.join(&manifest.id);
    fs::create_dir_all(&target_dir)?;

    let zip_path = target_dir.join(manifest.versioned_file_name(&manifest.id, "zip"));
    let created = !zip_path.is_file();
    if created {
        write_addon_zip(manifest, addon_dir, &zip_path, contents, exclude)?;
        tracing::info!(id = %manifest.id, path = %zip_path.display(), "created addon zip");
    } else {
        tracing::debug!(id = %manifest.id, "zip for version {} already published", manifest.version);
    }
    write_checksum_file(&zip_path)?;

    for name in std::iter::once(ADDON_XML).chain(ASSET_FILES.iter().copied()) {
        copy_if_present(&addon_dir.join(name), &target_dir.join(name))?;
    }
    copy_if_present(
        &addon_dir.join(CHANGELOG_FILE),
        &target_dir.join(manifest.versioned_file_name(CHANGELOG_STEM, "txt")),
    )?;

    Ok(PublishedAddon {
        id: manifest.id.clone(),
        version: manifest.version.clone(),
        zip_path,
        created,
    })
}

fn write_addon_zip(
    manifest: &AddonManifest,
    addon_dir: &Path,
    zip_path: &Path,
    contents: ZipContents,
    exclude: &ExcludeSet,
) -> Result<()> {
    let mut writer = ArchiveWriter::create(zip_path)?;
    match contents {
        ZipContents::Tree => {
            writer.add_tree(&manifest.id, addon_dir, exclude)?;
        }
        ZipContents::InfoFiles => {
            let names = std::iter::once(ADDON_XML)
                .chain(ASSET_FILES.iter().copied())
                .chain(std::iter::once(CHANGELOG_FILE));
            for name in names {
                let path = addon_dir.join(name);
                if path.is_file() {
                    writer.add_file(&format!("{}/{}", manifest.id, name), &path)?;
                }
            }
        }
    }
    writer.finish()?;
    Ok(())
}

/// ファイルが存在すればコピー（同一ファイルならスキップ）
fn copy_if_present(src: &Path, dst: &Path) -> Result<()> {
    if !src.is_file() || is_same_file(src, dst) {
        return Ok(());
    }
    fs::copy(src, dst)?;
    Ok(())
}

/// 表記が異なっても同じファイルを指すか（`..` や相対パスを解決して比較）
fn is_same_file(a: &Path, b: &Path) -> bool {
    match (fs::canonicalize(a), fs::canonicalize(b)) {
        (Ok(a), Ok(b)) => a == b,
        _ => false,
    }
}

#[cfg(test)]
#[path = "publish_test.rs"]
mod tests;
