//! アドオンの取得
//!
//! ソース種別ごとにアドオンのルートディレクトリを用意し、addon.xml を検証する。
//!
//! - Git: 作業ディレクトリにシャロークローンし、サブパスに絞り込む
//! - フォルダ: そのまま使用
//! - ZIP: 作業ディレクトリに展開し、addon.xml を含むフォルダをルートとする

use crate::error::{KrsError, Result};
use crate::git::{resolve_subpath, CloneRequest, Cloner};
use crate::manifest::{AddonManifest, ADDON_XML};
use crate::source::AddonSource;
use std::fs;
use std::io::Read;
use std::path::{Component, Path, PathBuf};
use walkdir::WalkDir;
use zip::ZipArchive;

/// 取得済みのアドオン
#[derive(Debug, Clone)]
pub struct FetchedAddon {
    pub source: AddonSource,
    /// アドオンのルート（addon.xml を含む）
    pub dir: PathBuf,
    pub manifest: AddonManifest,
}

/// ソースを取得する
///
/// `workdir` 配下の `slot` 名のディレクトリを作業領域として使う。
pub async fn fetch<C: Cloner>(
    cloner: &C,
    source: &AddonSource,
    workdir: &Path,
    slot: &str,
) -> Result<FetchedAddon> {
    let dir = match source {
        AddonSource::Git(entry) => {
            let dest = workdir.join(slot);
            let request = CloneRequest {
                url: entry.repository_url.clone(),
                branch: entry.branch.clone(),
                dest: dest.clone(),
            };
            cloner.clone_repo(&request).await?;
            resolve_subpath(&dest, &entry.relative_path)?
        }
        AddonSource::Folder { path } => {
            if !path.is_dir() {
                return Err(KrsError::InvalidSource(format!(
                    "folder {} does not exist",
                    path.display()
                )));
            }
            // データディレクトリ内のフォルダと同一か判定できるよう正規化
            fs::canonicalize(path)?
        }
        AddonSource::Zip { path } => {
            let dest = workdir.join(slot);
            extract_zip(path, &dest)?;
            find_addon_root(&dest)?
        }
    };

    let manifest = AddonManifest::load_from_dir(&dir)?;
    tracing::info!(id = %manifest.id, version = %manifest.version, "fetched {}", source);

    Ok(FetchedAddon {
        source: source.clone(),
        dir,
        manifest,
    })
}

/// ZIPファイルを展開する
///
/// `..` や絶対パスを含むエントリ（zip-slip）、シンボリックリンクはエラー。
pub fn extract_zip(archive_path: &Path, dest: &Path) -> Result<()> {
    let file = fs::File::open(archive_path)?;
    let mut zip = ZipArchive::new(file)?;
    fs::create_dir_all(dest)?;

    for i in 0..zip.len() {
        let mut entry = zip.by_index(i)?;
        // バックスラッシュをスラッシュに正規化（Windows由来のzip対応）
        let name = entry.name().replace('\\', "/");
        let relative = Path::new(&name);

        let unsafe_component = relative
            .components()
            .any(|c| !matches!(c, Component::Normal(_)));
        if name.is_empty() || unsafe_component {
            return Err(KrsError::InvalidSource(format!(
                "unsafe entry '{}' in {}",
                name,
                archive_path.display()
            )));
        }

        // S_IFLNK = 0o120000
        if entry.unix_mode().is_some_and(|mode| mode & 0o170000 == 0o120000) {
            return Err(KrsError::InvalidSource(format!(
                "symlink entry '{}' in {}",
                name,
                archive_path.display()
            )));
        }

        let target = dest.join(relative);
        if entry.is_dir() {
            fs::create_dir_all(&target)?;
            continue;
        }

        if let Some(parent) = target.parent() {
            fs::create_dir_all(parent)?;
        }
        let mut content = Vec::new();
        entry.read_to_end(&mut content)?;
        fs::write(&target, content)?;
    }

    Ok(())
}

/// 展開先から addon.xml を含む最も浅いフォルダを探す
pub fn find_addon_root(root: &Path) -> Result<PathBuf> {
    WalkDir::new(root)
        .sort_by_file_name()
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_file() && e.file_name() == ADDON_XML)
        .min_by_key(|e| e.depth())
        .and_then(|e| e.path().parent().map(Path::to_path_buf))
        .ok_or_else(|| {
            KrsError::InvalidManifest(format!("{} not found in archive", ADDON_XML))
        })
}

#[cfg(test)]
#[path = "fetch_test.rs"]
mod tests;
