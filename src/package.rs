//! 配布アーカイブの作成
//!
//! `<repo-id>-<version>.zip` にリポジトリの addon.xml（ルート直下）と、
//! 取得したアドオンごとのトップレベルフォルダ（アドオンID名）を格納する。

use crate::archive::ArchiveWriter;
use crate::config::ExcludeSet;
use crate::error::Result;
use crate::fetch::FetchedAddon;
use crate::manifest::{RepositoryManifest, ADDON_XML};
use std::fs;
use std::path::{Path, PathBuf};

/// 配布アーカイブを書き出し、そのパスを返す
///
/// フォルダはアドオンID順に並べるので、入力の順序に依存しない。
pub fn package(
    repository: &RepositoryManifest,
    addons: &[FetchedAddon],
    datadir: &Path,
    exclude: &ExcludeSet,
) -> Result<PathBuf> {
    let path = datadir.join(repository.archive_file_name());
    let mut writer = ArchiveWriter::create(&path)?;

    let manifest = fs::read(&repository.path)?;
    writer.add_bytes(ADDON_XML, &manifest)?;

    let mut sorted: Vec<&FetchedAddon> = addons.iter().collect();
    sorted.sort_by(|a, b| a.manifest.id.cmp(&b.manifest.id));

    for addon in sorted {
        let files = writer.add_tree(&addon.manifest.id, &addon.dir, exclude)?;
        tracing::debug!(id = %addon.manifest.id, files, "packaged addon");
    }

    let entries = writer.entry_count();
    let path = writer.finish()?;
    tracing::info!(path = %path.display(), entries, "wrote repository archive");
    Ok(path)
}

#[cfg(test)]
#[path = "package_test.rs"]
mod tests;
