//! リポジトリカタログ (`addons.xml.gz`)

use crate::checksum::write_checksum_file;
use crate::error::Result;
use crate::manifest::AddonManifest;
use flate2::{Compression, GzBuilder};
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

/// カタログのファイル名
pub const CATALOG_FILE: &str = "addons.xml.gz";

/// カタログの出力結果
#[derive(Debug, Clone)]
pub struct CatalogFiles {
    pub catalog: PathBuf,
    pub checksum: PathBuf,
}

/// `<addons>` ドキュメントを組み立てる
pub fn render_catalog<'a>(manifests: impl IntoIterator<Item = &'a AddonManifest>) -> String {
    let mut xml = String::from("<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n<addons>\n");
    for manifest in manifests {
        xml.push_str(&manifest.element);
        xml.push('\n');
    }
    xml.push_str("</addons>\n");
    xml
}

/// `addons.xml.gz` とチェックサムを書き出す
///
/// gzip ヘッダの mtime は 0 に固定する。
pub fn write_catalog<'a>(
    datadir: &Path,
    manifests: impl IntoIterator<Item = &'a AddonManifest>,
) -> Result<CatalogFiles> {
    fs::create_dir_all(datadir)?;
    let xml = render_catalog(manifests);
    let catalog = datadir.join(CATALOG_FILE);

    let file = BufWriter::new(File::create(&catalog)?);
    let mut encoder = GzBuilder::new()
        .mtime(0)
        .write(file, Compression::default());
    encoder.write_all(xml.as_bytes())?;
    encoder.finish()?.flush()?;

    let checksum = write_checksum_file(&catalog)?;
    tracing::info!(path = %catalog.display(), "wrote catalog");
    Ok(CatalogFiles { catalog, checksum })
}
