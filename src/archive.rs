//! 再現可能なZIPの作成
//!
//! 同じ入力からは常に同じバイト列になるよう、エントリはファイル名順に並べ、
//! タイムスタンプ（1980-01-01）とパーミッションを固定する。

use crate::config::ExcludeSet;
use crate::error::{KrsError, Result};
use std::fs::{self, File};
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};
use walkdir::WalkDir;
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, DateTime, ZipWriter};

/// 書き込み中の `.partial` ファイル
///
/// `persist` されずに drop された場合は削除する。
struct PartialFile {
    path: PathBuf,
    persisted: bool,
}

impl PartialFile {
    fn persist(mut self, target: &Path) -> Result<()> {
        fs::rename(&self.path, target)?;
        self.persisted = true;
        Ok(())
    }
}

impl Drop for PartialFile {
    fn drop(&mut self) {
        if !self.persisted {
            let _ = fs::remove_file(&self.path);
        }
    }
}

/// 一時ファイルに書き、完了時にリネームするZIPライタ
///
/// `finish` 前にエラーで破棄された場合、一時ファイルは残らない。
pub struct ArchiveWriter {
    // partial より先に drop して、ファイルを閉じてから削除する
    zip: ZipWriter<BufWriter<File>>,
    partial: PartialFile,
    options: SimpleFileOptions,
    path: PathBuf,
    entries: usize,
}

impl ArchiveWriter {
    /// 出力先を指定して作成（親ディレクトリも作成）
    pub fn create(path: &Path) -> Result<Self> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let mut tmp_name = path.as_os_str().to_owned();
        tmp_name.push(".partial");
        let tmp_path = PathBuf::from(tmp_name);

        let file = File::create(&tmp_path)?;
        let mut partial = PartialFile {
            path: tmp_path,
            persisted: false,
        };
        // add_tree で自身を除外するため絶対パスで保持
        partial.path = fs::canonicalize(&partial.path)?;
        let options = SimpleFileOptions::default()
            .compression_method(CompressionMethod::Deflated)
            .last_modified_time(DateTime::default())
            .unix_permissions(0o644);

        Ok(Self {
            zip: ZipWriter::new(BufWriter::new(file)),
            partial,
            options,
            path: path.to_path_buf(),
            entries: 0,
        })
    }

    /// バイト列をエントリとして追加
    pub fn add_bytes(&mut self, name: &str, content: &[u8]) -> Result<()> {
        self.zip.start_file(name, self.options)?;
        self.zip.write_all(content)?;
        self.entries += 1;
        Ok(())
    }

    /// ファイルをエントリとして追加
    pub fn add_file(&mut self, name: &str, source: &Path) -> Result<()> {
        self.zip.start_file(name, self.options)?;
        let mut file = File::open(source)?;
        io::copy(&mut file, &mut self.zip)?;
        self.entries += 1;
        Ok(())
    }

    /// ディレクトリ配下を `prefix/` 以下に追加し、追加したファイル数を返す
    ///
    /// 除外パターンに一致する名前のファイル・ディレクトリは丸ごとスキップする。
    /// シンボリックリンクは追従しない。書き込み中のこのアーカイブ自身は含めない。
    pub fn add_tree(&mut self, prefix: &str, root: &Path, exclude: &ExcludeSet) -> Result<usize> {
        let root = fs::canonicalize(root)?;
        let mut added = 0;
        let walker = WalkDir::new(&root)
            .sort_by_file_name()
            .into_iter()
            .filter_entry(|e| {
                e.depth() == 0 || !e.file_name().to_str().is_some_and(|n| exclude.is_excluded(n))
            });

        for entry in walker {
            let entry = entry?;
            if !entry.file_type().is_file() || entry.path() == self.partial.path {
                continue;
            }
            let relative = entry_name(entry.path().strip_prefix(&root).map_err(|_| {
                KrsError::InvalidSource(format!("{} escapes {}", entry.path().display(), root.display()))
            })?)?;
            self.add_file(&format!("{}/{}", prefix, relative), entry.path())?;
            added += 1;
        }
        Ok(added)
    }

    /// 書き込んだエントリ数
    pub fn entry_count(&self) -> usize {
        self.entries
    }

    /// ZIPを閉じて出力先に移動し、そのパスを返す
    pub fn finish(self) -> Result<PathBuf> {
        let mut writer = self.zip.finish()?;
        writer.flush()?;
        drop(writer);
        self.partial.persist(&self.path)?;
        Ok(self.path)
    }
}

/// 相対パスを `/` 区切りのエントリ名に変換
fn entry_name(relative: &Path) -> Result<String> {
    let parts = relative
        .components()
        .map(|c| {
            c.as_os_str().to_str().map(str::to_string).ok_or_else(|| {
                KrsError::InvalidSource(format!("non UTF-8 path: {}", relative.display()))
            })
        })
        .collect::<Result<Vec<_>>>()?;
    Ok(parts.join("/"))
}

#[cfg(test)]
#[path = "archive_test.rs"]
mod tests;
