//! チェックサムファイル
//!
//! Kodi のリポジトリは `<file>.md5` に16進小文字のMD5を置く。

use crate::error::Result;
use md5::{Digest, Md5};
use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};

/// ファイルのMD5を16進小文字で返す
pub fn md5_hex(path: &Path) -> Result<String> {
    let mut file = File::open(path)?;
    let mut hasher = Md5::new();
    let mut buf = [0u8; 8192];
    loop {
        let n = file.read(&mut buf)?;
        if n == 0 {
            break;
        }
        hasher.update(&buf[..n]);
    }
    Ok(format!("{:x}", hasher.finalize()))
}

/// `<path>.md5` を書き出し、そのパスを返す
pub fn write_checksum_file(path: &Path) -> Result<PathBuf> {
    let digest = md5_hex(path)?;
    let mut name = path.as_os_str().to_owned();
    name.push(".md5");
    let checksum_path = PathBuf::from(name);
    std::fs::write(&checksum_path, digest)?;
    Ok(checksum_path)
}
