use std::path::PathBuf;
use thiserror::Error;

/// KRS統一エラー型
#[derive(Debug, Error)]
pub enum KrsError {
    #[error("README not found: {}", .0.display())]
    ReadmeNotFound(PathBuf),

    #[error("Invalid manifest: {0}")]
    InvalidManifest(String),

    #[error("Invalid source: {0}")]
    InvalidSource(String),

    #[error("git {command} failed (exit status {status}): {stderr}", status = .code.map_or_else(|| "none".to_string(), |c| c.to_string()))]
    Git {
        command: String,
        code: Option<i32>,
        stderr: String,
    },

    #[error("Invalid config: {0}")]
    InvalidConfig(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("Zip error: {0}")]
    Zip(#[from] zip::result::ZipError),

    #[error("Directory walk error: {0}")]
    Walk(#[from] walkdir::Error),

    #[error("Task error: {0}")]
    Join(#[from] tokio::task::JoinError),
}

pub type Result<T> = std::result::Result<T, KrsError>;

impl KrsError {
    /// 実行全体を中断すべきエラーかどうか
    ///
    /// エントリ単位のエラー（clone失敗、マニフェスト不正など）はスキップして継続する。
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            KrsError::ReadmeNotFound(_) | KrsError::InvalidConfig(_) | KrsError::Join(_)
        )
    }
}
