//! 環境変数

/// データディレクトリの上書き
pub const KRS_DATADIR: &str = "KRS_DATADIR";
/// git 実行ファイルの上書き
pub const KRS_GIT: &str = "KRS_GIT";
/// ログフィルタ（tracing の EnvFilter 構文）
pub const KRS_LOG: &str = "KRS_LOG";

/// 環境変数ユーティリティ
pub struct EnvVar;

impl EnvVar {
    /// 環境変数を取得（空文字列はNoneとして扱う）
    pub fn get(key: &str) -> Option<String> {
        std::env::var(key).ok().filter(|s| !s.is_empty())
    }
}

#[cfg(test)]
#[path = "env_test.rs"]
mod tests;
