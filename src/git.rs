//! Git クライアント
//!
//! ローカルの `git` コマンドでシャロークローンする。
//! テストでは `Cloner` を差し替えてネットワークなしで実行できる。

use crate::error::{KrsError, Result};
use std::future::Future;
use std::path::{Path, PathBuf};
use tokio::process::Command;

/// クローン要求
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CloneRequest {
    pub url: String,
    /// None の場合はリモートのデフォルトブランチ
    pub branch: Option<String>,
    pub dest: PathBuf,
}

impl CloneRequest {
    /// `git clone` の引数を組み立てる
    pub fn args(&self) -> Vec<String> {
        let mut args = vec![
            "clone".to_string(),
            "--quiet".to_string(),
            "--depth".to_string(),
            "1".to_string(),
            "--single-branch".to_string(),
        ];
        if let Some(branch) = &self.branch {
            args.push("--branch".to_string());
            args.push(branch.clone());
        }
        args.push("--".to_string());
        args.push(self.url.clone());
        args.push(self.dest.to_string_lossy().into_owned());
        args
    }
}

/// リポジトリを作業ディレクトリに取得する
pub trait Cloner: Send + Sync + 'static {
    fn clone_repo(&self, request: &CloneRequest) -> impl Future<Output = Result<()>> + Send;
}

/// `git` コマンドによる実装
#[derive(Debug, Clone)]
pub struct GitCli {
    program: String,
}

impl GitCli {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
        }
    }

    pub fn program(&self) -> &str {
        &self.program
    }
}

impl Default for GitCli {
    fn default() -> Self {
        Self::new(crate::config::DEFAULT_GIT)
    }
}

impl Cloner for GitCli {
    async fn clone_repo(&self, request: &CloneRequest) -> Result<()> {
        let args = request.args();
        tracing::debug!(program = %self.program, ?args, "running git");

        let output = Command::new(&self.program)
            .args(&args)
            .env("GIT_TERMINAL_PROMPT", "0")
            .kill_on_drop(true)
            .output()
            .await
            .map_err(|e| KrsError::Git {
                command: "clone".to_string(),
                code: None,
                stderr: format!("cannot run {}: {}", self.program, e),
            })?;

        if !output.status.success() {
            return Err(KrsError::Git {
                command: format!("clone {}", request.url),
                code: output.status.code(),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }

        Ok(())
    }
}

/// クローン先のサブパスを解決する
///
/// サブパスが存在しない場合はエラー。
pub fn resolve_subpath(root: &Path, relative_path: &str) -> Result<PathBuf> {
    if relative_path.is_empty() {
        return Ok(root.to_path_buf());
    }

    let path = root.join(relative_path);
    if !path.is_dir() {
        return Err(KrsError::InvalidSource(format!(
            "path '{}' not found in repository",
            relative_path
        )));
    }
    Ok(path)
}

#[cfg(test)]
pub mod mock;

#[cfg(test)]
#[path = "git_test.rs"]
mod tests;
