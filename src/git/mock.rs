//! テスト用モッククローナー

use super::*;
use std::collections::HashMap;
use std::sync::Mutex;

/// URL ごとに用意したファイルをクローン先に書き出すモック
#[derive(Default)]
pub struct MockCloner {
    repos: HashMap<String, Vec<(String, String)>>,
    requests: Mutex<Vec<CloneRequest>>,
}

impl MockCloner {
    pub fn new() -> Self {
        Self::default()
    }

    /// リポジトリを登録（`files` はリポジトリルートからの相対パスと内容）
    pub fn with_repo(mut self, url: &str, files: &[(&str, &str)]) -> Self {
        self.repos.insert(
            url.to_string(),
            files
                .iter()
                .map(|(p, c)| (p.to_string(), c.to_string()))
                .collect(),
        );
        self
    }

    /// 受け取ったクローン要求
    pub fn requests(&self) -> Vec<CloneRequest> {
        self.requests.lock().unwrap().clone()
    }
}

impl Cloner for MockCloner {
    async fn clone_repo(&self, request: &CloneRequest) -> Result<()> {
        self.requests.lock().unwrap().push(request.clone());

        let files = self.repos.get(&request.url).ok_or_else(|| KrsError::Git {
            command: format!("clone {}", request.url),
            code: Some(128),
            stderr: "fatal: repository not found".to_string(),
        })?;

        for (path, content) in files {
            let target = request.dest.join(path);
            if let Some(parent) = target.parent() {
                std::fs::create_dir_all(parent)?;
            }
            std::fs::write(target, content)?;
        }
        Ok(())
    }
}
