//! 同期結果の定義

use crate::publish::PublishedAddon;
use crate::source::AddonSource;
use serde::Serialize;
use std::path::PathBuf;

/// ソースごとの結果
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum SourceOutcome {
    /// 取得・公開に成功
    Published { addon: PublishedAddon },
    /// 失敗（スキップして継続）
    Failed { error: String },
}

/// ソースと結果の組
#[derive(Debug, Clone, Serialize)]
pub struct SourceReport {
    pub source: AddonSource,
    #[serde(flatten)]
    pub outcome: SourceOutcome,
}

impl SourceReport {
    pub fn published(source: AddonSource, addon: PublishedAddon) -> Self {
        Self {
            source,
            outcome: SourceOutcome::Published { addon },
        }
    }

    pub fn failed(source: AddonSource, error: impl Into<String>) -> Self {
        Self {
            source,
            outcome: SourceOutcome::Failed {
                error: error.into(),
            },
        }
    }

    pub fn is_published(&self) -> bool {
        matches!(self.outcome, SourceOutcome::Published { .. })
    }
}

/// 同期結果
///
/// `sources` は入力と同じ順序（完了順ではない）。
#[derive(Debug, Clone, Serialize)]
pub struct SyncReport {
    /// リポジトリアドオン自身
    pub repository: PublishedAddon,
    pub sources: Vec<SourceReport>,
    /// addons.xml.gz
    pub catalog: PathBuf,
    pub catalog_checksum: PathBuf,
    /// `<repo-id>-<version>.zip`
    pub archive: PathBuf,
}

impl SyncReport {
    /// 全ソース数
    pub fn total_count(&self) -> usize {
        self.sources.len()
    }

    /// 公開に成功したソース数
    pub fn success_count(&self) -> usize {
        self.sources.iter().filter(|s| s.is_published()).count()
    }

    /// 失敗数
    pub fn failure_count(&self) -> usize {
        self.total_count() - self.success_count()
    }

    /// 全て成功したか
    pub fn is_success(&self) -> bool {
        self.failure_count() == 0
    }

    /// 失敗したソースとエラーメッセージ
    pub fn failures(&self) -> impl Iterator<Item = (&AddonSource, &str)> {
        self.sources.iter().filter_map(|s| match &s.outcome {
            SourceOutcome::Failed { error } => Some((&s.source, error.as_str())),
            SourceOutcome::Published { .. } => None,
        })
    }
}
