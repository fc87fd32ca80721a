//! 同期パイプライン
//!
//! README（またはコマンドライン）のソースを取得し、データディレクトリに公開する。
//!
//! ```text
//! parse -> fetch-all -> publish -> catalog -> package
//! ```
//!
//! ## 使い方
//!
//! ```ignore
//! let entries = read_entries(&config.readme)?;
//! let sources = entries.into_iter().map(AddonSource::from).collect();
//! let report = run(&config, sources, Arc::new(GitCli::default()), &ProgressBar::hidden()).await?;
//!
//! println!("Published: {}", report.success_count());
//! ```

mod result;

pub use result::{SourceOutcome, SourceReport, SyncReport};

use crate::catalog::write_catalog;
use crate::config::SyncConfig;
use crate::entry::{parse_entries, AddonEntry};
use crate::error::{KrsError, Result};
use crate::fetch::{fetch, FetchedAddon};
use crate::git::Cloner;
use crate::manifest::RepositoryManifest;
use crate::package::package;
use crate::publish::{publish_addon, PublishedAddon, ZipContents};
use crate::source::AddonSource;
use indicatif::ProgressBar;
use std::collections::HashSet;
use std::fs;
use std::path::Path;
use std::sync::Arc;
use tempfile::TempDir;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;

/// README を読み込んでエントリを抽出する
///
/// README が存在しない場合は致命的エラー。
pub fn read_entries(readme: &Path) -> Result<Vec<AddonEntry>> {
    if !readme.is_file() {
        return Err(KrsError::ReadmeNotFound(readme.to_path_buf()));
    }
    let markdown = fs::read_to_string(readme)?;
    let entries = parse_entries(&markdown);
    tracing::debug!(count = entries.len(), path = %readme.display(), "parsed entries");
    Ok(entries)
}

/// 同期を実行
///
/// ソース単位のエラーは `SyncReport` に記録して継続する。
/// リポジトリの addon.xml が読めない場合などは `Err` を返す。
pub async fn run<C: Cloner>(
    config: &SyncConfig,
    sources: Vec<AddonSource>,
    cloner: Arc<C>,
    progress: &ProgressBar,
) -> Result<SyncReport> {
    let repository = RepositoryManifest::load(&config.repo_dir)?;
    tracing::info!(
        id = %repository.id,
        version = %repository.version,
        datadir = ?repository.data_dir,
        "loaded repository manifest"
    );
    fs::create_dir_all(&config.datadir)?;

    // クローンは実行終了まで保持し、drop で削除
    let workdir = TempDir::new()?;
    let fetched = fetch_all(cloner, &sources, workdir.path(), config.jobs, progress).await?;

    let repository_published = publish_addon(
        &repository.addon,
        &config.repo_dir,
        &config.datadir,
        ZipContents::InfoFiles,
        &config.exclude,
    )?;

    let mut seen = HashSet::from([repository.id.clone()]);
    let mut addons = Vec::new();
    let mut reports = Vec::with_capacity(sources.len());

    for (source, result) in sources.into_iter().zip(fetched) {
        match result.and_then(|addon| publish_fetched(config, &mut seen, addon)) {
            Ok((addon, published)) => {
                reports.push(SourceReport::published(source, published));
                addons.push(addon);
            }
            Err(e) if e.is_fatal() => return Err(e),
            Err(e) => {
                tracing::warn!(source = %source, "skipped: {}", e);
                reports.push(SourceReport::failed(source, e.to_string()));
            }
        }
    }

    let catalog = write_catalog(
        &config.datadir,
        std::iter::once(&repository.addon).chain(addons.iter().map(|a| &a.manifest)),
    )?;
    let archive = package(&repository, &addons, &config.datadir, &config.exclude)?;

    Ok(SyncReport {
        repository: repository_published,
        sources: reports,
        catalog: catalog.catalog,
        catalog_checksum: catalog.checksum,
        archive,
    })
}

/// 取得済みアドオンを公開（IDの重複はエラー）
fn publish_fetched(
    config: &SyncConfig,
    seen: &mut HashSet<String>,
    addon: FetchedAddon,
) -> Result<(FetchedAddon, PublishedAddon)> {
    if !seen.insert(addon.manifest.id.clone()) {
        return Err(KrsError::InvalidSource(format!(
            "duplicate addon id '{}'",
            addon.manifest.id
        )));
    }
    let published = publish_addon(
        &addon.manifest,
        &addon.dir,
        &config.datadir,
        ZipContents::Tree,
        &config.exclude,
    )?;
    Ok((addon, published))
}

/// 全ソースを取得する
///
/// 同時実行数は `jobs` で制限する。結果は入力と同じ順序で返す。
async fn fetch_all<C: Cloner>(
    cloner: Arc<C>,
    sources: &[AddonSource],
    workdir: &Path,
    jobs: usize,
    progress: &ProgressBar,
) -> Result<Vec<Result<FetchedAddon>>> {
    let semaphore = Arc::new(Semaphore::new(jobs.max(1)));
    let mut tasks = JoinSet::new();

    for (index, source) in sources.iter().cloned().enumerate() {
        let cloner = Arc::clone(&cloner);
        let semaphore = Arc::clone(&semaphore);
        let workdir = workdir.to_path_buf();
        tasks.spawn(async move {
            let _permit = semaphore.acquire_owned().await;
            let slot = format!("{:03}", index);
            let result = fetch(cloner.as_ref(), &source, &workdir, &slot).await;
            (index, result)
        });
    }

    let mut results: Vec<Option<Result<FetchedAddon>>> = sources.iter().map(|_| None).collect();
    while let Some(joined) = tasks.join_next().await {
        let (index, result) = joined?;
        progress.inc(1);
        results[index] = Some(result);
    }

    Ok(results
        .into_iter()
        .map(|r| {
            r.unwrap_or_else(|| Err(KrsError::InvalidSource("fetch did not complete".to_string())))
        })
        .collect())
}

#[cfg(test)]
#[path = "sync_test.rs"]
mod tests;
