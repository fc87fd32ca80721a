//! krs コマンド
//!
//! README（または引数）のソースを同期し、結果を表示する。

use crate::cli::Cli;
use crate::config::SyncConfig;
use crate::error::Result as KrsResult;
use crate::git::GitCli;
use crate::output::{print_json, print_report, print_sources, DryRun};
use crate::source::AddonSource;
use crate::sync;
use indicatif::{ProgressBar, ProgressStyle};
use std::sync::Arc;

pub async fn dispatch(cli: Cli) -> Result<(), String> {
    let config = SyncConfig::resolve(cli.overrides()).map_err(|e| e.to_string())?;
    let sources = collect_sources(&cli, &config).map_err(|e| e.to_string())?;

    if cli.dry_run {
        if cli.json {
            return print_json(&DryRun {
                dry_run: true,
                sources: &sources,
            });
        }
        print_sources(&sources);
        return Ok(());
    }

    let progress = progress_bar(sources.len() as u64, cli.json);
    let cloner = Arc::new(GitCli::new(config.git.clone()));
    tracing::debug!(
        git = cloner.program(),
        jobs = config.jobs,
        datadir = %config.datadir.display(),
        "synchronizing {} source(s)",
        sources.len()
    );
    let result = sync::run(&config, sources, cloner, &progress).await;
    progress.finish_and_clear();
    let report = result.map_err(|e| e.to_string())?;

    if cli.json {
        print_json(&report)?;
    } else {
        print_report(&report);
    }

    // --strict では失敗があれば非0終了
    if cli.strict && !report.is_success() {
        return Err(format!(
            "{} source(s) failed to synchronize",
            report.failure_count()
        ));
    }

    Ok(())
}

/// 引数のソース、なければ README のエントリ
fn collect_sources(cli: &Cli, config: &SyncConfig) -> KrsResult<Vec<AddonSource>> {
    if cli.sources.is_empty() {
        let entries = sync::read_entries(&config.readme)?;
        return Ok(entries.into_iter().map(AddonSource::from).collect());
    }
    cli.sources.iter().map(|s| AddonSource::parse(s)).collect()
}

/// 取得の進捗バー（JSON出力時は非表示）
fn progress_bar(len: u64, hidden: bool) -> ProgressBar {
    if hidden || len == 0 {
        return ProgressBar::hidden();
    }
    let pb = ProgressBar::new(len);
    if let Ok(style) = ProgressStyle::default_bar()
        .template("{spinner:.green} Fetching [{bar:40.cyan/blue}] {pos}/{len}")
    {
        pb.set_style(style.progress_chars("#>-"));
    }
    pb
}
