//! 実行結果の表示

use crate::sync::{SourceOutcome, SyncReport};
use crate::source::AddonSource;
use comfy_table::{presets::UTF8_FULL, Cell, Color, Table};
use owo_colors::OwoColorize;
use serde::Serialize;

pub struct CommandSummary {
    pub prefix: String,
    pub message: String,
}

impl CommandSummary {
    pub fn format(success: usize, failure: usize) -> Self {
        match (success, failure) {
            (_, f) if f > 0 => Self {
                prefix: "✗".red().to_string(),
                message: format!("{} published, {} failed", success.green(), f.red()),
            },
            (s, _) if s > 0 => Self {
                prefix: "✓".green().to_string(),
                message: format!("{} add-on(s) published", s.green()),
            },
            _ => Self {
                prefix: "•".yellow().to_string(),
                message: "No add-on sources found".to_string(),
            },
        }
    }
}

impl std::fmt::Display for CommandSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {}", self.prefix, self.message)
    }
}

/// `--dry-run` の出力
#[derive(Debug, Serialize)]
pub struct DryRun<'a> {
    pub dry_run: bool,
    pub sources: &'a [AddonSource],
}

/// 値をJSONとして表示
pub fn print_json<T: Serialize>(value: &T) -> Result<(), String> {
    let json = serde_json::to_string_pretty(value).map_err(|e| e.to_string())?;
    println!("{json}");
    Ok(())
}

/// ソース一覧のテーブル（`--dry-run`）
pub fn sources_table(sources: &[AddonSource]) -> Table {
    let mut table = Table::new();
    table.load_preset(UTF8_FULL);
    table.set_header(vec!["#", "Kind", "Source", "Path", "Branch"]);

    for (index, source) in sources.iter().enumerate() {
        let (path, branch) = match source {
            AddonSource::Git(entry) => (
                entry.relative_path.clone(),
                entry.branch_or_default().to_string(),
            ),
            AddonSource::Folder { .. } | AddonSource::Zip { .. } => (String::new(), String::new()),
        };
        table.add_row(vec![
            Cell::new(index + 1),
            Cell::new(source.kind_name()),
            Cell::new(source_location(source)),
            Cell::new(path),
            Cell::new(branch).fg(Color::DarkGrey),
        ]);
    }
    table
}

pub fn print_sources(sources: &[AddonSource]) {
    if sources.is_empty() {
        println!("No add-on sources found.");
        return;
    }
    println!("{table}", table = sources_table(sources));
    println!("\n{} source(s) would be synchronized", sources.len().to_string().cyan());
}

/// 同期結果のテーブル
pub fn report_table(report: &SyncReport) -> Table {
    let mut table = Table::new();
    table.load_preset(UTF8_FULL);
    table.set_header(vec!["Source", "Add-on", "Version", "Status"]);

    for source in &report.sources {
        match &source.outcome {
            SourceOutcome::Published { addon } => {
                let (status, color) = if addon.created {
                    ("Published", Color::Green)
                } else {
                    ("Unchanged", Color::DarkGrey)
                };
                table.add_row(vec![
                    Cell::new(source.source.label()),
                    Cell::new(&addon.id),
                    Cell::new(&addon.version),
                    Cell::new(status).fg(color),
                ]);
            }
            SourceOutcome::Failed { .. } => {
                table.add_row(vec![
                    Cell::new(source.source.label()),
                    Cell::new("-"),
                    Cell::new("-"),
                    Cell::new("Failed").fg(Color::Red),
                ]);
            }
        }
    }
    table
}

pub fn print_report(report: &SyncReport) {
    println!(
        "Repository: {} {}\n",
        report.repository.id.cyan(),
        report.repository.version
    );

    if report.total_count() > 0 {
        println!("{}\n", report_table(report));
    }

    println!(
        "{}",
        CommandSummary::format(report.success_count(), report.failure_count())
    );

    let failures: Vec<_> = report.failures().collect();
    if !failures.is_empty() {
        println!("\n{}", "Failed sources:".red().bold());
        for (source, error) in failures {
            println!("  {}: {}", source.label().red(), error);
        }
    }

    println!("\n{}", "Written:".bold());
    println!("  {}", report.archive.display());
    println!("  {}", report.catalog.display());
    println!("  {}", report.catalog_checksum.display());
}

fn source_location(source: &AddonSource) -> String {
    match source {
        AddonSource::Git(entry) => entry.repository_url.clone(),
        AddonSource::Folder { path } | AddonSource::Zip { path } => path.display().to_string(),
    }
}
