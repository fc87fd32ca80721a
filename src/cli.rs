use clap::Parser;
use std::path::PathBuf;

use crate::config::ConfigOverrides;

const AFTER_HELP: &str = "\
ENTRY FORMAT (README.md):
  - [Description](https://host/owner/repo.git)[/sub/path] [branch]

SOURCE FORMATS:
  https://host/owner/repo.git                  Git repository (default branch)
  https://host/owner/repo.git#branch           Git repository at a branch
  https://host/owner/repo.git#branch:sub/dir   Branch and sub path
  ./plugin.video.foo                           Local add-on folder
  ./plugin.video.foo-1.0.0.zip                 Local add-on zip

ENVIRONMENT:
  KRS_DATADIR   Output folder
  KRS_GIT       git executable
  KRS_LOG       Log filter (e.g. krs=debug)";

#[derive(Debug, Parser)]
#[command(name = "krs", version)]
#[command(about = "Kodi add-on repository synchronizer", long_about = None)]
#[command(after_help = AFTER_HELP)]
pub struct Cli {
    /// Add-on sources to publish instead of the README entries
    pub sources: Vec<String>,

    /// Repository folder containing addon.xml and README.md
    #[arg(short = 'C', long = "repo", value_name = "DIR")]
    pub repo_dir: Option<PathBuf>,

    /// Output folder for zips and addons.xml.gz
    #[arg(short, long, value_name = "DIR")]
    pub datadir: Option<PathBuf>,

    /// Markdown document listing the add-on sources
    #[arg(long, value_name = "FILE")]
    pub readme: Option<PathBuf>,

    /// Number of sources fetched concurrently
    #[arg(short, long, value_name = "N", value_parser = clap::value_parser!(u16).range(1..))]
    pub jobs: Option<u16>,

    /// List the sources without fetching or writing anything
    #[arg(long)]
    pub dry_run: bool,

    /// Exit with an error when any source fails
    #[arg(long)]
    pub strict: bool,

    /// Output in JSON format
    #[arg(long)]
    pub json: bool,

    /// Increase log verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,
}

impl Cli {
    /// 設定の上書き値
    pub fn overrides(&self) -> ConfigOverrides {
        ConfigOverrides {
            repo_dir: self.repo_dir.clone(),
            datadir: self.datadir.clone(),
            readme: self.readme.clone(),
            jobs: self.jobs.map(usize::from),
        }
    }
}
