mod archive;
mod catalog;
mod checksum;
mod cli;
mod commands;
mod config;
mod entry;
mod env;
mod error;
mod fetch;
mod git;
mod logging;
mod manifest;
mod output;
mod package;
mod publish;
mod source;
mod sync;

use clap::Parser;

#[tokio::main]
async fn main() {
    let cli = cli::Cli::parse();
    logging::init(cli.verbose);

    if let Err(err) = commands::dispatch(cli).await {
        eprintln!("{err}");
        std::process::exit(1);
    }
}
