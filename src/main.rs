use std::process::ExitCode;

use anyhow::Context as _;
use clap::Parser as _;

use wp_post_crawler::cli::{Cli, Command};

#[tokio::main]
async fn main() -> ExitCode {
    if let Err(err) = try_main().await {
        eprintln!("{err:#}");
        return ExitCode::FAILURE;
    }

    ExitCode::SUCCESS
}

async fn try_main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    wp_post_crawler::logging::init(cli.verbose)?;
    log::debug!("parsed cli: {cli:?}");

    match cli.command {
        Command::Serve(args) => wp_post_crawler::app::serve(args).await.context("serve")?,
        Command::Crawl(args) => wp_post_crawler::app::crawl(args).await.context("crawl")?,
    }
    Ok(())
}
