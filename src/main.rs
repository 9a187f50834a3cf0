// src/main.rs
// =============================================================================
// This is the entry point of our CLI application.
//
// What happens here:
// 1. Load .env, set up logging, parse command-line arguments
// 2. Dispatch to the appropriate subcommand handler
// 3. Print the report
// 4. Exit with proper code (0 = all good, 1 = something failed, 2 = error)
// =============================================================================

mod cli;      // src/cli.rs - command-line parsing
mod config;   // src/config.rs - tunables and presets
mod error;    // src/error.rs - typed error kinds
mod extract;  // src/extract/ - link discovery and filenames
mod fetch;    // src/fetch/ - direct and browser downloads
mod pipeline; // src/pipeline/ - the discover/select/fetch loop
mod select;   // src/select/ - selection parsing and prompting

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use cli::{Cli, Commands, DownloadArgs};
use config::{resolve_dest_dir, ArchiveConfig, PipelineConfig, Preset, SourcePage};
use extract::FileType;
use fetch::{default_driver, ArchivalFetcher, DirectFetcher, StrategyFetcher};
use pipeline::{Pipeline, RunReport};
use select::{FixedSelection, SelectionProvider, TerminalPrompt};

#[tokio::main]
async fn main() {
    // Load .env file if present (before anything else)
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();
    init_logging(cli.verbose);

    let exit_code = match run(cli).await {
        Ok(code) => code,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            2
        }
    };

    std::process::exit(exit_code);
}

// Logs go to stderr; stdout is reserved for the listing and the report
fn init_logging(verbose: bool) {
    let default_filter = if verbose { "nhs_fetch=info" } else { "nhs_fetch=warn" };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_filter.into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

async fn run(cli: Cli) -> Result<i32> {
    match cli.command {
        Commands::Fetch { urls, types, download } => {
            let dest_dir = resolve_dest_dir(download.dir.clone(), None);
            let pages = urls
                .into_iter()
                .map(|url| SourcePage { url, dest_dir: dest_dir.clone() })
                .collect::<Vec<_>>();
            handle_download(pages, types_or_all(types), download).await
        }
        Commands::Preset { preset, download } => handle_preset(preset, download).await,
        Commands::List { url, types, json } => handle_list(&url, types_or_all(types), json).await,
    }
}

fn types_or_all(types: Vec<FileType>) -> Vec<FileType> {
    if types.is_empty() {
        FileType::ALL.to_vec()
    } else {
        types
    }
}

async fn handle_preset(preset: Preset, download: DownloadArgs) -> Result<i32> {
    let dest_dir = resolve_dest_dir(download.dir.clone(), Some(preset));
    let pages = preset
        .page_urls()
        .into_iter()
        .map(|url| SourcePage { url, dest_dir: dest_dir.clone() })
        .collect();
    handle_download(pages, preset.allowed_types(), download).await
}

// Builds the pipeline and runs it over `pages`
async fn handle_download(
    pages: Vec<SourcePage>,
    allowed_types: Vec<FileType>,
    download: DownloadArgs,
) -> Result<i32> {
    let config = PipelineConfig {
        allowed_types,
        ..PipelineConfig::default()
    };

    let fetcher = StrategyFetcher::new(
        DirectFetcher::new()?,
        ArchivalFetcher::new(default_driver(), ArchiveConfig::default()),
    );

    if let Some(dir) = pages.first().map(|p| &p.dest_dir) {
        println!("📁 Saving files to {}", dir.display());
    }

    let report = match download.select {
        Some(answer) => run_pipeline(config, fetcher, FixedSelection::new(answer), &pages).await?,
        None => run_pipeline(config, fetcher, TerminalPrompt, &pages).await?,
    };

    pipeline::print_report(&report, download.json)?;

    if report.has_failures() {
        Ok(1) // Exit code 1 = at least one download or page failed
    } else {
        Ok(0)
    }
}

async fn run_pipeline<S: SelectionProvider>(
    config: PipelineConfig,
    fetcher: impl fetch::Fetcher,
    selector: S,
    pages: &[SourcePage],
) -> Result<RunReport> {
    let mut pipeline = Pipeline::new(config, fetcher, selector)?;
    Ok(pipeline.run(pages).await)
}

// Handles the 'list' subcommand: discovery only
async fn handle_list(url: &str, types: Vec<FileType>, json: bool) -> Result<i32> {
    let client = pipeline::page_client(config::PAGE_USER_AGENT)?;
    let candidates = pipeline::discover(&client, url, &types).await?;

    if json {
        pipeline::print_candidates_json(&candidates)?;
    } else if candidates.is_empty() {
        println!("No downloadable files found on {}", url);
    } else {
        pipeline::print_candidates(&candidates);
    }

    Ok(0)
}
