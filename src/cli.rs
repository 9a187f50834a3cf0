// src/cli.rs
// =============================================================================
// This file defines our command-line interface using the `clap` crate.
//
// We use the "derive" API which lets us define the CLI structure using
// Rust structs and attributes (the #[...] things).
//
// Three subcommands:
// - fetch: discover, pick and download files from one or more pages
// - preset: the same, for a built-in NHS England source collection
// - list: just show what a page offers, download nothing
// =============================================================================

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

use crate::config::Preset;
use crate::extract::FileType;

// This struct represents our entire CLI application
#[derive(Parser, Debug)]
#[command(
    name = "nhs-fetch",
    version,
    about = "Find dataset files on NHS statistics pages and download the ones you pick",
    long_about = "nhs-fetch lists the PDF/XLS/XLSX/CSV files linked from NHS statistical web pages, \
                  asks which ones you want, and saves them into a raw-data directory. \
                  Files that are already there are skipped, so it is safe to re-run."
)]
pub struct Cli {
    /// Show progress logs on stderr (RUST_LOG overrides this)
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// Options shared by every command that downloads.
#[derive(Args, Debug)]
pub struct DownloadArgs {
    /// Directory to save files into
    ///
    /// Falls back to the RAW_DATA_DIR environment variable (a .env file in
    /// the working directory is read too), then to rawdata/.
    #[arg(long, env = "RAW_DATA_DIR")]
    pub dir: Option<PathBuf>,

    /// Answer the selection prompt up front (e.g. "all" or "1-3,8")
    ///
    /// The same answer is used for every page. If it is invalid for a page,
    /// that page is skipped instead of prompting.
    #[arg(long)]
    pub select: Option<String>,

    /// Print the final report as JSON instead of text
    #[arg(long)]
    pub json: bool,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Download dataset files linked from one or more pages
    ///
    /// Example: nhs-fetch fetch https://www.england.nhs.uk/statistics/... --select all
    Fetch {
        /// Page URL(s) to scan; each page gets its own selection prompt
        #[arg(required = true)]
        urls: Vec<String>,

        /// Only offer these file types (default: pdf,xls,xlsx,csv)
        #[arg(long, value_enum, value_delimiter = ',')]
        types: Vec<FileType>,

        #[command(flatten)]
        download: DownloadArgs,
    },

    /// Download from a built-in NHS England source collection
    ///
    /// Example: nhs-fetch preset critical-care
    Preset {
        #[arg(value_enum)]
        preset: Preset,

        #[command(flatten)]
        download: DownloadArgs,
    },

    /// List the dataset files a page offers, without downloading
    List {
        url: String,

        /// Only list these file types (default: pdf,xls,xlsx,csv)
        #[arg(long, value_enum, value_delimiter = ',')]
        types: Vec<FileType>,

        /// Print the list as JSON
        #[arg(long)]
        json: bool,
    },
}
