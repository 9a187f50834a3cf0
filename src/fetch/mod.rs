// src/fetch/mod.rs
// =============================================================================
// This module downloads one file to one destination path.
//
// There are two ways to get a file:
// - Direct: a plain HTTP GET, body written to disk
// - ArchivalRedirect: archived pages (web archive copies) start the real
//   download from JavaScript, so a headless browser has to load the page
//   and we pick up whatever it saved
//
// Which one to use is decided by classify(), a pure function of the URL.
// Both strategies implement the same Fetcher trait, and StrategyFetcher
// dispatches between them, so callers only ever see "fetch(url, dest)".
//
// Submodules:
// - http: the direct strategy
// - archive: the browser strategy's control flow (open, settle, locate, move)
// - browser: BrowserDriver implementations (chromiumoxide behind a feature)
// =============================================================================

mod archive;
mod browser;
mod http;

pub use archive::{ArchivalFetcher, BrowserDriver, BrowserSession};
pub use browser::default_driver;
pub use http::DirectFetcher;

use async_trait::async_trait;
use serde::Serialize;
use std::path::Path;

use crate::config::ARCHIVE_MARKERS;

/// What happened to one selected item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum DownloadOutcome {
    /// The destination file already existed; nothing was fetched
    Skipped,
    /// The file was written
    Succeeded { bytes: u64 },
    /// The fetch did not produce a file
    Failed { reason: String },
}

impl DownloadOutcome {
    pub fn is_succeeded(&self) -> bool {
        matches!(self, DownloadOutcome::Succeeded { .. })
    }

    pub fn is_failed(&self) -> bool {
        matches!(self, DownloadOutcome::Failed { .. })
    }
}

/// How a URL has to be fetched.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Strategy {
    Direct,
    ArchivalRedirect,
}

/// Picks the strategy for `url` by looking for an archive marker.
pub fn classify(url: &str) -> Strategy {
    if ARCHIVE_MARKERS.iter().any(|marker| url.contains(marker)) {
        Strategy::ArchivalRedirect
    } else {
        Strategy::Direct
    }
}

/// Retrieves `url` into `dest`.
///
/// Implementations never check whether `dest` already exists; the pipeline
/// decides that before calling. Errors are folded into
/// `DownloadOutcome::Failed`, so a fetch never aborts the caller.
#[async_trait]
pub trait Fetcher: Send + Sync {
    async fn fetch(&self, url: &str, dest: &Path) -> DownloadOutcome;
}

/// Routes each URL to the direct or the archival fetcher.
pub struct StrategyFetcher<D, A> {
    direct: D,
    archival: A,
}

impl<D: Fetcher, A: Fetcher> StrategyFetcher<D, A> {
    pub fn new(direct: D, archival: A) -> Self {
        Self { direct, archival }
    }
}

#[async_trait]
impl<D: Fetcher, A: Fetcher> Fetcher for StrategyFetcher<D, A> {
    async fn fetch(&self, url: &str, dest: &Path) -> DownloadOutcome {
        match classify(url) {
            Strategy::Direct => {
                tracing::debug!(url, "direct download");
                self.direct.fetch(url, dest).await
            }
            Strategy::ArchivalRedirect => {
                tracing::info!(url, "archived page, downloading through the browser");
                self.archival.fetch(url, dest).await
            }
        }
    }
}
