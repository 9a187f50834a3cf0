// src/pipeline/run.rs
// =============================================================================
// This module drives the whole discover -> select -> fetch -> report loop.
//
// How it works, per source page:
// 1. Fetch the page HTML and extract the dataset links
// 2. Print them as a numbered list
// 3. Ask the SelectionProvider for IDs until one parses
// 4. For each selected ID, in order:
//    - build the local filename
//    - skip it if that file already exists
//    - otherwise fetch it, then pause (politeness delay)
// 5. Collect every outcome into a PageReport
//
// Failure boundaries:
// - One item failing never stops the batch; it is just recorded
// - A page that cannot be fetched is recorded and the next page proceeds
//
// Everything runs strictly one request at a time.
// =============================================================================

use anyhow::Result;
use reqwest::Client;

use super::report::{print_candidates, ItemRecord, PageFailure, PageReport, RunReport};
use crate::config::{PipelineConfig, SourcePage};
use crate::error::PipelineError;
use crate::extract::{build_filename, extract_candidates, FileType, LinkCandidate};
use crate::fetch::{DownloadOutcome, Fetcher};
use crate::select::{parse_selection, SelectionProvider};

const SELECTION_PROMPT: &str = "Which files do you wish to download? Enter individual IDs (e.g. 1,3,5), \
a range of IDs (e.g. 4-7), a combination (e.g. 1-3, 8) or 'all': ";

/// Builds the client used to read source pages.
pub fn page_client(user_agent: &str) -> Result<Client> {
    Ok(Client::builder().user_agent(user_agent).build()?)
}

// Fetches a source page and extracts its dataset links
//
// Any failure here (network, non-2xx status, unreadable body, bad URL)
// makes the page unusable, so it is reported as PageUnreachable.
pub async fn discover(
    client: &Client,
    page_url: &str,
    allowed: &[FileType],
) -> Result<Vec<LinkCandidate>, PipelineError> {
    let unreachable = |reason: String| PipelineError::PageUnreachable {
        url: page_url.to_string(),
        reason,
    };

    let response = client
        .get(page_url)
        .send()
        .await
        .map_err(|e| unreachable(e.to_string()))?;

    if !response.status().is_success() {
        return Err(unreachable(format!("HTTP {}", response.status())));
    }

    let html = response.text().await.map_err(|e| unreachable(e.to_string()))?;

    extract_candidates(&html, page_url, allowed).map_err(|e| unreachable(e.to_string()))
}

/// The orchestrator: owns its configuration, the page client, the file
/// fetcher and the source of operator selections.
pub struct Pipeline<F, S> {
    config: PipelineConfig,
    client: Client,
    fetcher: F,
    selector: S,
}

impl<F: Fetcher, S: SelectionProvider> Pipeline<F, S> {
    pub fn new(config: PipelineConfig, fetcher: F, selector: S) -> Result<Self> {
        let client = page_client(&config.page_user_agent)?;
        Ok(Self {
            config,
            client,
            fetcher,
            selector,
        })
    }

    // Runs every page in order; page-level errors are collected, not raised
    pub async fn run(&mut self, pages: &[SourcePage]) -> RunReport {
        let mut report = RunReport::default();

        for page in pages {
            match self.run_page(page).await {
                Ok(page_report) => report.pages.push(page_report),
                Err(e) => {
                    tracing::warn!(page = %page.url, error = %e, "page abandoned");
                    eprintln!("⚠️  {}", e);
                    report.page_failures.push(PageFailure {
                        page_url: page.url.clone(),
                        reason: e.to_string(),
                    });
                }
            }
        }

        report
    }

    /// Processes one page end to end.
    pub async fn run_page(&mut self, page: &SourcePage) -> Result<PageReport, PipelineError> {
        println!("🔍 Reading webpage: {}", page.url);
        let candidates = discover(&self.client, &page.url, &self.config.allowed_types).await?;

        let mut report = PageReport {
            page_url: page.url.clone(),
            dest_dir: page.dest_dir.clone(),
            candidates: candidates.len(),
            items: Vec::new(),
        };

        if candidates.is_empty() {
            println!("No downloadable files found on {}\n", page.url);
            return Ok(report);
        }

        println!("📄 Found {} file(s)\n", candidates.len());
        print_candidates(&candidates);

        let ids = self.select(candidates.len())?;

        tokio::fs::create_dir_all(&page.dest_dir)
            .await
            .map_err(|source| PipelineError::Destination {
                path: page.dest_dir.clone(),
                source,
            })?;

        for id in ids {
            let candidate = &candidates[id - 1];
            let record = self.process(id, candidate, page).await;
            report.items.push(record);
        }

        Ok(report)
    }

    // Prompts until the answer parses; unbounded, the provider decides
    // when to give up
    fn select(&mut self, max_id: usize) -> Result<Vec<usize>, PipelineError> {
        self.selector.start_page();

        loop {
            let raw = self
                .selector
                .next_selection(SELECTION_PROMPT)
                .map_err(|e| PipelineError::SelectionAborted(e.to_string()))?;

            match parse_selection(&raw, max_id) {
                Ok(ids) => return Ok(ids),
                Err(e) => {
                    println!("{}", e);
                    println!("Please try again.\n");
                }
            }
        }
    }

    async fn process(&self, id: usize, candidate: &LinkCandidate, page: &SourcePage) -> ItemRecord {
        let filename = build_filename(
            &candidate.display_text,
            &candidate.resolved_url,
            candidate.file_type,
        );
        let dest = page.dest_dir.join(&filename);

        let outcome = if dest.is_file() {
            println!("File {} already exists, skipping.\n", filename);
            DownloadOutcome::Skipped
        } else {
            println!("Downloading {} ...", filename);
            let outcome = self.fetcher.fetch(&candidate.resolved_url, &dest).await;
            match &outcome {
                DownloadOutcome::Succeeded { bytes } => {
                    println!("✅ Successfully downloaded {} ({} bytes)\n", filename, bytes)
                }
                DownloadOutcome::Failed { reason } => {
                    println!("❌ Failed to download {}: {}\n", filename, reason)
                }
                DownloadOutcome::Skipped => {}
            }

            // Be polite to the server, whatever happened
            tokio::time::sleep(self.config.politeness_delay).await;
            outcome
        };

        ItemRecord {
            id,
            filename,
            url: candidate.resolved_url.clone(),
            outcome,
        }
    }
}
