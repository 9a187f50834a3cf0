// src/pipeline/report.rs
// =============================================================================
// What a pipeline run produced, and how it is shown to the operator.
//
// Every selected item ends up as an ItemRecord with a DownloadOutcome.
// The final report lists everything that did not succeed (skipped or
// failed) with enough detail (ID, filename, URL) to retry by hand.
// =============================================================================

use anyhow::Result;
use serde::Serialize;
use std::path::PathBuf;

use crate::extract::{build_filename, period_of, LinkCandidate};
use crate::fetch::DownloadOutcome;

/// One processed selection.
#[derive(Debug, Clone, Serialize)]
pub struct ItemRecord {
    /// 1-based ID as shown in the candidate list
    pub id: usize,
    pub filename: String,
    pub url: String,
    #[serde(flatten)]
    pub outcome: DownloadOutcome,
}

/// Everything that happened on one source page.
#[derive(Debug, Clone, Serialize)]
pub struct PageReport {
    pub page_url: String,
    pub dest_dir: PathBuf,
    /// How many candidates the page offered
    pub candidates: usize,
    pub items: Vec<ItemRecord>,
}

impl PageReport {
    /// Items that were skipped or failed, in processing order.
    pub fn unsuccessful(&self) -> impl Iterator<Item = &ItemRecord> {
        self.items.iter().filter(|item| !item.outcome.is_succeeded())
    }
}

/// A page that could not be processed at all.
#[derive(Debug, Clone, Serialize)]
pub struct PageFailure {
    pub page_url: String,
    pub reason: String,
}

/// The result of running the pipeline over one or more pages.
#[derive(Debug, Clone, Default, Serialize)]
pub struct RunReport {
    pub pages: Vec<PageReport>,
    pub page_failures: Vec<PageFailure>,
}

impl RunReport {
    fn items(&self) -> impl Iterator<Item = &ItemRecord> {
        self.pages.iter().flat_map(|p| p.items.iter())
    }

    pub fn succeeded(&self) -> usize {
        self.items().filter(|i| i.outcome.is_succeeded()).count()
    }

    pub fn skipped(&self) -> usize {
        self.items()
            .filter(|i| i.outcome == DownloadOutcome::Skipped)
            .count()
    }

    pub fn failed(&self) -> usize {
        self.items().filter(|i| i.outcome.is_failed()).count()
    }

    /// True if any item failed or any page was unreachable.
    pub fn has_failures(&self) -> bool {
        self.failed() > 0 || !self.page_failures.is_empty()
    }
}

// Prints the numbered candidate list the operator picks from
//
// IDs are 1-based and follow extraction order.
pub fn print_candidates(candidates: &[LinkCandidate]) {
    for (i, c) in candidates.iter().enumerate() {
        let filename = build_filename(&c.display_text, &c.resolved_url, c.file_type);
        println!("{}. Filename text: {}", i + 1, c.display_text);
        println!("   Will be saved as: {}", filename);
        println!("   Period: {}", period_of(&filename));
        println!("   URL: {}\n", c.resolved_url);
    }
    println!("{}", "*".repeat(50));
}

/// Prints the candidate list as JSON (used by `list --json`).
pub fn print_candidates_json(candidates: &[LinkCandidate]) -> Result<()> {
    #[derive(Serialize)]
    struct Listed<'a> {
        id: usize,
        filename: String,
        period: crate::extract::Period,
        #[serde(flatten)]
        candidate: &'a LinkCandidate,
    }

    let listed: Vec<_> = candidates
        .iter()
        .enumerate()
        .map(|(i, c)| {
            let filename = build_filename(&c.display_text, &c.resolved_url, c.file_type);
            Listed {
                id: i + 1,
                period: period_of(&filename),
                filename,
                candidate: c,
            }
        })
        .collect();

    println!("{}", serde_json::to_string_pretty(&listed)?);
    Ok(())
}

// Prints the end-of-run report either as text or JSON
pub fn print_report(report: &RunReport, json: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(report)?);
    } else {
        print_text_report(report);
    }
    Ok(())
}

fn print_text_report(report: &RunReport) {
    for page in &report.pages {
        let mut unsuccessful = page.unsuccessful().peekable();
        if unsuccessful.peek().is_none() {
            continue;
        }

        println!("{}", "-".repeat(50));
        println!("Datasets from {} that were not downloaded:\n", page.page_url);
        for item in unsuccessful {
            println!("ID: {}", item.id);
            println!("Filename: {}", item.filename);
            println!("URL: {}", item.url);
            match &item.outcome {
                DownloadOutcome::Skipped => println!("Reason: already exists\n"),
                DownloadOutcome::Failed { reason } => println!("Reason: {}\n", reason),
                DownloadOutcome::Succeeded { .. } => println!(),
            }
        }
    }

    if !report.page_failures.is_empty() {
        println!("{}", "-".repeat(50));
        println!("Pages that could not be processed:\n");
        for failure in &report.page_failures {
            println!("❌ {}", failure.page_url);
            println!("   {}\n", failure.reason);
        }
    }

    println!("📊 Summary:");
    println!("   ✅ Downloaded: {}", report.succeeded());
    println!("   ⏭️  Skipped: {}", report.skipped());
    println!("   ❌ Failed: {}", report.failed());
    if !report.page_failures.is_empty() {
        println!("   🌐 Unreachable pages: {}", report.page_failures.len());
    }
}
