// src/pipeline/mod.rs
// =============================================================================
// This module ties extraction, selection and fetching together.
//
// Submodules:
// - run: the Pipeline orchestrator and page discovery
// - report: per-item outcomes, the final report and candidate listing
// =============================================================================

mod report;
mod run;

pub use report::{print_candidates, print_candidates_json, print_report, RunReport};
pub use run::{discover, page_client, Pipeline};
