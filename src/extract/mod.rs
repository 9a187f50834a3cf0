// src/extract/mod.rs
// =============================================================================
// This module turns a source page into a numbered list of download targets.
//
// Submodules:
// - candidate: the FileType and LinkCandidate data types
// - html: finds dataset links (<a href="...xlsx">) in a page
// - filename: builds a safe local filename for each link
// - period: guesses year/quarter from a filename for display
// =============================================================================

mod candidate;
mod filename;
mod html;
mod period;

pub use candidate::{FileType, LinkCandidate};
pub use filename::build_filename;
pub use html::extract_candidates;
pub use period::{period_of, Period};
