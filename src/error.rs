// src/error.rs
// =============================================================================
// Typed error kinds for the download pipeline.
//
// Each kind maps to one recovery policy:
// - SelectionError: operator typed something invalid, re-prompt
// - FetchError: one item failed, record it and keep going
// - PipelineError: a whole page is unusable, skip that page only
//
// The application layer (main.rs) still uses anyhow::Result; these enums
// exist so the pipeline can match on *what* went wrong.
// =============================================================================

use std::path::PathBuf;
use thiserror::Error;

/// Why an operator selection string was rejected.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SelectionError {
    #[error("nothing to select: the candidate list is empty")]
    NoCandidates,

    #[error("ID {id} out of range. Please enter IDs between 1 and {max_id}")]
    IdOutOfRange { id: usize, max_id: usize },

    #[error("ID range {start}-{end} out of range. Please enter IDs between 1 and {max_id}")]
    RangeOutOfRange { start: usize, end: usize, max_id: usize },

    #[error(
        "invalid token '{token}'. Please use numbers separated by commas or ranges (e.g., 1,3,5 or 1-3)"
    )]
    Malformed { token: String },
}

/// Why a single download did not produce a file.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("HTTP {0}")]
    HttpStatus(u16),

    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("could not write {path}: {source}")]
    Filesystem {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("no file produced")]
    NoFileProduced,

    #[error("browser automation is not available in this build (enable the 'browser' feature)")]
    BrowserUnavailable,

    #[error("browser automation failed: {0}")]
    #[cfg_attr(not(feature = "browser"), allow(dead_code))]
    Browser(String),
}

impl FetchError {
    pub fn filesystem(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        FetchError::Filesystem {
            path: path.into(),
            source,
        }
    }
}

/// Why a whole source page was abandoned.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("page {url} is unreachable: {reason}")]
    PageUnreachable { url: String, reason: String },

    #[error("destination directory {path} is unusable: {source}")]
    Destination {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("selection aborted: {0}")]
    SelectionAborted(String),
}
