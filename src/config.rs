// src/config.rs
// =============================================================================
// Tunables and the built-in NHS England source collections.
//
// Everything the pipeline needs to know is carried in an explicit
// PipelineConfig value; nothing below main.rs reads environment variables.
// =============================================================================

use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::extract::FileType;

/// Default root for downloaded raw data, relative to the working directory.
pub const DEFAULT_RAW_DATA_DIR: &str = "rawdata";

/// URL substrings that mark an archived page whose download is started by
/// JavaScript, so a plain GET only returns the wrapper page.
pub const ARCHIVE_MARKERS: [&str; 2] = ["webarchive", "web.archive"];

/// Pause after each file fetch.
pub const POLITENESS_DELAY: Duration = Duration::from_secs(1);

/// How long the browser is given to finish an archived download.
pub const ARCHIVE_SETTLE: Duration = Duration::from_secs(10);

/// User agent for reading source pages.
pub const PAGE_USER_AGENT: &str = "Mozilla/5.0";

/// User agent for downloading files; some servers refuse bare clients.
pub const DOWNLOAD_USER_AGENT: &str =
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/91.0.4472.124 Safari/537.36";

/// Settings for one pipeline run.
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    /// Link types to offer; anything else on the page is ignored
    pub allowed_types: Vec<FileType>,
    pub politeness_delay: Duration,
    pub page_user_agent: String,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            allowed_types: FileType::ALL.to_vec(),
            politeness_delay: POLITENESS_DELAY,
            page_user_agent: PAGE_USER_AGENT.to_string(),
        }
    }
}

/// Settings for the browser-automation download strategy.
#[derive(Debug, Clone)]
pub struct ArchiveConfig {
    pub settle: Duration,
}

impl Default for ArchiveConfig {
    fn default() -> Self {
        Self {
            settle: ARCHIVE_SETTLE,
        }
    }
}

/// One source page and where its files go.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourcePage {
    pub url: String,
    pub dest_dir: PathBuf,
}

/// Built-in source collections.
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum Preset {
    /// Cancelled elective operations: supporting facilities data
    SupportingFacilities,
    /// Bed availability and occupancy: overnight beds
    BedsOvernight,
    /// Critical care bed capacity, 2010-11 to 2019-20 (spreadsheets only)
    CriticalCare,
}

const STATS_ROOT: &str = "https://www.england.nhs.uk/statistics/statistical-work-areas";

const CRITICAL_CARE_PAGES: [&str; 10] = [
    "critical-care-capacity/critical-care-bed-capacity-data-2010-11/",
    "critical-care-capacity/critical-care-bed-capacity-data-2011-12/",
    "critical-care-capacity/critical-care-capacity-data-2012-13/",
    "critical-care-capacity/critical-care-bed-capacity-and-urgent-operations-cancelled-2013-14-data/",
    "critical-care-capacity/critical-care-bed-capacity-and-urgent-operations-cancelled-2014-15-data/",
    "critical-care-capacity/critical-care-bed-capacity-and-urgent-operations-cancelled-2015-16-data/",
    "critical-care-capacity/critical-care-bed-capacity-and-urgent-operations-cancelled-2016-17-data/",
    "critical-care-capacity/critical-care-bed-capacity-and-urgent-operations-cancelled-2017-18-data/",
    "critical-care-capacity/critical-care-bed-capacity-and-urgent-operations-cancelled-2018-19-data/",
    "critical-care-capacity/critical-care-bed-capacity-and-urgent-operations-cancelled-2019-20-data/",
];

impl Preset {
    /// Source page URLs, in processing order.
    pub fn page_urls(&self) -> Vec<String> {
        let paths: &[&str] = match self {
            Preset::SupportingFacilities => {
                &["cancelled-elective-operations/supporting-facilities-data/"]
            }
            Preset::BedsOvernight => {
                &["bed-availability-and-occupancy/bed-data-overnight/"]
            }
            Preset::CriticalCare => &CRITICAL_CARE_PAGES,
        };
        paths
            .iter()
            .map(|p| format!("{}/{}", STATS_ROOT, p))
            .collect()
    }

    /// Directory under the raw-data root used when no --dir is given.
    pub fn default_subdir(&self) -> &'static Path {
        Path::new(match self {
            Preset::SupportingFacilities => "supporting-facilities",
            Preset::BedsOvernight => "available-and-occupied-beds/overnight",
            Preset::CriticalCare => "critical-care-beds/after-2010",
        })
    }

    pub fn allowed_types(&self) -> Vec<FileType> {
        match self {
            Preset::CriticalCare => FileType::SPREADSHEETS.to_vec(),
            _ => FileType::ALL.to_vec(),
        }
    }
}

// Resolves the destination directory
//
// An explicit --dir (or RAW_DATA_DIR, which clap folds into --dir) is used
// as-is. Otherwise: rawdata/ for ad-hoc runs, rawdata/<subdir> for presets.
pub fn resolve_dest_dir(explicit: Option<PathBuf>, preset: Option<Preset>) -> PathBuf {
    match (explicit, preset) {
        (Some(dir), _) => dir,
        (None, Some(preset)) => Path::new(DEFAULT_RAW_DATA_DIR).join(preset.default_subdir()),
        (None, None) => PathBuf::from(DEFAULT_RAW_DATA_DIR),
    }
}
