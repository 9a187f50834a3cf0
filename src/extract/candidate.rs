// src/extract/candidate.rs
// =============================================================================
// The data types produced by link extraction.
//
// FileType is a closed set: only the four dataset formats we care about.
// Anything else on the page is ignored at extraction time, so the rest of
// the program never has to deal with "unknown" file types.
// =============================================================================

use serde::Serialize;
use std::fmt;

/// A dataset file format we know how to download.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum FileType {
    Pdf,
    Xls,
    Xlsx,
    Csv,
}

impl FileType {
    /// Every supported type, in the order they are usually listed.
    pub const ALL: [FileType; 4] = [FileType::Pdf, FileType::Xls, FileType::Xlsx, FileType::Csv];

    /// Spreadsheet formats only (used by the critical-care preset).
    pub const SPREADSHEETS: [FileType; 2] = [FileType::Xls, FileType::Xlsx];

    /// Matches a bare extension such as "XLSX" or "pdf". No leading dot.
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_ascii_lowercase().as_str() {
            "pdf" => Some(FileType::Pdf),
            "xls" => Some(FileType::Xls),
            "xlsx" => Some(FileType::Xlsx),
            "csv" => Some(FileType::Csv),
            _ => None,
        }
    }

    pub fn extension(&self) -> &'static str {
        match self {
            FileType::Pdf => "pdf",
            FileType::Xls => "xls",
            FileType::Xlsx => "xlsx",
            FileType::Csv => "csv",
        }
    }
}

impl fmt::Display for FileType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

/// One downloadable resource found on a source page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LinkCandidate {
    /// The page the link was found on
    pub source_url: String,
    /// Absolute URL of the file itself
    pub resolved_url: String,
    /// Anchor text, trimmed; may be empty
    pub display_text: String,
    pub file_type: FileType,
}

/// Returns the text after the last '.' in `s`, lower-cased.
///
/// No dot means no extension (empty string). This is a plain suffix check:
/// a query string such as `?type=report.pdf` counts as a ".pdf" suffix.
pub fn raw_extension(s: &str) -> String {
    s.rsplit_once('.')
        .map(|(_, ext)| ext.to_lowercase())
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_extension_is_case_insensitive() {
        assert_eq!(FileType::from_extension("XLSX"), Some(FileType::Xlsx));
        assert_eq!(FileType::from_extension("Pdf"), Some(FileType::Pdf));
        assert_eq!(FileType::from_extension("docx"), None);
        assert_eq!(FileType::from_extension(""), None);
    }

    #[test]
    fn test_raw_extension() {
        assert_eq!(raw_extension("/files/data.XLS"), "xls");
        assert_eq!(raw_extension("/files/noext"), "");
        assert_eq!(raw_extension("https://x.org/a?type=report.pdf"), "pdf");
        assert_eq!(raw_extension("archive.tar.gz"), "gz");
    }
}
