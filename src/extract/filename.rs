// src/extract/filename.rs
// =============================================================================
// Turns a link candidate into a safe local filename.
//
// The name comes from the anchor text (what a human sees on the page) and
// the extension comes from the URL when the URL has a recognisable one,
// falling back to the type detected at extraction time.
//
// The result is deterministic: the same inputs always give the same name.
// That is what makes "already downloaded? skip it" work across runs.
// =============================================================================

use super::candidate::{raw_extension, FileType};

/// Characters that are not allowed in filenames on at least one major OS.
const RESERVED_CHARS: &[char] = &['<', '>', ':', '"', '/', '\\', '|', '?', '*'];

// Builds "<sanitized display text>.<ext>"
//
// Example:
//   build_filename("Q1 Data, 2020", "https://x.org/file.XLSX", FileType::Xlsx)
//   -> "Q1_Data_2020.xlsx"
pub fn build_filename(display_text: &str, resolved_url: &str, file_type: FileType) -> String {
    format!(
        "{}.{}",
        sanitize(display_text),
        resolve_extension(resolved_url, file_type)
    )
}

// Slashes read as separators in link text ("Report/Summary", "2019/20"),
// so they become hyphens before the reserved-character pass would turn
// them into underscores.
fn sanitize(text: &str) -> String {
    text.chars()
        .filter(|c| *c != ',')
        .map(|c| match c {
            '/' => '-',
            ' ' => '_',
            c if RESERVED_CHARS.contains(&c) => '_',
            c => c,
        })
        .collect()
}

// The URL wins if its suffix is one of ours, otherwise the extracted type.
fn resolve_extension(resolved_url: &str, file_type: FileType) -> &'static str {
    FileType::from_extension(&raw_extension(resolved_url))
        .unwrap_or(file_type)
        .extension()
}
