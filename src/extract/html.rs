// src/extract/html.rs
// =============================================================================
// This module finds downloadable dataset links in an HTML page.
//
// We use the `scraper` crate to parse the page and select every <a href>,
// and the `url` crate to resolve relative hrefs against the page URL.
//
// Document order matters: the position of each candidate in the returned
// Vec becomes the 1-based ID the operator types at the prompt, so the same
// page must always produce the same list in the same order.
// =============================================================================

use anyhow::{anyhow, Result};
use scraper::{ElementRef, Html, Selector};
use url::Url;

use super::candidate::{raw_extension, FileType, LinkCandidate};

// Extracts dataset links from HTML content
//
// Parameters:
//   html: the HTML content to parse
//   base_url: the URL of the page (for resolving relative links)
//   allowed: which file types to keep (e.g. all four, or just spreadsheets)
//
// Returns: candidates in document order, or an error if base_url is invalid
//
// Example:
//   html = "<a href='/data/beds.xlsx'>Beds 2020</a>"
//   base_url = "https://example.com/stats/"
//   result = [LinkCandidate { resolved_url: "https://example.com/data/beds.xlsx", .. }]
pub fn extract_candidates(
    html: &str,
    base_url: &str,
    allowed: &[FileType],
) -> Result<Vec<LinkCandidate>> {
    let base = Url::parse(base_url).map_err(|e| anyhow!("Invalid base URL '{}': {}", base_url, e))?;

    let document = Html::parse_document(html);

    // "a[href]" is a constant selector, it always parses
    let selector = Selector::parse("a[href]").expect("static selector");

    let mut candidates = Vec::new();

    for element in document.select(&selector) {
        let Some(href) = element.value().attr("href") else {
            continue;
        };
        if href.is_empty() {
            continue;
        }

        // The type is judged on the raw href, before resolution
        let file_type = match FileType::from_extension(&raw_extension(href)) {
            Some(t) if allowed.contains(&t) => t,
            _ => continue,
        };

        let resolved_url = match base.join(href) {
            Ok(url) => url.to_string(),
            Err(e) => {
                tracing::debug!(href, error = %e, "skipping unresolvable href");
                continue;
            }
        };

        candidates.push(LinkCandidate {
            source_url: base_url.to_string(),
            resolved_url,
            display_text: anchor_text(&element),
            file_type,
        });
    }

    Ok(candidates)
}

// Collects the anchor's visible text
//
// Each text node is trimmed on its own and the pieces are joined with no
// separator, so "<a> Q1 <b>Data</b> </a>" yields "Q1Data". Filenames already
// sitting in raw-data directories were named this way, and keeping it
// stable is what lets the skip-if-exists check recognise them.
fn anchor_text(element: &ElementRef<'_>) -> String {
    element.text().map(str::trim).collect()
}
