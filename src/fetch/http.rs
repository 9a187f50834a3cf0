// src/fetch/http.rs
// =============================================================================
// The direct download strategy: one HTTP GET, body written to disk.
//
// Key behaviour:
// - Sends a desktop-browser User-Agent (some servers reject bare clients)
// - Follows redirects
// - Only HTTP 200 counts as success; anything else is a failure and no
//   destination file is created
// - The body goes to "<name>.part" first and is renamed into place
// - Transport errors are described in plain words for the final report
//
// Rust concepts:
// - async/await: For network I/O
// - Result<T, E> with ?: Errors bubble up to one place that turns them
//   into a DownloadOutcome
// =============================================================================

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use std::ffi::OsString;
use std::path::{Path, PathBuf};

use super::{DownloadOutcome, Fetcher};
use crate::config::DOWNLOAD_USER_AGENT;
use crate::error::FetchError;

/// Downloads files with a plain GET request.
#[derive(Debug, Clone)]
pub struct DirectFetcher {
    client: Client,
}

impl DirectFetcher {
    /// Builds a fetcher with the default download user agent.
    pub fn new() -> Result<Self, FetchError> {
        Self::with_user_agent(DOWNLOAD_USER_AGENT)
    }

    pub fn with_user_agent(user_agent: &str) -> Result<Self, FetchError> {
        let client = Client::builder()
            .user_agent(user_agent)
            .redirect(reqwest::redirect::Policy::limited(10))
            .build()?;
        Ok(Self { client })
    }

    // Does the actual work; returns bytes written
    async fn download(&self, url: &str, dest: &Path) -> Result<u64, FetchError> {
        let response = self.client.get(url).send().await?;

        let status = response.status();
        tracing::debug!(url, status = status.as_u16(), "download response");
        if status != StatusCode::OK {
            return Err(FetchError::HttpStatus(status.as_u16()));
        }

        // Read the whole body before touching the filesystem, so a broken
        // transfer never leaves a partial file behind
        let body = response.bytes().await?;

        // Only a complete file may appear under `dest`: an existing file
        // there is treated as already downloaded on the next run
        let part = part_path(dest);
        let written = match tokio::fs::write(&part, &body).await {
            Ok(()) => tokio::fs::rename(&part, dest).await,
            Err(e) => Err(e),
        };
        if let Err(e) = written {
            let _ = tokio::fs::remove_file(&part).await;
            return Err(FetchError::filesystem(dest, e));
        }

        Ok(body.len() as u64)
    }
}

// Sibling path the body is written to before being moved into place
fn part_path(dest: &Path) -> PathBuf {
    let mut name = dest.file_name().map(OsString::from).unwrap_or_default();
    name.push(".part");
    dest.with_file_name(name)
}

#[async_trait]
impl Fetcher for DirectFetcher {
    async fn fetch(&self, url: &str, dest: &Path) -> DownloadOutcome {
        match self.download(url, dest).await {
            Ok(bytes) => DownloadOutcome::Succeeded { bytes },
            Err(e) => {
                let reason = describe(&e);
                tracing::warn!(url, %reason, "download failed");
                DownloadOutcome::Failed { reason }
            }
        }
    }
}

// Turns a fetch error into a short human-readable reason
//
// reqwest errors can happen for many reasons:
// - Network timeout
// - DNS resolution failure
// - SSL certificate issues
// - Too many redirects
fn describe(error: &FetchError) -> String {
    let FetchError::Transport(e) = error else {
        return error.to_string();
    };

    let text = e.to_string();
    if e.is_timeout() {
        "Request timed out".to_string()
    } else if e.is_redirect() {
        "Too many redirects".to_string()
    } else if e.is_connect() {
        if text.contains("dns") {
            "Could not resolve hostname".to_string()
        } else {
            format!("Connection failed: {}", text)
        }
    } else if text.contains("certificate") || text.contains("ssl") {
        "SSL certificate error".to_string()
    } else {
        error.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{header_exists, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[tokio::test]
    async fn test_200_writes_body_verbatim() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/beds.csv"))
            .and(header_exists("user-agent"))
            .respond_with(ResponseTemplate::new(200).set_body_bytes(b"a,b\n1,2\n".to_vec()))
            .mount(&server)
            .await;

        let dir = tempfile::tempdir().unwrap();
        let dest = dir.path().join("beds.csv");
        let fetcher = DirectFetcher::new().unwrap();

        let outcome = fetcher.fetch(&format!("{}/beds.csv", server.uri()), &dest).await;

        assert_eq!(outcome, DownloadOutcome::Succeeded { bytes: 8 });
        assert_eq!(std::fs::read(&dest).unwrap(), b"a,b\n1,2\n");
    }

    #[tokio::test]
    async fn test_404_fails_without_creating_file() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;

        let dir = tempfile::tempdir().unwrap();
        let dest = dir.path().join("missing.xlsx");
        let fetcher = DirectFetcher::new().unwrap();

        let outcome = fetcher.fetch(&format!("{}/missing.xlsx", server.uri()), &dest).await;

        assert_eq!(outcome, DownloadOutcome::Failed { reason: "HTTP 404".to_string() });
        assert!(!dest.exists());
    }

    #[tokio::test]
    async fn test_redirect_is_followed() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/old.pdf"))
            .respond_with(
                ResponseTemplate::new(302).insert_header("location", format!("{}/new.pdf", server.uri())),
            )
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/new.pdf"))
            .respond_with(ResponseTemplate::new(200).set_body_bytes(b"%PDF".to_vec()))
            .mount(&server)
            .await;

        let dir = tempfile::tempdir().unwrap();
        let dest = dir.path().join("report.pdf");
        let outcome = DirectFetcher::new()
            .unwrap()
            .fetch(&format!("{}/old.pdf", server.uri()), &dest)
            .await;

        assert!(outcome.is_succeeded());
        assert_eq!(std::fs::read(&dest).unwrap(), b"%PDF");
    }

    #[tokio::test]
    async fn test_unwritable_destination_is_a_failure() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_bytes(b"x".to_vec()))
            .mount(&server)
            .await;

        let dir = tempfile::tempdir().unwrap();
        let dest = dir.path().join("no-such-dir").join("f.csv");
        let outcome = DirectFetcher::new()
            .unwrap()
            .fetch(&format!("{}/f.csv", server.uri()), &dest)
            .await;

        match outcome {
            DownloadOutcome::Failed { reason } => assert!(reason.contains("could not write")),
            other => panic!("expected failure, got {:?}", other),
        }
    }

    #[test]
    fn test_part_path_is_a_sibling() {
        assert_eq!(
            part_path(Path::new("/raw/beds.xlsx")),
            PathBuf::from("/raw/beds.xlsx.part")
        );
    }

    #[tokio::test]
    async fn test_failed_move_leaves_no_file_behind() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_bytes(b"a,b\n".to_vec()))
            .mount(&server)
            .await;

        let dir = tempfile::tempdir().unwrap();
        // A non-empty directory sitting at the destination makes the final
        // rename fail after the body has already been written
        let dest = dir.path().join("beds.csv");
        std::fs::create_dir(&dest).unwrap();
        std::fs::write(dest.join("keep"), b"").unwrap();

        let outcome = DirectFetcher::new()
            .unwrap()
            .fetch(&format!("{}/beds.csv", server.uri()), &dest)
            .await;

        assert!(outcome.is_failed());
        assert!(!dir.path().join("beds.csv.part").exists());
        assert!(!dest.is_file());
    }

    #[tokio::test]
    async fn test_success_leaves_only_the_final_file() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_bytes(b"x".to_vec()))
            .mount(&server)
            .await;

        let dir = tempfile::tempdir().unwrap();
        let dest = dir.path().join("f.csv");
        let outcome = DirectFetcher::new()
            .unwrap()
            .fetch(&format!("{}/f.csv", server.uri()), &dest)
            .await;

        assert!(outcome.is_succeeded());
        let names: Vec<_> = std::fs::read_dir(dir.path())
            .unwrap()
            .map(|e| e.unwrap().file_name())
            .collect();
        assert_eq!(names, vec![OsString::from("f.csv")]);
    }

    #[tokio::test]
    async fn test_connection_refused_is_a_failure() {
        let dir = tempfile::tempdir().unwrap();
        let dest = dir.path().join("f.csv");
        // Port 9 (discard) on localhost is closed in test environments
        let outcome = DirectFetcher::new()
            .unwrap()
            .fetch("http://127.0.0.1:9/f.csv", &dest)
            .await;
        assert!(outcome.is_failed());
        assert!(!dest.exists());
    }
}
