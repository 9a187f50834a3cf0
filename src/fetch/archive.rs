// src/fetch/archive.rs
// =============================================================================
// The browser download strategy, for archived pages.
//
// Web-archive copies of dataset links usually serve a wrapper page whose
// JavaScript starts the real download. A plain GET would just save that
// wrapper, so instead:
//
// 1. Note which files are already in the download directory
// 2. Open the URL in a headless browser that saves downloads there
// 3. Wait a fixed settle interval for the download to finish
// 4. Close the browser
// 5. Take the newest file that was not there before
// 6. Rename it to the destination filename
//
// The browser itself sits behind the BrowserDriver trait, so this control
// flow is the same whatever automation engine is used (and is testable
// with a fake driver).
// =============================================================================

use async_trait::async_trait;
use std::collections::HashSet;
use std::io;
use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime};

use super::{DownloadOutcome, Fetcher};
use crate::config::ArchiveConfig;
use crate::error::FetchError;

/// Suffix Chromium gives downloads that have not finished yet.
const PARTIAL_DOWNLOAD_SUFFIX: &str = ".crdownload";

/// Something that can load a page in a browser which saves any triggered
/// download into a given directory.
#[async_trait]
pub trait BrowserDriver: Send + Sync {
    /// Starts loading `url`. The browser keeps running (and downloading)
    /// until the returned session is closed.
    async fn open(
        &self,
        url: &str,
        download_dir: &Path,
    ) -> Result<Box<dyn BrowserSession>, FetchError>;
}

/// A running browser started by [`BrowserDriver::open`].
#[async_trait]
pub trait BrowserSession: Send {
    async fn close(self: Box<Self>) -> Result<(), FetchError>;
}

/// Finds the newest file in a directory, ignoring the given paths.
pub type LocateNewest = fn(&Path, &HashSet<PathBuf>) -> io::Result<Option<PathBuf>>;

/// Fetches archived pages through a browser.
pub struct ArchivalFetcher<B> {
    driver: B,
    settle: Duration,
    locate: LocateNewest,
}

impl<B: BrowserDriver> ArchivalFetcher<B> {
    pub fn new(driver: B, config: ArchiveConfig) -> Self {
        Self {
            driver,
            settle: config.settle,
            locate: locate_newest_file,
        }
    }

    /// Replaces how the downloaded file is found.
    #[cfg(test)]
    pub fn with_locator(mut self, locate: LocateNewest) -> Self {
        self.locate = locate;
        self
    }

    async fn download(&self, url: &str, dest: &Path) -> Result<u64, FetchError> {
        let download_dir = match dest.parent() {
            Some(dir) if !dir.as_os_str().is_empty() => dir,
            _ => Path::new("."),
        };

        let before = snapshot(download_dir).map_err(|e| FetchError::filesystem(download_dir, e))?;

        let session = self.driver.open(url, download_dir).await?;

        tracing::debug!(url, settle_secs = self.settle.as_secs_f32(), "waiting for browser download");
        tokio::time::sleep(self.settle).await;

        if let Err(e) = session.close().await {
            // The file may well be there already; carry on and look
            tracing::warn!(url, error = %e, "browser did not close cleanly");
        }

        let newest = (self.locate)(download_dir, &before)
            .map_err(|e| FetchError::filesystem(download_dir, e))?
            .ok_or(FetchError::NoFileProduced)?;

        tracing::info!(from = %newest.display(), to = %dest.display(), "moving browser download");
        tokio::fs::rename(&newest, dest)
            .await
            .map_err(|e| FetchError::filesystem(dest, e))?;

        let meta = tokio::fs::metadata(dest)
            .await
            .map_err(|e| FetchError::filesystem(dest, e))?;
        Ok(meta.len())
    }
}

#[async_trait]
impl<B: BrowserDriver> Fetcher for ArchivalFetcher<B> {
    async fn fetch(&self, url: &str, dest: &Path) -> DownloadOutcome {
        match self.download(url, dest).await {
            Ok(bytes) => DownloadOutcome::Succeeded { bytes },
            Err(e) => {
                tracing::warn!(url, error = %e, "browser download failed");
                DownloadOutcome::Failed {
                    reason: e.to_string(),
                }
            }
        }
    }
}

// Paths of every entry currently in `dir`
fn snapshot(dir: &Path) -> io::Result<HashSet<PathBuf>> {
    std::fs::read_dir(dir)?
        .map(|entry| entry.map(|e| e.path()))
        .collect()
}

/// Returns the most recently created regular file in `dir` that is not in
/// `ignore`, skipping unfinished browser downloads.
///
/// Creation time falls back to modification time on filesystems that do
/// not record it. `Ok(None)` means nothing new is there.
pub fn locate_newest_file(dir: &Path, ignore: &HashSet<PathBuf>) -> io::Result<Option<PathBuf>> {
    let mut newest: Option<(SystemTime, PathBuf)> = None;

    for entry in std::fs::read_dir(dir)? {
        let entry = entry?;
        let path = entry.path();

        if ignore.contains(&path) {
            continue;
        }
        if path
            .file_name()
            .and_then(|n| n.to_str())
            .is_some_and(|n| n.ends_with(PARTIAL_DOWNLOAD_SUFFIX))
        {
            continue;
        }

        let meta = entry.metadata()?;
        if !meta.is_file() {
            continue;
        }
        let created = meta.created().or_else(|_| meta.modified())?;

        if newest.as_ref().map_or(true, |(t, _)| created > *t) {
            newest = Some((created, path));
        }
    }

    Ok(newest.map(|(_, path)| path))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    // Pretends to be a browser: optionally drops a file into the download
    // directory when a page is opened
    struct FakeDriver {
        produce: Option<(&'static str, &'static [u8])>,
        opened: Arc<Mutex<Vec<String>>>,
        closed: Arc<Mutex<usize>>,
    }

    impl FakeDriver {
        fn new(produce: Option<(&'static str, &'static [u8])>) -> Self {
            Self {
                produce,
                opened: Arc::new(Mutex::new(Vec::new())),
                closed: Arc::new(Mutex::new(0)),
            }
        }
    }

    struct FakeSession {
        closed: Arc<Mutex<usize>>,
    }

    #[async_trait]
    impl BrowserSession for FakeSession {
        async fn close(self: Box<Self>) -> Result<(), FetchError> {
            *self.closed.lock().unwrap() += 1;
            Ok(())
        }
    }

    #[async_trait]
    impl BrowserDriver for FakeDriver {
        async fn open(
            &self,
            url: &str,
            download_dir: &Path,
        ) -> Result<Box<dyn BrowserSession>, FetchError> {
            self.opened.lock().unwrap().push(url.to_string());
            if let Some((name, body)) = self.produce {
                std::fs::write(download_dir.join(name), body).unwrap();
            }
            Ok(Box::new(FakeSession {
                closed: self.closed.clone(),
            }))
        }
    }

    struct BrokenDriver;

    #[async_trait]
    impl BrowserDriver for BrokenDriver {
        async fn open(&self, _url: &str, _dir: &Path) -> Result<Box<dyn BrowserSession>, FetchError> {
            Err(FetchError::Browser("chrome crashed".to_string()))
        }
    }

    fn no_wait() -> ArchiveConfig {
        ArchiveConfig { settle: Duration::ZERO }
    }

    #[tokio::test]
    async fn test_browser_download_is_renamed_to_destination() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("older.xls"), b"old").unwrap();

        let driver = FakeDriver::new(Some(("download (1).xls", b"sheet")));
        let opened = driver.opened.clone();
        let closed = driver.closed.clone();
        let fetcher = ArchivalFetcher::new(driver, no_wait());

        let dest = dir.path().join("Beds_2012.xls");
        let outcome = fetcher.fetch("https://webarchive.example/beds.xls", &dest).await;

        assert_eq!(outcome, DownloadOutcome::Succeeded { bytes: 5 });
        assert_eq!(std::fs::read(&dest).unwrap(), b"sheet");
        assert!(!dir.path().join("download (1).xls").exists());
        // The file that was already there is left alone
        assert_eq!(std::fs::read(dir.path().join("older.xls")).unwrap(), b"old");
        assert_eq!(*opened.lock().unwrap(), vec!["https://webarchive.example/beds.xls"]);
        assert_eq!(*closed.lock().unwrap(), 1);
    }

    #[tokio::test]
    async fn test_nothing_downloaded_is_a_failure() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("older.xls"), b"old").unwrap();

        let fetcher = ArchivalFetcher::new(FakeDriver::new(None), no_wait());
        let dest = dir.path().join("Beds.xls");
        let outcome = fetcher.fetch("https://web.archive.org/x.xls", &dest).await;

        assert_eq!(
            outcome,
            DownloadOutcome::Failed {
                reason: "no file produced".to_string()
            }
        );
        assert!(!dest.exists());
        assert!(dir.path().join("older.xls").exists());
    }

    #[tokio::test]
    async fn test_unfinished_download_is_ignored() {
        let dir = tempfile::tempdir().unwrap();
        let fetcher =
            ArchivalFetcher::new(FakeDriver::new(Some(("x.xls.crdownload", b"half"))), no_wait());
        let outcome = fetcher
            .fetch("https://web.archive.org/x.xls", &dir.path().join("x.xls"))
            .await;
        assert!(outcome.is_failed());
    }

    #[tokio::test]
    async fn test_driver_error_is_a_failure() {
        let dir = tempfile::tempdir().unwrap();
        let fetcher = ArchivalFetcher::new(BrokenDriver, no_wait());
        let outcome = fetcher
            .fetch("https://web.archive.org/x.xls", &dir.path().join("x.xls"))
            .await;
        match outcome {
            DownloadOutcome::Failed { reason } => assert!(reason.contains("chrome crashed")),
            other => panic!("expected failure, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_custom_locator_is_used() {
        fn never(_: &Path, _: &HashSet<PathBuf>) -> io::Result<Option<PathBuf>> {
            Ok(None)
        }

        let dir = tempfile::tempdir().unwrap();
        let fetcher = ArchivalFetcher::new(FakeDriver::new(Some(("a.xls", b"a"))), no_wait())
            .with_locator(never);
        let outcome = fetcher
            .fetch("https://web.archive.org/a.xls", &dir.path().join("A.xls"))
            .await;
        assert!(outcome.is_failed());
    }

    #[test]
    fn test_locate_newest_file_empty_dir() {
        let dir = tempfile::tempdir().unwrap();
        assert_eq!(locate_newest_file(dir.path(), &HashSet::new()).unwrap(), None);
    }

    #[test]
    fn test_locate_newest_file_skips_directories_and_ignored() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir(dir.path().join("sub")).unwrap();
        let old = dir.path().join("old.csv");
        std::fs::write(&old, b"1").unwrap();

        let ignore: HashSet<PathBuf> = [old.clone()].into_iter().collect();
        assert_eq!(locate_newest_file(dir.path(), &ignore).unwrap(), None);
        assert_eq!(locate_newest_file(dir.path(), &HashSet::new()).unwrap(), Some(old));
    }
}
