// src/fetch/browser.rs
// =============================================================================
// BrowserDriver implementations.
//
// With the `browser` cargo feature, ChromiumDriver launches headless
// Chromium through chromiumoxide (Chrome DevTools Protocol), tells it to
// save downloads into the destination directory, and opens the URL.
//
// Without the feature, UnavailableDriver fails every archived download
// with a clear message; direct downloads are unaffected.
// =============================================================================

#[cfg(not(feature = "browser"))]
pub use unavailable::UnavailableDriver as DefaultDriver;

#[cfg(feature = "browser")]
pub use chromium::ChromiumDriver as DefaultDriver;

/// The driver this build uses for archived pages.
pub fn default_driver() -> DefaultDriver {
    DefaultDriver::default()
}

#[cfg(not(feature = "browser"))]
mod unavailable {
    use async_trait::async_trait;
    use std::path::Path;

    use crate::error::FetchError;
    use crate::fetch::{BrowserDriver, BrowserSession};

    #[derive(Debug, Default)]
    pub struct UnavailableDriver;

    #[async_trait]
    impl BrowserDriver for UnavailableDriver {
        async fn open(
            &self,
            _url: &str,
            _download_dir: &Path,
        ) -> Result<Box<dyn BrowserSession>, FetchError> {
            Err(FetchError::BrowserUnavailable)
        }
    }
}

#[cfg(feature = "browser")]
mod chromium {
    use async_trait::async_trait;
    use chromiumoxide::cdp::browser_protocol::browser::{
        SetDownloadBehaviorBehavior, SetDownloadBehaviorParams,
    };
    use chromiumoxide::{Browser, BrowserConfig};
    use futures::StreamExt;
    use std::path::Path;
    use tokio::task::JoinHandle;

    use crate::error::FetchError;
    use crate::fetch::{BrowserDriver, BrowserSession};

    /// Headless Chromium, one fresh browser per download.
    #[derive(Debug, Default)]
    pub struct ChromiumDriver;

    struct ChromiumSession {
        browser: Browser,
        events: JoinHandle<()>,
    }

    fn cdp_error(e: impl std::fmt::Display) -> FetchError {
        FetchError::Browser(e.to_string())
    }

    #[async_trait]
    impl BrowserDriver for ChromiumDriver {
        async fn open(
            &self,
            url: &str,
            download_dir: &Path,
        ) -> Result<Box<dyn BrowserSession>, FetchError> {
            // CDP wants an absolute path
            let download_dir = std::fs::canonicalize(download_dir)
                .map_err(|e| FetchError::filesystem(download_dir, e))?;

            let config = BrowserConfig::builder()
                .arg("--no-sandbox")
                .arg("--disable-gpu")
                .arg("--disable-dev-shm-usage")
                .build()
                .map_err(FetchError::Browser)?;

            tracing::info!("launching headless browser");
            let (browser, mut handler) = Browser::launch(config).await.map_err(cdp_error)?;

            // The handler stream must be polled for the browser to make progress
            let events = tokio::spawn(async move {
                while let Some(event) = handler.next().await {
                    if event.is_err() {
                        break;
                    }
                }
            });

            let behavior = SetDownloadBehaviorParams::builder()
                .behavior(SetDownloadBehaviorBehavior::Allow)
                .download_path(download_dir.to_string_lossy().into_owned())
                .build()
                .map_err(FetchError::Browser)?;
            browser.execute(behavior).await.map_err(cdp_error)?;

            // A navigation that turns into a download is reported as aborted;
            // that is the expected case here, not an error
            if let Err(e) = browser.new_page(url).await {
                tracing::debug!(url, error = %e, "navigation ended without a page");
            }

            Ok(Box::new(ChromiumSession { browser, events }))
        }
    }

    #[async_trait]
    impl BrowserSession for ChromiumSession {
        async fn close(self: Box<Self>) -> Result<(), FetchError> {
            let ChromiumSession { mut browser, events } = *self;
            let closed = browser.close().await.map(|_| ()).map_err(cdp_error);
            let _ = browser.wait().await;
            events.abort();
            closed
        }
    }
}
