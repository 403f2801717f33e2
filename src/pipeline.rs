//! The read pipeline: normalize, open, suppress, navigate, extract, clean, close.
//!
//! Each read owns a fresh session. The session is closed exactly once on every
//! path that opened it; if the read future is dropped mid-flight, the session's
//! `Drop` releases the browser instead.

use tracing::{debug, warn};

use crate::cleaner;
use crate::config::ReaderConfig;
use crate::error::ReadError;
use crate::extractor;
use crate::navigator;
use crate::progress::{NoOpProgress, ProgressReporter};
use crate::request::{ExtractionRequest, ExtractionResult, OutputFormat};
use crate::session::{CleanupResult, PageSession, SessionLauncher};
use crate::suppressor::InterstitialSuppressor;
use crate::utils::normalize_url;

/// Reads pages through sessions opened by `L`
pub struct Reader<L, R = NoOpProgress>
where
    L: SessionLauncher,
    R: ProgressReporter,
{
    config: ReaderConfig,
    launcher: L,
    progress: R,
}

impl<L: SessionLauncher> Reader<L> {
    pub fn new(config: ReaderConfig, launcher: L) -> Self {
        Self {
            config,
            launcher,
            progress: NoOpProgress,
        }
    }
}

impl<L, R> Reader<L, R>
where
    L: SessionLauncher,
    R: ProgressReporter,
{
    /// Replace the progress reporter
    pub fn with_progress<P: ProgressReporter>(self, progress: P) -> Reader<L, P> {
        Reader {
            config: self.config,
            launcher: self.launcher,
            progress,
        }
    }

    #[must_use]
    pub fn config(&self) -> &ReaderConfig {
        &self.config
    }

    /// Read `url` in the format named by `format`.
    pub async fn read_url(&self, url: &str, format: &str) -> Result<ExtractionResult, ReadError> {
        let request = ExtractionRequest::parse(url, format)?;
        self.read(&request).await
    }

    /// Run one request end to end.
    ///
    /// # Errors
    ///
    /// `InvalidArgument` for a missing URL, without opening a session.
    /// `Upstream` for launch, navigation or capture failures. `Internal` for
    /// conversion failures. Cleanup failures are logged and never replace
    /// the result.
    pub async fn read(&self, request: &ExtractionRequest) -> Result<ExtractionResult, ReadError> {
        let url = normalize_url(&request.url)?;

        self.progress.report_launching();
        let session = match self.launcher.open(&self.config).await {
            Ok(session) => session,
            Err(e) => {
                let err = ReadError::upstream(e.context("Failed to open browser session"));
                self.progress.report_error(err.message());
                return Err(err);
            }
        };
        self.progress.report_session_opened();

        let outcome = self.run_stages(&session, &url, request.format).await;

        self.progress.report_cleanup_started();
        if let CleanupResult::PartialFailure(errors) = session.close().await {
            warn!("Session cleanup incomplete for {url}: {}", errors.join("; "));
        }

        match &outcome {
            Ok(result) => self.progress.report_completed(result.content().len()),
            Err(e) => self.progress.report_error(e.message()),
        }
        outcome
    }

    async fn run_stages<S>(
        &self,
        session: &S,
        url: &str,
        format: OutputFormat,
    ) -> Result<ExtractionResult, ReadError>
    where
        S: PageSession,
    {
        let suppressor = self
            .config
            .suppression()
            .is_active_for(format)
            .then(|| InterstitialSuppressor::new(self.config.click_timeout()));

        if let Some(suppressor) = &suppressor {
            self.progress.report_suppressing();
            suppressor.before_navigation(session).await;
        }

        self.progress.report_navigation_started(url);
        let settle = navigator::navigate(session, url, &self.config.navigation_options()).await?;
        debug!("Navigation settled: {settle:?}");
        self.progress.report_page_loaded(url);

        if let Some(suppressor) = &suppressor {
            suppressor.after_navigation(session).await;
        }

        self.progress.report_extracting(format);
        let result = extractor::extract(session, format).await?;

        if !format.is_textual() {
            return Ok(result);
        }
        let text = String::from_utf8(result.into_content())
            .map_err(|e| ReadError::internal(format!("Extracted text is not UTF-8: {e}")))?;
        Ok(ExtractionResult::new(
            cleaner::clean(&text, format).into_bytes(),
            format,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use crate::navigator::WaitUntil;
    use crate::session::{PageCapabilities, RenderedPage, RequestFilter};
    use anyhow::Result;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;
    use std::time::Duration;

    #[derive(Default)]
    struct Counters {
        opened: AtomicUsize,
        closed: AtomicUsize,
    }

    struct BlankLauncher(Arc<Counters>);

    struct BlankSession(Arc<Counters>);

    impl PageCapabilities for BlankSession {
        async fn inject_style(&self, _css: &str) -> Result<()> {
            Ok(())
        }
        async fn evaluate_script(&self, _script: &str) -> Result<serde_json::Value> {
            Ok(serde_json::Value::Null)
        }
        async fn click_if_present(&self, _selector: &str, _timeout: Duration) -> bool {
            false
        }
        async fn block_requests(&self, _filter: RequestFilter) -> Result<()> {
            Ok(())
        }
    }

    impl RenderedPage for BlankSession {
        async fn goto(&self, _url: &str, _wait_until: WaitUntil) -> Result<()> {
            Ok(())
        }
        async fn wait_for_network_idle(&self, _timeout: Duration) -> bool {
            true
        }
        async fn content(&self) -> Result<String> {
            Ok("<p>one</p>\n\n\n\n<p>two</p>".into())
        }
        async fn screenshot(&self, _full_page: bool) -> Result<Vec<u8>> {
            Ok(vec![0x89, b'P', b'N', b'G'])
        }
        async fn pdf(&self) -> Result<Vec<u8>> {
            Ok(b"%PDF".to_vec())
        }
    }

    impl PageSession for BlankSession {
        async fn close(self) -> CleanupResult {
            self.0.closed.fetch_add(1, Ordering::SeqCst);
            CleanupResult::Success
        }
    }

    impl SessionLauncher for BlankLauncher {
        type Session = BlankSession;

        async fn open(&self, _config: &ReaderConfig) -> Result<BlankSession> {
            self.0.opened.fetch_add(1, Ordering::SeqCst);
            Ok(BlankSession(self.0.clone()))
        }
    }

    fn reader() -> (Reader<BlankLauncher>, Arc<Counters>) {
        let counters = Arc::new(Counters::default());
        (
            Reader::new(ReaderConfig::default(), BlankLauncher(counters.clone())),
            counters,
        )
    }

    #[tokio::test]
    async fn blank_url_never_opens_a_session() {
        let (reader, counters) = reader();
        let err = reader.read_url("   ", "markdown").await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidArgument);
        assert_eq!(counters.opened.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn textual_output_is_cleaned() {
        let (reader, counters) = reader();
        let result = reader.read_url("example.com", "markdown").await.unwrap();
        let text = String::from_utf8(result.into_content()).unwrap();
        assert_eq!(text, "one\n\ntwo");
        assert_eq!(counters.closed.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn binary_output_is_untouched() {
        let (reader, _) = reader();
        let result = reader.read_url("example.com", "pdf").await.unwrap();
        assert_eq!(result.content(), b"%PDF");
    }
}
