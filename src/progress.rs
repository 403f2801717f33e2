//! Progress reporting abstraction for read operations
//!
//! Defines the `ProgressReporter` trait for pipeline stage events and
//! provides a no-op and a tracing-backed implementation.

use tracing::{debug, info, warn};

use crate::request::OutputFormat;

/// Trait for reporting pipeline progress at each stage
///
/// Implementations can forward to channels, logs, or a UI. The pipeline calls
/// these in stage order and never depends on their side effects.
pub trait ProgressReporter: Send + Sync {
    /// Report that a browser session is being opened
    fn report_launching(&self);

    /// Report that the browser, context and page are ready
    fn report_session_opened(&self);

    /// Report that navigation to a URL has started
    fn report_navigation_started(&self, url: &str);

    /// Report that the page has reached its load signal
    fn report_page_loaded(&self, url: &str);

    /// Report that interstitial suppression is running
    fn report_suppressing(&self);

    /// Report that content capture has started
    fn report_extracting(&self, format: OutputFormat);

    /// Report that session teardown has started
    fn report_cleanup_started(&self);

    /// Report a successful read
    fn report_completed(&self, bytes: usize);

    /// Report an error that ended the read
    fn report_error(&self, error: &str);
}

/// Progress reporter that does nothing
#[derive(Debug, Clone, Copy, Default)]
pub struct NoOpProgress;

impl ProgressReporter for NoOpProgress {
    #[inline(always)]
    fn report_launching(&self) {}

    #[inline(always)]
    fn report_session_opened(&self) {}

    #[inline(always)]
    fn report_navigation_started(&self, _url: &str) {}

    #[inline(always)]
    fn report_page_loaded(&self, _url: &str) {}

    #[inline(always)]
    fn report_suppressing(&self) {}

    #[inline(always)]
    fn report_extracting(&self, _format: OutputFormat) {}

    #[inline(always)]
    fn report_cleanup_started(&self) {}

    #[inline(always)]
    fn report_completed(&self, _bytes: usize) {}

    #[inline(always)]
    fn report_error(&self, _error: &str) {}
}

/// Progress reporter that emits tracing events
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingProgress;

impl ProgressReporter for TracingProgress {
    fn report_launching(&self) {
        debug!(target: "reader::progress", "Launching browser session");
    }

    fn report_session_opened(&self) {
        debug!(target: "reader::progress", "Browser session ready");
    }

    fn report_navigation_started(&self, url: &str) {
        info!(target: "reader::progress", "Navigating to {url}");
    }

    fn report_page_loaded(&self, url: &str) {
        debug!(target: "reader::progress", "Page loaded: {url}");
    }

    fn report_suppressing(&self) {
        debug!(target: "reader::progress", "Suppressing interstitials");
    }

    fn report_extracting(&self, format: OutputFormat) {
        debug!(target: "reader::progress", "Extracting {format}");
    }

    fn report_cleanup_started(&self) {
        debug!(target: "reader::progress", "Closing browser session");
    }

    fn report_completed(&self, bytes: usize) {
        info!(target: "reader::progress", "Read completed ({bytes} bytes)");
    }

    fn report_error(&self, error: &str) {
        warn!(target: "reader::progress", "Read failed: {error}");
    }
}
