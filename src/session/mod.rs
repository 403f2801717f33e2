//! Browser session capabilities.
//!
//! The pipeline, navigator, suppressor and extractor only talk to a page
//! through these traits. [`chromium`] provides the real implementation; tests
//! substitute recording fakes.

pub mod chromium;

use anyhow::Result;
use std::future::Future;
use std::time::Duration;
use url::Url;

use crate::config::ReaderConfig;
use crate::navigator::WaitUntil;

pub use chromium::{ChromiumLauncher, ChromiumSession};

/// Result of session teardown
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CleanupResult {
    /// All cleanup operations succeeded
    Success,
    /// Some cleanup operations failed, with error details
    PartialFailure(Vec<String>),
}

impl CleanupResult {
    #[must_use]
    pub fn from_errors(errors: Vec<String>) -> Self {
        if errors.is_empty() {
            Self::Success
        } else {
            Self::PartialFailure(errors)
        }
    }

    #[must_use]
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success)
    }
}

/// Engine-neutral classification of a network request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResourceKind {
    Document,
    Stylesheet,
    Image,
    Media,
    Font,
    Script,
    Xhr,
    WebSocket,
    Manifest,
    Other,
}

/// Requests to abort before they leave the browser
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RequestFilter {
    kinds: Vec<ResourceKind>,
    extensions: Vec<&'static str>,
}

impl RequestFilter {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn block_kinds(mut self, kinds: &[ResourceKind]) -> Self {
        self.kinds.extend_from_slice(kinds);
        self
    }

    /// Block URLs whose path ends in one of `extensions` (without the dot)
    #[must_use]
    pub fn block_extensions(mut self, extensions: &[&'static str]) -> Self {
        self.extensions.extend_from_slice(extensions);
        self
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.kinds.is_empty() && self.extensions.is_empty()
    }

    /// Whether a request should be aborted
    #[must_use]
    pub fn blocks(&self, kind: ResourceKind, url: &str) -> bool {
        if self.kinds.contains(&kind) {
            return true;
        }
        if self.extensions.is_empty() {
            return false;
        }

        let Some(segment) = Url::parse(url)
            .ok()
            .and_then(|parsed| parsed.path_segments()?.next_back().map(str::to_string))
        else {
            return false;
        };
        let Some((_, ext)) = segment.rsplit_once('.') else {
            return false;
        };
        self.extensions
            .iter()
            .any(|blocked| blocked.eq_ignore_ascii_case(ext))
    }
}

/// Best-effort DOM and network manipulation
///
/// The interstitial suppressor is written against this set only.
pub trait PageCapabilities: Send + Sync {
    /// Register a stylesheet for every document this page loads, and apply it
    /// to the current one.
    fn inject_style(&self, css: &str) -> impl Future<Output = Result<()>> + Send;

    /// Evaluate a JavaScript expression; `undefined` becomes `null`.
    fn evaluate_script(&self, script: &str)
    -> impl Future<Output = Result<serde_json::Value>> + Send;

    /// Click the first element matching `selector`. Returns whether a click
    /// happened before `timeout`. Never fails.
    fn click_if_present(&self, selector: &str, timeout: Duration)
    -> impl Future<Output = bool> + Send;

    /// Abort matching requests for the rest of the session.
    fn block_requests(&self, filter: RequestFilter) -> impl Future<Output = Result<()>> + Send;
}

/// Navigation and capture over a loaded page
pub trait RenderedPage: Send + Sync {
    /// Navigate and wait for `wait_until`. No timeout is applied here.
    fn goto(&self, url: &str, wait_until: WaitUntil) -> impl Future<Output = Result<()>> + Send;

    /// Wait for a quiet network; `false` if `timeout` elapsed first.
    fn wait_for_network_idle(&self, timeout: Duration) -> impl Future<Output = bool> + Send;

    /// Serialized DOM
    fn content(&self) -> impl Future<Output = Result<String>> + Send;

    /// PNG of the viewport, or of the whole scrollable page
    fn screenshot(&self, full_page: bool) -> impl Future<Output = Result<Vec<u8>>> + Send;

    /// Printed PDF with backgrounds
    fn pdf(&self) -> impl Future<Output = Result<Vec<u8>>> + Send;
}

/// One browser, one isolated context, one page
pub trait PageSession: PageCapabilities + RenderedPage + Sized {
    /// Release the page, the context and the browser.
    ///
    /// Every step is attempted even when an earlier one fails.
    fn close(self) -> impl Future<Output = CleanupResult> + Send;
}

/// Factory for per-request sessions
pub trait SessionLauncher: Send + Sync {
    type Session: PageSession;

    /// Launch and configure a fresh session.
    fn open(&self, config: &ReaderConfig) -> impl Future<Output = Result<Self::Session>> + Send;
}
