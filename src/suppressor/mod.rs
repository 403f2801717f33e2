//! Interstitial suppression: consent banners, animations and heavy media.
//!
//! Every step is best-effort. Failures are logged and recorded in the
//! [`SuppressionReport`], never returned as errors.

pub mod scripts;

use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, warn};

use crate::request::OutputFormat;
use crate::session::{PageCapabilities, RequestFilter, ResourceKind};
use crate::utils::constants::DEFAULT_CLICK_TIMEOUT;
use scripts::{
    ACCEPT_BUTTON_SELECTORS, ANIMATION_KILL_CSS, MEDIA_CLEANUP_SCRIPT, consent_hide_css,
    consent_removal_script,
};

/// Resource types aborted before they leave the browser
pub const BLOCKED_RESOURCE_KINDS: &[ResourceKind] = &[
    ResourceKind::Font,
    ResourceKind::Media,
    ResourceKind::WebSocket,
    ResourceKind::Manifest,
];

/// Heavy media and font extensions, for requests typed as something else
pub const BLOCKED_EXTENSIONS: &[&str] = &[
    "mp4", "webm", "ogv", "mov", "avi", "mkv", "m4v", "mp3", "ogg", "wav", "flac", "aac", "m4a",
    "woff", "woff2", "ttf", "otf", "eot",
];

/// When suppression runs
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SuppressionPolicy {
    /// Only for visual captures (image, pageshot, pdf)
    #[default]
    VisualOnly,
    /// For every format
    Always,
    Never,
}

impl SuppressionPolicy {
    #[must_use]
    pub fn is_active_for(self, format: OutputFormat) -> bool {
        match self {
            Self::VisualOnly => format.is_visual(),
            Self::Always => true,
            Self::Never => false,
        }
    }
}

/// What a suppression pass did
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SuppressionReport {
    /// Selector that received the accept click, if any
    pub clicked: Option<&'static str>,
    /// Banner and dialog elements removed from the DOM
    pub removed_banners: u64,
    /// Media elements removed from the DOM
    pub removed_media: u64,
    /// Steps that failed and were skipped
    pub failures: Vec<String>,
}

impl SuppressionReport {
    fn record_failure(&mut self, step: &str, err: impl std::fmt::Display) {
        warn!(target: "reader::suppressor", "{step} failed: {err}");
        self.failures.push(format!("{step}: {err}"));
    }
}

/// Network filter for heavy resources
#[must_use]
pub fn heavy_resource_filter() -> RequestFilter {
    RequestFilter::new()
        .block_kinds(BLOCKED_RESOURCE_KINDS)
        .block_extensions(BLOCKED_EXTENSIONS)
}

/// Applies the suppression layers through [`PageCapabilities`]
#[derive(Debug, Clone, Copy)]
pub struct InterstitialSuppressor {
    click_timeout: Duration,
}

impl Default for InterstitialSuppressor {
    fn default() -> Self {
        Self::new(DEFAULT_CLICK_TIMEOUT)
    }
}

impl InterstitialSuppressor {
    #[must_use]
    pub fn new(click_timeout: Duration) -> Self {
        Self { click_timeout }
    }

    /// Network filter plus the animation and consent stylesheets.
    ///
    /// Runs before navigation so the styles apply as soon as the DOM exists.
    pub async fn before_navigation<P>(&self, page: &P) -> SuppressionReport
    where
        P: PageCapabilities,
    {
        let mut report = SuppressionReport::default();

        if let Err(e) = page.block_requests(heavy_resource_filter()).await {
            report.record_failure("request filter", e);
        }
        if let Err(e) = page.inject_style(ANIMATION_KILL_CSS).await {
            report.record_failure("animation stylesheet", e);
        }
        if let Err(e) = page.inject_style(&consent_hide_css()).await {
            report.record_failure("consent stylesheet", e);
        }

        debug!(target: "reader::suppressor", "Pre-navigation suppression: {} failures", report.failures.len());
        report
    }

    /// Accept click, banner removal, media removal and eager images.
    pub async fn after_navigation<P>(&self, page: &P) -> SuppressionReport
    where
        P: PageCapabilities,
    {
        let mut report = SuppressionReport::default();

        for &selector in ACCEPT_BUTTON_SELECTORS {
            if page.click_if_present(selector, self.click_timeout).await {
                debug!(target: "reader::suppressor", "Clicked consent button {selector}");
                report.clicked = Some(selector);
                break;
            }
        }

        match consent_removal_script() {
            Ok(script) => match page.evaluate_script(&script).await {
                Ok(value) => report.removed_banners = value.as_u64().unwrap_or(0),
                Err(e) => report.record_failure("banner removal", e),
            },
            Err(e) => report.record_failure("banner removal", e),
        }

        match page.evaluate_script(MEDIA_CLEANUP_SCRIPT).await {
            Ok(value) => {
                report.removed_media = value.get("removed").and_then(|v| v.as_u64()).unwrap_or(0);
            }
            Err(e) => report.record_failure("media cleanup", e),
        }

        debug!(
            target: "reader::suppressor",
            "Post-navigation suppression: clicked={:?} banners={} media={}",
            report.clicked, report.removed_banners, report.removed_media
        );
        report
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::Result;
    use std::sync::Mutex;

    /// Records capability calls; clicks succeed only for `clickable`
    #[derive(Default)]
    struct RecordingPage {
        clickable: Option<&'static str>,
        fail_everything: bool,
        calls: Mutex<Vec<String>>,
    }

    impl RecordingPage {
        fn calls(&self) -> Vec<String> {
            self.calls.lock().unwrap().clone()
        }

        fn record(&self, call: String) -> Result<()> {
            self.calls.lock().unwrap().push(call);
            if self.fail_everything {
                anyhow::bail!("target closed");
            }
            Ok(())
        }
    }

    impl PageCapabilities for RecordingPage {
        async fn inject_style(&self, css: &str) -> Result<()> {
            let kind = if css.contains("animation-duration") { "animation" } else { "consent" };
            self.record(format!("style:{kind}"))
        }

        async fn evaluate_script(&self, script: &str) -> Result<serde_json::Value> {
            if script.contains("img.loading") {
                self.record("script:media".into())?;
                Ok(serde_json::json!({ "removed": 2, "reloaded": 1 }))
            } else {
                self.record("script:banners".into())?;
                Ok(serde_json::json!(3))
            }
        }

        async fn click_if_present(&self, selector: &str, _timeout: Duration) -> bool {
            self.calls.lock().unwrap().push(format!("click:{selector}"));
            !self.fail_everything && self.clickable == Some(selector)
        }

        async fn block_requests(&self, filter: RequestFilter) -> Result<()> {
            assert!(filter.blocks(ResourceKind::Font, "https://x/y"));
            self.record("block".into())
        }
    }

    #[test]
    fn gating_follows_policy() {
        for format in OutputFormat::ALL {
            assert_eq!(SuppressionPolicy::VisualOnly.is_active_for(format), format.is_visual());
            assert!(SuppressionPolicy::Always.is_active_for(format));
            assert!(!SuppressionPolicy::Never.is_active_for(format));
        }
        assert!(!SuppressionPolicy::VisualOnly.is_active_for(OutputFormat::Markdown));
        assert!(SuppressionPolicy::VisualOnly.is_active_for(OutputFormat::Image));
        assert!(SuppressionPolicy::VisualOnly.is_active_for(OutputFormat::Pdf));
    }

    #[test]
    fn heavy_filter_blocks_media_and_fonts() {
        let filter = heavy_resource_filter();
        assert!(filter.blocks(ResourceKind::WebSocket, "wss://live.example.com/feed"));
        assert!(filter.blocks(ResourceKind::Other, "https://cdn.example.com/hero.webm"));
        assert!(!filter.blocks(ResourceKind::Image, "https://cdn.example.com/hero.png"));
        assert!(!filter.blocks(ResourceKind::Document, "https://example.com/"));
    }

    #[tokio::test]
    async fn before_navigation_filters_then_styles() {
        let page = RecordingPage::default();
        let report = InterstitialSuppressor::default().before_navigation(&page).await;
        assert!(report.failures.is_empty());
        assert_eq!(page.calls(), ["block", "style:animation", "style:consent"]);
    }

    #[tokio::test]
    async fn clicking_stops_at_first_success() {
        let page = RecordingPage {
            clickable: Some(ACCEPT_BUTTON_SELECTORS[2]),
            ..RecordingPage::default()
        };
        let report = InterstitialSuppressor::default().after_navigation(&page).await;

        assert_eq!(report.clicked, Some(ACCEPT_BUTTON_SELECTORS[2]));
        let clicks: Vec<_> = page.calls().into_iter().filter(|c| c.starts_with("click:")).collect();
        assert_eq!(clicks.len(), 3);
        assert_eq!(report.removed_banners, 3);
        assert_eq!(report.removed_media, 2);
    }

    #[tokio::test]
    async fn no_button_tries_every_selector() {
        let page = RecordingPage::default();
        let report = InterstitialSuppressor::default().after_navigation(&page).await;
        assert_eq!(report.clicked, None);
        let clicks = page.calls().iter().filter(|c| c.starts_with("click:")).count();
        assert_eq!(clicks, ACCEPT_BUTTON_SELECTORS.len());
    }

    #[tokio::test]
    async fn failures_are_swallowed() {
        let page = RecordingPage {
            fail_everything: true,
            ..RecordingPage::default()
        };
        let suppressor = InterstitialSuppressor::default();

        let before = suppressor.before_navigation(&page).await;
        assert_eq!(before.failures.len(), 3);

        let after = suppressor.after_navigation(&page).await;
        assert_eq!(after.clicked, None);
        assert_eq!(after.failures.len(), 2);
        assert_eq!(after.removed_banners, 0);
    }
}
