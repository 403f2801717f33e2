//! Test utilities and helper functions for the reader test suite

use anyhow::Result;
use kodegen_tools_reader::{
    CleanupResult, PageCapabilities, PageSession, ReaderConfig, RenderedPage, RequestFilter,
    SessionLauncher, WaitUntil,
};
use mockito::{Mock, Server};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

#[allow(dead_code)]
pub const PNG_MAGIC: &[u8] = b"\x89PNG\r\n\x1a\n";

/// Stage at which a fake session fails
#[allow(dead_code)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailAt {
    Open,
    Navigate,
    Content,
    Capture,
}

/// Shared record of everything the fake browser was asked to do
#[derive(Default)]
pub struct Recorder {
    pub calls: Mutex<Vec<String>>,
    pub opened: AtomicUsize,
    pub closed: AtomicUsize,
    pub dropped_unclosed: AtomicUsize,
}

#[allow(dead_code)]
impl Recorder {
    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    pub fn push(&self, call: impl Into<String>) {
        self.calls.lock().unwrap().push(call.into());
    }

    pub fn opened(&self) -> usize {
        self.opened.load(Ordering::SeqCst)
    }

    pub fn closed(&self) -> usize {
        self.closed.load(Ordering::SeqCst)
    }

    pub fn dropped_unclosed(&self) -> usize {
        self.dropped_unclosed.load(Ordering::SeqCst)
    }

    /// Calls whose name starts with `prefix`
    pub fn count(&self, prefix: &str) -> usize {
        self.calls().iter().filter(|c| c.starts_with(prefix)).count()
    }
}

/// Launcher that hands out scripted sessions serving `html`
#[derive(Clone)]
pub struct FakeLauncher {
    pub recorder: Arc<Recorder>,
    pub html: String,
    pub fail_at: Option<FailAt>,
    pub goto_delay: Duration,
}

#[allow(dead_code)]
impl FakeLauncher {
    pub fn new(html: impl Into<String>) -> Self {
        Self {
            recorder: Arc::new(Recorder::default()),
            html: html.into(),
            fail_at: None,
            goto_delay: Duration::ZERO,
        }
    }

    pub fn failing_at(mut self, stage: FailAt) -> Self {
        self.fail_at = Some(stage);
        self
    }

    pub fn with_goto_delay(mut self, delay: Duration) -> Self {
        self.goto_delay = delay;
        self
    }
}

impl SessionLauncher for FakeLauncher {
    type Session = FakeSession;

    async fn open(&self, _config: &ReaderConfig) -> Result<FakeSession> {
        self.recorder.push("open");
        if self.fail_at == Some(FailAt::Open) {
            anyhow::bail!("Failed to launch browser: no executable found");
        }
        self.recorder.opened.fetch_add(1, Ordering::SeqCst);
        Ok(FakeSession {
            launcher: self.clone(),
            closed: false,
        })
    }
}

pub struct FakeSession {
    launcher: FakeLauncher,
    closed: bool,
}

impl FakeSession {
    fn recorder(&self) -> &Recorder {
        &self.launcher.recorder
    }

    fn fails_at(&self, stage: FailAt) -> bool {
        self.launcher.fail_at == Some(stage)
    }
}

impl PageCapabilities for FakeSession {
    async fn inject_style(&self, _css: &str) -> Result<()> {
        self.recorder().push("inject_style");
        Ok(())
    }

    async fn evaluate_script(&self, _script: &str) -> Result<serde_json::Value> {
        self.recorder().push("evaluate_script");
        Ok(serde_json::Value::Null)
    }

    async fn click_if_present(&self, _selector: &str, _timeout: Duration) -> bool {
        self.recorder().push("click");
        false
    }

    async fn block_requests(&self, _filter: RequestFilter) -> Result<()> {
        self.recorder().push("block_requests");
        Ok(())
    }
}

impl RenderedPage for FakeSession {
    async fn goto(&self, url: &str, _wait_until: WaitUntil) -> Result<()> {
        self.recorder().push(format!("goto {url}"));
        if !self.launcher.goto_delay.is_zero() {
            tokio::time::sleep(self.launcher.goto_delay).await;
        }
        if self.fails_at(FailAt::Navigate) {
            anyhow::bail!("net::ERR_NAME_NOT_RESOLVED");
        }
        Ok(())
    }

    async fn wait_for_network_idle(&self, _timeout: Duration) -> bool {
        self.recorder().push("settle");
        true
    }

    async fn content(&self) -> Result<String> {
        self.recorder().push("content");
        if self.fails_at(FailAt::Content) {
            anyhow::bail!("Execution context was destroyed");
        }
        Ok(self.launcher.html.clone())
    }

    async fn screenshot(&self, full_page: bool) -> Result<Vec<u8>> {
        self.recorder().push(format!("screenshot full_page={full_page}"));
        if self.fails_at(FailAt::Capture) {
            anyhow::bail!("Target closed");
        }
        Ok(PNG_MAGIC.to_vec())
    }

    async fn pdf(&self) -> Result<Vec<u8>> {
        self.recorder().push("pdf");
        if self.fails_at(FailAt::Capture) {
            anyhow::bail!("Printing failed");
        }
        Ok(b"%PDF-1.7\n".to_vec())
    }
}

impl PageSession for FakeSession {
    async fn close(mut self) -> CleanupResult {
        self.closed = true;
        self.recorder().push("close");
        self.recorder().closed.fetch_add(1, Ordering::SeqCst);
        CleanupResult::Success
    }
}

impl Drop for FakeSession {
    fn drop(&mut self) {
        if !self.closed {
            self.recorder().dropped_unclosed.fetch_add(1, Ordering::SeqCst);
        }
    }
}

/// Creates a test HTML document with specified content
#[allow(dead_code)]
pub fn create_test_html(title: &str, body: &str) -> String {
    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <title>{title}</title>
</head>
<body>
    {body}
</body>
</html>"#
    )
}

/// Article with a consent banner that hides nothing but sits on top
#[allow(dead_code)]
pub fn create_cookie_banner_html() -> String {
    create_test_html(
        "Banner Test",
        r#"<h1>Release Notes</h1>
    <p>Version 2 ships faster rendering.</p>
    <div id="cookie-banner" style="position:fixed;bottom:0;left:0;right:0;height:200px;background:#222;color:#fff">
        We use cookies. <button id="accept-cookies" onclick="document.getElementById('cookie-banner').remove()">Accept</button>
    </div>"#,
    )
}

/// Sets up a mock HTTP server
#[allow(dead_code)]
pub async fn setup_mock_server() -> mockito::ServerGuard {
    Server::new_async().await
}

/// Creates a mock endpoint that returns HTML content
#[allow(dead_code)]
pub async fn create_html_mock(server: &mut mockito::ServerGuard, path: &str, html: &str) -> Mock {
    server
        .mock("GET", path)
        .with_status(200)
        .with_header("content-type", "text/html; charset=utf-8")
        .with_body(html)
        .create_async()
        .await
}
