//! Capture the rendered page in the requested representation.

use tracing::debug;

use crate::converter::MarkdownConverter;
use crate::error::ReadError;
use crate::request::{ExtractionResult, OutputFormat};
use crate::session::{PageCapabilities, RenderedPage};

/// Jump running CSS and Web Animations to their end state before a capture
pub const FINISH_ANIMATIONS_SCRIPT: &str = r"(() => {
    if (typeof document.getAnimations !== 'function') return 0;
    const animations = document.getAnimations();
    animations.forEach(a => { try { a.finish(); } catch (_) {} });
    return animations.length;
})()";

/// Produce the payload for `format` from the page's current state.
///
/// # Errors
///
/// `Upstream` when the browser fails to serialize, print or capture the page.
/// `Internal` when HTML conversion fails.
pub async fn extract<P>(page: &P, format: OutputFormat) -> Result<ExtractionResult, ReadError>
where
    P: RenderedPage + PageCapabilities,
{
    let content = match format {
        OutputFormat::Html => page.content().await.map_err(ReadError::upstream)?.into_bytes(),
        OutputFormat::Markdown | OutputFormat::Text => {
            let html = page.content().await.map_err(ReadError::upstream)?;
            let converter = match format {
                OutputFormat::Text => MarkdownConverter::plain_text(),
                _ => MarkdownConverter::new(),
            };
            converter
                .convert(html)
                .await
                .map_err(|e| ReadError::internal(format!("HTML conversion failed: {e:#}")))?
                .into_bytes()
        }
        OutputFormat::Pdf => page.pdf().await.map_err(ReadError::upstream)?,
        OutputFormat::Image | OutputFormat::Pageshot => {
            finish_animations(page).await;
            page.screenshot(format == OutputFormat::Pageshot)
                .await
                .map_err(ReadError::upstream)?
        }
    };

    debug!("Extracted {} bytes as {format}", content.len());
    Ok(ExtractionResult::new(content, format))
}

async fn finish_animations<P: PageCapabilities>(page: &P) {
    if let Err(e) = page.evaluate_script(FINISH_ANIMATIONS_SCRIPT).await {
        debug!("Could not finish animations before capture: {e}");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use crate::navigator::WaitUntil;
    use crate::session::RequestFilter;
    use anyhow::Result;
    use std::sync::Mutex;
    use std::time::Duration;

    const PNG_MAGIC: &[u8] = b"\x89PNG\r\n\x1a\n";

    #[derive(Default)]
    struct StaticPage {
        fail_capture: bool,
        calls: Mutex<Vec<String>>,
    }

    impl StaticPage {
        fn log(&self, call: impl Into<String>) {
            self.calls.lock().unwrap().push(call.into());
        }
    }

    impl PageCapabilities for StaticPage {
        async fn inject_style(&self, _css: &str) -> Result<()> {
            Ok(())
        }

        async fn evaluate_script(&self, _script: &str) -> Result<serde_json::Value> {
            self.log("finish");
            anyhow::bail!("getAnimations is not a function")
        }

        async fn click_if_present(&self, _selector: &str, _timeout: Duration) -> bool {
            false
        }

        async fn block_requests(&self, _filter: RequestFilter) -> Result<()> {
            Ok(())
        }
    }

    impl RenderedPage for StaticPage {
        async fn goto(&self, _url: &str, _wait_until: WaitUntil) -> Result<()> {
            Ok(())
        }

        async fn wait_for_network_idle(&self, _timeout: Duration) -> bool {
            true
        }

        async fn content(&self) -> Result<String> {
            self.log("content");
            Ok(r#"<html><body><h1>Docs</h1><p>See <a href="https://example.com/a">the guide</a>.</p><img src="x.png" alt="x"></body></html>"#.into())
        }

        async fn screenshot(&self, full_page: bool) -> Result<Vec<u8>> {
            self.log(format!("screenshot:{full_page}"));
            if self.fail_capture {
                anyhow::bail!("Target closed");
            }
            Ok(PNG_MAGIC.to_vec())
        }

        async fn pdf(&self) -> Result<Vec<u8>> {
            self.log("pdf");
            Ok(b"%PDF-1.7".to_vec())
        }
    }

    #[tokio::test]
    async fn html_is_the_serialized_dom() {
        let page = StaticPage::default();
        let result = extract(&page, OutputFormat::Html).await.unwrap();
        assert_eq!(result.content_type(), "text/html");
        assert!(result.content().starts_with(b"<html>"));
    }

    #[tokio::test]
    async fn markdown_keeps_links_and_text_drops_them() {
        let page = StaticPage::default();

        let markdown = extract(&page, OutputFormat::Markdown).await.unwrap();
        let markdown = String::from_utf8(markdown.into_content()).unwrap();
        assert!(markdown.contains("# Docs"), "got: {markdown}");
        assert!(markdown.contains("[the guide](https://example.com/a)"), "got: {markdown}");

        let text = extract(&page, OutputFormat::Text).await.unwrap();
        assert_eq!(text.content_type(), "text/plain");
        let text = String::from_utf8(text.into_content()).unwrap();
        assert!(text.contains("the guide"));
        assert!(!text.contains("https://example.com/a"), "got: {text}");
        assert!(!text.contains("!["), "got: {text}");
    }

    #[tokio::test]
    async fn screenshots_finish_animations_first() {
        let page = StaticPage::default();

        let image = extract(&page, OutputFormat::Image).await.unwrap();
        assert!(image.content().starts_with(PNG_MAGIC));
        let pageshot = extract(&page, OutputFormat::Pageshot).await.unwrap();
        assert_eq!(pageshot.content_type(), "image/png");

        let calls = page.calls.lock().unwrap().clone();
        assert_eq!(calls, ["finish", "screenshot:false", "finish", "screenshot:true"]);
    }

    #[tokio::test]
    async fn pdf_uses_print() {
        let page = StaticPage::default();
        let result = extract(&page, OutputFormat::Pdf).await.unwrap();
        assert_eq!(result.content_type(), "application/pdf");
        assert!(result.content().starts_with(b"%PDF"));
    }

    #[tokio::test]
    async fn capture_failure_is_upstream() {
        let page = StaticPage {
            fail_capture: true,
            ..StaticPage::default()
        };
        let err = extract(&page, OutputFormat::Image).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Upstream);
        assert!(err.message().contains("Target closed"));
    }
}
