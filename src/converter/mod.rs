//! HTML to markdown and plain-text conversion.
//!
//! Both outputs come from the same htmd pass: ATX headings, `-` bullets,
//! fenced code blocks with language annotation, and links kept inline (or as
//! autolinks when the text is the URL). Plain text then strips link and image
//! syntax from that markdown.

mod handlers;

use anyhow::Result;
use htmd::{
    HtmlToMarkdown,
    options::{BulletListMarker, CodeBlockStyle, HeadingStyle, LinkStyle, Options},
};
use regex::Regex;
use std::sync::LazyLock;

static LINK_RE: LazyLock<Regex> = LazyLock::new(|| {
    // Bounded quantifiers prevent catastrophic backtracking
    Regex::new(r"\[([^\]]{0,500})\]\(([^\)\s]{1,2000})(?:\s+[^\)]{0,500})?\)")
        .expect("LINK_RE: hardcoded regex is valid")
});

static IMAGE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"!\[[^\]]{0,200}\]\([^\)]{1,2000}\)").expect("IMAGE_RE: hardcoded regex is valid")
});

static AUTOLINK_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"<((?:https?://|mailto:)[^>\s]{1,2000})>")
        .expect("AUTOLINK_RE: hardcoded regex is valid")
});

/// Elements whose content never reaches the output
const SKIPPED_TAGS: [&str; 5] = ["script", "style", "noscript", "template", "head"];

/// Which flavor of text to produce
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextFlavor {
    Markdown,
    /// Markdown with link and image references stripped
    Plain,
}

/// HTML to text converter over htmd with custom element handlers
#[derive(Debug, Clone, Copy)]
pub struct MarkdownConverter {
    flavor: TextFlavor,
}

impl Default for MarkdownConverter {
    fn default() -> Self {
        Self {
            flavor: TextFlavor::Markdown,
        }
    }
}

impl MarkdownConverter {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn plain_text() -> Self {
        Self {
            flavor: TextFlavor::Plain,
        }
    }

    #[must_use]
    pub fn flavor(&self) -> TextFlavor {
        self.flavor
    }

    /// Convert HTML synchronously.
    pub fn convert_sync(&self, html: &str) -> Result<String> {
        let markdown = create_converter().convert(html)?;

        let output = match self.flavor {
            TextFlavor::Markdown => markdown,
            TextFlavor::Plain => strip_references(&markdown),
        };

        Ok(output.trim().to_string())
    }

    /// Convert HTML on the blocking pool.
    ///
    /// rcdom trees are not `Send`, and large documents take long enough to
    /// stall the runtime, so the work runs under `spawn_blocking`.
    pub async fn convert(&self, html: String) -> Result<String> {
        let converter = *self;
        tokio::task::spawn_blocking(move || converter.convert_sync(&html))
            .await
            .map_err(|e| anyhow::anyhow!("MarkdownConverter task panicked: {e}"))?
    }
}

/// Build the htmd converter used for every conversion
pub fn create_converter() -> HtmlToMarkdown {
    let options = Options {
        heading_style: HeadingStyle::Atx,
        bullet_list_marker: BulletListMarker::Dash,
        code_block_style: CodeBlockStyle::Fenced,
        link_style: LinkStyle::Inlined,
        ..Default::default()
    };

    HtmlToMarkdown::builder()
        .options(options)
        .skip_tags(SKIPPED_TAGS.to_vec())
        .add_handler(vec!["pre"], handlers::pre_handler)
        .add_handler(vec!["code"], handlers::code_handler)
        .add_handler(vec!["a"], handlers::link_handler)
        .build()
}

/// Drop images, then unwrap links to their text.
///
/// Images go first so `![alt](src)` is not half-matched as a link. A link
/// with empty text (an image link, after image removal) keeps its URL.
fn strip_references(markdown: &str) -> String {
    let without_images = IMAGE_RE.replace_all(markdown, "");

    let without_links = LINK_RE.replace_all(&without_images, |caps: &regex::Captures| {
        let text = caps[1].trim();
        if text.is_empty() {
            caps[2].to_string()
        } else {
            text.to_string()
        }
    });

    AUTOLINK_RE.replace_all(&without_links, "$1").into_owned()
}
