//! Request and result types at the pipeline boundary.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::ReadError;

/// Format used when neither the body nor the override names one
pub const DEFAULT_FORMAT: OutputFormat = OutputFormat::Text;

/// Output representation requested by the caller
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Plain text with link and image references stripped
    Text,
    /// Markdown converted from the rendered DOM
    Markdown,
    /// Serialized DOM after rendering
    Html,
    /// Printed PDF
    Pdf,
    /// PNG of the viewport
    Image,
    /// PNG of the full scrollable page
    Pageshot,
}

impl OutputFormat {
    pub const ALL: [OutputFormat; 6] = [
        Self::Text,
        Self::Markdown,
        Self::Html,
        Self::Pdf,
        Self::Image,
        Self::Pageshot,
    ];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Text => "text",
            Self::Markdown => "markdown",
            Self::Html => "html",
            Self::Pdf => "pdf",
            Self::Image => "image",
            Self::Pageshot => "pageshot",
        }
    }

    /// MIME type of the payload produced for this format
    #[must_use]
    pub const fn content_type(self) -> &'static str {
        match self {
            Self::Text => "text/plain",
            Self::Markdown => "text/markdown",
            Self::Html => "text/html",
            Self::Pdf => "application/pdf",
            Self::Image | Self::Pageshot => "image/png",
        }
    }

    /// Text payloads go through the content cleaner
    #[must_use]
    pub const fn is_textual(self) -> bool {
        matches!(self, Self::Text | Self::Markdown)
    }

    /// Formats whose output is a rendering of the page rather than its markup
    #[must_use]
    pub const fn is_visual(self) -> bool {
        matches!(self, Self::Pdf | Self::Image | Self::Pageshot)
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OutputFormat {
    type Err = ReadError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let name = s.trim();
        Self::ALL
            .into_iter()
            .find(|format| format.as_str().eq_ignore_ascii_case(name))
            .ok_or_else(|| ReadError::invalid_argument(format!("unsupported format '{name}'")))
    }
}

/// A single read request: which page, in which representation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtractionRequest {
    pub url: String,
    pub format: OutputFormat,
}

impl ExtractionRequest {
    pub fn new(url: impl Into<String>, format: OutputFormat) -> Self {
        Self {
            url: url.into(),
            format,
        }
    }

    /// Build a request from a URL and a format name.
    ///
    /// Fails with `InvalidArgument` when the format is not recognized. The URL is
    /// validated later by the normalizer.
    pub fn parse(url: impl Into<String>, format: &str) -> Result<Self, ReadError> {
        Ok(Self::new(url, format.parse()?))
    }

    /// Request carried in a body with an optional out-of-band override.
    ///
    /// A non-empty `override_format` wins over `body_format`; when both are absent
    /// the format defaults to text.
    pub fn from_body(
        url: impl Into<String>,
        body_format: Option<&str>,
        override_format: Option<&str>,
    ) -> Result<Self, ReadError> {
        let format = match select_format(body_format, override_format) {
            Some(name) => name.parse()?,
            None => DEFAULT_FORMAT,
        };
        Ok(Self::new(url, format))
    }

    /// Request where the target URL is the request path, e.g. `GET /example.com`.
    pub fn from_path(path: &str, override_format: Option<&str>) -> Result<Self, ReadError> {
        Self::from_body(path.trim_start_matches('/'), None, override_format)
    }
}

fn select_format<'a>(body: Option<&'a str>, override_format: Option<&'a str>) -> Option<&'a str> {
    let non_empty = |value: &&str| !value.trim().is_empty();
    override_format.filter(non_empty).or(body.filter(non_empty))
}

/// Payload returned for a successful read
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractionResult {
    content: Vec<u8>,
    content_type: &'static str,
}

impl ExtractionResult {
    #[must_use]
    pub fn new(content: Vec<u8>, format: OutputFormat) -> Self {
        Self {
            content,
            content_type: format.content_type(),
        }
    }

    #[must_use]
    pub fn content(&self) -> &[u8] {
        &self.content
    }

    #[must_use]
    pub fn content_type(&self) -> &'static str {
        self.content_type
    }

    #[must_use]
    pub fn into_content(self) -> Vec<u8> {
        self.content
    }
}
