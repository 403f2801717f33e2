pub mod browser_setup;
pub mod cleaner;
pub mod config;
pub mod converter;
pub mod error;
pub mod extractor;
pub mod navigator;
pub mod pipeline;
pub mod progress;
pub mod proxy;
pub mod request;
pub mod session;
pub mod suppressor;
pub mod utils;

pub use browser_setup::{download_managed_browser, find_browser_executable, launch_browser};
pub use config::{ReaderConfig, ReaderConfigBuilder, UserAgentPolicy, Viewport};
pub use converter::MarkdownConverter;
pub use error::{ErrorKind, ReadError, ReadResult};
pub use navigator::{NavigationOptions, Settle, WaitUntil};
pub use pipeline::Reader;
pub use progress::{NoOpProgress, ProgressReporter, TracingProgress};
pub use proxy::ProxyDescriptor;
pub use request::{DEFAULT_FORMAT, ExtractionRequest, ExtractionResult, OutputFormat};
pub use session::{
    ChromiumLauncher, ChromiumSession, CleanupResult, PageCapabilities, PageSession,
    RenderedPage, RequestFilter, ResourceKind, SessionLauncher,
};
pub use suppressor::{InterstitialSuppressor, SuppressionPolicy, SuppressionReport};

/// Read `url` as `format` with a default Chromium-backed reader.
///
/// The proxy is taken from the environment. Build a [`Reader`] directly for
/// anything else.
pub async fn read(url: &str, format: &str) -> Result<ExtractionResult, ReadError> {
    let config = ReaderConfig::from_env()?;
    Reader::new(config, ChromiumLauncher)
        .with_progress(TracingProgress)
        .read_url(url, format)
        .await
}
