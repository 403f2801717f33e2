//! Browser discovery and launch.
//!
//! Finds a local Chrome/Chromium (or downloads a managed one), then launches
//! it with a throwaway profile directory and the reader's flag set.

use anyhow::{Context, Result};
use chromiumoxide::browser::{Browser, BrowserConfigBuilder, HeadlessMode};
use chromiumoxide::fetcher::{BrowserFetcher, BrowserFetcherOptions};
use chromiumoxide::handler::Handler;
use futures::StreamExt;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tempfile::TempDir;
use tokio::task::{self, JoinHandle};
use tracing::{error, info, trace, warn};

use crate::config::ReaderConfig;

/// Environment variable that overrides browser discovery
pub const CHROMIUM_PATH_ENV: &str = "CHROMIUM_PATH";

/// CDP request timeout for browser-level commands
const CDP_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// A launched browser with its event loop and profile directory
///
/// The profile is deleted when `profile` is dropped, so it must outlive the
/// browser process.
pub struct LaunchedBrowser {
    pub browser: Browser,
    pub handler: JoinHandle<()>,
    pub profile: TempDir,
}

/// Platform-specific install locations, checked in order
fn candidate_paths() -> &'static [&'static str] {
    if cfg!(target_os = "windows") {
        &[
            r"%PROGRAMFILES%\Google\Chrome\Application\chrome.exe",
            r"%PROGRAMFILES(X86)%\Google\Chrome\Application\chrome.exe",
            r"%LOCALAPPDATA%\Google\Chrome\Application\chrome.exe",
            r"C:\Program Files\Chromium\Application\chrome.exe",
        ]
    } else if cfg!(target_os = "macos") {
        &[
            "/Applications/Google Chrome.app/Contents/MacOS/Google Chrome",
            "/Applications/Chromium.app/Contents/MacOS/Chromium",
            "~/Applications/Google Chrome.app/Contents/MacOS/Google Chrome",
            "~/Applications/Chromium.app/Contents/MacOS/Chromium",
            "/opt/homebrew/bin/chromium",
        ]
    } else {
        &[
            "/usr/bin/google-chrome",
            "/usr/bin/google-chrome-stable",
            "/usr/bin/chromium",
            "/usr/bin/chromium-browser",
            "/snap/bin/chromium",
            "/usr/local/bin/chromium",
            "/opt/google/chrome/chrome",
        ]
    }
}

/// Expand `~/` and `%VAR%` in a candidate path
fn expand_candidate(path_str: &str) -> Option<PathBuf> {
    if let Some(rest) = path_str.strip_prefix("~/") {
        return dirs::home_dir().map(|home| home.join(rest));
    }
    if path_str.contains('%') {
        return Some(PathBuf::from(expand_env_vars(path_str, |name| {
            std::env::var(name).ok()
        })));
    }
    Some(PathBuf::from(path_str))
}

/// Replace `%VAR%` tokens using `lookup`; unknown or malformed tokens are kept verbatim.
fn expand_env_vars<F>(path: &str, lookup: F) -> String
where
    F: Fn(&str) -> Option<String>,
{
    let mut result = String::with_capacity(path.len());
    let mut rest = path;

    while let Some(start) = rest.find('%') {
        result.push_str(&rest[..start]);
        let after = &rest[start + 1..];
        match after.find('%') {
            Some(0) => {
                result.push('%');
                rest = &after[1..];
            }
            Some(end) => {
                let name = &after[..end];
                match lookup(name) {
                    Some(value) => result.push_str(&value),
                    None => {
                        result.push('%');
                        result.push_str(name);
                        result.push('%');
                    }
                }
                rest = &after[end + 1..];
            }
            None => {
                result.push('%');
                rest = after;
                break;
            }
        }
    }
    result.push_str(rest);
    result
}

/// Find Chrome/Chromium on this machine.
///
/// Order: explicit override, `CHROMIUM_PATH`, platform install paths, `which`.
pub async fn find_browser_executable(explicit: Option<&Path>) -> Result<PathBuf> {
    if let Some(path) = explicit {
        if path.exists() {
            return Ok(path.to_path_buf());
        }
        warn!("Configured browser executable does not exist: {}", path.display());
    }

    if let Ok(path) = std::env::var(CHROMIUM_PATH_ENV) {
        let path = PathBuf::from(path);
        if path.exists() {
            info!("Using browser from {CHROMIUM_PATH_ENV}: {}", path.display());
            return Ok(path);
        }
        warn!(
            "{CHROMIUM_PATH_ENV} points to non-existent file: {}",
            path.display()
        );
    }

    if let Some(path) = candidate_paths()
        .iter()
        .filter_map(|candidate| expand_candidate(candidate))
        .find(|path| path.exists())
    {
        info!("Found browser at: {}", path.display());
        return Ok(path);
    }

    if !cfg!(target_os = "windows") {
        for cmd in ["chromium", "chromium-browser", "google-chrome", "chrome"] {
            let Ok(output) = tokio::process::Command::new("which").arg(cmd).output().await else {
                continue;
            };
            let found = String::from_utf8_lossy(&output.stdout).trim().to_string();
            if output.status.success() && !found.is_empty() {
                info!("Found browser using 'which': {found}");
                return Ok(PathBuf::from(found));
            }
        }
    }

    Err(anyhow::anyhow!("Chrome/Chromium executable not found"))
}

/// Download a managed Chromium into the user cache directory.
pub async fn download_managed_browser() -> Result<PathBuf> {
    info!("Downloading managed Chromium browser...");

    let cache_dir = dirs::cache_dir()
        .unwrap_or_else(|| {
            let fallback = std::env::temp_dir();
            warn!(
                "Could not determine cache directory, using {}",
                fallback.display()
            );
            fallback
        })
        .join("kodegen_reader")
        .join("chromium");

    tokio::fs::create_dir_all(&cache_dir)
        .await
        .context("Failed to create cache directory")?;

    let fetcher = BrowserFetcher::new(
        BrowserFetcherOptions::builder()
            .with_path(&cache_dir)
            .build()
            .context("Failed to build fetcher options")?,
    );
    let revision_info = fetcher.fetch().await.context("Failed to fetch browser")?;

    info!("Downloaded Chromium to: {}", revision_info.folder_path.display());
    Ok(revision_info.executable_path)
}

/// Command-line flags for every reader browser
fn browser_args(config: &ReaderConfig) -> Vec<String> {
    let mut args: Vec<String> = [
        "--disable-blink-features=AutomationControlled",
        "--disable-infobars",
        "--disable-notifications",
        "--disable-print-preview",
        "--disable-setuid-sandbox",
        "--no-first-run",
        "--no-default-browser-check",
        "--no-sandbox",
        "--ignore-certificate-errors",
        "--force-prefers-reduced-motion",
        "--disable-extensions",
        "--disable-popup-blocking",
        "--disable-background-networking",
        "--disable-background-timer-throttling",
        "--disable-backgrounding-occluded-windows",
        "--disable-breakpad",
        "--disable-features=TranslateUI",
        "--disable-hang-monitor",
        "--password-store=basic",
        "--use-mock-keychain",
        "--hide-scrollbars",
        "--mute-audio",
    ]
    .into_iter()
    .map(String::from)
    .collect();

    if let Some(proxy) = config.proxy() {
        args.push(format!("--proxy-server={}", proxy.server));
    }
    args
}

/// Known-noisy handler errors from CDP messages chromiumoxide cannot decode
///
/// See https://github.com/mattsse/chromiumoxide/issues/167 and /229
fn is_benign_handler_error(message: &str) -> bool {
    message.contains("data did not match any variant of untagged enum Message")
        || message.contains("Failed to deserialize WS response")
}

/// Drive the CDP event loop until the connection closes
fn spawn_handler(mut handler: Handler) -> JoinHandle<()> {
    task::spawn(async move {
        while let Some(event) = handler.next().await {
            if let Err(e) = event {
                let message = e.to_string();
                if is_benign_handler_error(&message) {
                    trace!("Suppressed benign CDP serialization error: {message}");
                } else {
                    error!("Browser handler error: {e:?}");
                }
            }
        }
        trace!("Browser handler task completed");
    })
}

/// CDP command deadline. chromiumoxide also uses it as the navigation
/// deadline, so it never undercuts the configured navigation timeout.
fn cdp_request_timeout(config: &ReaderConfig) -> Duration {
    config.navigation_timeout().max(CDP_REQUEST_TIMEOUT)
}

/// Launch a browser configured from `config`.
///
/// Each launch gets its own profile directory so concurrent sessions never
/// contend for a profile lock.
pub async fn launch_browser(config: &ReaderConfig) -> Result<LaunchedBrowser> {
    let chrome_path = match find_browser_executable(config.chrome_executable()).await {
        Ok(path) => path,
        Err(e) => {
            warn!("{e}. Falling back to managed download.");
            download_managed_browser().await?
        }
    };

    let profile = tempfile::Builder::new()
        .prefix("kodegen_reader_")
        .tempdir()
        .context("Failed to create browser profile directory")?;

    let viewport = config.viewport();
    // Paused requests are resumed by the session's interceptor, never by the handler
    let mut builder = BrowserConfigBuilder::default()
        .request_timeout(cdp_request_timeout(config))
        .enable_request_intercept()
        .window_size(viewport.width, viewport.height)
        .viewport(None)
        .user_data_dir(profile.path())
        .chrome_executable(chrome_path);

    builder = if config.headless() {
        builder.headless_mode(HeadlessMode::New)
    } else {
        builder.with_head()
    };

    let browser_config = browser_args(config)
        .into_iter()
        .fold(builder, |builder, arg| builder.arg(arg))
        .build()
        .map_err(|e| anyhow::anyhow!("Failed to build browser config: {e}"))?;

    info!(
        proxy = config.proxy().map(|p| p.server.as_str()),
        "Launching browser"
    );
    let (browser, handler) = Browser::launch(browser_config)
        .await
        .context("Failed to launch browser")?;

    Ok(LaunchedBrowser {
        browser,
        handler: spawn_handler(handler),
        profile,
    })
}
