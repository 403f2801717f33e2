//! Shared configuration constants for the reader pipeline
//!
//! Default values used by the config builder, the session manager and the
//! suppressor. Kept in one place so the defaults stay consistent.

use std::time::Duration;

/// Default viewport width in CSS pixels
pub const DEFAULT_VIEWPORT_WIDTH: u32 = 1280;

/// Default viewport height in CSS pixels
///
/// IMAGE captures exactly this area; PAGESHOT extends past it to the full
/// scrollable height.
pub const DEFAULT_VIEWPORT_HEIGHT: u32 = 720;

/// Hard navigation timeout: 30 seconds
///
/// Exceeding it fails the request with an upstream error.
pub const DEFAULT_NAVIGATION_TIMEOUT: Duration = Duration::from_secs(30);

/// Post-navigation network-idle settle: 10 seconds
///
/// Advisory only. Pages with persistent background polling never go idle,
/// so extraction proceeds with whatever has rendered when this expires.
pub const DEFAULT_SETTLE_TIMEOUT: Duration = Duration::from_secs(10);

/// Per-selector timeout for consent-banner click attempts
pub const DEFAULT_CLICK_TIMEOUT: Duration = Duration::from_millis(500);

/// Trailing window with zero in-flight requests that counts as network-idle
pub const NETWORK_IDLE_WINDOW: Duration = Duration::from_millis(500);

/// Upper bound on waiting for the browser process to exit after close
pub const BROWSER_EXIT_TIMEOUT: Duration = Duration::from_secs(5);

/// Realistic desktop user agents rotated across sessions
///
/// Chromium family only: the engine is always Chromium, so client hints and
/// `navigator.userAgentData` must agree with the string.
///
/// Updated: 2025-01-29 to Chrome 132 / Edge 131.
/// Keep within a quarter of current stable releases.
///
/// Reference: https://chromiumdash.appspot.com/schedule
pub const USER_AGENT_POOL: &[&str] = &[
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/132.0.6834.160 Safari/537.36",
    "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/132.0.6834.160 Safari/537.36",
    "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/132.0.6834.160 Safari/537.36",
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/131.0.6778.265 Safari/537.36 Edg/131.0.2903.112",
    "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/131.0.6778.265 Safari/537.36",
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/131.0.6778.265 Safari/537.36",
];

/// User agent used when rotation is disabled
pub const CHROME_USER_AGENT: &str = USER_AGENT_POOL[0];

/// Accept-Language sent alongside the user agent override
pub const ACCEPT_LANGUAGE: &str = "en-US,en;q=0.9";

/// Proxy environment variables, highest priority first
pub const PROXY_ENV_VARS: [&str; 4] = ["https_proxy", "HTTPS_PROXY", "http_proxy", "HTTP_PROXY"];

/// Scheme prepended to URLs that carry none
pub const DEFAULT_SCHEME: &str = "https://";
