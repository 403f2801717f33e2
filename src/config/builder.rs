//! Fluent builder for `ReaderConfig`
//!
//! Every field has a default, so `ReaderConfig::builder().build()` is valid.
//! `build` rejects values the browser would refuse later.

use anyhow::{Result, bail};
use std::path::PathBuf;
use std::time::Duration;

use super::types::{ReaderConfig, UserAgentPolicy, Viewport};
use crate::navigator::WaitUntil;
use crate::proxy::ProxyDescriptor;
use crate::suppressor::SuppressionPolicy;
use crate::utils::constants::{
    DEFAULT_CLICK_TIMEOUT, DEFAULT_NAVIGATION_TIMEOUT, DEFAULT_SETTLE_TIMEOUT,
    DEFAULT_VIEWPORT_HEIGHT, DEFAULT_VIEWPORT_WIDTH,
};

/// Largest viewport edge Chrome accepts for device metrics overrides
const MAX_VIEWPORT_EDGE: u32 = 10_000_000;

#[derive(Debug, Clone)]
pub struct ReaderConfigBuilder {
    headless: bool,
    chrome_executable: Option<PathBuf>,
    viewport: Viewport,
    user_agent: UserAgentPolicy,
    wait_until: WaitUntil,
    navigation_timeout_ms: u64,
    settle_timeout_ms: u64,
    click_timeout_ms: u64,
    suppression: SuppressionPolicy,
    proxy: Option<ProxyDescriptor>,
}

impl Default for ReaderConfigBuilder {
    fn default() -> Self {
        Self {
            headless: true,
            chrome_executable: None,
            viewport: Viewport {
                width: DEFAULT_VIEWPORT_WIDTH,
                height: DEFAULT_VIEWPORT_HEIGHT,
            },
            user_agent: UserAgentPolicy::Rotate,
            wait_until: WaitUntil::Load,
            navigation_timeout_ms: millis(DEFAULT_NAVIGATION_TIMEOUT),
            settle_timeout_ms: millis(DEFAULT_SETTLE_TIMEOUT),
            click_timeout_ms: millis(DEFAULT_CLICK_TIMEOUT),
            suppression: SuppressionPolicy::VisualOnly,
            proxy: None,
        }
    }
}

/// Whole milliseconds, saturating
fn millis(duration: Duration) -> u64 {
    u64::try_from(duration.as_millis()).unwrap_or(u64::MAX)
}

impl ReaderConfig {
    /// Create a builder for configuring a `ReaderConfig` with a fluent interface
    #[must_use]
    pub fn builder() -> ReaderConfigBuilder {
        ReaderConfigBuilder::default()
    }

    /// Defaults plus the proxy from the process environment
    pub fn from_env() -> Result<Self> {
        Self::builder().proxy(ProxyDescriptor::from_env()).build()
    }
}

impl Default for ReaderConfig {
    fn default() -> Self {
        let b = ReaderConfigBuilder::default();
        Self {
            headless: b.headless,
            chrome_executable: b.chrome_executable,
            viewport: b.viewport,
            user_agent: b.user_agent,
            wait_until: b.wait_until,
            navigation_timeout_ms: b.navigation_timeout_ms,
            settle_timeout_ms: b.settle_timeout_ms,
            click_timeout_ms: b.click_timeout_ms,
            suppression: b.suppression,
            proxy: b.proxy,
        }
    }
}

impl ReaderConfigBuilder {
    #[must_use]
    pub fn headless(mut self, headless: bool) -> Self {
        self.headless = headless;
        self
    }

    #[must_use]
    pub fn chrome_executable(mut self, path: impl Into<PathBuf>) -> Self {
        self.chrome_executable = Some(path.into());
        self
    }

    #[must_use]
    pub fn viewport(mut self, width: u32, height: u32) -> Self {
        self.viewport = Viewport { width, height };
        self
    }

    #[must_use]
    pub fn user_agent(mut self, policy: UserAgentPolicy) -> Self {
        self.user_agent = policy;
        self
    }

    /// Shorthand for `user_agent(UserAgentPolicy::Fixed(..))`
    #[must_use]
    pub fn fixed_user_agent(self, ua: impl Into<String>) -> Self {
        self.user_agent(UserAgentPolicy::Fixed(ua.into()))
    }

    #[must_use]
    pub fn wait_until(mut self, wait_until: WaitUntil) -> Self {
        self.wait_until = wait_until;
        self
    }

    #[must_use]
    pub fn navigation_timeout(mut self, timeout: Duration) -> Self {
        self.navigation_timeout_ms = millis(timeout);
        self
    }

    /// Bound on the advisory network-idle wait after load.
    ///
    /// `Duration::ZERO` skips the settle step entirely.
    #[must_use]
    pub fn settle_timeout(mut self, timeout: Duration) -> Self {
        self.settle_timeout_ms = millis(timeout);
        self
    }

    #[must_use]
    pub fn click_timeout(mut self, timeout: Duration) -> Self {
        self.click_timeout_ms = millis(timeout);
        self
    }

    #[must_use]
    pub fn suppression(mut self, policy: SuppressionPolicy) -> Self {
        self.suppression = policy;
        self
    }

    #[must_use]
    pub fn proxy(mut self, proxy: Option<ProxyDescriptor>) -> Self {
        self.proxy = proxy;
        self
    }

    /// Validate and build the configuration
    ///
    /// # Errors
    ///
    /// Fails on an empty or oversized viewport, a zero navigation timeout,
    /// or an empty fixed user agent.
    pub fn build(self) -> Result<ReaderConfig> {
        let Viewport { width, height } = self.viewport;
        if width == 0 || height == 0 {
            bail!("viewport must be non-empty, got {width}x{height}");
        }
        if width > MAX_VIEWPORT_EDGE || height > MAX_VIEWPORT_EDGE {
            bail!("viewport {width}x{height} exceeds {MAX_VIEWPORT_EDGE}px");
        }
        if self.navigation_timeout_ms == 0 {
            bail!("navigation timeout must be at least one millisecond");
        }
        if let UserAgentPolicy::Fixed(ua) = &self.user_agent
            && ua.trim().is_empty()
        {
            bail!("fixed user agent must not be empty");
        }

        Ok(ReaderConfig {
            headless: self.headless,
            chrome_executable: self.chrome_executable,
            viewport: self.viewport,
            user_agent: self.user_agent,
            wait_until: self.wait_until,
            navigation_timeout_ms: self.navigation_timeout_ms,
            settle_timeout_ms: self.settle_timeout_ms,
            click_timeout_ms: self.click_timeout_ms,
            suppression: self.suppression,
            proxy: self.proxy,
        })
    }
}
