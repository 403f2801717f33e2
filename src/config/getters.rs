//! Getter methods for `ReaderConfig`

use std::path::Path;
use std::time::Duration;

use super::types::{ReaderConfig, UserAgentPolicy, Viewport};
use crate::navigator::{NavigationOptions, WaitUntil};
use crate::proxy::ProxyDescriptor;
use crate::suppressor::SuppressionPolicy;

impl ReaderConfig {
    #[must_use]
    pub fn headless(&self) -> bool {
        self.headless
    }

    #[must_use]
    pub fn chrome_executable(&self) -> Option<&Path> {
        self.chrome_executable.as_deref()
    }

    #[must_use]
    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    #[must_use]
    pub fn user_agent(&self) -> &UserAgentPolicy {
        &self.user_agent
    }

    #[must_use]
    pub fn wait_until(&self) -> WaitUntil {
        self.wait_until
    }

    #[must_use]
    pub fn navigation_timeout(&self) -> Duration {
        Duration::from_millis(self.navigation_timeout_ms)
    }

    /// `None` when the settle step is disabled
    #[must_use]
    pub fn settle_timeout(&self) -> Option<Duration> {
        (self.settle_timeout_ms > 0).then(|| Duration::from_millis(self.settle_timeout_ms))
    }

    #[must_use]
    pub fn click_timeout(&self) -> Duration {
        Duration::from_millis(self.click_timeout_ms)
    }

    #[must_use]
    pub fn suppression(&self) -> SuppressionPolicy {
        self.suppression
    }

    #[must_use]
    pub fn proxy(&self) -> Option<&ProxyDescriptor> {
        self.proxy.as_ref()
    }

    /// Navigator settings derived from this config
    #[must_use]
    pub fn navigation_options(&self) -> NavigationOptions {
        NavigationOptions {
            wait_until: self.wait_until,
            timeout: self.navigation_timeout(),
            settle_timeout: self.settle_timeout(),
        }
    }
}
