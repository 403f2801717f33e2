//! Core configuration types for the reader pipeline
//!
//! `ReaderConfig` is built once at startup and shared by every request. It
//! holds no per-request state.

use rand::seq::IndexedRandom;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::navigator::WaitUntil;
use crate::proxy::ProxyDescriptor;
use crate::suppressor::SuppressionPolicy;
use crate::utils::constants::{CHROME_USER_AGENT, USER_AGENT_POOL};

/// Main configuration struct for rendering and extraction
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReaderConfig {
    pub(crate) headless: bool,

    /// Explicit browser binary. `None` means discover or download one.
    pub(crate) chrome_executable: Option<PathBuf>,

    pub(crate) viewport: Viewport,
    pub(crate) user_agent: UserAgentPolicy,
    pub(crate) wait_until: WaitUntil,

    /// Hard limit for `goto` plus the load signal. Exceeding it is fatal.
    pub(crate) navigation_timeout_ms: u64,

    /// Upper bound on the post-navigation network-idle wait. `0` disables it.
    ///
    /// Advisory: a timeout here never fails the request.
    pub(crate) settle_timeout_ms: u64,

    /// Per-selector budget for consent-banner clicks
    pub(crate) click_timeout_ms: u64,

    pub(crate) suppression: SuppressionPolicy,

    /// Resolved once at startup; never re-read from the environment per request
    pub(crate) proxy: Option<ProxyDescriptor>,
}

/// Fixed page viewport in CSS pixels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Viewport {
    pub width: u32,
    pub height: u32,
}

/// How each session picks its user agent
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UserAgentPolicy {
    /// Random pick from the built-in desktop pool per session
    #[default]
    Rotate,
    /// Same string for every session
    Fixed(String),
}

impl UserAgentPolicy {
    /// User agent for a new session
    #[must_use]
    pub fn pick(&self) -> String {
        match self {
            Self::Rotate => USER_AGENT_POOL
                .choose(&mut rand::rng())
                .copied()
                .unwrap_or(CHROME_USER_AGENT)
                .to_string(),
            Self::Fixed(ua) => ua.clone(),
        }
    }
}

/// Platform string matching a user agent, for `navigator.platform`
#[must_use]
pub fn platform_for_user_agent(user_agent: &str) -> &'static str {
    if user_agent.contains("Windows") {
        "Win32"
    } else if user_agent.contains("Macintosh") {
        "MacIntel"
    } else {
        "Linux x86_64"
    }
}
