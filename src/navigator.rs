//! Page navigation with a load-completion policy.
//!
//! Navigation itself runs under a hard timeout that fails the request. The
//! optional network-idle settle that follows is advisory: pages that poll in
//! the background never go idle, and extraction proceeds anyway.

use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::future::Future;
use std::str::FromStr;
use std::time::Duration;
use tracing::debug;

use crate::error::ReadError;
use crate::session::RenderedPage;
use crate::utils::constants::{DEFAULT_NAVIGATION_TIMEOUT, DEFAULT_SETTLE_TIMEOUT};

/// Signal that ends navigation
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WaitUntil {
    /// The `load` event fired
    #[default]
    Load,
    /// No requests in flight for the idle window
    NetworkIdle,
}

impl fmt::Display for WaitUntil {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Load => "load",
            Self::NetworkIdle => "networkidle",
        })
    }
}

impl FromStr for WaitUntil {
    type Err = ReadError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "load" => Ok(Self::Load),
            "networkidle" | "network_idle" | "network-idle" => Ok(Self::NetworkIdle),
            other => Err(ReadError::invalid_argument(format!(
                "unsupported wait condition '{other}'"
            ))),
        }
    }
}

/// Navigation timing policy
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NavigationOptions {
    pub wait_until: WaitUntil,
    /// Hard limit; exceeding it fails with `Upstream`
    pub timeout: Duration,
    /// Advisory idle wait after navigation; `None` skips it
    pub settle_timeout: Option<Duration>,
}

impl Default for NavigationOptions {
    fn default() -> Self {
        Self {
            wait_until: WaitUntil::Load,
            timeout: DEFAULT_NAVIGATION_TIMEOUT,
            settle_timeout: Some(DEFAULT_SETTLE_TIMEOUT),
        }
    }
}

/// How the post-navigation settle step ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Settle {
    Idle,
    TimedOut,
    Skipped,
}

/// Wrap a page operation with a timeout, naming it in the error
pub async fn with_page_timeout<F, T>(operation: F, timeout: Duration, operation_name: &str) -> Result<T>
where
    F: Future<Output = Result<T>>,
{
    match tokio::time::timeout(timeout, operation).await {
        Ok(result) => result,
        Err(_) => Err(anyhow::anyhow!(
            "{operation_name} timeout after {} seconds",
            timeout.as_secs_f64()
        )),
    }
}

/// Drive `page` to `url` and wait according to `options`.
///
/// # Errors
///
/// `Upstream` when navigation fails or exceeds `options.timeout`. A settle
/// timeout is reported through [`Settle::TimedOut`], never as an error.
pub async fn navigate<P>(page: &P, url: &str, options: &NavigationOptions) -> Result<Settle, ReadError>
where
    P: RenderedPage,
{
    debug!("Navigating to {url} (wait until {})", options.wait_until);
    with_page_timeout(
        page.goto(url, options.wait_until),
        options.timeout,
        "Navigation",
    )
    .await
    .map_err(ReadError::upstream)?;

    let Some(settle_timeout) = options.settle_timeout else {
        return Ok(Settle::Skipped);
    };
    // NetworkIdle already waited for a quiet network inside the hard timeout
    if options.wait_until == WaitUntil::NetworkIdle {
        return Ok(Settle::Skipped);
    }

    if page.wait_for_network_idle(settle_timeout).await {
        Ok(Settle::Idle)
    } else {
        debug!(
            "Network still busy after {}s, extracting partially settled page",
            settle_timeout.as_secs_f64()
        );
        Ok(Settle::TimedOut)
    }
}
