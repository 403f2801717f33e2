//! Error taxonomy for the reader pipeline.
//!
//! Every failure that crosses the pipeline boundary is one of three kinds.
//! Transport layers map the kind to their own status codes via [`ReadError::http_status`]
//! or by matching on [`ErrorKind`].

use serde::{Deserialize, Serialize};

/// Error returned by the reader pipeline
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ReadError {
    /// Caller supplied a missing URL or an unrecognized format
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// Browser launch, navigation or capture failed
    #[error("Upstream error: {0}")]
    Upstream(String),

    /// Unexpected failure inside the pipeline
    #[error("Internal error: {0}")]
    Internal(String),
}

/// Coarse classification of a [`ReadError`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    InvalidArgument,
    Upstream,
    Internal,
}

impl ReadError {
    pub fn invalid_argument(message: impl Into<String>) -> Self {
        Self::InvalidArgument(message.into())
    }

    /// Wrap a browser-side failure, keeping the full context chain.
    pub fn upstream(err: impl Into<anyhow::Error>) -> Self {
        Self::Upstream(format!("{:#}", err.into()))
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal(message.into())
    }

    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::InvalidArgument(_) => ErrorKind::InvalidArgument,
            Self::Upstream(_) => ErrorKind::Upstream,
            Self::Internal(_) => ErrorKind::Internal,
        }
    }

    /// Human-readable message without the kind prefix
    #[must_use]
    pub fn message(&self) -> &str {
        match self {
            Self::InvalidArgument(msg) | Self::Upstream(msg) | Self::Internal(msg) => msg,
        }
    }

    /// HTTP status a transport should answer with
    #[must_use]
    pub const fn http_status(&self) -> u16 {
        match self {
            Self::InvalidArgument(_) => 400,
            Self::Upstream(_) | Self::Internal(_) => 500,
        }
    }
}

impl From<anyhow::Error> for ReadError {
    fn from(err: anyhow::Error) -> Self {
        // Use {:#} to preserve full error chain with context
        Self::Internal(format!("{err:#}"))
    }
}

impl From<tokio::task::JoinError> for ReadError {
    fn from(err: tokio::task::JoinError) -> Self {
        Self::Internal(format!("Background task failed: {err}"))
    }
}

/// Convenience alias for Result with `ReadError`
pub type ReadResult<T> = Result<T, ReadError>;
