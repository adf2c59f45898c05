// Error types for the extraction pipeline

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

use super::process::ProcessError;

/// Every failure the pipeline can name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ErrorKind {
    /// Input is not an accepted post/reel/tv URL
    InvalidUrl,

    /// Page or worker answered, but no playable asset was located
    NoVideoFound,

    /// Fetch failed, timed out, or returned a non-success status
    NetworkError,

    /// Worker exceeded its hard deadline and was killed
    WorkerTimeout,

    /// Worker exited with a non-zero status
    WorkerNonZeroExit,

    /// Worker exited cleanly but stdout was not the expected JSON document
    WorkerOutputUnparsable,

    /// Worker process could not be started
    WorkerSpawnFailed,

    /// Every strategy failed for a valid URL; reported as a warning, not an error
    AllStrategiesDegraded,
}

/// How a caller should classify a response or error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StatusClass {
    Ok,
    OkWithWarning,
    ClientError,
}

impl ErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::InvalidUrl => "InvalidUrl",
            Self::NoVideoFound => "NoVideoFound",
            Self::NetworkError => "NetworkError",
            Self::WorkerTimeout => "WorkerTimeout",
            Self::WorkerNonZeroExit => "WorkerNonZeroExit",
            Self::WorkerOutputUnparsable => "WorkerOutputUnparsable",
            Self::WorkerSpawnFailed => "WorkerSpawnFailed",
            Self::AllStrategiesDegraded => "AllStrategiesDegraded",
        }
    }

    /// Status a caller sees if this kind ever reaches the outside.
    ///
    /// Only `InvalidUrl` is a client error. Strategy failures never surface
    /// on their own; they end in a degraded success.
    pub fn status(&self) -> StatusClass {
        match self {
            Self::InvalidUrl => StatusClass::ClientError,
            _ => StatusClass::OkWithWarning,
        }
    }

    /// Kinds raised by the external worker strategies.
    pub fn is_worker_failure(&self) -> bool {
        matches!(
            self,
            Self::WorkerTimeout
                | Self::WorkerNonZeroExit
                | Self::WorkerOutputUnparsable
                | Self::WorkerSpawnFailed
        )
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Typed failure of a single strategy attempt.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{kind}: {message}")]
pub struct StrategyError {
    pub kind: ErrorKind,
    pub message: String,
}

impl StrategyError {
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    pub fn no_video(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::NoVideoFound, message)
    }

    pub fn network(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::NetworkError, message)
    }

    pub fn unparsable(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::WorkerOutputUnparsable, message)
    }
}

impl From<reqwest::Error> for StrategyError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            return Self::network(format!("Request timed out: {}", e));
        }
        if let Some(status) = e.status() {
            return Self::network(format!("HTTP {}: {}", status.as_u16(), e));
        }
        Self::network(e.to_string())
    }
}

impl From<ProcessError> for StrategyError {
    fn from(e: ProcessError) -> Self {
        let kind = match &e {
            ProcessError::Spawn { .. } => ErrorKind::WorkerSpawnFailed,
            ProcessError::TimedOut(_) => ErrorKind::WorkerTimeout,
            // Lost pipes or a failed wait leave no usable document behind
            ProcessError::Io(_) => ErrorKind::WorkerOutputUnparsable,
        };
        Self::new(kind, e.to_string())
    }
}

/// Rejected input: not an accepted post/reel/tv URL.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Invalid Instagram URL: {reason}")]
pub struct InvalidUrl {
    pub url: String,
    pub reason: String,
}

impl InvalidUrl {
    pub fn new(url: &str, reason: impl Into<String>) -> Self {
        Self {
            url: url.to_string(),
            reason: reason.into(),
        }
    }
}

/// Error surfaced to the caller of `extract`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Error)]
#[error("{kind}: {message}")]
pub struct ErrorResponse {
    pub kind: ErrorKind,
    pub message: String,
}

impl ErrorResponse {
    pub fn status(&self) -> StatusClass {
        self.kind.status()
    }
}

impl From<InvalidUrl> for ErrorResponse {
    fn from(e: InvalidUrl) -> Self {
        Self {
            kind: ErrorKind::InvalidUrl,
            message: e.to_string(),
        }
    }
}
