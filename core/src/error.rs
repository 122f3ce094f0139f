//! Error types for the remote-control client.
//!
//! # Design
//! Two distinct families. [`UsageError`] is a caller mistake detected before
//! any network activity (blank host, unknown key name) so a front end can
//! prompt for input instead of showing a network error. [`Failure`] is a
//! transport-level failure carried inside
//! [`RequestOutcome`](crate::http::RequestOutcome) and matched on by
//! [`FailureKind`], never by message text.

use serde::Serialize;
use thiserror::Error;

/// Precondition violations raised before a request is attempted.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum UsageError {
    #[error("target host is required")]
    BlankHost,

    #[error("invalid host {0:?}: give the address without a port")]
    InvalidHost(String),

    #[error("unknown key name: {0}")]
    UnknownKey(String),

    #[error("application id is required")]
    BlankAppId,

    #[error("unknown query: {0}")]
    UnknownQuery(String),

    #[error("limit must be greater than zero")]
    ZeroLimit,
}

/// Closed set of ways a single transport call can fail.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FailureKind {
    /// The call did not settle before its deadline.
    Timeout,
    /// Connection refused, DNS failure, reset, or any other transport error.
    Network,
    /// The exchange completed but the response could not be used at all.
    BodyReadError,
}

impl FailureKind {
    pub fn as_str(self) -> &'static str {
        match self {
            FailureKind::Timeout => "TIMEOUT",
            FailureKind::Network => "NETWORK",
            FailureKind::BodyReadError => "BODY_READ_ERROR",
        }
    }
}

/// A classified transport failure.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Error)]
#[error("{}: {message}", .kind.as_str())]
pub struct Failure {
    pub kind: FailureKind,
    pub message: String,
}

impl Failure {
    pub fn new(kind: FailureKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

/// Invalid configuration values read from the environment.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("invalid value for {name}: {value:?}")]
    InvalidValue { name: &'static str, value: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn failure_display_includes_kind_and_message() {
        let failure = Failure::new(FailureKind::Timeout, "no response after 100ms");
        assert_eq!(failure.to_string(), "TIMEOUT: no response after 100ms");
    }

    #[test]
    fn usage_error_messages() {
        assert_eq!(UsageError::BlankHost.to_string(), "target host is required");
        assert_eq!(
            UsageError::UnknownKey("Nope".into()).to_string(),
            "unknown key name: Nope"
        );
        assert_eq!(
            UsageError::InvalidHost("tv:80".into()).to_string(),
            "invalid host \"tv:80\": give the address without a port"
        );
    }
}
