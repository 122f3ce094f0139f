//! HTTP request and outcome types.
//!
//! # Design
//! `HttpRequest` describes an endpoint call as plain data. `EcpClient`
//! builds these and a [`Transport`](crate::transport::Transport) executes
//! them, so endpoint shapes are testable without a network.
//!
//! A non-2xx response is still [`RequestOutcome::Success`]; the status code is
//! the signal. Only failures to complete the exchange become
//! [`RequestOutcome::Failure`].

use std::fmt;

use serde::Serialize;

use crate::error::{Failure, FailureKind};

/// HTTP methods used by the remote-control protocol.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum HttpMethod {
    Get,
    Post,
}

impl HttpMethod {
    pub fn as_str(self) -> &'static str {
        match self {
            HttpMethod::Get => "GET",
            HttpMethod::Post => "POST",
        }
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An endpoint call described as plain data. `path` is already
/// percent-encoded and starts with `/`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpRequest {
    pub method: HttpMethod,
    pub path: String,
    pub body: Option<Vec<u8>>,
}

impl HttpRequest {
    pub fn get(path: impl Into<String>) -> Self {
        Self {
            method: HttpMethod::Get,
            path: path.into(),
            body: None,
        }
    }

    pub fn post(path: impl Into<String>) -> Self {
        Self {
            method: HttpMethod::Post,
            path: path.into(),
            body: None,
        }
    }
}

/// Result of a single transport call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum RequestOutcome {
    Success {
        status_code: u16,
        status_text: String,
        body_text: String,
        headers: Vec<(String, String)>,
    },
    Failure(Failure),
}

impl RequestOutcome {
    pub fn failure(kind: FailureKind, message: impl Into<String>) -> Self {
        RequestOutcome::Failure(Failure::new(kind, message))
    }

    /// `true` for a completed exchange with a 2xx status.
    pub fn is_ok_status(&self) -> bool {
        matches!(self, RequestOutcome::Success { status_code, .. } if (200..300).contains(status_code))
    }

    pub fn status_code(&self) -> Option<u16> {
        match self {
            RequestOutcome::Success { status_code, .. } => Some(*status_code),
            RequestOutcome::Failure(_) => None,
        }
    }

    pub fn body_text(&self) -> Option<&str> {
        match self {
            RequestOutcome::Success { body_text, .. } => Some(body_text),
            RequestOutcome::Failure(_) => None,
        }
    }

    pub fn as_failure(&self) -> Option<&Failure> {
        match self {
            RequestOutcome::Failure(failure) => Some(failure),
            RequestOutcome::Success { .. } => None,
        }
    }

    /// Convert into a `Result`, keeping non-2xx responses on the `Ok` side.
    pub fn into_result(self) -> Result<Self, Failure> {
        match self {
            RequestOutcome::Failure(failure) => Err(failure),
            success => Ok(success),
        }
    }
}
