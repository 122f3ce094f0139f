//! Single-shot HTTP transport with a per-call deadline.
//!
//! # Design
//! Every call builds a fresh `ureq` agent configured with a global timeout
//! covering connect, send, and receive. The deadline belongs to that call
//! alone and is dropped with the agent on every exit path, so nothing can
//! fire after the call returns. No connection is reused between calls and
//! nothing is retried.
//!
//! Outcomes are classified into [`RequestOutcome`]: completed exchanges are
//! `Success` regardless of status code, timeouts and connection problems are
//! `Failure`. A body that cannot be read degrades to a placeholder string
//! unless the transport was built with [`HttpTransport::require_body`].

use std::io;
use std::net::Ipv6Addr;
use std::time::{Duration, Instant};

use tracing::{debug, warn};

use crate::config::{EcpConfig, ECP_PORT};
use crate::error::{FailureKind, UsageError};
use crate::http::{HttpMethod, HttpRequest, RequestOutcome};
use crate::log::{LogKind, LogSink};

/// Executes one request and classifies the result.
pub trait Transport {
    fn send(&self, request: &HttpRequest, sink: &mut dyn LogSink) -> RequestOutcome;
}

/// Plain-HTTP transport to `host:port`.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    host: String,
    port: u16,
    timeout: Duration,
    require_body: bool,
}

impl HttpTransport {
    /// Fails with [`UsageError::BlankHost`] if `host` is empty or whitespace,
    /// and with [`UsageError::InvalidHost`] if it carries its own `:port`.
    ///
    /// An `http://` prefix, trailing `/`, and IPv6 brackets are stripped.
    pub fn new(host: &str, port: u16, timeout: Duration) -> Result<Self, UsageError> {
        let host = normalize_host(host)?;
        Ok(Self {
            host,
            port,
            timeout,
            require_body: false,
        })
    }

    pub fn from_config(host: &str, config: &EcpConfig) -> Result<Self, UsageError> {
        Self::new(host, config.port, config.timeout)
    }

    /// Treat an unreadable body as [`FailureKind::BodyReadError`] instead of
    /// substituting a placeholder.
    pub fn require_body(mut self, require: bool) -> Self {
        self.require_body = require;
        self
    }

    pub fn host(&self) -> &str {
        &self.host
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    pub fn url(&self, path: &str) -> String {
        if self.host.parse::<Ipv6Addr>().is_ok() {
            format!("http://[{}]:{}{path}", self.host, self.port)
        } else {
            format!("http://{}:{}{path}", self.host, self.port)
        }
    }

    fn execute(&self, url: &str, request: &HttpRequest) -> Result<ureq::http::Response<ureq::Body>, ureq::Error> {
        let agent: ureq::Agent = ureq::Agent::config_builder()
            .http_status_as_error(false)
            .timeout_global(Some(self.timeout))
            .build()
            .new_agent();

        match (request.method, request.body.as_deref()) {
            (HttpMethod::Get, _) => agent.get(url).call(),
            (HttpMethod::Post, Some(body)) => agent.post(url).send(body),
            (HttpMethod::Post, None) => agent.post(url).send_empty(),
        }
    }
}

impl Transport for HttpTransport {
    fn send(&self, request: &HttpRequest, sink: &mut dyn LogSink) -> RequestOutcome {
        let url = self.url(&request.path);
        let line = format!("{} {url}", request.method);
        sink.append(LogKind::Request, &line);
        debug!(method = %request.method, url = %url, "sending request");

        let started = Instant::now();
        let mut response = match self.execute(&url, request) {
            Ok(response) => response,
            Err(err) => {
                let kind = classify_error(&err);
                let message = match kind {
                    FailureKind::Timeout => {
                        format!("no response within {}ms", self.timeout.as_millis())
                    }
                    _ => err.to_string(),
                };
                warn!(method = %request.method, url = %url, kind = kind.as_str(), error = %message, "request failed");
                sink.append(LogKind::Error, &format!("{} {line}: {message}", kind.as_str()));
                return RequestOutcome::failure(kind, message);
            }
        };

        let status = response.status();
        let status_code = status.as_u16();
        let status_text = status.canonical_reason().unwrap_or_default().to_string();
        let headers = response
            .headers()
            .iter()
            .filter_map(|(name, value)| {
                value
                    .to_str()
                    .ok()
                    .map(|v| (name.as_str().to_string(), v.to_string()))
            })
            .collect();

        let body_text = match response.body_mut().read_to_string() {
            Ok(text) => text,
            Err(err) if self.require_body => {
                let message = format!("failed to read response body: {err}");
                warn!(url = %url, status = status_code, error = %err, "body read failed");
                sink.append(LogKind::Error, &format!("BODY_READ_ERROR {line}: {message}"));
                return RequestOutcome::failure(FailureKind::BodyReadError, message);
            }
            Err(err) => {
                warn!(url = %url, status = status_code, error = %err, "body read failed, using placeholder");
                body_placeholder(&err)
            }
        };

        let elapsed = started.elapsed();
        debug!(url = %url, status = status_code, elapsed_ms = elapsed.as_millis() as u64, "request completed");
        sink.append(
            LogKind::Response,
            &format!(
                "{status_code} {status_text} ({line}, {} bytes, {}ms)",
                body_text.len(),
                elapsed.as_millis()
            ),
        );

        RequestOutcome::Success {
            status_code,
            status_text,
            body_text,
            headers,
        }
    }
}

/// Send one request to `base_address` on the protocol port.
///
/// Returns `Err` only for a blank or malformed `base_address`, before
/// anything is logged or sent. Every other result, including timeouts and refused connections,
/// is a [`RequestOutcome`].
pub fn send_request(
    base_address: &str,
    path: &str,
    method: HttpMethod,
    body: Option<&[u8]>,
    timeout: Duration,
    sink: &mut dyn LogSink,
) -> Result<RequestOutcome, UsageError> {
    let transport = HttpTransport::new(base_address, ECP_PORT, timeout)?;
    let request = HttpRequest {
        method,
        path: path.to_string(),
        body: body.map(<[u8]>::to_vec),
    };
    Ok(transport.send(&request, sink))
}

fn normalize_host(raw: &str) -> Result<String, UsageError> {
    let trimmed = raw.trim();
    let without_scheme = trimmed.strip_prefix("http://").unwrap_or(trimmed);
    let host = without_scheme.trim_end_matches('/');
    let host = match host.strip_prefix('[') {
        Some(inner) => inner
            .strip_suffix(']')
            .ok_or_else(|| UsageError::InvalidHost(trimmed.to_string()))?,
        None => host,
    };
    if host.trim().is_empty() {
        return Err(UsageError::BlankHost);
    }
    // Only a literal IPv6 address may contain a colon; anything else is a
    // host with an explicit port.
    if host.contains(':') && host.parse::<Ipv6Addr>().is_err() {
        return Err(UsageError::InvalidHost(trimmed.to_string()));
    }
    Ok(host.to_string())
}

fn classify_error(err: &ureq::Error) -> FailureKind {
    match err {
        ureq::Error::Timeout(_) => FailureKind::Timeout,
        ureq::Error::Io(e) if e.kind() == io::ErrorKind::TimedOut => FailureKind::Timeout,
        _ => FailureKind::Network,
    }
}

fn body_placeholder(err: &ureq::Error) -> String {
    format!("<body unavailable: {err}>")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DEFAULT_TIMEOUT;
    use crate::log::ActivityLog;

    #[test]
    fn blank_host_is_rejected_before_sending() {
        let mut log = ActivityLog::new();
        for host in ["", "   ", "\t\n", "http://", "http:///"] {
            let result = send_request(
                host,
                "/keypress/Home",
                HttpMethod::Post,
                None,
                Duration::from_millis(100),
                &mut log,
            );
            assert_eq!(result, Err(UsageError::BlankHost), "host {host:?}");
        }
        assert_eq!(log.count(LogKind::Request), 0);
        assert!(log.is_empty());
    }

    #[test]
    fn url_uses_protocol_port() {
        let transport = HttpTransport::new("192.168.1.20", ECP_PORT, DEFAULT_TIMEOUT).unwrap();
        assert_eq!(
            transport.url("/query/apps"),
            "http://192.168.1.20:8060/query/apps"
        );
    }

    #[test]
    fn scheme_and_trailing_slash_are_stripped() {
        let transport = HttpTransport::new(" http://tv.local/ ", ECP_PORT, DEFAULT_TIMEOUT).unwrap();
        assert_eq!(transport.host(), "tv.local");
        assert_eq!(transport.url("/keypress/Home"), "http://tv.local:8060/keypress/Home");
    }

    #[test]
    fn ipv6_hosts_are_bracketed() {
        let transport = HttpTransport::new("[fe80::1]", 9000, DEFAULT_TIMEOUT).unwrap();
        assert_eq!(transport.url("/query/apps"), "http://[fe80::1]:9000/query/apps");
    }

    #[test]
    fn explicit_port_is_rejected_before_sending() {
        let mut log = ActivityLog::new();
        for host in ["127.0.0.1:8060", "tv.local:80", "http://10.0.0.5:8060/", "[fe80::1]:9000"] {
            let result = send_request(
                host,
                "/query/apps",
                HttpMethod::Get,
                None,
                Duration::from_millis(100),
                &mut log,
            );
            assert!(
                matches!(result, Err(UsageError::InvalidHost(_))),
                "host {host:?} gave {result:?}"
            );
        }
        assert!(log.is_empty());
    }

    #[test]
    fn bare_ipv6_is_bracketed_without_brackets_in_input() {
        let transport = HttpTransport::new("::1", ECP_PORT, DEFAULT_TIMEOUT).unwrap();
        assert_eq!(transport.host(), "::1");
        assert_eq!(transport.url("/query/apps"), "http://[::1]:8060/query/apps");
    }

    #[test]
    fn timeout_errors_are_classified() {
        let err = ureq::Error::Io(io::Error::new(io::ErrorKind::TimedOut, "timed out"));
        assert_eq!(classify_error(&err), FailureKind::Timeout);

        let err = ureq::Error::Io(io::Error::new(io::ErrorKind::ConnectionRefused, "refused"));
        assert_eq!(classify_error(&err), FailureKind::Network);
    }

    #[test]
    fn placeholder_mentions_the_cause() {
        let err = ureq::Error::Io(io::Error::new(io::ErrorKind::UnexpectedEof, "stream ended"));
        let text = body_placeholder(&err);
        assert!(text.starts_with("<body unavailable: "));
        assert!(text.contains("stream ended"));
    }
}
