//! Endpoint request builders and a thin client over a [`Transport`].
//!
//! # Design
//! Each endpoint has a `build_*` function that produces an [`HttpRequest`]
//! as plain data with every path segment percent-encoded. [`EcpClient`]
//! pairs those builders with a transport; it carries no state of its own
//! between calls.

use urlencoding::encode;

use crate::config::EcpConfig;
use crate::error::UsageError;
use crate::http::{HttpRequest, RequestOutcome};
use crate::keys::{Key, Query};
use crate::log::LogSink;
use crate::transport::{HttpTransport, Transport};

/// `POST /keypress/{key}`
pub fn build_keypress(key: &Key) -> HttpRequest {
    HttpRequest::post(format!("/keypress/{}", encode(&key.protocol_name())))
}

/// `POST /launch/{app_id}[?{params}]`
pub fn build_launch(app_id: &str, params: &[(String, String)]) -> Result<HttpRequest, UsageError> {
    let app_id = app_id.trim();
    if app_id.is_empty() {
        return Err(UsageError::BlankAppId);
    }
    let mut path = format!("/launch/{}", encode(app_id));
    if !params.is_empty() {
        let query: Vec<String> = params
            .iter()
            .map(|(k, v)| format!("{}={}", encode(k), encode(v)))
            .collect();
        path.push('?');
        path.push_str(&query.join("&"));
    }
    Ok(HttpRequest::post(path))
}

/// `GET /query/...`
pub fn build_query(query: Query) -> HttpRequest {
    HttpRequest::get(query.path())
}

/// Remote-control client bound to one device through a transport.
#[derive(Debug, Clone)]
pub struct EcpClient<T = HttpTransport> {
    transport: T,
}

impl EcpClient<HttpTransport> {
    /// Plain-HTTP client for `host` using `config`'s port and timeout.
    pub fn connect(host: &str, config: &EcpConfig) -> Result<Self, UsageError> {
        Ok(Self::new(HttpTransport::from_config(host, config)?))
    }
}

impl<T: Transport> EcpClient<T> {
    pub fn new(transport: T) -> Self {
        Self { transport }
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    pub fn keypress(&self, key: &Key, sink: &mut dyn LogSink) -> RequestOutcome {
        self.transport.send(&build_keypress(key), sink)
    }

    pub fn launch(
        &self,
        app_id: &str,
        params: &[(String, String)],
        sink: &mut dyn LogSink,
    ) -> Result<RequestOutcome, UsageError> {
        let request = build_launch(app_id, params)?;
        Ok(self.transport.send(&request, sink))
    }

    pub fn query(&self, query: Query, sink: &mut dyn LogSink) -> RequestOutcome {
        self.transport.send(&build_query(query), sink)
    }
}
