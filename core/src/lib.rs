//! Client core for a device remote-control protocol.
//!
//! # Overview
//! Two independent pieces composed by callers:
//! - [`tokenizer`] turns free-form text into at most `limit` signed 32-bit
//!   integers and reports every rejected token with its reason.
//! - [`transport`] performs one HTTP call to the device's fixed port with a
//!   deadline and classifies the result into a [`RequestOutcome`].
//!
//! [`sequencer`] combines them to type numbers on the device one keypress
//! at a time. Every request and outcome is appended to a caller-owned
//! [`LogSink`].
//!
//! # Design
//! - No state survives a call: each transport call gets its own agent and
//!   deadline, and nothing is retried.
//! - Endpoint calls are built as plain [`HttpRequest`] values first, so the
//!   endpoint shapes are testable without a network.
//! - A blank host is a [`UsageError`], reported before anything is sent.

pub mod client;
pub mod config;
pub mod error;
pub mod http;
pub mod keys;
pub mod log;
pub mod sequencer;
pub mod tokenizer;
pub mod transport;

pub use client::{build_keypress, build_launch, build_query, EcpClient};
pub use config::{EcpConfig, ECP_PORT};
pub use error::{ConfigError, Failure, FailureKind, UsageError};
pub use http::{HttpMethod, HttpRequest, RequestOutcome};
pub use keys::{Key, NamedKey, Query};
pub use log::{ActivityLog, LogEntry, LogKind, LogSink};
pub use sequencer::{type_values, typed_keys, SequenceReport};
pub use tokenizer::{parse_tokens, ParseResult, RejectReason, RejectedToken, DEFAULT_LIMIT};
pub use transport::{send_request, HttpTransport, Transport};
