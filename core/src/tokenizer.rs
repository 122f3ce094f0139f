//! Bounded integer tokenizer for free-form input text.
//!
//! # Design
//! Input is split on runs of commas, semicolons, and whitespace. Each
//! candidate is either accepted as an `i32` or recorded as a
//! [`RejectedToken`] with its original text. Scanning stops the moment
//! `limit` values have been accepted; candidates after that point are never
//! classified. Whether any of them would have been accepted is still
//! reported through [`ParseResult::truncated`] so callers can show a
//! truncation note.

use serde::Serialize;

use crate::log::{LogKind, LogSink};

/// Number of values accepted when the caller has no preference.
pub const DEFAULT_LIMIT: usize = 3;

/// Why a candidate token was not accepted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RejectReason {
    /// Not of the form `[+-]?[0-9]+`.
    NotInteger,
    /// Numeric, but outside the signed 32-bit range.
    OutOfRange,
}

impl RejectReason {
    pub fn as_str(self) -> &'static str {
        match self {
            RejectReason::NotInteger => "NOT_INTEGER",
            RejectReason::OutOfRange => "OUT_OF_RANGE",
        }
    }
}

/// A candidate that was scanned and rejected, with its original text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RejectedToken {
    pub token: String,
    pub reason: RejectReason,
}

/// Outcome of [`parse_tokens`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ParseResult {
    /// Accepted values in input order. Never longer than the limit.
    pub values: Vec<i32>,
    /// Rejected candidates seen before the limit was reached, in input order.
    pub rejected: Vec<RejectedToken>,
    /// `true` if an unvisited candidate after the stop point was a valid value.
    pub truncated: bool,
}

impl ParseResult {
    /// Write the accepted values, each rejection, and a truncation note.
    pub fn log_to(&self, limit: usize, sink: &mut dyn LogSink) {
        let accepted: Vec<String> = self.values.iter().map(i32::to_string).collect();
        sink.append(LogKind::Info, &format!("accepted [{}]", accepted.join(", ")));
        for r in &self.rejected {
            sink.append(LogKind::Info, &format!("rejected {:?}: {}", r.token, r.reason.as_str()));
        }
        if self.truncated {
            sink.append(
                LogKind::Info,
                &format!("more values were given; only the first {limit} are used"),
            );
        }
    }
}

/// Extract up to `limit` signed 32-bit integers from `text`.
///
/// A `limit` of zero accepts nothing and rejects nothing.
pub fn parse_tokens(text: &str, limit: usize) -> ParseResult {
    let mut result = ParseResult::default();
    if limit == 0 {
        return result;
    }

    let mut candidates = split_candidates(text);
    for candidate in candidates.by_ref() {
        match classify(candidate) {
            Ok(value) => result.values.push(value),
            Err(reason) => result.rejected.push(RejectedToken {
                token: candidate.to_string(),
                reason,
            }),
        }
        if result.values.len() == limit {
            break;
        }
    }

    result.truncated = candidates.any(|c| classify(c).is_ok());
    result
}

fn is_separator(c: char) -> bool {
    c == ',' || c == ';' || c.is_whitespace()
}

fn split_candidates(text: &str) -> impl Iterator<Item = &str> {
    text.split(is_separator).filter(|s| !s.is_empty())
}

fn classify(token: &str) -> Result<i32, RejectReason> {
    let digits = token.strip_prefix(['+', '-']).unwrap_or(token);
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return Err(RejectReason::NotInteger);
    }
    // The shape is already validated, so any parse failure is an overflow.
    token.parse::<i32>().map_err(|_| RejectReason::OutOfRange)
}
