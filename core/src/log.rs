//! Append-only activity log shown to the user.
//!
//! Transport and sequencer write every attempt here in addition to emitting
//! `tracing` events. Writing to a sink never influences control flow.

use std::fmt;

use chrono::{DateTime, Local};

/// Category of a log line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogKind {
    Request,
    Response,
    Error,
    Info,
}

impl LogKind {
    pub fn as_str(self) -> &'static str {
        match self {
            LogKind::Request => "REQUEST",
            LogKind::Response => "RESPONSE",
            LogKind::Error => "ERROR",
            LogKind::Info => "INFO",
        }
    }
}

/// Destination for activity lines. Callers own the sink and pass it into
/// every call by `&mut`, so appends are always sequential.
pub trait LogSink {
    fn append(&mut self, kind: LogKind, message: &str);
}

#[derive(Debug, Clone)]
pub struct LogEntry {
    pub at: DateTime<Local>,
    pub kind: LogKind,
    pub message: String,
}

impl fmt::Display for LogEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[{}] {} {}",
            self.at.format("%H:%M:%S%.3f"),
            self.kind.as_str(),
            self.message
        )
    }
}

/// In-memory, timestamped accumulator.
#[derive(Debug, Default, Clone)]
pub struct ActivityLog {
    entries: Vec<LogEntry>,
}

impl ActivityLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Entries in insertion order.
    pub fn entries(&self) -> &[LogEntry] {
        &self.entries
    }

    /// Formatted lines, newest first.
    pub fn lines(&self) -> Vec<String> {
        self.entries.iter().rev().map(ToString::to_string).collect()
    }

    pub fn count(&self, kind: LogKind) -> usize {
        self.entries.iter().filter(|e| e.kind == kind).count()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}

impl LogSink for ActivityLog {
    fn append(&mut self, kind: LogKind, message: &str) {
        self.entries.push(LogEntry {
            at: Local::now(),
            kind,
            message: message.to_string(),
        });
    }
}
