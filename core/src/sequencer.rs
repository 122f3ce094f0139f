//! Types integers on the device one character at a time.
//!
//! Each value is rendered in decimal and every character becomes one
//! `Lit_` keypress, optionally followed by a `Select`. Calls are strictly
//! sequential with a pacing sleep between consecutive calls. The first
//! transport [`Failure`] ends the sequence; keys already sent stay sent.

use std::thread;
use std::time::Duration;

use serde::Serialize;
use tracing::{info, warn};

use crate::client::build_keypress;
use crate::error::Failure;
use crate::http::RequestOutcome;
use crate::keys::{Key, NamedKey};
use crate::log::{LogKind, LogSink};
use crate::transport::Transport;

/// How far a sequence got.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SequenceReport {
    /// Character keypresses that completed.
    pub completed_presses: usize,
    /// `Select` keypresses that completed.
    pub select_presses: usize,
    /// The failure that stopped the sequence, if any.
    pub failure: Option<Failure>,
}

impl SequenceReport {
    pub fn is_complete(&self) -> bool {
        self.failure.is_none()
    }
}

/// Keys that [`type_values`] sends, in order.
pub fn typed_keys(values: &[i32], press_select: bool) -> Vec<Key> {
    let mut keys = Vec::new();
    for value in values {
        keys.extend(value.to_string().chars().map(Key::Lit));
        if press_select {
            keys.push(Key::Named(NamedKey::Select));
        }
    }
    keys
}

/// Send every character of every value, pausing `pacing` between calls.
///
/// Stops at the first [`RequestOutcome::Failure`]. Non-2xx responses do not
/// stop the sequence.
pub fn type_values<T: Transport + ?Sized>(
    transport: &T,
    values: &[i32],
    press_select: bool,
    pacing: Duration,
    sink: &mut dyn LogSink,
) -> SequenceReport {
    let keys = typed_keys(values, press_select);
    let mut report = SequenceReport::default();
    info!(values = values.len(), keys = keys.len(), "typing values");

    for (i, key) in keys.iter().enumerate() {
        if i > 0 && !pacing.is_zero() {
            thread::sleep(pacing);
        }

        match transport.send(&build_keypress(key), sink) {
            RequestOutcome::Failure(failure) => {
                warn!(key = %key, completed = report.completed_presses, kind = failure.kind.as_str(), "sequence stopped");
                sink.append(
                    LogKind::Info,
                    &format!(
                        "sequence stopped after {} of {} presses",
                        report.completed_presses,
                        keys.iter().filter(|k| matches!(k, Key::Lit(_))).count()
                    ),
                );
                report.failure = Some(failure);
                return report;
            }
            RequestOutcome::Success { .. } => match key {
                Key::Lit(_) => report.completed_presses += 1,
                Key::Named(_) => report.select_presses += 1,
            },
        }
    }

    report
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::time::Instant;

    use crate::error::FailureKind;
    use crate::http::HttpRequest;
    use crate::log::ActivityLog;

    /// Records every path and fails the call with the given 1-based index.
    struct ScriptedTransport {
        calls: RefCell<Vec<(String, Instant)>>,
        fail_on: Option<usize>,
        status: u16,
    }

    impl ScriptedTransport {
        fn new(fail_on: Option<usize>) -> Self {
            Self {
                calls: RefCell::new(Vec::new()),
                fail_on,
                status: 200,
            }
        }

        fn paths(&self) -> Vec<String> {
            self.calls.borrow().iter().map(|(p, _)| p.clone()).collect()
        }
    }

    impl Transport for ScriptedTransport {
        fn send(&self, request: &HttpRequest, sink: &mut dyn LogSink) -> RequestOutcome {
            sink.append(LogKind::Request, &request.path);
            let mut calls = self.calls.borrow_mut();
            calls.push((request.path.clone(), Instant::now()));
            if Some(calls.len()) == self.fail_on {
                return RequestOutcome::failure(FailureKind::Network, "connection refused");
            }
            RequestOutcome::Success {
                status_code: self.status,
                status_text: String::new(),
                body_text: String::new(),
                headers: Vec::new(),
            }
        }
    }

    #[test]
    fn typed_keys_include_sign_and_select() {
        let keys = typed_keys(&[12, -3], true);
        assert_eq!(
            keys,
            vec![
                Key::Lit('1'),
                Key::Lit('2'),
                Key::Named(NamedKey::Select),
                Key::Lit('-'),
                Key::Lit('3'),
                Key::Named(NamedKey::Select),
            ]
        );
        assert_eq!(typed_keys(&[i32::MIN], false).len(), 11);
    }

    #[test]
    fn presses_each_character_in_order() {
        let transport = ScriptedTransport::new(None);
        let mut log = ActivityLog::new();
        let report = type_values(&transport, &[12, -3], false, Duration::ZERO, &mut log);

        assert_eq!(
            transport.paths(),
            vec!["/keypress/Lit_1", "/keypress/Lit_2", "/keypress/Lit_-", "/keypress/Lit_3"]
        );
        assert_eq!(report.completed_presses, 4);
        assert_eq!(report.select_presses, 0);
        assert!(report.is_complete());
    }

    #[test]
    fn stops_on_first_failure() {
        let transport = ScriptedTransport::new(Some(3));
        let mut log = ActivityLog::new();
        let report = type_values(&transport, &[12, -3], false, Duration::ZERO, &mut log);

        assert_eq!(report.completed_presses, 2);
        assert_eq!(transport.paths().len(), 3, "no calls after the failure");
        assert_eq!(report.failure.unwrap().kind, FailureKind::Network);
        assert_eq!(log.count(LogKind::Info), 1);
    }

    #[test]
    fn select_presses_are_counted_separately() {
        let transport = ScriptedTransport::new(None);
        let mut log = ActivityLog::new();
        let report = type_values(&transport, &[7, 8], true, Duration::ZERO, &mut log);

        assert_eq!(report.completed_presses, 2);
        assert_eq!(report.select_presses, 2);
        assert_eq!(
            transport.paths(),
            vec!["/keypress/Lit_7", "/keypress/Select", "/keypress/Lit_8", "/keypress/Select"]
        );
    }

    #[test]
    fn http_error_status_does_not_stop_sequence() {
        let mut transport = ScriptedTransport::new(None);
        transport.status = 503;
        let mut log = ActivityLog::new();
        let report = type_values(&transport, &[45], false, Duration::ZERO, &mut log);
        assert_eq!(report.completed_presses, 2);
        assert!(report.is_complete());
    }

    #[test]
    fn pacing_separates_calls() {
        let transport = ScriptedTransport::new(None);
        let mut log = ActivityLog::new();
        let pacing = Duration::from_millis(20);
        type_values(&transport, &[123], false, pacing, &mut log);

        let calls = transport.calls.borrow();
        assert_eq!(calls.len(), 3);
        for pair in calls.windows(2) {
            assert!(pair[1].1.duration_since(pair[0].1) >= pacing);
        }
    }

    #[test]
    fn empty_values_send_nothing() {
        let transport = ScriptedTransport::new(None);
        let mut log = ActivityLog::new();
        let report = type_values(&transport, &[], true, Duration::from_secs(5), &mut log);
        assert_eq!(report, SequenceReport::default());
        assert!(log.is_empty());
    }
}
