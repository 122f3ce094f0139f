//! `#[repr(C)]` types for the FFI boundary.
//!
//! # Design
//! Each type mirrors a core type with C-compatible representations:
//! `*mut c_char` instead of `String`, pointer + length instead of `Vec`,
//! and enums with explicit discriminants. Conversion functions live here to
//! keep `lib.rs` focused on the `extern "C"` surface.

use std::ffi::CString;
use std::os::raw::c_char;

use ecp_core::{
    ActivityLog, EcpClient, FailureKind, ParseResult, RejectReason, RequestOutcome,
    SequenceReport, UsageError,
};

/// Opaque handle to a client plus its activity log. C callers receive a
/// pointer to this and pass it back into every FFI function.
pub struct FfiEcpClient {
    pub(crate) inner: EcpClient,
    pub(crate) log: ActivityLog,
}

/// Copy `s` into a heap C string, dropping interior NUL bytes.
pub(crate) fn c_string(s: &str) -> *mut c_char {
    let cleaned: String = s.chars().filter(|&c| c != '\0').collect();
    CString::new(cleaned).unwrap_or_default().into_raw()
}

/// Hand a `Vec` to C as pointer + length. Empty vectors become null.
pub(crate) fn leak_vec<T>(items: Vec<T>) -> (*mut T, u32) {
    if items.is_empty() {
        return (std::ptr::null_mut(), 0);
    }
    let boxed = items.into_boxed_slice();
    let len = boxed.len() as u32;
    (Box::into_raw(boxed) as *mut T, len)
}

/// Reclaim a slice produced by `leak_vec`.
///
/// # Safety
/// `ptr`/`len` must come from `leak_vec` and not have been reclaimed before.
pub(crate) unsafe fn reclaim_vec<T>(ptr: *mut T, len: u32) -> Vec<T> {
    if ptr.is_null() || len == 0 {
        return Vec::new();
    }
    let slice = std::ptr::slice_from_raw_parts_mut(ptr, len as usize);
    unsafe { Box::from_raw(slice) }.into_vec()
}

// ---------------------------------------------------------------------------
// Tokenizer
// ---------------------------------------------------------------------------

#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FfiRejectReason {
    NotInteger = 0,
    OutOfRange = 1,
}

impl From<RejectReason> for FfiRejectReason {
    fn from(r: RejectReason) -> Self {
        match r {
            RejectReason::NotInteger => FfiRejectReason::NotInteger,
            RejectReason::OutOfRange => FfiRejectReason::OutOfRange,
        }
    }
}

#[repr(C)]
pub struct FfiRejectedToken {
    pub token: *mut c_char,
    pub reason: FfiRejectReason,
}

/// Tokenizer output. Free with `ecp_free_parse_result`.
///
/// `error` is null unless the request itself was invalid, in which case it
/// holds the usage-error message and both arrays are empty.
#[repr(C)]
pub struct FfiParseResult {
    pub values: *mut i32,
    pub values_len: u32,
    pub rejected: *mut FfiRejectedToken,
    pub rejected_len: u32,
    pub truncated: bool,
    pub error: *mut c_char,
}

impl FfiParseResult {
    pub(crate) fn from_core(result: ParseResult) -> *mut Self {
        let (values, values_len) = leak_vec(result.values);
        let rejected: Vec<FfiRejectedToken> = result
            .rejected
            .into_iter()
            .map(|r| FfiRejectedToken {
                token: c_string(&r.token),
                reason: r.reason.into(),
            })
            .collect();
        let (rejected, rejected_len) = leak_vec(rejected);
        Box::into_raw(Box::new(FfiParseResult {
            values,
            values_len,
            rejected,
            rejected_len,
            truncated: result.truncated,
            error: std::ptr::null_mut(),
        }))
    }

    pub(crate) fn usage(err: UsageError) -> *mut Self {
        Box::into_raw(Box::new(FfiParseResult {
            values: std::ptr::null_mut(),
            values_len: 0,
            rejected: std::ptr::null_mut(),
            rejected_len: 0,
            truncated: false,
            error: c_string(&err.to_string()),
        }))
    }
}

// ---------------------------------------------------------------------------
// Request outcomes
// ---------------------------------------------------------------------------

/// Outcome codes returned in `FfiOutcome`.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FfiOutcomeCode {
    /// The exchange completed; check `status_code`.
    Success = 0,
    Timeout = 1,
    Network = 2,
    BodyReadError = 3,
    /// Caller error detected before sending (blank host, unknown key, ...).
    Usage = 4,
    NullArg = 5,
    Panic = 6,
}

impl From<FailureKind> for FfiOutcomeCode {
    fn from(kind: FailureKind) -> Self {
        match kind {
            FailureKind::Timeout => FfiOutcomeCode::Timeout,
            FailureKind::Network => FfiOutcomeCode::Network,
            FailureKind::BodyReadError => FfiOutcomeCode::BodyReadError,
        }
    }
}

/// Result envelope for every device call.
///
/// On `Success`, `status_code`, `status_text`, and `body_text` are set and
/// `message` is null. Otherwise `message` describes the problem and the
/// response fields are zero/null. `completed_presses` is only meaningful for
/// `ecp_type_values`.
#[repr(C)]
pub struct FfiOutcome {
    pub code: FfiOutcomeCode,
    pub status_code: u16,
    pub status_text: *mut c_char,
    pub body_text: *mut c_char,
    pub message: *mut c_char,
    pub completed_presses: u32,
}

impl FfiOutcome {
    fn boxed(code: FfiOutcomeCode, message: Option<&str>) -> *mut Self {
        Box::into_raw(Box::new(FfiOutcome {
            code,
            status_code: 0,
            status_text: std::ptr::null_mut(),
            body_text: std::ptr::null_mut(),
            message: message.map_or(std::ptr::null_mut(), c_string),
            completed_presses: 0,
        }))
    }

    pub(crate) fn from_core(outcome: RequestOutcome) -> *mut Self {
        match outcome {
            RequestOutcome::Success {
                status_code,
                status_text,
                body_text,
                ..
            } => Box::into_raw(Box::new(FfiOutcome {
                code: FfiOutcomeCode::Success,
                status_code,
                status_text: c_string(&status_text),
                body_text: c_string(&body_text),
                message: std::ptr::null_mut(),
                completed_presses: 0,
            })),
            RequestOutcome::Failure(failure) => {
                Self::boxed(failure.kind.into(), Some(&failure.message))
            }
        }
    }

    pub(crate) fn from_report(report: SequenceReport) -> *mut Self {
        let outcome = match report.failure {
            None => Self::boxed(FfiOutcomeCode::Success, None),
            Some(failure) => Self::boxed(failure.kind.into(), Some(&failure.message)),
        };
        // SAFETY: `outcome` was just allocated by `boxed`.
        unsafe { (*outcome).completed_presses = report.completed_presses as u32 };
        outcome
    }

    pub(crate) fn usage(err: UsageError) -> *mut Self {
        Self::boxed(FfiOutcomeCode::Usage, Some(&err.to_string()))
    }

    pub(crate) fn null_arg(name: &str) -> *mut Self {
        Self::boxed(FfiOutcomeCode::NullArg, Some(&format!("null argument: {name}")))
    }

    pub(crate) fn panic(msg: &str) -> *mut Self {
        Self::boxed(FfiOutcomeCode::Panic, Some(msg))
    }
}
