//! C-ABI wrapper around `ecp-core`.
//!
//! # Overview
//! Exposes the tokenizer and the device calls through `extern "C"`
//! functions so a UI written in any language with a C FFI can parse user
//! input, drive the device, and read back the activity log.
//!
//! # Design
//! - Every `extern "C"` function wraps its body in `catch_unwind` so panics
//!   never cross the FFI boundary.
//! - Device calls return one `FfiOutcome` envelope whose `code` mirrors the
//!   core failure kinds plus `Usage`, `NullArg`, and `Panic`.
//! - The client handle owns an `ActivityLog`; every call appends to it and
//!   `ecp_client_log` returns the lines newest first.
//! - The C caller owns all returned pointers and must call the matching
//!   `ecp_free_*` function to release them.

pub mod types;

use std::ffi::{CStr, CString};
use std::os::raw::c_char;
use std::panic::catch_unwind;
use std::time::Duration;

use ecp_core::{
    parse_tokens, type_values, ActivityLog, EcpClient, EcpConfig, Key, Query, UsageError,
};

use types::*;

/// Borrow a C string as `&str`, treating invalid UTF-8 as empty.
///
/// # Safety
/// `ptr` must be non-null and point to a NUL-terminated string.
unsafe fn borrow_str<'a>(ptr: *const c_char) -> &'a str {
    unsafe { CStr::from_ptr(ptr) }.to_str().unwrap_or("")
}

// ---------------------------------------------------------------------------
// Tokenizer
// ---------------------------------------------------------------------------

/// Extract up to `limit` integers from `text`.
///
/// Returns null if `text` is null. A zero `limit` yields a result whose
/// `error` field carries the usage error.
/// The caller must free the returned pointer with `ecp_free_parse_result`.
#[unsafe(no_mangle)]
pub extern "C" fn ecp_parse_tokens(text: *const c_char, limit: u32) -> *mut FfiParseResult {
    catch_unwind(|| {
        if text.is_null() {
            return std::ptr::null_mut();
        }
        if limit == 0 {
            return FfiParseResult::usage(UsageError::ZeroLimit);
        }
        let text = unsafe { borrow_str(text) };
        FfiParseResult::from_core(parse_tokens(text, limit as usize))
    })
    .unwrap_or(std::ptr::null_mut())
}

/// Free a result from `ecp_parse_tokens`. Safe to call with null.
#[unsafe(no_mangle)]
pub extern "C" fn ecp_free_parse_result(result: *mut FfiParseResult) {
    if result.is_null() {
        return;
    }
    let _ = catch_unwind(|| {
        let result = unsafe { Box::from_raw(result) };
        drop(unsafe { reclaim_vec(result.values, result.values_len) });
        for token in unsafe { reclaim_vec(result.rejected, result.rejected_len) } {
            ecp_free_string(token.token);
        }
        ecp_free_string(result.error);
    });
}

// ---------------------------------------------------------------------------
// Client lifecycle
// ---------------------------------------------------------------------------

/// Create a client for `host`. A `port` of 0 selects the protocol port and a
/// `timeout_ms` of 0 selects the default timeout.
///
/// Returns null if `host` is null or blank, or if an internal panic occurs.
/// The caller must free the returned pointer with `ecp_client_free`.
#[unsafe(no_mangle)]
pub extern "C" fn ecp_client_new(
    host: *const c_char,
    port: u16,
    timeout_ms: u32,
) -> *mut FfiEcpClient {
    catch_unwind(|| {
        if host.is_null() {
            return std::ptr::null_mut();
        }
        let host = unsafe { borrow_str(host) };
        let mut config = EcpConfig::default();
        if port != 0 {
            config.port = port;
        }
        if timeout_ms != 0 {
            config.timeout = Duration::from_millis(timeout_ms as u64);
        }
        match EcpClient::connect(host, &config) {
            Ok(inner) => Box::into_raw(Box::new(FfiEcpClient {
                inner,
                log: ActivityLog::new(),
            })),
            Err(_) => std::ptr::null_mut(),
        }
    })
    .unwrap_or(std::ptr::null_mut())
}

/// Free a client created by `ecp_client_new`. Safe to call with null.
#[unsafe(no_mangle)]
pub extern "C" fn ecp_client_free(client: *mut FfiEcpClient) {
    if !client.is_null() {
        let _ = catch_unwind(|| {
            drop(unsafe { Box::from_raw(client) });
        });
    }
}

/// Activity log lines, newest first, joined with `\n`.
///
/// Returns null if `client` is null. Free with `ecp_free_string`.
#[unsafe(no_mangle)]
pub extern "C" fn ecp_client_log(client: *const FfiEcpClient) -> *mut c_char {
    catch_unwind(|| {
        if client.is_null() {
            return std::ptr::null_mut();
        }
        let client = unsafe { &*client };
        c_string(&client.log.lines().join("\n"))
    })
    .unwrap_or(std::ptr::null_mut())
}

// ---------------------------------------------------------------------------
// Device calls
// ---------------------------------------------------------------------------

/// Press `key`: a named key such as `Home` or `Lit_<char>`.
#[unsafe(no_mangle)]
pub extern "C" fn ecp_keypress(client: *mut FfiEcpClient, key: *const c_char) -> *mut FfiOutcome {
    catch_unwind(|| {
        if client.is_null() {
            return FfiOutcome::null_arg("client");
        }
        if key.is_null() {
            return FfiOutcome::null_arg("key");
        }
        let client = unsafe { &mut *client };
        let key = match unsafe { borrow_str(key) }.parse::<Key>() {
            Ok(key) => key,
            Err(err) => return FfiOutcome::usage(err),
        };
        FfiOutcome::from_core(client.inner.keypress(&key, &mut client.log))
    })
    .unwrap_or_else(|_| FfiOutcome::panic("panic in ecp_keypress"))
}

/// Launch `app_id`. `params` may be null or `k=v` pairs joined with `&`,
/// unencoded.
#[unsafe(no_mangle)]
pub extern "C" fn ecp_launch(
    client: *mut FfiEcpClient,
    app_id: *const c_char,
    params: *const c_char,
) -> *mut FfiOutcome {
    catch_unwind(|| {
        if client.is_null() {
            return FfiOutcome::null_arg("client");
        }
        if app_id.is_null() {
            return FfiOutcome::null_arg("app_id");
        }
        let client = unsafe { &mut *client };
        let app_id = unsafe { borrow_str(app_id) };
        let params = if params.is_null() {
            Vec::new()
        } else {
            split_params(unsafe { borrow_str(params) })
        };
        match client.inner.launch(app_id, &params, &mut client.log) {
            Ok(outcome) => FfiOutcome::from_core(outcome),
            Err(err) => FfiOutcome::usage(err),
        }
    })
    .unwrap_or_else(|_| FfiOutcome::panic("panic in ecp_launch"))
}

fn split_params(raw: &str) -> Vec<(String, String)> {
    raw.split('&')
        .filter(|pair| !pair.is_empty())
        .map(|pair| match pair.split_once('=') {
            Some((k, v)) => (k.to_string(), v.to_string()),
            None => (pair.to_string(), String::new()),
        })
        .collect()
}

/// Run a query: `device-info`, `apps`, or `active-app`.
#[unsafe(no_mangle)]
pub extern "C" fn ecp_query(client: *mut FfiEcpClient, query: *const c_char) -> *mut FfiOutcome {
    catch_unwind(|| {
        if client.is_null() {
            return FfiOutcome::null_arg("client");
        }
        if query.is_null() {
            return FfiOutcome::null_arg("query");
        }
        let client = unsafe { &mut *client };
        let query = match unsafe { borrow_str(query) }.parse::<Query>() {
            Ok(query) => query,
            Err(err) => return FfiOutcome::usage(err),
        };
        FfiOutcome::from_core(client.inner.query(query, &mut client.log))
    })
    .unwrap_or_else(|_| FfiOutcome::panic("panic in ecp_query"))
}

/// Type `values_len` integers one character per keypress, optionally
/// pressing `Select` after each, waiting `pacing_ms` between calls.
///
/// `completed_presses` in the returned outcome counts character presses.
#[unsafe(no_mangle)]
pub extern "C" fn ecp_type_values(
    client: *mut FfiEcpClient,
    values: *const i32,
    values_len: u32,
    press_select: bool,
    pacing_ms: u32,
) -> *mut FfiOutcome {
    catch_unwind(|| {
        if client.is_null() {
            return FfiOutcome::null_arg("client");
        }
        if values.is_null() && values_len > 0 {
            return FfiOutcome::null_arg("values");
        }
        let client = unsafe { &mut *client };
        let values: &[i32] = if values_len == 0 {
            &[]
        } else {
            unsafe { std::slice::from_raw_parts(values, values_len as usize) }
        };
        let report = type_values(
            client.inner.transport(),
            values,
            press_select,
            Duration::from_millis(pacing_ms as u64),
            &mut client.log,
        );
        FfiOutcome::from_report(report)
    })
    .unwrap_or_else(|_| FfiOutcome::panic("panic in ecp_type_values"))
}

/// Usage-error message for a blank host, so callers can prompt for input
/// when `ecp_client_new` returns null. Free with `ecp_free_string`.
#[unsafe(no_mangle)]
pub extern "C" fn ecp_blank_host_message() -> *mut c_char {
    c_string(&UsageError::BlankHost.to_string())
}

// ---------------------------------------------------------------------------
// Free functions
// ---------------------------------------------------------------------------

/// Free an outcome returned by any device call. Safe to call with null.
#[unsafe(no_mangle)]
pub extern "C" fn ecp_free_outcome(outcome: *mut FfiOutcome) {
    if outcome.is_null() {
        return;
    }
    let _ = catch_unwind(|| {
        let outcome = unsafe { Box::from_raw(outcome) };
        ecp_free_string(outcome.status_text);
        ecp_free_string(outcome.body_text);
        ecp_free_string(outcome.message);
    });
}

/// Free a C string allocated by this library. Safe to call with null.
#[unsafe(no_mangle)]
pub extern "C" fn ecp_free_string(s: *mut c_char) {
    if !s.is_null() {
        let _ = catch_unwind(|| {
            drop(unsafe { CString::from_raw(s) });
        });
    }
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------
