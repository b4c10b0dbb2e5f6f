//! FFI bindings for the Nocturne engine
//!
//! This module provides C-compatible functions so mobile hosts can embed
//! the engine. All functions use null-terminated C strings and return
//! allocated memory that must be freed with `nocturne_free_string`.
//!
//! The FFI layer is the one place the engine touches the wall clock and
//! process entropy: each handle owns its own RNG, and completion
//! timestamps are stamped here. Library callers inject both instead.

use std::cell::RefCell;
use std::ffi::{CStr, CString};
use std::os::raw::c_char;
use std::ptr;

use chrono::{NaiveDate, Utc};
use rand::rngs::StdRng;
use rand::SeedableRng;
use uuid::Uuid;

use crate::export;
use crate::state::Engine;

// Thread-local storage for the last error message
thread_local! {
    static LAST_ERROR: RefCell<Option<CString>> = const { RefCell::new(None) };
}

fn set_last_error(msg: &str) {
    LAST_ERROR.with(|e| {
        *e.borrow_mut() = CString::new(msg).ok();
    });
}

fn clear_last_error() {
    LAST_ERROR.with(|e| {
        *e.borrow_mut() = None;
    });
}

/// Helper to convert a C string to a Rust string
unsafe fn cstr_to_string(ptr: *const c_char) -> Option<String> {
    if ptr.is_null() {
        return None;
    }
    CStr::from_ptr(ptr).to_str().ok().map(|s| s.to_string())
}

/// Helper to convert a Rust string to a C string (caller must free)
fn string_to_cstr(s: &str) -> *mut c_char {
    match CString::new(s) {
        Ok(cstr) => cstr.into_raw(),
        Err(_) => ptr::null_mut(),
    }
}

unsafe fn parse_uuid(ptr: *const c_char) -> Option<Uuid> {
    let s = cstr_to_string(ptr)?;
    Uuid::parse_str(&s).ok()
}

/// Opaque handle to an engine instance
pub struct EngineHandle {
    engine: Engine,
    rng: StdRng,
}

// ============================================================================
// Lifecycle
// ============================================================================

/// Create an engine seeded with the bundled sample data.
///
/// # Safety
/// - `today` must be a valid null-terminated C string holding a
///   "YYYY-MM-DD" date.
/// - Returns a pointer that must be freed with `nocturne_engine_free`.
/// - Returns NULL on error; call `nocturne_last_error` for the message.
#[no_mangle]
pub unsafe extern "C" fn nocturne_engine_new(today: *const c_char) -> *mut EngineHandle {
    clear_last_error();

    let today_str = match cstr_to_string(today) {
        Some(s) => s,
        None => {
            set_last_error("Invalid today string pointer");
            return ptr::null_mut();
        }
    };

    let date = match NaiveDate::parse_from_str(&today_str, "%Y-%m-%d") {
        Ok(d) => d,
        Err(e) => {
            set_last_error(&format!("Invalid date '{today_str}': {e}"));
            return ptr::null_mut();
        }
    };

    let mut rng = StdRng::from_entropy();
    let engine = Engine::with_sample_data(date, &mut rng);
    Box::into_raw(Box::new(EngineHandle { engine, rng }))
}

/// Free an engine handle.
///
/// # Safety
/// - `handle` must be a valid pointer returned by `nocturne_engine_new`.
/// - After calling this function, the pointer is invalid.
#[no_mangle]
pub unsafe extern "C" fn nocturne_engine_free(handle: *mut EngineHandle) {
    if !handle.is_null() {
        drop(Box::from_raw(handle));
    }
}

// ============================================================================
// Sleep data
// ============================================================================

/// Replace the engine's day records from an export document.
///
/// # Safety
/// - `handle` must be a valid pointer returned by `nocturne_engine_new`.
/// - `json` must be a valid null-terminated C string.
/// - Returns 0 on success, -1 on error.
#[no_mangle]
pub unsafe extern "C" fn nocturne_engine_replace_days(
    handle: *mut EngineHandle,
    json: *const c_char,
) -> i32 {
    clear_last_error();

    if handle.is_null() {
        set_last_error("Null engine pointer");
        return -1;
    }

    let json_str = match cstr_to_string(json) {
        Some(s) => s,
        None => {
            set_last_error("Invalid JSON string pointer");
            return -1;
        }
    };

    match export::from_json(&json_str) {
        Ok(days) => {
            (*handle).engine.replace_days(days);
            0
        }
        Err(e) => {
            set_last_error(&e.to_string());
            -1
        }
    }
}

/// Export the engine's day records as a pretty-printed document.
///
/// # Safety
/// - `handle` must be a valid pointer returned by `nocturne_engine_new`.
/// - Returns a newly allocated string that must be freed with
///   `nocturne_free_string`; NULL on error.
#[no_mangle]
pub unsafe extern "C" fn nocturne_engine_export_json(handle: *mut EngineHandle) -> *mut c_char {
    clear_last_error();

    if handle.is_null() {
        set_last_error("Null engine pointer");
        return ptr::null_mut();
    }

    match (*handle).engine.export_json() {
        Ok(json) => string_to_cstr(&json),
        Err(e) => {
            set_last_error(&e.to_string());
            ptr::null_mut()
        }
    }
}

/// Get the display-ready summary as JSON.
///
/// # Safety
/// - `handle` must be a valid pointer returned by `nocturne_engine_new`.
/// - Returns a newly allocated string that must be freed with
///   `nocturne_free_string`; NULL on error.
#[no_mangle]
pub unsafe extern "C" fn nocturne_engine_summary_json(handle: *mut EngineHandle) -> *mut c_char {
    clear_last_error();

    if handle.is_null() {
        set_last_error("Null engine pointer");
        return ptr::null_mut();
    }

    match serde_json::to_string(&(*handle).engine.summary()) {
        Ok(json) => string_to_cstr(&json),
        Err(e) => {
            set_last_error(&e.to_string());
            ptr::null_mut()
        }
    }
}

// ============================================================================
// Challenges
// ============================================================================

/// Get the challenge catalog as a JSON array.
///
/// # Safety
/// - `handle` must be a valid pointer returned by `nocturne_engine_new`.
/// - Returns a newly allocated string that must be freed with
///   `nocturne_free_string`; NULL on error.
#[no_mangle]
pub unsafe extern "C" fn nocturne_engine_challenges_json(
    handle: *mut EngineHandle,
) -> *mut c_char {
    clear_last_error();

    if handle.is_null() {
        set_last_error("Null engine pointer");
        return ptr::null_mut();
    }

    match serde_json::to_string(&(*handle).engine.challenges()) {
        Ok(json) => string_to_cstr(&json),
        Err(e) => {
            set_last_error(&e.to_string());
            ptr::null_mut()
        }
    }
}

/// Get the active challenge id.
///
/// # Safety
/// - `handle` must be a valid pointer returned by `nocturne_engine_new`.
/// - Returns a newly allocated string that must be freed with
///   `nocturne_free_string`; NULL when no challenge is active.
#[no_mangle]
pub unsafe extern "C" fn nocturne_engine_active_challenge_id(
    handle: *mut EngineHandle,
) -> *mut c_char {
    clear_last_error();

    if handle.is_null() {
        set_last_error("Null engine pointer");
        return ptr::null_mut();
    }

    match (*handle).engine.active_challenge() {
        Some(challenge) => string_to_cstr(&challenge.id.to_string()),
        None => ptr::null_mut(),
    }
}

/// Accept a challenge by id.
///
/// # Safety
/// - `handle` must be a valid pointer returned by `nocturne_engine_new`.
/// - `id` must be a valid null-terminated C string holding a UUID.
/// - Returns 0 on success, -1 on error.
#[no_mangle]
pub unsafe extern "C" fn nocturne_engine_accept_challenge(
    handle: *mut EngineHandle,
    id: *const c_char,
) -> i32 {
    clear_last_error();

    if handle.is_null() {
        set_last_error("Null engine pointer");
        return -1;
    }

    let uuid = match parse_uuid(id) {
        Some(u) => u,
        None => {
            set_last_error("Invalid challenge id string");
            return -1;
        }
    };

    match (*handle).engine.accept_challenge(uuid) {
        Ok(()) => 0,
        Err(e) => {
            set_last_error(&e.to_string());
            -1
        }
    }
}

/// Complete a challenge by id, stamping the current time.
///
/// # Safety
/// - `handle` must be a valid pointer returned by `nocturne_engine_new`.
/// - `id` must be a valid null-terminated C string holding a UUID.
/// - Returns 0 on success, -1 on error.
#[no_mangle]
pub unsafe extern "C" fn nocturne_engine_complete_challenge(
    handle: *mut EngineHandle,
    id: *const c_char,
) -> i32 {
    clear_last_error();

    if handle.is_null() {
        set_last_error("Null engine pointer");
        return -1;
    }

    let uuid = match parse_uuid(id) {
        Some(u) => u,
        None => {
            set_last_error("Invalid challenge id string");
            return -1;
        }
    };

    match (*handle).engine.complete_challenge(uuid, Utc::now()) {
        Ok(()) => 0,
        Err(e) => {
            set_last_error(&e.to_string());
            -1
        }
    }
}

/// Manually select a new active challenge.
///
/// # Safety
/// - `handle` must be a valid pointer returned by `nocturne_engine_new`.
/// - Returns the new active id as a newly allocated string that must be
///   freed with `nocturne_free_string`; NULL for an empty catalog.
#[no_mangle]
pub unsafe extern "C" fn nocturne_engine_new_challenge(
    handle: *mut EngineHandle,
) -> *mut c_char {
    clear_last_error();

    if handle.is_null() {
        set_last_error("Null engine pointer");
        return ptr::null_mut();
    }

    let state = &mut *handle;
    match state.engine.new_challenge(&mut state.rng) {
        Some(id) => string_to_cstr(&id.to_string()),
        None => ptr::null_mut(),
    }
}

/// Fire the deferred challenge re-selection if its deadline has passed.
///
/// # Safety
/// - `handle` must be a valid pointer returned by `nocturne_engine_new`.
/// - Returns 1 if a re-selection fired, 0 if not, -1 on error.
#[no_mangle]
pub unsafe extern "C" fn nocturne_engine_poll(handle: *mut EngineHandle) -> i32 {
    clear_last_error();

    if handle.is_null() {
        set_last_error("Null engine pointer");
        return -1;
    }

    let state = &mut *handle;
    if state.engine.poll(Utc::now(), &mut state.rng) {
        1
    } else {
        0
    }
}

// ============================================================================
// Memory Management
// ============================================================================

/// Free a string returned by engine functions.
///
/// # Safety
/// - `ptr` must be a valid pointer returned by an engine function, or NULL.
/// - After calling this function, the pointer is invalid.
#[no_mangle]
pub unsafe extern "C" fn nocturne_free_string(ptr: *mut c_char) {
    if !ptr.is_null() {
        drop(CString::from_raw(ptr));
    }
}

// ============================================================================
// Error Handling
// ============================================================================

/// Get the last error message.
///
/// # Safety
/// - Returns a pointer to a thread-local error string.
/// - The returned pointer is valid until the next engine call on this
///   thread. Do NOT free it.
/// - Returns NULL if no error occurred.
#[no_mangle]
pub unsafe extern "C" fn nocturne_last_error() -> *const c_char {
    LAST_ERROR.with(|e| match &*e.borrow() {
        Some(cstr) => cstr.as_ptr(),
        None => ptr::null(),
    })
}

// ============================================================================
// Version Information
// ============================================================================

/// Get the engine library version.
///
/// # Safety
/// - Returns a pointer to a static string. Do NOT free.
#[no_mangle]
pub unsafe extern "C" fn nocturne_version() -> *const c_char {
    static VERSION: &[u8] = concat!(env!("CARGO_PKG_VERSION"), "\0").as_bytes();
    VERSION.as_ptr() as *const c_char
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_handle() -> *mut EngineHandle {
        let today = CString::new("2025-03-14").unwrap();
        unsafe { nocturne_engine_new(today.as_ptr()) }
    }

    #[test]
    fn test_ffi_lifecycle_and_summary() {
        unsafe {
            let handle = make_handle();
            assert!(!handle.is_null());

            let summary = nocturne_engine_summary_json(handle);
            assert!(!summary.is_null());
            let summary_str = CStr::from_ptr(summary).to_str().unwrap();
            assert!(summary_str.contains("sleep_score"));
            nocturne_free_string(summary);

            nocturne_engine_free(handle);
        }
    }

    #[test]
    fn test_ffi_replace_days_round_trip() {
        unsafe {
            let handle = make_handle();

            let exported = nocturne_engine_export_json(handle);
            assert!(!exported.is_null());

            let result = nocturne_engine_replace_days(handle, exported);
            assert_eq!(result, 0);

            nocturne_free_string(exported);
            nocturne_engine_free(handle);
        }
    }

    #[test]
    fn test_ffi_challenge_actions() {
        unsafe {
            let handle = make_handle();

            let active = nocturne_engine_active_challenge_id(handle);
            assert!(!active.is_null());

            assert_eq!(nocturne_engine_accept_challenge(handle, active), 0);
            assert_eq!(nocturne_engine_complete_challenge(handle, active), 0);

            let next = nocturne_engine_new_challenge(handle);
            assert!(!next.is_null());
            let active_str = CStr::from_ptr(active).to_str().unwrap();
            let next_str = CStr::from_ptr(next).to_str().unwrap();
            assert_ne!(active_str, next_str);

            nocturne_free_string(active);
            nocturne_free_string(next);
            nocturne_engine_free(handle);
        }
    }

    #[test]
    fn test_ffi_error_handling() {
        unsafe {
            let bad_date = CString::new("14-03-2025").unwrap();
            let handle = nocturne_engine_new(bad_date.as_ptr());
            assert!(handle.is_null());

            let error = nocturne_last_error();
            assert!(!error.is_null());
            let error_str = CStr::from_ptr(error).to_str().unwrap();
            assert!(!error_str.is_empty());
        }
    }

    #[test]
    fn test_ffi_unknown_challenge_id() {
        unsafe {
            let handle = make_handle();
            let bogus = CString::new(Uuid::new_v4().to_string()).unwrap();

            assert_eq!(nocturne_engine_accept_challenge(handle, bogus.as_ptr()), -1);
            let error = nocturne_last_error();
            assert!(!error.is_null());

            nocturne_engine_free(handle);
        }
    }

    #[test]
    fn test_ffi_version() {
        unsafe {
            let version = nocturne_version();
            assert!(!version.is_null());
            assert!(!CStr::from_ptr(version).to_str().unwrap().is_empty());
        }
    }
}
