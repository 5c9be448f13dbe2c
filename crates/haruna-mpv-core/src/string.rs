//! C string helpers for node payloads

use std::borrow::Cow;
use std::ffi::{CStr, CString, c_char};

use crate::error::{NodeError, NodeResult};

/// Duplicate `s` into a fresh NUL-terminated buffer owned by the caller
///
/// The buffer must be released with [`free_string`].
pub fn dup_string(s: &str) -> NodeResult<*mut c_char> {
    to_cstring(s).map(CString::into_raw)
}

/// Release a buffer returned by [`dup_string`]
///
/// # Safety
/// `ptr` must be null or come from [`dup_string`] and not have been freed.
pub unsafe fn free_string(ptr: *mut c_char) {
    if !ptr.is_null() {
        // SAFETY: ptr was produced by CString::into_raw per caller contract
        drop(unsafe { CString::from_raw(ptr) });
    }
}

/// Convert a Rust string into an owned C string
pub fn to_cstring(s: &str) -> NodeResult<CString> {
    CString::new(s).map_err(|e| NodeError::InteriorNul {
        position: e.nul_position(),
    })
}

/// Borrow a C string from an engine-provided pointer
///
/// # Safety
/// `ptr` must be null or point to a NUL-terminated string that outlives `'a`.
pub unsafe fn borrow_cstr<'a>(ptr: *const c_char) -> Option<&'a CStr> {
    if ptr.is_null() {
        None
    } else {
        // SAFETY: non-null and NUL-terminated per caller contract
        Some(unsafe { CStr::from_ptr(ptr) })
    }
}

/// Convert an engine string to UTF-8, replacing invalid sequences
pub fn cstr_to_str(s: &CStr) -> Cow<'_, str> {
    s.to_string_lossy()
}

/// Convert a possibly-null engine string pointer into an owned `String`
///
/// # Safety
/// Same contract as [`borrow_cstr`].
pub unsafe fn ptr_to_string(ptr: *const c_char) -> String {
    // SAFETY: forwarded to the caller
    unsafe { borrow_cstr(ptr) }
        .map(|s| cstr_to_str(s).into_owned())
        .unwrap_or_default()
}
