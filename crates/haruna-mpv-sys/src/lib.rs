//! Raw FFI bindings to the libmpv client API
//!
//! This crate mirrors the C layout of the types declared in `mpv/client.h`
//! that the property and command protocol needs. The library itself is opened
//! at runtime through [`MpvLibrary`], so nothing here links against libmpv.
//! Use the safe wrappers in `haruna-mpv-core` for higher-level access.

#![allow(non_camel_case_types)]
#![allow(non_upper_case_globals)]

use std::ffi::c_void;
use std::os::raw::{c_char, c_int};

pub mod library;

pub use library::{MpvLibrary, MpvLoadError};

/// Opaque client handle (`mpv_handle`).
#[repr(C)]
pub struct mpv_handle {
    _private: [u8; 0],
}

// Data formats (`mpv_format`)
pub type mpv_format = c_int;
pub const MPV_FORMAT_NONE: mpv_format = 0;
pub const MPV_FORMAT_STRING: mpv_format = 1;
pub const MPV_FORMAT_OSD_STRING: mpv_format = 2;
pub const MPV_FORMAT_FLAG: mpv_format = 3;
pub const MPV_FORMAT_INT64: mpv_format = 4;
pub const MPV_FORMAT_DOUBLE: mpv_format = 5;
pub const MPV_FORMAT_NODE: mpv_format = 6;
pub const MPV_FORMAT_NODE_ARRAY: mpv_format = 7;
pub const MPV_FORMAT_NODE_MAP: mpv_format = 8;
pub const MPV_FORMAT_BYTE_ARRAY: mpv_format = 9;

// Error codes (`mpv_error`)
pub const MPV_ERROR_SUCCESS: c_int = 0;
pub const MPV_ERROR_EVENT_QUEUE_FULL: c_int = -1;
pub const MPV_ERROR_NOMEM: c_int = -2;
pub const MPV_ERROR_UNINITIALIZED: c_int = -3;
pub const MPV_ERROR_INVALID_PARAMETER: c_int = -4;
pub const MPV_ERROR_OPTION_NOT_FOUND: c_int = -5;
pub const MPV_ERROR_OPTION_FORMAT: c_int = -6;
pub const MPV_ERROR_OPTION_ERROR: c_int = -7;
pub const MPV_ERROR_PROPERTY_NOT_FOUND: c_int = -8;
pub const MPV_ERROR_PROPERTY_FORMAT: c_int = -9;
pub const MPV_ERROR_PROPERTY_UNAVAILABLE: c_int = -10;
pub const MPV_ERROR_PROPERTY_ERROR: c_int = -11;
pub const MPV_ERROR_COMMAND: c_int = -12;
pub const MPV_ERROR_LOADING_FAILED: c_int = -13;
pub const MPV_ERROR_AO_INIT_FAILED: c_int = -14;
pub const MPV_ERROR_VO_INIT_FAILED: c_int = -15;
pub const MPV_ERROR_NOTHING_TO_PLAY: c_int = -16;
pub const MPV_ERROR_UNKNOWN_FORMAT: c_int = -17;
pub const MPV_ERROR_UNSUPPORTED: c_int = -18;
pub const MPV_ERROR_NOT_IMPLEMENTED: c_int = -19;
pub const MPV_ERROR_GENERIC: c_int = -20;

// Event ids (`mpv_event_id`)
pub type mpv_event_id = c_int;
pub const MPV_EVENT_NONE: mpv_event_id = 0;
pub const MPV_EVENT_SHUTDOWN: mpv_event_id = 1;
pub const MPV_EVENT_LOG_MESSAGE: mpv_event_id = 2;
pub const MPV_EVENT_GET_PROPERTY_REPLY: mpv_event_id = 3;
pub const MPV_EVENT_SET_PROPERTY_REPLY: mpv_event_id = 4;
pub const MPV_EVENT_COMMAND_REPLY: mpv_event_id = 5;
pub const MPV_EVENT_START_FILE: mpv_event_id = 6;
pub const MPV_EVENT_END_FILE: mpv_event_id = 7;
pub const MPV_EVENT_FILE_LOADED: mpv_event_id = 8;
pub const MPV_EVENT_IDLE: mpv_event_id = 11;
pub const MPV_EVENT_CLIENT_MESSAGE: mpv_event_id = 16;
pub const MPV_EVENT_VIDEO_RECONFIG: mpv_event_id = 17;
pub const MPV_EVENT_AUDIO_RECONFIG: mpv_event_id = 18;
pub const MPV_EVENT_SEEK: mpv_event_id = 20;
pub const MPV_EVENT_PLAYBACK_RESTART: mpv_event_id = 21;
pub const MPV_EVENT_PROPERTY_CHANGE: mpv_event_id = 22;
pub const MPV_EVENT_QUEUE_OVERFLOW: mpv_event_id = 24;
pub const MPV_EVENT_HOOK: mpv_event_id = 25;

// End-of-file reasons (`mpv_end_file_reason`)
pub type mpv_end_file_reason = c_int;
pub const MPV_END_FILE_REASON_EOF: mpv_end_file_reason = 0;
pub const MPV_END_FILE_REASON_STOP: mpv_end_file_reason = 2;
pub const MPV_END_FILE_REASON_QUIT: mpv_end_file_reason = 3;
pub const MPV_END_FILE_REASON_ERROR: mpv_end_file_reason = 4;
pub const MPV_END_FILE_REASON_REDIRECT: mpv_end_file_reason = 5;

/// Payload of an [`mpv_node`], selected by its `format` field.
#[repr(C)]
#[derive(Clone, Copy)]
pub union mpv_node_u {
    pub string: *mut c_char,
    pub flag: c_int,
    pub int64: i64,
    pub double_: f64,
    pub list: *mut mpv_node_list,
    pub ba: *mut mpv_byte_array,
}

/// Generic tagged value exchanged with the property and command API.
#[repr(C)]
#[derive(Clone, Copy)]
pub struct mpv_node {
    pub u: mpv_node_u,
    pub format: mpv_format,
}

impl mpv_node {
    /// A node with format `MPV_FORMAT_NONE` and a zeroed payload.
    pub const fn none() -> Self {
        Self {
            u: mpv_node_u { int64: 0 },
            format: MPV_FORMAT_NONE,
        }
    }
}

impl Default for mpv_node {
    fn default() -> Self {
        Self::none()
    }
}

impl std::fmt::Debug for mpv_node {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("mpv_node")
            .field("format", &self.format)
            .finish_non_exhaustive()
    }
}

/// Backing storage of `MPV_FORMAT_NODE_ARRAY` and `MPV_FORMAT_NODE_MAP` nodes.
///
/// `keys` is null for arrays.
#[repr(C)]
#[derive(Debug)]
pub struct mpv_node_list {
    pub num: c_int,
    pub values: *mut mpv_node,
    pub keys: *mut *mut c_char,
}

#[repr(C)]
#[derive(Debug)]
pub struct mpv_byte_array {
    pub data: *mut c_void,
    pub size: usize,
}

/// Event returned by `mpv_wait_event`. Valid until the next wait call.
#[repr(C)]
#[derive(Debug)]
pub struct mpv_event {
    pub event_id: mpv_event_id,
    pub error: c_int,
    pub reply_userdata: u64,
    pub data: *mut c_void,
}

#[repr(C)]
#[derive(Debug)]
pub struct mpv_event_property {
    pub name: *const c_char,
    pub format: mpv_format,
    pub data: *mut c_void,
}

#[repr(C)]
#[derive(Debug)]
pub struct mpv_event_log_message {
    pub prefix: *const c_char,
    pub level: *const c_char,
    pub text: *const c_char,
    pub log_level: c_int,
}

#[repr(C)]
#[derive(Debug)]
pub struct mpv_event_start_file {
    pub playlist_entry_id: i64,
}

#[repr(C)]
#[derive(Debug)]
pub struct mpv_event_end_file {
    pub reason: mpv_end_file_reason,
    pub error: c_int,
    pub playlist_entry_id: i64,
    pub playlist_insert_id: i64,
    pub playlist_insert_num_entries: c_int,
}

#[repr(C)]
#[derive(Debug)]
pub struct mpv_event_command {
    pub result: mpv_node,
}

/// Wakeup callback type. Called from an mpv-owned thread.
pub type mpv_wakeup_cb = Option<unsafe extern "C" fn(ctx: *mut c_void)>;

// Entry point signatures resolved from the shared library
pub type mpv_create_fn = unsafe extern "C" fn() -> *mut mpv_handle;
pub type mpv_initialize_fn = unsafe extern "C" fn(ctx: *mut mpv_handle) -> c_int;
pub type mpv_terminate_destroy_fn = unsafe extern "C" fn(ctx: *mut mpv_handle);
pub type mpv_client_api_version_fn = unsafe extern "C" fn() -> std::os::raw::c_ulong;
pub type mpv_error_string_fn = unsafe extern "C" fn(error: c_int) -> *const c_char;
pub type mpv_free_node_contents_fn = unsafe extern "C" fn(node: *mut mpv_node);
pub type mpv_set_option_fn = unsafe extern "C" fn(
    ctx: *mut mpv_handle,
    name: *const c_char,
    format: mpv_format,
    data: *mut c_void,
) -> c_int;
pub type mpv_get_property_fn = unsafe extern "C" fn(
    ctx: *mut mpv_handle,
    name: *const c_char,
    format: mpv_format,
    data: *mut c_void,
) -> c_int;
pub type mpv_set_property_fn = unsafe extern "C" fn(
    ctx: *mut mpv_handle,
    name: *const c_char,
    format: mpv_format,
    data: *mut c_void,
) -> c_int;
pub type mpv_command_node_fn =
    unsafe extern "C" fn(ctx: *mut mpv_handle, args: *mut mpv_node, result: *mut mpv_node) -> c_int;
pub type mpv_observe_property_fn = unsafe extern "C" fn(
    ctx: *mut mpv_handle,
    reply_userdata: u64,
    name: *const c_char,
    format: mpv_format,
) -> c_int;
pub type mpv_unobserve_property_fn =
    unsafe extern "C" fn(ctx: *mut mpv_handle, registered_reply_userdata: u64) -> c_int;
pub type mpv_request_log_messages_fn =
    unsafe extern "C" fn(ctx: *mut mpv_handle, min_level: *const c_char) -> c_int;
pub type mpv_wait_event_fn =
    unsafe extern "C" fn(ctx: *mut mpv_handle, timeout: f64) -> *mut mpv_event;
pub type mpv_set_wakeup_callback_fn =
    unsafe extern "C" fn(ctx: *mut mpv_handle, cb: mpv_wakeup_cb, d: *mut c_void);

/// Symbolic name of an `mpv_error` code, as spelled in `client.h`.
pub fn mpv_error_name(code: c_int) -> &'static str {
    match code {
        MPV_ERROR_SUCCESS => "MPV_ERROR_SUCCESS",
        MPV_ERROR_EVENT_QUEUE_FULL => "MPV_ERROR_EVENT_QUEUE_FULL",
        MPV_ERROR_NOMEM => "MPV_ERROR_NOMEM",
        MPV_ERROR_UNINITIALIZED => "MPV_ERROR_UNINITIALIZED",
        MPV_ERROR_INVALID_PARAMETER => "MPV_ERROR_INVALID_PARAMETER",
        MPV_ERROR_OPTION_NOT_FOUND => "MPV_ERROR_OPTION_NOT_FOUND",
        MPV_ERROR_OPTION_FORMAT => "MPV_ERROR_OPTION_FORMAT",
        MPV_ERROR_OPTION_ERROR => "MPV_ERROR_OPTION_ERROR",
        MPV_ERROR_PROPERTY_NOT_FOUND => "MPV_ERROR_PROPERTY_NOT_FOUND",
        MPV_ERROR_PROPERTY_FORMAT => "MPV_ERROR_PROPERTY_FORMAT",
        MPV_ERROR_PROPERTY_UNAVAILABLE => "MPV_ERROR_PROPERTY_UNAVAILABLE",
        MPV_ERROR_PROPERTY_ERROR => "MPV_ERROR_PROPERTY_ERROR",
        MPV_ERROR_COMMAND => "MPV_ERROR_COMMAND",
        MPV_ERROR_LOADING_FAILED => "MPV_ERROR_LOADING_FAILED",
        MPV_ERROR_AO_INIT_FAILED => "MPV_ERROR_AO_INIT_FAILED",
        MPV_ERROR_VO_INIT_FAILED => "MPV_ERROR_VO_INIT_FAILED",
        MPV_ERROR_NOTHING_TO_PLAY => "MPV_ERROR_NOTHING_TO_PLAY",
        MPV_ERROR_UNKNOWN_FORMAT => "MPV_ERROR_UNKNOWN_FORMAT",
        MPV_ERROR_UNSUPPORTED => "MPV_ERROR_UNSUPPORTED",
        MPV_ERROR_NOT_IMPLEMENTED => "MPV_ERROR_NOT_IMPLEMENTED",
        MPV_ERROR_GENERIC => "MPV_ERROR_GENERIC",
        _ => "MPV_ERROR_UNKNOWN",
    }
}
