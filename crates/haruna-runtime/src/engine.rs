//! The engine seam and its libmpv implementation
//!
//! [`NativeEngine`] is the narrow set of libmpv entry points the bridge
//! needs, expressed over raw nodes. [`LibMpv`] forwards them to a dynamically
//! loaded libmpv; tests supply an in-memory engine instead.

use std::ffi::{CStr, c_void};
use std::os::raw::c_int;
use std::path::Path;
use std::ptr::{self, NonNull};

use haruna_mpv_core::string::ptr_to_string;
use haruna_mpv_sys::*;
use tracing::debug;

use crate::error::{BridgeError, BridgeResult, Operation};

/// Entry points of a native engine handle
///
/// Status codes follow libmpv: negative is a failure, anything else is
/// success. Nodes filled in by `get_property` and `command` are allocated by
/// the engine and must be handed back to [`NativeEngine::free_node_contents`].
pub trait NativeEngine {
    /// Finish initialization after options have been applied
    fn initialize(&self) -> c_int;

    fn set_option(&self, name: &CStr, value: &mpv_node) -> c_int;

    /// Read a property into `out`; `out` is only written on success
    fn get_property(&self, name: &CStr, out: &mut mpv_node) -> c_int;

    fn set_property(&self, name: &CStr, value: &mpv_node) -> c_int;

    /// Run a command; `result` is only written on success
    fn command(&self, args: &mpv_node, result: &mut mpv_node) -> c_int;

    /// Release a tree the engine filled in
    ///
    /// # Safety
    /// `node` must have been written by a successful `get_property` or
    /// `command` call on this engine and not released yet.
    unsafe fn free_node_contents(&self, node: &mut mpv_node);

    /// Report changes of `name` as property events tagged with `id`
    fn observe_property(&self, id: u64, name: &CStr) -> c_int;

    fn unobserve_property(&self, id: u64) -> c_int;

    fn request_log_messages(&self, min_level: &CStr) -> c_int;

    /// Install the callback the engine invokes from its own threads when new
    /// events are queued. Passing `None` removes it.
    ///
    /// # Safety
    /// `ctx` must stay valid until the callback is replaced or removed.
    unsafe fn set_wakeup_callback(&self, callback: mpv_wakeup_cb, ctx: *mut c_void);

    /// Next queued event, or an event with id `MPV_EVENT_NONE` on timeout
    ///
    /// The returned event, and everything it points to, stays valid until the
    /// next call to this method.
    fn wait_event(&self, timeout: f64) -> *const mpv_event;

    /// Human readable description of a status code
    fn error_string(&self, code: c_int) -> String {
        mpv_error_name(code).to_string()
    }
}

/// A libmpv handle opened through a dynamically loaded library
///
/// The handle is created on construction and destroyed on drop. Options can
/// be applied until [`NativeEngine::initialize`] is called.
pub struct LibMpv {
    handle: NonNull<mpv_handle>,
    lib: MpvLibrary,
}

impl LibMpv {
    /// Load libmpv and create an uninitialized handle
    ///
    /// With `library` unset the platform's default library names are tried.
    pub fn open(library: Option<&Path>) -> BridgeResult<Self> {
        let lib = match library {
            Some(path) => MpvLibrary::load_from(path)?,
            None => MpvLibrary::load()?,
        };

        // SAFETY: mpv_create has no preconditions
        let handle = NonNull::new(unsafe { (lib.api.create)() }).ok_or_else(|| BridgeError::Init {
            op: Operation::Create,
            message: "mpv_create returned null".into(),
        })?;
        debug!("created mpv handle");

        Ok(Self { handle, lib })
    }

    fn raw(&self) -> *mut mpv_handle {
        self.handle.as_ptr()
    }
}

impl NativeEngine for LibMpv {
    fn initialize(&self) -> c_int {
        // SAFETY: handle is live for the lifetime of self
        unsafe { (self.lib.api.initialize)(self.raw()) }
    }

    fn set_option(&self, name: &CStr, value: &mpv_node) -> c_int {
        // SAFETY: libmpv only reads the node for MPV_FORMAT_NODE
        unsafe {
            (self.lib.api.set_option)(
                self.raw(),
                name.as_ptr(),
                MPV_FORMAT_NODE,
                ptr::from_ref(value).cast_mut().cast(),
            )
        }
    }

    fn get_property(&self, name: &CStr, out: &mut mpv_node) -> c_int {
        // SAFETY: out is a valid node slot for libmpv to fill in
        unsafe {
            (self.lib.api.get_property)(
                self.raw(),
                name.as_ptr(),
                MPV_FORMAT_NODE,
                ptr::from_mut(out).cast(),
            )
        }
    }

    fn set_property(&self, name: &CStr, value: &mpv_node) -> c_int {
        // SAFETY: libmpv only reads the node for MPV_FORMAT_NODE
        unsafe {
            (self.lib.api.set_property)(
                self.raw(),
                name.as_ptr(),
                MPV_FORMAT_NODE,
                ptr::from_ref(value).cast_mut().cast(),
            )
        }
    }

    fn command(&self, args: &mpv_node, result: &mut mpv_node) -> c_int {
        // SAFETY: args is only read; result is a valid slot for libmpv to fill in
        unsafe { (self.lib.api.command_node)(self.raw(), ptr::from_ref(args).cast_mut(), result) }
    }

    unsafe fn free_node_contents(&self, node: &mut mpv_node) {
        // SAFETY: node was filled in by this handle per caller contract
        unsafe { (self.lib.api.free_node_contents)(node) }
    }

    fn observe_property(&self, id: u64, name: &CStr) -> c_int {
        // SAFETY: handle is live; libmpv copies the name
        unsafe { (self.lib.api.observe_property)(self.raw(), id, name.as_ptr(), MPV_FORMAT_NODE) }
    }

    fn unobserve_property(&self, id: u64) -> c_int {
        // SAFETY: handle is live
        unsafe { (self.lib.api.unobserve_property)(self.raw(), id) }
    }

    fn request_log_messages(&self, min_level: &CStr) -> c_int {
        // SAFETY: handle is live; libmpv copies the level
        unsafe { (self.lib.api.request_log_messages)(self.raw(), min_level.as_ptr()) }
    }

    unsafe fn set_wakeup_callback(&self, callback: mpv_wakeup_cb, ctx: *mut c_void) {
        // SAFETY: ctx validity is guaranteed by the caller
        unsafe { (self.lib.api.set_wakeup_callback)(self.raw(), callback, ctx) }
    }

    fn wait_event(&self, timeout: f64) -> *const mpv_event {
        // SAFETY: handle is live; the event is owned by the handle
        unsafe { (self.lib.api.wait_event)(self.raw(), timeout) }
    }

    fn error_string(&self, code: c_int) -> String {
        // SAFETY: mpv_error_string returns a static string for any code
        unsafe { ptr_to_string((self.lib.api.error_string)(code)) }
    }
}

impl Drop for LibMpv {
    fn drop(&mut self) {
        debug!("destroying mpv handle");
        // SAFETY: the handle is live and destroyed exactly once
        unsafe { (self.lib.api.terminate_destroy)(self.raw()) }
    }
}
