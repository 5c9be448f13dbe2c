//! Runtime loading of the libmpv shared library.
//!
//! The client API is resolved symbol by symbol via `libloading`, so building
//! the workspace never requires libmpv to be installed. A missing library or
//! symbol is reported as an [`MpvLoadError`] when [`MpvLibrary::load`] runs.

use std::path::Path;

use libloading::Library;
use thiserror::Error;
use tracing::{debug, info};

use crate::*;

/// Errors raised while opening libmpv.
#[derive(Debug, Error)]
pub enum MpvLoadError {
    /// None of the candidate library names could be opened.
    #[error("libmpv not found: {0}")]
    LibraryNotFound(String),

    /// The library was opened but lacks a required entry point.
    #[error("libmpv symbol not found: {0}")]
    SymbolNotFound(String),
}

/// Function pointers of the client API entry points the bridge uses.
#[derive(Clone, Copy)]
pub struct MpvApi {
    pub client_api_version: mpv_client_api_version_fn,
    pub create: mpv_create_fn,
    pub initialize: mpv_initialize_fn,
    pub terminate_destroy: mpv_terminate_destroy_fn,
    pub error_string: mpv_error_string_fn,
    pub free_node_contents: mpv_free_node_contents_fn,
    pub set_option: mpv_set_option_fn,
    pub get_property: mpv_get_property_fn,
    pub set_property: mpv_set_property_fn,
    pub command_node: mpv_command_node_fn,
    pub observe_property: mpv_observe_property_fn,
    pub unobserve_property: mpv_unobserve_property_fn,
    pub request_log_messages: mpv_request_log_messages_fn,
    pub wait_event: mpv_wait_event_fn,
    pub set_wakeup_callback: mpv_set_wakeup_callback_fn,
}

/// An opened libmpv together with its resolved entry points.
pub struct MpvLibrary {
    /// Keeps the shared object mapped while any function pointer is in use.
    _lib: Library,
    pub api: MpvApi,
}

impl std::fmt::Debug for MpvLibrary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MpvLibrary").field("loaded", &true).finish()
    }
}

impl MpvLibrary {
    /// Platform-specific library names, tried in order.
    pub fn library_names() -> &'static [&'static str] {
        if cfg!(target_os = "windows") {
            &["libmpv-2.dll", "mpv-2.dll", "mpv-1.dll"]
        } else if cfg!(target_os = "macos") {
            &["libmpv.2.dylib", "libmpv.dylib"]
        } else {
            &["libmpv.so.2", "libmpv.so.1", "libmpv.so"]
        }
    }

    /// Load libmpv from the default system search path.
    pub fn load() -> Result<Self, MpvLoadError> {
        let mut failures = Vec::new();
        for name in Self::library_names() {
            // SAFETY: loading libmpv runs no initializers with preconditions.
            match unsafe { Library::new(name) } {
                Ok(lib) => {
                    info!(library = %name, "Loaded libmpv");
                    return Self::load_functions(lib);
                }
                Err(e) => {
                    debug!(library = %name, error = %e, "libmpv candidate failed");
                    failures.push(format!("{name}: {e}"));
                }
            }
        }
        Err(MpvLoadError::LibraryNotFound(failures.join("; ")))
    }

    /// Load libmpv from an explicit path.
    pub fn load_from(path: &Path) -> Result<Self, MpvLoadError> {
        info!(path = %path.display(), "Loading libmpv from custom path");

        // SAFETY: the caller asserts the path names a libmpv build.
        let lib = unsafe { Library::new(path) }.map_err(|e| {
            MpvLoadError::LibraryNotFound(format!("{}: {e}", path.display()))
        })?;
        Self::load_functions(lib)
    }

    fn load_functions(lib: Library) -> Result<Self, MpvLoadError> {
        macro_rules! symbol {
            ($name:literal, $ty:ty) => {
                // SAFETY: the symbol names and signatures follow mpv/client.h.
                *unsafe { lib.get::<$ty>(concat!($name, "\0").as_bytes()) }
                    .map_err(|e| MpvLoadError::SymbolNotFound(format!("{}: {e}", $name)))?
            };
        }

        let api = MpvApi {
            client_api_version: symbol!("mpv_client_api_version", mpv_client_api_version_fn),
            create: symbol!("mpv_create", mpv_create_fn),
            initialize: symbol!("mpv_initialize", mpv_initialize_fn),
            terminate_destroy: symbol!("mpv_terminate_destroy", mpv_terminate_destroy_fn),
            error_string: symbol!("mpv_error_string", mpv_error_string_fn),
            free_node_contents: symbol!("mpv_free_node_contents", mpv_free_node_contents_fn),
            set_option: symbol!("mpv_set_option", mpv_set_option_fn),
            get_property: symbol!("mpv_get_property", mpv_get_property_fn),
            set_property: symbol!("mpv_set_property", mpv_set_property_fn),
            command_node: symbol!("mpv_command_node", mpv_command_node_fn),
            observe_property: symbol!("mpv_observe_property", mpv_observe_property_fn),
            unobserve_property: symbol!("mpv_unobserve_property", mpv_unobserve_property_fn),
            request_log_messages: symbol!("mpv_request_log_messages", mpv_request_log_messages_fn),
            wait_event: symbol!("mpv_wait_event", mpv_wait_event_fn),
            set_wakeup_callback: symbol!("mpv_set_wakeup_callback", mpv_set_wakeup_callback_fn),
        };

        // SAFETY: mpv_client_api_version has no preconditions.
        let version = unsafe { (api.client_api_version)() };
        debug!(major = version >> 16, minor = version & 0xffff, "libmpv client API");

        Ok(Self { _lib: lib, api })
    }
}
