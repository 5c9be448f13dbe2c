//! Error types for haruna-runtime
//!
//! Engine failures keep the raw libmpv status so callers can tell an error
//! apart from a property that legitimately has no value.

use std::fmt;
use std::os::raw::c_int;
use std::path::PathBuf;

use haruna_mpv_core::NodeError;
use haruna_mpv_sys::{MpvLoadError, mpv_error_name};
use thiserror::Error;

/// Engine entry point that produced a status code
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    Create,
    Initialize,
    GetProperty,
    SetProperty,
    SetOption,
    Command,
    ObserveProperty,
    UnobserveProperty,
    RequestLogMessages,
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Create => "create",
            Self::Initialize => "initialize",
            Self::GetProperty => "get property",
            Self::SetProperty => "set property",
            Self::SetOption => "set option",
            Self::Command => "command",
            Self::ObserveProperty => "observe property",
            Self::UnobserveProperty => "unobserve property",
            Self::RequestLogMessages => "request log messages",
        })
    }
}

/// Errors that can occur while talking to the engine
#[derive(Error, Debug)]
pub enum BridgeError {
    /// libmpv could not be opened
    #[error(transparent)]
    Load(#[from] MpvLoadError),

    /// The engine handle could not be created or initialized
    #[error("failed to {op} the mpv handle: {message}")]
    Init { op: Operation, message: String },

    /// The engine returned a negative status
    #[error("{op} `{target}` failed: {} ({code})", mpv_error_name(*code))]
    Engine {
        code: c_int,
        op: Operation,
        target: String,
    },

    /// A property, option or log level name cannot cross the C boundary
    #[error("invalid name `{}`: {source}", name.escape_debug())]
    InvalidName {
        name: String,
        #[source]
        source: NodeError,
    },

    /// Only one event pump can own the wakeup callback at a time
    #[error("an event pump is already attached to this bridge")]
    PumpAttached,

    /// A decoded value did not match the requested Rust type
    #[error("property `{name}` has an unexpected shape: {source}")]
    Deserialize {
        name: String,
        #[source]
        source: serde_json::Error,
    },

    /// The configuration file could not be read
    #[error("failed to read {}: {source}", path.display())]
    ConfigIo {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The configuration file is not valid TOML for [`crate::BridgeConfig`]
    #[error("failed to parse {}: {source}", path.display())]
    ConfigParse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}

impl BridgeError {
    /// Build an engine error from a negative status
    pub fn engine(code: c_int, op: Operation, target: impl Into<String>) -> Self {
        Self::Engine {
            code,
            op,
            target: target.into(),
        }
    }

    /// The libmpv status code, if this error came from the engine
    pub fn code(&self) -> Option<c_int> {
        match self {
            Self::Engine { code, .. } => Some(*code),
            _ => None,
        }
    }

    /// Symbolic libmpv error name, if this error came from the engine
    pub fn error_name(&self) -> Option<&'static str> {
        self.code().map(mpv_error_name)
    }
}

/// Result type alias for bridge operations
pub type BridgeResult<T> = Result<T, BridgeError>;

/// Map a libmpv status to a result, keeping non-negative statuses
pub(crate) fn check(status: c_int, op: Operation, target: &str) -> BridgeResult<c_int> {
    if status < 0 {
        Err(BridgeError::engine(status, op, target))
    } else {
        Ok(status)
    }
}
