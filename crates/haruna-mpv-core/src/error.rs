//! Error types for node construction
//!
//! Encoding and decoding are total, so these errors only surface from the
//! lower-level allocation helpers. The encoder turns them into a `None` node.

use thiserror::Error;

/// Result type alias for node operations
pub type NodeResult<T> = Result<T, NodeError>;

/// Failures while building a native node tree
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum NodeError {
    /// The backing array of a list or map could not be allocated
    #[error("allocation of {count} node list entries failed")]
    AllocationFailed { count: usize },

    /// The engine stores list lengths in a C `int`
    #[error("node list of {count} entries exceeds the engine's length limit")]
    ListTooLarge { count: usize },

    /// A string cannot be passed as a NUL-terminated C string
    #[error("string contains an interior NUL byte at offset {position}")]
    InteriorNul { position: usize },
}
