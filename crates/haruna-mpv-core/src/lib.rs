//! Safe node marshaling for libmpv.
//!
//! This crate converts between `serde_json::Value`, the dynamic value type the
//! application uses for properties, options and commands, and libmpv's tagged
//! union `mpv_node`.
//!
//! # Example
//!
//! ```
//! use haruna_mpv_core::{NodeKind, decode, encode};
//! use serde_json::json;
//!
//! let value = json!(["loadfile", "/tmp/a.mp4"]);
//! let node = encode(&value);
//! assert_eq!(node.kind(), NodeKind::Array);
//! assert_eq!(decode(&node), value);
//! // every string and list in the tree is released when `node` drops
//! ```
//!
//! # Memory ownership
//!
//! ```text
//! serde_json::Value ──encode──▶ NativeNode (owns its tree, frees on Drop)
//!                                   │ as_raw()
//!                                   ▼
//!                               &mpv_node ──▶ engine call (read only)
//!
//! engine reply mpv_node ──NodeView::from_raw──▶ decode_view ──▶ Value
//!   (released by the engine's own free routine, never by this crate)
//! ```
//!
//! Trees built here are allocated by Rust and released only by
//! [`alloc::free_node`]. Trees allocated by libmpv must go back through
//! `mpv_free_node_contents`; the two are never mixed.
//!
//! # Thread Safety
//!
//! [`NativeNode`] is `!Send` and `!Sync`: a tree belongs to the thread that
//! built it for the duration of a single engine call.

pub mod alloc;
mod decode;
mod encode;
mod error;
mod node;
pub mod string;

pub use decode::{decode, decode_raw, decode_view};
pub use encode::encode;
pub use error::{NodeError, NodeResult};
pub use node::{NativeNode, NodeKind, NodeListView, NodeView};

// Re-export the raw bindings for callers that cross the FFI seam
pub use haruna_mpv_sys;
