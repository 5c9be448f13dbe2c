//! Owned node trees and borrowed views over engine nodes

use std::borrow::Cow;
use std::ffi::CStr;
use std::fmt;
use std::marker::PhantomData;
use std::mem::ManuallyDrop;
use std::os::raw::c_char;
use std::slice;

use haruna_mpv_sys::*;

use crate::alloc::free_node;
use crate::error::NodeResult;
use crate::string::{borrow_cstr, cstr_to_str, dup_string};

/// Tag of a node, independent of its payload
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeKind {
    None,
    String,
    Flag,
    Int64,
    Double,
    Array,
    Map,
    /// A format this crate does not decode (byte arrays, future extensions)
    Unsupported(mpv_format),
}

impl NodeKind {
    pub fn from_format(format: mpv_format) -> Self {
        match format {
            MPV_FORMAT_NONE => Self::None,
            MPV_FORMAT_STRING => Self::String,
            MPV_FORMAT_FLAG => Self::Flag,
            MPV_FORMAT_INT64 => Self::Int64,
            MPV_FORMAT_DOUBLE => Self::Double,
            MPV_FORMAT_NODE_ARRAY => Self::Array,
            MPV_FORMAT_NODE_MAP => Self::Map,
            other => Self::Unsupported(other),
        }
    }
}

/// A node tree built on the Rust side, released exactly once on drop
///
/// The tree is laid out as libmpv's `mpv_node` so that [`NativeNode::as_raw`]
/// can be handed straight to the property and command entry points. The
/// engine only reads it; ownership never leaves this value.
///
/// # Thread Safety
///
/// This type is `!Send` and `!Sync`:
///
/// ```compile_fail
/// let node = haruna_mpv_core::NativeNode::int64(1);
/// std::thread::spawn(move || drop(node));
/// ```
///
/// ```compile_fail
/// fn assert_sync<T: Sync>() {}
/// assert_sync::<haruna_mpv_core::NativeNode>();
/// ```
pub struct NativeNode {
    raw: mpv_node,
    /// Marker to make this type !Send + !Sync
    _not_send: PhantomData<*mut ()>,
}

impl NativeNode {
    /// An empty node that owns nothing
    pub fn none() -> Self {
        Self {
            raw: mpv_node::none(),
            _not_send: PhantomData,
        }
    }

    /// A string node holding a fresh copy of `s`
    pub fn string(s: &str) -> NodeResult<Self> {
        let mut node = Self::none();
        node.raw.u.string = dup_string(s)?;
        node.raw.format = MPV_FORMAT_STRING;
        Ok(node)
    }

    pub fn flag(value: bool) -> Self {
        let mut node = Self::none();
        node.raw.format = MPV_FORMAT_FLAG;
        node.raw.u.flag = value.into();
        node
    }

    pub fn int64(value: i64) -> Self {
        let mut node = Self::none();
        node.raw.format = MPV_FORMAT_INT64;
        node.raw.u.int64 = value;
        node
    }

    pub fn double(value: f64) -> Self {
        let mut node = Self::none();
        node.raw.format = MPV_FORMAT_DOUBLE;
        node.raw.u.double_ = value;
        node
    }

    /// Take ownership of a raw tree
    ///
    /// # Safety
    /// `raw` must have been built by this crate's allocator, typically through
    /// [`NativeNode::into_raw`], and must not be owned by anything else.
    pub unsafe fn from_raw(raw: mpv_node) -> Self {
        Self {
            raw,
            _not_send: PhantomData,
        }
    }

    /// Release ownership of the tree without freeing it
    ///
    /// The caller becomes responsible for passing it back to
    /// [`NativeNode::from_raw`] or [`crate::alloc::free_node`].
    pub fn into_raw(self) -> mpv_node {
        let this = ManuallyDrop::new(self);
        this.raw
    }

    /// Borrow the raw node for an engine call
    pub fn as_raw(&self) -> &mpv_node {
        &self.raw
    }

    pub(crate) fn raw_mut(&mut self) -> &mut mpv_node {
        &mut self.raw
    }

    pub fn format(&self) -> mpv_format {
        self.raw.format
    }

    pub fn kind(&self) -> NodeKind {
        NodeKind::from_format(self.raw.format)
    }

    pub fn is_none(&self) -> bool {
        self.raw.format == MPV_FORMAT_NONE
    }

    /// Borrow a typed view of the tree
    pub fn view(&self) -> NodeView<'_> {
        // SAFETY: the tree was built by this crate's allocator and is well formed
        unsafe { NodeView::from_raw(&self.raw) }
    }

    /// Release the tree now; the node becomes `None`
    ///
    /// Calling this more than once is harmless.
    pub fn free(&mut self) {
        // SAFETY: self.raw is owned and was built by this crate's allocator
        unsafe { free_node(&mut self.raw) };
    }
}

impl Default for NativeNode {
    fn default() -> Self {
        Self::none()
    }
}

impl Drop for NativeNode {
    fn drop(&mut self) {
        self.free();
    }
}

impl fmt::Debug for NativeNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "NativeNode({:?})", self.view())
    }
}

/// Borrowed, typed view of a node tree
///
/// Works the same over trees built by this crate and trees filled in by the
/// engine, so a single decoder serves both. Views borrow raw pointers and
/// stay on the thread that owns the tree:
///
/// ```compile_fail
/// fn assert_send<T: Send>() {}
/// assert_send::<haruna_mpv_core::NodeView<'static>>();
/// ```
#[derive(Clone, Copy)]
pub enum NodeView<'a> {
    None,
    /// `None` when the engine handed over a null string pointer
    String(Option<&'a CStr>),
    Flag(bool),
    Int64(i64),
    Double(f64),
    Array(NodeListView<'a>),
    Map(NodeListView<'a>),
    Unsupported(mpv_format),
}

impl<'a> NodeView<'a> {
    /// View a raw node
    ///
    /// # Safety
    /// `node` must be a well-formed tree: string pointers are null or
    /// NUL-terminated, list pointers are null or point to `num` values (and
    /// `num` keys for maps). The tree must not change while the view lives.
    pub unsafe fn from_raw(node: &'a mpv_node) -> Self {
        // SAFETY: the union field read matches the format tag in every arm
        unsafe {
            match node.format {
                MPV_FORMAT_NONE => Self::None,
                MPV_FORMAT_STRING => Self::String(borrow_cstr(node.u.string)),
                MPV_FORMAT_FLAG => Self::Flag(node.u.flag != 0),
                MPV_FORMAT_INT64 => Self::Int64(node.u.int64),
                MPV_FORMAT_DOUBLE => Self::Double(node.u.double_),
                MPV_FORMAT_NODE_ARRAY => Self::Array(NodeListView::from_raw(node.u.list, false)),
                MPV_FORMAT_NODE_MAP => Self::Map(NodeListView::from_raw(node.u.list, true)),
                other => Self::Unsupported(other),
            }
        }
    }

    pub fn kind(&self) -> NodeKind {
        match self {
            Self::None => NodeKind::None,
            Self::String(_) => NodeKind::String,
            Self::Flag(_) => NodeKind::Flag,
            Self::Int64(_) => NodeKind::Int64,
            Self::Double(_) => NodeKind::Double,
            Self::Array(_) => NodeKind::Array,
            Self::Map(_) => NodeKind::Map,
            Self::Unsupported(format) => NodeKind::Unsupported(*format),
        }
    }
}

impl fmt::Debug for NodeView<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::None => f.write_str("None"),
            Self::String(s) => write!(f, "String({:?})", s.map(cstr_to_str)),
            Self::Flag(b) => write!(f, "Flag({b})"),
            Self::Int64(n) => write!(f, "Int64({n})"),
            Self::Double(n) => write!(f, "Double({n})"),
            Self::Array(list) => f.debug_list().entries(list.values()).finish(),
            Self::Map(list) => f.debug_map().entries(list.entries()).finish(),
            Self::Unsupported(format) => write!(f, "Unsupported({format})"),
        }
    }
}

/// Borrowed view of an `mpv_node_list`
#[derive(Clone, Copy)]
pub struct NodeListView<'a> {
    values: &'a [mpv_node],
    keys: &'a [*mut c_char],
}

impl<'a> NodeListView<'a> {
    /// # Safety
    /// See [`NodeView::from_raw`].
    unsafe fn from_raw(list: *const mpv_node_list, is_map: bool) -> Self {
        if list.is_null() {
            return Self {
                values: &[],
                keys: &[],
            };
        }

        // SAFETY: list points to a valid mpv_node_list per caller contract
        unsafe {
            let list = &*list;
            let num = usize::try_from(list.num).unwrap_or(0);
            let values = if list.values.is_null() || num == 0 {
                &[][..]
            } else {
                slice::from_raw_parts(list.values, num)
            };
            let keys = if !is_map || list.keys.is_null() || num == 0 {
                &[][..]
            } else {
                slice::from_raw_parts(list.keys, num)
            };
            Self { values, keys }
        }
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Value views in positional order
    pub fn values(&self) -> impl Iterator<Item = NodeView<'a>> + 'a {
        // SAFETY: children of a well-formed tree are well formed
        self.values.iter().map(|node| unsafe { NodeView::from_raw(node) })
    }

    /// `(key, value)` pairs in positional order; a missing key reads as ""
    pub fn entries(&self) -> impl Iterator<Item = (Cow<'a, str>, NodeView<'a>)> + 'a {
        let keys = self.keys;
        self.values.iter().enumerate().map(move |(i, node)| {
            // SAFETY: keys are null or NUL-terminated in a well-formed tree
            let key = keys
                .get(i)
                .and_then(|&key| unsafe { borrow_cstr(key) })
                .map(cstr_to_str)
                .unwrap_or(Cow::Borrowed(""));
            // SAFETY: children of a well-formed tree are well formed
            (key, unsafe { NodeView::from_raw(node) })
        })
    }
}
