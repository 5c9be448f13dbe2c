//! `mpv_node` → `serde_json::Value`

use haruna_mpv_sys::mpv_node;
use serde_json::{Map, Number, Value};

use crate::node::{NativeNode, NodeView};
use crate::string::cstr_to_str;

/// Decode a tree built on the Rust side
pub fn decode(node: &NativeNode) -> Value {
    decode_view(node.view())
}

/// Decode a raw tree, typically one filled in by the engine
///
/// The tree is only read; releasing it stays with whoever allocated it.
///
/// # Safety
/// Same contract as [`NodeView::from_raw`].
pub unsafe fn decode_raw(node: &mpv_node) -> Value {
    // SAFETY: forwarded to the caller
    decode_view(unsafe { NodeView::from_raw(node) })
}

/// Decode a node view
///
/// Never fails: `None` and formats without a dynamic counterpart (byte
/// arrays, future engine extensions) decode to `Value::Null`, as do
/// non-finite doubles and null string pointers.
pub fn decode_view(view: NodeView<'_>) -> Value {
    match view {
        NodeView::String(Some(s)) => Value::String(cstr_to_str(s).into_owned()),
        NodeView::String(None) => Value::Null,
        NodeView::Flag(b) => Value::Bool(b),
        NodeView::Int64(n) => Value::Number(n.into()),
        NodeView::Double(n) => Number::from_f64(n).map_or(Value::Null, Value::Number),
        NodeView::Array(list) => Value::Array(list.values().map(decode_view).collect()),
        NodeView::Map(list) => {
            let mut map = Map::with_capacity(list.len());
            for (key, value) in list.entries() {
                map.insert(key.into_owned(), decode_view(value));
            }
            Value::Object(map)
        }
        NodeView::None | NodeView::Unsupported(_) => Value::Null,
    }
}
