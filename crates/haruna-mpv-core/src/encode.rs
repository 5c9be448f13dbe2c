//! `serde_json::Value` → `mpv_node`

use std::slice;

use haruna_mpv_sys::*;
use serde_json::{Map, Number, Value};
use tracing::warn;

use crate::alloc::{allocate_list, free_node};
use crate::node::NativeNode;
use crate::string::dup_string;

/// Encode a dynamic value into a freshly allocated node tree
///
/// Never fails. Shapes the engine cannot represent, and sub-trees whose
/// allocation fails, become `MPV_FORMAT_NONE` nodes; libmpv then reports the
/// problem through its own status code when the tree is used.
///
/// | value             | node                          |
/// |-------------------|-------------------------------|
/// | string            | `MPV_FORMAT_STRING` (copied)  |
/// | bool              | `MPV_FORMAT_FLAG`             |
/// | integer           | `MPV_FORMAT_INT64`            |
/// | float             | `MPV_FORMAT_DOUBLE`           |
/// | array             | `MPV_FORMAT_NODE_ARRAY`       |
/// | object            | `MPV_FORMAT_NODE_MAP`         |
/// | null              | `MPV_FORMAT_NONE`             |
pub fn encode(value: &Value) -> NativeNode {
    let mut node = NativeNode::none();
    write_node(node.raw_mut(), value);
    node
}

fn write_node(dst: &mut mpv_node, value: &Value) {
    match value {
        Value::String(s) => match dup_string(s) {
            Ok(ptr) => {
                dst.format = MPV_FORMAT_STRING;
                dst.u.string = ptr;
            }
            Err(err) => {
                warn!(error = %err, "string not representable, encoding as none");
                *dst = mpv_node::none();
            }
        },
        Value::Bool(b) => {
            dst.format = MPV_FORMAT_FLAG;
            dst.u.flag = (*b).into();
        }
        Value::Number(n) => write_number(dst, n),
        Value::Array(items) => write_array(dst, items),
        Value::Object(map) => write_map(dst, map),
        Value::Null => *dst = mpv_node::none(),
    }
}

fn write_number(dst: &mut mpv_node, n: &Number) {
    if let Some(i) = n.as_i64() {
        dst.format = MPV_FORMAT_INT64;
        dst.u.int64 = i;
    } else if let Some(u) = n.as_u64() {
        // the engine only has a signed 64-bit slot
        dst.format = MPV_FORMAT_INT64;
        dst.u.int64 = u as i64;
    } else if let Some(f) = n.as_f64() {
        dst.format = MPV_FORMAT_DOUBLE;
        dst.u.double_ = f;
    } else {
        *dst = mpv_node::none();
    }
}

fn write_array(dst: &mut mpv_node, items: &[Value]) {
    let values = match allocate_list(dst, false, items.len()) {
        Ok(list) => list.values,
        Err(err) => {
            warn!(error = %err, len = items.len(), "array allocation failed, encoding as none");
            return;
        }
    };

    // SAFETY: allocate_list returned items.len() initialized None values
    let values = unsafe { slice::from_raw_parts_mut(values, items.len()) };
    for (slot, item) in values.iter_mut().zip(items) {
        write_node(slot, item);
    }
}

fn write_map(dst: &mut mpv_node, map: &Map<String, Value>) {
    let (values, keys) = match allocate_list(dst, true, map.len()) {
        Ok(list) => (list.values, list.keys),
        Err(err) => {
            warn!(error = %err, len = map.len(), "map allocation failed, encoding as none");
            return;
        }
    };

    // SAFETY: allocate_list returned map.len() None values and null keys
    let (values, keys) = unsafe {
        (
            slice::from_raw_parts_mut(values, map.len()),
            slice::from_raw_parts_mut(keys, map.len()),
        )
    };

    for (i, (key, value)) in map.iter().enumerate() {
        match dup_string(key) {
            Ok(ptr) => keys[i] = ptr,
            Err(err) => {
                warn!(error = %err, "map key not representable, encoding map as none");
                // SAFETY: dst is a partially populated tree from allocate_list;
                // the slices above are not touched after this point
                unsafe { free_node(dst) };
                return;
            }
        }
        write_node(&mut values[i], value);
    }
}
