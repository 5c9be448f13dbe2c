//! Allocation and release of node trees built on the Rust side.
//!
//! Every list, key array and string payload reachable from a tree built by
//! the encoder is allocated here, and [`free_node`] is the only routine that
//! releases them. The layout matches what libmpv expects to read:
//!
//! ```text
//! mpv_node { format: NODE_MAP, u.list ─┐ }
//!                                      ▼
//!                   mpv_node_list { num: n, values ─▶ [mpv_node; n]
//!                                           keys   ─▶ [*mut c_char; n] }
//! ```
//!
//! Arrays use the same list with a null `keys` pointer.

use std::iter;
use std::os::raw::{c_char, c_int};
use std::ptr;

use haruna_mpv_sys::*;

use crate::error::{NodeError, NodeResult};
use crate::string::free_string;

/// Turn `dst` into an empty array or map node with room for `count` entries
///
/// All values start as `MPV_FORMAT_NONE` and, for maps, all keys start null,
/// so the returned list can be released by [`free_node`] at any point while it
/// is being populated.
///
/// On failure nothing stays allocated and `dst` is left as a `None` node.
/// `dst` must not own a payload when this is called; it is overwritten.
pub fn allocate_list(
    dst: &mut mpv_node,
    is_map: bool,
    count: usize,
) -> NodeResult<&mut mpv_node_list> {
    *dst = mpv_node::none();

    let num = c_int::try_from(count).map_err(|_| NodeError::ListTooLarge { count })?;
    let values = try_alloc_slice(count, mpv_node::none)?;
    let keys = if is_map {
        Some(try_alloc_slice::<*mut c_char>(count, ptr::null_mut)?)
    } else {
        None
    };

    let list = Box::new(mpv_node_list {
        num,
        values: Box::into_raw(values).cast::<mpv_node>(),
        keys: keys.map_or(ptr::null_mut(), |keys| Box::into_raw(keys).cast::<*mut c_char>()),
    });

    dst.format = if is_map {
        MPV_FORMAT_NODE_MAP
    } else {
        MPV_FORMAT_NODE_ARRAY
    };
    dst.u.list = Box::into_raw(list);

    // SAFETY: the list was just leaked from a Box and is uniquely owned by dst
    Ok(unsafe { &mut *dst.u.list })
}

fn try_alloc_slice<T>(count: usize, fill: impl FnMut() -> T) -> NodeResult<Box<[T]>> {
    let mut slots = Vec::new();
    slots
        .try_reserve_exact(count)
        .map_err(|_| NodeError::AllocationFailed { count })?;
    slots.extend(iter::repeat_with(fill).take(count));
    Ok(slots.into_boxed_slice())
}

/// Recursively release everything `node` owns and reset it to `None`
///
/// Strings release their buffer; arrays and maps release every value, every
/// key, both backing arrays and the list itself. Other formats own nothing.
/// Calling this again on the reset node is a no-op.
///
/// # Safety
/// The tree must have been built by this module (through [`allocate_list`]
/// and [`crate::string::dup_string`]). Trees allocated by libmpv must be
/// released with `mpv_free_node_contents` instead.
pub unsafe fn free_node(node: &mut mpv_node) {
    match node.format {
        MPV_FORMAT_STRING => {
            // SAFETY: string payloads come from dup_string per caller contract
            unsafe { free_string(node.u.string) };
        }
        MPV_FORMAT_NODE_ARRAY | MPV_FORMAT_NODE_MAP => {
            // SAFETY: list payloads come from allocate_list per caller contract
            let list = unsafe { node.u.list };
            if !list.is_null() {
                // SAFETY: list, values and keys were leaked from Boxes of length num
                unsafe {
                    let list = Box::from_raw(list);
                    let num = usize::try_from(list.num).unwrap_or(0);

                    if !list.values.is_null() {
                        let mut values =
                            Box::from_raw(ptr::slice_from_raw_parts_mut(list.values, num));
                        for value in values.iter_mut() {
                            free_node(value);
                        }
                    }

                    if !list.keys.is_null() {
                        let keys = Box::from_raw(ptr::slice_from_raw_parts_mut(list.keys, num));
                        for &key in keys.iter() {
                            free_string(key);
                        }
                    }
                }
            }
        }
        _ => {}
    }

    *node = mpv_node::none();
}
