//! Leak accounting for encoded trees
//!
//! A counting global allocator tracks live bytes per thread, so every test
//! measures only the allocations it made itself.

use std::alloc::{GlobalAlloc, Layout, System};
use std::cell::Cell;

use haruna_mpv_core::{NativeNode, alloc::allocate_list, alloc::free_node, decode, encode};
use haruna_mpv_core::haruna_mpv_sys::mpv_node;
use serde_json::{Map, Value, json};

struct CountingAlloc;

thread_local! {
    static LIVE_BYTES: Cell<isize> = const { Cell::new(0) };
}

fn track(delta: isize) {
    let _ = LIVE_BYTES.try_with(|live| live.set(live.get() + delta));
}

unsafe impl GlobalAlloc for CountingAlloc {
    unsafe fn alloc(&self, layout: Layout) -> *mut u8 {
        // SAFETY: forwarded to the system allocator
        let ptr = unsafe { System.alloc(layout) };
        if !ptr.is_null() {
            track(layout.size() as isize);
        }
        ptr
    }

    unsafe fn dealloc(&self, ptr: *mut u8, layout: Layout) {
        track(-(layout.size() as isize));
        // SAFETY: forwarded to the system allocator
        unsafe { System.dealloc(ptr, layout) };
    }

    unsafe fn realloc(&self, ptr: *mut u8, layout: Layout, new_size: usize) -> *mut u8 {
        // SAFETY: forwarded to the system allocator
        let new = unsafe { System.realloc(ptr, layout, new_size) };
        if !new.is_null() {
            track(new_size as isize - layout.size() as isize);
        }
        new
    }
}

#[global_allocator]
static GLOBAL: CountingAlloc = CountingAlloc;

fn live_bytes() -> isize {
    LIVE_BYTES.with(Cell::get)
}

/// Live bytes left behind by `f`, excluding whatever it returns
fn leaked_by(f: impl FnOnce()) -> isize {
    let before = live_bytes();
    f();
    live_bytes() - before
}

fn sample_tree() -> Value {
    json!({
        "command": ["loadfile", "/media/episode 01.mkv", "append-play"],
        "options": {"start": 12.5, "pause": false, "aid": 2},
        "chapters": [
            {"title": "Opening", "time": 0.0},
            {"title": "Part A", "time": 90.25}
        ],
        "empty": [],
        "nothing": null
    })
}

#[test]
fn test_encode_and_drop_releases_everything() {
    let value = sample_tree();
    let leaked = leaked_by(|| {
        let node = encode(&value);
        drop(node);
    });
    assert_eq!(leaked, 0);
}

#[test]
fn test_decode_does_not_retain_tree_memory() {
    let value = sample_tree();
    let leaked = leaked_by(|| {
        let node = encode(&value);
        let decoded = decode(&node);
        assert_eq!(decoded, value);
        drop(decoded);
    });
    assert_eq!(leaked, 0);
}

#[test]
fn test_bad_map_key_releases_partial_tree() {
    let mut map = Map::new();
    map.insert("first".into(), json!(["a", "b", {"nested": "c"}]));
    map.insert("second".into(), json!("kept until failure"));
    map.insert("bro\0ken".into(), json!(1));
    map.insert("never".into(), json!("reached"));
    let value = Value::Object(map);
    // first warning registers its callsite
    drop(encode(&value));

    let leaked = leaked_by(|| {
        let node = encode(&value);
        assert!(node.is_none());
    });
    assert_eq!(leaked, 0);
}

#[test]
fn test_interior_nul_string_leaks_nothing() {
    let value = json!(["ok", "not\0ok", {"k": "v\0"}]);
    drop(encode(&value));
    let leaked = leaked_by(|| drop(encode(&value)));
    assert_eq!(leaked, 0);
}

#[test]
fn test_into_raw_then_free_node() {
    let value = sample_tree();
    let leaked = leaked_by(|| {
        let mut raw = encode(&value).into_raw();
        unsafe { free_node(&mut raw) };
    });
    assert_eq!(leaked, 0);
}

#[test]
fn test_manual_list_free() {
    let leaked = leaked_by(|| {
        let mut raw = mpv_node::none();
        allocate_list(&mut raw, true, 16).unwrap();
        unsafe { free_node(&mut raw) };
    });
    assert_eq!(leaked, 0);
}

#[test]
fn test_explicit_free_then_drop() {
    let leaked = leaked_by(|| {
        let mut node = NativeNode::string("sub-file").unwrap();
        node.free();
        drop(node);
    });
    assert_eq!(leaked, 0);
}
