//! Scripted in-memory engine for integration tests
//!
//! Replies are real node trees built by the encoder, so the bridge's release
//! path is exercised end to end: every tree handed out must come back through
//! `free_node_contents`, which `outstanding_replies` tracks.

#![allow(dead_code)]

use std::any::Any;
use std::cell::RefCell;
use std::collections::{HashMap, VecDeque};
use std::ffi::{CStr, CString, c_void};
use std::os::raw::c_int;
use std::ptr;
use std::sync::Arc;

use haruna_runtime::NativeEngine;
use haruna_runtime::haruna_mpv_core::haruna_mpv_sys::*;
use haruna_runtime::haruna_mpv_core::{NativeNode, decode_raw, encode};
use parking_lot::Mutex;
use serde_json::{Map, Value};

/// Engine call recorded by the fake
#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    Initialize,
    SetOption(String, Value),
    GetProperty(String),
    SetProperty(String, Value),
    Command(Value),
    Observe(u64, String),
    Unobserve(u64),
    RequestLog(String),
}

/// Event queued for `wait_event`
#[derive(Debug, Clone)]
pub enum ScriptedEvent {
    Simple(mpv_event_id),
    StartFile(i64),
    EndFile { reason: c_int, error: c_int },
    PropertyChange { id: u64, name: String, value: Option<Value> },
    Log { prefix: String, level: String, text: String },
}

#[derive(Default)]
pub struct FakeState {
    pub properties: Map<String, Value>,
    /// Status returned by get/set for specific names
    pub failures: HashMap<String, c_int>,
    /// Status returned by successful property writes
    pub set_status: c_int,
    pub init_status: c_int,
    pub command_status: c_int,
    pub command_reply: Value,
    pub calls: Vec<Call>,
    /// Format tag of the last node passed to set_property
    pub last_set_format: Option<mpv_format>,
    /// Format tags of the elements of the last command array
    pub last_command_formats: Vec<mpv_format>,
    pub outstanding_replies: usize,
    pub events: VecDeque<ScriptedEvent>,
}

/// Wakeup callback registration, shareable with other threads
#[derive(Default)]
pub struct WakeupSlot {
    registration: Mutex<Option<(unsafe extern "C" fn(*mut c_void), usize)>>,
}

impl WakeupSlot {
    pub fn is_registered(&self) -> bool {
        self.registration.lock().is_some()
    }

    /// Invoke the callback the way libmpv does, holding the registration lock
    pub fn fire(&self) -> bool {
        let registration = self.registration.lock();
        match *registration {
            Some((callback, ctx)) => {
                unsafe { callback(ctx as *mut c_void) };
                true
            }
            None => false,
        }
    }
}

struct StagedEvent {
    event: mpv_event,
    _strings: Vec<CString>,
    _node: Option<Box<NativeNode>>,
    _payload: Option<Box<dyn Any>>,
}

impl StagedEvent {
    fn none() -> Self {
        Self::simple(MPV_EVENT_NONE)
    }

    fn simple(event_id: mpv_event_id) -> Self {
        Self {
            event: mpv_event {
                event_id,
                error: 0,
                reply_userdata: 0,
                data: ptr::null_mut(),
            },
            _strings: Vec::new(),
            _node: None,
            _payload: None,
        }
    }

    fn with_payload<T: Any>(mut self, payload: T) -> Self {
        let mut boxed = Box::new(payload);
        self.event.data = ptr::from_mut(&mut *boxed).cast();
        self._payload = Some(boxed);
        self
    }

    fn stage(scripted: ScriptedEvent) -> Self {
        match scripted {
            ScriptedEvent::Simple(id) => Self::simple(id),
            ScriptedEvent::StartFile(entry) => {
                Self::simple(MPV_EVENT_START_FILE).with_payload(mpv_event_start_file {
                    playlist_entry_id: entry,
                })
            }
            ScriptedEvent::EndFile { reason, error } => {
                Self::simple(MPV_EVENT_END_FILE).with_payload(mpv_event_end_file {
                    reason,
                    error,
                    playlist_entry_id: 1,
                    playlist_insert_id: 0,
                    playlist_insert_num_entries: 0,
                })
            }
            ScriptedEvent::PropertyChange { id, name, value } => {
                let name = CString::new(name).unwrap();
                let node = value.map(|value| Box::new(encode(&value)));
                let prop = mpv_event_property {
                    name: name.as_ptr(),
                    format: if node.is_some() {
                        MPV_FORMAT_NODE
                    } else {
                        MPV_FORMAT_NONE
                    },
                    data: node
                        .as_ref()
                        .map_or(ptr::null_mut(), |node| {
                            ptr::from_ref(node.as_raw()).cast_mut().cast()
                        }),
                };
                let mut staged = Self::simple(MPV_EVENT_PROPERTY_CHANGE).with_payload(prop);
                staged.event.reply_userdata = id;
                staged._strings.push(name);
                staged._node = node;
                staged
            }
            ScriptedEvent::Log {
                prefix,
                level,
                text,
            } => {
                let prefix = CString::new(prefix).unwrap();
                let level = CString::new(level).unwrap();
                let text = CString::new(text).unwrap();
                let msg = mpv_event_log_message {
                    prefix: prefix.as_ptr(),
                    level: level.as_ptr(),
                    text: text.as_ptr(),
                    log_level: 0,
                };
                let mut staged = Self::simple(MPV_EVENT_LOG_MESSAGE).with_payload(msg);
                staged._strings.extend([prefix, level, text]);
                staged
            }
        }
    }
}

#[derive(Default)]
pub struct FakeEngine {
    pub state: RefCell<FakeState>,
    wakeup: Arc<WakeupSlot>,
    current_event: RefCell<Option<Box<StagedEvent>>>,
}

impl FakeEngine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_property(self, name: &str, value: Value) -> Self {
        self.state
            .borrow_mut()
            .properties
            .insert(name.to_string(), value);
        self
    }

    pub fn with_failure(self, name: &str, status: c_int) -> Self {
        self.state
            .borrow_mut()
            .failures
            .insert(name.to_string(), status);
        self
    }

    pub fn wakeup_slot(&self) -> Arc<WakeupSlot> {
        Arc::clone(&self.wakeup)
    }

    pub fn calls(&self) -> Vec<Call> {
        self.state.borrow().calls.clone()
    }

    pub fn outstanding_replies(&self) -> usize {
        self.state.borrow().outstanding_replies
    }

    /// Queue an event without signalling
    pub fn queue_event(&self, event: ScriptedEvent) {
        self.state.borrow_mut().events.push_back(event);
    }

    /// Queue an event and signal the owner, as libmpv does
    pub fn push_event(&self, event: ScriptedEvent) {
        self.queue_event(event);
        self.wakeup.fire();
    }

    fn record(&self, call: Call) {
        self.state.borrow_mut().calls.push(call);
    }

    fn hand_out(&self, value: &Value, out: &mut mpv_node) {
        *out = encode(value).into_raw();
        self.state.borrow_mut().outstanding_replies += 1;
    }
}

fn name_of(name: &CStr) -> String {
    name.to_string_lossy().into_owned()
}

impl NativeEngine for FakeEngine {
    fn initialize(&self) -> c_int {
        self.record(Call::Initialize);
        self.state.borrow().init_status
    }

    fn set_option(&self, name: &CStr, value: &mpv_node) -> c_int {
        let value = unsafe { decode_raw(value) };
        self.record(Call::SetOption(name_of(name), value));
        0
    }

    fn get_property(&self, name: &CStr, out: &mut mpv_node) -> c_int {
        let name = name_of(name);
        self.record(Call::GetProperty(name.clone()));
        if let Some(&status) = self.state.borrow().failures.get(&name) {
            return status;
        }
        let value = self.state.borrow().properties.get(&name).cloned();
        match value {
            Some(value) => {
                self.hand_out(&value, out);
                0
            }
            None => MPV_ERROR_PROPERTY_NOT_FOUND,
        }
    }

    fn set_property(&self, name: &CStr, value: &mpv_node) -> c_int {
        let name = name_of(name);
        let decoded = unsafe { decode_raw(value) };
        self.record(Call::SetProperty(name.clone(), decoded.clone()));

        let mut state = self.state.borrow_mut();
        state.last_set_format = Some(value.format);
        if let Some(&status) = state.failures.get(&name) {
            return status;
        }
        state.properties.insert(name, decoded);
        state.set_status
    }

    fn command(&self, args: &mpv_node, result: &mut mpv_node) -> c_int {
        let decoded = unsafe { decode_raw(args) };
        self.record(Call::Command(decoded));

        let formats = if args.format == MPV_FORMAT_NODE_ARRAY {
            let list = unsafe { &*args.u.list };
            (0..list.num as usize)
                .map(|i| unsafe { (*list.values.add(i)).format })
                .collect()
        } else {
            Vec::new()
        };
        self.state.borrow_mut().last_command_formats = formats;

        let status = self.state.borrow().command_status;
        if status < 0 {
            return status;
        }
        let reply = self.state.borrow().command_reply.clone();
        self.hand_out(&reply, result);
        status
    }

    unsafe fn free_node_contents(&self, node: &mut mpv_node) {
        drop(unsafe { NativeNode::from_raw(*node) });
        *node = mpv_node::none();
        self.state.borrow_mut().outstanding_replies -= 1;
    }

    fn observe_property(&self, id: u64, name: &CStr) -> c_int {
        let name = name_of(name);
        self.record(Call::Observe(id, name.clone()));
        self.state
            .borrow()
            .failures
            .get(&name)
            .copied()
            .unwrap_or(0)
    }

    fn unobserve_property(&self, id: u64) -> c_int {
        self.record(Call::Unobserve(id));
        let observed = self
            .state
            .borrow()
            .calls
            .iter()
            .any(|call| matches!(call, Call::Observe(observed, _) if *observed == id));
        if observed { 0 } else { MPV_ERROR_INVALID_PARAMETER }
    }

    fn request_log_messages(&self, min_level: &CStr) -> c_int {
        self.record(Call::RequestLog(name_of(min_level)));
        0
    }

    unsafe fn set_wakeup_callback(&self, callback: mpv_wakeup_cb, ctx: *mut c_void) {
        *self.wakeup.registration.lock() = callback.map(|callback| (callback, ctx as usize));
    }

    fn wait_event(&self, _timeout: f64) -> *const mpv_event {
        let next = self.state.borrow_mut().events.pop_front();
        let staged = Box::new(next.map_or_else(StagedEvent::none, StagedEvent::stage));
        let mut current = self.current_event.borrow_mut();
        let staged = current.insert(staged);
        ptr::from_ref(&staged.event)
    }
}
