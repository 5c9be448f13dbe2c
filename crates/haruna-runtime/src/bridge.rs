//! Synchronous property, option and command calls
//!
//! Every call follows the same discipline: encode the argument into a tree
//! owned by this side, hand the engine a borrowed pointer, release the tree
//! when the call returns. Trees the engine fills in are decoded and handed
//! straight back to the engine's own free routine.

use std::cell::Cell;
use std::ffi::CString;
use std::marker::PhantomData;
use std::os::raw::c_int;

use haruna_mpv_core::haruna_mpv_sys::mpv_node;
use haruna_mpv_core::string::to_cstring;
use haruna_mpv_core::{decode_raw, encode};
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::{debug, trace};

use crate::config::BridgeConfig;
use crate::engine::{LibMpv, NativeEngine};
use crate::error::{BridgeError, BridgeResult, Operation, check};
use crate::event_pump::EventPump;

/// Value-level access to an engine handle
///
/// Callers only ever see `serde_json::Value`; node trees never escape a
/// single call. An engine failure is always an `Err`, so `Ok(Value::Null)`
/// reliably means "the property exists but has no value".
///
/// # Thread Safety
///
/// This type is `!Send` and `!Sync`. Events raised on engine threads reach
/// the owning thread through an [`EventPump`].
///
/// ```compile_fail
/// fn assert_send<T: Send>() {}
/// assert_send::<haruna_runtime::PropertyBridge<haruna_runtime::LibMpv>>();
/// ```
pub struct PropertyBridge<E: NativeEngine> {
    engine: E,
    next_observer_id: Cell<u64>,
    pub(crate) pump_attached: Cell<bool>,
    /// Marker to make this type !Send + !Sync
    _not_send: PhantomData<*mut ()>,
}

impl PropertyBridge<LibMpv> {
    /// Load libmpv and start a handle configured by `config`
    pub fn open(config: &BridgeConfig) -> BridgeResult<Self> {
        let engine = LibMpv::open(config.library.as_deref())?;
        Self::start(engine, config)
    }
}

impl<E: NativeEngine> PropertyBridge<E> {
    /// Wrap an engine that is already initialized
    pub fn new(engine: E) -> Self {
        Self {
            engine,
            next_observer_id: Cell::new(1),
            pump_attached: Cell::new(false),
            _not_send: PhantomData,
        }
    }

    /// Apply `config` to an uninitialized engine and initialize it
    ///
    /// Options go in first, in file order, then the handle is initialized,
    /// log forwarding is requested and the configured properties are observed.
    pub fn start(engine: E, config: &BridgeConfig) -> BridgeResult<Self> {
        let bridge = Self::new(engine);

        for (name, value) in config.engine_options() {
            debug!(option = name, %value, "applying option");
            bridge.set_option(name, &value)?;
        }

        let status = bridge.engine.initialize();
        if status < 0 {
            return Err(BridgeError::Init {
                op: Operation::Initialize,
                message: bridge.engine.error_string(status),
            });
        }

        if let Some(level) = &config.log_level {
            bridge.request_log_messages(level)?;
        }
        for name in &config.observe {
            bridge.observe_property(name)?;
        }

        Ok(bridge)
    }

    /// The wrapped engine
    pub fn engine(&self) -> &E {
        &self.engine
    }

    /// Read a property as a dynamic value
    pub fn get_property(&self, name: &str) -> BridgeResult<Value> {
        let c_name = c_name(name)?;
        let mut reply = mpv_node::none();
        let status = self.engine.get_property(&c_name, &mut reply);
        trace!(property = name, status, "get property");
        check(status, Operation::GetProperty, name)?;
        Ok(self.take_reply(reply))
    }

    /// Read a property and deserialize it into `T`
    pub fn get_property_as<T: DeserializeOwned>(&self, name: &str) -> BridgeResult<T> {
        let value = self.get_property(name)?;
        serde_json::from_value(value).map_err(|source| BridgeError::Deserialize {
            name: name.to_string(),
            source,
        })
    }

    /// Write a property, returning the engine's non-negative status
    ///
    /// Values the encoder cannot represent are sent as a `None` node and the
    /// engine decides whether to accept them.
    pub fn set_property(&self, name: &str, value: &Value) -> BridgeResult<c_int> {
        let c_name = c_name(name)?;
        let node = encode(value);
        let status = self.engine.set_property(&c_name, node.as_raw());
        trace!(property = name, status, "set property");
        check(status, Operation::SetProperty, name)
    }

    /// Set an option; mostly useful before initialization
    pub fn set_option(&self, name: &str, value: &Value) -> BridgeResult<c_int> {
        let c_name = c_name(name)?;
        let node = encode(value);
        let status = self.engine.set_option(&c_name, node.as_raw());
        trace!(option = name, status, "set option");
        check(status, Operation::SetOption, name)
    }

    /// Run a command given as an argument array (or a named-argument map)
    ///
    /// ```no_run
    /// # use haruna_runtime::{BridgeConfig, PropertyBridge};
    /// # use serde_json::json;
    /// let bridge = PropertyBridge::open(&BridgeConfig::default()).unwrap();
    /// bridge.command(&json!(["loadfile", "/tmp/a.mp4"])).unwrap();
    /// ```
    pub fn command(&self, args: &Value) -> BridgeResult<Value> {
        let node = encode(args);
        let mut reply = mpv_node::none();
        let status = self.engine.command(node.as_raw(), &mut reply);
        drop(node);

        let target = command_name(args);
        trace!(command = target, status, "command");
        check(status, Operation::Command, target)?;
        Ok(self.take_reply(reply))
    }

    /// Observe a property; changes arrive as events tagged with the returned id
    pub fn observe_property(&self, name: &str) -> BridgeResult<u64> {
        let c_name = c_name(name)?;
        let id = self.next_observer_id.get();
        check(
            self.engine.observe_property(id, &c_name),
            Operation::ObserveProperty,
            name,
        )?;
        self.next_observer_id.set(id + 1);
        debug!(property = name, id, "observing property");
        Ok(id)
    }

    pub fn unobserve_property(&self, id: u64) -> BridgeResult<()> {
        let status = self.engine.unobserve_property(id);
        check(status, Operation::UnobserveProperty, &id.to_string())?;
        Ok(())
    }

    /// Forward engine log lines at `min_level` or above as events
    ///
    /// Levels are libmpv's: `no`, `fatal`, `error`, `warn`, `info`, `v`,
    /// `debug`, `trace`.
    pub fn request_log_messages(&self, min_level: &str) -> BridgeResult<()> {
        let c_level = c_name(min_level)?;
        check(
            self.engine.request_log_messages(&c_level),
            Operation::RequestLogMessages,
            min_level,
        )?;
        Ok(())
    }

    /// Route engine wakeups to this thread
    ///
    /// Only one pump can be attached at a time; the callback is removed when
    /// the pump is dropped.
    pub fn attach_event_pump(&self) -> BridgeResult<EventPump<'_, E>> {
        if self.pump_attached.replace(true) {
            return Err(BridgeError::PumpAttached);
        }
        Ok(EventPump::attach(self))
    }

    /// Decode an engine-filled tree and release it on every exit path
    fn take_reply(&self, reply: mpv_node) -> Value {
        let reply = scopeguard::guard(reply, |mut node| {
            // SAFETY: the tree was filled in by a successful call on this engine
            unsafe { self.engine.free_node_contents(&mut node) }
        });
        // SAFETY: engine replies are well-formed trees
        unsafe { decode_raw(&reply) }
    }
}

fn c_name(name: &str) -> BridgeResult<CString> {
    to_cstring(name).map_err(|source| BridgeError::InvalidName {
        name: name.to_string(),
        source,
    })
}

/// Name used in errors and logs for a command argument
fn command_name(args: &Value) -> &str {
    match args {
        Value::Array(items) => items.first().and_then(Value::as_str),
        Value::Object(map) => map.get("name").and_then(Value::as_str),
        _ => None,
    }
    .unwrap_or("")
}
