//! haruna-runtime - libmpv property, command and event bridge for Haruna.
//!
//! This crate sits between the player, which speaks `serde_json::Value`, and
//! a libmpv handle, which speaks `mpv_node`. It provides:
//!
//! - **Property access**: `get_property`, `set_property`, `set_option`
//!   and `command`, with engine failures kept apart from `null` results
//! - **Event delivery**: engine wakeups are marshalled onto the owning thread
//!   and classified into [`PlayerEvent`]s
//! - **Configuration**: engine options, log level and observed properties
//!   from `haruna.toml`
//!
//! # Example
//!
//! ```no_run
//! use haruna_runtime::{BridgeConfig, PlayerEvent, PropertyBridge};
//! use serde_json::json;
//! use std::time::Duration;
//!
//! let config = BridgeConfig::discover(".").unwrap();
//! let bridge = PropertyBridge::open(&config).unwrap();
//!
//! bridge.set_property("volume", &json!(50)).unwrap();
//! bridge.command(&json!(["loadfile", "/tmp/a.mp4"])).unwrap();
//!
//! let pump = bridge.attach_event_pump().unwrap();
//! pump.wait(Duration::from_secs(1), |event| {
//!     if let PlayerEvent::FileLoaded = event {
//!         println!("duration: {}", bridge.get_property("duration").unwrap());
//!     }
//! });
//! ```
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                    PropertyBridge<E>                         │
//! │  get/set property, set option, command, observe             │
//! │         │ encode / decode (haruna-mpv-core)                 │
//! │         ↓                                                   │
//! │  NativeEngine ── LibMpv (libloading) | in-memory engine     │
//! └─────────────────────────────────────────────────────────────┘
//!                           ↑ wakeup tokens (crossbeam-channel)
//! ┌─────────────────────────────────────────────────────────────┐
//! │                    EventPump                                 │
//! │  - drains mpv_wait_event on the owning thread                │
//! │  - classifies into PlayerEvent, forwards logs to tracing     │
//! └─────────────────────────────────────────────────────────────┘
//! ```

pub mod bridge;
pub mod config;
pub mod engine;
pub mod error;
pub mod event_pump;
pub mod events;

pub use bridge::PropertyBridge;
pub use config::{BridgeConfig, CONFIG_FILE_NAMES, find_config};
pub use engine::{LibMpv, NativeEngine};
pub use error::{BridgeError, BridgeResult, Operation};
pub use event_pump::{EventPump, Waker};
pub use events::{EndFileReason, LogMessage, PlayerEvent};

// Re-export the node layer for engine implementations
pub use haruna_mpv_core;
