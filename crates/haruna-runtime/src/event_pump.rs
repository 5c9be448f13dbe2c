//! Delivery of engine events to the owning thread
//!
//! libmpv invokes the wakeup callback on its own threads whenever an event
//! is queued. The callback only pushes a token onto a channel. The thread
//! that owns the bridge receives the tokens in order and, for each, drains
//! every queued engine event and hands it to a handler.
//!
//! ```text
//!  engine thread                      owning thread
//! ───────────────                    ───────────────────────────────
//!  wakeup_trampoline ──token──▶ Receiver ──▶ EventPump::dispatch
//!                                              │ wait_event(0) until NONE
//!                                              ▼
//!                                          PlayerEvent ──▶ handler
//! ```

use std::ffi::c_void;
use std::ptr::{self, NonNull};
use std::time::Duration;

use crossbeam_channel::{Receiver, Sender, unbounded};
use tracing::{debug, debug_span, error, info, trace, warn};

use crate::bridge::PropertyBridge;
use crate::engine::NativeEngine;
use crate::events::{LogMessage, PlayerEvent};

/// Wakeup callback installed into the engine
///
/// # Safety
/// `ctx` must point to the `Sender` owned by a live [`EventPump`].
unsafe extern "C" fn wakeup_trampoline(ctx: *mut c_void) {
    // SAFETY: the pump keeps the sender alive until the callback is removed
    let sender = unsafe { &*ctx.cast::<Sender<()>>() };
    // a disconnected receiver means the pump is being torn down
    let _ = sender.send(());
}

/// Cloneable handle that wakes the owning thread from any thread
#[derive(Debug, Clone)]
pub struct Waker {
    sender: Sender<()>,
}

impl Waker {
    /// Queue a wakeup token; a no-op once the pump is gone
    pub fn wake(&self) {
        let _ = self.sender.send(());
    }
}

/// Owner-thread side of the wakeup channel
///
/// Created by [`PropertyBridge::attach_event_pump`]. Dropping it removes the
/// wakeup callback from the engine.
pub struct EventPump<'a, E: NativeEngine> {
    bridge: &'a PropertyBridge<E>,
    wakeups: Receiver<()>,
    /// Leaked sender handed to the engine as the callback context
    sender: NonNull<Sender<()>>,
}

impl<'a, E: NativeEngine> EventPump<'a, E> {
    pub(crate) fn attach(bridge: &'a PropertyBridge<E>) -> Self {
        let (tx, wakeups) = unbounded();
        let sender = NonNull::from(Box::leak(Box::new(tx)));

        // SAFETY: the sender stays allocated until Drop, which removes the
        // callback before freeing it
        unsafe {
            bridge
                .engine()
                .set_wakeup_callback(Some(wakeup_trampoline), sender.as_ptr().cast())
        };
        debug!("event pump attached");

        Self {
            bridge,
            wakeups,
            sender,
        }
    }

    /// A handle other threads can use to wake this pump
    pub fn waker(&self) -> Waker {
        // SAFETY: the sender is live for the lifetime of self
        let sender = unsafe { self.sender.as_ref() }.clone();
        Waker { sender }
    }

    /// Number of wakeup tokens not yet processed
    pub fn pending(&self) -> usize {
        self.wakeups.len()
    }

    /// Process every queued wakeup without blocking
    ///
    /// Returns the number of events handed to `handler`.
    pub fn dispatch(&self, mut handler: impl FnMut(PlayerEvent)) -> usize {
        let mut dispatched = 0;
        while self.wakeups.try_recv().is_ok() {
            dispatched += self.drain(&mut handler);
        }
        dispatched
    }

    /// Block until a wakeup arrives or `timeout` elapses, then dispatch
    pub fn wait(&self, timeout: Duration, mut handler: impl FnMut(PlayerEvent)) -> usize {
        match self.wakeups.recv_timeout(timeout) {
            Ok(()) => {
                let drained = self.drain(&mut handler);
                drained + self.dispatch(handler)
            }
            Err(_) => 0,
        }
    }

    /// Drain the engine queue for one wakeup token
    fn drain(&self, handler: &mut impl FnMut(PlayerEvent)) -> usize {
        let _span = debug_span!("drain_events").entered();
        let engine = self.bridge.engine();
        let mut count = 0;

        loop {
            let raw = engine.wait_event(0.0);
            // SAFETY: the event stays valid until the next wait_event call,
            // and it is fully classified before that
            let Some(event) = (unsafe { raw.as_ref() })
                .and_then(|raw| unsafe { PlayerEvent::from_raw(raw) })
            else {
                break;
            };

            if let PlayerEvent::LogMessage(msg) = &event {
                forward_log(msg);
            }
            let shutdown = event == PlayerEvent::Shutdown;

            trace!(?event, "dispatching event");
            handler(event);
            count += 1;

            // the engine keeps reporting shutdown once it has started
            if shutdown {
                break;
            }
        }

        count
    }
}

impl<E: NativeEngine> Drop for EventPump<'_, E> {
    fn drop(&mut self) {
        // SAFETY: libmpv serializes callback invocation with
        // mpv_set_wakeup_callback, so no call is in flight once this returns
        unsafe {
            self.bridge
                .engine()
                .set_wakeup_callback(None, ptr::null_mut())
        };
        // SAFETY: leaked in attach and no longer reachable from the engine
        drop(unsafe { Box::from_raw(self.sender.as_ptr()) });
        self.bridge.pump_attached.set(false);
        debug!("event pump detached");
    }
}

/// Re-emit an engine log line through `tracing`
fn forward_log(msg: &LogMessage) {
    let prefix = msg.prefix.as_str();
    let text = msg.text.as_str();
    match msg.level.as_str() {
        "fatal" | "error" => error!(target: "mpv", prefix, "{text}"),
        "warn" => warn!(target: "mpv", prefix, "{text}"),
        "info" => info!(target: "mpv", prefix, "{text}"),
        "v" | "debug" => debug!(target: "mpv", prefix, "{text}"),
        _ => trace!(target: "mpv", prefix, "{text}"),
    }
}
