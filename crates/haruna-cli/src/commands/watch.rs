//! Watch command - print property changes and playback events.

use anyhow::Result;
use clap::Args;
use haruna_runtime::{NativeEngine, PlayerEvent, PropertyBridge};
use serde_json::json;
use std::time::{Duration, Instant};

#[derive(Args)]
pub struct WatchCommand {
    /// Properties to observe
    #[arg(required = true)]
    pub names: Vec<String>,

    /// Stop after this many seconds (0 = until the engine shuts down)
    #[arg(long, default_value_t = 0)]
    pub seconds: u64,
}

impl WatchCommand {
    pub fn run<E: NativeEngine>(self, bridge: &PropertyBridge<E>) -> Result<()> {
        let pump = bridge.attach_event_pump()?;
        for name in &self.names {
            bridge.observe_property(name)?;
        }

        let deadline = (self.seconds > 0).then(|| Instant::now() + Duration::from_secs(self.seconds));
        let mut shutdown = false;

        while !shutdown {
            let timeout = match deadline {
                Some(deadline) => match deadline.checked_duration_since(Instant::now()) {
                    Some(remaining) if !remaining.is_zero() => remaining,
                    _ => break,
                },
                None => Duration::from_secs(1),
            };

            pump.wait(timeout, |event| match event {
                PlayerEvent::PropertyChanged { name, value, .. } => {
                    println!("{}", json!({ "name": name, "value": value }));
                }
                PlayerEvent::TracksChanged { tracks, .. } => {
                    println!("{}", json!({ "name": "track-list", "value": tracks }));
                }
                PlayerEvent::Shutdown => shutdown = true,
                // forwarded to tracing by the pump
                PlayerEvent::LogMessage(_) => {}
                other => tracing::info!(event = ?other, "player event"),
            });
        }

        Ok(())
    }
}
