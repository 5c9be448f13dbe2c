//! CLI subcommands

mod command;
mod get;
mod set;
mod watch;

pub use command::CommandCommand;
pub use get::GetCommand;
pub use set::SetCommand;
pub use watch::WatchCommand;

use serde_json::Value;

/// Parse a command-line argument as JSON, falling back to a plain string
///
/// `50` and `true` keep their types, while `yes` or `/tmp/a.mp4` are taken
/// verbatim.
pub(crate) fn parse_value(raw: &str) -> Value {
    serde_json::from_str(raw).unwrap_or_else(|_| Value::String(raw.to_string()))
}

pub(crate) fn print_json(value: &Value) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
