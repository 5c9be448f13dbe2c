//! Command command - run an engine command.

use anyhow::Result;
use clap::Args;
use haruna_runtime::{NativeEngine, PropertyBridge};
use serde_json::Value;

use super::{parse_value, print_json};

#[derive(Args)]
pub struct CommandCommand {
    /// A JSON array or object, or the command name followed by its arguments
    #[arg(required = true, num_args = 1.., allow_hyphen_values = true)]
    pub args: Vec<String>,
}

impl CommandCommand {
    pub fn run<E: NativeEngine>(self, bridge: &PropertyBridge<E>) -> Result<()> {
        let args = command_args(&self.args);
        let reply = bridge.command(&args)?;
        if !reply.is_null() {
            print_json(&reply)?;
        }
        Ok(())
    }
}

/// `'["seek", 10]'` is used as is; `seek 10 relative` becomes a string array
fn command_args(raw: &[String]) -> Value {
    if let [single] = raw {
        let parsed = parse_value(single);
        if parsed.is_array() || parsed.is_object() {
            return parsed;
        }
    }
    Value::Array(raw.iter().cloned().map(Value::String).collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn strings(args: &[&str]) -> Vec<String> {
        args.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_json_array() {
        assert_eq!(
            command_args(&strings(&[r#"["loadfile", "/tmp/a.mp4"]"#])),
            json!(["loadfile", "/tmp/a.mp4"])
        );
    }

    #[test]
    fn test_json_object() {
        assert_eq!(
            command_args(&strings(&[r#"{"name": "stop"}"#])),
            json!({"name": "stop"})
        );
    }

    #[test]
    fn test_word_list() {
        assert_eq!(
            command_args(&strings(&["seek", "-10", "relative"])),
            json!(["seek", "-10", "relative"])
        );
        assert_eq!(command_args(&strings(&["stop"])), json!(["stop"]));
    }
}
