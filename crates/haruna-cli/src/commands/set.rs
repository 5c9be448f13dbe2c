//! Set command - write a property.

use anyhow::Result;
use clap::Args;
use haruna_runtime::{NativeEngine, PropertyBridge};

use super::parse_value;

#[derive(Args)]
pub struct SetCommand {
    /// Property name
    pub name: String,

    /// New value as JSON; anything that is not valid JSON is sent as a string
    pub value: String,
}

impl SetCommand {
    pub fn run<E: NativeEngine>(self, bridge: &PropertyBridge<E>) -> Result<()> {
        let value = parse_value(&self.value);
        bridge.set_property(&self.name, &value)?;
        Ok(())
    }
}
