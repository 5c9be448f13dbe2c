//! Get command - print a property.

use anyhow::Result;
use clap::Args;
use haruna_runtime::{NativeEngine, PropertyBridge};

use super::print_json;

#[derive(Args)]
pub struct GetCommand {
    /// Property name, e.g. `volume` or `track-list`
    pub name: String,
}

impl GetCommand {
    pub fn run<E: NativeEngine>(self, bridge: &PropertyBridge<E>) -> Result<()> {
        let value = bridge.get_property(&self.name)?;
        print_json(&value)
    }
}
