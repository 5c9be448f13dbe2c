use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use haruna_runtime::{BridgeConfig, LibMpv, PropertyBridge};
use std::path::PathBuf;
use tracing_subscriber::filter::EnvFilter;

mod commands;

use commands::{CommandCommand, GetCommand, SetCommand, WatchCommand};

#[derive(Parser)]
#[command(name = "haruna-ctl", version, about = "Drive a libmpv handle from the command line")]
struct Cli {
    /// Config file (defaults to haruna.toml or .harunarc.toml found upwards)
    #[arg(long, global = true, value_name = "PATH")]
    config: Option<PathBuf>,

    /// libmpv shared library to load instead of the configured one
    #[arg(long, global = true, value_name = "PATH")]
    library: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print a property as JSON
    Get(GetCommand),
    /// Set a property from a JSON value
    Set(SetCommand),
    /// Run a command and print its result
    Command(CommandCommand),
    /// Observe properties and print their changes
    Watch(WatchCommand),
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("warn".parse()?))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let bridge = open_bridge(cli.config, cli.library)?;

    match cli.command {
        Commands::Get(cmd) => cmd.run(&bridge),
        Commands::Set(cmd) => cmd.run(&bridge),
        Commands::Command(cmd) => cmd.run(&bridge),
        Commands::Watch(cmd) => cmd.run(&bridge),
    }
}

fn open_bridge(config: Option<PathBuf>, library: Option<PathBuf>) -> Result<PropertyBridge<LibMpv>> {
    let cwd = std::env::current_dir()?;
    let mut config = BridgeConfig::load(config.as_deref(), &cwd)?;
    if library.is_some() {
        config.library = library;
    }
    if let Some(source) = &config.source {
        tracing::debug!(path = %source.display(), "using config");
    }

    PropertyBridge::open(&config).context("failed to start mpv")
}
