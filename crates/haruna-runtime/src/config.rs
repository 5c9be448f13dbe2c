//! Bridge configuration loaded from `haruna.toml`.
//!
//! ```toml
//! library = "/usr/lib/libmpv.so.2"
//! log-level = "warn"
//! observe = ["pause", "time-pos", "track-list"]
//!
//! [options]
//! vo = "null"
//! volume = 50
//! ytdl = false
//! ```
//!
//! Entries under `[options]` are applied with `mpv_set_option` before the
//! handle is initialized. Their TOML values go through the same encoder as
//! property writes, so tables and arrays become node maps and arrays.

use std::path::{Path, PathBuf};

use serde::Deserialize;
use serde_json::Value;

use crate::error::{BridgeError, BridgeResult};

/// File names searched for, in order, in each directory
pub const CONFIG_FILE_NAMES: &[&str] = &["haruna.toml", ".harunarc.toml"];

/// Settings for opening and driving a libmpv handle
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "kebab-case", deny_unknown_fields)]
pub struct BridgeConfig {
    /// Explicit libmpv path; the platform's default names are tried when unset.
    /// Relative paths are resolved against the config file's directory.
    pub library: Option<PathBuf>,

    /// Minimum engine log level forwarded to `tracing` ("fatal" ... "trace")
    pub log_level: Option<String>,

    /// Properties observed as soon as the bridge starts
    pub observe: Vec<String>,

    /// Engine options applied before initialization, in file order
    pub options: toml::Table,

    /// File this configuration was read from
    #[serde(skip)]
    pub source: Option<PathBuf>,
}

impl BridgeConfig {
    /// Parse configuration from TOML text
    pub fn parse(content: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(content)
    }

    /// Load configuration from a file
    pub fn from_file(path: impl AsRef<Path>) -> BridgeResult<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|source| BridgeError::ConfigIo {
            path: path.to_path_buf(),
            source,
        })?;
        let mut config = Self::parse(&content).map_err(|source| BridgeError::ConfigParse {
            path: path.to_path_buf(),
            source,
        })?;

        if let (Some(library), Some(dir)) = (&config.library, path.parent()) {
            if library.is_relative() && !dir.as_os_str().is_empty() {
                config.library = Some(dir.join(library));
            }
        }
        config.source = Some(path.to_path_buf());

        tracing::debug!(path = %path.display(), "loaded bridge config");
        Ok(config)
    }

    /// Load configuration by walking up from `start_dir`
    ///
    /// Returns the defaults when no config file is found.
    pub fn discover(start_dir: impl AsRef<Path>) -> BridgeResult<Self> {
        match find_config(start_dir) {
            Some(path) => Self::from_file(path),
            None => Ok(Self::default()),
        }
    }

    /// Load configuration, preferring an explicit path over discovery
    pub fn load(path: Option<&Path>, start_dir: impl AsRef<Path>) -> BridgeResult<Self> {
        match path {
            Some(path) => Self::from_file(path),
            None => Self::discover(start_dir),
        }
    }

    /// Engine options converted to dynamic values, in file order
    pub fn engine_options(&self) -> Vec<(&str, Value)> {
        self.options
            .iter()
            .map(|(name, value)| (name.as_str(), option_value(value)))
            .collect()
    }
}

/// Datetimes have no node form and are passed as their TOML text
fn option_value(value: &toml::Value) -> Value {
    match value {
        toml::Value::String(s) => Value::String(s.clone()),
        toml::Value::Integer(n) => Value::from(*n),
        toml::Value::Float(n) => Value::from(*n),
        toml::Value::Boolean(b) => Value::Bool(*b),
        toml::Value::Datetime(dt) => Value::String(dt.to_string()),
        toml::Value::Array(items) => Value::Array(items.iter().map(option_value).collect()),
        toml::Value::Table(table) => Value::Object(
            table
                .iter()
                .map(|(key, value)| (key.clone(), option_value(value)))
                .collect(),
        ),
    }
}

/// Search `start_dir` and its ancestors for a config file
///
/// A relative `start_dir` is resolved against the current directory first.
pub fn find_config(start_dir: impl AsRef<Path>) -> Option<PathBuf> {
    let start_dir = start_dir.as_ref();
    let mut current = std::path::absolute(start_dir).unwrap_or_else(|_| start_dir.to_path_buf());

    loop {
        for name in CONFIG_FILE_NAMES {
            let path = current.join(name);
            if path.is_file() {
                return Some(path);
            }
        }

        if !current.pop() {
            return None;
        }
    }
}
