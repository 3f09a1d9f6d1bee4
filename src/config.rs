//! Bridge configuration
//!
//! Defaults match a stock device: the connectivity module's pinned map and
//! serialized mutations. Hosts can override them from JSON or the
//! environment.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::bpf::DEFAULT_UID_OWNER_MAP_PATH;

/// Environment variable overriding [`BridgeConfig::map_path`].
pub const ENV_MAP_PATH: &str = "UID_OWNER_MAP_PATH";
/// Environment variable overriding [`BridgeConfig::serialize_mutations`].
pub const ENV_SERIALIZE: &str = "UID_OWNER_SERIALIZE";
/// Environment variable overriding [`BridgeConfig::log_format`].
pub const ENV_LOG_FORMAT: &str = "UID_OWNER_LOG_FORMAT";

/// Output format for [`init_logging`](crate::logging::init_logging).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

impl LogFormat {
    fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "pretty" | "text" => Some(LogFormat::Pretty),
            "json" => Some(LogFormat::Json),
            _ => None,
        }
    }
}

/// Configuration for the process-wide bridge
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BridgeConfig {
    /// Pinned uid owner map used when the caller passes no path
    pub map_path: PathBuf,
    /// Serialize lookup/write sequences within this process
    pub serialize_mutations: bool,
    /// Log output format
    pub log_format: LogFormat,
}

impl Default for BridgeConfig {
    fn default() -> Self {
        Self {
            map_path: PathBuf::from(DEFAULT_UID_OWNER_MAP_PATH),
            serialize_mutations: true,
            log_format: LogFormat::Pretty,
        }
    }
}

impl BridgeConfig {
    /// Parse a JSON document. Missing fields keep their defaults.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Defaults overridden by `UID_OWNER_*` environment variables.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Defaults overridden by whatever `lookup` returns for each variable.
    /// Unparseable values are ignored.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(path) = lookup(ENV_MAP_PATH).filter(|p| !p.is_empty()) {
            config.map_path = PathBuf::from(path);
        }
        if let Some(serialize) = lookup(ENV_SERIALIZE).and_then(|v| parse_bool(&v)) {
            config.serialize_mutations = serialize;
        }
        if let Some(format) = lookup(ENV_LOG_FORMAT).and_then(|v| LogFormat::parse(&v)) {
            config.log_format = format;
        }

        config
    }
}

fn parse_bool(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}
