//! Manager configuration with TOML file support.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use eots_types::EotsError;

/// Configuration for the EOTS manager daemon.
///
/// Can be loaded from a TOML file via [`EotsManagerConfig::from_toml_file`]
/// or built programmatically (e.g. for tests).
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct EotsManagerConfig {
    /// Directory holding the key and randomness databases.
    #[serde(default = "default_db_path")]
    pub db_path: PathBuf,

    /// LMDB map size in bytes.
    #[serde(default = "default_db_map_size")]
    pub db_map_size: usize,

    /// Address the RPC server listens on.
    #[serde(default = "default_rpc_listen_addr")]
    pub rpc_listen_addr: String,

    /// Log level filter: "trace", "debug", "info", "warn", "error".
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

// ── Serde default helpers ──────────────────────────────────────────────

fn default_db_path() -> PathBuf {
    PathBuf::from("./eots_data")
}

fn default_db_map_size() -> usize {
    eots_store_lmdb::environment::DEFAULT_MAP_SIZE
}

fn default_rpc_listen_addr() -> String {
    "127.0.0.1:15813".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

// ── Impl ───────────────────────────────────────────────────────────────

impl EotsManagerConfig {
    /// Load configuration from a TOML file.
    pub fn from_toml_file(path: &str) -> Result<Self, EotsError> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| EotsError::InvalidArgument(format!("config file: {e}")))?;
        Self::from_toml_str(&content)
    }

    /// Parse configuration from a TOML string.
    pub fn from_toml_str(s: &str) -> Result<Self, EotsError> {
        toml::from_str(s).map_err(|e| EotsError::InvalidArgument(format!("config: {e}")))
    }

    /// Serialize the configuration to a TOML string.
    pub fn to_toml_string(&self) -> String {
        toml::to_string_pretty(self).expect("EotsManagerConfig is always serializable to TOML")
    }
}

impl Default for EotsManagerConfig {
    fn default() -> Self {
        Self {
            db_path: default_db_path(),
            db_map_size: default_db_map_size(),
            rpc_listen_addr: default_rpc_listen_addr(),
            log_level: default_log_level(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_round_trips_through_toml() {
        let config = EotsManagerConfig::default();
        let toml_str = config.to_toml_string();
        let parsed = EotsManagerConfig::from_toml_str(&toml_str).expect("should parse");
        assert_eq!(parsed.rpc_listen_addr, config.rpc_listen_addr);
        assert_eq!(parsed.db_path, config.db_path);
    }

    #[test]
    fn minimal_toml_uses_defaults() {
        let config = EotsManagerConfig::from_toml_str("").expect("empty toml uses defaults");
        assert_eq!(config.rpc_listen_addr, "127.0.0.1:15813");
        assert_eq!(config.log_level, "info");
    }

    #[test]
    fn partial_toml_overrides() {
        let toml = r#"
            rpc_listen_addr = "0.0.0.0:9797"
            log_level = "debug"
        "#;
        let config = EotsManagerConfig::from_toml_str(toml).expect("should parse");
        assert_eq!(config.rpc_listen_addr, "0.0.0.0:9797");
        assert_eq!(config.log_level, "debug");
        assert_eq!(config.db_path, PathBuf::from("./eots_data")); // default
    }

    #[test]
    fn missing_file_returns_error() {
        let result = EotsManagerConfig::from_toml_file("/nonexistent/eotsd.toml");
        assert!(result.is_err());
    }
}
