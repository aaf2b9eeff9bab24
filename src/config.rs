//! Configuration resolution
//!
//! API keys resolve with ENV → TOML priority; a warning is logged when a key
//! is present in more than one source. The history slot defaults to the
//! platform data directory.

use crate::{Result, ScanError};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

const GEMINI_KEY_ENV: &str = "BREEDSCAN_GEMINI_API_KEY";
const DOG_API_KEY_ENV: &str = "BREEDSCAN_DOG_API_KEY";

/// TOML configuration file shape
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TomlConfig {
    pub gemini_api_key: Option<String>,
    pub dog_api_key: Option<String>,
    /// Path of the durable history slot; platform data dir when unset
    pub history_file: Option<PathBuf>,
}

/// Load the TOML config from an explicit path or the platform default
///
/// A missing file is an empty config; a file that exists but does not parse
/// is a configuration error.
pub fn load_toml_config(explicit: Option<&Path>) -> Result<TomlConfig> {
    let path = match explicit {
        Some(p) => p.to_path_buf(),
        None => match default_config_path() {
            Some(p) => p,
            None => return Ok(TomlConfig::default()),
        },
    };

    if !path.exists() {
        debug!(path = %path.display(), "No config file, using defaults");
        return Ok(TomlConfig::default());
    }

    let content = std::fs::read_to_string(&path)
        .map_err(|e| ScanError::Config(format!("Read config failed: {}", e)))?;
    let config = toml::from_str(&content)
        .map_err(|e| ScanError::Config(format!("Parse config failed: {}", e)))?;

    info!(path = %path.display(), "Config loaded");
    Ok(config)
}

/// Resolve the vision inference API key from ENV → TOML
pub fn resolve_gemini_api_key(toml_config: &TomlConfig) -> Result<String> {
    resolve_key(
        GEMINI_KEY_ENV,
        toml_config.gemini_api_key.as_deref(),
        "Gemini",
        "gemini_api_key",
    )
}

/// Resolve the breed reference API key from ENV → TOML
pub fn resolve_dog_api_key(toml_config: &TomlConfig) -> Result<String> {
    resolve_key(
        DOG_API_KEY_ENV,
        toml_config.dog_api_key.as_deref(),
        "Dog API",
        "dog_api_key",
    )
}

fn resolve_key(
    env_var: &str,
    toml_key: Option<&str>,
    label: &str,
    toml_field: &str,
) -> Result<String> {
    let env_key = std::env::var(env_var).ok().filter(|k| is_valid_key(k));
    let toml_key = toml_key.filter(|k| is_valid_key(k)).map(str::to_string);

    if env_key.is_some() && toml_key.is_some() {
        warn!(
            "{} API key found in both environment and TOML. Using environment (highest priority).",
            label
        );
    }

    if let Some(key) = env_key {
        info!("{} API key loaded from environment variable", label);
        return Ok(key);
    }

    if let Some(key) = toml_key {
        info!("{} API key loaded from TOML config", label);
        return Ok(key);
    }

    Err(ScanError::Config(format!(
        "{} API key not configured. Please configure using one of:\n\
         1. Environment: {}=your-key-here\n\
         2. TOML config: ~/.config/breedscan/config.toml ({} = \"your-key\")",
        label, env_var, toml_field
    )))
}

/// Validate API key (non-empty, non-whitespace)
pub fn is_valid_key(key: &str) -> bool {
    !key.trim().is_empty()
}

/// History slot path: configured value or the platform data directory
pub fn resolve_history_path(toml_config: &TomlConfig) -> PathBuf {
    toml_config
        .history_file
        .clone()
        .unwrap_or_else(default_history_path)
}

fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("breedscan").join("config.toml"))
}

fn default_history_path() -> PathBuf {
    dirs::data_local_dir()
        .map(|d| d.join("breedscan").join("dog_scan_history.json"))
        .unwrap_or_else(|| PathBuf::from("./breedscan_data/dog_scan_history.json"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    #[test]
    fn test_is_valid_key() {
        assert!(is_valid_key("live_abc123"));
        assert!(!is_valid_key(""));
        assert!(!is_valid_key("   "));
    }

    #[test]
    #[serial]
    fn env_key_takes_priority_over_toml() {
        std::env::set_var(GEMINI_KEY_ENV, "env-key");
        let config = TomlConfig {
            gemini_api_key: Some("toml-key".to_string()),
            ..Default::default()
        };
        let key = resolve_gemini_api_key(&config).unwrap();
        std::env::remove_var(GEMINI_KEY_ENV);
        assert_eq!(key, "env-key");
    }

    #[test]
    #[serial]
    fn toml_key_used_when_env_absent() {
        std::env::remove_var(DOG_API_KEY_ENV);
        let config = TomlConfig {
            dog_api_key: Some("toml-key".to_string()),
            ..Default::default()
        };
        assert_eq!(resolve_dog_api_key(&config).unwrap(), "toml-key");
    }

    #[test]
    #[serial]
    fn missing_key_is_config_error() {
        std::env::remove_var(DOG_API_KEY_ENV);
        let result = resolve_dog_api_key(&TomlConfig::default());
        assert!(matches!(result, Err(ScanError::Config(_))));
    }

    #[test]
    #[serial]
    fn blank_env_key_falls_through_to_toml() {
        std::env::set_var(GEMINI_KEY_ENV, "  ");
        let config = TomlConfig {
            gemini_api_key: Some("toml-key".to_string()),
            ..Default::default()
        };
        let key = resolve_gemini_api_key(&config).unwrap();
        std::env::remove_var(GEMINI_KEY_ENV);
        assert_eq!(key, "toml-key");
    }

    #[test]
    fn history_path_prefers_configured_value() {
        let config = TomlConfig {
            history_file: Some(PathBuf::from("/tmp/history.json")),
            ..Default::default()
        };
        assert_eq!(
            resolve_history_path(&config),
            PathBuf::from("/tmp/history.json")
        );
    }
}
