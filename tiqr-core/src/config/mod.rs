//! Configuration module
//!
//! Handles loading and saving client configuration from TOML files in
//! the user's configuration directory.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::{ConfigError, Result, TiqrError};

/// Highest challenge protocol version this client implements
pub const SUPPORTED_PROTOCOL_VERSION: u32 = 2;

/// Client configuration structure
///
/// Contains all non-sensitive client parameters. Sensitive data like
/// identity secrets are stored separately in the vault.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientConfig {
    /// Accept challenges declaring a newer protocol version than this
    /// client implements
    pub protocol_compatibility_mode: bool,

    /// Request timeout in seconds for provider calls
    pub request_timeout_secs: u64,

    /// Notification transport advertised to providers (e.g. "GCM")
    pub notification_type: String,
}

impl ClientConfig {
    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        if self.request_timeout_secs == 0 {
            return Err(TiqrError::Config(ConfigError::ValidationError {
                message: "Request timeout cannot be zero".to_string(),
            }));
        }

        if self.notification_type.is_empty() {
            return Err(TiqrError::Config(ConfigError::ValidationError {
                message: "Notification type cannot be empty".to_string(),
            }));
        }

        Ok(())
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            protocol_compatibility_mode: true,
            request_timeout_secs: 10,
            notification_type: "GCM".to_string(),
        }
    }
}

/// Default configuration file name
const CONFIG_FILE_NAME: &str = "config.toml";

/// Get the configuration directory
///
/// Returns ~/.config/tiqr, or TIQR_CONFIG_DIR if set (tests use the
/// override to avoid touching the real home directory).
pub fn config_dir() -> Result<PathBuf> {
    if let Ok(config_dir) = std::env::var("TIQR_CONFIG_DIR") {
        return Ok(PathBuf::from(config_dir));
    }

    let home = std::env::var("HOME").map_err(|_| {
        TiqrError::Config(ConfigError::IoError {
            message: "HOME environment variable not set".to_string(),
        })
    })?;

    Ok(PathBuf::from(home).join(".config").join("tiqr"))
}

/// Get the default configuration file path
pub fn config_path() -> Result<PathBuf> {
    Ok(config_dir()?.join(CONFIG_FILE_NAME))
}

/// Check if a configuration file exists
pub fn config_exists() -> Result<bool> {
    Ok(config_path()?.exists())
}

/// Load configuration from the default TOML file
pub fn load_config() -> Result<ClientConfig> {
    let path = config_path()?;
    load_config_from_path(&path)
}

/// Load configuration from a specific TOML file
pub fn load_config_from_path<P: AsRef<Path>>(path: P) -> Result<ClientConfig> {
    let contents = std::fs::read_to_string(&path).map_err(|e| match e.kind() {
        std::io::ErrorKind::NotFound => TiqrError::Config(ConfigError::LoadFailed {
            path: path.as_ref().to_string_lossy().to_string(),
        }),
        _ => TiqrError::Config(ConfigError::IoError {
            message: format!("Failed to read config file: {}", e),
        }),
    })?;

    let config: ClientConfig = toml::from_str(&contents)?;
    config.validate()?;

    Ok(config)
}

/// Save configuration to the default TOML file
pub fn save_config(config: &ClientConfig) -> Result<()> {
    let path = config_path()?;
    save_config_to_path(config, &path)
}

/// Save configuration to a specific TOML file
pub fn save_config_to_path<P: AsRef<Path>>(config: &ClientConfig, path: P) -> Result<()> {
    config.validate()?;

    if let Some(parent) = path.as_ref().parent() {
        std::fs::create_dir_all(parent).map_err(|e| {
            TiqrError::Config(ConfigError::IoError {
                message: format!("Failed to create config directory: {}", e),
            })
        })?;
    }

    let contents = toml::to_string_pretty(config)?;

    std::fs::write(&path, contents).map_err(|_| {
        TiqrError::Config(ConfigError::SaveFailed {
            path: path.as_ref().to_string_lossy().to_string(),
        })
    })?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_config_roundtrip() {
        let temp_dir = tempdir().unwrap();
        let config_path = temp_dir.path().join("test_config.toml");

        let original = ClientConfig {
            protocol_compatibility_mode: false,
            request_timeout_secs: 30,
            notification_type: "APNS".to_string(),
        };

        save_config_to_path(&original, &config_path).unwrap();
        let loaded = load_config_from_path(&config_path).unwrap();

        assert_eq!(original, loaded);
    }

    #[test]
    fn test_load_missing_config() {
        let temp_dir = tempdir().unwrap();
        let result = load_config_from_path(temp_dir.path().join("missing.toml"));

        assert!(matches!(
            result,
            Err(TiqrError::Config(ConfigError::LoadFailed { .. }))
        ));
    }

    #[test]
    fn test_invalid_config_validation() {
        let invalid_configs = vec![
            ClientConfig {
                request_timeout_secs: 0,
                ..ClientConfig::default()
            },
            ClientConfig {
                notification_type: String::new(),
                ..ClientConfig::default()
            },
        ];

        for config in invalid_configs {
            assert!(config.validate().is_err());
        }
    }
}
