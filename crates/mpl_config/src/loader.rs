//! Configuration file loading and validation.

use crate::error::ConfigError;
use crate::types::{GlobalConfig, LocalConfig};
use std::path::Path;

/// Loads and validates a global placement configuration file.
pub fn load_global_config(path: &Path) -> Result<GlobalConfig, ConfigError> {
    let content = std::fs::read_to_string(path)?;
    load_global_config_from_str(&content)
}

/// Parses and validates a global configuration from a string.
///
/// Useful for testing without filesystem dependencies.
pub fn load_global_config_from_str(content: &str) -> Result<GlobalConfig, ConfigError> {
    let config: GlobalConfig =
        toml::from_str(content).map_err(|e| ConfigError::Parse(e.to_string()))?;
    validate_global(&config)?;
    Ok(config)
}

/// Loads and validates a local (per-macro override) configuration file.
pub fn load_local_config(path: &Path) -> Result<LocalConfig, ConfigError> {
    let content = std::fs::read_to_string(path)?;
    load_local_config_from_str(&content)
}

/// Parses and validates a local configuration from a string.
pub fn load_local_config_from_str(content: &str) -> Result<LocalConfig, ConfigError> {
    let config: LocalConfig =
        toml::from_str(content).map_err(|e| ConfigError::Parse(e.to_string()))?;
    validate_local(&config)?;
    Ok(config)
}

/// Validates that spacing values are non-negative and the fence is well-formed.
///
/// Also applied by the placer to configuration assembled programmatically
/// through its setters, so both paths share one set of rules.
pub fn validate_global(config: &GlobalConfig) -> Result<(), ConfigError> {
    for (key, value) in [
        ("halo_x", config.halo_x),
        ("halo_y", config.halo_y),
        ("channel_x", config.channel_x),
        ("channel_y", config.channel_y),
    ] {
        if value < 0.0 {
            return Err(ConfigError::NegativeSpacing {
                key: key.to_string(),
                value,
            });
        }
    }
    if let Some(fence) = &config.fence {
        if fence.ux < fence.lx || fence.uy < fence.ly {
            return Err(ConfigError::InvalidFence {
                lx: fence.lx,
                ly: fence.ly,
                ux: fence.ux,
                uy: fence.uy,
            });
        }
    }
    Ok(())
}

/// Validates that every override value present is non-negative.
pub fn validate_local(config: &LocalConfig) -> Result<(), ConfigError> {
    for (name, ov) in &config.macros {
        for (key, value) in [
            ("halo_x", ov.halo_x),
            ("halo_y", ov.halo_y),
            ("channel_x", ov.channel_x),
            ("channel_y", ov.channel_y),
        ] {
            if let Some(v) = value {
                if v < 0.0 {
                    return Err(ConfigError::NegativeSpacing {
                        key: format!("macros.{name}.{key}"),
                        value: v,
                    });
                }
            }
        }
    }
    Ok(())
}
