//! Configuration file loading and validation.

use crate::error::ConfigError;
use crate::types::{FabricConfig, PlacerKind};
use std::path::Path;

/// The configuration file name looked up in a run directory.
pub const CONFIG_FILE_NAME: &str = "fabric.toml";

/// Loads and validates a `fabric.toml` configuration from a run directory.
pub fn load_config(dir: &Path) -> Result<FabricConfig, ConfigError> {
    let content = std::fs::read_to_string(dir.join(CONFIG_FILE_NAME))?;
    load_config_from_str(&content)
}

/// Parses and validates a `fabric.toml` configuration from a string.
///
/// Useful for testing without filesystem dependencies.
pub fn load_config_from_str(content: &str) -> Result<FabricConfig, ConfigError> {
    let config: FabricConfig =
        toml::from_str(content).map_err(|e| ConfigError::ParseError(e.to_string()))?;
    validate_config(&config)?;
    Ok(config)
}

/// Validates that required fields are present and configuration values are consistent.
fn validate_config(config: &FabricConfig) -> Result<(), ConfigError> {
    if config.device.chipdb.is_empty() {
        return Err(ConfigError::MissingField("device.chipdb".to_string()));
    }
    PlacerKind::parse(&config.place.placer)?;
    if config.route.ripup_delay_penalty < 0 {
        return Err(ConfigError::ValidationError(
            "route.ripup_delay_penalty must not be negative".to_string(),
        ));
    }
    if config.estimator.cluster_bels == 0 {
        return Err(ConfigError::ValidationError(
            "estimator.cluster_bels must be positive".to_string(),
        ));
    }
    if config.estimator.bbox_cost_threshold < 0 {
        return Err(ConfigError::ValidationError(
            "estimator.bbox_cost_threshold must not be negative".to_string(),
        ));
    }
    Ok(())
}
