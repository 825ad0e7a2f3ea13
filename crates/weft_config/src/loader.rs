//! Configuration file loading and validation.

use crate::error::ConfigError;
use crate::types::WeftConfig;
use std::path::Path;

/// Name of the configuration file in a project root.
pub const CONFIG_FILE: &str = "weft.toml";

/// Loads and validates the `weft.toml` configuration from a project directory.
pub fn load_config(project_dir: &Path) -> Result<WeftConfig, ConfigError> {
    let content = std::fs::read_to_string(project_dir.join(CONFIG_FILE))?;
    load_config_from_str(&content)
}

/// Parses and validates a `weft.toml` configuration from a string.
pub fn load_config_from_str(content: &str) -> Result<WeftConfig, ConfigError> {
    let config: WeftConfig =
        toml::from_str(content).map_err(|e| ConfigError::ParseError(e.to_string()))?;
    validate_config(&config)?;
    Ok(config)
}

fn validate_config(config: &WeftConfig) -> Result<(), ConfigError> {
    if config.project.name.is_empty() {
        return Err(ConfigError::MissingField("project.name".to_string()));
    }
    let suffix = &config.generation.suffix;
    if suffix.is_empty() {
        return Err(ConfigError::MissingField("generation.suffix".to_string()));
    }
    if !suffix.chars().all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '$') {
        return Err(ConfigError::ValidationError(format!(
            "generation.suffix `{suffix}` is not a valid identifier fragment"
        )));
    }
    if config.generation.host_directives.iter().any(String::is_empty) {
        return Err(ConfigError::ValidationError(
            "generation.host-directives contains an empty name".to_string(),
        ));
    }
    Ok(())
}
