use crate::config::types::{Config, Specialist, SpecialistsFile};
use crate::config::validation::{validate_config, validate_specialists};
use crate::ConfigError;
use std::path::Path;

/// Loads and validates the TOML configuration file
pub fn load_config(path: &Path) -> Result<Config, ConfigError> {
    let content = std::fs::read_to_string(path)?;
    let config: Config = toml::from_str(&content)?;
    validate_config(&config)?;
    Ok(config)
}

/// Loads and validates the specialists JSON document
///
/// Expected shape: `{ "specialists": [ { "name", "region", "listing_url" } ] }`.
/// Validation is shape-only: the array must be non-empty and every entry must
/// carry a parseable listing URL.
pub fn load_specialists(path: &Path) -> Result<Vec<Specialist>, ConfigError> {
    let content = std::fs::read_to_string(path)?;
    let file: SpecialistsFile = serde_json::from_str(&content)?;
    validate_specialists(&file.specialists)?;
    Ok(file.specialists)
}
