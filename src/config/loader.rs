//! Configuration loading from disk and environment.

use std::fs;
use std::path::Path;

use thiserror::Error;

use crate::config::schema::ReproxConfig;
use crate::config::validation::{validate_config, ValidationError};

/// Environment variables consulted for the ACME contact address, in order.
pub const CONTACT_EMAIL_VARS: [&str; 2] = ["REPROX_CONTACT_EMAIL", "CERTBOT_EMAIL"];

/// Error type for configuration loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parse error: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation failed: {}", join_errors(.0))]
    Validation(Vec<ValidationError>),
}

fn join_errors(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Load configuration from an optional TOML file, apply environment
/// overrides and validate the result.
pub fn load_config(path: Option<&Path>) -> Result<ReproxConfig, ConfigError> {
    let mut config = match path {
        Some(path) => {
            let content = fs::read_to_string(path)?;
            toml::from_str(&content)?
        }
        None => ReproxConfig::default(),
    };

    apply_env_overrides(&mut config, |key| std::env::var(key).ok());
    validate_config(&config).map_err(ConfigError::Validation)?;

    Ok(config)
}

/// Override file settings with values from the environment.
pub fn apply_env_overrides<F>(config: &mut ReproxConfig, lookup: F)
where
    F: Fn(&str) -> Option<String>,
{
    if let Some(email) = CONTACT_EMAIL_VARS
        .iter()
        .filter_map(|key| lookup(key))
        .find(|value| !value.trim().is_empty())
    {
        config.certs.contact_email = email;
    }
}
