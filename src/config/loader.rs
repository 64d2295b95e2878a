//! Configuration loading from disk and environment.

use std::fs;
use std::path::Path;

use crate::config::schema::GateConfig;
use crate::config::validation::{validate_config, ValidationError};

/// Environment variable overriding `backend.url`.
pub const ENV_BACKEND_URL: &str = "SECOND_BRAIN_API_URL";
/// Environment variable overriding `backend.token`.
pub const ENV_BACKEND_TOKEN: &str = "SECOND_BRAIN_API_TOKEN";

/// Error type for configuration loading.
#[derive(Debug, thiserror::Error)]
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
        .map(|e| e.to_string())
        .collect::<Vec<_>>()
        .join(", ")
}

/// Load and validate configuration from a TOML file, then apply env overrides.
pub fn load_config(path: &Path) -> Result<GateConfig, ConfigError> {
    let content = fs::read_to_string(path)?;
    let config: GateConfig = toml::from_str(&content)?;
    finalize(config, |key| std::env::var(key).ok())
}

/// Defaults plus env overrides, for running without a config file.
pub fn load_default() -> Result<GateConfig, ConfigError> {
    finalize(GateConfig::default(), |key| std::env::var(key).ok())
}

fn finalize(
    mut config: GateConfig,
    env: impl Fn(&str) -> Option<String>,
) -> Result<GateConfig, ConfigError> {
    apply_env_overrides(&mut config, env);
    validate_config(&config).map_err(ConfigError::Validation)?;
    Ok(config)
}

fn apply_env_overrides(config: &mut GateConfig, env: impl Fn(&str) -> Option<String>) {
    if let Some(url) = env(ENV_BACKEND_URL).filter(|v| !v.is_empty()) {
        tracing::debug!(url = %url, "Backend URL overridden from environment");
        config.backend.url = url;
    }
    if let Some(token) = env(ENV_BACKEND_TOKEN) {
        config.backend.token = token;
    }
}
