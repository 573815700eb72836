//! Configuration loading from disk and environment.

use std::fs;
use std::path::Path;
use std::str::FromStr;

use thiserror::Error;

use crate::config::schema::{GatewayConfig, LogFormat};
use crate::config::validation::{validate_config, ValidationError};

/// Prefix shared by all environment overrides.
pub const ENV_PREFIX: &str = "ERGOPAY_";

/// Error type for configuration loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parse error: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Invalid value for {key}: {message}")]
    Env { key: String, message: String },

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

/// Parse a TOML file without validating it.
fn read_config_file(path: &Path) -> Result<GatewayConfig, ConfigError> {
    let content = fs::read_to_string(path)?;
    Ok(toml::from_str(&content)?)
}

/// Load and validate configuration from a TOML file, ignoring the environment.
pub fn load_config(path: &Path) -> Result<GatewayConfig, ConfigError> {
    load_from(Some(path), std::iter::empty::<(String, String)>())
}

/// Build the effective configuration: optional file, then process
/// environment overrides, then validation.
pub fn load(path: Option<&Path>) -> Result<GatewayConfig, ConfigError> {
    load_from(path, std::env::vars())
}

/// [`load`] with an explicit set of environment variables.
pub fn load_from<I, K, V>(path: Option<&Path>, vars: I) -> Result<GatewayConfig, ConfigError>
where
    I: IntoIterator<Item = (K, V)>,
    K: AsRef<str>,
    V: AsRef<str>,
{
    let mut config = match path {
        Some(path) => read_config_file(path)?,
        None => GatewayConfig::default(),
    };

    apply_env_overrides(&mut config, vars)?;
    validate_config(&config).map_err(ConfigError::Validation)?;

    Ok(config)
}

/// Apply `ERGOPAY_*` (and `PORT`) overrides from the given variables.
///
/// Unknown keys are ignored.
pub fn apply_env_overrides<I, K, V>(config: &mut GatewayConfig, vars: I) -> Result<(), ConfigError>
where
    I: IntoIterator<Item = (K, V)>,
    K: AsRef<str>,
    V: AsRef<str>,
{
    for (key, value) in vars {
        let key = key.as_ref();
        let value = value.as_ref();

        if key == "PORT" {
            let port: u16 = parse(key, value)?;
            let host = config
                .listener
                .bind_address
                .rsplit_once(':')
                .map(|(host, _)| host.to_string())
                .unwrap_or_else(|| "0.0.0.0".to_string());
            config.listener.bind_address = format!("{host}:{port}");
            continue;
        }

        let Some(name) = key.strip_prefix(ENV_PREFIX) else {
            continue;
        };

        match name {
            "BIND_ADDRESS" => config.listener.bind_address = value.to_string(),
            "EXPLORER_URL" => config.explorer.base_url = value.to_string(),
            "EXPLORER_FAILOVER_URLS" => config.explorer.failover_urls = split_list(value),
            "EXPLORER_TIMEOUT_SECS" => config.explorer.timeout_secs = parse(key, value)?,
            "NETWORK" => config.explorer.network = value.to_lowercase(),
            "MIN_CONFIRMATIONS" => config.verification.min_confirmations = parse(key, value)?,
            "REQUEST_TIMEOUT_SECS" => config.timeouts.request_secs = parse(key, value)?,
            "ALLOWED_ORIGINS" => config.security.allowed_origins = split_list(value),
            "MAX_BODY_BYTES" => config.security.max_body_size = parse(key, value)?,
            "RATE_LIMIT_ENABLED" => config.rate_limit.enabled = parse_bool(key, value)?,
            "RATE_LIMIT_RPS" => config.rate_limit.requests_per_second = parse(key, value)?,
            "RATE_LIMIT_BURST" => config.rate_limit.burst_size = parse(key, value)?,
            "LOG_LEVEL" => config.observability.log_level = value.to_string(),
            "LOG_FORMAT" => {
                config.observability.log_format = match value.to_lowercase().as_str() {
                    "pretty" => LogFormat::Pretty,
                    "json" => LogFormat::Json,
                    _ => return Err(env_error(key, "expected 'pretty' or 'json'")),
                }
            }
            "METRICS_ENABLED" => config.observability.metrics_enabled = parse_bool(key, value)?,
            "METRICS_ADDRESS" => config.observability.metrics_address = value.to_string(),
            _ => {}
        }
    }
    Ok(())
}

fn parse<T>(key: &str, value: &str) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    value.trim().parse().map_err(|e: T::Err| env_error(key, e))
}

fn parse_bool(key: &str, value: &str) -> Result<bool, ConfigError> {
    match value.trim().to_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(env_error(key, "expected a boolean")),
    }
}

fn split_list(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(String::from)
        .collect()
}

fn env_error(key: &str, message: impl std::fmt::Display) -> ConfigError {
    ConfigError::Env {
        key: key.to_string(),
        message: message.to_string(),
    }
}
