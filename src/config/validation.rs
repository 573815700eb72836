//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate value ranges (timeouts > 0, limits > 0)
//! - Check addresses and URLs parse
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: GatewayConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use std::net::SocketAddr;

use thiserror::Error;
use url::Url;

use crate::config::schema::GatewayConfig;

/// A single semantic problem with a configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("{field}: '{value}' is not a socket address")]
    InvalidSocketAddr { field: &'static str, value: String },

    #[error("{field}: '{value}' is not an http(s) URL")]
    InvalidUrl { field: &'static str, value: String },

    #[error("{field} must be greater than zero")]
    Zero { field: &'static str },

    #[error("explorer.network must be 'mainnet' or 'testnet', got '{0}'")]
    UnknownNetwork(String),

    /// The request deadline would cut off a full explorer failover pass.
    #[error(
        "timeouts.request_secs ({request_secs}) must exceed explorer.timeout_secs × endpoints ({explorer_budget_secs})"
    )]
    TimeoutBudget {
        request_secs: u64,
        explorer_budget_secs: u64,
    },
}

/// Validate a configuration, collecting every problem found.
pub fn validate_config(config: &GatewayConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    check_socket_addr(&mut errors, "listener.bind_address", &config.listener.bind_address);

    check_url(&mut errors, "explorer.base_url", &config.explorer.base_url);
    for url in &config.explorer.failover_urls {
        check_url(&mut errors, "explorer.failover_urls", url);
    }
    if config.explorer.timeout_secs == 0 {
        errors.push(ValidationError::Zero {
            field: "explorer.timeout_secs",
        });
    }
    if !matches!(config.explorer.network.as_str(), "mainnet" | "testnet") {
        errors.push(ValidationError::UnknownNetwork(config.explorer.network.clone()));
    }

    if config.timeouts.request_secs == 0 {
        errors.push(ValidationError::Zero {
            field: "timeouts.request_secs",
        });
    }

    let endpoints = 1 + config.explorer.failover_urls.len() as u64;
    let explorer_budget_secs = config.explorer.timeout_secs.saturating_mul(endpoints);
    if config.timeouts.request_secs > 0 && config.timeouts.request_secs <= explorer_budget_secs {
        errors.push(ValidationError::TimeoutBudget {
            request_secs: config.timeouts.request_secs,
            explorer_budget_secs,
        });
    }

    if config.security.max_body_size == 0 {
        errors.push(ValidationError::Zero {
            field: "security.max_body_size",
        });
    }
    for origin in &config.security.allowed_origins {
        check_url(&mut errors, "security.allowed_origins", origin);
    }

    if config.rate_limit.enabled {
        if config.rate_limit.requests_per_second == 0 {
            errors.push(ValidationError::Zero {
                field: "rate_limit.requests_per_second",
            });
        }
        if config.rate_limit.burst_size == 0 {
            errors.push(ValidationError::Zero {
                field: "rate_limit.burst_size",
            });
        }
    }

    if config.observability.metrics_enabled {
        check_socket_addr(
            &mut errors,
            "observability.metrics_address",
            &config.observability.metrics_address,
        );
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

fn check_socket_addr(errors: &mut Vec<ValidationError>, field: &'static str, value: &str) {
    if value.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::InvalidSocketAddr {
            field,
            value: value.to_string(),
        });
    }
}

fn check_url(errors: &mut Vec<ValidationError>, field: &'static str, value: &str) {
    let valid = Url::parse(value)
        .map(|u| matches!(u.scheme(), "http" | "https") && u.has_host())
        .unwrap_or(false);
    if !valid {
        errors.push(ValidationError::InvalidUrl {
            field,
            value: value.to_string(),
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        assert!(validate_config(&GatewayConfig::default()).is_ok());
    }

    #[test]
    fn test_collects_all_errors() {
        let mut config = GatewayConfig::default();
        config.listener.bind_address = "not-an-address".to_string();
        config.explorer.base_url = "ftp://explorer".to_string();
        config.explorer.timeout_secs = 0;
        config.explorer.network = "regtest".to_string();

        let errors = validate_config(&config).unwrap_err();
        assert_eq!(errors.len(), 4);
        assert!(errors.contains(&ValidationError::Zero {
            field: "explorer.timeout_secs"
        }));
        assert!(errors.contains(&ValidationError::UnknownNetwork("regtest".to_string())));
    }

    #[test]
    fn test_rate_limit_checked_only_when_enabled() {
        let mut config = GatewayConfig::default();
        config.rate_limit.requests_per_second = 0;
        assert!(validate_config(&config).is_ok());

        config.rate_limit.enabled = true;
        let errors = validate_config(&config).unwrap_err();
        assert_eq!(
            errors,
            vec![ValidationError::Zero {
                field: "rate_limit.requests_per_second"
            }]
        );
    }

    #[test]
    fn test_invalid_origin() {
        let mut config = GatewayConfig::default();
        config.security.allowed_origins = vec!["https://shop.example".into(), "shop".into()];
        let errors = validate_config(&config).unwrap_err();
        assert_eq!(errors.len(), 1);
        assert!(errors[0].to_string().contains("security.allowed_origins"));
    }

    #[test]
    fn test_request_timeout_must_cover_failover() {
        let mut config = GatewayConfig::default();
        config.explorer.timeout_secs = 3;
        config.timeouts.request_secs = 1;
        assert_eq!(
            validate_config(&config).unwrap_err(),
            vec![ValidationError::TimeoutBudget {
                request_secs: 1,
                explorer_budget_secs: 3
            }]
        );

        // Two endpoints tried one after another need 2 × 2s
        config.explorer.timeout_secs = 2;
        config.explorer.failover_urls = vec!["https://mirror.example".into()];
        config.timeouts.request_secs = 3;
        let errors = validate_config(&config).unwrap_err();
        assert!(matches!(
            errors.as_slice(),
            [ValidationError::TimeoutBudget {
                explorer_budget_secs: 4,
                ..
            }]
        ));

        config.timeouts.request_secs = 5;
        assert!(validate_config(&config).is_ok());
    }
}
