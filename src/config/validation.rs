//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Compile every route pattern and check output placeholders are bound
//! - Validate value ranges (timeouts > 0, addresses parse)
//! - Detect routes that derive the same key
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: ProxyConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use std::collections::HashSet;
use std::net::SocketAddr;

use thiserror::Error;

use crate::config::schema::ProxyConfig;
use crate::error::RouterError;
use crate::routing::{route_key, InputTemplate, OutputTemplate};

/// A single semantic problem in the configuration.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("{field}: invalid socket address {value:?}")]
    InvalidAddress { field: &'static str, value: String },

    #[error("{field} must be greater than zero")]
    Zero { field: &'static str },

    #[error("routes[{index}]: {source}")]
    Route { index: usize, source: RouterError },

    #[error("routes[{index}]: empty host address")]
    EmptyHost { index: usize },

    #[error("routes[{index}]: key {key} already defined by another route")]
    DuplicateKey { index: usize, key: String },

    #[error("admin.api_key must not be empty when the admin API is enabled")]
    EmptyApiKey,
}

/// Validate a parsed configuration.
pub fn validate_config(config: &ProxyConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    check_address(&mut errors, "listener.bind_address", &config.listener.bind_address);
    if config.timeouts.connect_secs == 0 {
        errors.push(ValidationError::Zero { field: "timeouts.connect_secs" });
    }
    if config.timeouts.request_secs == 0 {
        errors.push(ValidationError::Zero { field: "timeouts.request_secs" });
    }
    if config.passive_health.enabled && config.passive_health.failure_threshold == 0 {
        errors.push(ValidationError::Zero { field: "passive_health.failure_threshold" });
    }
    if config.observability.metrics_enabled {
        check_address(&mut errors, "observability.metrics_address", &config.observability.metrics_address);
    }
    if config.admin.enabled {
        check_address(&mut errors, "admin.bind_address", &config.admin.bind_address);
        if config.admin.api_key.is_empty() {
            errors.push(ValidationError::EmptyApiKey);
        }
    }

    let mut keys = HashSet::new();
    for (index, route) in config.routes.iter().enumerate() {
        if let Err(source) = check_templates(&route.input, &route.output) {
            errors.push(ValidationError::Route { index, source });
        }
        if route.hosts.iter().any(|h| h.trim().is_empty()) {
            errors.push(ValidationError::EmptyHost { index });
        }
        let key = route_key(&route.input);
        if !keys.insert(key.clone()) {
            errors.push(ValidationError::DuplicateKey { index, key });
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

fn check_address(errors: &mut Vec<ValidationError>, field: &'static str, value: &str) {
    if value.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::InvalidAddress {
            field,
            value: value.to_string(),
        });
    }
}

fn check_templates(input: &str, output: &str) -> Result<(), RouterError> {
    let input = InputTemplate::compile(input)?;
    OutputTemplate::compile(output)?.check_bound_by(&input)
}
