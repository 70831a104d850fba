//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate status classification grammar per route
//! - Validate upstream authorities and fallback targets
//! - Detect duplicate routes
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is a pure function: GatewayConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use std::collections::HashSet;
use std::net::SocketAddr;
use std::str::FromStr;

use axum::http::uri::Authority;
use thiserror::Error;

use crate::config::schema::GatewayConfig;
use crate::routing::classify::ClassificationParseError;
use crate::routing::router::FallbackTarget;

/// A semantic configuration error.
#[derive(Debug, Error)]
pub enum ValidationError {
    #[error("invalid listener bind address '{address}'")]
    InvalidBindAddress { address: String },

    #[error("duplicate route name '{name}'")]
    DuplicateRoute { name: String },

    #[error("route '{route}': path_prefix must start with '/'")]
    InvalidPathPrefix { route: String },

    #[error("route '{route}': invalid upstream authority '{upstream}'")]
    InvalidUpstream { route: String, upstream: String },

    #[error("route '{route}': {source}")]
    InvalidStatusPattern {
        route: String,
        #[source]
        source: ClassificationParseError,
    },

    #[error("route '{route}': invalid fallback target '{target}' (expected an absolute path or an absolute http URI)")]
    InvalidFallback { route: String, target: String },
}

/// Validate a configuration, collecting every error.
pub fn validate_config(config: &GatewayConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if SocketAddr::from_str(&config.listener.bind_address).is_err() {
        errors.push(ValidationError::InvalidBindAddress {
            address: config.listener.bind_address.clone(),
        });
    }

    let mut seen = HashSet::new();
    for route in &config.routes {
        if !seen.insert(route.name.as_str()) {
            errors.push(ValidationError::DuplicateRoute {
                name: route.name.clone(),
            });
        }

        if !route.path_prefix.starts_with('/') {
            errors.push(ValidationError::InvalidPathPrefix {
                route: route.name.clone(),
            });
        }

        if Authority::from_str(&route.upstream).is_err() {
            errors.push(ValidationError::InvalidUpstream {
                route: route.name.clone(),
                upstream: route.upstream.clone(),
            });
        }

        if let Err(source) =
            crate::routing::classify::StatusClassification::parse(&route.breaker.failure_statuses)
        {
            errors.push(ValidationError::InvalidStatusPattern {
                route: route.name.clone(),
                source,
            });
        }

        if let Some(target) = &route.breaker.fallback_target {
            if FallbackTarget::parse(target).is_none() {
                errors.push(ValidationError::InvalidFallback {
                    route: route.name.clone(),
                    target: target.clone(),
                });
            }
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
