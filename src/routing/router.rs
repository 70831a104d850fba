//! Route lookup and compilation.
//!
//! # Responsibilities
//! - Compile route configs once: upstream authority, failure classification,
//!   fallback target
//! - Look up the matching route for a request path
//! - Return matched route or explicit no-match
//!
//! # Design Decisions
//! - Immutable after construction (thread-safe without locks)
//! - Priority first, then longest path prefix
//! - No regex to guarantee O(n) matching

use std::str::FromStr;

use axum::http::uri::{Authority, Uri};
use url::Url;

use crate::config::schema::RouteConfig;
use crate::config::validation::ValidationError;
use crate::routing::classify::StatusClassification;

/// Where a failed call is re-dispatched.
#[derive(Debug, Clone)]
pub enum FallbackTarget {
    /// Absolute http URI, dispatched directly.
    Uri(Uri),
    /// Absolute path, re-resolved against the route table.
    Path(String),
}

impl FallbackTarget {
    /// Parse a configured fallback target. Accepts an absolute path or an
    /// absolute http URI; anything else is rejected.
    pub fn parse(target: &str) -> Option<Self> {
        if target.starts_with('/') {
            return Some(FallbackTarget::Path(target.to_string()));
        }
        let url = Url::parse(target).ok()?;
        if url.scheme() != "http" {
            return None;
        }
        let uri = Uri::from_str(target).ok()?;
        Some(FallbackTarget::Uri(uri))
    }
}

/// A route with all per-route parsing done up front.
#[derive(Debug, Clone)]
pub struct CompiledRoute {
    /// Route identifier, used in breaker keys, logs and metrics.
    pub name: String,
    /// Path prefix this route matches.
    pub path_prefix: String,
    /// Route priority (higher = checked first).
    pub priority: u32,
    /// Upstream authority requests are forwarded to.
    pub upstream: Authority,
    /// Statuses treated as call failures.
    pub classification: StatusClassification,
    /// Fallback dispatch target, if configured.
    pub fallback: Option<FallbackTarget>,
    /// Replace unclassified call errors with an empty 200 response.
    pub resume_without_error: bool,
}

impl CompiledRoute {
    fn compile(config: &RouteConfig) -> Result<Self, ValidationError> {
        if !config.path_prefix.starts_with('/') {
            return Err(ValidationError::InvalidPathPrefix {
                route: config.name.clone(),
            });
        }

        let upstream = Authority::from_str(&config.upstream).map_err(|_| {
            ValidationError::InvalidUpstream {
                route: config.name.clone(),
                upstream: config.upstream.clone(),
            }
        })?;

        let classification = StatusClassification::parse(&config.breaker.failure_statuses)
            .map_err(|source| ValidationError::InvalidStatusPattern {
                route: config.name.clone(),
                source,
            })?;

        let fallback = match &config.breaker.fallback_target {
            Some(target) => Some(FallbackTarget::parse(target).ok_or_else(|| {
                ValidationError::InvalidFallback {
                    route: config.name.clone(),
                    target: target.clone(),
                }
            })?),
            None => None,
        };

        Ok(Self {
            name: config.name.clone(),
            path_prefix: config.path_prefix.clone(),
            priority: config.priority,
            upstream,
            classification,
            fallback,
            resume_without_error: config.breaker.resume_without_error,
        })
    }
}

/// Immutable route table.
#[derive(Debug)]
pub struct Router {
    routes: Vec<CompiledRoute>,
}

impl Router {
    /// Compile the route table. Fails on the first invalid route; run
    /// [`crate::config::validate_config`] first to collect every error.
    pub fn from_config(configs: &[RouteConfig]) -> Result<Self, ValidationError> {
        let mut routes = Vec::with_capacity(configs.len());
        for config in configs {
            routes.push(CompiledRoute::compile(config)?);
        }

        // Higher priority first, ties broken by longest prefix.
        routes.sort_by(|a, b| {
            b.priority
                .cmp(&a.priority)
                .then(b.path_prefix.len().cmp(&a.path_prefix.len()))
        });

        Ok(Self { routes })
    }

    /// Look up the route for a request path.
    pub fn match_path(&self, path: &str) -> Option<&CompiledRoute> {
        self.routes
            .iter()
            .find(|route| path.starts_with(&route.path_prefix))
    }

    /// Number of compiled routes.
    pub fn len(&self) -> usize {
        self.routes.len()
    }

    /// Returns true if no routes are configured.
    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }
}
