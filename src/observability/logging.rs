//! Structured logging.
//!
//! # Responsibilities
//! - Initialize the tracing subscriber
//! - Honor the configured log level, with the environment winning

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::schema::ObservabilityConfig;

/// Initialize the logging subsystem. `RUST_LOG` overrides the configured
/// level when set.
pub fn init(config: &ObservabilityConfig) {
    let default_filter = format!(
        "breaker_gateway={},tower_http=info",
        config.log_level
    );

    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&default_filter)))
        .with(tracing_subscriber::fmt::layer())
        .init();
}
