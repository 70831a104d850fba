//! Configuration subsystem.
//!
//! # Data Flow
//! ```text
//! TOML file
//!     → loader.rs (read, parse)
//!     → validation.rs (semantic checks, collects all errors)
//!     → schema.rs types handed to the rest of the system
//! ```
//!
//! # Design Decisions
//! - Serde handles syntactic validation; validation.rs handles semantics
//! - Status classification grammar is rejected at load time, never at
//!   request time
//! - Config is immutable once accepted

pub mod loader;
pub mod schema;
pub mod validation;

pub use loader::{load_config, ConfigError};
pub use schema::{
    BreakerConfig, GatewayConfig, ListenerConfig, ObservabilityConfig, RouteConfig, TimeoutConfig,
};
pub use validation::{validate_config, ValidationError};
