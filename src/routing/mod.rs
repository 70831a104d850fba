//! Routing subsystem.
//!
//! # Data Flow
//! ```text
//! RouteConfig list
//!     → router.rs (compile: parse upstream authority, fallback target,
//!       status classification; sort by priority then prefix length)
//!     → per request: match_path() returns the compiled route or None
//!     → classify.rs decides whether an upstream status is a failure
//! ```
//!
//! # Design Decisions
//! - Route table is immutable after construction (thread-safe without locks)
//! - Explicit no-match rather than silent default
//! - All per-route parsing happens once at compile time, never per request

pub mod classify;
pub mod router;

pub use classify::{ClassificationParseError, StatusClassification};
pub use router::{CompiledRoute, FallbackTarget, Router};
