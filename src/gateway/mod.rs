//! Gateway edge subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (axum setup, wildcard proxy routes, middleware)
//!     → request_id.rs (stamp x-request-id as early as possible)
//!     → routing table decides the route
//!     → filter.rs (breaker key, permission-gated upstream call, status
//!       classification, fallback dispatch / error translation)
//!     → response to client
//! ```

pub mod filter;
pub mod request_id;
pub mod server;

pub use request_id::{RequestIdLayer, X_REQUEST_ID};
pub use server::{AppState, HttpServer};
