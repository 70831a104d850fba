//! Circuit breaker subsystem.
//!
//! # Data Flow
//! ```text
//! Request for route + path:
//!     → registry.rs (lazy per-key gate creation via injected factory)
//!     → gate.rs contract: acquire_permission() before the call,
//!       report_success()/report_failure() exactly once after it
//!     → manual.rs: operator-forced gate used when no factory is injected
//! ```
//!
//! # Design Decisions
//! - The gate's health-judgment algorithm lives behind the `BreakerGate`
//!   trait; this crate only consumes the contract
//! - One gate per (route, path) key: per-endpoint isolation at the cost of
//!   gate-instance cardinality
//! - Denied calls are never reported: a denial was never attempted

pub mod gate;
pub mod manual;
pub mod registry;

pub use gate::{BreakerGate, CallOutcome, CircuitOpenError};
pub use manual::ManualGate;
pub use registry::{BreakerKey, BreakerRegistry, GateFactory};
