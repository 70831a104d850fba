//! Breaker gate contract.
//!
//! # Responsibilities
//! - Define the permission/outcome contract consumed by the interception core
//! - Define the recorded outcome of one completed call
//!
//! # Design Decisions
//! - `acquire_permission` is synchronous and side-effect-free; it runs
//!   before the wrapped call is ever constructed
//! - Outcome reports are fire-and-forget and happen exactly once per
//!   permitted call; the caller enforces the exactly-once part

use std::fmt;
use std::time::Duration;

use thiserror::Error;

/// Permission was denied: the gate currently forbids calls to its target.
#[derive(Debug, Clone, Error)]
#[error("circuit breaker '{name}' is open")]
pub struct CircuitOpenError {
    /// Name of the gate that denied the call.
    pub name: String,
}

impl CircuitOpenError {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

/// The recorded result of one permitted call.
///
/// Produced exactly once per call and consumed immediately by the gate;
/// never persisted.
#[derive(Debug, Clone)]
pub struct CallOutcome {
    /// Time from permission grant to the terminal decision.
    pub duration: Duration,

    /// Description of the failure cause, present only on failures.
    pub error: Option<String>,
}

impl CallOutcome {
    /// Outcome of a call that succeeded.
    pub fn success(duration: Duration) -> Self {
        Self {
            duration,
            error: None,
        }
    }

    /// Outcome of a call that failed.
    pub fn failure(duration: Duration, error: &dyn fmt::Display) -> Self {
        Self {
            duration,
            error: Some(error.to_string()),
        }
    }
}

/// The decision component that learns whether calls to a target are healthy.
///
/// Implementations own all internal synchronization and state; callers only
/// invoke the three contract methods. The interception core guarantees that
/// for every call granted permission exactly one of `report_success` /
/// `report_failure` is invoked, and that denied calls are never reported.
pub trait BreakerGate: Send + Sync + fmt::Debug {
    /// Name of this gate, for logs and error messages.
    fn name(&self) -> &str;

    /// Probe whether a call may proceed. Side-effect-free.
    fn acquire_permission(&self) -> Result<(), CircuitOpenError>;

    /// Record a successful call.
    fn report_success(&self, outcome: CallOutcome);

    /// Record a failed call.
    fn report_failure(&self, outcome: CallOutcome);
}
