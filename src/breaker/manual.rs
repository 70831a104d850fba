//! Operator-controlled gate.
//!
//! # Responsibilities
//! - Provide a concrete gate with no health-judgment of its own
//! - Let an operator force a target open (kill switch) or closed
//! - Count outcomes for observability
//!
//! # Design Decisions
//! - Forcing is the only state transition; nothing trips automatically
//! - Counters are plain atomics, reports never block

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};

use crate::breaker::gate::{BreakerGate, CallOutcome, CircuitOpenError};

/// A gate whose open/closed state is set only by an operator.
#[derive(Debug)]
pub struct ManualGate {
    name: String,
    forced_open: AtomicBool,
    successes: AtomicU64,
    failures: AtomicU64,
}

impl ManualGate {
    /// Create a closed (permitting) gate.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            forced_open: AtomicBool::new(false),
            successes: AtomicU64::new(0),
            failures: AtomicU64::new(0),
        }
    }

    /// Force the gate open: deny all calls until forced closed.
    pub fn force_open(&self) {
        if !self.forced_open.swap(true, Ordering::AcqRel) {
            tracing::warn!(breaker = %self.name, "gate forced open");
        }
    }

    /// Force the gate closed: permit calls again.
    pub fn force_closed(&self) {
        if self.forced_open.swap(false, Ordering::AcqRel) {
            tracing::info!(breaker = %self.name, "gate forced closed");
        }
    }

    /// Returns true if the gate currently denies calls.
    pub fn is_open(&self) -> bool {
        self.forced_open.load(Ordering::Acquire)
    }

    /// Number of successes reported so far.
    pub fn successes(&self) -> u64 {
        self.successes.load(Ordering::Relaxed)
    }

    /// Number of failures reported so far.
    pub fn failures(&self) -> u64 {
        self.failures.load(Ordering::Relaxed)
    }
}

impl BreakerGate for ManualGate {
    fn name(&self) -> &str {
        &self.name
    }

    fn acquire_permission(&self) -> Result<(), CircuitOpenError> {
        if self.is_open() {
            Err(CircuitOpenError::new(&self.name))
        } else {
            Ok(())
        }
    }

    fn report_success(&self, outcome: CallOutcome) {
        self.successes.fetch_add(1, Ordering::Relaxed);
        tracing::trace!(
            breaker = %self.name,
            duration_ms = outcome.duration.as_millis() as u64,
            "call succeeded"
        );
    }

    fn report_failure(&self, outcome: CallOutcome) {
        self.failures.fetch_add(1, Ordering::Relaxed);
        tracing::debug!(
            breaker = %self.name,
            duration_ms = outcome.duration.as_millis() as u64,
            error = outcome.error.as_deref().unwrap_or("unknown"),
            "call failed"
        );
    }
}
