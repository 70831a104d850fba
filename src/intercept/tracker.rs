//! Outcome tracking around a producer.
//!
//! # Responsibilities
//! - Forward every producer signal to the consumer unmodified
//! - Report exactly one outcome to the gate per call, no matter how the
//!   call terminates: value, completion, error, or cancellation
//!
//! # Signal rules
//! ```text
//! value      single-value: claim → report_success(now - start), forward
//!            multi-value:  forward only; success waits for completion
//! completion claim → report_success; forward
//! error      claim → report_failure; forward; stream is fused after
//! drop       claim + value seen   → report_success
//!            claim + nothing seen → report nothing
//! ```
//!
//! # Design Decisions
//! - The claim is an atomic compare-and-set; a plain check-then-set boolean
//!   is not enough when cancellation fires from another execution context
//! - An error after a value-triggered success is an upstream contract
//!   violation: logged, never double-reported

use std::fmt;
use std::pin::Pin;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::task::{Context, Poll};
use std::time::Duration;

use futures_util::Stream;
use tokio::time::Instant;

use crate::breaker::gate::{BreakerGate, CallOutcome};

/// Per-call tracking state. Owned by one `OutcomeStream`; mutated only by
/// signal handling and drop.
#[derive(Debug)]
struct TrackingState {
    /// When the call was permitted and the producer subscribed.
    started: Instant,
    /// Set-once flag: the winner of the false→true transition owns the
    /// outcome report.
    reported: AtomicBool,
    /// Whether any value reached the consumer.
    emitted: AtomicBool,
    /// Success is recordable at the first value instead of at completion.
    single_value: bool,
}

impl TrackingState {
    fn new(single_value: bool) -> Self {
        Self {
            started: Instant::now(),
            reported: AtomicBool::new(false),
            emitted: AtomicBool::new(false),
            single_value,
        }
    }

    /// Claim the right to report. Only one caller ever wins.
    fn try_claim(&self) -> bool {
        self.reported
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_ok()
    }

    fn elapsed(&self) -> Duration {
        self.started.elapsed()
    }
}

/// A producer with an outcome tracker interposed between it and the
/// consumer.
///
/// Values are `Result`s: an `Err` item is the producer's terminal error
/// signal, after which the stream is fused. Dropping the stream before a
/// terminal signal is the cancellation path.
#[derive(Debug)]
pub struct OutcomeStream<S> {
    inner: S,
    gate: Arc<dyn BreakerGate>,
    state: TrackingState,
    done: bool,
}

impl<S> OutcomeStream<S> {
    /// Start tracking a subscribed producer. The call's clock starts here.
    pub fn new(gate: Arc<dyn BreakerGate>, single_value: bool, inner: S) -> Self {
        Self {
            inner,
            gate,
            state: TrackingState::new(single_value),
            done: false,
        }
    }
}

impl<S, T, E> Stream for OutcomeStream<S>
where
    S: Stream<Item = Result<T, E>> + Unpin,
    E: fmt::Display,
{
    type Item = Result<T, E>;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        let this = self.get_mut();
        if this.done {
            return Poll::Ready(None);
        }

        match std::task::ready!(Pin::new(&mut this.inner).poll_next(cx)) {
            Some(Ok(value)) => {
                // The emission flag feeds the cancellation rule and is set
                // even when another signal already claimed the report.
                this.state.emitted.store(true, Ordering::Release);
                if this.state.single_value && this.state.try_claim() {
                    this.gate
                        .report_success(CallOutcome::success(this.state.elapsed()));
                }
                Poll::Ready(Some(Ok(value)))
            }
            Some(Err(error)) => {
                this.done = true;
                if this.state.try_claim() {
                    this.gate
                        .report_failure(CallOutcome::failure(this.state.elapsed(), &error));
                } else if this.state.single_value {
                    // A single-value producer already had its success
                    // recorded at the first value; a later error breaks its
                    // contract. Surface the signal, never a second report.
                    tracing::warn!(
                        breaker = %this.gate.name(),
                        error = %error,
                        "terminal error after outcome was already reported"
                    );
                }
                Poll::Ready(Some(Err(error)))
            }
            None => {
                this.done = true;
                if this.state.try_claim() {
                    this.gate
                        .report_success(CallOutcome::success(this.state.elapsed()));
                }
                Poll::Ready(None)
            }
        }
    }
}

impl<S> Drop for OutcomeStream<S> {
    fn drop(&mut self) {
        // Cancellation: the consumer walked away before a terminal signal.
        // Losing the claim means a terminal signal already reported.
        if self.state.try_claim() {
            if self.state.emitted.load(Ordering::Acquire) {
                // The target demonstrably responded before the caller lost
                // interest.
                self.gate
                    .report_success(CallOutcome::success(self.state.elapsed()));
            } else {
                tracing::trace!(
                    breaker = %self.gate.name(),
                    "call abandoned before any progress; not reported"
                );
            }
        }
    }
}
