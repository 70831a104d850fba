//! Permission-gated producer.
//!
//! # Responsibilities
//! - Consult the gate synchronously before the wrapped producer exists
//! - On denial, surface the open-circuit error on the ordinary error
//!   channel and never construct the producer
//! - On grant, interpose the outcome tracker between producer and consumer
//!
//! # Design Decisions
//! - The producer is a deferred closure so a denied call performs no work
//!   at all, not even producer construction
//! - Denial and downstream failure share one error type: callers need no
//!   special case for "circuit open" versus "call failed"

use std::fmt;
use std::mem;
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};

use futures_util::Stream;
use thiserror::Error;

use crate::breaker::gate::{BreakerGate, CircuitOpenError};
use crate::intercept::tracker::OutcomeStream;

/// Error channel of an intercepted producer.
#[derive(Debug, Error)]
pub enum GateError<E> {
    /// Permission was denied before the call started.
    #[error(transparent)]
    Open(#[from] CircuitOpenError),

    /// The underlying call failed after permission was granted.
    #[error("{0}")]
    Call(E),
}

enum InterceptState<S, F> {
    /// Permission not yet consulted; the producer is an un-invoked closure.
    Idle { produce: F },
    /// Permission granted; signals flow through the tracker.
    Running { tracked: OutcomeStream<S> },
    /// Terminal: denial already surfaced, or fused after the inner stream.
    Done,
}

/// A producer gated on breaker permission.
///
/// Created by the adapters in [`crate::intercept::kind`]. Subscribing (the
/// first poll) consults the gate; it never blocks a thread.
pub struct Intercepted<S, F> {
    gate: Arc<dyn BreakerGate>,
    single_value: bool,
    state: InterceptState<S, F>,
}

impl<S, F> Intercepted<S, F> {
    pub(crate) fn new(gate: Arc<dyn BreakerGate>, single_value: bool, produce: F) -> Self {
        Self {
            gate,
            single_value,
            state: InterceptState::Idle { produce },
        }
    }
}

impl<S, F, T, E> Stream for Intercepted<S, F>
where
    S: Stream<Item = Result<T, E>> + Unpin,
    F: FnOnce() -> S + Unpin,
    E: fmt::Display,
{
    type Item = Result<T, GateError<E>>;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        let this = self.get_mut();

        if let InterceptState::Idle { .. } = this.state {
            // Take the producer out so it runs at most once.
            let produce = match mem::replace(&mut this.state, InterceptState::Done) {
                InterceptState::Idle { produce } => produce,
                _ => return Poll::Ready(None),
            };
            match this.gate.acquire_permission() {
                Ok(()) => {
                    let tracked =
                        OutcomeStream::new(this.gate.clone(), this.single_value, produce());
                    this.state = InterceptState::Running { tracked };
                }
                Err(denied) => {
                    tracing::debug!(breaker = %this.gate.name(), "permission denied");
                    return Poll::Ready(Some(Err(GateError::Open(denied))));
                }
            }
        }

        match &mut this.state {
            InterceptState::Running { tracked } => {
                match std::task::ready!(Pin::new(tracked).poll_next(cx)) {
                    Some(Ok(value)) => Poll::Ready(Some(Ok(value))),
                    Some(Err(error)) => Poll::Ready(Some(Err(GateError::Call(error)))),
                    None => Poll::Ready(None),
                }
            }
            InterceptState::Idle { .. } | InterceptState::Done => Poll::Ready(None),
        }
    }
}
