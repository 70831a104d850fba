//! Producer kind dispatch.
//!
//! # Responsibilities
//! - Configure the interceptor for single-valued versus multi-valued
//!   producers; the distinction changes when success is first recordable
//! - Reject unrecognized kind tokens where kinds enter as strings
//!
//! # Design Decisions
//! - One tagged flag inside one implementation, not two parallel
//!   interceptor hierarchies

use std::fmt;
use std::future::Future;
use std::str::FromStr;
use std::sync::Arc;

use futures_util::stream::{self, Once, Stream};
use thiserror::Error;

use crate::breaker::gate::BreakerGate;
use crate::intercept::interceptor::Intercepted;

/// Declared shape of a producer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProducerKind {
    /// Yields at most one value before terminating; success is recordable
    /// at the first value.
    Single,
    /// May yield an unbounded sequence; success is only recordable at
    /// normal completion, because the producer may still fail after
    /// emitting values.
    Many,
}

/// A kind token outside the supported set. A programming or configuration
/// error: callers must only ever pass the two supported kinds.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unsupported producer kind '{0}': expected 'single' or 'many'")]
pub struct UnsupportedProducerKindError(pub String);

impl FromStr for ProducerKind {
    type Err = UnsupportedProducerKindError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "single" => Ok(ProducerKind::Single),
            "many" => Ok(ProducerKind::Many),
            other => Err(UnsupportedProducerKindError(other.to_string())),
        }
    }
}

impl fmt::Display for ProducerKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProducerKind::Single => f.write_str("single"),
            ProducerKind::Many => f.write_str("many"),
        }
    }
}

/// Gate a producer of the declared kind.
pub fn intercept_kind<S, F, T, E>(
    gate: Arc<dyn BreakerGate>,
    kind: ProducerKind,
    produce: F,
) -> Intercepted<S, F>
where
    S: Stream<Item = Result<T, E>> + Unpin,
    F: FnOnce() -> S + Unpin,
{
    Intercepted::new(gate, kind == ProducerKind::Single, produce)
}

/// Gate a single-valued asynchronous call.
///
/// The future is lazy and is never polled when permission is denied.
pub fn intercept_call<Fut, T, E>(
    gate: Arc<dyn BreakerGate>,
    call: Fut,
) -> Intercepted<Once<Fut>, impl FnOnce() -> Once<Fut>>
where
    Fut: Future<Output = Result<T, E>> + Unpin,
{
    intercept_kind(gate, ProducerKind::Single, move || stream::once(call))
}

/// Gate a multi-valued producer.
pub fn intercept_stream<S, F, T, E>(gate: Arc<dyn BreakerGate>, produce: F) -> Intercepted<S, F>
where
    S: Stream<Item = Result<T, E>> + Unpin,
    F: FnOnce() -> S + Unpin,
{
    intercept_kind(gate, ProducerKind::Many, produce)
}
