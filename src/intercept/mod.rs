//! Call interception core.
//!
//! # Data Flow
//! ```text
//! caller subscribes to the intercepted producer:
//!     → interceptor.rs: gate.acquire_permission(), synchronously, before
//!       the wrapped producer is ever constructed; denial surfaces on the
//!       ordinary error channel
//!     → tracker.rs: every signal the producer emits (value, completion,
//!       error) and caller-side cancellation pass through the outcome
//!       tracker, which reports exactly one outcome to the gate
//!     → caller observes the producer's signals untouched
//! ```
//!
//! # Design Decisions
//! - One tagged implementation (`single_value`) covers both producer kinds;
//!   the flag only changes when success is first recordable
//! - The set-once report flag is a true compare-and-set; whichever signal
//!   claims it first owns the report
//! - Cancellation with no prior value reports nothing: an abandoned call
//!   that made no progress says nothing about target health

pub mod interceptor;
pub mod kind;
pub mod tracker;

pub use interceptor::{GateError, Intercepted};
pub use kind::{
    intercept_call, intercept_kind, intercept_stream, ProducerKind, UnsupportedProducerKindError,
};
pub use tracker::OutcomeStream;
