//! Property tests for the call-interception protocol.
//!
//! Every test drives a scripted producer through the interceptor and
//! asserts on what the gate saw: exactly one outcome per permitted call,
//! no outcome for denied or abandoned-without-progress calls, and timing
//! taken at the correct signal.

use std::error::Error;
use std::fmt;
use std::pin::Pin;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::task::Poll;
use std::time::Duration;

use futures_util::stream::{self, Stream, StreamExt};

use breaker_gateway::breaker::{BreakerGate, CallOutcome, CircuitOpenError};
use breaker_gateway::intercept::{intercept_kind, intercept_stream, GateError, ProducerKind};

#[derive(Debug)]
struct TestError(String);

impl TestError {
    fn new(msg: &str) -> Self {
        TestError(msg.to_string())
    }
}

impl fmt::Display for TestError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Test error: {}", self.0)
    }
}

impl Error for TestError {}

/// Gate that records every report and can be scripted to deny.
#[derive(Debug, Default)]
struct RecordingGate {
    open: AtomicBool,
    successes: Mutex<Vec<CallOutcome>>,
    failures: Mutex<Vec<CallOutcome>>,
}

impl RecordingGate {
    fn denying() -> Self {
        let gate = Self::default();
        gate.open.store(true, Ordering::SeqCst);
        gate
    }

    fn success_count(&self) -> usize {
        self.successes.lock().unwrap().len()
    }

    fn failure_count(&self) -> usize {
        self.failures.lock().unwrap().len()
    }

    fn success_durations(&self) -> Vec<Duration> {
        self.successes.lock().unwrap().iter().map(|o| o.duration).collect()
    }
}

impl BreakerGate for RecordingGate {
    fn name(&self) -> &str {
        "recording"
    }

    fn acquire_permission(&self) -> Result<(), CircuitOpenError> {
        if self.open.load(Ordering::SeqCst) {
            Err(CircuitOpenError::new("recording"))
        } else {
            Ok(())
        }
    }

    fn report_success(&self, outcome: CallOutcome) {
        self.successes.lock().unwrap().push(outcome);
    }

    fn report_failure(&self, outcome: CallOutcome) {
        self.failures.lock().unwrap().push(outcome);
    }
}

fn as_gate(gate: &Arc<RecordingGate>) -> Arc<dyn BreakerGate> {
    gate.clone()
}

#[tokio::test]
async fn test_single_value_reports_success_exactly_once() {
    let gate = Arc::new(RecordingGate::default());
    let mut stream = intercept_kind(as_gate(&gate), ProducerKind::Single, || {
        stream::iter(vec![Ok::<_, TestError>(7)])
    });

    assert!(matches!(stream.next().await, Some(Ok(7))));
    // Success is recorded at the value, before completion is even polled.
    assert_eq!(gate.success_count(), 1);

    assert!(stream.next().await.is_none());
    drop(stream);

    assert_eq!(gate.success_count(), 1);
    assert_eq!(gate.failure_count(), 0);
}

#[tokio::test]
async fn test_multi_value_reports_success_only_at_completion() {
    let gate = Arc::new(RecordingGate::default());
    let mut stream = intercept_stream(as_gate(&gate), || {
        stream::iter(vec![Ok::<_, TestError>(1), Ok(2), Ok(3)])
    });

    for expected in 1..=3 {
        match stream.next().await {
            Some(Ok(value)) => assert_eq!(value, expected),
            _ => panic!("expected value {}", expected),
        }
        assert_eq!(gate.success_count(), 0, "no report before completion");
    }

    assert!(stream.next().await.is_none());
    assert_eq!(gate.success_count(), 1);
    assert_eq!(gate.failure_count(), 0);
}

#[tokio::test]
async fn test_error_reports_failure_exactly_once() {
    let gate = Arc::new(RecordingGate::default());
    let mut stream = intercept_stream(as_gate(&gate), || {
        stream::iter(vec![Ok::<_, TestError>(1), Err(TestError::new("boom"))])
    });

    assert!(matches!(stream.next().await, Some(Ok(1))));
    assert!(matches!(
        stream.next().await,
        Some(Err(GateError::Call(_)))
    ));

    assert_eq!(gate.failure_count(), 1);
    assert_eq!(gate.success_count(), 0);

    // The stream is fused after the terminal error; dropping it must not
    // add a report either.
    assert!(stream.next().await.is_none());
    drop(stream);
    assert_eq!(gate.failure_count(), 1);
    assert_eq!(gate.success_count(), 0);
}

#[tokio::test]
async fn test_denied_call_never_subscribes_and_never_reports() {
    let gate = Arc::new(RecordingGate::denying());
    let subscriptions = Arc::new(AtomicUsize::new(0));

    let subs = subscriptions.clone();
    let mut stream = intercept_kind(as_gate(&gate), ProducerKind::Single, move || {
        subs.fetch_add(1, Ordering::SeqCst);
        stream::iter(vec![Ok::<_, TestError>(1)])
    });

    assert!(matches!(
        stream.next().await,
        Some(Err(GateError::Open(_)))
    ));
    assert!(stream.next().await.is_none());
    drop(stream);

    assert_eq!(subscriptions.load(Ordering::SeqCst), 0);
    assert_eq!(gate.success_count(), 0);
    assert_eq!(gate.failure_count(), 0);
}

#[tokio::test]
async fn test_cancellation_without_data_is_silent() {
    let gate = Arc::new(RecordingGate::default());
    let mut stream =
        intercept_stream(as_gate(&gate), || stream::pending::<Result<i32, TestError>>());

    // Subscribe (first poll acquires permission) without receiving a value.
    std::future::poll_fn(|cx| {
        assert!(Pin::new(&mut stream).poll_next(cx).is_pending());
        Poll::Ready(())
    })
    .await;

    drop(stream);

    assert_eq!(gate.success_count(), 0);
    assert_eq!(gate.failure_count(), 0);
}

#[tokio::test]
async fn test_cancellation_with_data_reports_success() {
    let gate = Arc::new(RecordingGate::default());
    let mut stream = intercept_stream(as_gate(&gate), || {
        stream::iter(vec![Ok::<_, TestError>(1)]).chain(stream::pending())
    });

    assert!(matches!(stream.next().await, Some(Ok(1))));
    assert_eq!(gate.success_count(), 0, "no report before abandonment");

    drop(stream);

    assert_eq!(gate.success_count(), 1);
    assert_eq!(gate.failure_count(), 0);
}

#[tokio::test(start_paused = true)]
async fn test_timeout_abandonment_counts_as_cancellation() {
    let gate = Arc::new(RecordingGate::default());
    let mut stream = intercept_stream(as_gate(&gate), || {
        stream::iter(vec![Ok::<_, TestError>(1)]).chain(stream::pending())
    });

    assert!(matches!(stream.next().await, Some(Ok(1))));

    // A caller-side deadline gives up on the next value.
    let next = tokio::time::timeout(Duration::from_millis(10), stream.next()).await;
    assert!(next.is_err());
    drop(stream);

    assert_eq!(gate.success_count(), 1);
    assert_eq!(gate.failure_count(), 0);
}

#[tokio::test(start_paused = true)]
async fn test_single_value_success_timed_at_value_arrival() {
    let gate = Arc::new(RecordingGate::default());
    let mut stream = intercept_kind(as_gate(&gate), ProducerKind::Single, || {
        stream::unfold(0u32, |step| async move {
            match step {
                0 => {
                    tokio::time::sleep(Duration::from_millis(50)).await;
                    Some((Ok::<_, TestError>(42), 1))
                }
                1 => {
                    tokio::time::sleep(Duration::from_millis(2)).await;
                    None
                }
                _ => None,
            }
        })
        .boxed()
    });

    assert!(matches!(stream.next().await, Some(Ok(42))));
    assert!(stream.next().await.is_none());

    // Timed at the value (t=50ms), not at completion (t=52ms).
    assert_eq!(gate.success_durations(), vec![Duration::from_millis(50)]);
    assert_eq!(gate.failure_count(), 0);
}

#[tokio::test(start_paused = true)]
async fn test_multi_value_success_timed_at_completion() {
    let gate = Arc::new(RecordingGate::default());
    let mut stream = intercept_kind(as_gate(&gate), ProducerKind::Many, || {
        stream::unfold(0u32, |step| async move {
            tokio::time::sleep(Duration::from_millis(10)).await;
            if step < 3 {
                Some((Ok::<_, TestError>(step), step + 1))
            } else {
                None
            }
        })
        .boxed()
    });

    let mut values = 0;
    while let Some(item) = stream.next().await {
        item.unwrap();
        values += 1;
        assert_eq!(gate.success_count(), 0, "no report before completion");
    }

    assert_eq!(values, 3);
    // Values arrived at t=10,20,30ms; completion at t=40ms owns the report.
    assert_eq!(gate.success_durations(), vec![Duration::from_millis(40)]);
}

#[tokio::test]
async fn test_error_after_single_value_success_is_not_double_reported() {
    let gate = Arc::new(RecordingGate::default());
    let mut stream = intercept_kind(as_gate(&gate), ProducerKind::Single, || {
        stream::iter(vec![Ok::<_, TestError>(1), Err(TestError::new("late"))])
    });

    assert!(matches!(stream.next().await, Some(Ok(1))));
    assert_eq!(gate.success_count(), 1);

    // The producer violates its single-value contract. The error is still
    // forwarded, but the gate hears nothing new.
    assert!(matches!(
        stream.next().await,
        Some(Err(GateError::Call(_)))
    ));

    assert_eq!(gate.success_count(), 1);
    assert_eq!(gate.failure_count(), 0);
}

#[tokio::test]
async fn test_failure_outcome_carries_error_description() {
    let gate = Arc::new(RecordingGate::default());
    let mut stream = intercept_kind(as_gate(&gate), ProducerKind::Single, || {
        stream::iter(vec![Err::<i32, _>(TestError::new("boom"))])
    });

    assert!(matches!(
        stream.next().await,
        Some(Err(GateError::Call(_)))
    ));

    let failures = gate.failures.lock().unwrap();
    assert_eq!(failures.len(), 1);
    assert_eq!(failures[0].error.as_deref(), Some("Test error: boom"));
}
