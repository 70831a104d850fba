//! Metrics collection and exposition.
//!
//! # Metrics
//! - `gateway_requests_total` (counter): requests by method, status, route
//! - `gateway_request_duration_seconds` (histogram): latency by route
//! - `breaker_calls_total` (counter): permission decisions by route
//! - `breaker_outcomes_total` (counter): reported outcomes by route
//! - `gateway_fallbacks_total` (counter): fallback dispatches by route

use std::net::SocketAddr;
use std::time::Instant;

use metrics::{counter, describe_counter, describe_histogram, histogram};
use metrics_exporter_prometheus::PrometheusBuilder;

/// Install the Prometheus exporter on the given address.
pub fn init_metrics(addr: SocketAddr) {
    let builder = PrometheusBuilder::new().with_http_listener(addr);
    match builder.install() {
        Ok(()) => {
            describe_counter!(
                "gateway_requests_total",
                "Total requests by method, status and route"
            );
            describe_histogram!(
                "gateway_request_duration_seconds",
                "Request latency distribution by route"
            );
            describe_counter!(
                "breaker_calls_total",
                "Breaker permission decisions by route"
            );
            describe_counter!(
                "breaker_outcomes_total",
                "Reported call outcomes by route"
            );
            describe_counter!(
                "gateway_fallbacks_total",
                "Fallback dispatches by route"
            );
            tracing::info!(address = %addr, "metrics exporter listening");
        }
        Err(error) => {
            tracing::error!(error = %error, "failed to install metrics exporter");
        }
    }
}

/// Record one completed request.
pub fn record_request(method: &str, status: u16, route: &str, start_time: Instant) {
    counter!(
        "gateway_requests_total",
        "method" => method.to_string(),
        "status" => status.to_string(),
        "route" => route.to_string()
    )
    .increment(1);
    histogram!("gateway_request_duration_seconds", "route" => route.to_string())
        .record(start_time.elapsed().as_secs_f64());
}

/// Record a breaker permission decision.
pub fn record_permission(route: &str, permitted: bool) {
    let decision = if permitted { "permitted" } else { "rejected" };
    counter!(
        "breaker_calls_total",
        "route" => route.to_string(),
        "decision" => decision
    )
    .increment(1);
}

/// Record a reported call outcome.
pub fn record_outcome(route: &str, success: bool) {
    let outcome = if success { "success" } else { "failure" };
    counter!(
        "breaker_outcomes_total",
        "route" => route.to_string(),
        "outcome" => outcome
    )
    .increment(1);
}

/// Record a fallback dispatch.
pub fn record_fallback(route: &str) {
    counter!("gateway_fallbacks_total", "route" => route.to_string()).increment(1);
}
