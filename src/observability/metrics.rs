//! Metrics collection.
//!
//! # Metrics
//! - `adapter_requests_total` (counter): inbound requests by method
//! - `adapter_resolutions_total` (counter): outcomes (response, verbatim, blocked, failed)
//! - `adapter_proxy_rounds_total` (counter): upstream forwards requested by the control plane
//! - `adapter_resolution_duration_seconds` (histogram): time from request to outcome

use std::time::Instant;

/// Record an inbound request.
pub fn record_request(method: &str) {
    ::metrics::counter!("adapter_requests_total", "method" => method.to_string()).increment(1);
}

/// Record how a resolution ended and how long it took.
pub fn record_resolution(outcome: &'static str, start: Instant) {
    ::metrics::counter!("adapter_resolutions_total", "outcome" => outcome).increment(1);
    ::metrics::histogram!("adapter_resolution_duration_seconds", "outcome" => outcome)
        .record(start.elapsed().as_secs_f64());
}

/// Record one proxy round within a resolution.
pub fn record_proxy_round() {
    ::metrics::counter!("adapter_proxy_rounds_total").increment(1);
}
