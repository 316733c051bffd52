//! Application metrics reporting.
//!
//! Thin wrappers over the `metrics` facade so metric names live in one
//! place. The Prometheus recorder is installed in `main`; without a recorder
//! (tests) these calls are no-ops.

use std::time::Duration;

use metrics::{counter, histogram};

/// Count one API request.
pub fn record_request(endpoint: &'static str) {
    counter!("layers_requests_total", "endpoint" => endpoint).increment(1);
}

/// Record a successfully assembled layer.
pub fn record_assembly(slug: &str, features: usize, elapsed: Duration) {
    histogram!("layers_features_returned").record(features as f64);
    histogram!("layers_assembly_duration_seconds", "slug" => slug.to_string())
        .record(elapsed.as_secs_f64());
}

/// Count a layer dropped from (or failed in) assembly.
pub fn record_assembly_failure() {
    counter!("layers_assembly_failures_total").increment(1);
}

/// Count a legend query that failed and produced no groups.
pub fn record_grouping_failure() {
    counter!("layers_grouping_failures_total").increment(1);
}
