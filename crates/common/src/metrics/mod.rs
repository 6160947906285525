//! Metrics and observability utilities
//!
//! Backend request counters and latency histograms, plus page-level
//! counters, under a shared naming prefix.

use metrics::{counter, describe_counter, describe_histogram, histogram, Unit};
use std::time::Instant;

/// Metrics prefix for all Frequencia metrics
pub const METRICS_PREFIX: &str = "frequencia";

/// Histogram buckets for backend request latency (in seconds)
pub const LATENCY_BUCKETS: &[f64] = &[
    0.005,  // 5ms
    0.010,  // 10ms
    0.025,  // 25ms
    0.050,  // 50ms
    0.100,  // 100ms
    0.250,  // 250ms
    0.500,  // 500ms
    1.000,  // 1s
    2.500,  // 2.5s
    5.000,  // 5s
    10.00,  // 10s
    30.00,  // 30s - request timeout
];

/// Register all metric descriptions
pub fn register_metrics() {
    describe_counter!(
        format!("{}_backend_requests_total", METRICS_PREFIX),
        Unit::Count,
        "Total number of requests sent to the attendance API"
    );

    describe_histogram!(
        format!("{}_backend_request_duration_seconds", METRICS_PREFIX),
        Unit::Seconds,
        "Attendance API request latency in seconds"
    );

    describe_counter!(
        format!("{}_report_generations_total", METRICS_PREFIX),
        Unit::Count,
        "Report regenerations by outcome"
    );

    describe_counter!(
        format!("{}_notifications_total", METRICS_PREFIX),
        Unit::Count,
        "Notification banners shown by kind"
    );

    tracing::info!("Metrics registered");
}

/// Helper to record backend request metrics
pub struct RequestMetrics {
    start: Instant,
    endpoint: String,
    method: String,
}

impl RequestMetrics {
    /// Start tracking a request
    pub fn start(method: &str, endpoint: &str) -> Self {
        Self {
            start: Instant::now(),
            endpoint: endpoint.to_string(),
            method: method.to_string(),
        }
    }

    /// Record request completion; status 0 means no response arrived
    pub fn finish(self, status: u16) {
        let duration = self.start.elapsed().as_secs_f64();

        counter!(
            format!("{}_backend_requests_total", METRICS_PREFIX),
            "method" => self.method.clone(),
            "endpoint" => self.endpoint.clone(),
            "status" => status.to_string()
        )
        .increment(1);

        histogram!(
            format!("{}_backend_request_duration_seconds", METRICS_PREFIX),
            "method" => self.method,
            "endpoint" => self.endpoint
        )
        .record(duration);
    }
}

/// Helper to record a report regeneration
pub fn record_report(outcome: &str) {
    counter!(
        format!("{}_report_generations_total", METRICS_PREFIX),
        "outcome" => outcome.to_string()
    )
    .increment(1);
}

/// Helper to record a notification banner
pub fn record_notification(kind: &str) {
    counter!(
        format!("{}_notifications_total", METRICS_PREFIX),
        "kind" => kind.to_string()
    )
    .increment(1);
}

/// Collapse numeric path segments so metric labels stay bounded
///
/// `/turmas/12/alunos/` becomes `/turmas/{id}/alunos/`.
pub fn endpoint_label(path: &str) -> String {
    path.split('/')
        .map(|segment| {
            if !segment.is_empty() && segment.chars().all(|c| c.is_ascii_digit()) {
                "{id}"
            } else {
                segment
            }
        })
        .collect::<Vec<_>>()
        .join("/")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_latency_buckets() {
        let mut prev = 0.0;
        for &bucket in LATENCY_BUCKETS {
            assert!(bucket > prev);
            prev = bucket;
        }
    }

    #[test]
    fn test_endpoint_label() {
        assert_eq!(endpoint_label("/turmas/12/alunos/"), "/turmas/{id}/alunos/");
        assert_eq!(
            endpoint_label("/relatorio/aluno/3/disciplina/7"),
            "/relatorio/aluno/{id}/disciplina/{id}"
        );
        assert_eq!(endpoint_label("/disciplinas/"), "/disciplinas/");
    }

    #[test]
    fn test_request_metrics() {
        let metrics = RequestMetrics::start("GET", "/turmas/");
        metrics.finish(200);
        record_report("rendered");
        record_notification("success");
        // Just verify it runs without panic
    }
}
