/// Metrics and telemetry for the I2P DNS gateway
///
/// Provides Prometheus-compatible metrics for monitoring:
/// - Gateway requests by operation and status
/// - Ledger call outcomes and latencies
/// - Token refreshes
/// - Validation failures
use axum::{
    extract::{MatchedPath, Request},
    http::header,
    middleware::Next,
    response::{IntoResponse, Response},
};
use lazy_static::lazy_static;
use prometheus::{
    register_histogram_vec, register_int_counter_vec, Encoder, HistogramVec, IntCounterVec,
    TextEncoder,
};

lazy_static! {
    /// Gateway requests by operation and response status
    pub static ref GATEWAY_REQUESTS_TOTAL: IntCounterVec = register_int_counter_vec!(
        "gateway_requests_total",
        "Total number of gateway requests",
        &["operation", "status"]
    )
    .unwrap();

    /// Ledger calls by operation and outcome
    pub static ref LEDGER_CALLS_TOTAL: IntCounterVec = register_int_counter_vec!(
        "ledger_calls_total",
        "Total number of calls to the ledger",
        &["operation", "outcome"]
    )
    .unwrap();

    /// Ledger call duration in seconds
    pub static ref LEDGER_CALL_DURATION_SECONDS: HistogramVec = register_histogram_vec!(
        "ledger_call_duration_seconds",
        "Ledger call latencies in seconds",
        &["operation"],
        vec![0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0]
    )
    .unwrap();

    /// Token refreshes by outcome
    pub static ref TOKEN_REFRESHES_TOTAL: IntCounterVec = register_int_counter_vec!(
        "token_refreshes_total",
        "Total number of ledger token refreshes",
        &["outcome"]
    )
    .unwrap();

    /// Rejected client input by field
    pub static ref VALIDATION_FAILURES_TOTAL: IntCounterVec = register_int_counter_vec!(
        "validation_failures_total",
        "Total number of requests rejected by input validation",
        &["field"]
    )
    .unwrap();
}

/// Render metrics in Prometheus text format
pub fn render_metrics() -> String {
    let encoder = TextEncoder::new();
    let metric_families = prometheus::gather();
    let mut buffer = Vec::new();
    if let Err(e) = encoder.encode(&metric_families, &mut buffer) {
        tracing::error!(error = %e, "failed to encode metrics");
    }
    String::from_utf8_lossy(&buffer).into_owned()
}

/// Record a gateway request
pub fn record_request(operation: &str, status: u16) {
    GATEWAY_REQUESTS_TOTAL
        .with_label_values(&[operation, &status.to_string()])
        .inc();
}

/// Record a ledger call
pub fn record_ledger_call(operation: &str, outcome: &str, duration: f64) {
    LEDGER_CALLS_TOTAL
        .with_label_values(&[operation, outcome])
        .inc();
    LEDGER_CALL_DURATION_SECONDS
        .with_label_values(&[operation])
        .observe(duration);
}

/// Record a token refresh
pub fn record_token_refresh(success: bool) {
    TOKEN_REFRESHES_TOTAL
        .with_label_values(&[if success { "success" } else { "failure" }])
        .inc();
}

/// Record a validation failure
pub fn record_validation_failure(field: &str) {
    VALIDATION_FAILURES_TOTAL.with_label_values(&[field]).inc();
}

/// Operation label for a matched route
fn operation_for(method: &axum::http::Method, route: Option<&str>) -> &'static str {
    match (method.as_str(), route) {
        ("GET", Some("/ping")) => "ping",
        ("GET", Some("/metrics")) => "metrics",
        ("GET", Some("/:domain")) => "resolve",
        ("PUT", Some("/:domain/:address")) => "register",
        _ => "other",
    }
}

/// Middleware counting every request by operation and status
pub async fn track_requests(request: Request, next: Next) -> Response {
    let operation = operation_for(
        request.method(),
        request.extensions().get::<MatchedPath>().map(|p| p.as_str()),
    );

    let response = next.run(request).await;
    record_request(operation, response.status().as_u16());
    response
}

/// GET /metrics
pub async fn metrics_handler() -> impl IntoResponse {
    (
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        render_metrics(),
    )
}
