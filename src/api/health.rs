/// Liveness endpoint
///
/// Answers without touching the ledger, so it reports whether the gateway
/// process is serving, not whether the ledger is reachable.
use crate::context::AppContext;
use axum::{response::Json, routing::get, Router};

/// Build health check routes
pub fn routes() -> Router<AppContext> {
    Router::new().route("/ping", get(ping))
}

/// GET /ping
pub async fn ping() -> Json<&'static str> {
    Json("pong")
}
