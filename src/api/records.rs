/// Domain record endpoints: resolve and register
use crate::{
    error::{GatewayError, GatewayResult},
    metrics,
    record::{build_record, DnsRecord, DEFAULT_SEQUENCE},
    validation::{Base32Address, DomainName},
    AppContext,
};
use axum::{
    extract::{Path, Query, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, put},
    Json, Router,
};
use axum_extra::extract::WithRejection;
use serde::Deserialize;

/// Build record routes
pub fn routes() -> Router<AppContext> {
    Router::new()
        .route("/:domain", get(resolve_record))
        .route("/:domain/:address", put(register_record))
}

/// Optional query parameters for registration
#[derive(Debug, Deserialize)]
pub struct RegisterParams {
    /// Sequence number; kept as text so a bad value reports a field error
    pub seq: Option<String>,
}

fn parse_domain(input: &str) -> GatewayResult<DomainName> {
    DomainName::parse(input).inspect_err(|_| metrics::record_validation_failure("domain"))
}

fn parse_address(input: &str) -> GatewayResult<Base32Address> {
    Base32Address::parse(input).inspect_err(|_| metrics::record_validation_failure("address"))
}

fn parse_sequence(input: Option<&str>) -> GatewayResult<u64> {
    match input {
        None => Ok(DEFAULT_SEQUENCE),
        Some(raw) => match raw.parse::<u64>() {
            Ok(seq) if seq > 0 => Ok(seq),
            _ => {
                metrics::record_validation_failure("seq");
                Err(GatewayError::validation(
                    "seq",
                    "seq must be a positive integer",
                ))
            }
        },
    }
}

/// GET /{domain}
///
/// Mirrors the ledger's status and body verbatim.
pub async fn resolve_record(
    State(ctx): State<AppContext>,
    WithRejection(Path(domain), _): WithRejection<Path<String>, GatewayError>,
) -> GatewayResult<Response> {
    let domain = parse_domain(&domain)?;

    let upstream = ctx.ledger.resolve(&domain).await.map_err(|e| {
        tracing::warn!(domain = %domain, error = %e, "could not resolve domain with ledger");
        e
    })?;

    let status =
        StatusCode::from_u16(upstream.status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    let content_type = upstream
        .content_type
        .unwrap_or_else(|| "application/json".to_string());

    Ok((status, [(header::CONTENT_TYPE, content_type)], upstream.body).into_response())
}

/// PUT /{domain}/{address}
///
/// The domain is checked before the address, so when both are invalid
/// only the domain is reported.
pub async fn register_record(
    State(ctx): State<AppContext>,
    WithRejection(Path((domain, address)), _): WithRejection<
        Path<(String, String)>,
        GatewayError,
    >,
    WithRejection(Query(params), _): WithRejection<Query<RegisterParams>, GatewayError>,
) -> GatewayResult<(StatusCode, Json<DnsRecord>)> {
    let domain = parse_domain(&domain)?;
    let address = parse_address(&address)?;
    let seq = parse_sequence(params.seq.as_deref())?;

    let record = build_record(&domain, &address, seq);

    ctx.ledger.write(&record).await.map_err(|e| {
        tracing::warn!(domain = %domain, error = %e, "could not add record to ledger");
        e
    })?;

    tracing::info!(domain = %domain, seq, "registered domain");
    Ok((StatusCode::CREATED, Json(record)))
}
