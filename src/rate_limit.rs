/// Write rate limiting
///
/// Only `PUT` requests are limited: each one costs a ledger transaction.
use crate::{
    config::RateLimitSettings,
    context::AppContext,
    error::{GatewayError, GatewayResult},
};
use axum::{
    extract::{Request, State},
    http::Method,
    middleware::Next,
    response::{IntoResponse, Response},
};
use governor::{
    clock::{Clock, DefaultClock},
    state::{InMemoryState, NotKeyed},
    Quota, RateLimiter as GovernorLimiter,
};
use std::{num::NonZeroU32, sync::Arc};

/// Rate limiter manager
#[derive(Clone)]
pub struct RateLimiter {
    enabled: bool,
    writes: Arc<GovernorLimiter<NotKeyed, InMemoryState, DefaultClock>>,
}

impl RateLimiter {
    pub fn new(settings: &RateLimitSettings) -> Self {
        let quota = Quota::per_second(
            NonZeroU32::new(settings.writes_per_second).unwrap_or(NonZeroU32::MIN),
        )
        .allow_burst(NonZeroU32::new(settings.burst_size).unwrap_or(NonZeroU32::MIN));

        Self {
            enabled: settings.enabled,
            writes: Arc::new(GovernorLimiter::direct(quota)),
        }
    }

    /// Check rate limit for a write
    pub fn check_write(&self) -> GatewayResult<()> {
        if !self.enabled {
            return Ok(());
        }
        self.writes
            .check()
            .map_err(|not_until| GatewayError::RateLimitExceeded {
                retry_after: not_until.wait_time_from(DefaultClock::default().now()),
            })
    }
}

/// Rate limiting middleware
pub async fn rate_limit_middleware(
    State(ctx): State<AppContext>,
    request: Request,
    next: Next,
) -> Response {
    if request.method() == Method::PUT {
        if let Err(e) = ctx.rate_limiter.check_write() {
            tracing::warn!(path = %request.uri().path(), "write rate limit exceeded");
            return e.into_response();
        }
    }

    next.run(request).await
}
