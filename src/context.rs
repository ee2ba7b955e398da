/// Application context and dependency injection
use crate::{
    config::{GatewayConfig, LedgerMode},
    error::GatewayResult,
    ledger::{HttpTransport, LedgerClient, LedgerTransport, MemoryLedger},
    rate_limit::RateLimiter,
};
use std::sync::Arc;

/// Application context holding all shared services
#[derive(Clone)]
pub struct AppContext {
    pub config: Arc<GatewayConfig>,
    /// Shared by every request; owns the single token manager
    pub ledger: Arc<LedgerClient>,
    pub rate_limiter: Arc<RateLimiter>,
}

impl AppContext {
    /// Create a new application context from configuration
    pub fn new(config: GatewayConfig) -> GatewayResult<Self> {
        config.validate()?;

        let transport: Arc<dyn LedgerTransport> = match &config.ledger.mode {
            LedgerMode::Remote { endpoint } => {
                tracing::info!("Proxying records to ledger at {}", endpoint);
                Arc::new(HttpTransport::new(
                    endpoint,
                    config.ledger.timeout(),
                    &config.ledger.user_agent,
                )?)
            }
            LedgerMode::Memory => {
                tracing::info!("Storing records in memory - data is lost on restart");
                Arc::new(MemoryLedger::new(
                    config.ledger.token_header.clone(),
                    &config.ledger.transaction_path,
                ))
            }
        };

        Ok(Self::with_transport(config, transport))
    }

    /// Build a context around an existing transport
    pub fn with_transport(config: GatewayConfig, transport: Arc<dyn LedgerTransport>) -> Self {
        let ledger = Arc::new(LedgerClient::new(
            transport,
            config.ledger.token_header.clone(),
            config.ledger.transaction_path.clone(),
        ));
        let rate_limiter = Arc::new(RateLimiter::new(&config.rate_limit));

        Self {
            config: Arc::new(config),
            ledger,
            rate_limiter,
        }
    }

    /// Get service address
    pub fn bind_address(&self) -> String {
        format!(
            "{}:{}",
            self.config.service.hostname, self.config.service.port
        )
    }
}
