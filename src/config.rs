/// Configuration management for the I2P DNS gateway
use crate::{
    error::{GatewayError, GatewayResult},
    ledger::client::{normalize_transaction_path, DEFAULT_TRANSACTION_PATH},
};
use serde::{Deserialize, Serialize};
use std::env;
use std::time::Duration;

/// Main gateway configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GatewayConfig {
    pub service: ServiceConfig,
    pub ledger: LedgerConfig,
    pub rate_limit: RateLimitSettings,
    pub logging: LoggingConfig,
}

/// Service-level configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServiceConfig {
    pub hostname: String,
    pub port: u16,
}

/// Where records are stored
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum LedgerMode {
    /// Proxy to an external ledger
    Remote { endpoint: String },
    /// Keep records in process memory
    Memory,
}

/// Ledger access configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LedgerConfig {
    pub mode: LedgerMode,
    /// Per-call upstream timeout in seconds
    pub timeout_secs: u64,
    pub transaction_path: String,
    /// Header for the token when the token endpoint does not name one
    pub token_header: String,
    pub user_agent: String,
}

impl LedgerConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

/// Write rate limiting configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RateLimitSettings {
    pub enabled: bool,
    pub writes_per_second: u32,
    pub burst_size: u32,
}

/// Filter used when `RUST_LOG` is unset
pub const DEFAULT_LOG_FILTER: &str = "i2pdns_gateway=debug,tower_http=debug";

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// `EnvFilter` directive string
    pub level: String,
}

impl GatewayConfig {
    /// Load configuration from environment variables
    pub fn from_env() -> GatewayResult<Self> {
        dotenv::dotenv().ok();

        let hostname = env::var("GATEWAY_HOSTNAME").unwrap_or_else(|_| "0.0.0.0".to_string());
        let port = env::var("GATEWAY_PORT")
            .unwrap_or_else(|_| "9090".to_string())
            .parse()
            .map_err(|_| GatewayError::Config("Invalid port number".to_string()))?;

        let mode = match env::var("LEDGER_MODE")
            .unwrap_or_else(|_| "remote".to_string())
            .to_lowercase()
            .as_str()
        {
            "remote" => LedgerMode::Remote {
                endpoint: env::var("DIVA_ENDPOINT").map_err(|_| {
                    GatewayError::Config("DIVA_ENDPOINT is required in remote mode".to_string())
                })?,
            },
            "memory" => LedgerMode::Memory,
            other => {
                return Err(GatewayError::Config(format!(
                    "Unknown LEDGER_MODE '{}' (expected 'remote' or 'memory')",
                    other
                )))
            }
        };

        let timeout_secs = env::var("LEDGER_TIMEOUT_SECS")
            .unwrap_or_else(|_| "10".to_string())
            .parse()
            .map_err(|_| GatewayError::Config("Invalid LEDGER_TIMEOUT_SECS".to_string()))?;
        let transaction_path = normalize_transaction_path(
            &env::var("LEDGER_TRANSACTION_PATH")
                .unwrap_or_else(|_| DEFAULT_TRANSACTION_PATH.to_string()),
        );
        let token_header =
            env::var("LEDGER_TOKEN_HEADER").unwrap_or_else(|_| "diva-token-api".to_string());
        let user_agent = format!("i2pdns-gateway/{}", env!("CARGO_PKG_VERSION"));

        let rate_limit_enabled = env::var("GATEWAY_RATE_LIMITS_ENABLED")
            .unwrap_or_else(|_| "true".to_string())
            .parse()
            .unwrap_or(true);
        let writes_per_second = env::var("GATEWAY_WRITES_PER_SECOND")
            .unwrap_or_else(|_| "10".to_string())
            .parse()
            .unwrap_or(10);
        let burst_size = env::var("GATEWAY_WRITE_BURST")
            .unwrap_or_else(|_| "20".to_string())
            .parse()
            .unwrap_or(20);

        let log_level = env::var("RUST_LOG").unwrap_or_else(|_| DEFAULT_LOG_FILTER.to_string());

        Ok(GatewayConfig {
            service: ServiceConfig { hostname, port },
            ledger: LedgerConfig {
                mode,
                timeout_secs,
                transaction_path,
                token_header,
                user_agent,
            },
            rate_limit: RateLimitSettings {
                enabled: rate_limit_enabled,
                writes_per_second,
                burst_size,
            },
            logging: LoggingConfig { level: log_level },
        })
    }

    /// Configuration for an in-memory gateway, used by tests and local runs
    pub fn in_memory() -> Self {
        GatewayConfig {
            service: ServiceConfig {
                hostname: "127.0.0.1".to_string(),
                port: 9090,
            },
            ledger: LedgerConfig {
                mode: LedgerMode::Memory,
                timeout_secs: 10,
                transaction_path: DEFAULT_TRANSACTION_PATH.to_string(),
                token_header: "diva-token-api".to_string(),
                user_agent: format!("i2pdns-gateway/{}", env!("CARGO_PKG_VERSION")),
            },
            rate_limit: RateLimitSettings {
                enabled: false,
                writes_per_second: 10,
                burst_size: 20,
            },
            logging: LoggingConfig {
                level: DEFAULT_LOG_FILTER.to_string(),
            },
        }
    }

    /// Validate configuration
    pub fn validate(&self) -> GatewayResult<()> {
        if self.service.hostname.is_empty() {
            return Err(GatewayError::Config("Hostname cannot be empty".to_string()));
        }

        if let LedgerMode::Remote { endpoint } = &self.ledger.mode {
            if !(endpoint.starts_with("http://") || endpoint.starts_with("https://")) {
                return Err(GatewayError::Config(format!(
                    "DIVA_ENDPOINT must be an http(s) URL, got '{}'",
                    endpoint
                )));
            }
        }

        if self.ledger.timeout_secs == 0 {
            return Err(GatewayError::Config(
                "LEDGER_TIMEOUT_SECS must be greater than zero".to_string(),
            ));
        }

        if self.ledger.transaction_path.trim_matches('/').is_empty() {
            return Err(GatewayError::Config(
                "LEDGER_TRANSACTION_PATH cannot be empty".to_string(),
            ));
        }

        if tracing_subscriber::EnvFilter::try_new(&self.logging.level).is_err() {
            return Err(GatewayError::Config(format!(
                "Invalid log filter '{}'",
                self.logging.level
            )));
        }

        Ok(())
    }
}
