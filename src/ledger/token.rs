/// Upstream authentication token management
///
/// The ledger publishes no expiry for its tokens, so the manager never
/// refreshes on a clock. It starts unset and is refreshed on demand,
/// either because no token exists yet or because the ledger refused one.
use super::{LedgerRequest, LedgerTransport, TOKEN_PATH};
use crate::{
    error::{LedgerError, LedgerResult},
    metrics,
};
use serde::Deserialize;
use std::{fmt, sync::Arc};
use tokio::sync::RwLock;
use tracing::{debug, warn};

/// Bearer credential plus the header it travels in
#[derive(Clone, PartialEq, Eq)]
pub struct AuthToken {
    pub header: String,
    pub value: String,
}

impl fmt::Debug for AuthToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AuthToken")
            .field("header", &self.header)
            .field("value", &"<redacted>")
            .finish()
    }
}

/// Body of the token endpoint response
#[derive(Debug, Deserialize)]
struct TokenResponse {
    token: Option<String>,
    header: Option<String>,
}

pub struct TokenManager {
    transport: Arc<dyn LedgerTransport>,
    default_header: String,
    current: RwLock<Option<AuthToken>>,
}

impl TokenManager {
    pub fn new(transport: Arc<dyn LedgerTransport>, default_header: impl Into<String>) -> Self {
        Self {
            transport,
            default_header: default_header.into(),
            current: RwLock::new(None),
        }
    }

    /// Current token, if one has been issued and not invalidated
    pub async fn current(&self) -> Option<AuthToken> {
        self.current.read().await.clone()
    }

    /// Fetch a fresh token and replace the current one.
    ///
    /// On any failure the manager is left unset.
    pub async fn refresh(&self) -> LedgerResult<AuthToken> {
        match self.fetch().await {
            Ok(token) => {
                *self.current.write().await = Some(token.clone());
                metrics::record_token_refresh(true);
                debug!(header = %token.header, "ledger token refreshed");
                Ok(token)
            }
            Err(e) => {
                *self.current.write().await = None;
                metrics::record_token_refresh(false);
                warn!(error = %e, "ledger token refresh failed");
                Err(e)
            }
        }
    }

    async fn fetch(&self) -> LedgerResult<AuthToken> {
        let response = self
            .transport
            .send(LedgerRequest::get(TOKEN_PATH))
            .await
            .map_err(|e| LedgerError::Auth(format!("token endpoint unreachable: {}", e)))?;

        if !response.is_success() {
            return Err(LedgerError::Auth(format!(
                "token endpoint returned status {}",
                response.status
            )));
        }

        let parsed: TokenResponse = serde_json::from_slice(&response.body)
            .map_err(|e| LedgerError::Auth(format!("malformed token response: {}", e)))?;

        let value = parsed
            .token
            .filter(|t| !t.is_empty())
            .ok_or_else(|| LedgerError::Auth("token response has no token".to_string()))?;

        let header = parsed
            .header
            .filter(|h| !h.is_empty())
            .unwrap_or_else(|| self.default_header.clone());

        Ok(AuthToken { header, value })
    }
}
