/// Ledger access layer
///
/// The ledger is the source of truth for domain records. Everything here
/// talks to it through the [`LedgerTransport`] seam, which is backed either
/// by a real HTTP endpoint or by the in-process [`MemoryLedger`].

pub mod client;
pub mod http;
pub mod memory;
pub mod token;

pub use client::LedgerClient;
pub use http::HttpTransport;
pub use memory::MemoryLedger;
pub use token::{AuthToken, TokenManager};

use crate::error::LedgerResult;
use async_trait::async_trait;

/// Path of the read endpoint for a ledger key
pub fn decision_path(key: &str) -> String {
    format!("state/decision:{}", key)
}

/// Path of the token endpoint
pub const TOKEN_PATH: &str = "testnet/token";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LedgerMethod {
    Get,
    Put,
}

/// A request against the ledger, relative to its base URL
#[derive(Debug, Clone)]
pub struct LedgerRequest {
    pub method: LedgerMethod,
    pub path: String,
    pub token: Option<AuthToken>,
    pub body: Option<Vec<u8>>,
}

impl LedgerRequest {
    pub fn get(path: impl Into<String>) -> Self {
        Self {
            method: LedgerMethod::Get,
            path: path.into(),
            token: None,
            body: None,
        }
    }

    pub fn put(path: impl Into<String>, token: AuthToken, body: Vec<u8>) -> Self {
        Self {
            method: LedgerMethod::Put,
            path: path.into(),
            token: Some(token),
            body: Some(body),
        }
    }
}

/// Raw ledger response; the body is never interpreted on reads
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LedgerResponse {
    pub status: u16,
    pub content_type: Option<String>,
    pub body: Vec<u8>,
}

impl LedgerResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Ledger refused the credential attached to the request
    pub fn is_auth_failure(&self) -> bool {
        self.status == 401 || self.status == 403
    }
}

/// Transport to the ledger endpoint
///
/// Implementations return `Ok` for every response the ledger produced,
/// whatever its status, and `LedgerError::Transport` only when no response
/// was obtained.
#[async_trait]
pub trait LedgerTransport: Send + Sync {
    async fn send(&self, request: LedgerRequest) -> LedgerResult<LedgerResponse>;
}
