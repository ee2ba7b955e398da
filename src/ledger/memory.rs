/// In-process ledger
///
/// Serves the same request/response contract as a remote ledger so the
/// gateway can run without one. Records live only as long as the process.
use super::{
    client::normalize_transaction_path, LedgerMethod, LedgerRequest, LedgerResponse,
    LedgerTransport, TOKEN_PATH,
};
use crate::{
    error::LedgerResult,
    record::{DATA_COMMAND, NAME_SERVER_PREFIX},
};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::collections::{HashMap, HashSet};
use tokio::sync::RwLock;
use tracing::debug;

const DECISION_PREFIX: &str = "state/decision:";

/// Transaction body as it arrives on the wire
#[derive(Debug, Clone, Serialize, Deserialize)]
struct TransactionPayload {
    seq: u64,
    command: String,
    ns: String,
    d: String,
}

pub struct MemoryLedger {
    token_header: String,
    transaction_path: String,
    tokens: RwLock<HashSet<String>>,
    records: RwLock<HashMap<String, TransactionPayload>>,
}

impl MemoryLedger {
    /// `transaction_path` is matched after normalization, so `tx`, `/tx`
    /// and `tx/` all name the same endpoint.
    pub fn new(token_header: impl Into<String>, transaction_path: &str) -> Self {
        Self {
            token_header: token_header.into(),
            transaction_path: normalize_transaction_path(transaction_path),
            tokens: RwLock::new(HashSet::new()),
            records: RwLock::new(HashMap::new()),
        }
    }

    /// Invalidate every token issued so far
    pub async fn revoke_tokens(&self) {
        self.tokens.write().await.clear();
    }

    /// Number of stored records
    pub async fn len(&self) -> usize {
        self.records.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.records.read().await.is_empty()
    }

    async fn issue_token(&self) -> LedgerResponse {
        let token = uuid::Uuid::new_v4().to_string();
        self.tokens.write().await.insert(token.clone());
        json_response(200, json!({ "header": self.token_header, "token": token }))
    }

    async fn read_decision(&self, key: &str) -> LedgerResponse {
        match self.records.read().await.get(key) {
            Some(payload) => payload_response(200, payload),
            None => json_response(404, json!({ "message": "not found" })),
        }
    }

    async fn apply_transaction(&self, request: &LedgerRequest) -> LedgerResponse {
        let authorized = match &request.token {
            Some(token) if token.header == self.token_header => {
                self.tokens.read().await.contains(&token.value)
            }
            _ => false,
        };
        if !authorized {
            return json_response(401, json!({ "message": "invalid token" }));
        }

        let payload: TransactionPayload =
            match serde_json::from_slice(request.body.as_deref().unwrap_or_default()) {
                Ok(payload) => payload,
                Err(e) => {
                    return json_response(400, json!({ "message": format!("invalid payload: {}", e) }))
                }
            };

        if let Err(message) = check_payload(&payload) {
            return json_response(400, json!({ "message": message }));
        }

        let mut records = self.records.write().await;
        if let Some(existing) = records.get(&payload.ns) {
            if payload.seq <= existing.seq {
                return json_response(
                    409,
                    json!({
                        "message": "sequence not greater than current record",
                        "current": existing.seq,
                    }),
                );
            }
        }

        debug!(ns = %payload.ns, seq = payload.seq, "memory ledger stored record");
        let response = payload_response(200, &payload);
        records.insert(payload.ns.clone(), payload);
        response
    }
}

fn check_payload(payload: &TransactionPayload) -> Result<(), String> {
    if payload.command != DATA_COMMAND {
        return Err(format!("unsupported command: {}", payload.command));
    }
    let domain = payload
        .ns
        .strip_prefix(NAME_SERVER_PREFIX)
        .ok_or_else(|| "ns must carry the I2PDNS prefix".to_string())?;
    match payload.d.split_once('=') {
        Some((name, value)) if name == domain && !value.is_empty() => Ok(()),
        _ => Err("data does not match ns".to_string()),
    }
}

/// Payload echoed with its wire field order intact
fn payload_response(status: u16, payload: &TransactionPayload) -> LedgerResponse {
    match serde_json::to_vec(payload) {
        Ok(body) => LedgerResponse {
            status,
            content_type: Some("application/json".to_string()),
            body,
        },
        Err(e) => json_response(500, json!({ "message": e.to_string() })),
    }
}

fn json_response(status: u16, body: serde_json::Value) -> LedgerResponse {
    LedgerResponse {
        status,
        content_type: Some("application/json".to_string()),
        body: body.to_string().into_bytes(),
    }
}

#[async_trait]
impl LedgerTransport for MemoryLedger {
    async fn send(&self, request: LedgerRequest) -> LedgerResult<LedgerResponse> {
        let response = match request.method {
            LedgerMethod::Get if request.path == TOKEN_PATH => self.issue_token().await,
            LedgerMethod::Get => match request.path.strip_prefix(DECISION_PREFIX) {
                Some(key) => self.read_decision(key).await,
                None => json_response(404, json!({ "message": "unknown endpoint" })),
            },
            LedgerMethod::Put
                if normalize_transaction_path(&request.path) == self.transaction_path =>
            {
                self.apply_transaction(&request).await
            }
            LedgerMethod::Put => json_response(404, json!({ "message": "unknown endpoint" })),
        };
        Ok(response)
    }
}
