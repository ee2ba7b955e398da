//! Shared test doubles for the ledger seam
#![allow(dead_code)]

use async_trait::async_trait;
use i2pdns_gateway::{
    config::GatewayConfig,
    context::AppContext,
    error::{LedgerError, LedgerResult},
    ledger::{LedgerMethod, LedgerRequest, LedgerResponse, LedgerTransport, TOKEN_PATH},
};
use std::{
    collections::VecDeque,
    sync::{
        atomic::{AtomicUsize, Ordering},
        Arc, Mutex,
    },
};

pub const ADDRESS: &str = "ukeu3k5oycgaauneqgtnvselmt4yemvoilkln7jpvamvfx7dnkdq";

/// Ledger double answering from per-endpoint scripts and counting calls.
///
/// Once a script runs out, the endpoint falls back to success: tokens are
/// issued as `token-<n>`, writes get 200, reads get 200 with `read_body`.
#[derive(Default)]
pub struct ScriptedLedger {
    token_script: Mutex<VecDeque<LedgerResult<LedgerResponse>>>,
    write_script: Mutex<VecDeque<LedgerResult<LedgerResponse>>>,
    read_script: Mutex<VecDeque<LedgerResult<LedgerResponse>>>,
    read_body: Mutex<Vec<u8>>,
    requests: Mutex<Vec<LedgerRequest>>,
    token_calls: AtomicUsize,
    write_calls: AtomicUsize,
    read_calls: AtomicUsize,
}

pub fn response(status: u16, body: &str) -> LedgerResult<LedgerResponse> {
    Ok(LedgerResponse {
        status,
        content_type: Some("application/json".to_string()),
        body: body.as_bytes().to_vec(),
    })
}

pub fn unreachable() -> LedgerResult<LedgerResponse> {
    Err(LedgerError::Transport("connection refused".to_string()))
}

impl ScriptedLedger {
    pub fn new() -> Self {
        let ledger = Self::default();
        *ledger.read_body.lock().unwrap() = br#"{"seq":1}"#.to_vec();
        ledger
    }

    pub fn script_tokens(self, script: Vec<LedgerResult<LedgerResponse>>) -> Self {
        self.token_script.lock().unwrap().extend(script);
        self
    }

    pub fn script_writes(self, script: Vec<LedgerResult<LedgerResponse>>) -> Self {
        self.write_script.lock().unwrap().extend(script);
        self
    }

    pub fn script_reads(self, script: Vec<LedgerResult<LedgerResponse>>) -> Self {
        self.read_script.lock().unwrap().extend(script);
        self
    }

    pub fn token_calls(&self) -> usize {
        self.token_calls.load(Ordering::SeqCst)
    }

    pub fn write_calls(&self) -> usize {
        self.write_calls.load(Ordering::SeqCst)
    }

    pub fn read_calls(&self) -> usize {
        self.read_calls.load(Ordering::SeqCst)
    }

    pub fn total_calls(&self) -> usize {
        self.token_calls() + self.write_calls() + self.read_calls()
    }

    /// Every write request seen, in order
    pub fn writes(&self) -> Vec<LedgerRequest> {
        self.requests
            .lock()
            .unwrap()
            .iter()
            .filter(|r| r.method == LedgerMethod::Put)
            .cloned()
            .collect()
    }

    /// Every read request seen, in order
    pub fn reads(&self) -> Vec<LedgerRequest> {
        self.requests
            .lock()
            .unwrap()
            .iter()
            .filter(|r| r.method == LedgerMethod::Get && r.path != TOKEN_PATH)
            .cloned()
            .collect()
    }
}

#[async_trait]
impl LedgerTransport for ScriptedLedger {
    async fn send(&self, request: LedgerRequest) -> LedgerResult<LedgerResponse> {
        self.requests.lock().unwrap().push(request.clone());

        match (request.method, request.path.as_str()) {
            (LedgerMethod::Get, TOKEN_PATH) => {
                let n = self.token_calls.fetch_add(1, Ordering::SeqCst) + 1;
                let scripted = self.token_script.lock().unwrap().pop_front();
                scripted.unwrap_or_else(|| response(200, &format!(r#"{{"token":"token-{}"}}"#, n)))
            }
            (LedgerMethod::Get, _) => {
                self.read_calls.fetch_add(1, Ordering::SeqCst);
                let scripted = self.read_script.lock().unwrap().pop_front();
                scripted.unwrap_or_else(|| {
                    let body = self.read_body.lock().unwrap().clone();
                    Ok(LedgerResponse {
                        status: 200,
                        content_type: Some("application/json".to_string()),
                        body,
                    })
                })
            }
            (LedgerMethod::Put, _) => {
                self.write_calls.fetch_add(1, Ordering::SeqCst);
                let scripted = self.write_script.lock().unwrap().pop_front();
                scripted.unwrap_or_else(|| response(200, r#"{"ok":true}"#))
            }
        }
    }
}

/// Context wired to a scripted ledger, rate limiting off
pub fn context_with(ledger: Arc<ScriptedLedger>) -> AppContext {
    AppContext::with_transport(GatewayConfig::in_memory(), ledger)
}
