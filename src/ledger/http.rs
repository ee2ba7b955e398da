/// reqwest-backed transport to a remote ledger
use super::{LedgerMethod, LedgerRequest, LedgerResponse, LedgerTransport};
use crate::error::{LedgerError, LedgerResult};
use async_trait::async_trait;
use reqwest::{header, Client};
use std::time::Duration;

#[derive(Clone)]
pub struct HttpTransport {
    client: Client,
    base_url: String,
}

impl HttpTransport {
    /// Every request made through this transport is bounded by `timeout`;
    /// running out of time is reported as a transport error.
    pub fn new(base_url: &str, timeout: Duration, user_agent: &str) -> LedgerResult<Self> {
        let client = Client::builder()
            .user_agent(user_agent)
            .timeout(timeout)
            .build()
            .map_err(|e| LedgerError::Transport(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn url_for(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }
}

#[async_trait]
impl LedgerTransport for HttpTransport {
    async fn send(&self, request: LedgerRequest) -> LedgerResult<LedgerResponse> {
        let url = self.url_for(&request.path);

        let mut builder = match request.method {
            LedgerMethod::Get => self.client.get(&url),
            LedgerMethod::Put => self.client.put(&url),
        };
        if let Some(token) = &request.token {
            builder = builder.header(token.header.as_str(), token.value.as_str());
        }
        if let Some(body) = request.body {
            builder = builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(body);
        }

        let response = builder.send().await.map_err(|e| {
            if e.is_timeout() {
                LedgerError::Transport(format!("request to {} timed out", url))
            } else {
                LedgerError::Transport(format!("request to {} failed: {}", url, e))
            }
        })?;

        let status = response.status().as_u16();
        let content_type = response
            .headers()
            .get(header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(String::from);
        let body = response
            .bytes()
            .await
            .map_err(|e| LedgerError::Transport(format!("failed to read body from {}: {}", url, e)))?
            .to_vec();

        Ok(LedgerResponse {
            status,
            content_type,
            body,
        })
    }
}
