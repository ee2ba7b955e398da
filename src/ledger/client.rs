/// Ledger client: resolve and register against the upstream ledger
use super::{decision_path, LedgerRequest, LedgerResponse, LedgerTransport, TokenManager};
use crate::{
    error::{LedgerError, LedgerResult},
    metrics,
    record::{name_server_key, DnsRecord},
    validation::DomainName,
};
use std::{sync::Arc, time::Instant};
use tracing::{debug, warn};

/// Default path of the transaction endpoint
pub const DEFAULT_TRANSACTION_PATH: &str = "transaction/";

/// Canonical form of a transaction path: no leading `/`, one trailing `/`
pub fn normalize_transaction_path(path: &str) -> String {
    format!("{}/", path.trim_matches('/'))
}

pub struct LedgerClient {
    transport: Arc<dyn LedgerTransport>,
    tokens: TokenManager,
    transaction_path: String,
}

impl LedgerClient {
    pub fn new(
        transport: Arc<dyn LedgerTransport>,
        token_header: impl Into<String>,
        transaction_path: impl Into<String>,
    ) -> Self {
        let tokens = TokenManager::new(Arc::clone(&transport), token_header);
        Self {
            transport,
            tokens,
            transaction_path: normalize_transaction_path(&transaction_path.into()),
        }
    }

    pub fn tokens(&self) -> &TokenManager {
        &self.tokens
    }

    /// Read the ledger state for `I2PDNS:<domain>`.
    ///
    /// Whatever the ledger answers (status and body) is returned untouched;
    /// only a failure to get an answer at all is an error. Never retried.
    pub async fn resolve(&self, domain: &DomainName) -> LedgerResult<LedgerResponse> {
        let path = decision_path(&name_server_key(domain.as_str()));
        let started = Instant::now();

        let result = self.transport.send(LedgerRequest::get(path)).await;

        let outcome = match &result {
            Ok(response) if response.is_success() => "success",
            Ok(_) => "upstream_status",
            Err(_) => "transport_error",
        };
        metrics::record_ledger_call("resolve", outcome, started.elapsed().as_secs_f64());

        if let Ok(response) = &result {
            debug!(domain = %domain, status = response.status, "ledger resolve");
        }
        result
    }

    /// Submit a record to the transaction endpoint.
    ///
    /// A token is obtained first if none is held. If the ledger refuses the
    /// token, it is refreshed once and the write retried once; a second
    /// refusal is an `Auth` error. Other failures are returned immediately.
    pub async fn write(&self, record: &DnsRecord) -> LedgerResult<LedgerResponse> {
        let body = record.encode()?;
        let started = Instant::now();

        let result = self.write_with_retry(record, body).await;

        let outcome = match &result {
            Ok(_) => "success",
            Err(LedgerError::Transport(_)) => "transport_error",
            Err(LedgerError::Auth(_)) => "auth_error",
            Err(LedgerError::UpstreamRejected { .. }) => "rejected",
            Err(LedgerError::Encoding(_)) => "encoding_error",
        };
        metrics::record_ledger_call("write", outcome, started.elapsed().as_secs_f64());
        result
    }

    async fn write_with_retry(
        &self,
        record: &DnsRecord,
        body: Vec<u8>,
    ) -> LedgerResult<LedgerResponse> {
        let token = match self.tokens.current().await {
            Some(token) => token,
            None => self.tokens.refresh().await?,
        };

        let response = self
            .transport
            .send(LedgerRequest::put(&self.transaction_path, token, body.clone()))
            .await?;

        if !response.is_auth_failure() {
            return Self::accept(record, response);
        }

        warn!(
            ns = record.name_server(),
            status = response.status,
            "ledger refused token, refreshing and retrying once"
        );

        let token = self.tokens.refresh().await?;
        let response = self
            .transport
            .send(LedgerRequest::put(&self.transaction_path, token, body))
            .await?;

        if response.is_auth_failure() {
            return Err(LedgerError::Auth(format!(
                "ledger refused refreshed token with status {}",
                response.status
            )));
        }

        Self::accept(record, response)
    }

    fn accept(record: &DnsRecord, response: LedgerResponse) -> LedgerResult<LedgerResponse> {
        if response.is_success() {
            debug!(ns = record.name_server(), seq = record.sequence(), "ledger accepted record");
            Ok(response)
        } else {
            warn!(
                ns = record.name_server(),
                status = response.status,
                body = %String::from_utf8_lossy(&response.body),
                "ledger rejected record"
            );
            Err(LedgerError::UpstreamRejected {
                status: response.status,
                body: response.body,
            })
        }
    }
}
