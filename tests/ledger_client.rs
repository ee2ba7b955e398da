/// Ledger client contract tests: token refresh, retry bound, pass-through reads
mod common;

use common::{response, unreachable, ScriptedLedger, ADDRESS};
use i2pdns_gateway::{
    error::LedgerError,
    ledger::{client::DEFAULT_TRANSACTION_PATH, LedgerClient},
    record::{build_record, DnsRecord},
    validation::{Base32Address, DomainName},
};
use std::sync::Arc;

fn client(ledger: &Arc<ScriptedLedger>) -> LedgerClient {
    LedgerClient::new(ledger.clone(), "diva-token-api", DEFAULT_TRANSACTION_PATH)
}

fn record() -> DnsRecord {
    build_record(
        &DomainName::parse("example.i2p").unwrap(),
        &Base32Address::parse(ADDRESS).unwrap(),
        1,
    )
}

#[tokio::test]
async fn test_single_auth_failure_refreshes_and_retries_once() {
    let ledger = Arc::new(ScriptedLedger::new().script_writes(vec![response(401, "")]));
    let client = client(&ledger);
    client.tokens().refresh().await.unwrap();

    let result = client.write(&record()).await;

    assert!(result.is_ok());
    assert_eq!(ledger.token_calls(), 2, "exactly one refresh after the rejection");
    assert_eq!(ledger.write_calls(), 2, "exactly one retry");

    let writes = ledger.writes();
    let first = writes[0].token.as_ref().unwrap();
    let second = writes[1].token.as_ref().unwrap();
    assert_eq!(first.value, "token-1");
    assert_eq!(second.value, "token-2");
}

#[tokio::test]
async fn test_double_auth_failure_stops_after_one_retry() {
    let ledger = Arc::new(
        ScriptedLedger::new().script_writes(vec![response(401, ""), response(403, "")]),
    );
    let client = client(&ledger);
    client.tokens().refresh().await.unwrap();

    let result = client.write(&record()).await;

    assert!(matches!(result, Err(LedgerError::Auth(_))));
    assert_eq!(ledger.token_calls(), 2);
    assert_eq!(ledger.write_calls(), 2);
}

#[tokio::test]
async fn test_missing_token_is_fetched_before_first_write() {
    let ledger = Arc::new(ScriptedLedger::new());
    let client = client(&ledger);

    client.write(&record()).await.unwrap();

    assert_eq!(ledger.token_calls(), 1);
    assert_eq!(ledger.write_calls(), 1);
    let writes = ledger.writes();
    let token = writes[0].token.as_ref().unwrap();
    assert_eq!(token.header, "diva-token-api");
    assert_eq!(writes[0].path, "transaction/");
}

#[tokio::test]
async fn test_token_is_reused_across_writes() {
    let ledger = Arc::new(ScriptedLedger::new());
    let client = client(&ledger);

    client.write(&record()).await.unwrap();
    client.write(&record()).await.unwrap();

    assert_eq!(ledger.token_calls(), 1);
    assert_eq!(ledger.write_calls(), 2);
}

#[tokio::test]
async fn test_malformed_token_response_prevents_transaction() {
    let ledger = Arc::new(ScriptedLedger::new().script_tokens(vec![response(200, "{not json")]));
    let client = client(&ledger);

    let result = client.write(&record()).await;

    assert!(matches!(result, Err(LedgerError::Auth(_))));
    assert_eq!(ledger.write_calls(), 0);
    assert!(client.tokens().current().await.is_none());
}

#[tokio::test]
async fn test_failed_refresh_after_rejection_is_auth_error() {
    let ledger = Arc::new(
        ScriptedLedger::new()
            .script_tokens(vec![response(200, r#"{"token":"first"}"#), unreachable()])
            .script_writes(vec![response(401, "")]),
    );
    let client = client(&ledger);

    let result = client.write(&record()).await;

    assert!(matches!(result, Err(LedgerError::Auth(_))));
    assert_eq!(ledger.write_calls(), 1);
}

#[tokio::test]
async fn test_rejection_is_not_retried() {
    let ledger = Arc::new(
        ScriptedLedger::new().script_writes(vec![response(409, r#"{"message":"exists"}"#)]),
    );
    let client = client(&ledger);

    match client.write(&record()).await {
        Err(LedgerError::UpstreamRejected { status, body }) => {
            assert_eq!(status, 409);
            assert_eq!(body, br#"{"message":"exists"}"#.to_vec());
        }
        other => panic!("unexpected result: {:?}", other),
    }
    assert_eq!(ledger.write_calls(), 1);
    assert_eq!(ledger.token_calls(), 1);
}

#[tokio::test]
async fn test_transport_failure_is_not_retried() {
    let ledger = Arc::new(ScriptedLedger::new().script_writes(vec![unreachable()]));
    let client = client(&ledger);

    let result = client.write(&record()).await;

    assert!(matches!(result, Err(LedgerError::Transport(_))));
    assert_eq!(ledger.write_calls(), 1);
}

#[tokio::test]
async fn test_write_body_is_canonical_record() {
    let ledger = Arc::new(ScriptedLedger::new());
    let client = client(&ledger);

    client.write(&record()).await.unwrap();

    let body = ledger.writes()[0].body.clone().unwrap();
    let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(json["seq"], 1);
    assert_eq!(json["command"], "data");
    assert_eq!(json["ns"], "I2PDNS:example.i2p");
    assert_eq!(json["d"], format!("example.i2p={}", ADDRESS));
}

#[tokio::test]
async fn test_concurrent_writes_tolerate_duplicate_refresh() {
    let ledger = Arc::new(ScriptedLedger::new());
    let client = Arc::new(client(&ledger));

    let handles: Vec<_> = (0..8)
        .map(|_| {
            let client = Arc::clone(&client);
            tokio::spawn(async move { client.write(&record()).await })
        })
        .collect();

    for handle in handles {
        assert!(handle.await.unwrap().is_ok());
    }
    assert_eq!(ledger.write_calls(), 8);
    assert!((1..=8).contains(&ledger.token_calls()));
    assert!(client.tokens().current().await.is_some());
}

#[tokio::test]
async fn test_resolve_reads_decision_key_and_passes_status_through() {
    let ledger = Arc::new(ScriptedLedger::new().script_reads(vec![response(503, "busy")]));
    let client = client(&ledger);
    let domain = DomainName::parse("example.i2p").unwrap();

    let upstream = client.resolve(&domain).await.unwrap();

    assert_eq!(upstream.status, 503);
    assert_eq!(upstream.body, b"busy".to_vec());
    assert_eq!(ledger.read_calls(), 1);
    assert_eq!(ledger.token_calls(), 0);
    assert_eq!(ledger.reads()[0].path, "state/decision:I2PDNS:example.i2p");
}

#[tokio::test]
async fn test_resolve_twice_returns_same_body() {
    let ledger = Arc::new(ScriptedLedger::new());
    let client = client(&ledger);
    let domain = DomainName::parse("example.i2p").unwrap();

    let first = client.resolve(&domain).await.unwrap();
    let second = client.resolve(&domain).await.unwrap();

    assert_eq!(first.body, second.body);
    assert_eq!(first.status, second.status);
}

#[tokio::test]
async fn test_resolve_transport_failure_is_surfaced() {
    let ledger = Arc::new(ScriptedLedger::new().script_reads(vec![unreachable()]));
    let client = client(&ledger);

    let result = client
        .resolve(&DomainName::parse("example.i2p").unwrap())
        .await;

    assert!(matches!(result, Err(LedgerError::Transport(_))));
    assert_eq!(ledger.read_calls(), 1);
}
