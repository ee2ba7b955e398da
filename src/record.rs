/// Canonical DNS record submitted to the ledger
///
/// The name-server key and data string are always derived from the
/// domain and address, so a record is fully determined by
/// `(domain, address, seq)`. Field names and their order are part of the
/// wire contract with the ledger.
use crate::{
    error::{LedgerError, LedgerResult},
    validation::{Base32Address, DomainName},
};
use serde::Serialize;

/// Prefix of every name-server key on the ledger
pub const NAME_SERVER_PREFIX: &str = "I2PDNS:";

/// Command tag for data writes
pub const DATA_COMMAND: &str = "data";

/// Sequence number used when the client does not supply one
pub const DEFAULT_SEQUENCE: u64 = 1;

/// Ledger key for a domain (`I2PDNS:<domain>`)
pub fn name_server_key(domain: &str) -> String {
    format!("{}{}", NAME_SERVER_PREFIX, domain)
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DnsRecord {
    seq: u64,
    command: &'static str,
    ns: String,
    d: String,
}

/// Build the canonical record for an already validated pair
pub fn build_record(domain: &DomainName, address: &Base32Address, seq: u64) -> DnsRecord {
    DnsRecord {
        seq,
        command: DATA_COMMAND,
        ns: name_server_key(domain.as_str()),
        d: format!("{}={}", domain, address),
    }
}

impl DnsRecord {
    pub fn sequence(&self) -> u64 {
        self.seq
    }

    pub fn command(&self) -> &str {
        self.command
    }

    pub fn name_server(&self) -> &str {
        &self.ns
    }

    pub fn data(&self) -> &str {
        &self.d
    }

    /// Serialize to the JSON body expected by the transaction endpoint
    pub fn encode(&self) -> LedgerResult<Vec<u8>> {
        serde_json::to_vec(self).map_err(|e| LedgerError::Encoding(e.to_string()))
    }
}
