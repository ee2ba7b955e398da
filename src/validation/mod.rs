/// Input validation for domain names and base32 destinations
///
/// Both grammars are fixed: a domain is a 3-64 character label of
/// lowercase letters, digits, `-` and `_` followed by the literal `.i2p`
/// suffix; an address is exactly 52 lowercase alphanumeric characters.
use crate::error::{GatewayError, GatewayResult};
use lazy_static::lazy_static;
use regex::Regex;
use std::fmt;

lazy_static! {
    static ref DOMAIN_PATTERN: Regex = Regex::new(r"^[a-z0-9_-]{3,64}\.i2p$").unwrap();
    static ref B32_ADDRESS_PATTERN: Regex = Regex::new(r"^[a-z0-9]{52}$").unwrap();
}

/// Length of a base32 destination address
pub const B32_ADDRESS_LEN: usize = 52;

/// Check a domain name against the `.i2p` grammar
pub fn validate_domain(input: &str) -> bool {
    DOMAIN_PATTERN.is_match(input)
}

/// Check a base32 address: exactly 52 characters of `[a-z0-9]`
pub fn validate_address(input: &str) -> bool {
    B32_ADDRESS_PATTERN.is_match(input)
}

/// A domain name that has passed [`validate_domain`]
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DomainName(String);

impl DomainName {
    pub fn parse(input: &str) -> GatewayResult<Self> {
        if validate_domain(input) {
            Ok(Self(input.to_string()))
        } else {
            Err(GatewayError::validation("domain", "domain format invalid"))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for DomainName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A base32 address that has passed [`validate_address`]
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Base32Address(String);

impl Base32Address {
    pub fn parse(input: &str) -> GatewayResult<Self> {
        if validate_address(input) {
            Ok(Self(input.to_string()))
        } else {
            Err(GatewayError::validation("address", "b32 address format invalid"))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Base32Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
