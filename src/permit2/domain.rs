//! Permit2 EIP-712 domain
//!
//! The domain scopes a signature to one chain and one Permit2 deployment.
//! Chain ids are reduced to a single decimal spelling before they are stored,
//! so `1`, `"1"` and `"0x1"` all yield byte-identical domains.

use crate::eip712::Eip712Domain;
use crate::log_warn;
use ethers_core::types::{Address, H160, U256};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Domain name used by the Permit2 contract
pub const PERMIT2_NAME: &str = "Permit2";

/// Chain id of the default domain (Ethereum mainnet)
pub const DEFAULT_CHAIN_ID: &str = "1";

/// Canonical Permit2 deployment, identical on every chain that has one.
/// `0x000000000022D473030F116dDEE9F6B43aC78BA3`
pub const PERMIT2_ADDRESS: Address = H160([
    0x00, 0x00, 0x00, 0x00, 0x00, 0x22, 0xd4, 0x73, 0x03, 0x0f, 0x11, 0x6d, 0xde, 0xe9, 0xf6,
    0xb4, 0x3a, 0xc7, 0x8b, 0xa3,
]);

/// Chain id as supplied by a caller: a JSON number or a decimal/hex string
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ChainId {
    Number(u64),
    Text(String),
}

impl ChainId {
    /// Canonical decimal representation.
    ///
    /// Text that is not a number is kept as given (trimmed); hashing such a
    /// domain fails later in the signer.
    pub fn canonical(&self) -> String {
        match self {
            ChainId::Number(n) => n.to_string(),
            ChainId::Text(text) => {
                let trimmed = text.trim();
                match parse_u256(trimmed) {
                    Some(n) => n.to_string(),
                    None => {
                        log_warn!("domain", "chain id is not numeric", chain_id = trimmed);
                        trimmed.to_string()
                    }
                }
            }
        }
    }
}

impl From<u64> for ChainId {
    fn from(n: u64) -> Self {
        ChainId::Number(n)
    }
}

impl From<&str> for ChainId {
    fn from(s: &str) -> Self {
        ChainId::Text(s.to_string())
    }
}

impl From<String> for ChainId {
    fn from(s: String) -> Self {
        ChainId::Text(s)
    }
}

/// Parse a decimal or `0x`-prefixed hex integer
pub(crate) fn parse_u256(s: &str) -> Option<U256> {
    let s = s.trim();
    match s.strip_prefix("0x").or_else(|| s.strip_prefix("0X")) {
        Some(hex) if !hex.is_empty() => U256::from_str_radix(hex, 16).ok(),
        Some(_) => None,
        None if s.is_empty() => None,
        None => U256::from_dec_str(s).ok(),
    }
}

/// Partial domain merged over [`default_domain`]
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DomainOverrides {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub chain_id: Option<ChainId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub verifying_contract: Option<Address>,
}

impl DomainOverrides {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn with_chain_id(mut self, chain_id: impl Into<ChainId>) -> Self {
        self.chain_id = Some(chain_id.into());
        self
    }

    pub fn with_verifying_contract(mut self, verifying_contract: Address) -> Self {
        self.verifying_contract = Some(verifying_contract);
        self
    }
}

/// Normalized Permit2 domain
///
/// Only obtainable through [`default_domain`] or [`normalize_domain`], so the
/// chain id is always canonical.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Permit2Domain {
    name: String,
    chain_id: String,
    verifying_contract: Address,
}

impl Permit2Domain {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn chain_id(&self) -> &str {
        &self.chain_id
    }

    pub fn verifying_contract(&self) -> Address {
        self.verifying_contract
    }
}

impl fmt::Display for Permit2Domain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} (chain {}, {:?})",
            self.name, self.chain_id, self.verifying_contract
        )
    }
}

impl From<&Permit2Domain> for Eip712Domain {
    fn from(domain: &Permit2Domain) -> Self {
        Eip712Domain {
            name: Some(domain.name.clone()),
            version: None,
            chain_id: Some(serde_json::Value::String(domain.chain_id.clone())),
            verifying_contract: Some(format!("{:?}", domain.verifying_contract)),
            salt: None,
        }
    }
}

/// The Permit2 domain on Ethereum mainnet
pub fn default_domain() -> Permit2Domain {
    Permit2Domain {
        name: PERMIT2_NAME.to_string(),
        chain_id: DEFAULT_CHAIN_ID.to_string(),
        verifying_contract: PERMIT2_ADDRESS,
    }
}

/// Merge overrides onto the default domain, normalizing the chain id
pub fn normalize_domain(overrides: &DomainOverrides) -> Permit2Domain {
    let mut domain = default_domain();

    if let Some(name) = &overrides.name {
        domain.name = name.clone();
    }
    if let Some(chain_id) = &overrides.chain_id {
        domain.chain_id = chain_id.canonical();
    }
    if let Some(verifying_contract) = overrides.verifying_contract {
        domain.verifying_contract = verifying_contract;
    }

    domain
}
