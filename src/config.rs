//! Coordinator configuration
//!
//! Read from JSON or from `PERMIT2_*` environment variables. The signer key is
//! held as a [`SecretString`] and never appears in `Debug` output.

use crate::error::{Permit2Error, Permit2Result};
use crate::permit2::{ChainId, DomainOverrides};
use ethers_core::types::Address;
use secrecy::SecretString;
use serde::{Deserialize, Deserializer};
use std::str::FromStr;

pub const ENV_NAME: &str = "PERMIT2_NAME";
pub const ENV_CHAIN_ID: &str = "PERMIT2_CHAIN_ID";
pub const ENV_VERIFYING_CONTRACT: &str = "PERMIT2_VERIFYING_CONTRACT";
pub const ENV_SIGNER_KEY: &str = "PERMIT2_SIGNER_KEY";

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Permit2Config {
    /// Merged onto the mainnet Permit2 domain
    #[serde(default)]
    pub domain: DomainOverrides,

    /// Hex private key for the default local signer
    #[serde(default, deserialize_with = "deserialize_secret")]
    pub signer_private_key: Option<SecretString>,
}

fn deserialize_secret<'de, D>(deserializer: D) -> Result<Option<SecretString>, D::Error>
where
    D: Deserializer<'de>,
{
    let value: Option<String> = Option::deserialize(deserializer)?;
    Ok(value.map(SecretString::from))
}

impl Permit2Config {
    pub fn from_json(json: &str) -> Permit2Result<Self> {
        serde_json::from_str(json)
            .map_err(|e| Permit2Error::configuration(format!("invalid config: {}", e)))
    }

    /// Reads `PERMIT2_NAME`, `PERMIT2_CHAIN_ID`, `PERMIT2_VERIFYING_CONTRACT`
    /// and `PERMIT2_SIGNER_KEY`; unset or empty variables are ignored.
    pub fn from_env() -> Permit2Result<Self> {
        Self::from_vars(|key| std::env::var(key).ok())
    }

    fn from_vars(lookup: impl Fn(&str) -> Option<String>) -> Permit2Result<Self> {
        let var = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());

        let verifying_contract = match var(ENV_VERIFYING_CONTRACT) {
            Some(value) => Some(Address::from_str(value.trim()).map_err(|e| {
                Permit2Error::configuration(format!("{}: {}", ENV_VERIFYING_CONTRACT, e))
            })?),
            None => None,
        };

        Ok(Self {
            domain: DomainOverrides {
                name: var(ENV_NAME),
                chain_id: var(ENV_CHAIN_ID).map(ChainId::from),
                verifying_contract,
            },
            signer_private_key: var(ENV_SIGNER_KEY).map(SecretString::from),
        })
    }
}
