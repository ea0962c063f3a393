//! Permit2 message types
//!
//! Field declaration order matches the Solidity structs; integers travel as
//! decimal strings so wallets display them verbatim.

use super::domain::parse_u256;
use crate::eip712::{TypedDataField, Types};
use crate::error::ValidationError;
use ethers_core::types::{Address, U256};
use serde::{Deserialize, Serialize};

/// Extra message fields bound into a witness permit, keyed by field name
pub type WitnessValue = serde_json::Map<String, serde_json::Value>;

/// `TokenPermissions(address token,uint256 amount)`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenPermissions {
    pub token: Address,
    #[serde(with = "decimal_u256")]
    pub amount: U256,
}

impl TokenPermissions {
    pub fn new(token: Address, amount: impl Into<U256>) -> Self {
        Self {
            token,
            amount: amount.into(),
        }
    }
}

/// `PermitTransferFrom(TokenPermissions permitted,address spender,uint256 nonce,uint256 deadline)`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PermitTransferFrom {
    pub permitted: TokenPermissions,
    pub spender: Address,
    #[serde(with = "decimal_u256")]
    pub nonce: U256,
    #[serde(with = "decimal_u256")]
    pub deadline: U256,
}

impl PermitTransferFrom {
    pub fn new(
        permitted: TokenPermissions,
        spender: Address,
        nonce: impl Into<U256>,
        deadline: impl Into<U256>,
    ) -> Self {
        Self {
            permitted,
            spender,
            nonce: nonce.into(),
            deadline: deadline.into(),
        }
    }

    /// The permit as an EIP-712 message object
    pub fn to_message(&self) -> Result<WitnessValue, ValidationError> {
        match serde_json::to_value(self) {
            Ok(serde_json::Value::Object(map)) => Ok(map),
            Ok(other) => Err(ValidationError::InvalidMessage(format!(
                "permit serialized to {}",
                other
            ))),
            Err(e) => Err(ValidationError::InvalidMessage(e.to_string())),
        }
    }
}

/// Describes the witness field appended to `PermitWitnessTransferFrom`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WitnessSpec {
    /// Field appended after `deadline`, e.g. `Witness witness`
    #[serde(alias = "witnessType")]
    pub witness_field: TypedDataField,
    /// Struct definitions the witness field needs, transitively
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub witness_sub_types: Option<Types>,
}

impl WitnessSpec {
    pub fn new(witness_field: TypedDataField, witness_sub_types: Option<Types>) -> Self {
        Self {
            witness_field,
            witness_sub_types,
        }
    }
}

/// Serde adapter: `U256` as a decimal string, accepting numbers and hex on input
pub(crate) mod decimal_u256 {
    use super::parse_u256;
    use ethers_core::types::U256;
    use serde::de::Error;
    use serde::{Deserialize, Deserializer, Serializer};

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Number(u64),
        Text(String),
    }

    pub fn serialize<S: Serializer>(value: &U256, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&value.to_string())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<U256, D::Error> {
        match Raw::deserialize(deserializer)? {
            Raw::Number(n) => Ok(U256::from(n)),
            Raw::Text(text) => parse_u256(&text)
                .ok_or_else(|| D::Error::custom(format!("invalid uint256: {}", text))),
        }
    }
}
