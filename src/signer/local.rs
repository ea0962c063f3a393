//! In-process secp256k1 signer backed by the crate's EIP-712 hasher.

use super::{SignerError, TypedDataSigner};
use crate::eip712::{self, Eip712Domain, TypedData};
use crate::log_debug;
use crate::permit2::TypeGraph;
use async_trait::async_trait;
use ethers_core::types::Address;
use std::fmt;
use zeroize::Zeroizing;

/// Signs with a raw private key held in zeroizing memory.
pub struct LocalSigner {
    key: Zeroizing<[u8; 32]>,
    address: Address,
}

impl LocalSigner {
    /// Create a signer from a hex-encoded private key.
    ///
    /// # Arguments
    ///
    /// * `private_key` - A 64-character hex string, optionally prefixed with "0x"
    pub fn from_private_key(private_key: &str) -> Result<Self, SignerError> {
        let trimmed = private_key.trim();
        let hex_key = trimmed.strip_prefix("0x").unwrap_or(trimmed);

        let bytes = Zeroizing::new(
            hex::decode(hex_key).map_err(|e| SignerError::InvalidKey(e.to_string()))?,
        );
        if bytes.len() != 32 {
            return Err(SignerError::InvalidKey(format!(
                "expected 32 bytes, got {}",
                bytes.len()
            )));
        }

        let mut key = Zeroizing::new([0u8; 32]);
        key.copy_from_slice(&bytes);

        let address = eip712::address_from_private_key(&key[..])
            .map(Address::from)
            .map_err(|e| SignerError::InvalidKey(e.to_string()))?;

        Ok(Self { key, address })
    }

    /// The account address derived from the key.
    pub fn address(&self) -> Address {
        self.address
    }
}

impl fmt::Debug for LocalSigner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LocalSigner")
            .field("address", &self.address)
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl TypedDataSigner for LocalSigner {
    fn address(&self) -> Option<Address> {
        Some(self.address)
    }

    async fn sign_typed_data(
        &self,
        domain: &Eip712Domain,
        types: &TypeGraph,
        message: &serde_json::Value,
    ) -> Result<String, SignerError> {
        let typed_data = TypedData {
            types: types.structs().clone(),
            primary_type: types.primary_type().to_string(),
            domain: domain.clone(),
            message: message.clone(),
        };

        let signature = eip712::sign_typed_data(&typed_data, &self.key[..])
            .map_err(|e| SignerError::SigningFailed(e.to_string()))?;

        log_debug!(
            "signer",
            "signed typed data",
            primary_type = typed_data.primary_type,
            signer_address = format!("{:?}", self.address),
        );

        Ok(signature.to_hex())
    }
}
