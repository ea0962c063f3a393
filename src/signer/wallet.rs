//! `ethers-signers` wallet bridge.
//!
//! Lets an ethers [`LocalWallet`] act as the signer capability. The payload is
//! re-parsed into ethers' own `TypedData`, so its hashing is independent of the
//! crate's EIP-712 hasher.

use super::{SignerError, TypedDataSigner};
use crate::eip712::Eip712Domain;
use crate::permit2::TypeGraph;
use async_trait::async_trait;
use ethers_core::types::transaction::eip712::TypedData as EthersTypedData;
use ethers_core::types::Address;
use ethers_signers::{LocalWallet, Signer};
use serde_json::json;

#[async_trait]
impl TypedDataSigner for LocalWallet {
    fn address(&self) -> Option<Address> {
        Some(Signer::address(self))
    }

    async fn sign_typed_data(
        &self,
        domain: &Eip712Domain,
        types: &TypeGraph,
        message: &serde_json::Value,
    ) -> Result<String, SignerError> {
        let payload = json!({
            "types": types,
            "primaryType": types.primary_type(),
            "domain": domain,
            "message": message,
        });

        let typed_data: EthersTypedData = serde_json::from_value(payload)
            .map_err(|e| SignerError::SigningFailed(format!("invalid typed data: {}", e)))?;

        let signature = Signer::sign_typed_data(self, &typed_data)
            .await
            .map_err(|e| SignerError::SigningFailed(e.to_string()))?;

        Ok(format!("0x{}", hex::encode(signature.to_vec())))
    }
}
