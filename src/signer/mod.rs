//! Signer capability
//!
//! The Permit2 coordinator never touches key material. It hands the assembled
//! `(domain, types, message)` triple to a [`TypedDataSigner`] and returns
//! whatever signature comes back. Wallet bridges, hardware devices and remote
//! signers plug in by implementing the trait.

use crate::eip712::Eip712Domain;
use crate::error::ErrorCode;
use crate::permit2::TypeGraph;
use async_trait::async_trait;
use ethers_core::types::Address;
use thiserror::Error;

pub mod local;
pub mod wallet;

pub use local::LocalSigner;

/// Errors reported by a signer implementation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SignerError {
    /// The key holder declined to sign.
    #[error("Signing rejected: {0}")]
    Rejected(String),
    /// The device or remote signer could not be reached.
    #[error("Signer unavailable: {0}")]
    Unavailable(String),
    /// A private key was malformed.
    #[error("Invalid key: {0}")]
    InvalidKey(String),
    /// Hashing or signing the payload failed.
    #[error("Signing failed: {0}")]
    SigningFailed(String),
}

impl SignerError {
    pub fn code(&self) -> ErrorCode {
        match self {
            SignerError::Rejected(_) => ErrorCode::SigningRejected,
            SignerError::Unavailable(_) => ErrorCode::SignerUnavailable,
            SignerError::InvalidKey(_) => ErrorCode::InvalidPrivateKey,
            SignerError::SigningFailed(_) => ErrorCode::SigningFailed,
        }
    }
}

/// Anything able to produce an EIP-712 signature.
///
/// Implementations receive the domain, the resolved type graph (primary type
/// first) and the message object, and return the signature as a `0x`-prefixed
/// hex string of 65 bytes.
#[async_trait]
pub trait TypedDataSigner: Send + Sync {
    /// Address of the signing account, when the implementation knows it.
    fn address(&self) -> Option<Address> {
        None
    }

    /// Signs the typed-data payload.
    async fn sign_typed_data(
        &self,
        domain: &Eip712Domain,
        types: &TypeGraph,
        message: &serde_json::Value,
    ) -> Result<String, SignerError>;
}

/// Builds a local signer from a hex-encoded private key.
pub fn derive_signer(private_key: &str) -> Result<LocalSigner, SignerError> {
    LocalSigner::from_private_key(private_key)
}
