//! Permit2 Signer
//!
//! Assembles and signs EIP-712 payloads for Uniswap's Permit2 signature
//! transfers.
//!
//! # Architecture
//!
//! This crate provides:
//! - **permit2**: domain normalization, type-graph construction (including
//!   witness merging) and the signing coordinator
//! - **signer**: the signer capability plus local and `ethers` wallet signers
//! - **eip712**: typed-data hashing and secp256k1 signing
//! - **config**: JSON / environment configuration
//!
//! # Security
//!
//! Private keys live in `zeroize`-backed memory and are held as
//! `secrecy::SecretString` in configuration. Log fields carrying keys are
//! redacted before they are emitted.
//!
//! # Example
//!
//! ```rust,ignore
//! use permit2_signer::{Permit2, PermitTransferFrom, TokenPermissions};
//!
//! let permit2 = Permit2::new().with_signer_from_private_key(&key)?;
//! let permitted = TokenPermissions::new(token, 1000u64);
//! let permit = PermitTransferFrom::new(permitted, spender, 0u64, deadline);
//! let signature = permit2.sign_permit_transfer_from(&permit, None, None).await?;
//! ```

pub mod config;
pub mod eip712;
pub mod error;
pub mod permit2;
pub mod signer;
pub mod utils;

pub use config::Permit2Config;
pub use error::{ErrorCode, Permit2Error, Permit2Result, ValidationError};
pub use permit2::{
    build_plain_type_graph, build_witness_type_graph, default_domain, normalize_domain,
    ChainId, DomainOverrides, Permit2, Permit2Domain, PermitTransferFrom, TokenPermissions,
    TypeGraph, WitnessSpec, WitnessValue,
};
pub use signer::{derive_signer, LocalSigner, SignerError, TypedDataSigner};
