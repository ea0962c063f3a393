//! EIP-712 Typed Data Signing
//!
//! Implementation of EIP-712 typed structured data hashing and signing.
//! The Permit2 payload assembler hands its output to signers built on
//! top of this module.
//!
//! # Reference
//! - <https://eips.ethereum.org/EIPS/eip-712>
//!
//! # Example
//! ```rust,ignore
//! use permit2_signer::eip712::{TypedData, hash_typed_data, sign_hash};
//!
//! let typed_data = TypedData::from_json(json_string)?;
//! let hash = hash_typed_data(&typed_data)?;
//! let signature = sign_hash(&hash, &private_key)?;
//! ```

pub mod types;
pub mod encoder;
pub mod hasher;
pub mod signer;

pub use types::*;
pub use encoder::*;
pub use hasher::*;
pub use signer::*;

#[cfg(test)]
mod tests;
