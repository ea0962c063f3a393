//! Permit2 signature-transfer payloads
//!
//! Builds and signs EIP-712 messages for the Permit2 contract's
//! `permitTransferFrom` and `permitWitnessTransferFrom` entry points:
//!
//! - [`domain`]: the `Permit2` domain and chain-id normalization
//! - [`type_graph`]: struct definitions, including witness merging
//! - [`coordinator`]: signer/domain resolution and delegation
//!
//! ```ignore
//! let permit2 = Permit2::new().with_signer_from_private_key(key)?;
//! let signature = permit2.sign_permit_transfer_from(&permit, None, None).await?;
//! ```

pub mod coordinator;
pub mod domain;
pub mod type_graph;
pub mod types;

pub use coordinator::Permit2;
pub use domain::{
    default_domain, normalize_domain, ChainId, DomainOverrides, Permit2Domain, PERMIT2_ADDRESS,
    PERMIT2_NAME,
};
pub use type_graph::{
    build_plain_type_graph, build_witness_type_graph, token_permissions_type, transfer_fields,
    TypeGraph, PERMIT_TRANSFER_FROM, PERMIT_WITNESS_TRANSFER_FROM, RESERVED_FIELD_NAMES,
    TOKEN_PERMISSIONS,
};
pub use types::{PermitTransferFrom, TokenPermissions, WitnessSpec, WitnessValue};
