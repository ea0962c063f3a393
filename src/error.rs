//! Unified error types for Permit2 payload assembly and signing
//!
//! Every failure is raised before the signer is called, except
//! [`Permit2Error::Signer`], which carries the signer's own error untouched.

use crate::signer::SignerError;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Main error type for all Permit2 operations
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Permit2Error {
    /// No signer could be resolved, or the supplied configuration is unusable
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// The typed-data payload could not be assembled
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    /// Failure reported by the delegated signer
    #[error(transparent)]
    Signer(#[from] SignerError),
}

impl Permit2Error {
    pub fn configuration(msg: impl Into<String>) -> Self {
        Self::Configuration(msg.into())
    }

    pub fn signer_not_defined() -> Self {
        Self::configuration("signer not defined")
    }

    /// Stable category code for callers that map errors across a boundary
    pub fn code(&self) -> ErrorCode {
        match self {
            Permit2Error::Configuration(_) => ErrorCode::Configuration,
            Permit2Error::Validation(e) => e.code(),
            Permit2Error::Signer(e) => e.code(),
        }
    }
}

/// Reasons a type graph or message is refused before signing
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("witness type `{0}` is not a primitive type and no witness sub-types were provided")]
    MissingWitnessSubTypes(String),

    #[error("recursive struct reference: {0}")]
    RecursiveType(String),

    #[error("type `{type_name}` referenced by `{referenced_by}` is not defined")]
    UndefinedType {
        type_name: String,
        referenced_by: String,
    },

    #[error("witness field name `{0}` collides with a permit field")]
    ReservedFieldName(String),

    #[error("witness sub-type `{0}` redefines a permit struct")]
    ReservedTypeName(String),

    #[error("witness value key `{0}` collides with a permit field")]
    ReservedWitnessKey(String),

    #[error("witness value has no entry for witness field `{0}`")]
    MissingWitnessValue(String),

    #[error("invalid message: {0}")]
    InvalidMessage(String),
}

impl ValidationError {
    pub fn code(&self) -> ErrorCode {
        match self {
            ValidationError::MissingWitnessSubTypes(_) => ErrorCode::MissingWitnessSubTypes,
            ValidationError::RecursiveType(_) => ErrorCode::RecursiveType,
            ValidationError::UndefinedType { .. } => ErrorCode::UndefinedType,
            ValidationError::ReservedFieldName(_)
            | ValidationError::ReservedTypeName(_)
            | ValidationError::ReservedWitnessKey(_) => ErrorCode::ReservedName,
            ValidationError::MissingWitnessValue(_) => ErrorCode::MissingWitnessValue,
            ValidationError::InvalidMessage(_) => ErrorCode::InvalidMessage,
        }
    }
}

/// Error codes for categorization
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCode {
    // Configuration errors
    Configuration,

    // Validation errors
    MissingWitnessSubTypes,
    RecursiveType,
    UndefinedType,
    ReservedName,
    MissingWitnessValue,
    InvalidMessage,

    // Delegated signer errors
    InvalidPrivateKey,
    SigningRejected,
    SignerUnavailable,
    SigningFailed,
}

/// Result type alias for Permit2 operations
pub type Permit2Result<T> = Result<T, Permit2Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_signer_not_defined_message() {
        let err = Permit2Error::signer_not_defined();
        assert_eq!(err.to_string(), "Configuration error: signer not defined");
        assert_eq!(err.code(), ErrorCode::Configuration);
    }

    #[test]
    fn test_signer_error_is_transparent() {
        let inner = SignerError::Rejected("user denied".to_string());
        let err = Permit2Error::from(inner.clone());
        assert_eq!(err.to_string(), inner.to_string());
        assert_eq!(err.code(), ErrorCode::SigningRejected);
    }

    #[test]
    fn test_error_code_serialization() {
        let json = serde_json::to_string(&ErrorCode::MissingWitnessSubTypes).unwrap();
        assert_eq!(json, "\"missing_witness_sub_types\"");
    }
}
