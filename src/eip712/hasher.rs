//! EIP-712 Hashing
//!
//! Implements domain separator and struct hashing for EIP-712.

use super::encoder::{encode_value, keccak256, parse_address};
use super::types::*;

/// Magic prefix for EIP-712 encoding
const EIP712_PREFIX: &[u8] = b"\x19\x01";

const DOMAIN_TYPE_NAME: &str = "EIP712Domain";

/// Calculate the domain separator hash
///
/// domainSeparator = hashStruct(eip712Domain)
pub fn domain_separator(domain: &Eip712Domain) -> Result<[u8; 32], Eip712Error> {
    let domain_fields = get_domain_fields(domain);

    let mut domain_types = Types::new();
    domain_types.insert(DOMAIN_TYPE_NAME.to_string(), domain_fields.clone());

    let encoded = encode_domain_struct(domain, &domain_fields, &domain_types)?;

    Ok(keccak256(&encoded))
}

/// Get the domain fields based on which values are present
fn get_domain_fields(domain: &Eip712Domain) -> Vec<TypedDataField> {
    let mut fields = Vec::new();

    if domain.name.is_some() {
        fields.push(TypedDataField::new("name", "string"));
    }
    if domain.version.is_some() {
        fields.push(TypedDataField::new("version", "string"));
    }
    if domain.chain_id.is_some() {
        fields.push(TypedDataField::new("chainId", "uint256"));
    }
    if domain.verifying_contract.is_some() {
        fields.push(TypedDataField::new("verifyingContract", "address"));
    }
    if domain.salt.is_some() {
        fields.push(TypedDataField::new("salt", "bytes32"));
    }

    fields
}

/// Encode the domain struct specially
fn encode_domain_struct(
    domain: &Eip712Domain,
    fields: &[TypedDataField],
    types: &Types,
) -> Result<Vec<u8>, Eip712Error> {
    let mut encoded = Vec::with_capacity(32 * (fields.len() + 1));

    encoded.extend_from_slice(&super::encoder::type_hash(DOMAIN_TYPE_NAME, types)?);

    for field in fields {
        match field.name.as_str() {
            "name" => {
                if let Some(ref name) = domain.name {
                    encoded.extend_from_slice(&keccak256(name.as_bytes()));
                }
            }
            "version" => {
                if let Some(ref version) = domain.version {
                    encoded.extend_from_slice(&keccak256(version.as_bytes()));
                }
            }
            "chainId" => {
                let bytes = domain.chain_id_bytes().ok_or_else(|| Eip712Error::InvalidValue {
                    type_name: "uint256".to_string(),
                    value: domain
                        .chain_id
                        .as_ref()
                        .map(|v| v.to_string())
                        .unwrap_or_default(),
                })?;
                encoded.extend_from_slice(&bytes);
            }
            "verifyingContract" => {
                if let Some(ref addr) = domain.verifying_contract {
                    let addr_bytes = parse_address(addr)?;
                    let mut padded = [0u8; 32];
                    padded[12..].copy_from_slice(&addr_bytes);
                    encoded.extend_from_slice(&padded);
                }
            }
            "salt" => {
                if let Some(ref salt) = domain.salt {
                    let salt = salt.strip_prefix("0x").unwrap_or(salt);
                    let salt_bytes = hex::decode(salt)
                        .map_err(|e| Eip712Error::EncodingError(e.to_string()))?;
                    let mut padded = [0u8; 32];
                    let len = salt_bytes.len().min(32);
                    padded[..len].copy_from_slice(&salt_bytes[..len]);
                    encoded.extend_from_slice(&padded);
                }
            }
            _ => {}
        }
    }

    Ok(encoded)
}

/// Hash a struct according to EIP-712
///
/// hashStruct(s) = keccak256(typeHash || encodeData(s))
pub fn hash_struct(
    type_name: &str,
    data: &serde_json::Value,
    types: &Types,
) -> Result<[u8; 32], Eip712Error> {
    let encoded = encode_value(type_name, data, types)?;
    Ok(keccak256(&encoded))
}

/// Calculate the final EIP-712 hash for signing
///
/// hash = keccak256("\x19\x01" || domainSeparator || hashStruct(message))
pub fn hash_typed_data(typed_data: &TypedData) -> Result<[u8; 32], Eip712Error> {
    get_pre_image(typed_data).map(|pre_image| pre_image.final_hash)
}

/// Get the pre-image components (for external signing)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Eip712PreImage {
    pub domain_separator: [u8; 32],
    pub struct_hash: [u8; 32],
    pub final_hash: [u8; 32],
}

/// Calculate the pre-image components for EIP-712
pub fn get_pre_image(typed_data: &TypedData) -> Result<Eip712PreImage, Eip712Error> {
    typed_data.validate()?;

    let domain_separator = domain_separator(&typed_data.domain)?;
    let struct_hash = hash_struct(
        &typed_data.primary_type,
        &typed_data.message,
        &typed_data.types,
    )?;

    let mut data = Vec::with_capacity(2 + 32 + 32);
    data.extend_from_slice(EIP712_PREFIX);
    data.extend_from_slice(&domain_separator);
    data.extend_from_slice(&struct_hash);
    let final_hash = keccak256(&data);

    Ok(Eip712PreImage {
        domain_separator,
        struct_hash,
        final_hash,
    })
}
