//! EIP-712 Type Encoding
//!
//! Implements the encoding rules for EIP-712 typed data.

use super::types::*;
use ethers_core::types::{I256, U256};
use std::collections::HashSet;
use tiny_keccak::{Hasher, Keccak};

/// Encode a type string for a struct type
/// Format: "TypeName(type1 name1,type2 name2,...)Dep1(...)Dep2(...)"
pub fn encode_type(type_name: &str, types: &Types) -> Result<String, Eip712Error> {
    let fields = types
        .get(type_name)
        .ok_or_else(|| Eip712Error::InvalidType(type_name.to_string()))?;

    let dependencies = find_type_dependencies(type_name, types);

    // Primary type first, then dependencies alphabetically
    let mut result = format_type_string(type_name, fields);

    let mut sorted_deps: Vec<_> = dependencies
        .into_iter()
        .filter(|dep| dep != type_name)
        .collect();
    sorted_deps.sort();

    for dep in sorted_deps {
        if let Some(dep_fields) = types.get(&dep) {
            result.push_str(&format_type_string(&dep, dep_fields));
        }
    }

    Ok(result)
}

/// Format a single type string
fn format_type_string(type_name: &str, fields: &[TypedDataField]) -> String {
    let field_strs: Vec<String> = fields
        .iter()
        .map(|f| format!("{} {}", f.type_name, f.name))
        .collect();

    format!("{}({})", type_name, field_strs.join(","))
}

/// Find all type dependencies (including nested structs)
pub fn find_type_dependencies(type_name: &str, types: &Types) -> HashSet<String> {
    let mut dependencies = HashSet::new();
    let mut to_visit = vec![type_name.to_string()];

    while let Some(current) = to_visit.pop() {
        if dependencies.contains(&current) {
            continue;
        }

        if let Some(fields) = types.get(&current) {
            dependencies.insert(current.clone());

            for field in fields {
                let base_type = get_base_type(&field.type_name);
                if types.contains_key(base_type) && !dependencies.contains(base_type) {
                    to_visit.push(base_type.to_string());
                }
            }
        }
    }

    dependencies
}

/// Get the base type from a potentially array type
/// e.g., "Person[]" -> "Person", "uint256[10][]" -> "uint256"
pub fn get_base_type(type_name: &str) -> &str {
    if let Some(bracket_pos) = type_name.find('[') {
        &type_name[..bracket_pos]
    } else {
        type_name
    }
}

/// Calculate the type hash for a struct type
/// typeHash = keccak256(encodeType(typeOf(s)))
pub fn type_hash(type_name: &str, types: &Types) -> Result<[u8; 32], Eip712Error> {
    let encoded = encode_type(type_name, types)?;
    Ok(keccak256(encoded.as_bytes()))
}

/// Encode a value according to its type
pub fn encode_value(
    type_name: &str,
    value: &serde_json::Value,
    types: &Types,
) -> Result<Vec<u8>, Eip712Error> {
    if type_name.ends_with(']') {
        return encode_array(type_name, value, types);
    }

    if type_name == "bytes" {
        return encode_bytes(value);
    }
    if type_name == "string" {
        return encode_string(value);
    }

    if types.contains_key(type_name) {
        return encode_struct(type_name, value, types);
    }

    encode_atomic(type_name, value)
}

/// Whether an encoded member of this type is replaced by its hash
fn is_hashed_member(type_name: &str, types: &Types) -> bool {
    type_name.ends_with(']') || is_dynamic_type(type_name) || types.contains_key(type_name)
}

/// Encode a struct value
fn encode_struct(
    type_name: &str,
    value: &serde_json::Value,
    types: &Types,
) -> Result<Vec<u8>, Eip712Error> {
    let obj = value.as_object().ok_or_else(|| Eip712Error::InvalidValue {
        type_name: type_name.to_string(),
        value: value.to_string(),
    })?;

    let fields = types
        .get(type_name)
        .ok_or_else(|| Eip712Error::InvalidType(type_name.to_string()))?;

    let mut encoded = Vec::with_capacity(32 * (fields.len() + 1));
    encoded.extend_from_slice(&type_hash(type_name, types)?);

    for field in fields {
        let field_value = obj
            .get(&field.name)
            .ok_or_else(|| Eip712Error::MissingField(format!("{}.{}", type_name, field.name)))?;

        let encoded_field = encode_value(&field.type_name, field_value, types)?;

        if is_hashed_member(&field.type_name, types) {
            encoded.extend_from_slice(&keccak256(&encoded_field));
        } else {
            encoded.extend(encoded_field);
        }
    }

    Ok(encoded)
}

/// Encode an array value
fn encode_array(
    type_name: &str,
    value: &serde_json::Value,
    types: &Types,
) -> Result<Vec<u8>, Eip712Error> {
    let arr = value.as_array().ok_or_else(|| Eip712Error::InvalidValue {
        type_name: type_name.to_string(),
        value: value.to_string(),
    })?;

    // Strip the outermost dimension: "T[2][]" -> "T[2]"
    let bracket_pos = type_name
        .rfind('[')
        .ok_or_else(|| Eip712Error::InvalidType(type_name.to_string()))?;
    let element_type = &type_name[..bracket_pos];

    let length = &type_name[bracket_pos + 1..type_name.len() - 1];
    if !length.is_empty() {
        let expected: usize = length
            .parse()
            .map_err(|_| Eip712Error::InvalidType(type_name.to_string()))?;
        if arr.len() != expected {
            return Err(Eip712Error::InvalidValue {
                type_name: type_name.to_string(),
                value: format!("expected {} elements, got {}", expected, arr.len()),
            });
        }
    }

    let mut encoded = Vec::with_capacity(32 * arr.len());

    for item in arr {
        let item_encoded = encode_value(element_type, item, types)?;

        if is_hashed_member(element_type, types) {
            encoded.extend_from_slice(&keccak256(&item_encoded));
        } else {
            encoded.extend(item_encoded);
        }
    }

    Ok(encoded)
}

/// Encode an atomic (fixed-size) value
fn encode_atomic(type_name: &str, value: &serde_json::Value) -> Result<Vec<u8>, Eip712Error> {
    let invalid = || Eip712Error::InvalidValue {
        type_name: type_name.to_string(),
        value: value.to_string(),
    };
    let mut result = [0u8; 32];

    // address - 20 bytes, left-padded to 32
    if type_name == "address" {
        let addr = value.as_str().ok_or_else(invalid)?;
        let addr_bytes = parse_address(addr)?;
        result[12..].copy_from_slice(&addr_bytes);
        return Ok(result.to_vec());
    }

    if type_name == "bool" {
        let b = value.as_bool().ok_or_else(invalid)?;
        result[31] = u8::from(b);
        return Ok(result.to_vec());
    }

    if let Some(bits) = type_name.strip_prefix("uint") {
        let bits: usize = bits
            .parse()
            .map_err(|_| Eip712Error::InvalidType(type_name.to_string()))?;
        let n = parse_uint(type_name, value)?;
        if n.bits() > bits {
            return Err(invalid());
        }
        n.to_big_endian(&mut result);
        return Ok(result.to_vec());
    }

    // intN, two's complement over the full word
    if type_name.starts_with("int") {
        let n = parse_int(type_name, value)?;
        n.into_raw().to_big_endian(&mut result);
        return Ok(result.to_vec());
    }

    // bytesN (fixed-size bytes, right-padded)
    if let Some(size) = type_name.strip_prefix("bytes") {
        let size: usize = size
            .parse()
            .map_err(|_| Eip712Error::InvalidType(type_name.to_string()))?;

        let hex_str = value.as_str().ok_or_else(invalid)?;
        let bytes = parse_hex(hex_str)?;
        if bytes.len() > size {
            return Err(Eip712Error::InvalidValue {
                type_name: type_name.to_string(),
                value: format!("bytes too long: {} > {}", bytes.len(), size),
            });
        }

        result[..bytes.len()].copy_from_slice(&bytes);
        return Ok(result.to_vec());
    }

    Err(Eip712Error::InvalidType(type_name.to_string()))
}

/// Encode dynamic bytes
fn encode_bytes(value: &serde_json::Value) -> Result<Vec<u8>, Eip712Error> {
    let hex_str = value.as_str().ok_or_else(|| Eip712Error::InvalidValue {
        type_name: "bytes".to_string(),
        value: value.to_string(),
    })?;

    parse_hex(hex_str)
}

/// Encode a string value
fn encode_string(value: &serde_json::Value) -> Result<Vec<u8>, Eip712Error> {
    let s = value.as_str().ok_or_else(|| Eip712Error::InvalidValue {
        type_name: "string".to_string(),
        value: value.to_string(),
    })?;

    Ok(s.as_bytes().to_vec())
}

/// Parse an Ethereum address
pub(crate) fn parse_address(addr: &str) -> Result<[u8; 20], Eip712Error> {
    let addr = addr.strip_prefix("0x").unwrap_or(addr);

    if addr.len() != 40 {
        return Err(Eip712Error::InvalidAddress(format!(
            "invalid length: expected 40 hex chars, got {}",
            addr.len()
        )));
    }

    let bytes = hex::decode(addr)
        .map_err(|e| Eip712Error::InvalidAddress(format!("invalid hex: {}", e)))?;

    let mut result = [0u8; 20];
    result.copy_from_slice(&bytes);
    Ok(result)
}

/// Parse a uint value (supports decimal string, hex string, or number)
fn parse_uint(type_name: &str, value: &serde_json::Value) -> Result<U256, Eip712Error> {
    let invalid = || Eip712Error::InvalidValue {
        type_name: type_name.to_string(),
        value: value.to_string(),
    };

    match value {
        serde_json::Value::Number(n) => n.as_u64().map(U256::from).ok_or_else(invalid),
        serde_json::Value::String(s) => {
            let s = s.trim();
            match s.strip_prefix("0x").or_else(|| s.strip_prefix("0X")) {
                Some(hex) if !hex.is_empty() => {
                    U256::from_str_radix(hex, 16).map_err(|_| invalid())
                }
                Some(_) => Err(invalid()),
                None => U256::from_dec_str(s).map_err(|_| invalid()),
            }
        }
        _ => Err(invalid()),
    }
}

/// Parse a signed int value
fn parse_int(type_name: &str, value: &serde_json::Value) -> Result<I256, Eip712Error> {
    let invalid = || Eip712Error::InvalidValue {
        type_name: type_name.to_string(),
        value: value.to_string(),
    };

    match value {
        serde_json::Value::Number(n) => n.as_i64().map(I256::from).ok_or_else(invalid),
        serde_json::Value::String(s) if s.trim().starts_with("0x") => {
            parse_uint(type_name, value).map(I256::from_raw)
        }
        serde_json::Value::String(s) => I256::from_dec_str(s.trim()).map_err(|_| invalid()),
        _ => Err(invalid()),
    }
}

/// Parse a hex string (with or without 0x prefix)
fn parse_hex(s: &str) -> Result<Vec<u8>, Eip712Error> {
    let s = s.strip_prefix("0x").unwrap_or(s);
    let s = s.strip_prefix("0X").unwrap_or(s);

    hex::decode(s).map_err(|e| Eip712Error::EncodingError(format!("invalid hex: {}", e)))
}

/// Compute keccak256 hash
pub fn keccak256(data: &[u8]) -> [u8; 32] {
    let mut hasher = Keccak::v256();
    let mut output = [0u8; 32];
    hasher.update(data);
    hasher.finalize(&mut output);
    output
}
