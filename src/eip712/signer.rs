//! EIP-712 Signing
//!
//! ECDSA signing of EIP-712 typed data with a raw secp256k1 key.

use super::encoder::keccak256;
use super::hasher::hash_typed_data;
use super::types::*;
use secp256k1::{Message, PublicKey, Secp256k1, SecretKey};

/// Sign EIP-712 typed data
///
/// Returns a signature with v, r, s components.
pub fn sign_typed_data(
    typed_data: &TypedData,
    private_key: &[u8],
) -> Result<Eip712Signature, Eip712Error> {
    let hash = hash_typed_data(typed_data)?;
    sign_hash(&hash, private_key)
}

fn secret_key(private_key: &[u8]) -> Result<SecretKey, Eip712Error> {
    if private_key.len() != 32 {
        return Err(Eip712Error::SigningError(format!(
            "invalid private key length: expected 32, got {}",
            private_key.len()
        )));
    }

    SecretKey::from_slice(private_key).map_err(|e| Eip712Error::SigningError(e.to_string()))
}

/// Sign a pre-computed hash
pub fn sign_hash(hash: &[u8; 32], private_key: &[u8]) -> Result<Eip712Signature, Eip712Error> {
    let secp = Secp256k1::new();
    let secret_key = secret_key(private_key)?;

    let message =
        Message::from_digest_slice(hash).map_err(|e| Eip712Error::SigningError(e.to_string()))?;

    let (recovery_id, signature) = secp
        .sign_ecdsa_recoverable(&message, &secret_key)
        .serialize_compact();

    let mut r = [0u8; 32];
    let mut s = [0u8; 32];
    r.copy_from_slice(&signature[0..32]);
    s.copy_from_slice(&signature[32..64]);

    // v is recovery_id + 27 (Ethereum standard)
    let v = recovery_id.to_i32() as u8 + 27;

    Ok(Eip712Signature::new(r, s, v))
}

/// Derive the Ethereum address controlled by a private key
pub fn address_from_private_key(private_key: &[u8]) -> Result<[u8; 20], Eip712Error> {
    let secp = Secp256k1::new();
    let secret_key = secret_key(private_key)?;
    let public_key = PublicKey::from_secret_key(&secp, &secret_key);
    Ok(public_key_to_address(&public_key))
}

/// Recover the signer's address from a signature
#[cfg(test)]
pub(crate) fn recover_address(
    hash: &[u8; 32],
    signature: &Eip712Signature,
) -> Result<String, Eip712Error> {
    let secp = Secp256k1::new();

    let recovery_id = secp256k1::ecdsa::RecoveryId::from_i32((signature.v - 27) as i32)
        .map_err(|e| Eip712Error::InvalidSignature(e.to_string()))?;

    let mut sig_bytes = [0u8; 64];
    sig_bytes[0..32].copy_from_slice(&signature.r);
    sig_bytes[32..64].copy_from_slice(&signature.s);

    let recoverable_sig =
        secp256k1::ecdsa::RecoverableSignature::from_compact(&sig_bytes, recovery_id)
            .map_err(|e| Eip712Error::InvalidSignature(e.to_string()))?;

    let message =
        Message::from_digest_slice(hash).map_err(|e| Eip712Error::SigningError(e.to_string()))?;

    let public_key = secp
        .recover_ecdsa(&message, &recoverable_sig)
        .map_err(|e| Eip712Error::InvalidSignature(e.to_string()))?;

    Ok(checksum_address(&public_key_to_address(&public_key)))
}

/// Convert a secp256k1 public key to an Ethereum address
fn public_key_to_address(public_key: &PublicKey) -> [u8; 20] {
    // Uncompressed key without the 0x04 prefix
    let pubkey_bytes = public_key.serialize_uncompressed();
    let hash = keccak256(&pubkey_bytes[1..]);

    let mut address = [0u8; 20];
    address.copy_from_slice(&hash[12..32]);
    address
}

/// Compute the EIP-55 checksum address
pub fn checksum_address(address: &[u8; 20]) -> String {
    let hex_addr = hex::encode(address);
    let hash = keccak256(hex_addr.as_bytes());

    let mut checksummed = String::with_capacity(42);
    checksummed.push_str("0x");

    for (i, c) in hex_addr.chars().enumerate() {
        let byte = hash[i / 2];
        let nibble = if i % 2 == 0 { byte >> 4 } else { byte & 0x0f };
        if c.is_ascii_alphabetic() && nibble >= 8 {
            checksummed.push(c.to_ascii_uppercase());
        } else {
            checksummed.push(c);
        }
    }

    checksummed
}
