//! EIP-712 Test Suite
//!
//! Reference vectors and signing tests for the EIP-712 module.

use super::*;

const MAIL_EXAMPLE: &str = r#"{
    "types": {
        "EIP712Domain": [
            {"name": "name", "type": "string"},
            {"name": "version", "type": "string"},
            {"name": "chainId", "type": "uint256"},
            {"name": "verifyingContract", "type": "address"}
        ],
        "Person": [
            {"name": "name", "type": "string"},
            {"name": "wallet", "type": "address"}
        ],
        "Mail": [
            {"name": "from", "type": "Person"},
            {"name": "to", "type": "Person"},
            {"name": "contents", "type": "string"}
        ]
    },
    "primaryType": "Mail",
    "domain": {
        "name": "Ether Mail",
        "version": "1",
        "chainId": 1,
        "verifyingContract": "0xCcCCccccCCCCcCCCCCCcCcCccCcCCCcCcccccccC"
    },
    "message": {
        "from": {
            "name": "Cow",
            "wallet": "0xCD2a3d9F938E13CD947Ec05AbC7FE734Df8DD826"
        },
        "to": {
            "name": "Bob",
            "wallet": "0xbBbBBBBbbBBBbbbBbbBbbbbBBbBbbbbBbBbbBBbB"
        },
        "contents": "Hello, Bob!"
    }
}"#;

/// Test the canonical Mail example from EIP-712 specification
#[test]
fn test_eip712_mail_example() {
    let typed_data = TypedData::from_json(MAIL_EXAMPLE).unwrap();
    let hash = hash_typed_data(&typed_data).unwrap();

    assert_eq!(
        hex::encode(hash),
        "be609aee343fb3c4b28e1df9e632fca64fcfaede20f02e86244efddf30957bd2"
    );
}

/// The reference implementation signs the Mail example with keccak256("cow")
#[test]
fn test_eip712_mail_signature_vector() {
    let typed_data = TypedData::from_json(MAIL_EXAMPLE).unwrap();
    let private_key = keccak256(b"cow");

    let signature = sign_typed_data(&typed_data, &private_key).unwrap();

    assert_eq!(signature.v, 28);
    assert_eq!(
        hex::encode(signature.r),
        "4355c47d63924e8a72e509b65029052eb6c299d53a04e167c5775fd466751c9d"
    );
    assert_eq!(
        hex::encode(signature.s),
        "07299936d304c153f6443dfa05f40ff007d72911b6f72307f996231605b91562"
    );
}

/// Permit2 single-transfer struct hashed with string-typed integers
#[test]
fn test_eip712_permit_transfer_from() {
    let json = r#"{
        "types": {
            "PermitTransferFrom": [
                {"name": "permitted", "type": "TokenPermissions"},
                {"name": "spender", "type": "address"},
                {"name": "nonce", "type": "uint256"},
                {"name": "deadline", "type": "uint256"}
            ],
            "TokenPermissions": [
                {"name": "token", "type": "address"},
                {"name": "amount", "type": "uint256"}
            ]
        },
        "primaryType": "PermitTransferFrom",
        "domain": {
            "name": "Permit2",
            "chainId": "1",
            "verifyingContract": "0x000000000022D473030F116dDEE9F6B43aC78BA3"
        },
        "message": {
            "permitted": {
                "token": "0xaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaa1111",
                "amount": "1000"
            },
            "spender": "0xbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbb2222",
            "nonce": "1",
            "deadline": "1000000"
        }
    }"#;

    let typed_data = TypedData::from_json(json).unwrap();
    typed_data.validate().unwrap();

    let with_strings = hash_typed_data(&typed_data).unwrap();

    let mut with_numbers = typed_data.clone();
    with_numbers.message["nonce"] = serde_json::json!(1);
    with_numbers.message["deadline"] = serde_json::json!(1_000_000);
    assert_eq!(hash_typed_data(&with_numbers).unwrap(), with_strings);
}

/// Test with nested struct arrays
#[test]
fn test_eip712_struct_arrays() {
    let json = r#"{
        "types": {
            "Item": [
                {"name": "id", "type": "uint256"},
                {"name": "name", "type": "string"}
            ],
            "Order": [
                {"name": "items", "type": "Item[]"},
                {"name": "buyer", "type": "address"}
            ]
        },
        "primaryType": "Order",
        "domain": {
            "name": "Marketplace",
            "chainId": 1
        },
        "message": {
            "items": [
                {"id": 1, "name": "Widget"},
                {"id": 2, "name": "Gadget"}
            ],
            "buyer": "0x1234567890123456789012345678901234567890"
        }
    }"#;

    let typed_data = TypedData::from_json(json).unwrap();
    typed_data.validate().unwrap();

    let hash = hash_typed_data(&typed_data).unwrap();

    let mut reordered = typed_data.clone();
    reordered.message["items"] = serde_json::json!([
        {"id": 2, "name": "Gadget"},
        {"id": 1, "name": "Widget"}
    ]);
    assert_ne!(hash_typed_data(&reordered).unwrap(), hash);
}

/// Test invalid primary type
#[test]
fn test_eip712_invalid_primary_type() {
    let json = r#"{
        "types": {
            "Person": [
                {"name": "name", "type": "string"}
            ]
        },
        "primaryType": "NonExistent",
        "domain": {"name": "Test"},
        "message": {}
    }"#;

    let typed_data = TypedData::from_json(json).unwrap();
    let result = typed_data.validate();

    assert!(matches!(result, Err(Eip712Error::InvalidPrimaryType(_))));
}

/// Test missing message field
#[test]
fn test_eip712_missing_field() {
    let mut typed_data = TypedData::from_json(MAIL_EXAMPLE).unwrap();
    typed_data.message["to"]
        .as_object_mut()
        .unwrap()
        .remove("wallet");

    let result = hash_typed_data(&typed_data);
    assert!(matches!(result, Err(Eip712Error::MissingField(field)) if field == "Person.wallet"));
}

/// Test chain ID parsing
#[test]
fn test_chain_id_parsing() {
    let domain1 = Eip712Domain {
        chain_id: Some(serde_json::json!(1)),
        ..Default::default()
    };
    assert_eq!(domain1.chain_id_u64(), Some(1));

    let domain2 = Eip712Domain {
        chain_id: Some(serde_json::json!("137")),
        ..Default::default()
    };
    assert_eq!(domain2.chain_id_u64(), Some(137));

    let domain3 = Eip712Domain {
        chain_id: Some(serde_json::json!("0x89")),
        ..Default::default()
    };
    assert_eq!(domain3.chain_id_u64(), Some(137));
}

/// Test pre-image generation
#[test]
fn test_pre_image_generation() {
    let typed_data = TypedData::from_json(MAIL_EXAMPLE).unwrap();
    let pre_image = get_pre_image(&typed_data).unwrap();

    assert_eq!(
        hex::encode(pre_image.struct_hash),
        "c52c0ee5d84264471806290a3f2c4cecfc5490626bf912d01f240d7a274b371e"
    );

    let direct_hash = hash_typed_data(&typed_data).unwrap();
    assert_eq!(pre_image.final_hash, direct_hash);
}

/// Test signing roundtrip
#[test]
fn test_signing_roundtrip() {
    let typed_data = TypedData::from_json(MAIL_EXAMPLE).unwrap();

    let private_key =
        hex::decode("0123456789abcdef0123456789abcdef0123456789abcdef0123456789abcdef").unwrap();

    let signature = sign_typed_data(&typed_data, &private_key).unwrap();

    let hash = hash_typed_data(&typed_data).unwrap();
    let recovered = recover_address(&hash, &signature).unwrap();
    let expected = checksum_address(&address_from_private_key(&private_key).unwrap());

    assert_eq!(recovered, expected);
}
