//! # did:key
//!
//! Authors are identified by `did:key` strings that embed their Ed25519
//! public key, so verifying a signature needs no key lookup:
//!
//! ```text
//! did:key:z<base58btc(0xed 0x01 || public key)>
//! ```

use crate::signatures::Ed25519PublicKey;
use crate::CryptoError;

/// Multicodec prefix for an Ed25519 public key.
pub const ED25519_MULTICODEC: [u8; 2] = [0xed, 0x01];

const DID_KEY_BASE58_PREFIX: &str = "did:key:z";

/// Encode a public key as a `did:key` identifier.
pub fn encode_did_key(key: &Ed25519PublicKey) -> String {
    let mut bytes = Vec::with_capacity(34);
    bytes.extend_from_slice(&ED25519_MULTICODEC);
    bytes.extend_from_slice(key.as_bytes());
    format!("{}{}", DID_KEY_BASE58_PREFIX, bs58::encode(bytes).into_string())
}

/// Extract the Ed25519 public key embedded in a `did:key` identifier.
pub fn decode_did_key(did: &str) -> Result<Ed25519PublicKey, CryptoError> {
    let encoded = did
        .strip_prefix(DID_KEY_BASE58_PREFIX)
        .ok_or_else(|| CryptoError::InvalidDid(did.to_string()))?;

    let bytes = bs58::decode(encoded)
        .into_vec()
        .map_err(|_| CryptoError::InvalidDid(did.to_string()))?;

    if bytes.len() < 2 {
        return Err(CryptoError::InvalidDid(did.to_string()));
    }
    if bytes[..2] != ED25519_MULTICODEC {
        return Err(CryptoError::UnsupportedKeyType(bytes[0], bytes[1]));
    }

    let key: [u8; 32] = bytes[2..]
        .try_into()
        .map_err(|_| CryptoError::InvalidPublicKey)?;
    Ed25519PublicKey::from_bytes(key)
}

/// Verify `signature_hex` over `message` against the key inside `did`.
pub fn verify_did_signature(
    did: &str,
    message: &[u8],
    signature_hex: &str,
) -> Result<(), CryptoError> {
    decode_did_key(did)?.verify_hex(message, signature_hex)
}
