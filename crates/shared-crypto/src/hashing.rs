//! # BLAKE3 Hashing
//!
//! Identifiers that must be unique but need not be secret: gossip message
//! ids and peer directory keys.

/// BLAKE3 hash output (256-bit).
pub type Hash = [u8; 32];

/// Hash data with BLAKE3 (one-shot).
pub fn blake3_hash(data: &[u8]) -> Hash {
    *blake3::hash(data).as_bytes()
}

/// Hash multiple inputs as one stream.
pub fn blake3_hash_many(inputs: &[&[u8]]) -> Hash {
    let mut hasher = blake3::Hasher::new();
    for input in inputs {
        hasher.update(input);
    }
    *hasher.finalize().as_bytes()
}

/// First `len` bytes of the BLAKE3 hash, hex encoded.
pub fn short_hex_digest(data: &[u8], len: usize) -> String {
    let hash = blake3_hash(data);
    hex::encode(&hash[..len.min(hash.len())])
}

/// Bytes of digest kept in a peer directory key.
pub const PEER_KEY_BYTES: usize = 8;

/// Directory key of a peer, derived from its public URL.
///
/// Stable across restarts, so a node always rewrites the same entry.
pub fn peer_key(url: &str) -> String {
    short_hex_digest(url.as_bytes(), PEER_KEY_BYTES)
}
