//! # Shared Crypto
//!
//! ## Components
//!
//! | Module | Algorithm | Use Case |
//! |--------|-----------|----------|
//! | `signatures` | Ed25519 | Author signatures on graph writes |
//! | `did` | multicodec + base58btc | `did:key` author identifiers |
//! | `hashing` | BLAKE3 | Gossip message ids, peer keys |
//!
//! ## Security Properties
//!
//! - **Ed25519**: Deterministic nonces, no RNG dependency
//! - **did:key**: The verifying key is embedded in the identifier; no
//!   registry lookup can be poisoned

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod did;
pub mod errors;
pub mod hashing;
pub mod signatures;

// Re-exports
pub use did::{decode_did_key, encode_did_key, verify_did_signature, ED25519_MULTICODEC};
pub use errors::CryptoError;
pub use hashing::{blake3_hash, blake3_hash_many, peer_key, short_hex_digest, Hash, PEER_KEY_BYTES};
pub use signatures::{Ed25519KeyPair, Ed25519PublicKey, Ed25519Signature};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
