//! Crypto error types.

use thiserror::Error;

/// Cryptographic operation errors.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum CryptoError {
    /// Not a `did:key:z...` identifier
    #[error("Invalid DID: {0}")]
    InvalidDid(String),

    /// did:key with a multicodec other than Ed25519
    #[error("Unsupported key type in DID (multicodec prefix {0:#04x}{1:02x})")]
    UnsupportedKeyType(u8, u8),

    /// Invalid public key
    #[error("Invalid public key")]
    InvalidPublicKey,

    /// Signature not hex or wrong length
    #[error("Invalid signature format")]
    InvalidSignatureFormat,

    /// Signature verification failed
    #[error("Signature verification failed")]
    SignatureVerificationFailed,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unsupported_key_message() {
        let err = CryptoError::UnsupportedKeyType(0xe7, 0x01);
        assert!(err.to_string().contains("0xe701"));
    }
}
