//! # Client-Side Signing
//!
//! Produce the signatures the validator checks. Used by the deletion
//! protocol to sign deletion records and by anything that authors content
//! on behalf of a local identity.

use shared_crypto::Ed25519KeyPair;
use shared_types::{Annotation, Comment, DeletionRecord, Profile, Soul, Timestamp};

/// Conventional annotation id: `<author-did>-<creation-epoch-ms>`.
pub fn annotation_id(author: &str, created_at: Timestamp) -> String {
    format!("{author}-{created_at}")
}

/// Set `author` to the key's DID and sign.
pub fn sign_annotation(keypair: &Ed25519KeyPair, annotation: &mut Annotation) {
    annotation.author = keypair.did();
    annotation.signature = keypair.sign_hex(&annotation.signing_bytes());
}

pub fn sign_comment(keypair: &Ed25519KeyPair, comment: &mut Comment) {
    comment.author = keypair.did();
    comment.signature = keypair.sign_hex(&comment.signing_bytes());
}

pub fn sign_profile(keypair: &Ed25519KeyPair, profile: &mut Profile) {
    profile.author = keypair.did();
    profile.signature = keypair.sign_hex(&profile.signing_bytes());
}

/// Deletion record authorizing the soft-delete of `target`.
pub fn sign_deletion(
    keypair: &Ed25519KeyPair,
    target: &Soul,
    timestamp: Timestamp,
    nonce: &str,
) -> DeletionRecord {
    DeletionRecord {
        signature: keypair.sign_hex(&DeletionRecord::signing_bytes(target, timestamp, nonce)),
        author: keypair.did(),
        timestamp,
        nonce: nonce.to_string(),
    }
}
