//! Application-layer nonce derivation
//!
//! The nonce of an instruction is the first 8 hex characters of the
//! SHA-256 of its client id, read as a big-endian u32. Client ids default
//! to random UUIDs; any stable string works. Collisions are tolerable
//! because the server deduplicates on (account, nonce).

use sha2::{Digest, Sha256};
use uuid::Uuid;

/// Derives the 32-bit nonce for a client id.
pub fn nonce_from_client_id(client_id: &str) -> u32 {
    let digest = Sha256::digest(client_id.as_bytes());
    // first 8 hex chars == first 4 bytes, big-endian
    u32::from_be_bytes([digest[0], digest[1], digest[2], digest[3]])
}

/// A fresh random client id.
pub fn generate_client_id() -> String {
    Uuid::new_v4().to_string()
}
