//! Opaque token generation and digesting
//!
//! Refresh and password-reset tokens are random byte strings handed to the
//! caller hex-encoded. Only the SHA-256 digest is ever stored.

use rand::{rngs::OsRng, RngCore};
use sha2::{Digest, Sha256};

/// Number of random bytes in an opaque token
pub const OPAQUE_TOKEN_BYTES: usize = 64;

/// Generate a fresh opaque token (128 hex characters)
#[must_use]
pub fn generate_opaque_token() -> String {
    let mut bytes = [0u8; OPAQUE_TOKEN_BYTES];
    OsRng.fill_bytes(&mut bytes);
    hex::encode(bytes)
}

/// Digest an opaque token for storage and lookup
#[must_use]
pub fn hash_token(token: &str) -> String {
    hex::encode(Sha256::digest(token.as_bytes()))
}
