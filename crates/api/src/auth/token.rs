//! Opaque session tokens.
//!
//! A token is 32 bytes from the thread-local CSPRNG, hex-encoded. The plaintext
//! is handed to the client once; only its SHA-256 digest is persisted, so a
//! leaked database does not expose usable sessions.

use homedash_core::hashing::sha256_hex;
use rand::RngCore;

/// Entropy per token, in bytes (256 bits).
pub const SESSION_TOKEN_BYTES: usize = 32;

/// Generate a new random session token (64 lowercase hex characters).
pub fn generate_session_token() -> String {
    let mut bytes = [0u8; SESSION_TOKEN_BYTES];
    rand::rng().fill_bytes(&mut bytes);
    hex::encode(bytes)
}

/// Digest under which a session token is stored and looked up.
pub fn hash_session_token(token: &str) -> String {
    sha256_hex(token.as_bytes())
}
