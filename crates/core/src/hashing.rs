//! Shared SHA-256 hex digest utility.
//!
//! Session tokens are never stored in plaintext; the session repository and
//! the auth service both key sessions by this digest.

use sha2::{Digest, Sha256};

/// Compute a SHA-256 hex digest of the given bytes.
pub fn sha256_hex(data: &[u8]) -> String {
    let hash = Sha256::digest(data);
    format!("{hash:x}")
}
