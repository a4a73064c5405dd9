//! Token hashing and random token generation.
//!
//! Secrets handed to clients (session ids, onboarding tokens) are stored only
//! as SHA-256 hex digests.

use rand::RngCore;
use sha2::{Digest, Sha256};

/// Computes SHA-256 of the input and returns it as lowercase hex.
pub fn sha256_hex(input: &str) -> String {
    hex::encode(Sha256::digest(input.as_bytes()))
}

/// Generates a random token of `bytes` bytes, hex encoded.
pub fn random_token_hex(bytes: usize) -> String {
    let mut buf = vec![0u8; bytes];
    rand::thread_rng().fill_bytes(&mut buf);
    hex::encode(buf)
}

/// Generates a 256-bit onboarding token.
pub fn onboarding_token() -> String {
    random_token_hex(32)
}
