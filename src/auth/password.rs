//! Password Verifier
//! Mission: One-way salted hashing and constant-time verification

use anyhow::{Context, Result};
use bcrypt::DEFAULT_COST;

/// Hash a plaintext password with bcrypt (salted, cost-tunable).
pub fn hash(plaintext: &str) -> Result<String> {
    bcrypt::hash(plaintext, DEFAULT_COST).context("Failed to hash password")
}

/// Verify a plaintext password against a stored bcrypt hash.
///
/// Comparison time does not depend on where a mismatch occurs; that
/// property is the bcrypt library's responsibility.
pub fn verify(plaintext: &str, password_hash: &str) -> Result<bool> {
    bcrypt::verify(plaintext, password_hash).context("Failed to verify password")
}
