//! Fingerprints for rendered system prompts.
//!
//! The system prompt embeds the current time and any retrieved documents, so
//! it changes on every turn. Logging a digest instead of the full text keeps
//! log lines short while still letting two turns be compared.

use std::fmt::Write;

use sha2::{Digest, Sha256};

/// Number of hex characters kept by [`hash_prompt`].
const FINGERPRINT_LEN: usize = 16;

/// Compute a short, stable SHA-256 fingerprint (hex) for a prompt string.
pub fn hash_prompt(prompt: &str) -> String {
    let digest = Sha256::digest(prompt.as_bytes());
    let mut hex = String::with_capacity(digest.len() * 2);
    for byte in digest.iter() {
        let _ = write!(hex, "{:02x}", byte);
    }
    hex.truncate(FINGERPRINT_LEN);
    hex
}
