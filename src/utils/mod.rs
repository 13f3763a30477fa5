//! Utility functions and helpers

pub mod certificates;
pub mod serde_base64;

/// Normalize a certificate hash for lookups: trimmed, lowercase, no colons.
pub fn normalize_hash(hash: &str) -> String {
    hash.trim().replace(':', "").to_ascii_lowercase()
}
