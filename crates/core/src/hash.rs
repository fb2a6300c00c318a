// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Content hashing for graph records

use sha2::{Digest, Sha256};

/// SHA-256 over the given fields, as lowercase hex
///
/// Each field is written as its byte length (little-endian `u64`) followed by
/// its bytes, so free-text fields cannot shift a boundary and collide.
pub fn content_hash<'a>(fields: impl IntoIterator<Item = &'a str>) -> String {
    let mut hasher = Sha256::new();
    for field in fields {
        hasher.update((field.len() as u64).to_le_bytes());
        hasher.update(field.as_bytes());
    }
    hex_encode(&hasher.finalize())
}

fn hex_encode(bytes: &[u8]) -> String {
    bytes.iter().map(|b| format!("{:02x}", b)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hash_is_hex_sha256() {
        let hash = content_hash(["a", "b"]);
        assert_eq!(hash.len(), 64);
        assert!(hash.chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn hash_is_deterministic() {
        assert_eq!(content_hash(["x", "y"]), content_hash(["x", "y"]));
    }

    #[test]
    fn field_boundaries_are_part_of_the_hash() {
        assert_ne!(content_hash(["ab", "c"]), content_hash(["a", "bc"]));
        assert_ne!(content_hash(["a|b", "c"]), content_hash(["a", "b|c"]));
        assert_ne!(content_hash(["a", ""]), content_hash(["a"]));
    }
}
