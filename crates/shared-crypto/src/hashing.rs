//! # BLAKE3 Hashing
//!
//! Every digest, MAC and key-derivation step in the vault goes through BLAKE3.
//!
//! | Function | Use |
//! |----------|-----|
//! | `blake3_hash` | payload digests, long-junction compression |
//! | `blake3_hash_many` | digests over concatenated parts without copying |
//! | `blake3_keyed_hash` | hard derivation steps keyed by a chain code |
//! | `blake3_derive_key` | root secrets from seed phrase material |

use zeroize::Zeroizing;

/// BLAKE3 hash output (256-bit).
pub type Hash = [u8; 32];

/// Hash data with BLAKE3 (one-shot).
pub fn blake3_hash(data: &[u8]) -> Hash {
    *blake3::hash(data).as_bytes()
}

/// Hash the concatenation of several inputs.
pub fn blake3_hash_many(inputs: &[&[u8]]) -> Hash {
    let mut hasher = blake3::Hasher::new();
    for input in inputs {
        hasher.update(input);
    }
    *hasher.finalize().as_bytes()
}

/// Keyed hash (MAC).
pub fn blake3_keyed_hash(key: &[u8; 32], data: &[u8]) -> Hash {
    *blake3::keyed_hash(key, data).as_bytes()
}

/// Keyed hash over several parts. The output is secret material and is
/// wiped when dropped.
pub fn blake3_keyed_hash_many(key: &[u8; 32], parts: &[&[u8]]) -> Zeroizing<[u8; 32]> {
    let mut hasher = blake3::Hasher::new_keyed(key);
    for part in parts {
        hasher.update(part);
    }
    Zeroizing::new(*hasher.finalize().as_bytes())
}

/// Derive key from context and input key material.
pub fn blake3_derive_key(context: &str, key_material: &[u8]) -> Zeroizing<[u8; 32]> {
    let mut hasher = blake3::Hasher::new_derive_key(context);
    hasher.update(key_material);
    Zeroizing::new(*hasher.finalize().as_bytes())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deterministic() {
        assert_eq!(blake3_hash(b"test"), blake3_hash(b"test"));
        assert_ne!(blake3_hash(b"input1"), blake3_hash(b"input2"));
    }

    #[test]
    fn test_hash_many_matches_concatenation() {
        assert_eq!(
            blake3_hash_many(&[b"hello ", b"world"]),
            blake3_hash(b"hello world")
        );
    }

    #[test]
    fn test_keyed_hash() {
        let key = [0xABu8; 32];
        let h1 = blake3_keyed_hash(&key, b"data");
        let h3 = blake3_keyed_hash(&[0xCDu8; 32], b"data");

        assert_eq!(h1, *blake3_keyed_hash_many(&key, &[b"da", b"ta"]));
        assert_ne!(h1, h3);
    }

    #[test]
    fn test_derive_key_context_separation() {
        let a = blake3_derive_key("cold-vault ed25519", b"material");
        let b = blake3_derive_key("cold-vault ecdsa", b"material");
        assert_ne!(*a, *b);
    }
}
