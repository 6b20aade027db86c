//! Blake2b hashing.

use blake2::digest::consts::U32;
use blake2::{Blake2b, Digest};
use passport_types::AppId;

type Blake2b256 = Blake2b<U32>;

/// Compute a 256-bit Blake2b hash of arbitrary data.
pub fn blake2b_256(data: &[u8]) -> [u8; 32] {
    blake2b_256_multi(&[data])
}

/// Hash multiple byte slices in sequence (avoids concatenation allocation).
pub fn blake2b_256_multi(parts: &[&[u8]]) -> [u8; 32] {
    let mut hasher = Blake2b256::new();
    for part in parts {
        hasher.update(part);
    }
    let mut output = [0u8; 32];
    output.copy_from_slice(&hasher.finalize());
    output
}

/// Application ids as the registry derives them: the hash of the app name.
pub fn app_id_from_name(name: &str) -> AppId {
    AppId::new(blake2b_256(name.as_bytes()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blake2b_deterministic() {
        assert_eq!(blake2b_256(b"hello passport"), blake2b_256(b"hello passport"));
        assert_ne!(blake2b_256(b"hello"), blake2b_256(b"world"));
    }

    #[test]
    fn blake2b_multi_equivalent() {
        let single = blake2b_256(b"helloworld");
        let multi = blake2b_256_multi(&[b"hello", b"world"]);
        assert_eq!(single, multi);
    }

    #[test]
    fn app_ids_differ_by_name() {
        assert_ne!(app_id_from_name("mugshot"), app_id_from_name("greencart"));
        assert_eq!(app_id_from_name("mugshot"), app_id_from_name("mugshot"));
    }
}
