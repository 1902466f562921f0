//! BLAKE3 content hashing used for cache keys.


/// Computes a 64-bit hash of the input data using BLAKE3, truncated from 256 bits.
///
/// Used for feature-hashing tokens into embedding buckets, where a rare collision only
/// merges two tokens into one dimension.
#[inline]
pub fn hash_to_u64(data: &[u8]) -> u64 {
    let hash = blake3::hash(data);
    let mut bytes = [0u8; 8];
    bytes.copy_from_slice(&hash.as_bytes()[0..8]);
    u64::from_le_bytes(bytes)
}

/// Cache key for an embedding: the model name is part of the key so two embedders
/// sharing one cache never serve each other's vectors.
#[inline]
pub fn embedding_cache_key(model: &str, text: &str) -> [u8; 32] {
    let mut hasher = blake3::Hasher::new();
    hasher.update(model.as_bytes());
    hasher.update(&[0u8]);
    hasher.update(text.as_bytes());
    *hasher.finalize().as_bytes()
}
