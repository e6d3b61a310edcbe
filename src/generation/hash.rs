use blake3::Hasher;

/// Digest of the exact source text. Unlike card hashes this does no
/// normalization: two texts differing only in whitespace are different inputs.
pub fn content_hash(text: &str) -> String {
    let mut hasher = Hasher::new();
    hasher.update(text.as_bytes());
    hasher.finalize().to_hex().to_string()
}
