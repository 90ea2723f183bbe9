//! SHA-256 digest computation for uploaded files
//!
//! Files are hashed incrementally as multipart chunks arrive, so the
//! whole upload never has to sit in memory at once. Clients compare the
//! resulting hex string byte-for-byte, so the algorithm is fixed.

use sha2::{Digest, Sha256};

/// Incremental SHA-256 hasher over a stream of byte chunks.
///
/// One instance per file; consuming `finalize_hex` makes reuse across
/// files impossible.
pub struct FileHasher(Sha256);

impl FileHasher {
    pub fn new() -> Self {
        Self(Sha256::new())
    }

    /// Feed the next chunk of file bytes.
    pub fn update(&mut self, chunk: &[u8]) {
        self.0.update(chunk);
    }

    /// Finish the stream and return the lowercase hex digest (64 chars).
    pub fn finalize_hex(self) -> String {
        hex::encode(self.0.finalize())
    }
}

impl Default for FileHasher {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_input_matches_known_digest() {
        let hasher = FileHasher::new();
        assert_eq!(
            hasher.finalize_hex(),
            "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855"
        );
    }

    #[test]
    fn abc_matches_known_digest() {
        let mut hasher = FileHasher::new();
        hasher.update(b"abc");
        assert_eq!(
            hasher.finalize_hex(),
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        );
    }

    #[test]
    fn chunking_does_not_change_digest() {
        let mut whole = FileHasher::new();
        whole.update(b"hello world, hashed in one go");

        let mut chunked = FileHasher::new();
        chunked.update(b"hello world, ");
        chunked.update(b"hashed in ");
        chunked.update(b"one go");

        assert_eq!(whole.finalize_hex(), chunked.finalize_hex());
    }

    #[test]
    fn digest_is_deterministic() {
        let hash = |bytes: &[u8]| {
            let mut h = FileHasher::new();
            h.update(bytes);
            h.finalize_hex()
        };
        assert_eq!(hash(b"same bytes"), hash(b"same bytes"));
        assert_ne!(hash(b"same bytes"), hash(b"other bytes"));
    }

    #[test]
    fn digest_is_lowercase_and_fixed_length() {
        let mut hasher = FileHasher::new();
        hasher.update(b"anything");
        let hex = hasher.finalize_hex();
        assert_eq!(hex.len(), 64);
        assert_eq!(hex, hex.to_lowercase());
    }
}
