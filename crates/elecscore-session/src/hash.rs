use sha2::{Digest, Sha256};

/// One-way digest used to derive session tokens from client identities.
pub trait TokenHasher: Send + Sync {
    /// Deterministic digest of `bytes` as a fixed-length lowercase hex string.
    fn digest(&self, bytes: &[u8]) -> String;
}

/// SHA-256, rendered as 64 lowercase hex characters.
#[derive(Debug, Clone, Copy, Default)]
pub struct Sha256Hasher;

impl TokenHasher for Sha256Hasher {
    fn digest(&self, bytes: &[u8]) -> String {
        let mut hasher = Sha256::new();
        hasher.update(bytes);
        hex::encode(hasher.finalize())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sha256_known_vector() {
        assert_eq!(
            Sha256Hasher.digest(b"abc"),
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        );
    }

    #[test]
    fn test_sha256_deterministic() {
        let a = Sha256Hasher.digest(b"Mozilla/5.0 (X11; Linux x86_64)");
        let b = Sha256Hasher.digest(b"Mozilla/5.0 (X11; Linux x86_64)");
        assert_eq!(a, b);
        assert_eq!(a.len(), 64);
        assert!(a.chars().all(|c| c.is_ascii_digit() || ('a'..='f').contains(&c)));
    }

    #[test]
    fn test_different_inputs_differ() {
        assert_ne!(Sha256Hasher.digest(b"agentX"), Sha256Hasher.digest(b"agentY"));
    }
}
