//! Short code derivation from a long URL and a salt.
//!
//! [`generate_code`] is pure: the same URL and salt always give the same code.
//! Uniqueness comes from drawing a fresh salt per attempt through a
//! [`SaltSource`], which the shorten protocol takes as an injected dependency.

use sha2::{Digest, Sha256};

/// Number of hex characters in a generated short code.
pub const CODE_LENGTH: usize = 8;

/// Derives a short code from `long_url` and `salt`.
///
/// Hashes the URL followed by the decimal salt with SHA-256 and keeps the
/// first [`CODE_LENGTH`] lowercase hex characters of the digest.
///
/// # Examples
///
/// ```
/// use linkpool::utils::code_generator::generate_code;
///
/// let code = generate_code("https://example.com", 42);
/// assert_eq!(code.len(), 8);
/// assert_eq!(code, generate_code("https://example.com", 42));
/// ```
pub fn generate_code(long_url: &str, salt: u32) -> String {
    let digest = Sha256::new()
        .chain_update(long_url.as_bytes())
        .chain_update(salt.to_string().as_bytes())
        .finalize();

    let mut code = hex::encode(digest);
    code.truncate(CODE_LENGTH);
    code
}

/// Source of salts for collision retries.
pub trait SaltSource: Send + Sync {
    fn next_salt(&self) -> u32;
}

/// Draws 32-bit salts from the thread-local, OS-seeded RNG.
#[derive(Debug, Default, Clone, Copy)]
pub struct RandomSalt;

impl SaltSource for RandomSalt {
    fn next_salt(&self) -> u32 {
        rand::random()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_generate_code_has_correct_length() {
        let code = generate_code("https://example.com", 1);
        assert_eq!(code.len(), CODE_LENGTH);
    }

    #[test]
    fn test_generate_code_lowercase_hex() {
        let code = generate_code("https://example.com/some/path?q=1", 7);
        assert!(
            code.chars()
                .all(|c| c.is_ascii_digit() || ('a'..='f').contains(&c))
        );
    }

    #[test]
    fn test_generate_code_is_deterministic() {
        assert_eq!(
            generate_code("https://example.com", 99),
            generate_code("https://example.com", 99)
        );
    }

    #[test]
    fn test_generate_code_depends_on_salt() {
        let codes: HashSet<String> = (0..100)
            .map(|salt| generate_code("https://example.com", salt))
            .collect();

        assert!(codes.len() > 95);
    }

    #[test]
    fn test_generate_code_depends_on_url() {
        assert_ne!(
            generate_code("https://example.com/a", 1),
            generate_code("https://example.com/b", 1)
        );
    }

    #[test]
    fn test_generate_code_matches_digest_prefix() {
        let expected = hex::encode(Sha256::digest(b"https://example.com12345"));
        assert_eq!(generate_code("https://example.com", 12345), expected[..8]);
    }

    #[test]
    fn test_random_salt_varies() {
        let salts: HashSet<u32> = (0..1000).map(|_| RandomSalt.next_salt()).collect();
        assert!(salts.len() > 990);
    }
}
