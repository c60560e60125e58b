// PKCE helpers for the S256 challenge method
use crate::error::AuthError;
use anyhow::Result;
use base64::{engine::general_purpose, Engine as _};
use rand::{distributions::Alphanumeric, Rng};
use sha2::{Digest, Sha256};

pub const MIN_VERIFIER_LEN: usize = 43;
pub const MAX_VERIFIER_LEN: usize = 128;

/// A code verifier together with the challenge derived from it.
///
/// The two are only ever built together so the verifier sent at token
/// exchange is always the one whose hash went out with the auth prompt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PkcePair {
    verifier: String,
    challenge: String,
}

impl PkcePair {
    /// Draw a verifier of random length in [43, 128] and derive its challenge.
    pub fn generate() -> Result<Self> {
        let len = rand::thread_rng().gen_range(MIN_VERIFIER_LEN..=MAX_VERIFIER_LEN);
        Self::from_verifier(generate_code_verifier(len))
    }

    pub fn from_verifier(verifier: String) -> Result<Self> {
        let challenge = code_challenge_s256(&verifier)?;
        Ok(Self { verifier, challenge })
    }

    pub fn verifier(&self) -> &str {
        &self.verifier
    }

    pub fn challenge(&self) -> &str {
        &self.challenge
    }

    pub fn method(&self) -> &'static str {
        "S256"
    }
}

/// Random verifier over the 62-symbol alphanumeric alphabet.
pub fn generate_code_verifier(len: usize) -> String {
    rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(len)
        .map(char::from)
        .collect()
}

/// base64url(SHA-256(verifier)) without padding.
pub fn code_challenge_s256(verifier: &str) -> Result<String> {
    if verifier.is_empty() {
        return Err(AuthError::InvalidVerifier("verifier is empty".into()).into());
    }
    let hash = Sha256::digest(verifier.as_bytes());
    Ok(general_purpose::URL_SAFE_NO_PAD.encode(hash))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generated_verifiers_stay_in_range_and_alphabet() {
        for _ in 0..200 {
            let pair = PkcePair::generate().unwrap();
            let len = pair.verifier().len();
            assert!((MIN_VERIFIER_LEN..=MAX_VERIFIER_LEN).contains(&len), "len {}", len);
            assert!(pair.verifier().chars().all(|c| c.is_ascii_alphanumeric()));
        }
    }

    #[test]
    fn challenge_for_known_verifier() {
        let challenge = code_challenge_s256("abc123").unwrap();
        assert_eq!(challenge, "bKE9UspwyIPg8LsQHkJaiehiTeUdstI5JZOvaoQRgJA");
    }

    #[test]
    fn challenge_is_deterministic_and_url_safe() {
        let verifier = generate_code_verifier(96);
        let a = code_challenge_s256(&verifier).unwrap();
        let b = code_challenge_s256(&verifier).unwrap();
        assert_eq!(a, b);
        assert_eq!(a.len(), 43);
        assert!(!a.contains('+') && !a.contains('/') && !a.contains('='));
    }

    #[test]
    fn empty_verifier_is_rejected() {
        let err = code_challenge_s256("").unwrap_err();
        assert!(matches!(
            err.downcast_ref::<AuthError>(),
            Some(AuthError::InvalidVerifier(_))
        ));
    }

    #[test]
    fn pair_keeps_verifier_and_challenge_together() {
        let pair = PkcePair::from_verifier("abc123".into()).unwrap();
        assert_eq!(pair.verifier(), "abc123");
        assert_eq!(pair.challenge(), "bKE9UspwyIPg8LsQHkJaiehiTeUdstI5JZOvaoQRgJA");
        assert_eq!(pair.method(), "S256");
    }
}
