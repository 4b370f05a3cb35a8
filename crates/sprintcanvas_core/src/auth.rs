//! Passphrase gate for edit mode.
//!
//! # Responsibility
//! - Verify user input against one expected SHA-256 digest.
//!
//! # Invariants
//! - Digest comparison is constant-time.
//! - The expected digest is supplied by the embedding application; core
//!   never embeds a secret.

use sha2::{Digest, Sha256};
use std::error::Error;
use std::fmt::{Display, Formatter};
use subtle::ConstantTimeEq;

const DIGEST_HEX_LEN: usize = 64;

/// Gate construction failures.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthError {
    /// Expected digest is not 64 lowercase hex characters.
    InvalidDigest(String),
}

impl Display for AuthError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidDigest(value) => {
                write!(f, "expected digest is not a sha-256 hex string: `{value}`")
            }
        }
    }
}

impl Error for AuthError {}

/// Returns the lowercase hex SHA-256 digest of the input.
pub fn digest_hex(input: &str) -> String {
    let digest = Sha256::digest(input.as_bytes());
    digest.iter().map(|byte| format!("{byte:02x}")).collect()
}

/// Shared-secret gate verified by digest comparison.
#[derive(Debug, Clone)]
pub struct PassphraseGate {
    expected_digest: String,
}

impl PassphraseGate {
    /// Creates a gate from the expected digest in lowercase hex.
    pub fn new(expected_digest_hex: impl Into<String>) -> Result<Self, AuthError> {
        let expected_digest = expected_digest_hex.into();
        let well_formed = expected_digest.len() == DIGEST_HEX_LEN
            && expected_digest
                .chars()
                .all(|c| c.is_ascii_hexdigit() && !c.is_ascii_uppercase());
        if !well_formed {
            return Err(AuthError::InvalidDigest(expected_digest));
        }
        Ok(Self { expected_digest })
    }

    /// Convenience constructor hashing a plaintext passphrase; intended for
    /// tests and local tooling, not for shipping secrets in code.
    pub fn from_passphrase(passphrase: &str) -> Self {
        Self {
            expected_digest: digest_hex(passphrase),
        }
    }

    /// Verifies user input. Wrong input returns `false`; there is no
    /// lockout or backoff.
    pub fn verify(&self, input: &str) -> bool {
        let candidate = digest_hex(input);
        candidate
            .as_bytes()
            .ct_eq(self.expected_digest.as_bytes())
            .into()
    }
}

#[cfg(test)]
mod tests {
    use super::{digest_hex, AuthError, PassphraseGate};

    #[test]
    fn digest_is_lowercase_hex() {
        let digest = digest_hex("abc");
        assert_eq!(digest.len(), 64);
        assert_eq!(
            digest,
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        );
    }

    #[test]
    fn verifies_correct_passphrase_only() {
        let gate = PassphraseGate::from_passphrase("open sesame");
        assert!(gate.verify("open sesame"));
        assert!(!gate.verify("open sesame "));
        assert!(!gate.verify(""));
    }

    #[test]
    fn rejects_malformed_expected_digest() {
        assert!(matches!(
            PassphraseGate::new("not-a-digest"),
            Err(AuthError::InvalidDigest(_))
        ));
        let uppercase = digest_hex("x").to_uppercase();
        assert!(PassphraseGate::new(uppercase).is_err());
    }

    #[test]
    fn accepts_digest_from_digest_hex() {
        let gate = PassphraseGate::new(digest_hex("secret")).unwrap();
        assert!(gate.verify("secret"));
    }
}
