//! Keyed hashing for the HASH action
//!
//! Digests are HMACs of the normalized value keyed by the salt, rendered as
//! lowercase hex. The same (value, salt, algorithm) always yields the same
//! digest; there is no nonce or other hidden state.

use crate::config::secret::SecretSalt;
use crate::domain::errors::PhiGuardError;
use crate::domain::result::Result;
use hmac::{Hmac, Mac};
use secrecy::ExposeSecret;
use serde::{Deserialize, Serialize};
use sha2::{Sha256, Sha512};
use std::fmt;
use std::str::FromStr;

type HmacSha256 = Hmac<Sha256>;
type HmacSha512 = Hmac<Sha512>;

/// Digest algorithm of the keyed hash
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DigestAlgorithm {
    #[default]
    Sha256,
    Sha512,
}

impl DigestAlgorithm {
    pub const SUPPORTED: [DigestAlgorithm; 2] = [DigestAlgorithm::Sha256, DigestAlgorithm::Sha512];

    /// Length of the hex-encoded digest
    pub fn hex_len(&self) -> usize {
        match self {
            DigestAlgorithm::Sha256 => 64,
            DigestAlgorithm::Sha512 => 128,
        }
    }
}

impl fmt::Display for DigestAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DigestAlgorithm::Sha256 => write!(f, "sha256"),
            DigestAlgorithm::Sha512 => write!(f, "sha512"),
        }
    }
}

impl FromStr for DigestAlgorithm {
    type Err = PhiGuardError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().replace('-', "").as_str() {
            "sha256" => Ok(DigestAlgorithm::Sha256),
            "sha512" => Ok(DigestAlgorithm::Sha512),
            _ => Err(PhiGuardError::UnsupportedDigest(s.to_string())),
        }
    }
}

/// Keyed hash primitive
pub struct KeyedHasher {
    salt: SecretSalt,
    algorithm: DigestAlgorithm,
}

impl KeyedHasher {
    pub fn new(salt: SecretSalt, algorithm: DigestAlgorithm) -> Self {
        Self { salt, algorithm }
    }

    pub fn algorithm(&self) -> DigestAlgorithm {
        self.algorithm
    }

    /// Hex digest of `value` keyed by the salt
    pub fn digest(&self, value: &str) -> Result<String> {
        let key = self.salt.expose_secret().as_bytes();
        match self.algorithm {
            DigestAlgorithm::Sha256 => {
                let mut mac = HmacSha256::new_from_slice(key)
                    .map_err(|e| PhiGuardError::Validation(format!("Invalid salt: {e}")))?;
                mac.update(value.as_bytes());
                let result = mac.finalize().into_bytes();
                Ok(format!("{result:x}"))
            }
            DigestAlgorithm::Sha512 => {
                let mut mac = HmacSha512::new_from_slice(key)
                    .map_err(|e| PhiGuardError::Validation(format!("Invalid salt: {e}")))?;
                mac.update(value.as_bytes());
                let result = mac.finalize().into_bytes();
                Ok(format!("{result:x}"))
            }
        }
    }
}

impl fmt::Debug for KeyedHasher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("KeyedHasher")
            .field("algorithm", &self.algorithm)
            .finish_non_exhaustive()
    }
}

/// True when `value` looks like output of the keyed hash
///
/// Lowercase hex of exactly one of the supported digest lengths.
pub fn is_hash_output(value: &str) -> bool {
    DigestAlgorithm::SUPPORTED
        .iter()
        .any(|algorithm| value.len() == algorithm.hex_len())
        && value
            .bytes()
            .all(|b| b.is_ascii_digit() || (b'a'..=b'f').contains(&b))
}
