//! Salt handling using the secrecy crate
//!
//! The keyed-hash salt is the one secret PHI Guard holds. It is wrapped in
//! [`SecretSalt`] so that it is zeroized on drop, redacted in `Debug` output,
//! and only readable through an explicit `expose_secret()`.
//!
//! # Example
//!
//! ```rust
//! use phi_guard::config::secret_salt;
//! use secrecy::ExposeSecret;
//!
//! let salt = secret_salt("site-salt".to_string());
//! assert_eq!(salt.expose_secret().as_bytes(), b"site-salt");
//! assert!(!format!("{salt:?}").contains("site-salt"));
//! ```

use rand::distributions::Alphanumeric;
use rand::Rng;
use secrecy::{CloneableSecret, DebugSecret, Secret, SerializableSecret};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use zeroize::Zeroize;

/// Length of generated salts
pub const GENERATED_SALT_LEN: usize = 32;

/// Salt bytes; zeroized when dropped
#[derive(Clone, Debug, Zeroize)]
#[zeroize(drop)]
pub struct SaltValue(String);

impl CloneableSecret for SaltValue {}
impl DebugSecret for SaltValue {}
impl SerializableSecret for SaltValue {}

impl From<String> for SaltValue {
    fn from(s: String) -> Self {
        SaltValue(s)
    }
}

impl SaltValue {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn as_bytes(&self) -> &[u8] {
        self.0.as_bytes()
    }

    pub fn is_empty(&self) -> bool {
        self.0.trim().is_empty()
    }
}

impl Serialize for SaltValue {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        self.0.serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for SaltValue {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        String::deserialize(deserializer).map(SaltValue)
    }
}

/// Secret salt for the keyed hash
pub type SecretSalt = Secret<SaltValue>;

#[inline]
pub fn secret_salt(value: String) -> SecretSalt {
    Secret::new(SaltValue::from(value))
}

/// Fresh random alphanumeric salt
pub fn generate_salt() -> SecretSalt {
    let value: String = rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(GENERATED_SALT_LEN)
        .map(char::from)
        .collect();
    secret_salt(value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use secrecy::ExposeSecret;

    #[test]
    fn test_salt_debug_redacted() {
        let salt = secret_salt("sensitive-salt".to_string());
        let debug_output = format!("{salt:?}");
        assert!(!debug_output.contains("sensitive-salt"));
    }

    #[test]
    fn test_generated_salts_differ() {
        let a = generate_salt();
        let b = generate_salt();
        assert_eq!(a.expose_secret().as_bytes().len(), GENERATED_SALT_LEN);
        assert_ne!(a.expose_secret().as_bytes(), b.expose_secret().as_bytes());
    }

    #[test]
    fn test_blank_salt_is_empty() {
        assert!(secret_salt("   ".to_string()).expose_secret().is_empty());
        assert!(!secret_salt("s".to_string()).expose_secret().is_empty());
    }

    #[test]
    fn test_salt_serde() {
        #[derive(Serialize, Deserialize)]
        struct Section {
            salt: SecretSalt,
        }

        let parsed: Section = toml::from_str("salt = \"abc\"").unwrap();
        assert_eq!(parsed.salt.expose_secret().as_bytes(), b"abc");
        let json = serde_json::to_string(&parsed).unwrap();
        assert!(json.contains("abc"));
    }
}
