//! Salted password hashing with bcrypt.
//!
//! Every call to [`hash_password`] draws a fresh random salt, so hashing the same
//! password twice yields two different [`Credential`]s that both verify.
//!
//! bcrypt only reads the first 72 bytes of its input. Rather than silently
//! truncating, passwords longer than [`MAX_PASSWORD_BYTES`] are rejected.

use std::fmt;
use std::str::{FromStr, Utf8Error};

use bcrypt::{HashParts, DEFAULT_COST};
use thiserror::Error;
use tracing::debug;

/// Longest password bcrypt can hash without truncation, in UTF-8 bytes.
pub const MAX_PASSWORD_BYTES: usize = 72;

#[derive(Debug, Error)]
pub enum PasswordError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),
    #[error("Credential is not valid UTF-8: {0}")]
    Encoding(#[from] Utf8Error),
    #[error("Hashing failed: {0}")]
    Hash(#[from] bcrypt::BcryptError),
}

/// A bcrypt encoding (`$2b$<cost>$<salt><hash>`) of a salted password hash.
#[derive(Clone, PartialEq, Eq)]
pub struct Credential {
    encoded: String,
    cost: u32,
}

impl Credential {
    /// Parse a stored bcrypt encoding.
    pub fn parse(encoded: &str) -> Result<Self, PasswordError> {
        let parts = HashParts::from_str(encoded)
            .map_err(|e| PasswordError::InvalidInput(format!("unrecognized credential: {}", e)))?;

        Ok(Self {
            encoded: encoded.to_string(),
            cost: parts.get_cost(),
        })
    }

    /// Parse a stored encoding from raw bytes, e.g. a `VARBINARY` column.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, PasswordError> {
        let encoded = std::str::from_utf8(bytes)?;
        Self::parse(encoded)
    }

    pub fn as_str(&self) -> &str {
        &self.encoded
    }

    pub fn as_bytes(&self) -> &[u8] {
        self.encoded.as_bytes()
    }

    /// The bcrypt cost factor the credential was produced with.
    pub fn cost(&self) -> u32 {
        self.cost
    }

    pub fn into_string(self) -> String {
        self.encoded
    }
}

impl FromStr for Credential {
    type Err = PasswordError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<&[u8]> for Credential {
    type Error = PasswordError;

    fn try_from(bytes: &[u8]) -> Result<Self, Self::Error> {
        Self::from_bytes(bytes)
    }
}

impl AsRef<[u8]> for Credential {
    fn as_ref(&self) -> &[u8] {
        self.as_bytes()
    }
}

// Only the algorithm prefix and cost are shown; the salt and digest stay out of logs.
impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credential")
            .field("cost", &self.cost)
            .field("encoded", &"<redacted>")
            .finish()
    }
}

fn check_password_input(password: &str) -> Result<(), PasswordError> {
    if password.is_empty() {
        return Err(PasswordError::InvalidInput("password is empty".to_string()));
    }
    if password.len() > MAX_PASSWORD_BYTES {
        return Err(PasswordError::InvalidInput(format!(
            "password is {} bytes, max {}",
            password.len(),
            MAX_PASSWORD_BYTES
        )));
    }
    Ok(())
}

/// Hash a password with a freshly generated salt at bcrypt's default cost.
pub fn hash_password(password: &str) -> Result<Credential, PasswordError> {
    check_password_input(password)?;

    let encoded = bcrypt::hash(password, DEFAULT_COST)?;
    debug!(cost = DEFAULT_COST, "Hashed password");

    Ok(Credential {
        encoded,
        cost: DEFAULT_COST,
    })
}

/// Check a candidate password against a stored credential.
///
/// The comparison is constant time. Candidates that [`hash_password`] would
/// refuse (empty, or longer than [`MAX_PASSWORD_BYTES`]) never match.
pub fn verify_password(candidate: &str, credential: &Credential) -> Result<bool, PasswordError> {
    if check_password_input(candidate).is_err() {
        return Ok(false);
    }

    bcrypt::verify(candidate, credential.as_str())
        .map_err(|e| PasswordError::InvalidInput(format!("unrecognized credential: {}", e)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_and_verify() {
        let password = "TestPassword123!";
        let credential = hash_password(password).unwrap();
        assert!(credential.as_str().starts_with("$2b$"));
        assert!(verify_password(password, &credential).unwrap());
        assert!(!verify_password("wrong", &credential).unwrap());
    }

    #[test]
    fn test_different_passwords_different_hashes() {
        let h1 = hash_password("password1").unwrap();
        let h2 = hash_password("password1").unwrap();
        // Same password should produce different hashes (different salts)
        assert_ne!(h1.as_bytes(), h2.as_bytes());
        assert!(verify_password("password1", &h1).unwrap());
        assert!(verify_password("password1", &h2).unwrap());
    }

    #[test]
    fn test_default_cost_recorded() {
        let credential = hash_password("hunter2").unwrap();
        assert_eq!(credential.cost(), DEFAULT_COST);
    }

    #[test]
    fn test_empty_password_rejected() {
        assert!(matches!(
            hash_password(""),
            Err(PasswordError::InvalidInput(_))
        ));
    }

    #[test]
    fn test_max_length_boundary() {
        let at_limit = "a".repeat(MAX_PASSWORD_BYTES);
        let credential = hash_password(&at_limit).unwrap();
        assert!(verify_password(&at_limit, &credential).unwrap());

        let over_limit = "a".repeat(MAX_PASSWORD_BYTES + 1);
        assert!(matches!(
            hash_password(&over_limit),
            Err(PasswordError::InvalidInput(_))
        ));
        // bcrypt would truncate this to `at_limit`; it must not match.
        assert!(!verify_password(&over_limit, &credential).unwrap());
    }

    #[test]
    fn test_length_limit_counts_utf8_bytes() {
        // 25 chars, 75 bytes
        let password = "€".repeat(25);
        assert!(password.chars().count() < MAX_PASSWORD_BYTES);
        assert!(hash_password(&password).is_err());
    }

    #[test]
    fn test_parse_roundtrip() {
        let credential = hash_password("s3cret").unwrap();
        let stored = credential.as_bytes().to_vec();

        let loaded = Credential::from_bytes(&stored).unwrap();
        assert_eq!(loaded, credential);
        assert!(verify_password("s3cret", &loaded).unwrap());
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert!(matches!(
            Credential::parse("not-a-bcrypt-hash"),
            Err(PasswordError::InvalidInput(_))
        ));
        assert!(matches!(
            "".parse::<Credential>(),
            Err(PasswordError::InvalidInput(_))
        ));
    }

    #[test]
    fn test_from_bytes_rejects_invalid_utf8() {
        let bytes: &[u8] = &[0x24, 0x32, 0x62, 0xff, 0xfe];
        assert!(matches!(
            Credential::try_from(bytes),
            Err(PasswordError::Encoding(_))
        ));
    }

    #[test]
    fn test_debug_hides_hash() {
        let credential = hash_password("s3cret").unwrap();
        let debug = format!("{:?}", credential);
        assert!(!debug.contains(credential.as_str()));
        assert!(debug.contains("redacted"));
    }
}
