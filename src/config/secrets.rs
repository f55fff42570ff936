//! Secret loading with mandatory redaction.
//!
//! Log pipelines render arbitrary values, so redaction is enforced on the
//! type itself rather than left as a calling convention: both `Display` and
//! `Debug` print a placeholder and the raw characters are only reachable
//! through [`SecretValue::expose`].

use std::env;
use std::fmt;

use crate::config::ConfigError;

/// Minimum accepted secret length after trimming.
pub const MIN_SECRET_LENGTH: usize = 16;

/// A named secret resolved at startup. Immutable for the process lifetime.
#[derive(Clone)]
pub struct SecretValue {
    name: String,
    value: String,
}

impl SecretValue {
    /// Wrap an already-resolved secret. Prefer [`load_secret`] for values
    /// coming from the environment; this constructor skips validation.
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }

    /// Name under which the secret was resolved.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The underlying secret characters. Never log the return value.
    pub fn expose(&self) -> &str {
        &self.value
    }
}

impl fmt::Display for SecretValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "<secret:{}>", self.name)
    }
}

impl fmt::Debug for SecretValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "<secret:{}>", self.name)
    }
}

/// Resolve a secret from the environment.
///
/// The value is trimmed of surrounding whitespace before the length check.
/// A missing value without a default and a too-short value are both fatal.
pub fn load_secret(
    name: &str,
    default: Option<&str>,
    min_length: usize,
) -> Result<SecretValue, ConfigError> {
    let raw = match env::var(name) {
        Ok(value) => value,
        Err(_) => match default {
            Some(value) => value.to_string(),
            None => return Err(ConfigError::MissingSecret(name.to_string())),
        },
    };

    let trimmed = raw.trim();
    if trimmed.len() < min_length {
        return Err(ConfigError::SecretTooShort(name.to_string()));
    }

    Ok(SecretValue::new(name, trimmed))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_secret_fails() {
        let err = load_secret("KANBAN_TEST_ABSENT", None, MIN_SECRET_LENGTH).unwrap_err();
        assert!(matches!(err, ConfigError::MissingSecret(name) if name == "KANBAN_TEST_ABSENT"));
    }

    #[test]
    fn test_short_default_fails() {
        let err = load_secret("KANBAN_TEST_SHORT", Some("tiny"), MIN_SECRET_LENGTH).unwrap_err();
        assert!(matches!(err, ConfigError::SecretTooShort(_)));
    }

    #[test]
    fn test_default_is_trimmed_before_length_check() {
        let err = load_secret("KANBAN_TEST_PADDED", Some("   abcdef   "), 8).unwrap_err();
        assert!(matches!(err, ConfigError::SecretTooShort(_)));

        let secret = load_secret("KANBAN_TEST_PADDED", Some("  0123456789abcdef  "), 16).unwrap();
        assert_eq!(secret.expose(), "0123456789abcdef");
    }

    #[test]
    fn test_rendering_never_contains_raw_value() {
        let secret = SecretValue::new("JWT_SECRET", "super-sensitive-material");
        assert_eq!(format!("{}", secret), "<secret:JWT_SECRET>");
        assert_eq!(format!("{:?}", secret), "<secret:JWT_SECRET>");
        assert!(!format!("{} {:?}", secret, secret).contains("sensitive"));
    }
}
