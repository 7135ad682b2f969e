//! Secure types for handling credential material.
//!
//! Raw secret payloads cross module boundaries inside [`SecretString`], which
//! redacts its contents in Debug, Display, and serialization and zeroes its
//! memory on drop. [`SecretValue`] wraps the stored payload of one secret
//! version.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use zeroize::{Zeroize, ZeroizeOnDrop};

/// A string wrapper that redacts its contents in Debug, Display, and
/// serialization.
///
/// Debug and Display print `[REDACTED]`, serialization outputs `"[REDACTED]"`,
/// and the underlying memory is zeroed when dropped. The actual value is only
/// reachable through [`SecretString::expose_secret`].
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct SecretString(String);

impl SecretString {
    /// Creates a new SecretString from a string value.
    pub fn new(secret: impl Into<String>) -> Self {
        Self(secret.into())
    }

    /// Exposes the underlying secret value.
    ///
    /// Never log or print the result.
    pub fn expose_secret(&self) -> &str {
        &self.0
    }

    /// Returns the length of the secret without exposing the value.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns true if the secret is empty.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl Serialize for SecretString {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        // Never serialize the actual secret value.
        serializer.serialize_str("[REDACTED]")
    }
}

impl<'de> Deserialize<'de> for SecretString {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = String::deserialize(deserializer)?;
        Ok(SecretString(value))
    }
}

impl fmt::Debug for SecretString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SecretString([REDACTED])")
    }
}

impl fmt::Display for SecretString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[REDACTED]")
    }
}

impl PartialEq for SecretString {
    fn eq(&self, other: &Self) -> bool {
        self.0 == other.0
    }
}

impl Eq for SecretString {}

impl From<String> for SecretString {
    fn from(s: String) -> Self {
        Self::new(s)
    }
}

impl From<&str> for SecretString {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

/// The stored payload of one secret version.
///
/// The payload is an opaque string as far as the backend is concerned; for
/// credential records it is a JSON object whose `password` field carries the
/// rotated credential. Field-level interpretation happens in the rotation
/// handler, which knows which secret the payload belongs to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SecretValue(SecretString);

impl SecretValue {
    /// Creates a secret value from a raw payload string.
    pub fn new(raw: impl Into<String>) -> Self {
        Self(SecretString::new(raw))
    }

    /// Exposes the raw payload.
    ///
    /// Never log or print the result.
    pub fn expose_secret(&self) -> &str {
        self.0.expose_secret()
    }
}

impl From<SecretString> for SecretValue {
    fn from(s: SecretString) -> Self {
        Self(s)
    }
}

impl fmt::Display for SecretValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[REDACTED]")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_secret_string_redacts_debug_and_display() {
        let secret = SecretString::new("super-secret-value");

        assert_eq!(format!("{:?}", secret), "SecretString([REDACTED])");
        assert_eq!(format!("{}", secret), "[REDACTED]");
    }

    #[test]
    fn test_secret_string_expose() {
        let secret = SecretString::new("my-secret");
        assert_eq!(secret.expose_secret(), "my-secret");
        assert_eq!(secret.len(), 9);
        assert!(!secret.is_empty());
    }

    #[test]
    fn test_secret_string_serialization_redacts() {
        let secret = SecretString::new("super-secret-value");
        let json = serde_json::to_string(&secret).unwrap();

        assert_eq!(json, "\"[REDACTED]\"");
        assert!(!json.contains("super-secret"));
    }

    #[test]
    fn test_secret_string_deserialization_accepts_values() {
        let secret: SecretString = serde_json::from_str("\"my-actual-secret\"").unwrap();
        assert_eq!(secret.expose_secret(), "my-actual-secret");
    }

    #[test]
    fn test_secret_value_redacts() {
        let value = SecretValue::new(r#"{"password":"hunter2"}"#);
        let debug_output = format!("{:?}", value);

        assert!(!debug_output.contains("hunter2"));
        assert_eq!(format!("{}", value), "[REDACTED]");
    }

    #[test]
    fn test_secret_value_round_trip() {
        let value = SecretValue::new("payload");
        assert_eq!(value.expose_secret(), "payload");

        let from_string: SecretValue = SecretString::new("payload").into();
        assert_eq!(value, from_string);
    }
}
