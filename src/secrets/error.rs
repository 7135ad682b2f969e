//! Error types for secret-management backend operations.

use thiserror::Error;

/// Result type for backend operations.
pub type Result<T> = std::result::Result<T, SecretsError>;

/// Errors surfaced by a secret-management backend.
///
/// Backend errors are passed through to the invoking scheduler unchanged;
/// the rotation handler performs no retry or backoff of its own.
#[derive(Error, Debug)]
pub enum SecretsError {
    /// Secret record not found in the backend.
    #[error("Secret not found: {secret_id}")]
    NotFound { secret_id: String },

    /// A stored secret value could not be interpreted as structured fields.
    #[error("Malformed secret value for '{secret_id}': {reason}")]
    MalformedValue { secret_id: String, reason: String },

    /// Backend-side failure (network, throttling, permission denial).
    #[error("Backend error: {message}")]
    Service { message: String },

    /// Serialization/deserialization error.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl SecretsError {
    /// Create a not found error.
    pub fn not_found(secret_id: impl Into<String>) -> Self {
        Self::NotFound { secret_id: secret_id.into() }
    }

    /// Create a malformed value error.
    pub fn malformed_value(secret_id: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::MalformedValue { secret_id: secret_id.into(), reason: reason.into() }
    }

    /// Create a backend service error.
    pub fn service(message: impl Into<String>) -> Self {
        Self::Service { message: message.into() }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_constructors() {
        let err = SecretsError::not_found("arn:aws:secretsmanager:us-east-1:123:secret/db");
        assert!(matches!(err, SecretsError::NotFound { .. }));
        assert!(err.to_string().starts_with("Secret not found"));

        let err = SecretsError::service("throttled");
        assert!(matches!(err, SecretsError::Service { .. }));
    }

    #[test]
    fn test_error_display() {
        let err = SecretsError::malformed_value("arn:x", "not a JSON object");
        assert!(err.to_string().contains("arn:x"));
        assert!(err.to_string().contains("not a JSON object"));
    }
}
