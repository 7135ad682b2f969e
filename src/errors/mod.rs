//! # Error Handling
//!
//! Crate-level error type for process concerns (configuration, logging
//! setup), defined with `thiserror`. Rotation-protocol and backend failures
//! carry their own taxonomies in [`crate::rotation::RotationError`] and
//! [`crate::secrets::SecretsError`].

/// Custom result type for process-level operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Crate-level error type.
#[derive(thiserror::Error, Debug)]
pub enum Error {
    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// Internal errors
    #[error("Internal error: {0}")]
    Internal(String),
}

impl Error {
    /// Create a new configuration error
    pub fn config<S: Into<String>>(message: S) -> Self {
        Self::Config(message.into())
    }

    /// Create a new internal error
    pub fn internal<S: Into<String>>(message: S) -> Self {
        Self::Internal(message.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        assert_eq!(Error::config("bad port").to_string(), "Configuration error: bad port");
        assert_eq!(Error::internal("oops").to_string(), "Internal error: oops");
    }
}
