//! Error types for the rotation protocol.

use thiserror::Error;

use crate::secrets::SecretsError;

/// Result type for rotation operations.
pub type Result<T> = std::result::Result<T, RotationError>;

/// Errors surfaced by the rotation handler.
///
/// The validation variants indicate a caller or configuration mistake and are
/// not retryable by the handler itself; the invoking scheduler owns retry and
/// alerting policy. Backend failures pass through via [`RotationError::Secrets`]
/// without local retry or backoff.
#[derive(Error, Debug)]
pub enum RotationError {
    /// Rotation is switched off for the secret.
    #[error("Rotation is not enabled for secret {secret_id}")]
    RotationNotEnabled { secret_id: String },

    /// The request token does not name a known version of the secret.
    #[error("Secret version {token} has no stage for rotation of secret {secret_id}")]
    UnknownVersion { secret_id: String, token: String },

    /// The requested version is not staged as the pending candidate.
    #[error("Secret version {token} not staged as pending for rotation of secret {secret_id}")]
    InvalidStage { secret_id: String, token: String },

    /// The request named a step outside the rotation protocol.
    #[error("Invalid rotation step: {step}")]
    InvalidStep { step: String },

    /// A rotation target rejected the pending candidate, blocking promotion.
    #[error("Pending candidate rejected for secret {secret_id}: {reason}")]
    CandidateRejected { secret_id: String, reason: String },

    /// Backend failure, passed through to the scheduler.
    #[error(transparent)]
    Secrets(#[from] SecretsError),
}

impl RotationError {
    /// Create a rotation-not-enabled error.
    pub fn rotation_not_enabled(secret_id: impl Into<String>) -> Self {
        Self::RotationNotEnabled { secret_id: secret_id.into() }
    }

    /// Create an unknown-version error.
    pub fn unknown_version(secret_id: impl Into<String>, token: impl Into<String>) -> Self {
        Self::UnknownVersion { secret_id: secret_id.into(), token: token.into() }
    }

    /// Create an invalid-stage error.
    pub fn invalid_stage(secret_id: impl Into<String>, token: impl Into<String>) -> Self {
        Self::InvalidStage { secret_id: secret_id.into(), token: token.into() }
    }

    /// Create an invalid-step error.
    pub fn invalid_step(step: impl Into<String>) -> Self {
        Self::InvalidStep { step: step.into() }
    }

    /// Create a candidate-rejected error.
    pub fn candidate_rejected(secret_id: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::CandidateRejected { secret_id: secret_id.into(), reason: reason.into() }
    }

    /// Whether this is a validation failure (caller/configuration mistake or
    /// rejected candidate) rather than a backend failure.
    pub fn is_validation_failure(&self) -> bool {
        !matches!(self, Self::Secrets(_))
    }
}
