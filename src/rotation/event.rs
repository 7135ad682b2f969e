//! Rotation request event and step dispatch types.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::error::{Result, RotationError};

/// One phase of the four-phase rotation protocol.
///
/// A closed set: dispatch matches on it exhaustively, so a new phase cannot
/// be added without the compiler pointing at every dispatch site.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RotationStep {
    /// Stage a new candidate value under the request token.
    #[serde(rename = "createSecret")]
    CreateSecret,
    /// Propagate the candidate to the protected resource.
    #[serde(rename = "setSecret")]
    SetSecret,
    /// Verify the candidate is usable against the protected resource.
    #[serde(rename = "testSecret")]
    TestSecret,
    /// Promote the candidate to current.
    #[serde(rename = "finishSecret")]
    FinishSecret,
}

impl RotationStep {
    /// The step's wire name as the scheduler sends it.
    pub fn as_str(&self) -> &'static str {
        match self {
            RotationStep::CreateSecret => "createSecret",
            RotationStep::SetSecret => "setSecret",
            RotationStep::TestSecret => "testSecret",
            RotationStep::FinishSecret => "finishSecret",
        }
    }
}

impl FromStr for RotationStep {
    type Err = RotationError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "createSecret" => Ok(RotationStep::CreateSecret),
            "setSecret" => Ok(RotationStep::SetSecret),
            "testSecret" => Ok(RotationStep::TestSecret),
            "finishSecret" => Ok(RotationStep::FinishSecret),
            other => Err(RotationError::invalid_step(other)),
        }
    }
}

impl fmt::Display for RotationStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A rotation request as delivered by the scheduler.
///
/// Ephemeral input: reconstructed fresh on every invocation and never
/// persisted. The step arrives as a raw string so that an unrecognized value
/// fails inside the handler's validation gate
/// ([`RotationError::InvalidStep`]) instead of as a deserialization artifact.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RotationEvent {
    /// ARN-like identifier of the secret record under rotation.
    #[serde(rename = "SecretId")]
    pub secret_id: String,

    /// Version token the scheduler minted for this rotation.
    #[serde(rename = "ClientRequestToken")]
    pub client_request_token: String,

    /// Requested protocol phase, unvalidated.
    #[serde(rename = "Step")]
    pub step: String,
}

impl RotationEvent {
    /// Builds an event from its parts.
    pub fn new(
        secret_id: impl Into<String>,
        client_request_token: impl Into<String>,
        step: impl Into<String>,
    ) -> Self {
        Self {
            secret_id: secret_id.into(),
            client_request_token: client_request_token.into(),
            step: step.into(),
        }
    }

    /// Parses the requested step, failing with
    /// [`RotationError::InvalidStep`] for anything outside the protocol.
    pub fn step(&self) -> Result<RotationStep> {
        self.step.parse()
    }
}
