//! Core secret-management client trait and version-staging types.
//!
//! The rotation handler reaches its backend exclusively through
//! [`SecretsManagerApi`], a narrow capability interface mirroring the five
//! logical operations a managed secret store exposes for rotation. Production
//! uses the AWS-backed implementation (behind the `aws` feature); tests and
//! development use [`super::memory::InMemorySecretsManager`].

use async_trait::async_trait;
use std::collections::{HashMap, HashSet};
use std::fmt;

use super::error::Result;
use super::types::{SecretString, SecretValue};

/// Staging label attached to a secret version.
///
/// At most one version holds [`StageLabel::Current`] at any time. During an
/// in-flight rotation [`StageLabel::Pending`] marks the candidate version and
/// is detached once that version is promoted. [`StageLabel::Previous`] marks
/// the most recently demoted version.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StageLabel {
    /// The value currently in use by consumers.
    Current,
    /// The new candidate value awaiting promotion.
    Pending,
    /// The most recently retired value.
    Previous,
}

impl StageLabel {
    /// The label's wire name in the managed store.
    pub fn as_wire_str(&self) -> &'static str {
        match self {
            StageLabel::Current => "AWSCURRENT",
            StageLabel::Pending => "AWSPENDING",
            StageLabel::Previous => "AWSPREVIOUS",
        }
    }

    /// Parse a wire-format stage name. Unrecognized labels yield `None`;
    /// stores are free to attach labels this system does not interpret.
    pub fn from_wire_str(s: &str) -> Option<Self> {
        match s {
            "AWSCURRENT" => Some(StageLabel::Current),
            "AWSPENDING" => Some(StageLabel::Pending),
            "AWSPREVIOUS" => Some(StageLabel::Previous),
            _ => None,
        }
    }
}

impl fmt::Display for StageLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_wire_str())
    }
}

/// Metadata about a secret record: its rotation flag and the mapping from
/// version identifiers to the stage labels each version carries.
#[derive(Debug, Clone, Default)]
pub struct SecretDescription {
    /// Whether rotation is enabled for this secret.
    pub rotation_enabled: bool,
    /// Version identifier to attached stage labels.
    pub version_stages: HashMap<String, HashSet<StageLabel>>,
}

impl SecretDescription {
    /// Stage labels attached to the given version, or `None` if the version
    /// is unknown to the store.
    pub fn stages_of(&self, version_id: &str) -> Option<&HashSet<StageLabel>> {
        self.version_stages.get(version_id)
    }

    /// The version currently labeled [`StageLabel::Current`], if any.
    pub fn current_version(&self) -> Option<&str> {
        self.version_stages
            .iter()
            .find(|(_, stages)| stages.contains(&StageLabel::Current))
            .map(|(version, _)| version.as_str())
    }
}

/// Selects which version of a secret's value to fetch.
///
/// Either coordinate may be omitted; the backend resolves whatever remains
/// unambiguous (a bare stage selects the version holding that stage).
#[derive(Debug, Clone, Default)]
pub struct VersionSelector {
    /// Exact version identifier.
    pub version_id: Option<String>,
    /// Stage label the version must carry.
    pub version_stage: Option<StageLabel>,
}

impl VersionSelector {
    /// Select the version holding the given stage.
    pub fn stage(stage: StageLabel) -> Self {
        Self { version_id: None, version_stage: Some(stage) }
    }

    /// Select an exact version identifier.
    pub fn version(version_id: impl Into<String>) -> Self {
        Self { version_id: Some(version_id.into()), version_stage: None }
    }

    /// Additionally require the version to carry the given stage.
    pub fn with_stage(mut self, stage: StageLabel) -> Self {
        self.version_stage = Some(stage);
        self
    }
}

/// Capability interface to the managed secret store.
///
/// These five operations are the only way the rotation handler touches
/// durable state. Implementations own all persistence, version bookkeeping,
/// and entropy; the handler holds no state between invocations.
///
/// # Semantics
///
/// - `get_secret_value` models "no value stored there" as `Ok(None)` rather
///   than an error: during rotation the candidate version legitimately exists
///   (staged pending) before any value has been written under it.
/// - `update_version_stage` must move the label atomically. No observer may
///   see zero or two versions labeled current.
#[async_trait]
pub trait SecretsManagerApi: Send + Sync {
    /// Fetch the secret's rotation flag and version-to-stage mapping.
    async fn describe_secret(&self, secret_id: &str) -> Result<SecretDescription>;

    /// Fetch the value stored under the selected version, or `Ok(None)` if no
    /// value matches the selector.
    async fn get_secret_value(
        &self,
        secret_id: &str,
        selector: &VersionSelector,
    ) -> Result<Option<SecretValue>>;

    /// Write a new version of the secret's value under the given request
    /// token, attaching the given stage labels to it.
    async fn put_secret_value(
        &self,
        secret_id: &str,
        client_request_token: &str,
        value: &SecretValue,
        stages: &[StageLabel],
    ) -> Result<()>;

    /// Atomically move a stage label onto `move_to_version`, detaching it
    /// from `remove_from_version` when one is given.
    async fn update_version_stage(
        &self,
        secret_id: &str,
        stage: StageLabel,
        move_to_version: &str,
        remove_from_version: Option<&str>,
    ) -> Result<()>;

    /// Generate a random password from the store's secure entropy source,
    /// excluding the given characters.
    async fn generate_password(&self, exclude_characters: &[char]) -> Result<SecretString>;
}
