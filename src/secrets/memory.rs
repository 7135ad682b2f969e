//! In-memory secret-management backend for development and tests.
//!
//! Models the version/stage bookkeeping a managed store performs during
//! rotation: versions may exist with stage labels attached before any value
//! is written under them (the staged-pending candidate), stage moves are
//! atomic under one lock, and label lifecycle rules (`Previous` following a
//! demotion, `Pending` detaching on promotion) belong to the store, not the
//! caller.
//!
//! The backend also counts mutating calls so tests can assert the handler's
//! idempotency properties ("no write happened", "exactly one write happened").

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rand::Rng;
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use super::client::{SecretDescription, SecretsManagerApi, StageLabel, VersionSelector};
use super::error::{Result, SecretsError};
use super::types::{SecretString, SecretValue};

/// Default generated password length, matching the managed store's default.
const DEFAULT_PASSWORD_LENGTH: usize = 32;

/// Characters eligible for generated passwords before exclusions: printable
/// ASCII minus space.
const PASSWORD_ALPHABET: &str = "ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789\
                                 !\"#$%&'()*+,-./:;<=>?@[\\]^_`{|}~";

#[derive(Debug, Clone, Default)]
struct VersionEntry {
    value: Option<SecretValue>,
    stages: HashSet<StageLabel>,
    created_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Default)]
struct SecretRecord {
    rotation_enabled: bool,
    versions: HashMap<String, VersionEntry>,
}

/// In-memory [`SecretsManagerApi`] implementation.
///
/// Not a persistence layer: state lives in process memory and is lost on
/// drop. Use the AWS backend for anything durable.
#[derive(Debug, Default)]
pub struct InMemorySecretsManager {
    secrets: Mutex<HashMap<String, SecretRecord>>,
    put_calls: AtomicUsize,
    stage_update_calls: AtomicUsize,
    password_length: Option<usize>,
}

impl InMemorySecretsManager {
    /// Creates an empty in-memory backend.
    pub fn new() -> Self {
        Self::default()
    }

    /// Overrides the generated password length (default 32).
    pub fn with_password_length(mut self, length: usize) -> Self {
        self.password_length = Some(length);
        self
    }

    /// Seeds a secret with one version carrying the given stages. Rotation is
    /// enabled by default; flip it with [`Self::set_rotation_enabled`].
    pub fn insert_secret_version(
        &self,
        secret_id: impl Into<String>,
        version_id: impl Into<String>,
        value: Option<SecretValue>,
        stages: &[StageLabel],
    ) -> Result<()> {
        let mut secrets = self.lock()?;
        let record = secrets.entry(secret_id.into()).or_insert_with(|| SecretRecord {
            rotation_enabled: true,
            versions: HashMap::new(),
        });
        record.versions.insert(
            version_id.into(),
            VersionEntry {
                value,
                stages: stages.iter().copied().collect(),
                created_at: Some(Utc::now()),
            },
        );
        Ok(())
    }

    /// Attaches a fresh, valueless version staged pending — what the managed
    /// store does when it kicks off a rotation and mints a request token.
    pub fn begin_rotation(
        &self,
        secret_id: impl Into<String>,
        version_id: impl Into<String>,
    ) -> Result<()> {
        self.insert_secret_version(secret_id, version_id, None, &[StageLabel::Pending])
    }

    /// Enables or disables rotation for a seeded secret.
    pub fn set_rotation_enabled(&self, secret_id: &str, enabled: bool) -> Result<()> {
        let mut secrets = self.lock()?;
        let record = secrets
            .get_mut(secret_id)
            .ok_or_else(|| SecretsError::not_found(secret_id))?;
        record.rotation_enabled = enabled;
        Ok(())
    }

    /// The value stored under an exact version, if any. Test accessor.
    pub fn version_value(&self, secret_id: &str, version_id: &str) -> Result<Option<SecretValue>> {
        let secrets = self.lock()?;
        Ok(secrets
            .get(secret_id)
            .and_then(|record| record.versions.get(version_id))
            .and_then(|entry| entry.value.clone()))
    }

    /// When a version was written to this store, if known. Test accessor.
    pub fn version_created_at(
        &self,
        secret_id: &str,
        version_id: &str,
    ) -> Result<Option<DateTime<Utc>>> {
        let secrets = self.lock()?;
        Ok(secrets
            .get(secret_id)
            .and_then(|record| record.versions.get(version_id))
            .and_then(|entry| entry.created_at))
    }

    /// Number of `put_secret_value` calls observed.
    pub fn put_secret_value_calls(&self) -> usize {
        self.put_calls.load(Ordering::SeqCst)
    }

    /// Number of `update_version_stage` calls observed.
    pub fn update_version_stage_calls(&self) -> usize {
        self.stage_update_calls.load(Ordering::SeqCst)
    }

    /// Total mutating calls observed.
    pub fn mutation_calls(&self) -> usize {
        self.put_secret_value_calls() + self.update_version_stage_calls()
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, HashMap<String, SecretRecord>>> {
        self.secrets
            .lock()
            .map_err(|_| SecretsError::service("in-memory store lock poisoned"))
    }
}

#[async_trait]
impl SecretsManagerApi for InMemorySecretsManager {
    async fn describe_secret(&self, secret_id: &str) -> Result<SecretDescription> {
        let secrets = self.lock()?;
        let record = secrets
            .get(secret_id)
            .ok_or_else(|| SecretsError::not_found(secret_id))?;
        Ok(SecretDescription {
            rotation_enabled: record.rotation_enabled,
            version_stages: record
                .versions
                .iter()
                .map(|(version, entry)| (version.clone(), entry.stages.clone()))
                .collect(),
        })
    }

    async fn get_secret_value(
        &self,
        secret_id: &str,
        selector: &VersionSelector,
    ) -> Result<Option<SecretValue>> {
        let secrets = self.lock()?;
        let record = secrets
            .get(secret_id)
            .ok_or_else(|| SecretsError::not_found(secret_id))?;

        let entry = match (&selector.version_id, selector.version_stage) {
            (Some(version_id), stage) => record.versions.get(version_id).filter(|entry| {
                stage.map_or(true, |stage| entry.stages.contains(&stage))
            }),
            (None, stage) => {
                // A bare stage selects the version holding that stage; with no
                // coordinates at all the store resolves to the current value.
                let stage = stage.unwrap_or(StageLabel::Current);
                record.versions.values().find(|entry| entry.stages.contains(&stage))
            }
        };

        Ok(entry.and_then(|entry| entry.value.clone()))
    }

    async fn put_secret_value(
        &self,
        secret_id: &str,
        client_request_token: &str,
        value: &SecretValue,
        stages: &[StageLabel],
    ) -> Result<()> {
        self.put_calls.fetch_add(1, Ordering::SeqCst);

        let mut secrets = self.lock()?;
        let record = secrets
            .get_mut(secret_id)
            .ok_or_else(|| SecretsError::not_found(secret_id))?;
        let entry = record.versions.entry(client_request_token.to_string()).or_default();
        entry.value = Some(value.clone());
        entry.stages.extend(stages.iter().copied());
        entry.created_at.get_or_insert_with(Utc::now);
        Ok(())
    }

    async fn update_version_stage(
        &self,
        secret_id: &str,
        stage: StageLabel,
        move_to_version: &str,
        remove_from_version: Option<&str>,
    ) -> Result<()> {
        self.stage_update_calls.fetch_add(1, Ordering::SeqCst);

        // One lock spans the whole move: no observer sees the label on zero
        // or two versions.
        let mut secrets = self.lock()?;
        let record = secrets
            .get_mut(secret_id)
            .ok_or_else(|| SecretsError::not_found(secret_id))?;

        if !record.versions.contains_key(move_to_version) {
            return Err(SecretsError::service(format!(
                "cannot move stage {stage} to unknown version {move_to_version}"
            )));
        }

        if let Some(previous) = remove_from_version {
            if let Some(entry) = record.versions.get_mut(previous) {
                entry.stages.remove(&stage);
            }
            if stage == StageLabel::Current && record.versions.contains_key(previous) {
                // The store tracks the demoted version itself.
                for other in record.versions.values_mut() {
                    other.stages.remove(&StageLabel::Previous);
                }
                if let Some(entry) = record.versions.get_mut(previous) {
                    entry.stages.insert(StageLabel::Previous);
                }
            }
        }

        if let Some(entry) = record.versions.get_mut(move_to_version) {
            entry.stages.insert(stage);
            if stage == StageLabel::Current {
                // Promotion ends the in-flight rotation for this version.
                entry.stages.remove(&StageLabel::Pending);
            }
        }

        Ok(())
    }

    async fn generate_password(&self, exclude_characters: &[char]) -> Result<SecretString> {
        let alphabet: Vec<char> = PASSWORD_ALPHABET
            .chars()
            .filter(|c| !exclude_characters.contains(c))
            .collect();
        if alphabet.is_empty() {
            return Err(SecretsError::service(
                "password exclusions leave no characters to draw from",
            ));
        }

        let length = self.password_length.unwrap_or(DEFAULT_PASSWORD_LENGTH);
        let mut rng = rand::thread_rng();
        let password: String =
            (0..length).map(|_| alphabet[rng.gen_range(0..alphabet.len())]).collect();
        Ok(SecretString::new(password))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn current_versions(description: &SecretDescription) -> Vec<&str> {
        description
            .version_stages
            .iter()
            .filter(|(_, stages)| stages.contains(&StageLabel::Current))
            .map(|(version, _)| version.as_str())
            .collect()
    }

    #[tokio::test]
    async fn test_describe_unknown_secret() {
        let store = InMemorySecretsManager::new();
        let result = store.describe_secret("missing").await;
        assert!(matches!(result, Err(SecretsError::NotFound { .. })));
    }

    #[tokio::test]
    async fn test_pending_version_without_value_is_listed_but_not_readable() {
        let store = InMemorySecretsManager::new();
        store
            .insert_secret_version(
                "arn:secret/db",
                "v1",
                Some(SecretValue::new(r#"{"password":"old"}"#)),
                &[StageLabel::Current],
            )
            .unwrap();
        store.begin_rotation("arn:secret/db", "v2").unwrap();

        let description = store.describe_secret("arn:secret/db").await.unwrap();
        assert!(description.stages_of("v2").unwrap().contains(&StageLabel::Pending));

        let pending = store
            .get_secret_value(
                "arn:secret/db",
                &VersionSelector::version("v2").with_stage(StageLabel::Pending),
            )
            .await
            .unwrap();
        assert!(pending.is_none());
    }

    #[tokio::test]
    async fn test_get_defaults_to_current_stage() {
        let store = InMemorySecretsManager::new();
        store
            .insert_secret_version(
                "arn:secret/db",
                "v1",
                Some(SecretValue::new("current-value")),
                &[StageLabel::Current],
            )
            .unwrap();

        let value = store
            .get_secret_value("arn:secret/db", &VersionSelector::default())
            .await
            .unwrap()
            .unwrap();
        assert_eq!(value.expose_secret(), "current-value");
    }

    #[tokio::test]
    async fn test_stage_move_is_atomic_and_demotes_previous() {
        let store = InMemorySecretsManager::new();
        store
            .insert_secret_version(
                "arn:secret/db",
                "v1",
                Some(SecretValue::new("old")),
                &[StageLabel::Current],
            )
            .unwrap();
        store
            .insert_secret_version(
                "arn:secret/db",
                "v2",
                Some(SecretValue::new("new")),
                &[StageLabel::Pending],
            )
            .unwrap();

        store
            .update_version_stage("arn:secret/db", StageLabel::Current, "v2", Some("v1"))
            .await
            .unwrap();

        let description = store.describe_secret("arn:secret/db").await.unwrap();
        assert_eq!(current_versions(&description), vec!["v2"]);
        assert!(description.stages_of("v1").unwrap().contains(&StageLabel::Previous));
        assert!(!description.stages_of("v2").unwrap().contains(&StageLabel::Pending));
    }

    #[tokio::test]
    async fn test_stage_move_to_unknown_version_fails() {
        let store = InMemorySecretsManager::new();
        store
            .insert_secret_version(
                "arn:secret/db",
                "v1",
                Some(SecretValue::new("old")),
                &[StageLabel::Current],
            )
            .unwrap();

        let result = store
            .update_version_stage("arn:secret/db", StageLabel::Current, "v9", Some("v1"))
            .await;
        assert!(matches!(result, Err(SecretsError::Service { .. })));

        // The failed move left the label where it was.
        let description = store.describe_secret("arn:secret/db").await.unwrap();
        assert_eq!(current_versions(&description), vec!["v1"]);
    }

    #[tokio::test]
    async fn test_mutation_counters() {
        let store = InMemorySecretsManager::new();
        store
            .insert_secret_version(
                "arn:secret/db",
                "v1",
                Some(SecretValue::new("old")),
                &[StageLabel::Current],
            )
            .unwrap();

        assert_eq!(store.mutation_calls(), 0);

        store
            .put_secret_value(
                "arn:secret/db",
                "v2",
                &SecretValue::new("new"),
                &[StageLabel::Pending],
            )
            .await
            .unwrap();
        store
            .update_version_stage("arn:secret/db", StageLabel::Current, "v2", Some("v1"))
            .await
            .unwrap();

        assert_eq!(store.put_secret_value_calls(), 1);
        assert_eq!(store.update_version_stage_calls(), 1);
        assert_eq!(store.mutation_calls(), 2);
        assert!(store.version_created_at("arn:secret/db", "v2").unwrap().is_some());
    }

    #[tokio::test]
    async fn test_generated_password_respects_exclusions() {
        let store = InMemorySecretsManager::new().with_password_length(64);
        let excluded = ['/', '@', '"', '\'', '\\'];

        for _ in 0..32 {
            let password = store.generate_password(&excluded).await.unwrap();
            assert_eq!(password.len(), 64);
            assert!(
                password.expose_secret().chars().all(|c| !excluded.contains(&c)),
                "generated password contained an excluded character"
            );
        }
    }

    #[tokio::test]
    async fn test_generate_password_with_empty_alphabet_fails() {
        let store = InMemorySecretsManager::new();
        let everything: Vec<char> = PASSWORD_ALPHABET.chars().collect();
        let result = store.generate_password(&everything).await;
        assert!(matches!(result, Err(SecretsError::Service { .. })));
    }
}
