//! The rotation controller: validation gate and four-phase dispatch.

use serde_json::Value;
use std::sync::Arc;
use tracing::Instrument;
use uuid::Uuid;

use crate::config::RotationConfig;
use crate::secrets::{
    SecretValue, SecretsError, SecretsManagerApi, StageLabel, VersionSelector,
};

use super::error::{Result, RotationError};
use super::event::{RotationEvent, RotationStep};
use super::target::{NoopTarget, RotationTarget};

/// The field of a credential record that rotation replaces. Every other field
/// carries over from the current value unchanged.
const PASSWORD_FIELD: &str = "password";

/// Advances a two-version credential through the four-phase rotation
/// protocol.
///
/// The handler holds no state of its own: which version is current and which
/// is pending lives in the secret store and is re-read on every invocation.
/// Each phase is idempotent, so the scheduler may re-deliver the same
/// `(secret, token, step)` request after a timeout or partial failure and the
/// handler converges to the same end state without duplicating side effects.
///
/// # Example
///
/// ```rust,no_run
/// use std::sync::Arc;
/// use keywheel::rotation::{RotationEvent, RotationHandler};
/// use keywheel::secrets::InMemorySecretsManager;
///
/// # async fn run() -> keywheel::rotation::Result<()> {
/// let store = Arc::new(InMemorySecretsManager::new());
/// let handler = RotationHandler::new(store);
///
/// let event = RotationEvent::new("arn:secret/db", "token", "createSecret");
/// handler.handle(&event).await?;
/// # Ok(())
/// # }
/// ```
pub struct RotationHandler {
    service: Arc<dyn SecretsManagerApi>,
    target: Arc<dyn RotationTarget>,
    config: RotationConfig,
}

impl RotationHandler {
    /// Creates a handler over the given store, with no rotation target and
    /// default configuration.
    pub fn new(service: Arc<dyn SecretsManagerApi>) -> Self {
        Self { service, target: Arc::new(NoopTarget), config: RotationConfig::default() }
    }

    /// Attaches a rotation target for the set and test phases.
    pub fn with_target(mut self, target: Arc<dyn RotationTarget>) -> Self {
        self.target = target;
        self
    }

    /// Overrides the rotation configuration.
    pub fn with_config(mut self, config: RotationConfig) -> Self {
        self.config = config;
        self
    }

    /// Handles one rotation request.
    ///
    /// Validates the request against the store's version/stage metadata, then
    /// dispatches to exactly one protocol phase. See [`RotationError`] for
    /// the failure taxonomy; backend failures pass through without retry.
    pub async fn handle(&self, event: &RotationEvent) -> Result<()> {
        let span = tracing::info_span!(
            "rotation_step",
            secret_id = %event.secret_id,
            token = %event.client_request_token,
            step = %event.step,
            invocation_id = %Uuid::new_v4(),
        );
        self.validate_and_dispatch(event).instrument(span).await
    }

    /// The validation gate. Guarantees every phase only ever runs against a
    /// version that is legitimately mid-rotation, never against an
    /// already-promoted or unrelated version.
    async fn validate_and_dispatch(&self, event: &RotationEvent) -> Result<()> {
        let description = self.service.describe_secret(&event.secret_id).await?;

        if !description.rotation_enabled {
            return Err(RotationError::rotation_not_enabled(event.secret_id.as_str()));
        }

        let stages = description.stages_of(&event.client_request_token).ok_or_else(|| {
            RotationError::unknown_version(
                event.secret_id.as_str(),
                event.client_request_token.as_str(),
            )
        })?;

        if stages.contains(&StageLabel::Current) {
            // Rotation already completed for this token.
            tracing::info!("Requested version is already current, nothing to do");
            return Ok(());
        }

        if !stages.contains(&StageLabel::Pending) {
            return Err(RotationError::invalid_stage(
                event.secret_id.as_str(),
                event.client_request_token.as_str(),
            ));
        }

        match event.step()? {
            RotationStep::CreateSecret => self.create_secret(event).await,
            RotationStep::SetSecret => self.set_secret(event).await,
            RotationStep::TestSecret => self.test_secret(event).await,
            RotationStep::FinishSecret => self.finish_secret(event).await,
        }
    }

    /// Ensure a pending candidate value exists under the request token,
    /// generating one if absent. Never touches the protected resource.
    async fn create_secret(&self, event: &RotationEvent) -> Result<()> {
        // A rotating secret must have a readable current value before
        // anything is staged against it.
        let current = self
            .service
            .get_secret_value(&event.secret_id, &VersionSelector::stage(StageLabel::Current))
            .await?
            .ok_or_else(|| SecretsError::not_found(event.secret_id.as_str()))?;

        let pending_selector = VersionSelector::version(event.client_request_token.as_str())
            .with_stage(StageLabel::Pending);
        if self.service.get_secret_value(&event.secret_id, &pending_selector).await?.is_some() {
            // A retried or concurrent invocation already staged a candidate;
            // overwriting it would tear the rotation in half.
            tracing::debug!("Pending candidate already staged, leaving it untouched");
            return Ok(());
        }

        let password =
            self.service.generate_password(&self.config.exclude_characters()).await?;

        let mut fields = parse_fields(&event.secret_id, &current)?;
        fields.insert(
            PASSWORD_FIELD.to_string(),
            Value::String(password.expose_secret().to_string()),
        );
        let payload =
            serde_json::to_string(&Value::Object(fields)).map_err(SecretsError::from)?;

        self.service
            .put_secret_value(
                &event.secret_id,
                &event.client_request_token,
                &SecretValue::new(payload),
                &[StageLabel::Pending],
            )
            .await?;

        tracing::info!("Staged new pending candidate");
        Ok(())
    }

    /// Propagate the pending candidate to the protected resource.
    async fn set_secret(&self, event: &RotationEvent) -> Result<()> {
        self.target
            .set_secret(self.service.as_ref(), &event.secret_id, &event.client_request_token)
            .await
    }

    /// Verify the pending candidate against the protected resource.
    async fn test_secret(&self, event: &RotationEvent) -> Result<()> {
        self.target
            .test_secret(self.service.as_ref(), &event.secret_id, &event.client_request_token)
            .await
    }

    /// Promote the pending version to current.
    async fn finish_secret(&self, event: &RotationEvent) -> Result<()> {
        let description = self.service.describe_secret(&event.secret_id).await?;
        let current_version = description.current_version().map(str::to_string);

        if current_version.as_deref() == Some(event.client_request_token.as_str()) {
            tracing::info!("Version already marked current, rotation finished");
            return Ok(());
        }

        // The store moves the label atomically: at no point are zero or two
        // versions current.
        self.service
            .update_version_stage(
                &event.secret_id,
                StageLabel::Current,
                &event.client_request_token,
                current_version.as_deref(),
            )
            .await?;

        tracing::info!(demoted = ?current_version, "Promoted pending version to current");
        Ok(())
    }
}

/// Parses a stored credential payload into its structured fields.
fn parse_fields(
    secret_id: &str,
    value: &SecretValue,
) -> Result<serde_json::Map<String, Value>> {
    let parsed: Value = serde_json::from_str(value.expose_secret())
        .map_err(|e| SecretsError::malformed_value(secret_id, e.to_string()))?;
    match parsed {
        Value::Object(fields) => Ok(fields),
        _ => Err(SecretsError::malformed_value(secret_id, "secret value is not a JSON object")
            .into()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::secrets::InMemorySecretsManager;

    const ARN: &str = "arn:aws:secretsmanager:us-east-1:123456789012:secret:db-AbCdEf";

    fn seeded_store() -> Arc<InMemorySecretsManager> {
        let store = Arc::new(InMemorySecretsManager::new());
        store
            .insert_secret_version(
                ARN,
                "v1",
                Some(SecretValue::new(r#"{"username":"app","password":"old-password"}"#)),
                &[StageLabel::Current],
            )
            .unwrap();
        store
    }

    #[tokio::test]
    async fn test_create_secret_requires_readable_current_value() {
        let store = Arc::new(InMemorySecretsManager::new());
        store.insert_secret_version(ARN, "v2", None, &[StageLabel::Pending]).unwrap();
        let handler = RotationHandler::new(Arc::clone(&store) as Arc<dyn SecretsManagerApi>);

        let event = RotationEvent::new(ARN, "v2", "createSecret");
        let result = handler.create_secret(&event).await;
        assert!(matches!(
            result,
            Err(RotationError::Secrets(SecretsError::NotFound { .. }))
        ));
        assert_eq!(store.mutation_calls(), 0);
    }

    #[tokio::test]
    async fn test_create_secret_rejects_unstructured_current_value() {
        let store = Arc::new(InMemorySecretsManager::new());
        store
            .insert_secret_version(
                ARN,
                "v1",
                Some(SecretValue::new("just-a-password")),
                &[StageLabel::Current],
            )
            .unwrap();
        store.begin_rotation(ARN, "v2").unwrap();
        let handler = RotationHandler::new(Arc::clone(&store) as Arc<dyn SecretsManagerApi>);

        let event = RotationEvent::new(ARN, "v2", "createSecret");
        let result = handler.create_secret(&event).await;
        assert!(matches!(
            result,
            Err(RotationError::Secrets(SecretsError::MalformedValue { .. }))
        ));
        assert_eq!(store.put_secret_value_calls(), 0);
    }

    #[tokio::test]
    async fn test_finish_secret_internal_short_circuit() {
        // The gate normally catches an already-current token; this covers the
        // race where promotion lands between the gate's read and the phase's
        // re-read.
        let store = seeded_store();
        let handler = RotationHandler::new(Arc::clone(&store) as Arc<dyn SecretsManagerApi>);

        let event = RotationEvent::new(ARN, "v1", "finishSecret");
        handler.finish_secret(&event).await.unwrap();
        assert_eq!(store.update_version_stage_calls(), 0);
    }

    #[tokio::test]
    async fn test_finish_secret_promotes_without_prior_current() {
        // A secret with no current version at all still promotes cleanly.
        let store = Arc::new(InMemorySecretsManager::new());
        store
            .insert_secret_version(
                ARN,
                "v2",
                Some(SecretValue::new(r#"{"password":"new"}"#)),
                &[StageLabel::Pending],
            )
            .unwrap();
        let handler = RotationHandler::new(Arc::clone(&store) as Arc<dyn SecretsManagerApi>);

        let event = RotationEvent::new(ARN, "v2", "finishSecret");
        handler.finish_secret(&event).await.unwrap();

        let description = store.describe_secret(ARN).await.unwrap();
        assert_eq!(description.current_version(), Some("v2"));
    }

    #[test]
    fn test_parse_fields_extracts_object() {
        let value = SecretValue::new(r#"{"username":"app","password":"x"}"#);
        let fields = parse_fields(ARN, &value).unwrap();
        assert_eq!(fields.get("username").and_then(Value::as_str), Some("app"));
    }

    #[test]
    fn test_parse_fields_rejects_non_object() {
        let value = SecretValue::new(r#"["not","an","object"]"#);
        assert!(parse_fields(ARN, &value).is_err());
    }
}
