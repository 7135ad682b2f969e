//! AWS Secrets Manager backend implementation.
//!
//! Production [`SecretsManagerApi`] implementation over the AWS SDK. Only
//! compiled with the `aws` feature. The handler's contract is unchanged: all
//! version bookkeeping, staging atomicity, and entropy live on the service
//! side; this module is a thin translation layer.
//!
//! # Configuration
//!
//! The client builds on the ambient AWS credential chain. Region and endpoint
//! may be overridden through [`AwsSettings`], which is how LocalStack-style
//! endpoints are wired in development:
//!
//! ```rust,ignore
//! use keywheel::config::AwsSettings;
//! use keywheel::secrets::AwsSecretsManager;
//!
//! let settings = AwsSettings {
//!     region: Some("us-east-1".into()),
//!     endpoint_url: Some("http://localhost:4566".into()),
//! };
//! let backend = AwsSecretsManager::from_settings(&settings).await;
//! ```

use async_trait::async_trait;
use aws_config::BehaviorVersion;
use aws_sdk_secretsmanager::error::DisplayErrorContext;
use aws_sdk_secretsmanager::Client;
use std::collections::{HashMap, HashSet};

use crate::config::AwsSettings;

use super::client::{SecretDescription, SecretsManagerApi, StageLabel, VersionSelector};
use super::error::{Result, SecretsError};
use super::types::{SecretString, SecretValue};

/// Default generated password length, matching the service default.
const DEFAULT_PASSWORD_LENGTH: usize = 32;

/// AWS Secrets Manager backed [`SecretsManagerApi`].
#[derive(Debug, Clone)]
pub struct AwsSecretsManager {
    client: Client,
    password_length: usize,
}

impl AwsSecretsManager {
    /// Wraps an already-constructed SDK client.
    pub fn new(client: Client) -> Self {
        Self { client, password_length: DEFAULT_PASSWORD_LENGTH }
    }

    /// Builds a client from the ambient AWS environment, applying region and
    /// endpoint overrides from settings.
    pub async fn from_settings(settings: &AwsSettings) -> Self {
        let mut loader = aws_config::defaults(BehaviorVersion::latest());
        if let Some(region) = &settings.region {
            loader = loader.region(aws_config::Region::new(region.clone()));
        }
        if let Some(endpoint_url) = &settings.endpoint_url {
            loader = loader.endpoint_url(endpoint_url.clone());
        }
        let config = loader.load().await;
        Self::new(Client::new(&config))
    }

    /// Overrides the generated password length (default 32).
    pub fn with_password_length(mut self, length: usize) -> Self {
        self.password_length = length;
        self
    }
}

/// Wraps an SDK failure in the backend error taxonomy, preserving the full
/// error chain in the message.
fn backend_error<E>(err: E) -> SecretsError
where
    E: std::error::Error,
{
    SecretsError::service(DisplayErrorContext(err).to_string())
}

#[async_trait]
impl SecretsManagerApi for AwsSecretsManager {
    async fn describe_secret(&self, secret_id: &str) -> Result<SecretDescription> {
        let response = self
            .client
            .describe_secret()
            .secret_id(secret_id)
            .send()
            .await
            .map_err(backend_error)?;

        let version_stages: HashMap<String, HashSet<StageLabel>> = response
            .version_ids_to_stages()
            .map(|mapping| {
                mapping
                    .iter()
                    .map(|(version, stages)| {
                        // Stores may attach labels this system does not
                        // interpret; the version itself must still be listed.
                        let known = stages
                            .iter()
                            .filter_map(|stage| StageLabel::from_wire_str(stage))
                            .collect();
                        (version.clone(), known)
                    })
                    .collect()
            })
            .unwrap_or_default();

        Ok(SecretDescription {
            rotation_enabled: response.rotation_enabled().unwrap_or(false),
            version_stages,
        })
    }

    async fn get_secret_value(
        &self,
        secret_id: &str,
        selector: &VersionSelector,
    ) -> Result<Option<SecretValue>> {
        let mut request = self.client.get_secret_value().secret_id(secret_id);
        if let Some(version_id) = &selector.version_id {
            request = request.version_id(version_id);
        }
        if let Some(stage) = selector.version_stage {
            request = request.version_stage(stage.as_wire_str());
        }

        match request.send().await {
            Ok(response) => Ok(response.secret_string().map(SecretValue::new)),
            Err(err) => {
                let service_err = err.into_service_error();
                if service_err.is_resource_not_found_exception() {
                    // Expected during rotation: the candidate version exists
                    // (staged pending) before any value is written under it.
                    Ok(None)
                } else {
                    Err(backend_error(service_err))
                }
            }
        }
    }

    async fn put_secret_value(
        &self,
        secret_id: &str,
        client_request_token: &str,
        value: &SecretValue,
        stages: &[StageLabel],
    ) -> Result<()> {
        self.client
            .put_secret_value()
            .secret_id(secret_id)
            .client_request_token(client_request_token)
            .secret_string(value.expose_secret())
            .set_version_stages(Some(
                stages.iter().map(|stage| stage.as_wire_str().to_string()).collect(),
            ))
            .send()
            .await
            .map_err(backend_error)?;
        Ok(())
    }

    async fn update_version_stage(
        &self,
        secret_id: &str,
        stage: StageLabel,
        move_to_version: &str,
        remove_from_version: Option<&str>,
    ) -> Result<()> {
        self.client
            .update_secret_version_stage()
            .secret_id(secret_id)
            .version_stage(stage.as_wire_str())
            .move_to_version_id(move_to_version)
            .set_remove_from_version_id(remove_from_version.map(str::to_string))
            .send()
            .await
            .map_err(backend_error)?;
        Ok(())
    }

    async fn generate_password(&self, exclude_characters: &[char]) -> Result<SecretString> {
        let exclude: String = exclude_characters.iter().collect();
        let response = self
            .client
            .get_random_password()
            .exclude_characters(exclude)
            .password_length(self.password_length as i64)
            .send()
            .await
            .map_err(backend_error)?;

        response
            .random_password()
            .map(SecretString::new)
            .ok_or_else(|| SecretsError::service("store returned no random password"))
    }
}
