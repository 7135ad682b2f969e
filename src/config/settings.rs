//! # Configuration Settings
//!
//! Defines the configuration structure for the rotation handler. Settings are
//! loaded from `KEYWHEEL_*` environment variables (with `.env` support in
//! development) and validated on load.

use crate::errors::{Error, Result};
use serde::{Deserialize, Serialize};
use validator::Validate;

/// Characters that must never appear in a generated password, regardless of
/// configuration: they break naive escaping in downstream consumers
/// (connection strings, shell snippets, JSON-in-JSON).
pub const MANDATORY_EXCLUDE_CHARACTERS: &[char] = &['/', '@', '"', '\'', '\\'];

/// Main application configuration
#[derive(Debug, Clone, Serialize, Deserialize, Validate, Default)]
pub struct AppConfig {
    /// Rotation behavior configuration
    #[validate(nested)]
    pub rotation: RotationConfig,

    /// Observability configuration
    #[validate(nested)]
    pub observability: ObservabilityConfig,

    /// AWS backend configuration (used by the `aws` feature)
    pub aws: AwsSettings,
}

impl AppConfig {
    /// Create configuration from environment variables, applying defaults for
    /// anything unset and validating the result.
    pub fn from_env() -> Result<Self> {
        // Load a .env file when present; ignored outside development.
        dotenvy::dotenv().ok();

        let password_length = match std::env::var("KEYWHEEL_PASSWORD_LENGTH") {
            Ok(raw) => raw
                .parse()
                .map_err(|e| Error::config(format!("Invalid password length: {}", e)))?,
            Err(_) => RotationConfig::default().password_length,
        };

        let additional_exclude_characters =
            std::env::var("KEYWHEEL_EXCLUDE_CHARACTERS").unwrap_or_default();

        let json_logs = match std::env::var("KEYWHEEL_LOG_JSON") {
            Ok(raw) => raw
                .parse()
                .map_err(|e| Error::config(format!("Invalid KEYWHEEL_LOG_JSON: {}", e)))?,
            Err(_) => false,
        };

        let config = Self {
            rotation: RotationConfig { password_length, additional_exclude_characters },
            observability: ObservabilityConfig {
                service_name: std::env::var("KEYWHEEL_SERVICE_NAME")
                    .unwrap_or_else(|_| "keywheel".to_string()),
                log_level: std::env::var("KEYWHEEL_LOG_LEVEL")
                    .unwrap_or_else(|_| "info".to_string()),
                json_logs,
            },
            aws: AwsSettings {
                region: std::env::var("KEYWHEEL_AWS_REGION").ok(),
                endpoint_url: std::env::var("KEYWHEEL_AWS_ENDPOINT_URL").ok(),
            },
        };

        Validate::validate(&config).map_err(|e| Error::config(e.to_string()))?;
        Ok(config)
    }
}

/// Rotation behavior configuration
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct RotationConfig {
    /// Generated password length
    #[validate(range(
        min = 16,
        max = 128,
        message = "Password length must be between 16 and 128"
    ))]
    pub password_length: usize,

    /// Extra characters excluded from generated passwords, on top of the
    /// mandatory set
    pub additional_exclude_characters: String,
}

impl Default for RotationConfig {
    fn default() -> Self {
        Self { password_length: 32, additional_exclude_characters: String::new() }
    }
}

impl RotationConfig {
    /// The full exclusion set handed to the backend's password generator:
    /// the mandatory characters plus any configured extras, deduplicated.
    pub fn exclude_characters(&self) -> Vec<char> {
        let mut characters: Vec<char> = MANDATORY_EXCLUDE_CHARACTERS.to_vec();
        for c in self.additional_exclude_characters.chars() {
            if !characters.contains(&c) {
                characters.push(c);
            }
        }
        characters
    }
}

/// Observability configuration
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct ObservabilityConfig {
    /// Service name attached to log output
    #[validate(length(min = 1, message = "Service name cannot be empty"))]
    pub service_name: String,

    /// Log level filter (e.g. "info", "keywheel=debug")
    #[validate(length(min = 1, message = "Log level cannot be empty"))]
    pub log_level: String,

    /// Emit JSON-formatted logs instead of human-readable output
    pub json_logs: bool,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self { service_name: "keywheel".to_string(), log_level: "info".to_string(), json_logs: false }
    }
}

/// AWS backend settings. Plain data so configuration loads without the `aws`
/// feature; only the AWS client constructor consumes it.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct AwsSettings {
    /// AWS region override (ambient credential chain decides when unset)
    pub region: Option<String>,

    /// Custom endpoint URL, for LocalStack-style local stacks
    pub endpoint_url: Option<String>,
}
