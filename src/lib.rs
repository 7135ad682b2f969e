//! # Keywheel
//!
//! Keywheel is a scheduler-driven credential rotation handler. A managed
//! scheduler invokes it with a `(secret, token, step)` request and it
//! advances a two-version (current/pending) credential through the
//! four-phase rotation protocol, delegating all durable storage and version
//! staging to a managed secret store.
//!
//! ## Architecture
//!
//! ```text
//! Scheduler trigger → Rotation Controller → Secret Store (versions/stages)
//!                            ↓
//!                     Rotation Target (the protected resource)
//! ```
//!
//! ## Core Components
//!
//! - **Rotation Controller**: validation gate plus four-phase dispatch
//!   ([`rotation::RotationHandler`])
//! - **Secret Store Interface**: narrow capability trait over the managed
//!   store ([`secrets::SecretsManagerApi`]), with AWS Secrets Manager
//!   (`aws` feature) and in-memory implementations
//! - **Rotation Target**: the seam to whatever the credential authenticates
//!   against ([`rotation::RotationTarget`])
//!
//! ## Example Usage
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use keywheel::rotation::{RotationEvent, RotationHandler};
//! use keywheel::secrets::InMemorySecretsManager;
//! use keywheel::{init_tracing, AppConfig};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = AppConfig::from_env()?;
//!     init_tracing(&config.observability)?;
//!
//!     let store = Arc::new(InMemorySecretsManager::new());
//!     let handler = RotationHandler::new(store).with_config(config.rotation);
//!
//!     let event: RotationEvent = serde_json::from_str(
//!         r#"{"SecretId":"arn:secret/db","ClientRequestToken":"t","Step":"createSecret"}"#,
//!     )?;
//!     handler.handle(&event).await?;
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod errors;
pub mod observability;
pub mod rotation;
pub mod secrets;

// Re-export commonly used types and traits
pub use config::AppConfig;
pub use errors::{Error, Result};
pub use observability::init_tracing;
pub use rotation::{RotationError, RotationEvent, RotationHandler, RotationStep};

/// Application version from Cargo.toml
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Application name from Cargo.toml
pub const APP_NAME: &str = env!("CARGO_PKG_NAME");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version_available() {
        assert!(!VERSION.is_empty());
        assert_eq!(APP_NAME, "keywheel");
    }
}
