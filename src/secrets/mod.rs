//! Secret-management backend abstraction.
//!
//! The rotation handler delegates all durable storage, version staging, and
//! entropy to a managed secret store reached through the [`SecretsManagerApi`]
//! trait. This module defines that capability interface, the staging types it
//! speaks in, and two implementations:
//!
//! - [`AwsSecretsManager`]: the production AWS Secrets Manager backend
//!   (behind the `aws` feature)
//! - [`InMemorySecretsManager`]: an in-process backend for development and
//!   tests, with mutation counters for asserting idempotency properties
//!
//! # Security Considerations
//!
//! - Secret payloads cross module boundaries inside [`SecretString`] /
//!   [`SecretValue`] and are never logged or serialized in the clear
//! - Implementations must move stage labels atomically: no observer may see
//!   zero or two versions labeled current

#[cfg(feature = "aws")]
pub mod aws;
pub mod client;
pub mod error;
pub mod memory;
pub mod types;

// Re-export main types
#[cfg(feature = "aws")]
pub use aws::AwsSecretsManager;
pub use client::{SecretDescription, SecretsManagerApi, StageLabel, VersionSelector};
pub use error::{Result, SecretsError};
pub use memory::InMemorySecretsManager;
pub use types::{SecretString, SecretValue};
