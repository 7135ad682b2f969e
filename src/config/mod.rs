//! # Configuration Management
//!
//! Environment-driven configuration for the rotation handler. See
//! [`settings::AppConfig::from_env`] for the variables read.

pub mod settings;

pub use settings::{
    AppConfig, AwsSettings, ObservabilityConfig, RotationConfig, MANDATORY_EXCLUDE_CHARACTERS,
};
