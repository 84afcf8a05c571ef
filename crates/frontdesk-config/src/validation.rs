// SPDX-FileCopyrightText: 2026 Frontdesk Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Post-deserialization validation for configuration values.
//!
//! Validates semantic constraints that cannot be expressed via serde
//! attributes. Collects all errors instead of failing fast.

use thiserror::Error;

use crate::model::FrontdeskConfig;

/// A configuration error surfaced to the operator.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("config parse error: {message}")]
    Parse { message: String },

    #[error("config validation error: {message}")]
    Validation { message: String },
}

/// Validate a deserialized configuration for semantic correctness.
pub fn validate_config(config: &FrontdeskConfig) -> Result<(), Vec<ConfigError>> {
    let mut errors = Vec::new();

    if config.storage.database_path.trim().is_empty() {
        errors.push(ConfigError::Validation {
            message: "storage.database_path must not be empty".to_string(),
        });
    }

    if config.service.greeting.trim().is_empty() {
        errors.push(ConfigError::Validation {
            message: "service.greeting must not be empty".to_string(),
        });
    }

    if config.service.default_reply.trim().is_empty() {
        errors.push(ConfigError::Validation {
            message: "service.default_reply must not be empty".to_string(),
        });
    }

    if config.service.history_window == 0 {
        errors.push(ConfigError::Validation {
            message: "service.history_window must be at least 1".to_string(),
        });
    }

    if config.assistant.enabled && config.assistant.timeout_secs == 0 {
        errors.push(ConfigError::Validation {
            message: "assistant.timeout_secs must be positive when the assistant is enabled"
                .to_string(),
        });
    }

    if config.assistant.enabled && config.assistant.base_url.trim().is_empty() {
        errors.push(ConfigError::Validation {
            message: "assistant.base_url must not be empty when the assistant is enabled"
                .to_string(),
        });
    }

    if let Some(secret) = &config.token.secret {
        if secret.len() < 16 {
            errors.push(ConfigError::Validation {
                message: "token.secret must be at least 16 bytes".to_string(),
            });
        }
        if config.token.ttl_secs == 0 {
            errors.push(ConfigError::Validation {
                message: "token.ttl_secs must be positive".to_string(),
            });
        }
    }

    if errors.is_empty() { Ok(()) } else { Err(errors) }
}
