// SPDX-FileCopyrightText: 2026 Frontdesk Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Error types for the Frontdesk support-chat core.

use thiserror::Error;

/// The primary error type used across the Frontdesk workspace.
///
/// The first five variants are the caller-facing taxonomy: they describe
/// why an operation was rejected and are safe to surface to a UI. The
/// remaining variants are infrastructure faults.
#[derive(Debug, Error)]
pub enum FrontdeskError {
    /// Bad input shape or range. The caller must fix the input before retrying.
    #[error("validation error: {0}")]
    Validation(String),

    /// A referenced conversation or entity does not exist.
    #[error("{kind} {id} not found")]
    NotFound { kind: &'static str, id: String },

    /// The operation is not legal in the conversation's current lifecycle state.
    #[error("invalid state: {0}")]
    InvalidState(String),

    /// The actor lacks standing for this conversation (e.g. wrong agent).
    #[error("forbidden: {0}")]
    Forbidden(String),

    /// Lost a race: claim already taken, rating already submitted.
    #[error("conflict: {0}")]
    Conflict(String),

    /// Configuration errors (invalid TOML, missing required fields).
    #[error("configuration error: {0}")]
    Config(String),

    /// Storage backend errors (database connection, query failure).
    #[error("storage error: {source}")]
    Storage {
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// Assistant provider errors (API failure, malformed response).
    #[error("assistant error: {message}")]
    Provider {
        message: String,
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Operation timed out.
    #[error("operation timed out after {duration:?}")]
    Timeout { duration: std::time::Duration },

    /// Internal or unexpected errors.
    #[error("internal error: {0}")]
    Internal(String),
}

impl FrontdeskError {
    /// Constructs the `NotFound` variant for a conversation id.
    pub fn conversation_not_found(id: i64) -> Self {
        FrontdeskError::NotFound {
            kind: "conversation",
            id: id.to_string(),
        }
    }
}
