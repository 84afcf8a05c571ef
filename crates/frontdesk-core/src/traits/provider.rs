// SPDX-FileCopyrightText: 2026 Frontdesk Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! External language-model collaborator contract.

use async_trait::async_trait;

use crate::error::FrontdeskError;
use crate::types::MessageOrigin;

/// One turn of conversation history handed to the assistant.
#[derive(Debug, Clone, PartialEq)]
pub struct AssistantTurn {
    pub origin: MessageOrigin,
    pub text: String,
}

/// A completion request: curated knowledge as system context plus the most
/// recent window of the conversation.
#[derive(Debug, Clone, PartialEq)]
pub struct AssistantRequest {
    pub system_context: String,
    pub turns: Vec<AssistantTurn>,
}

/// Adapter for the external language model used for automated replies.
///
/// Treated as unreliable by contract: the engine bounds every call with a
/// timeout and falls through to the FAQ lookup (then a fixed default reply)
/// on any error. Implementations should not retry indefinitely.
#[async_trait]
pub trait AssistantProvider: Send + Sync {
    /// Produces a free-text reply for the given request.
    async fn complete(&self, request: AssistantRequest) -> Result<String, FrontdeskError>;
}
