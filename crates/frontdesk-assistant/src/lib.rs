// SPDX-FileCopyrightText: 2026 Frontdesk Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! External language-model adapter for automated replies.
//!
//! Wraps the messages HTTP API behind the `AssistantProvider` trait so the
//! engine never sees wire types. Conversation history is flattened into the
//! strict user/assistant alternation the API requires.

pub mod client;
pub mod types;

use async_trait::async_trait;
use frontdesk_config::AssistantConfig;
use frontdesk_core::traits::{AssistantProvider, AssistantRequest};
use frontdesk_core::types::MessageOrigin;
use frontdesk_core::FrontdeskError;
use std::time::Duration;

use crate::client::AssistantClient;
use crate::types::{ApiMessage, MessageRequest};

/// Environment variable consulted when the config carries no API key.
pub const API_KEY_ENV: &str = "FRONTDESK_ASSISTANT_API_KEY";

/// `AssistantProvider` backed by the messages HTTP API.
pub struct AssistantAdapter {
    client: AssistantClient,
    model: String,
    max_tokens: u32,
}

impl AssistantAdapter {
    /// Builds an adapter from config. Fails if no API key is available in
    /// either the config or the environment.
    pub fn from_config(config: &AssistantConfig) -> Result<Self, FrontdeskError> {
        let api_key = match &config.api_key {
            Some(key) if !key.trim().is_empty() => key.clone(),
            _ => std::env::var(API_KEY_ENV).map_err(|_| {
                FrontdeskError::Config(format!(
                    "assistant enabled but no API key in config or {API_KEY_ENV}"
                ))
            })?,
        };
        let client = AssistantClient::new(
            api_key,
            config.base_url.clone(),
            Duration::from_secs(config.timeout_secs),
        )?;
        Ok(Self {
            client,
            model: config.model.clone(),
            max_tokens: config.max_tokens,
        })
    }

    fn build_request(&self, request: &AssistantRequest) -> MessageRequest {
        let mut messages: Vec<ApiMessage> = Vec::new();

        for turn in &request.turns {
            let role = match turn.origin {
                MessageOrigin::Participant | MessageOrigin::Agent => "user",
                MessageOrigin::Bot => "assistant",
                // System messages are bookkeeping, not conversation.
                MessageOrigin::System => continue,
            };

            // The API rejects consecutive messages with the same role, so
            // adjacent same-role turns are merged into one block.
            match messages.last_mut() {
                Some(last) if last.role == role => {
                    last.content.push_str("\n\n");
                    last.content.push_str(&turn.text);
                }
                _ => messages.push(ApiMessage {
                    role: role.to_string(),
                    content: turn.text.clone(),
                }),
            }
        }

        // The first message must come from the user.
        if messages.first().is_some_and(|m| m.role == "assistant") {
            messages.remove(0);
        }

        let system = if request.system_context.trim().is_empty() {
            None
        } else {
            Some(request.system_context.clone())
        };

        MessageRequest {
            model: self.model.clone(),
            max_tokens: self.max_tokens,
            system,
            messages,
        }
    }
}

#[async_trait]
impl AssistantProvider for AssistantAdapter {
    async fn complete(&self, request: AssistantRequest) -> Result<String, FrontdeskError> {
        let wire = self.build_request(&request);
        if wire.messages.is_empty() {
            return Err(FrontdeskError::Provider {
                message: "no user content to send".into(),
                source: None,
            });
        }
        let text = self.client.complete_message(&wire).await?;
        if text.trim().is_empty() {
            return Err(FrontdeskError::Provider {
                message: "empty completion".into(),
                source: None,
            });
        }
        Ok(text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use frontdesk_core::traits::AssistantTurn;
    use serde_json::json;
    use wiremock::matchers::{body_partial_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn adapter_for(server: &MockServer) -> AssistantAdapter {
        let config = AssistantConfig {
            enabled: true,
            api_key: Some("test-key".to_string()),
            base_url: format!("{}/v1/messages", server.uri()),
            model: "claude-3-5-haiku-latest".to_string(),
            timeout_secs: 5,
            max_tokens: 256,
        };
        AssistantAdapter::from_config(&config).unwrap()
    }

    fn request_with(turns: Vec<AssistantTurn>) -> AssistantRequest {
        AssistantRequest {
            system_context: "You are a facility support assistant.".to_string(),
            turns,
        }
    }

    fn turn(origin: MessageOrigin, text: &str) -> AssistantTurn {
        AssistantTurn {
            origin,
            text: text.to_string(),
        }
    }

    #[test]
    fn merges_consecutive_same_role_turns() {
        let config = AssistantConfig {
            api_key: Some("k".into()),
            ..Default::default()
        };
        let adapter = AssistantAdapter::from_config(&config).unwrap();
        let wire = adapter.build_request(&request_with(vec![
            turn(MessageOrigin::Participant, "first"),
            turn(MessageOrigin::Participant, "second"),
            turn(MessageOrigin::Bot, "reply"),
            turn(MessageOrigin::System, "agent joined"),
            turn(MessageOrigin::Participant, "third"),
        ]));

        assert_eq!(wire.messages.len(), 3);
        assert_eq!(wire.messages[0].role, "user");
        assert_eq!(wire.messages[0].content, "first\n\nsecond");
        assert_eq!(wire.messages[1].role, "assistant");
        assert_eq!(wire.messages[2].content, "third");
    }

    #[test]
    fn drops_leading_assistant_turn() {
        let config = AssistantConfig {
            api_key: Some("k".into()),
            ..Default::default()
        };
        let adapter = AssistantAdapter::from_config(&config).unwrap();
        let wire = adapter.build_request(&request_with(vec![
            turn(MessageOrigin::Bot, "greeting"),
            turn(MessageOrigin::Participant, "hello"),
        ]));

        assert_eq!(wire.messages.len(), 1);
        assert_eq!(wire.messages[0].role, "user");
    }

    #[tokio::test]
    async fn completes_against_mock_server() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/messages"))
            .and(header("x-api-key", "test-key"))
            .and(body_partial_json(json!({
                "model": "claude-3-5-haiku-latest",
                "system": "You are a facility support assistant.",
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "content": [{"type": "text", "text": "The pool opens at 8am."}]
            })))
            .expect(1)
            .mount(&server)
            .await;

        let adapter = adapter_for(&server);
        let reply = adapter
            .complete(request_with(vec![turn(
                MessageOrigin::Participant,
                "When does the pool open?",
            )]))
            .await
            .unwrap();

        assert_eq!(reply, "The pool opens at 8am.");
    }

    #[tokio::test]
    async fn retries_once_on_overload_then_succeeds() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/messages"))
            .respond_with(ResponseTemplate::new(503))
            .up_to_n_times(1)
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/v1/messages"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "content": [{"type": "text", "text": "ok"}]
            })))
            .expect(1)
            .mount(&server)
            .await;

        let adapter = adapter_for(&server);
        let reply = adapter
            .complete(request_with(vec![turn(MessageOrigin::Participant, "hi")]))
            .await
            .unwrap();
        assert_eq!(reply, "ok");
    }

    #[tokio::test]
    async fn surfaces_api_error_without_retry() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/messages"))
            .respond_with(ResponseTemplate::new(401).set_body_json(json!({
                "error": {"type": "authentication_error", "message": "bad key"}
            })))
            .expect(1)
            .mount(&server)
            .await;

        let adapter = adapter_for(&server);
        let err = adapter
            .complete(request_with(vec![turn(MessageOrigin::Participant, "hi")]))
            .await
            .unwrap_err();

        match err {
            FrontdeskError::Provider { message, .. } => {
                assert!(message.contains("authentication_error"));
            }
            other => panic!("expected provider error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn empty_completion_is_an_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/messages"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "content": []
            })))
            .mount(&server)
            .await;

        let adapter = adapter_for(&server);
        let err = adapter
            .complete(request_with(vec![turn(MessageOrigin::Participant, "hi")]))
            .await
            .unwrap_err();
        assert!(matches!(err, FrontdeskError::Provider { .. }));
    }
}
