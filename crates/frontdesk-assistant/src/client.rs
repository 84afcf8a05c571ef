// SPDX-FileCopyrightText: 2026 Frontdesk Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! HTTP client for the messages API.
//!
//! Handles request construction, authentication headers, and a single
//! retry on transient errors (429, 500, 503). Callers treat every failure
//! as "assistant unavailable"; there is no durable retry here.

use std::time::Duration;

use frontdesk_core::FrontdeskError;
use reqwest::header::{HeaderMap, HeaderValue};
use tracing::{debug, warn};

use crate::types::{ApiErrorResponse, MessageRequest, MessageResponse};

const API_VERSION: &str = "2023-06-01";

/// HTTP client for the external language-model API.
#[derive(Debug, Clone)]
pub struct AssistantClient {
    client: reqwest::Client,
    base_url: String,
    max_retries: u32,
}

impl AssistantClient {
    /// Creates a new client with authentication headers and a hard request
    /// timeout. The timeout keeps the engine's fallback chain bounded even
    /// if the caller forgets its own deadline.
    pub fn new(api_key: String, base_url: String, timeout: Duration) -> Result<Self, FrontdeskError> {
        let mut headers = HeaderMap::new();
        headers.insert(
            "x-api-key",
            HeaderValue::from_str(&api_key)
                .map_err(|e| FrontdeskError::Config(format!("invalid API key header value: {e}")))?,
        );
        headers.insert("anthropic-version", HeaderValue::from_static(API_VERSION));
        headers.insert("content-type", HeaderValue::from_static("application/json"));

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(timeout)
            .build()
            .map_err(|e| FrontdeskError::Provider {
                message: format!("failed to build HTTP client: {e}"),
                source: Some(Box::new(e)),
            })?;

        Ok(Self {
            client,
            base_url,
            max_retries: 1,
        })
    }

    /// Sends a completion request and returns the response text.
    pub async fn complete_message(
        &self,
        request: &MessageRequest,
    ) -> Result<String, FrontdeskError> {
        let mut last_error = None;

        for attempt in 0..=self.max_retries {
            if attempt > 0 {
                warn!(attempt, "retrying completion request after transient error");
                tokio::time::sleep(Duration::from_millis(250)).await;
            }

            let response = self
                .client
                .post(&self.base_url)
                .json(request)
                .send()
                .await
                .map_err(|e| FrontdeskError::Provider {
                    message: format!("HTTP request failed: {e}"),
                    source: Some(Box::new(e)),
                })?;

            let status = response.status();
            debug!(status = %status, attempt, "completion response received");

            if status.is_success() {
                let body: MessageResponse =
                    response.json().await.map_err(|e| FrontdeskError::Provider {
                        message: format!("malformed completion response: {e}"),
                        source: Some(Box::new(e)),
                    })?;
                return Ok(body.text());
            }

            let body = response.text().await.unwrap_or_default();
            let message = if let Ok(api_err) = serde_json::from_str::<ApiErrorResponse>(&body) {
                format!("API error {}: {}", api_err.error.error_type, api_err.error.message)
            } else {
                format!("API returned {status}: {body}")
            };

            if is_transient_error(status) && attempt < self.max_retries {
                warn!(status = %status, "transient error, will retry");
                last_error = Some(FrontdeskError::Provider {
                    message,
                    source: None,
                });
                continue;
            }

            return Err(FrontdeskError::Provider {
                message,
                source: None,
            });
        }

        Err(last_error.unwrap_or_else(|| FrontdeskError::Provider {
            message: "completion retries exhausted".into(),
            source: None,
        }))
    }
}

fn is_transient_error(status: reqwest::StatusCode) -> bool {
    matches!(status.as_u16(), 429 | 500 | 503)
}
