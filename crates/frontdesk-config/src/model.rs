// SPDX-FileCopyrightText: 2026 Frontdesk Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration model structs for the Frontdesk support-chat core.
//!
//! All structs use `#[serde(deny_unknown_fields)]` to reject unrecognized
//! config keys at startup.

use serde::{Deserialize, Serialize};

/// Top-level Frontdesk configuration.
///
/// Loaded from TOML files following the XDG hierarchy, with environment
/// variable overrides. All sections default to sensible values.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct FrontdeskConfig {
    /// Service identity and canned texts.
    #[serde(default)]
    pub service: ServiceConfig,

    /// Storage backend settings.
    #[serde(default)]
    pub storage: StorageConfig,

    /// External language-model collaborator settings.
    #[serde(default)]
    pub assistant: AssistantConfig,

    /// Visitor-session token settings.
    #[serde(default)]
    pub token: TokenConfig,
}

/// Service identity and the canned texts the engine emits.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct ServiceConfig {
    /// Display name used in the greeting and system messages.
    #[serde(default = "default_service_name")]
    pub name: String,

    /// Logging level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Greeting message posted when a conversation is created.
    #[serde(default = "default_greeting")]
    pub greeting: String,

    /// Fixed reply used when both the assistant and the FAQ lookup come up empty.
    #[serde(default = "default_reply")]
    pub default_reply: String,

    /// How many recent messages to hand to the assistant as history.
    #[serde(default = "default_history_window")]
    pub history_window: usize,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            name: default_service_name(),
            log_level: default_log_level(),
            greeting: default_greeting(),
            default_reply: default_reply(),
            history_window: default_history_window(),
        }
    }
}

fn default_service_name() -> String {
    "frontdesk".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_greeting() -> String {
    "Hello! I'm the support assistant. How can I help you today?".to_string()
}

fn default_reply() -> String {
    "I couldn't find an answer for that. You can rephrase your question, \
     or ask to talk to a human agent."
        .to_string()
}

fn default_history_window() -> usize {
    12
}

/// Storage backend configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct StorageConfig {
    /// Path to the SQLite database file.
    #[serde(default = "default_database_path")]
    pub database_path: String,

    /// Enable WAL journal mode.
    #[serde(default = "default_wal_mode")]
    pub wal_mode: bool,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            database_path: default_database_path(),
            wal_mode: default_wal_mode(),
        }
    }
}

fn default_database_path() -> String {
    "frontdesk.db".to_string()
}

fn default_wal_mode() -> bool {
    true
}

/// External language-model collaborator configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct AssistantConfig {
    /// Disable to skip the assistant entirely and rely on the FAQ fallback.
    #[serde(default = "default_assistant_enabled")]
    pub enabled: bool,

    /// API key. `None` falls back to the `FRONTDESK_ASSISTANT_API_KEY` env var.
    #[serde(default)]
    pub api_key: Option<String>,

    /// Messages endpoint base URL.
    #[serde(default = "default_assistant_base_url")]
    pub base_url: String,

    /// Model identifier sent with each request.
    #[serde(default = "default_assistant_model")]
    pub model: String,

    /// Upper bound on a single completion call, in seconds. On timeout the
    /// engine falls through to the FAQ lookup.
    #[serde(default = "default_assistant_timeout_secs")]
    pub timeout_secs: u64,

    /// Maximum tokens requested per completion.
    #[serde(default = "default_assistant_max_tokens")]
    pub max_tokens: u32,
}

impl Default for AssistantConfig {
    fn default() -> Self {
        Self {
            enabled: default_assistant_enabled(),
            api_key: None,
            base_url: default_assistant_base_url(),
            model: default_assistant_model(),
            timeout_secs: default_assistant_timeout_secs(),
            max_tokens: default_assistant_max_tokens(),
        }
    }
}

fn default_assistant_enabled() -> bool {
    true
}

fn default_assistant_base_url() -> String {
    "https://api.anthropic.com/v1/messages".to_string()
}

fn default_assistant_model() -> String {
    "claude-3-5-haiku-latest".to_string()
}

fn default_assistant_timeout_secs() -> u64 {
    10
}

fn default_assistant_max_tokens() -> u32 {
    1024
}

/// Visitor-session token configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct TokenConfig {
    /// HMAC secret. `None` disables visitor token issuance.
    #[serde(default)]
    pub secret: Option<String>,

    /// Token lifetime in seconds.
    #[serde(default = "default_token_ttl_secs")]
    pub ttl_secs: u64,
}

impl Default for TokenConfig {
    fn default() -> Self {
        Self {
            secret: None,
            ttl_secs: default_token_ttl_secs(),
        }
    }
}

fn default_token_ttl_secs() -> u64 {
    24 * 3600
}
