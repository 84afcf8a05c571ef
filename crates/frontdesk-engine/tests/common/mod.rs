// SPDX-FileCopyrightText: 2026 Frontdesk Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Shared harness for engine integration tests.

// Each test binary uses a different subset of these helpers.
#![allow(dead_code)]

use std::sync::Arc;

use frontdesk_config::FrontdeskConfig;
use frontdesk_core::traits::AssistantProvider;
use frontdesk_core::types::{ActorRole, Participant, SenderContext};
use frontdesk_engine::ConversationEngine;
use frontdesk_storage::Database;
use frontdesk_test_utils::{temp_database, CapturingPublisher};
use tempfile::TempDir;

pub struct Harness {
    pub engine: Arc<ConversationEngine>,
    pub publisher: Arc<CapturingPublisher>,
    pub db: Arc<Database>,
    _dir: TempDir,
}

pub async fn harness(assistant: Option<Arc<dyn AssistantProvider>>) -> Harness {
    harness_with_config(assistant, |_| {}).await
}

pub async fn harness_with_config(
    assistant: Option<Arc<dyn AssistantProvider>>,
    configure: impl FnOnce(&mut FrontdeskConfig),
) -> Harness {
    let (db, dir) = temp_database().await;
    let db = Arc::new(db);
    let publisher = Arc::new(CapturingPublisher::new());
    let mut config = FrontdeskConfig::default();
    configure(&mut config);
    let engine = Arc::new(ConversationEngine::new(
        db.clone(),
        assistant,
        publisher.clone(),
        config,
    ));
    Harness {
        engine,
        publisher,
        db,
        _dir: dir,
    }
}

pub fn visitor(name: &str, email: &str) -> Participant {
    Participant::Visitor {
        name: name.to_string(),
        email: email.to_string(),
        remote_addr: Some("203.0.113.9".to_string()),
        user_agent: Some("tests".to_string()),
    }
}

pub fn user(user_id: &str) -> Participant {
    Participant::User {
        user_id: user_id.to_string(),
        display_name: Some(format!("User {user_id}")),
    }
}

pub fn visitor_sender(name: &str) -> SenderContext {
    SenderContext {
        actor_id: None,
        display_name: Some(name.to_string()),
        role: ActorRole::Visitor,
    }
}
