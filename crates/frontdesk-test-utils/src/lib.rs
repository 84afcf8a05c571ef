// SPDX-FileCopyrightText: 2026 Frontdesk Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Test doubles for the support-chat core: a scriptable assistant
//! provider, a publisher that records every event, and a temp-database
//! helper.

use std::collections::VecDeque;
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use frontdesk_core::events::{Notification, NotifyScope};
use frontdesk_core::traits::{AssistantProvider, AssistantRequest, EventPublisher};
use frontdesk_core::FrontdeskError;
use frontdesk_storage::Database;
use tempfile::TempDir;

/// Opens a fresh migrated database in a temp directory. Keep the
/// `TempDir` alive for the duration of the test.
pub async fn temp_database() -> (Database, TempDir) {
    let dir = tempfile::tempdir().expect("create temp dir");
    let path = dir.path().join("test.db");
    let db = Database::open(path.to_str().expect("utf8 path"))
        .await
        .expect("open test database");
    (db, dir)
}

/// Scriptable `AssistantProvider`: pops queued responses in order, fails
/// when told to, and can delay to exercise the engine's timeout.
pub struct MockAssistant {
    responses: Mutex<VecDeque<String>>,
    fail_all: bool,
    delay: Option<Duration>,
    calls: Mutex<Vec<AssistantRequest>>,
}

impl MockAssistant {
    /// Replies with the given responses in order, then fails.
    pub fn with_responses(responses: impl IntoIterator<Item = impl Into<String>>) -> Self {
        Self {
            responses: Mutex::new(responses.into_iter().map(Into::into).collect()),
            fail_all: false,
            delay: None,
            calls: Mutex::new(Vec::new()),
        }
    }

    /// Fails every call, driving the engine into its fallback chain.
    pub fn failing() -> Self {
        Self {
            responses: Mutex::new(VecDeque::new()),
            fail_all: true,
            delay: None,
            calls: Mutex::new(Vec::new()),
        }
    }

    /// Sleeps before answering, to trip the engine's timeout.
    pub fn delayed(delay: Duration, response: impl Into<String>) -> Self {
        Self {
            responses: Mutex::new(VecDeque::from([response.into()])),
            fail_all: false,
            delay: Some(delay),
            calls: Mutex::new(Vec::new()),
        }
    }

    /// Every request this mock has received, in order.
    pub fn calls(&self) -> Vec<AssistantRequest> {
        self.calls.lock().expect("calls lock").clone()
    }
}

#[async_trait]
impl AssistantProvider for MockAssistant {
    async fn complete(&self, request: AssistantRequest) -> Result<String, FrontdeskError> {
        self.calls.lock().expect("calls lock").push(request);
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        if self.fail_all {
            return Err(FrontdeskError::Provider {
                message: "mock assistant configured to fail".into(),
                source: None,
            });
        }
        self.responses
            .lock()
            .expect("responses lock")
            .pop_front()
            .ok_or_else(|| FrontdeskError::Provider {
                message: "mock assistant out of responses".into(),
                source: None,
            })
    }
}

/// `EventPublisher` that records every published event for assertions.
#[derive(Default)]
pub struct CapturingPublisher {
    events: Mutex<Vec<(NotifyScope, Notification)>>,
}

impl CapturingPublisher {
    pub fn new() -> Self {
        Self::default()
    }

    /// All events published so far, in order.
    pub fn events(&self) -> Vec<(NotifyScope, Notification)> {
        self.events.lock().expect("events lock").clone()
    }

    /// How many events carry the given topic.
    pub fn count_topic(&self, topic: &str) -> usize {
        self.events
            .lock()
            .expect("events lock")
            .iter()
            .filter(|(_, event)| event.topic() == topic)
            .count()
    }
}

impl EventPublisher for CapturingPublisher {
    fn publish(&self, scope: NotifyScope, event: Notification) {
        self.events.lock().expect("events lock").push((scope, event));
    }
}
