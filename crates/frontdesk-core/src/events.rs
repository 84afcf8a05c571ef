// SPDX-FileCopyrightText: 2026 Frontdesk Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Notification events published by the conversation engine.
//!
//! Delivery is at-most-once, best-effort, to whoever is subscribed at the
//! moment of publish. This is not a durable log.

use serde::{Deserialize, Serialize};

use crate::types::Message;

/// Delivery scope for a published event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum NotifyScope {
    /// Only viewers of this conversation.
    Conversation(i64),
    /// Every connected agent.
    AgentPool,
    /// Everyone.
    Global,
}

/// A lifecycle or message event, one variant per published topic.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "topic", content = "payload")]
pub enum Notification {
    #[serde(rename = "conversation:new")]
    ConversationNew {
        conversation_id: i64,
        subject: Option<String>,
    },
    #[serde(rename = "message:new")]
    MessageNew {
        conversation_id: i64,
        message: Message,
    },
    #[serde(rename = "queue:updated")]
    QueueUpdated { queue_size: i64 },
    #[serde(rename = "agent:joined")]
    AgentJoined {
        conversation_id: i64,
        agent_id: String,
    },
    #[serde(rename = "conversation:closed")]
    ConversationClosed {
        conversation_id: i64,
        reason: Option<String>,
    },
}

impl Notification {
    /// Topic string as seen by subscribers.
    pub fn topic(&self) -> &'static str {
        match self {
            Notification::ConversationNew { .. } => "conversation:new",
            Notification::MessageNew { .. } => "message:new",
            Notification::QueueUpdated { .. } => "queue:updated",
            Notification::AgentJoined { .. } => "agent:joined",
            Notification::ConversationClosed { .. } => "conversation:closed",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn topics_are_stable() {
        let event = Notification::QueueUpdated { queue_size: 3 };
        assert_eq!(event.topic(), "queue:updated");

        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["topic"], "queue:updated");
        assert_eq!(json["payload"]["queue_size"], 3);
    }
}
