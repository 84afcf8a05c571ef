// SPDX-FileCopyrightText: 2026 Frontdesk Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Broadcast-channel notification fanout.
//!
//! At-most-once, fire-and-forget delivery over `tokio::sync::broadcast`.
//! A scope with no live subscriber drops the event; lagging subscribers
//! lose the oldest events. Global subscribers observe every published
//! event regardless of scope.

use dashmap::DashMap;
use frontdesk_core::events::{Notification, NotifyScope};
use frontdesk_core::traits::EventPublisher;
use tokio::sync::broadcast;

const DEFAULT_CAPACITY: usize = 64;

/// In-process `EventPublisher` with one channel per conversation, one for
/// the agent pool, and one global channel.
pub struct BroadcastPublisher {
    conversations: DashMap<i64, broadcast::Sender<Notification>>,
    agent_pool: broadcast::Sender<Notification>,
    global: broadcast::Sender<Notification>,
    capacity: usize,
}

impl BroadcastPublisher {
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_CAPACITY)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        let (agent_pool, _) = broadcast::channel(capacity);
        let (global, _) = broadcast::channel(capacity);
        Self {
            conversations: DashMap::new(),
            agent_pool,
            global,
            capacity,
        }
    }

    /// Subscribe to one conversation's events.
    pub fn subscribe_conversation(&self, conversation_id: i64) -> broadcast::Receiver<Notification> {
        self.conversations
            .entry(conversation_id)
            .or_insert_with(|| broadcast::channel(self.capacity).0)
            .subscribe()
    }

    /// Subscribe to events addressed to the agent pool.
    pub fn subscribe_agent_pool(&self) -> broadcast::Receiver<Notification> {
        self.agent_pool.subscribe()
    }

    /// Subscribe to every event, regardless of scope.
    pub fn subscribe_global(&self) -> broadcast::Receiver<Notification> {
        self.global.subscribe()
    }

    /// Drop the channel of a closed conversation.
    pub fn forget_conversation(&self, conversation_id: i64) {
        self.conversations.remove(&conversation_id);
    }
}

impl Default for BroadcastPublisher {
    fn default() -> Self {
        Self::new()
    }
}

impl EventPublisher for BroadcastPublisher {
    fn publish(&self, scope: NotifyScope, event: Notification) {
        // Send errors mean no subscriber; that is the contract, not a fault.
        match scope {
            NotifyScope::Conversation(id) => {
                if let Some(sender) = self.conversations.get(&id) {
                    let _ = sender.send(event.clone());
                }
            }
            NotifyScope::AgentPool => {
                let _ = self.agent_pool.send(event.clone());
            }
            NotifyScope::Global => {}
        }
        let _ = self.global.send(event);
    }
}
