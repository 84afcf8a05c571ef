// SPDX-FileCopyrightText: 2026 Frontdesk Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Core library for the Frontdesk support-chat core.
//!
//! This crate provides the domain types (conversation lifecycle, messages,
//! queue entries, audit trail), the shared error taxonomy, the visitor
//! session token, and the trait seams to the engine's collaborators.

pub mod error;
pub mod events;
pub mod token;
pub mod traits;
pub mod types;

pub use error::FrontdeskError;
pub use events::{Notification, NotifyScope};
pub use traits::{AssistantProvider, AssistantRequest, AssistantTurn, EventPublisher};
pub use types::{
    ActorRole, AuditAction, AuditDetail, AuditRecord, Conversation, ConversationStatus, FaqEntry,
    Message, MessageOrigin, Participant, QueueEntry, QueuePriority, Rating, ReplySource,
    SenderContext,
};
