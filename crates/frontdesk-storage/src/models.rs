// SPDX-FileCopyrightText: 2026 Frontdesk Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Domain model types for storage entities.
//!
//! The canonical types are defined in `frontdesk-core::types`; this module
//! re-exports them for convenience within the storage crate.

pub use frontdesk_core::types::{
    AuditRecord, Conversation, ConversationStatus, FaqEntry, Message, Participant, QueueEntry,
    QueuePriority, Rating,
};
