// SPDX-FileCopyrightText: 2026 Frontdesk Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Conversation engine for the Frontdesk support-chat core.
//!
//! Moves a conversation through automated (bot) handling, a priority wait
//! queue, and human-agent handling, with an atomic claim guarantee, an
//! append-only audit trail, and best-effort notification fanout.

pub mod audit;
pub mod engine;
pub mod escalation;
pub mod fanout;
pub mod knowledge;
pub mod queue;

pub use audit::AuditRecorder;
pub use engine::{ConversationEngine, HandoffOutcome, PostMessageOutcome, StartOutcome};
pub use escalation::EscalationClassifier;
pub use fanout::BroadcastPublisher;
pub use knowledge::{FaqAnswer, KnowledgeBase, ScoredFaq};
pub use queue::{EnqueueOutcome, QueueStats, WaitQueue};
