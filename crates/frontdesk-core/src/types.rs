// SPDX-FileCopyrightText: 2026 Frontdesk Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Domain model types for the support-chat core.
//!
//! Every enum that drives behavior (status, origin, audit action) is a
//! closed set with exact wire spellings, matched exhaustively at the
//! call sites instead of being carried around as loose strings.

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

/// Lifecycle state of a conversation.
///
/// Transitions are monotonic: `Bot -> AwaitingAgent -> InService -> Closed`,
/// with direct `Bot -> Closed` and `AwaitingAgent -> Closed` shortcuts for
/// abandonment. `Closed` is terminal; no transition moves backward.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
pub enum ConversationStatus {
    /// Automated handling: the bot answers inbound messages.
    #[strum(serialize = "BOT")]
    #[serde(rename = "BOT")]
    Bot,
    /// Escalated and waiting in the queue for a human agent.
    #[strum(serialize = "AWAITING_AGENT")]
    #[serde(rename = "AWAITING_AGENT")]
    AwaitingAgent,
    /// A human agent has claimed the conversation and is driving.
    #[strum(serialize = "IN_SERVICE")]
    #[serde(rename = "IN_SERVICE")]
    InService,
    /// Terminal.
    #[strum(serialize = "CLOSED")]
    #[serde(rename = "CLOSED")]
    Closed,
}

/// Who produced a message.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
pub enum MessageOrigin {
    /// The conversation's participant: a visitor or an authenticated user.
    #[strum(serialize = "VISITOR_OR_USER")]
    #[serde(rename = "VISITOR_OR_USER")]
    Participant,
    #[strum(serialize = "BOT")]
    #[serde(rename = "BOT")]
    Bot,
    #[strum(serialize = "AGENT")]
    #[serde(rename = "AGENT")]
    Agent,
    #[strum(serialize = "SYSTEM")]
    #[serde(rename = "SYSTEM")]
    System,
}

/// Role of the actor recorded on an audit entry.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
pub enum ActorRole {
    #[strum(serialize = "VISITOR")]
    #[serde(rename = "VISITOR")]
    Visitor,
    #[strum(serialize = "USER")]
    #[serde(rename = "USER")]
    User,
    #[strum(serialize = "AGENT")]
    #[serde(rename = "AGENT")]
    Agent,
    #[strum(serialize = "SYSTEM")]
    #[serde(rename = "SYSTEM")]
    System,
}

/// Closed enumeration of audit trail actions.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
pub enum AuditAction {
    #[strum(serialize = "CONVERSATION_CREATED")]
    #[serde(rename = "CONVERSATION_CREATED")]
    ConversationCreated,
    #[strum(serialize = "MESSAGE_SENT")]
    #[serde(rename = "MESSAGE_SENT")]
    MessageSent,
    #[strum(serialize = "BOT_MESSAGE_SENT")]
    #[serde(rename = "BOT_MESSAGE_SENT")]
    BotMessageSent,
    #[strum(serialize = "HUMAN_REQUESTED")]
    #[serde(rename = "HUMAN_REQUESTED")]
    HumanRequested,
    #[strum(serialize = "QUEUE_ENTERED")]
    #[serde(rename = "QUEUE_ENTERED")]
    QueueEntered,
    #[strum(serialize = "AGENT_CLAIMED")]
    #[serde(rename = "AGENT_CLAIMED")]
    AgentClaimed,
    #[strum(serialize = "AGENT_TRANSFERRED")]
    #[serde(rename = "AGENT_TRANSFERRED")]
    AgentTransferred,
    #[strum(serialize = "CONVERSATION_CLOSED")]
    #[serde(rename = "CONVERSATION_CLOSED")]
    ConversationClosed,
    #[strum(serialize = "RATING_SUBMITTED")]
    #[serde(rename = "RATING_SUBMITTED")]
    RatingSubmitted,
}

/// Where an automated reply came from.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
pub enum ReplySource {
    #[strum(serialize = "AI")]
    #[serde(rename = "AI")]
    Ai,
    #[strum(serialize = "FAQ")]
    #[serde(rename = "FAQ")]
    Faq,
    #[strum(serialize = "DEFAULT")]
    #[serde(rename = "DEFAULT")]
    Default,
}

/// Wait-queue priority. Higher is served first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum QueuePriority {
    Normal,
    High,
    Urgent,
}

impl QueuePriority {
    pub fn as_i64(self) -> i64 {
        match self {
            QueuePriority::Normal => 1,
            QueuePriority::High => 2,
            QueuePriority::Urgent => 3,
        }
    }

    pub fn from_i64(value: i64) -> Option<Self> {
        match value {
            1 => Some(QueuePriority::Normal),
            2 => Some(QueuePriority::High),
            3 => Some(QueuePriority::Urgent),
            _ => None,
        }
    }
}

/// The party a conversation belongs to.
///
/// Mutually exclusive: either an authenticated user reference or an
/// anonymous visitor identity captured at first contact.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Participant {
    User {
        user_id: String,
        display_name: Option<String>,
    },
    Visitor {
        name: String,
        email: String,
        remote_addr: Option<String>,
        user_agent: Option<String>,
    },
}

impl Participant {
    /// The audit role implied by this participant kind.
    pub fn actor_role(&self) -> ActorRole {
        match self {
            Participant::User { .. } => ActorRole::User,
            Participant::Visitor { .. } => ActorRole::Visitor,
        }
    }

    /// Display name shown on messages, if any.
    pub fn display_name(&self) -> Option<&str> {
        match self {
            Participant::User { display_name, .. } => display_name.as_deref(),
            Participant::Visitor { name, .. } => Some(name.as_str()),
        }
    }
}

/// Identity and role of whoever is performing an operation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SenderContext {
    pub actor_id: Option<String>,
    pub display_name: Option<String>,
    pub role: ActorRole,
}

impl SenderContext {
    pub fn system() -> Self {
        Self {
            actor_id: None,
            display_name: None,
            role: ActorRole::System,
        }
    }

    pub fn agent(agent_id: &str) -> Self {
        Self {
            actor_id: Some(agent_id.to_string()),
            display_name: None,
            role: ActorRole::Agent,
        }
    }
}

/// A support conversation.
///
/// Columns are kept flat (participant identity denormalized) to match the
/// storage row; [`Conversation::participant`] reassembles the typed view.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Conversation {
    pub id: i64,
    pub user_id: Option<String>,
    pub visitor_name: Option<String>,
    pub visitor_email: Option<String>,
    pub visitor_remote_addr: Option<String>,
    pub visitor_user_agent: Option<String>,
    pub subject: Option<String>,
    pub status: ConversationStatus,
    pub agent_id: Option<String>,
    pub created_at: String,
    pub service_started_at: Option<String>,
    pub closed_at: Option<String>,
}

impl Conversation {
    /// Reassembles the typed participant identity from the flat columns.
    pub fn participant(&self) -> Option<Participant> {
        if let Some(user_id) = &self.user_id {
            return Some(Participant::User {
                user_id: user_id.clone(),
                display_name: None,
            });
        }
        match (&self.visitor_name, &self.visitor_email) {
            (Some(name), Some(email)) => Some(Participant::Visitor {
                name: name.clone(),
                email: email.clone(),
                remote_addr: self.visitor_remote_addr.clone(),
                user_agent: self.visitor_user_agent.clone(),
            }),
            _ => None,
        }
    }
}

/// A single message inside a conversation. Append-only; only the `read`
/// flag is ever mutated after insert.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    pub id: String,
    pub conversation_id: i64,
    pub origin: MessageOrigin,
    pub sender_id: Option<String>,
    pub sender_name: Option<String>,
    pub body: String,
    /// Set only on `Bot`-origin messages.
    pub reply_source: Option<ReplySource>,
    /// Classifier confidence 0..1, when the reply source provides one.
    pub confidence: Option<f64>,
    pub read: bool,
    pub created_at: String,
}

/// A wait-queue entry; exists iff the conversation is `AWAITING_AGENT`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueueEntry {
    pub conversation_id: i64,
    /// Strictly increasing, assigned at enqueue time.
    pub position: i64,
    pub priority: QueuePriority,
    pub enqueued_at: String,
}

/// Typed detail payload of an audit record, one variant per action kind.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum AuditDetail {
    ConversationCreated {
        subject: Option<String>,
    },
    MessageSent {
        message_id: String,
        origin: MessageOrigin,
    },
    BotMessageSent {
        message_id: String,
        source: ReplySource,
        confidence: Option<f64>,
    },
    HumanRequested {
        reason: Option<String>,
    },
    QueueEntered {
        position: i64,
        priority: QueuePriority,
    },
    AgentClaimed {
        agent_id: String,
    },
    AgentTransferred {
        from_agent: String,
        to_agent: String,
    },
    ConversationClosed {
        reason: Option<String>,
    },
    RatingSubmitted {
        score: u8,
    },
}

impl AuditDetail {
    /// The action tag implied by this payload variant.
    pub fn action(&self) -> AuditAction {
        match self {
            AuditDetail::ConversationCreated { .. } => AuditAction::ConversationCreated,
            AuditDetail::MessageSent { .. } => AuditAction::MessageSent,
            AuditDetail::BotMessageSent { .. } => AuditAction::BotMessageSent,
            AuditDetail::HumanRequested { .. } => AuditAction::HumanRequested,
            AuditDetail::QueueEntered { .. } => AuditAction::QueueEntered,
            AuditDetail::AgentClaimed { .. } => AuditAction::AgentClaimed,
            AuditDetail::AgentTransferred { .. } => AuditAction::AgentTransferred,
            AuditDetail::ConversationClosed { .. } => AuditAction::ConversationClosed,
            AuditDetail::RatingSubmitted { .. } => AuditAction::RatingSubmitted,
        }
    }
}

/// An immutable audit trail entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuditRecord {
    pub id: i64,
    pub conversation_id: i64,
    pub action: AuditAction,
    pub actor_id: Option<String>,
    pub actor_role: ActorRole,
    pub detail: AuditDetail,
    pub created_at: String,
}

/// Post-service rating. At most one per conversation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rating {
    pub conversation_id: i64,
    pub score: u8,
    pub comment: Option<String>,
    pub created_at: String,
}

/// A knowledge base entry used for fallback answers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FaqEntry {
    pub id: i64,
    pub question: String,
    pub answer: String,
    /// Comma-separated match keywords.
    pub keywords: String,
    pub active: bool,
    pub usage_count: i64,
    pub created_at: String,
}

impl FaqEntry {
    /// The configured keywords, trimmed and lowercased.
    pub fn keyword_list(&self) -> Vec<String> {
        self.keywords
            .split(',')
            .map(|k| k.trim().to_lowercase())
            .filter(|k| !k.is_empty())
            .collect()
    }
}
