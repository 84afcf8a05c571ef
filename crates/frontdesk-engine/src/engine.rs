// SPDX-FileCopyrightText: 2026 Frontdesk Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The conversation engine.
//!
//! Owns the conversation and message lifecycle and orchestrates the
//! classifier, wait queue, knowledge lookup, audit recorder, and
//! notification fanout. Safety-critical transitions (claim, close,
//! enqueue) run as single transactions in storage; audit records, system
//! messages, and notifications happen after the transition commits and are
//! never allowed to fail it.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use frontdesk_config::FrontdeskConfig;
use frontdesk_core::events::{Notification, NotifyScope};
use frontdesk_core::token::{self, VisitorClaims};
use frontdesk_core::traits::{AssistantProvider, AssistantRequest, AssistantTurn, EventPublisher};
use frontdesk_core::types::{
    ActorRole, AuditDetail, Conversation, ConversationStatus, Message, MessageOrigin, Participant,
    QueuePriority, Rating, ReplySource, SenderContext,
};
use frontdesk_core::FrontdeskError;
use frontdesk_storage::queries::{conversations, messages, ratings};
use frontdesk_storage::queries::conversations::{
    ClaimOutcome, CloseOutcome, TransferOutcome, UserStartOutcome,
};
use frontdesk_storage::Database;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::audit::AuditRecorder;
use crate::escalation::EscalationClassifier;
use crate::knowledge::KnowledgeBase;
use crate::queue::{EnqueueOutcome, WaitQueue};

/// Result of `start_conversation`.
#[derive(Debug, Clone, PartialEq)]
pub struct StartOutcome {
    pub conversation: Conversation,
    /// True when an existing non-closed conversation was reused.
    pub already_existing: bool,
}

/// Result of `post_message`, one variant per lifecycle phase behavior.
#[derive(Debug, Clone, PartialEq)]
pub enum PostMessageOutcome {
    /// A human agent is driving; the message was recorded, no reply.
    AgentHandling,
    /// Automated phase produced a reply.
    BotReply(Message),
    /// The classifier escalated; the conversation is now queued.
    Escalated { position: i64 },
    /// Already queued; acknowledgment restating the position.
    QueuedAck { position: i64 },
}

/// Result of `request_human_handoff`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HandoffOutcome {
    pub position: i64,
    pub already_queued: bool,
}

/// Current UTC time in the storage timestamp format.
pub(crate) fn now_timestamp() -> String {
    Utc::now().format("%Y-%m-%dT%H:%M:%S%.3fZ").to_string()
}

fn new_message_id() -> String {
    Uuid::new_v4().to_string()
}

pub struct ConversationEngine {
    db: Arc<Database>,
    assistant: Option<Arc<dyn AssistantProvider>>,
    publisher: Arc<dyn EventPublisher>,
    audit: AuditRecorder,
    queue: WaitQueue,
    knowledge: KnowledgeBase,
    classifier: EscalationClassifier,
    config: FrontdeskConfig,
}

impl ConversationEngine {
    /// Builds an engine with explicit dependencies. `assistant` may be
    /// `None` when the external model is disabled; the fallback chain then
    /// starts at the FAQ lookup.
    pub fn new(
        db: Arc<Database>,
        assistant: Option<Arc<dyn AssistantProvider>>,
        publisher: Arc<dyn EventPublisher>,
        config: FrontdeskConfig,
    ) -> Self {
        Self {
            audit: AuditRecorder::new(db.clone()),
            queue: WaitQueue::new(db.clone()),
            knowledge: KnowledgeBase::new(db.clone()),
            classifier: EscalationClassifier::new(),
            db,
            assistant,
            publisher,
            config,
        }
    }

    pub fn queue(&self) -> &WaitQueue {
        &self.queue
    }

    pub fn knowledge(&self) -> &KnowledgeBase {
        &self.knowledge
    }

    pub fn audit(&self) -> &AuditRecorder {
        &self.audit
    }

    /// Starts a conversation, or returns the participant's existing
    /// non-closed one (authenticated users only; no side effects then).
    pub async fn start_conversation(
        &self,
        participant: Participant,
        subject: Option<String>,
    ) -> Result<StartOutcome, FrontdeskError> {
        match &participant {
            Participant::Visitor { name, email, .. } => {
                if name.trim().is_empty() {
                    return Err(FrontdeskError::Validation(
                        "visitor display name is required".into(),
                    ));
                }
                if email.trim().is_empty() {
                    return Err(FrontdeskError::Validation(
                        "visitor contact email is required".into(),
                    ));
                }
            }
            Participant::User { user_id, .. } => {
                if user_id.trim().is_empty() {
                    return Err(FrontdeskError::Validation("user id is required".into()));
                }
            }
        }

        // Find-or-create runs as one storage transaction so concurrent
        // starts for the same user cannot each create a conversation.
        let now = now_timestamp();
        let conversation = match &participant {
            Participant::User { user_id, .. } => {
                match conversations::find_or_create_for_user(&self.db, user_id, subject, &now)
                    .await?
                {
                    UserStartOutcome::Existing(existing) => {
                        debug!(conversation_id = existing.id, "reusing open conversation");
                        return Ok(StartOutcome {
                            conversation: existing,
                            already_existing: true,
                        });
                    }
                    UserStartOutcome::Created(conversation) => conversation,
                }
            }
            Participant::Visitor { .. } => {
                conversations::create(&self.db, &participant, subject, &now).await?
            }
        };
        info!(conversation_id = conversation.id, "conversation started");

        let greeting = Message {
            id: new_message_id(),
            conversation_id: conversation.id,
            origin: MessageOrigin::Bot,
            sender_id: None,
            sender_name: Some(self.config.service.name.clone()),
            body: self.config.service.greeting.clone(),
            reply_source: None,
            confidence: None,
            read: false,
            created_at: now.clone(),
        };
        messages::insert(&self.db, &greeting).await?;

        self.audit
            .record(
                conversation.id,
                None,
                participant.actor_role(),
                &AuditDetail::ConversationCreated {
                    subject: conversation.subject.clone(),
                },
                &now,
            )
            .await;
        self.publisher.publish(
            NotifyScope::AgentPool,
            Notification::ConversationNew {
                conversation_id: conversation.id,
                subject: conversation.subject.clone(),
            },
        );

        Ok(StartOutcome {
            conversation,
            already_existing: false,
        })
    }

    /// Posts a participant message. Behavior depends on the conversation's
    /// current phase; see [`PostMessageOutcome`].
    pub async fn post_message(
        &self,
        conversation_id: i64,
        body: &str,
        sender: &SenderContext,
    ) -> Result<PostMessageOutcome, FrontdeskError> {
        if body.trim().is_empty() {
            return Err(FrontdeskError::Validation("message body is empty".into()));
        }
        let conversation = conversations::get(&self.db, conversation_id)
            .await?
            .ok_or_else(|| FrontdeskError::conversation_not_found(conversation_id))?;

        if conversation.status == ConversationStatus::Closed {
            return Err(FrontdeskError::InvalidState(format!(
                "conversation {conversation_id} is closed"
            )));
        }

        let now = now_timestamp();
        let inbound = Message {
            id: new_message_id(),
            conversation_id,
            origin: MessageOrigin::Participant,
            sender_id: sender.actor_id.clone(),
            sender_name: sender.display_name.clone(),
            body: body.to_string(),
            reply_source: None,
            confidence: None,
            read: false,
            created_at: now.clone(),
        };
        messages::insert(&self.db, &inbound).await?;
        self.audit
            .record(
                conversation_id,
                sender.actor_id.clone(),
                sender.role,
                &AuditDetail::MessageSent {
                    message_id: inbound.id.clone(),
                    origin: MessageOrigin::Participant,
                },
                &now,
            )
            .await;
        self.publisher.publish(
            NotifyScope::Conversation(conversation_id),
            Notification::MessageNew {
                conversation_id,
                message: inbound.clone(),
            },
        );

        match conversation.status {
            ConversationStatus::InService => Ok(PostMessageOutcome::AgentHandling),
            ConversationStatus::AwaitingAgent => {
                let position = self
                    .queue
                    .position_of(conversation_id)
                    .await?
                    .ok_or_else(|| {
                        FrontdeskError::Internal(format!(
                            "conversation {conversation_id} awaiting agent without queue entry"
                        ))
                    })?;
                self.post_system_message(
                    conversation_id,
                    &format!(
                        "You are in the queue at position {position}. An agent will join shortly."
                    ),
                )
                .await;
                Ok(PostMessageOutcome::QueuedAck { position })
            }
            ConversationStatus::Bot => {
                if let Some(keyword) = self.classifier.classify(body) {
                    debug!(conversation_id, keyword, "classifier escalated");
                    let position = self
                        .escalate(conversation_id, sender, Some(keyword.to_string()))
                        .await?;
                    Ok(PostMessageOutcome::Escalated { position })
                } else {
                    let reply = self.automated_reply(&conversation, body).await?;
                    Ok(PostMessageOutcome::BotReply(reply))
                }
            }
            ConversationStatus::Closed => unreachable!("rejected above"),
        }
    }

    /// Explicit human handoff. Idempotent when already queued.
    pub async fn request_human_handoff(
        &self,
        conversation_id: i64,
        requester: &SenderContext,
    ) -> Result<HandoffOutcome, FrontdeskError> {
        let conversation = conversations::get(&self.db, conversation_id)
            .await?
            .ok_or_else(|| FrontdeskError::conversation_not_found(conversation_id))?;

        match conversation.status {
            ConversationStatus::AwaitingAgent => {
                let position = self
                    .queue
                    .position_of(conversation_id)
                    .await?
                    .ok_or_else(|| {
                        FrontdeskError::Internal(format!(
                            "conversation {conversation_id} awaiting agent without queue entry"
                        ))
                    })?;
                Ok(HandoffOutcome {
                    position,
                    already_queued: true,
                })
            }
            ConversationStatus::InService => Err(FrontdeskError::InvalidState(format!(
                "conversation {conversation_id} already has an agent"
            ))),
            ConversationStatus::Closed => Err(FrontdeskError::InvalidState(format!(
                "conversation {conversation_id} is closed"
            ))),
            ConversationStatus::Bot => {
                let position = self.escalate(conversation_id, requester, None).await?;
                Ok(HandoffOutcome {
                    position,
                    already_queued: false,
                })
            }
        }
    }

    /// Enqueue plus the post-commit side effects shared by classifier
    /// escalation and explicit handoff.
    async fn escalate(
        &self,
        conversation_id: i64,
        requester: &SenderContext,
        reason: Option<String>,
    ) -> Result<i64, FrontdeskError> {
        let now = now_timestamp();
        let outcome = self
            .queue
            .enqueue(conversation_id, QueuePriority::Normal, &now)
            .await?;
        let (position, priority) = match &outcome {
            EnqueueOutcome::Entered(entry) | EnqueueOutcome::AlreadyQueued(entry) => {
                (entry.position, entry.priority)
            }
            EnqueueOutcome::NotFound => {
                return Err(FrontdeskError::conversation_not_found(conversation_id))
            }
            // A claim or close slipped in between the status read and the
            // enqueue transaction.
            EnqueueOutcome::NotWaitable { status } => {
                return Err(FrontdeskError::InvalidState(format!(
                    "conversation {conversation_id} can no longer enter the queue (status {status})"
                )));
            }
        };
        info!(conversation_id, position, "conversation escalated to queue");

        if let EnqueueOutcome::Entered(_) = outcome {
            self.audit
                .record(
                    conversation_id,
                    requester.actor_id.clone(),
                    requester.role,
                    &AuditDetail::HumanRequested { reason },
                    &now,
                )
                .await;
            self.audit
                .record(
                    conversation_id,
                    requester.actor_id.clone(),
                    requester.role,
                    &AuditDetail::QueueEntered { position, priority },
                    &now,
                )
                .await;
            self.post_system_message(
                conversation_id,
                &format!(
                    "Your request was forwarded to our team. You are at position {position} in the queue."
                ),
            )
            .await;
            self.publisher.publish(
                NotifyScope::AgentPool,
                Notification::QueueUpdated {
                    queue_size: self.queue.size().await.unwrap_or(0),
                },
            );
        }
        Ok(position)
    }

    /// The concurrency-critical claim. Exactly one of N concurrent claims
    /// on the same waiting conversation wins; the rest see `Conflict`.
    pub async fn claim_conversation(
        &self,
        conversation_id: i64,
        agent_id: &str,
    ) -> Result<Conversation, FrontdeskError> {
        if agent_id.trim().is_empty() {
            return Err(FrontdeskError::Validation("agent id is required".into()));
        }
        let now = now_timestamp();
        match conversations::claim(&self.db, conversation_id, agent_id, &now).await? {
            ClaimOutcome::Claimed => {}
            ClaimOutcome::NotFound => {
                return Err(FrontdeskError::conversation_not_found(conversation_id))
            }
            ClaimOutcome::NotAvailable { status } => {
                return Err(FrontdeskError::Conflict(format!(
                    "conversation {conversation_id} is no longer available (status {status})"
                )));
            }
        }
        info!(conversation_id, agent_id, "conversation claimed");

        // Post-commit, best-effort: none of these may undo the claim.
        self.audit
            .record(
                conversation_id,
                Some(agent_id.to_string()),
                ActorRole::Agent,
                &AuditDetail::AgentClaimed {
                    agent_id: agent_id.to_string(),
                },
                &now,
            )
            .await;
        self.post_system_message(conversation_id, "An agent has joined the conversation.")
            .await;
        self.publisher.publish(
            NotifyScope::Conversation(conversation_id),
            Notification::AgentJoined {
                conversation_id,
                agent_id: agent_id.to_string(),
            },
        );
        self.publisher.publish(
            NotifyScope::AgentPool,
            Notification::QueueUpdated {
                queue_size: self.queue.size().await.unwrap_or(0),
            },
        );

        conversations::get(&self.db, conversation_id)
            .await?
            .ok_or_else(|| FrontdeskError::conversation_not_found(conversation_id))
    }

    /// Posts a message as the assigned agent.
    pub async fn post_agent_message(
        &self,
        conversation_id: i64,
        body: &str,
        agent_id: &str,
    ) -> Result<Message, FrontdeskError> {
        if body.trim().is_empty() {
            return Err(FrontdeskError::Validation("message body is empty".into()));
        }
        let conversation = conversations::get(&self.db, conversation_id)
            .await?
            .ok_or_else(|| FrontdeskError::conversation_not_found(conversation_id))?;
        if conversation.status != ConversationStatus::InService {
            return Err(FrontdeskError::InvalidState(format!(
                "conversation {conversation_id} is not in service (status {})",
                conversation.status
            )));
        }
        if conversation.agent_id.as_deref() != Some(agent_id) {
            return Err(FrontdeskError::Forbidden(format!(
                "agent {agent_id} is not assigned to conversation {conversation_id}"
            )));
        }

        let now = now_timestamp();
        let message = Message {
            id: new_message_id(),
            conversation_id,
            origin: MessageOrigin::Agent,
            sender_id: Some(agent_id.to_string()),
            sender_name: None,
            body: body.to_string(),
            reply_source: None,
            confidence: None,
            read: false,
            created_at: now.clone(),
        };
        messages::insert(&self.db, &message).await?;
        self.audit
            .record(
                conversation_id,
                Some(agent_id.to_string()),
                ActorRole::Agent,
                &AuditDetail::MessageSent {
                    message_id: message.id.clone(),
                    origin: MessageOrigin::Agent,
                },
                &now,
            )
            .await;
        self.publisher.publish(
            NotifyScope::Conversation(conversation_id),
            Notification::MessageNew {
                conversation_id,
                message: message.clone(),
            },
        );
        Ok(message)
    }

    /// Reassigns an in-service conversation to another agent.
    pub async fn transfer_conversation(
        &self,
        conversation_id: i64,
        from_agent: &str,
        to_agent: &str,
    ) -> Result<(), FrontdeskError> {
        if to_agent.trim().is_empty() {
            return Err(FrontdeskError::Validation(
                "target agent id is required".into(),
            ));
        }
        match conversations::transfer(&self.db, conversation_id, from_agent, to_agent).await? {
            TransferOutcome::Transferred => {}
            TransferOutcome::NotFound => {
                return Err(FrontdeskError::conversation_not_found(conversation_id))
            }
            TransferOutcome::NotInService { status } => {
                return Err(FrontdeskError::InvalidState(format!(
                    "conversation {conversation_id} is not in service (status {status})"
                )));
            }
            TransferOutcome::WrongAgent { current } => {
                return Err(FrontdeskError::Forbidden(format!(
                    "agent {from_agent} is not assigned to conversation {conversation_id} \
                     (assigned: {})",
                    current.as_deref().unwrap_or("none")
                )));
            }
        }
        info!(conversation_id, from_agent, to_agent, "conversation transferred");

        let now = now_timestamp();
        self.audit
            .record(
                conversation_id,
                Some(from_agent.to_string()),
                ActorRole::Agent,
                &AuditDetail::AgentTransferred {
                    from_agent: from_agent.to_string(),
                    to_agent: to_agent.to_string(),
                },
                &now,
            )
            .await;
        self.post_system_message(
            conversation_id,
            "Your conversation was transferred to another agent.",
        )
        .await;
        self.publisher.publish(
            NotifyScope::Conversation(conversation_id),
            Notification::AgentJoined {
                conversation_id,
                agent_id: to_agent.to_string(),
            },
        );
        Ok(())
    }

    /// Closes a conversation. Double-close is rejected, not absorbed.
    pub async fn close_conversation(
        &self,
        conversation_id: i64,
        closer: &SenderContext,
        reason: Option<String>,
    ) -> Result<(), FrontdeskError> {
        let now = now_timestamp();
        let removed_queue_entry =
            match conversations::close(&self.db, conversation_id, &now).await? {
                CloseOutcome::Closed {
                    removed_queue_entry,
                } => removed_queue_entry,
                CloseOutcome::NotFound => {
                    return Err(FrontdeskError::conversation_not_found(conversation_id))
                }
                CloseOutcome::AlreadyClosed => {
                    return Err(FrontdeskError::InvalidState(format!(
                        "conversation {conversation_id} is already closed"
                    )));
                }
            };
        info!(conversation_id, "conversation closed");

        self.audit
            .record(
                conversation_id,
                closer.actor_id.clone(),
                closer.role,
                &AuditDetail::ConversationClosed {
                    reason: reason.clone(),
                },
                &now,
            )
            .await;
        self.post_system_message(conversation_id, "This conversation has been closed.")
            .await;
        self.publisher.publish(
            NotifyScope::Conversation(conversation_id),
            Notification::ConversationClosed {
                conversation_id,
                reason,
            },
        );
        if removed_queue_entry {
            self.publisher.publish(
                NotifyScope::AgentPool,
                Notification::QueueUpdated {
                    queue_size: self.queue.size().await.unwrap_or(0),
                },
            );
        }
        Ok(())
    }

    /// Records a post-service rating. At most one per conversation.
    pub async fn record_rating(
        &self,
        conversation_id: i64,
        score: u8,
        comment: Option<String>,
    ) -> Result<Rating, FrontdeskError> {
        if !(1..=5).contains(&score) {
            return Err(FrontdeskError::Validation(format!(
                "rating score must be between 1 and 5, got {score}"
            )));
        }
        let conversation = conversations::get(&self.db, conversation_id)
            .await?
            .ok_or_else(|| FrontdeskError::conversation_not_found(conversation_id))?;

        let now = now_timestamp();
        let rating = Rating {
            conversation_id,
            score,
            comment,
            created_at: now.clone(),
        };
        ratings::insert(&self.db, &rating).await?;

        let actor_role = conversation
            .participant()
            .map(|p| p.actor_role())
            .unwrap_or(ActorRole::System);
        self.audit
            .record(
                conversation_id,
                None,
                actor_role,
                &AuditDetail::RatingSubmitted { score },
                &now,
            )
            .await;
        Ok(rating)
    }

    /// Issues a signed, expiring token for a visitor conversation so the
    /// visitor can keep posting without an account.
    pub fn issue_visitor_token(
        &self,
        conversation: &Conversation,
    ) -> Result<String, FrontdeskError> {
        let secret = self.config.token.secret.as_deref().ok_or_else(|| {
            FrontdeskError::Config("visitor token secret is not configured".into())
        })?;
        let email = conversation.visitor_email.as_deref().ok_or_else(|| {
            FrontdeskError::Validation("conversation has no visitor email".into())
        })?;
        token::issue(
            secret.as_bytes(),
            conversation.id,
            email,
            Utc::now(),
            Duration::from_secs(self.config.token.ttl_secs),
        )
    }

    /// Verifies a visitor token and returns its claims.
    pub fn verify_visitor_token(&self, raw: &str) -> Result<VisitorClaims, FrontdeskError> {
        let secret = self.config.token.secret.as_deref().ok_or_else(|| {
            FrontdeskError::Config("visitor token secret is not configured".into())
        })?;
        token::verify(secret.as_bytes(), raw, Utc::now())
    }

    pub async fn get_conversation(
        &self,
        conversation_id: i64,
    ) -> Result<Conversation, FrontdeskError> {
        conversations::get(&self.db, conversation_id)
            .await?
            .ok_or_else(|| FrontdeskError::conversation_not_found(conversation_id))
    }

    pub async fn list_conversations(
        &self,
        status: Option<ConversationStatus>,
    ) -> Result<Vec<Conversation>, FrontdeskError> {
        conversations::list_by_status(&self.db, status).await
    }

    pub async fn list_messages(
        &self,
        conversation_id: i64,
        limit: Option<i64>,
    ) -> Result<Vec<Message>, FrontdeskError> {
        messages::list_for_conversation(&self.db, conversation_id, limit).await
    }

    /// Unread participant messages, for the agent's badge.
    pub async fn unread_count(&self, conversation_id: i64) -> Result<i64, FrontdeskError> {
        messages::unread_count(&self.db, conversation_id).await
    }

    /// Marks the participant messages of a conversation as read.
    pub async fn mark_messages_read(
        &self,
        conversation_id: i64,
    ) -> Result<usize, FrontdeskError> {
        messages::mark_read(&self.db, conversation_id).await
    }

    pub async fn get_rating(
        &self,
        conversation_id: i64,
    ) -> Result<Option<Rating>, FrontdeskError> {
        ratings::get(&self.db, conversation_id).await
    }

    /// The fallback chain: bounded assistant call, then confident FAQ,
    /// then the fixed default reply. Provider failure is never surfaced.
    async fn automated_reply(
        &self,
        conversation: &Conversation,
        question: &str,
    ) -> Result<Message, FrontdeskError> {
        let (body, source, confidence) = match self.assistant_reply(conversation).await {
            Some(text) => (text, ReplySource::Ai, None),
            None => match self.knowledge.answer(question).await? {
                Some(answer) => (answer.text, ReplySource::Faq, Some(answer.confidence)),
                None => (
                    self.config.service.default_reply.clone(),
                    ReplySource::Default,
                    None,
                ),
            },
        };

        let now = now_timestamp();
        let reply = Message {
            id: new_message_id(),
            conversation_id: conversation.id,
            origin: MessageOrigin::Bot,
            sender_id: None,
            sender_name: Some(self.config.service.name.clone()),
            body,
            reply_source: Some(source),
            confidence,
            read: false,
            created_at: now.clone(),
        };
        messages::insert(&self.db, &reply).await?;
        self.audit
            .record(
                conversation.id,
                None,
                ActorRole::System,
                &AuditDetail::BotMessageSent {
                    message_id: reply.id.clone(),
                    source,
                    confidence,
                },
                &now,
            )
            .await;
        self.publisher.publish(
            NotifyScope::Conversation(conversation.id),
            Notification::MessageNew {
                conversation_id: conversation.id,
                message: reply.clone(),
            },
        );
        Ok(reply)
    }

    /// One bounded assistant call. Any failure or timeout returns `None`
    /// and the caller falls through.
    async fn assistant_reply(&self, conversation: &Conversation) -> Option<String> {
        if !self.config.assistant.enabled {
            return None;
        }
        let assistant = self.assistant.as_ref()?;

        let system_context = match self
            .knowledge
            .system_context(&self.config.service.name)
            .await
        {
            Ok(context) => context,
            Err(e) => {
                warn!(error = %e, "knowledge context unavailable, skipping assistant");
                return None;
            }
        };
        let window = match messages::recent_window(
            &self.db,
            conversation.id,
            self.config.service.history_window as i64,
        )
        .await
        {
            Ok(window) => window,
            Err(e) => {
                warn!(error = %e, "history window unavailable, skipping assistant");
                return None;
            }
        };
        let request = AssistantRequest {
            system_context,
            turns: window
                .into_iter()
                .map(|m| AssistantTurn {
                    origin: m.origin,
                    text: m.body,
                })
                .collect(),
        };

        let budget = Duration::from_secs(self.config.assistant.timeout_secs);
        match tokio::time::timeout(budget, assistant.complete(request)).await {
            Ok(Ok(text)) => Some(text),
            Ok(Err(e)) => {
                warn!(conversation_id = conversation.id, error = %e, "assistant failed, falling through");
                None
            }
            Err(_) => {
                warn!(
                    conversation_id = conversation.id,
                    timeout_secs = self.config.assistant.timeout_secs,
                    "assistant timed out, falling through"
                );
                None
            }
        }
    }

    /// Best-effort system message; failure is logged and swallowed.
    async fn post_system_message(&self, conversation_id: i64, body: &str) {
        let now = now_timestamp();
        let message = Message {
            id: new_message_id(),
            conversation_id,
            origin: MessageOrigin::System,
            sender_id: None,
            sender_name: None,
            body: body.to_string(),
            reply_source: None,
            confidence: None,
            read: false,
            created_at: now,
        };
        if let Err(e) = messages::insert(&self.db, &message).await {
            warn!(conversation_id, error = %e, "system message insert failed, continuing");
            return;
        }
        self.publisher.publish(
            NotifyScope::Conversation(conversation_id),
            Notification::MessageNew {
                conversation_id,
                message,
            },
        );
    }
}
