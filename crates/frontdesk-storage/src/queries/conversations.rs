// SPDX-FileCopyrightText: 2026 Frontdesk Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Conversation row operations, including the atomic claim/close/transfer
//! transitions.
//!
//! The check-then-act operations (`claim`, `close`, `transfer`) each run as
//! one transaction on the single writer thread, so two concurrent agents can
//! never both observe `AWAITING_AGENT` and both win. The functions return
//! outcome enums rather than raising domain errors; the engine maps outcomes
//! onto the caller-facing error taxonomy.

use std::str::FromStr;

use frontdesk_core::types::{Conversation, ConversationStatus, Participant};
use frontdesk_core::FrontdeskError;
use rusqlite::params;

use crate::database::{map_tr_err, Database};

const SELECT_COLUMNS: &str = "id, user_id, visitor_name, visitor_email, visitor_remote_addr, \
     visitor_user_agent, subject, status, agent_id, created_at, service_started_at, closed_at";

pub(crate) fn row_to_conversation(row: &rusqlite::Row<'_>) -> Result<Conversation, rusqlite::Error> {
    let status_text: String = row.get(7)?;
    let status = ConversationStatus::from_str(&status_text).map_err(|_| {
        rusqlite::Error::FromSqlConversionFailure(
            7,
            rusqlite::types::Type::Text,
            format!("unknown conversation status: {status_text}").into(),
        )
    })?;
    Ok(Conversation {
        id: row.get(0)?,
        user_id: row.get(1)?,
        visitor_name: row.get(2)?,
        visitor_email: row.get(3)?,
        visitor_remote_addr: row.get(4)?,
        visitor_user_agent: row.get(5)?,
        subject: row.get(6)?,
        status,
        agent_id: row.get(8)?,
        created_at: row.get(9)?,
        service_started_at: row.get(10)?,
        closed_at: row.get(11)?,
    })
}

/// Result of an atomic claim attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClaimOutcome {
    /// This agent won: the conversation is now `IN_SERVICE` and the queue
    /// entry is gone.
    Claimed,
    NotFound,
    /// Someone else got there first (claimed or closed).
    NotAvailable { status: ConversationStatus },
}

/// Result of an atomic close attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CloseOutcome {
    Closed { removed_queue_entry: bool },
    NotFound,
    AlreadyClosed,
}

/// Result of the atomic find-or-create for an authenticated user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UserStartOutcome {
    Created(Conversation),
    /// A non-closed conversation already existed; returned unchanged.
    Existing(Conversation),
}

/// Result of an atomic agent transfer attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransferOutcome {
    Transferred,
    NotFound,
    NotInService { status: ConversationStatus },
    WrongAgent { current: Option<String> },
}

/// Create a new conversation in `BOT` state for the given participant.
pub async fn create(
    db: &Database,
    participant: &Participant,
    subject: Option<String>,
    created_at: &str,
) -> Result<Conversation, FrontdeskError> {
    let participant = participant.clone();
    let created_at = created_at.to_string();
    db.connection()
        .call(move |conn| {
            let (user_id, visitor_name, visitor_email, visitor_remote_addr, visitor_user_agent) =
                match &participant {
                    Participant::User { user_id, .. } => {
                        (Some(user_id.clone()), None, None, None, None)
                    }
                    Participant::Visitor {
                        name,
                        email,
                        remote_addr,
                        user_agent,
                    } => (
                        None,
                        Some(name.clone()),
                        Some(email.clone()),
                        remote_addr.clone(),
                        user_agent.clone(),
                    ),
                };
            conn.execute(
                "INSERT INTO conversations
                 (user_id, visitor_name, visitor_email, visitor_remote_addr, visitor_user_agent,
                  subject, status, created_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, 'BOT', ?7)",
                params![
                    user_id,
                    visitor_name,
                    visitor_email,
                    visitor_remote_addr,
                    visitor_user_agent,
                    subject,
                    created_at,
                ],
            )?;
            let id = conn.last_insert_rowid();
            let mut stmt = conn.prepare(&format!(
                "SELECT {SELECT_COLUMNS} FROM conversations WHERE id = ?1"
            ))?;
            let conversation = stmt.query_row(params![id], row_to_conversation)?;
            Ok(conversation)
        })
        .await
        .map_err(map_tr_err)
}

/// Get a conversation by id.
pub async fn get(db: &Database, id: i64) -> Result<Option<Conversation>, FrontdeskError> {
    db.connection()
        .call(move |conn| {
            let mut stmt = conn.prepare(&format!(
                "SELECT {SELECT_COLUMNS} FROM conversations WHERE id = ?1"
            ))?;
            let result = stmt.query_row(params![id], row_to_conversation);
            match result {
                Ok(conversation) => Ok(Some(conversation)),
                Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
                Err(e) => Err(e.into()),
            }
        })
        .await
        .map_err(map_tr_err)
}

/// Find the newest non-closed conversation for an authenticated user, or
/// create one in `BOT` state.
///
/// Backs the idempotent-start invariant: at most one open conversation per
/// authenticated participant. Find and create run in one transaction on the
/// single writer, so concurrent starts for the same user observe each other
/// and exactly one can create.
pub async fn find_or_create_for_user(
    db: &Database,
    user_id: &str,
    subject: Option<String>,
    created_at: &str,
) -> Result<UserStartOutcome, FrontdeskError> {
    let user_id = user_id.to_string();
    let created_at = created_at.to_string();
    db.connection()
        .call(move |conn| {
            let tx = conn.transaction()?;

            let existing = {
                let mut stmt = tx.prepare(&format!(
                    "SELECT {SELECT_COLUMNS} FROM conversations
                     WHERE user_id = ?1 AND status != 'CLOSED'
                     ORDER BY created_at DESC LIMIT 1"
                ))?;
                let result = stmt.query_row(params![user_id], row_to_conversation);
                match result {
                    Ok(conversation) => Some(conversation),
                    Err(rusqlite::Error::QueryReturnedNoRows) => None,
                    Err(e) => return Err(e.into()),
                }
            };
            if let Some(conversation) = existing {
                tx.commit()?;
                return Ok(UserStartOutcome::Existing(conversation));
            }

            tx.execute(
                "INSERT INTO conversations (user_id, subject, status, created_at)
                 VALUES (?1, ?2, 'BOT', ?3)",
                params![user_id, subject, created_at],
            )?;
            let id = tx.last_insert_rowid();
            let conversation = {
                let mut stmt = tx.prepare(&format!(
                    "SELECT {SELECT_COLUMNS} FROM conversations WHERE id = ?1"
                ))?;
                stmt.query_row(params![id], row_to_conversation)?
            };
            tx.commit()?;
            Ok(UserStartOutcome::Created(conversation))
        })
        .await
        .map_err(map_tr_err)
}

/// List conversations, optionally filtered by status, newest first.
pub async fn list_by_status(
    db: &Database,
    status: Option<ConversationStatus>,
) -> Result<Vec<Conversation>, FrontdeskError> {
    db.connection()
        .call(move |conn| {
            let mut conversations = Vec::new();
            match status {
                Some(status) => {
                    let mut stmt = conn.prepare(&format!(
                        "SELECT {SELECT_COLUMNS} FROM conversations
                         WHERE status = ?1 ORDER BY created_at DESC"
                    ))?;
                    let rows = stmt.query_map(params![status.to_string()], row_to_conversation)?;
                    for row in rows {
                        conversations.push(row?);
                    }
                }
                None => {
                    let mut stmt = conn.prepare(&format!(
                        "SELECT {SELECT_COLUMNS} FROM conversations ORDER BY created_at DESC"
                    ))?;
                    let rows = stmt.query_map([], row_to_conversation)?;
                    for row in rows {
                        conversations.push(row?);
                    }
                }
            }
            Ok(conversations)
        })
        .await
        .map_err(map_tr_err)
}

/// Atomically claim an `AWAITING_AGENT` conversation for an agent.
///
/// One transaction: re-reads the status, assigns the agent, transitions to
/// `IN_SERVICE`, stamps `service_started_at`, and deletes the queue entry.
/// Exactly one of N concurrent claims can observe `AWAITING_AGENT`.
pub async fn claim(
    db: &Database,
    id: i64,
    agent_id: &str,
    now: &str,
) -> Result<ClaimOutcome, FrontdeskError> {
    let agent_id = agent_id.to_string();
    let now = now.to_string();
    db.connection()
        .call(move |conn| {
            let tx = conn.transaction()?;

            let status = {
                let result = tx.query_row(
                    "SELECT status FROM conversations WHERE id = ?1",
                    params![id],
                    |row| row.get::<_, String>(0),
                );
                match result {
                    Ok(status) => status,
                    Err(rusqlite::Error::QueryReturnedNoRows) => {
                        tx.commit()?;
                        return Ok(ClaimOutcome::NotFound);
                    }
                    Err(e) => return Err(e.into()),
                }
            };

            if status != ConversationStatus::AwaitingAgent.to_string() {
                tx.commit()?;
                let status = ConversationStatus::from_str(&status).map_err(|_| {
                    rusqlite::Error::FromSqlConversionFailure(
                        0,
                        rusqlite::types::Type::Text,
                        format!("unknown conversation status: {status}").into(),
                    )
                })?;
                return Ok(ClaimOutcome::NotAvailable { status });
            }

            tx.execute(
                "UPDATE conversations
                 SET status = 'IN_SERVICE', agent_id = ?1, service_started_at = ?2
                 WHERE id = ?3 AND status = 'AWAITING_AGENT'",
                params![agent_id, now, id],
            )?;
            tx.execute(
                "DELETE FROM wait_queue WHERE conversation_id = ?1",
                params![id],
            )?;
            tx.commit()?;
            Ok(ClaimOutcome::Claimed)
        })
        .await
        .map_err(map_tr_err)
}

/// Atomically reassign an `IN_SERVICE` conversation from one agent to another.
pub async fn transfer(
    db: &Database,
    id: i64,
    from_agent: &str,
    to_agent: &str,
) -> Result<TransferOutcome, FrontdeskError> {
    let from_agent = from_agent.to_string();
    let to_agent = to_agent.to_string();
    db.connection()
        .call(move |conn| {
            let tx = conn.transaction()?;

            let row = {
                let result = tx.query_row(
                    "SELECT status, agent_id FROM conversations WHERE id = ?1",
                    params![id],
                    |row| Ok((row.get::<_, String>(0)?, row.get::<_, Option<String>>(1)?)),
                );
                match result {
                    Ok(row) => row,
                    Err(rusqlite::Error::QueryReturnedNoRows) => {
                        tx.commit()?;
                        return Ok(TransferOutcome::NotFound);
                    }
                    Err(e) => return Err(e.into()),
                }
            };

            let (status_text, current_agent) = row;
            if status_text != ConversationStatus::InService.to_string() {
                tx.commit()?;
                let status = ConversationStatus::from_str(&status_text).map_err(|_| {
                    rusqlite::Error::FromSqlConversionFailure(
                        0,
                        rusqlite::types::Type::Text,
                        format!("unknown conversation status: {status_text}").into(),
                    )
                })?;
                return Ok(TransferOutcome::NotInService { status });
            }
            if current_agent.as_deref() != Some(from_agent.as_str()) {
                tx.commit()?;
                return Ok(TransferOutcome::WrongAgent {
                    current: current_agent,
                });
            }

            tx.execute(
                "UPDATE conversations SET agent_id = ?1 WHERE id = ?2",
                params![to_agent, id],
            )?;
            tx.commit()?;
            Ok(TransferOutcome::Transferred)
        })
        .await
        .map_err(map_tr_err)
}

/// Atomically close a conversation from any non-closed state.
///
/// Removes the queue entry if one exists; double-close is reported, not
/// silently absorbed, so the audit trail stays meaningful.
pub async fn close(db: &Database, id: i64, now: &str) -> Result<CloseOutcome, FrontdeskError> {
    let now = now.to_string();
    db.connection()
        .call(move |conn| {
            let tx = conn.transaction()?;

            let status = {
                let result = tx.query_row(
                    "SELECT status FROM conversations WHERE id = ?1",
                    params![id],
                    |row| row.get::<_, String>(0),
                );
                match result {
                    Ok(status) => status,
                    Err(rusqlite::Error::QueryReturnedNoRows) => {
                        tx.commit()?;
                        return Ok(CloseOutcome::NotFound);
                    }
                    Err(e) => return Err(e.into()),
                }
            };

            if status == ConversationStatus::Closed.to_string() {
                tx.commit()?;
                return Ok(CloseOutcome::AlreadyClosed);
            }

            let removed = tx.execute(
                "DELETE FROM wait_queue WHERE conversation_id = ?1",
                params![id],
            )?;
            tx.execute(
                "UPDATE conversations SET status = 'CLOSED', closed_at = ?1 WHERE id = ?2",
                params![now, id],
            )?;
            tx.commit()?;
            Ok(CloseOutcome::Closed {
                removed_queue_entry: removed > 0,
            })
        })
        .await
        .map_err(map_tr_err)
}
