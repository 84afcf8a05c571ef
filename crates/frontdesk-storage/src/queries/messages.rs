// SPDX-FileCopyrightText: 2026 Frontdesk Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Message operations. Append-only; only the `read` flag is ever updated.

use std::str::FromStr;

use frontdesk_core::types::{Message, MessageOrigin, ReplySource};
use frontdesk_core::FrontdeskError;
use rusqlite::params;

use crate::database::{map_tr_err, Database};

const SELECT_COLUMNS: &str =
    "id, conversation_id, origin, sender_id, sender_name, body, reply_source, confidence, read, created_at";

fn row_to_message(row: &rusqlite::Row<'_>) -> Result<Message, rusqlite::Error> {
    let origin_text: String = row.get(2)?;
    let origin = MessageOrigin::from_str(&origin_text).map_err(|_| {
        rusqlite::Error::FromSqlConversionFailure(
            2,
            rusqlite::types::Type::Text,
            format!("unknown message origin: {origin_text}").into(),
        )
    })?;
    let reply_source = match row.get::<_, Option<String>>(6)? {
        Some(text) => Some(ReplySource::from_str(&text).map_err(|_| {
            rusqlite::Error::FromSqlConversionFailure(
                6,
                rusqlite::types::Type::Text,
                format!("unknown reply source: {text}").into(),
            )
        })?),
        None => None,
    };
    Ok(Message {
        id: row.get(0)?,
        conversation_id: row.get(1)?,
        origin,
        sender_id: row.get(3)?,
        sender_name: row.get(4)?,
        body: row.get(5)?,
        reply_source,
        confidence: row.get(7)?,
        read: row.get::<_, i64>(8)? != 0,
        created_at: row.get(9)?,
    })
}

/// Insert a new message.
pub async fn insert(db: &Database, msg: &Message) -> Result<(), FrontdeskError> {
    let msg = msg.clone();
    db.connection()
        .call(move |conn| {
            conn.execute(
                "INSERT INTO messages
                 (id, conversation_id, origin, sender_id, sender_name, body, reply_source,
                  confidence, read, created_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)",
                params![
                    msg.id,
                    msg.conversation_id,
                    msg.origin.to_string(),
                    msg.sender_id,
                    msg.sender_name,
                    msg.body,
                    msg.reply_source.map(|s| s.to_string()),
                    msg.confidence,
                    msg.read as i64,
                    msg.created_at,
                ],
            )?;
            Ok(())
        })
        .await
        .map_err(map_tr_err)
}

/// Messages of a conversation in insertion order (never reordered on read).
pub async fn list_for_conversation(
    db: &Database,
    conversation_id: i64,
    limit: Option<i64>,
) -> Result<Vec<Message>, FrontdeskError> {
    db.connection()
        .call(move |conn| {
            let mut messages = Vec::new();
            match limit {
                Some(limit) => {
                    let mut stmt = conn.prepare(&format!(
                        "SELECT {SELECT_COLUMNS} FROM messages WHERE conversation_id = ?1
                         ORDER BY created_at ASC, rowid ASC LIMIT ?2"
                    ))?;
                    let rows = stmt.query_map(params![conversation_id, limit], row_to_message)?;
                    for row in rows {
                        messages.push(row?);
                    }
                }
                None => {
                    let mut stmt = conn.prepare(&format!(
                        "SELECT {SELECT_COLUMNS} FROM messages WHERE conversation_id = ?1
                         ORDER BY created_at ASC, rowid ASC"
                    ))?;
                    let rows = stmt.query_map(params![conversation_id], row_to_message)?;
                    for row in rows {
                        messages.push(row?);
                    }
                }
            }
            Ok(messages)
        })
        .await
        .map_err(map_tr_err)
}

/// The most recent `limit` messages, oldest first. Used to build the
/// assistant's history window.
pub async fn recent_window(
    db: &Database,
    conversation_id: i64,
    limit: i64,
) -> Result<Vec<Message>, FrontdeskError> {
    db.connection()
        .call(move |conn| {
            let mut stmt = conn.prepare(&format!(
                "SELECT {SELECT_COLUMNS} FROM messages WHERE conversation_id = ?1
                 ORDER BY created_at DESC, rowid DESC LIMIT ?2"
            ))?;
            let rows = stmt.query_map(params![conversation_id, limit], row_to_message)?;
            let mut messages = Vec::new();
            for row in rows {
                messages.push(row?);
            }
            messages.reverse();
            Ok(messages)
        })
        .await
        .map_err(map_tr_err)
}

/// Count of unread participant messages. Only `VISITOR_OR_USER` origin
/// counts toward an agent's unread badge.
pub async fn unread_count(db: &Database, conversation_id: i64) -> Result<i64, FrontdeskError> {
    db.connection()
        .call(move |conn| {
            let count = conn.query_row(
                "SELECT COUNT(*) FROM messages
                 WHERE conversation_id = ?1 AND origin = 'VISITOR_OR_USER' AND read = 0",
                params![conversation_id],
                |row| row.get::<_, i64>(0),
            )?;
            Ok(count)
        })
        .await
        .map_err(map_tr_err)
}

/// Mark all participant messages of a conversation as read. Returns how
/// many rows changed.
pub async fn mark_read(db: &Database, conversation_id: i64) -> Result<usize, FrontdeskError> {
    db.connection()
        .call(move |conn| {
            let changed = conn.execute(
                "UPDATE messages SET read = 1
                 WHERE conversation_id = ?1 AND origin = 'VISITOR_OR_USER' AND read = 0",
                params![conversation_id],
            )?;
            Ok(changed)
        })
        .await
        .map_err(map_tr_err)
}
