// SPDX-FileCopyrightText: 2026 Frontdesk Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Wait-queue operations.
//!
//! Positions are strictly increasing and assigned inside the same
//! transaction that inserts the entry and flips the conversation to
//! `AWAITING_AGENT`, so concurrent enqueues can never be handed the same
//! position and a queue entry exists iff its conversation is waiting.
//! The transaction re-reads the conversation's status and only admits
//! `BOT` conversations, so a close committing in between can never be
//! undone by an enqueue.

use std::str::FromStr;

use frontdesk_core::types::{ConversationStatus, QueueEntry, QueuePriority};
use frontdesk_core::FrontdeskError;
use rusqlite::params;
use serde::Serialize;

use crate::database::{map_tr_err, Database};

/// Result of an enqueue attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EnqueueOutcome {
    Entered(QueueEntry),
    /// An entry already existed; returned unchanged (idempotent).
    AlreadyQueued(QueueEntry),
    NotFound,
    /// The conversation is past the automated phase (claimed or closed).
    NotWaitable { status: ConversationStatus },
}

impl EnqueueOutcome {
    /// The queue entry, for the two queued variants.
    pub fn entry(&self) -> Option<&QueueEntry> {
        match self {
            EnqueueOutcome::Entered(entry) | EnqueueOutcome::AlreadyQueued(entry) => Some(entry),
            EnqueueOutcome::NotFound | EnqueueOutcome::NotWaitable { .. } => None,
        }
    }
}

/// Aggregate queue statistics for dashboards.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct QueueStats {
    pub total: i64,
    pub normal: i64,
    pub high: i64,
    pub urgent: i64,
    pub average_wait_seconds: f64,
}

fn row_to_entry(row: &rusqlite::Row<'_>) -> Result<QueueEntry, rusqlite::Error> {
    let priority_value: i64 = row.get(2)?;
    let priority = QueuePriority::from_i64(priority_value).ok_or_else(|| {
        rusqlite::Error::FromSqlConversionFailure(
            2,
            rusqlite::types::Type::Integer,
            format!("unknown queue priority: {priority_value}").into(),
        )
    })?;
    Ok(QueueEntry {
        conversation_id: row.get(0)?,
        position: row.get(1)?,
        priority,
        enqueued_at: row.get(3)?,
    })
}

/// Enqueue a conversation, assigning the next position.
///
/// One transaction: if an entry exists it is returned unchanged; otherwise
/// the status is re-read (only `BOT` conversations may enter, mirroring the
/// guards in `claim` and `close`), the next position (`MAX(position) + 1`)
/// is computed, the entry inserted, and the conversation transitioned to
/// `AWAITING_AGENT`, all atomically on the single writer.
pub async fn enqueue(
    db: &Database,
    conversation_id: i64,
    priority: QueuePriority,
    now: &str,
) -> Result<EnqueueOutcome, FrontdeskError> {
    let now = now.to_string();
    db.connection()
        .call(move |conn| {
            let tx = conn.transaction()?;

            let existing = {
                let result = tx.query_row(
                    "SELECT conversation_id, position, priority, enqueued_at
                     FROM wait_queue WHERE conversation_id = ?1",
                    params![conversation_id],
                    row_to_entry,
                );
                match result {
                    Ok(entry) => Some(entry),
                    Err(rusqlite::Error::QueryReturnedNoRows) => None,
                    Err(e) => return Err(e.into()),
                }
            };
            if let Some(entry) = existing {
                tx.commit()?;
                return Ok(EnqueueOutcome::AlreadyQueued(entry));
            }

            let status = {
                let result = tx.query_row(
                    "SELECT status FROM conversations WHERE id = ?1",
                    params![conversation_id],
                    |row| row.get::<_, String>(0),
                );
                match result {
                    Ok(status) => status,
                    Err(rusqlite::Error::QueryReturnedNoRows) => {
                        tx.commit()?;
                        return Ok(EnqueueOutcome::NotFound);
                    }
                    Err(e) => return Err(e.into()),
                }
            };
            if status != ConversationStatus::Bot.to_string() {
                tx.commit()?;
                let status = ConversationStatus::from_str(&status).map_err(|_| {
                    rusqlite::Error::FromSqlConversionFailure(
                        0,
                        rusqlite::types::Type::Text,
                        format!("unknown conversation status: {status}").into(),
                    )
                })?;
                return Ok(EnqueueOutcome::NotWaitable { status });
            }

            let position: i64 = tx.query_row(
                "SELECT COALESCE(MAX(position), 0) + 1 FROM wait_queue",
                [],
                |row| row.get(0),
            )?;
            tx.execute(
                "INSERT INTO wait_queue (conversation_id, position, priority, enqueued_at)
                 VALUES (?1, ?2, ?3, ?4)",
                params![conversation_id, position, priority.as_i64(), now],
            )?;
            tx.execute(
                "UPDATE conversations SET status = 'AWAITING_AGENT' WHERE id = ?1",
                params![conversation_id],
            )?;
            tx.commit()?;

            Ok(EnqueueOutcome::Entered(QueueEntry {
                conversation_id,
                position,
                priority,
                enqueued_at: now,
            }))
        })
        .await
        .map_err(map_tr_err)
}

/// Remove a conversation's queue entry. Returns whether one existed.
pub async fn remove(db: &Database, conversation_id: i64) -> Result<bool, FrontdeskError> {
    db.connection()
        .call(move |conn| {
            let removed = conn.execute(
                "DELETE FROM wait_queue WHERE conversation_id = ?1",
                params![conversation_id],
            )?;
            Ok(removed > 0)
        })
        .await
        .map_err(map_tr_err)
}

/// The next entry an agent should serve: priority descending, then strict
/// FIFO by position, restricted to conversations still `AWAITING_AGENT`.
pub async fn peek_next(db: &Database) -> Result<Option<QueueEntry>, FrontdeskError> {
    db.connection()
        .call(move |conn| {
            let result = conn.query_row(
                "SELECT q.conversation_id, q.position, q.priority, q.enqueued_at
                 FROM wait_queue q
                 JOIN conversations c ON c.id = q.conversation_id
                 WHERE c.status = 'AWAITING_AGENT'
                 ORDER BY q.priority DESC, q.position ASC
                 LIMIT 1",
                [],
                row_to_entry,
            );
            match result {
                Ok(entry) => Ok(Some(entry)),
                Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
                Err(e) => Err(e.into()),
            }
        })
        .await
        .map_err(map_tr_err)
}

/// Current position of a conversation, if queued.
pub async fn position_of(
    db: &Database,
    conversation_id: i64,
) -> Result<Option<i64>, FrontdeskError> {
    db.connection()
        .call(move |conn| {
            let result = conn.query_row(
                "SELECT position FROM wait_queue WHERE conversation_id = ?1",
                params![conversation_id],
                |row| row.get::<_, i64>(0),
            );
            match result {
                Ok(position) => Ok(Some(position)),
                Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
                Err(e) => Err(e.into()),
            }
        })
        .await
        .map_err(map_tr_err)
}

/// Ordered snapshot for display.
pub async fn list(db: &Database, limit: i64) -> Result<Vec<QueueEntry>, FrontdeskError> {
    db.connection()
        .call(move |conn| {
            let mut stmt = conn.prepare(
                "SELECT q.conversation_id, q.position, q.priority, q.enqueued_at
                 FROM wait_queue q
                 JOIN conversations c ON c.id = q.conversation_id
                 WHERE c.status = 'AWAITING_AGENT'
                 ORDER BY q.priority DESC, q.position ASC
                 LIMIT ?1",
            )?;
            let rows = stmt.query_map(params![limit], row_to_entry)?;
            let mut entries = Vec::new();
            for row in rows {
                entries.push(row?);
            }
            Ok(entries)
        })
        .await
        .map_err(map_tr_err)
}

/// Count of entries whose conversation is still `AWAITING_AGENT`.
pub async fn size(db: &Database) -> Result<i64, FrontdeskError> {
    db.connection()
        .call(move |conn| {
            let count = conn.query_row(
                "SELECT COUNT(*)
                 FROM wait_queue q
                 JOIN conversations c ON c.id = q.conversation_id
                 WHERE c.status = 'AWAITING_AGENT'",
                [],
                |row| row.get::<_, i64>(0),
            )?;
            Ok(count)
        })
        .await
        .map_err(map_tr_err)
}

/// Aggregate statistics: total, per-priority counts, average wait.
///
/// Raw query path; the engine's queue wrapper degrades failures to zeroed
/// defaults so statistics can never break a caller.
pub async fn stats(db: &Database, now: &str) -> Result<QueueStats, FrontdeskError> {
    let now = now.to_string();
    db.connection()
        .call(move |conn| {
            let (total, normal, high, urgent, average_wait_seconds) = conn.query_row(
                "SELECT COUNT(*),
                        COALESCE(SUM(CASE WHEN q.priority = 1 THEN 1 ELSE 0 END), 0),
                        COALESCE(SUM(CASE WHEN q.priority = 2 THEN 1 ELSE 0 END), 0),
                        COALESCE(SUM(CASE WHEN q.priority = 3 THEN 1 ELSE 0 END), 0),
                        COALESCE(AVG(strftime('%s', ?1) - strftime('%s', q.enqueued_at)), 0.0)
                 FROM wait_queue q
                 JOIN conversations c ON c.id = q.conversation_id
                 WHERE c.status = 'AWAITING_AGENT'",
                params![now],
                |row| {
                    Ok((
                        row.get::<_, i64>(0)?,
                        row.get::<_, i64>(1)?,
                        row.get::<_, i64>(2)?,
                        row.get::<_, i64>(3)?,
                        row.get::<_, f64>(4)?,
                    ))
                },
            )?;
            Ok(QueueStats {
                total,
                normal,
                high,
                urgent,
                average_wait_seconds,
            })
        })
        .await
        .map_err(map_tr_err)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::queries::conversations;
    use frontdesk_core::types::Participant;
    use std::sync::Arc;
    use tempfile::tempdir;

    const NOW: &str = "2026-01-01T00:00:00.000Z";

    async fn setup_db() -> (Database, tempfile::TempDir) {
        let dir = tempdir().unwrap();
        let db_path = dir.path().join("test.db");
        let db = Database::open(db_path.to_str().unwrap()).await.unwrap();
        (db, dir)
    }

    async fn new_conversation(db: &Database, name: &str) -> i64 {
        let participant = Participant::Visitor {
            name: name.to_string(),
            email: format!("{name}@example.com"),
            remote_addr: None,
            user_agent: None,
        };
        conversations::create(db, &participant, None, NOW)
            .await
            .unwrap()
            .id
    }

    #[tokio::test]
    async fn positions_are_strictly_increasing() {
        let (db, _dir) = setup_db().await;
        for expected in 1..=4 {
            let id = new_conversation(&db, &format!("v{expected}")).await;
            let outcome = enqueue(&db, id, QueuePriority::Normal, NOW).await.unwrap();
            assert_eq!(outcome.entry().unwrap().position, expected);
        }
        db.close().await.unwrap();
    }

    #[tokio::test]
    async fn enqueue_is_idempotent() {
        let (db, _dir) = setup_db().await;
        let id = new_conversation(&db, "v").await;

        let first = enqueue(&db, id, QueuePriority::Normal, NOW).await.unwrap();
        let EnqueueOutcome::Entered(entry) = first else {
            panic!("expected Entered");
        };

        // Re-enqueue, even at another priority, returns the entry unchanged.
        let second = enqueue(&db, id, QueuePriority::Urgent, NOW).await.unwrap();
        assert_eq!(second, EnqueueOutcome::AlreadyQueued(entry));
        assert_eq!(size(&db).await.unwrap(), 1);
        db.close().await.unwrap();
    }

    #[tokio::test]
    async fn fifo_within_priority_band() {
        let (db, _dir) = setup_db().await;
        let a = new_conversation(&db, "a").await;
        let b = new_conversation(&db, "b").await;
        let c = new_conversation(&db, "c").await;
        enqueue(&db, a, QueuePriority::Normal, NOW).await.unwrap();
        enqueue(&db, b, QueuePriority::Normal, NOW).await.unwrap();
        enqueue(&db, c, QueuePriority::Normal, NOW).await.unwrap();

        let snapshot = list(&db, 10).await.unwrap();
        let order: Vec<i64> = snapshot.iter().map(|e| e.conversation_id).collect();
        assert_eq!(order, vec![a, b, c]);
        assert_eq!(peek_next(&db).await.unwrap().unwrap().conversation_id, a);
        db.close().await.unwrap();
    }

    #[tokio::test]
    async fn higher_priority_precedes_regardless_of_enqueue_order() {
        let (db, _dir) = setup_db().await;
        let normal = new_conversation(&db, "normal").await;
        let urgent = new_conversation(&db, "urgent").await;
        let high = new_conversation(&db, "high").await;
        enqueue(&db, normal, QueuePriority::Normal, NOW).await.unwrap();
        enqueue(&db, urgent, QueuePriority::Urgent, NOW).await.unwrap();
        enqueue(&db, high, QueuePriority::High, NOW).await.unwrap();

        let snapshot = list(&db, 10).await.unwrap();
        let order: Vec<i64> = snapshot.iter().map(|e| e.conversation_id).collect();
        assert_eq!(order, vec![urgent, high, normal]);
        db.close().await.unwrap();
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn concurrent_enqueues_get_distinct_positions() {
        let dir = tempdir().unwrap();
        let db_path = dir.path().join("concurrent.db");
        let db = Arc::new(Database::open(db_path.to_str().unwrap()).await.unwrap());

        let mut ids = Vec::new();
        for i in 0..10 {
            ids.push(new_conversation(&db, &format!("c{i}")).await);
        }

        let mut handles = Vec::new();
        for id in ids {
            let db = db.clone();
            handles.push(tokio::spawn(async move {
                enqueue(&db, id, QueuePriority::Normal, NOW)
                    .await
                    .unwrap()
                    .entry()
                    .unwrap()
                    .position
            }));
        }

        let mut positions = Vec::new();
        for handle in handles {
            positions.push(handle.await.unwrap());
        }
        positions.sort_unstable();
        assert_eq!(positions, (1..=10).collect::<Vec<i64>>());
        db.close().await.unwrap();
    }

    #[tokio::test]
    async fn enqueue_never_revives_a_settled_conversation() {
        let (db, _dir) = setup_db().await;
        let closed = new_conversation(&db, "closed").await;
        conversations::close(&db, closed, NOW).await.unwrap();

        let outcome = enqueue(&db, closed, QueuePriority::Normal, NOW).await.unwrap();
        assert_eq!(
            outcome,
            EnqueueOutcome::NotWaitable {
                status: ConversationStatus::Closed
            }
        );

        // The close sticks: status and closed_at untouched, no entry.
        let after = conversations::get(&db, closed).await.unwrap().unwrap();
        assert_eq!(after.status, ConversationStatus::Closed);
        assert_eq!(after.closed_at.as_deref(), Some(NOW));
        assert_eq!(size(&db).await.unwrap(), 0);

        let claimed = new_conversation(&db, "claimed").await;
        enqueue(&db, claimed, QueuePriority::Normal, NOW).await.unwrap();
        conversations::claim(&db, claimed, "agent-1", NOW).await.unwrap();
        assert_eq!(
            enqueue(&db, claimed, QueuePriority::Normal, NOW).await.unwrap(),
            EnqueueOutcome::NotWaitable {
                status: ConversationStatus::InService
            }
        );

        assert_eq!(
            enqueue(&db, 9999, QueuePriority::Normal, NOW).await.unwrap(),
            EnqueueOutcome::NotFound
        );
        db.close().await.unwrap();
    }

    #[tokio::test]
    async fn remove_reports_existence() {
        let (db, _dir) = setup_db().await;
        let id = new_conversation(&db, "r").await;
        enqueue(&db, id, QueuePriority::Normal, NOW).await.unwrap();

        assert!(remove(&db, id).await.unwrap());
        assert!(!remove(&db, id).await.unwrap());
        db.close().await.unwrap();
    }

    #[tokio::test]
    async fn stats_aggregates_and_empty_queue_is_zeroed() {
        let (db, _dir) = setup_db().await;

        let empty = stats(&db, NOW).await.unwrap();
        assert_eq!(empty, QueueStats::default());

        let a = new_conversation(&db, "a").await;
        let b = new_conversation(&db, "b").await;
        enqueue(&db, a, QueuePriority::Normal, "2026-01-01T00:00:00.000Z")
            .await
            .unwrap();
        enqueue(&db, b, QueuePriority::Urgent, "2026-01-01T00:00:30.000Z")
            .await
            .unwrap();

        let snapshot = stats(&db, "2026-01-01T00:01:00.000Z").await.unwrap();
        assert_eq!(snapshot.total, 2);
        assert_eq!(snapshot.normal, 1);
        assert_eq!(snapshot.urgent, 1);
        assert!((snapshot.average_wait_seconds - 45.0).abs() < 1.0);
        db.close().await.unwrap();
    }
}
