// SPDX-FileCopyrightText: 2026 Frontdesk Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Audit trail operations: append-only writes, filtered reads.
//!
//! The action tag is derived from the typed detail payload so a record can
//! never carry a detail that disagrees with its action.

use std::str::FromStr;

use frontdesk_core::types::{ActorRole, AuditAction, AuditDetail, AuditRecord};
use frontdesk_core::FrontdeskError;
use rusqlite::params;

use crate::database::{map_tr_err, Database};

const SELECT_COLUMNS: &str =
    "id, conversation_id, action, actor_id, actor_role, detail, created_at";

fn row_to_record(row: &rusqlite::Row<'_>) -> Result<AuditRecord, rusqlite::Error> {
    let action_text: String = row.get(2)?;
    let action = AuditAction::from_str(&action_text).map_err(|_| {
        rusqlite::Error::FromSqlConversionFailure(
            2,
            rusqlite::types::Type::Text,
            format!("unknown audit action: {action_text}").into(),
        )
    })?;
    let role_text: String = row.get(4)?;
    let actor_role = ActorRole::from_str(&role_text).map_err(|_| {
        rusqlite::Error::FromSqlConversionFailure(
            4,
            rusqlite::types::Type::Text,
            format!("unknown actor role: {role_text}").into(),
        )
    })?;
    let detail_text: String = row.get(5)?;
    let detail: AuditDetail = serde_json::from_str(&detail_text).map_err(|e| {
        rusqlite::Error::FromSqlConversionFailure(5, rusqlite::types::Type::Text, Box::new(e))
    })?;
    Ok(AuditRecord {
        id: row.get(0)?,
        conversation_id: row.get(1)?,
        action,
        actor_id: row.get(3)?,
        actor_role,
        detail,
        created_at: row.get(6)?,
    })
}

/// Append one audit record. The action column is derived from `detail`.
pub async fn append(
    db: &Database,
    conversation_id: i64,
    actor_id: Option<String>,
    actor_role: ActorRole,
    detail: &AuditDetail,
    created_at: &str,
) -> Result<i64, FrontdeskError> {
    let action = detail.action();
    let detail_json = serde_json::to_string(detail)
        .map_err(|e| FrontdeskError::Internal(format!("audit detail serialization: {e}")))?;
    let created_at = created_at.to_string();
    db.connection()
        .call(move |conn| {
            conn.execute(
                "INSERT INTO audit_log
                 (conversation_id, action, actor_id, actor_role, detail, created_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
                params![
                    conversation_id,
                    action.to_string(),
                    actor_id,
                    actor_role.to_string(),
                    detail_json,
                    created_at,
                ],
            )?;
            Ok(conn.last_insert_rowid())
        })
        .await
        .map_err(map_tr_err)
}

/// Full trail of one conversation, oldest first.
pub async fn by_conversation(
    db: &Database,
    conversation_id: i64,
) -> Result<Vec<AuditRecord>, FrontdeskError> {
    db.connection()
        .call(move |conn| {
            let mut stmt = conn.prepare(&format!(
                "SELECT {SELECT_COLUMNS} FROM audit_log
                 WHERE conversation_id = ?1 ORDER BY id ASC"
            ))?;
            let rows = stmt.query_map(params![conversation_id], row_to_record)?;
            let mut records = Vec::new();
            for row in rows {
                records.push(row?);
            }
            Ok(records)
        })
        .await
        .map_err(map_tr_err)
}

/// Everything a given actor did, oldest first.
pub async fn by_actor(db: &Database, actor_id: &str) -> Result<Vec<AuditRecord>, FrontdeskError> {
    let actor_id = actor_id.to_string();
    db.connection()
        .call(move |conn| {
            let mut stmt = conn.prepare(&format!(
                "SELECT {SELECT_COLUMNS} FROM audit_log WHERE actor_id = ?1 ORDER BY id ASC"
            ))?;
            let rows = stmt.query_map(params![actor_id], row_to_record)?;
            let mut records = Vec::new();
            for row in rows {
                records.push(row?);
            }
            Ok(records)
        })
        .await
        .map_err(map_tr_err)
}

/// Records inside `[from, to)`, optionally restricted to one action.
pub async fn by_time_range(
    db: &Database,
    from: &str,
    to: &str,
    action: Option<AuditAction>,
) -> Result<Vec<AuditRecord>, FrontdeskError> {
    let from = from.to_string();
    let to = to.to_string();
    db.connection()
        .call(move |conn| {
            let mut records = Vec::new();
            match action {
                Some(action) => {
                    let mut stmt = conn.prepare(&format!(
                        "SELECT {SELECT_COLUMNS} FROM audit_log
                         WHERE created_at >= ?1 AND created_at < ?2 AND action = ?3
                         ORDER BY id ASC"
                    ))?;
                    let rows =
                        stmt.query_map(params![from, to, action.to_string()], row_to_record)?;
                    for row in rows {
                        records.push(row?);
                    }
                }
                None => {
                    let mut stmt = conn.prepare(&format!(
                        "SELECT {SELECT_COLUMNS} FROM audit_log
                         WHERE created_at >= ?1 AND created_at < ?2
                         ORDER BY id ASC"
                    ))?;
                    let rows = stmt.query_map(params![from, to], row_to_record)?;
                    for row in rows {
                        records.push(row?);
                    }
                }
            }
            Ok(records)
        })
        .await
        .map_err(map_tr_err)
}

/// Per-action counts inside `[from, to)`.
pub async fn count_by_action(
    db: &Database,
    from: &str,
    to: &str,
) -> Result<Vec<(AuditAction, i64)>, FrontdeskError> {
    let from = from.to_string();
    let to = to.to_string();
    db.connection()
        .call(move |conn| {
            let mut stmt = conn.prepare(
                "SELECT action, COUNT(*) FROM audit_log
                 WHERE created_at >= ?1 AND created_at < ?2
                 GROUP BY action ORDER BY action ASC",
            )?;
            let rows = stmt.query_map(params![from, to], |row| {
                let action_text: String = row.get(0)?;
                let action = AuditAction::from_str(&action_text).map_err(|_| {
                    rusqlite::Error::FromSqlConversionFailure(
                        0,
                        rusqlite::types::Type::Text,
                        format!("unknown audit action: {action_text}").into(),
                    )
                })?;
                Ok((action, row.get::<_, i64>(1)?))
            })?;
            let mut counts = Vec::new();
            for row in rows {
                counts.push(row?);
            }
            Ok(counts)
        })
        .await
        .map_err(map_tr_err)
}

#[cfg(test)]
mod tests {
    use super::*;
    use frontdesk_core::types::QueuePriority;
    use tempfile::tempdir;

    async fn setup_db() -> (Database, tempfile::TempDir) {
        let dir = tempdir().unwrap();
        let db_path = dir.path().join("test.db");
        let db = Database::open(db_path.to_str().unwrap()).await.unwrap();
        (db, dir)
    }

    #[tokio::test]
    async fn append_and_query_round_trips_typed_detail() {
        let (db, _dir) = setup_db().await;
        let detail = AuditDetail::QueueEntered {
            position: 1,
            priority: QueuePriority::Normal,
        };
        append(
            &db,
            7,
            None,
            ActorRole::Visitor,
            &detail,
            "2026-01-01T00:00:01.000Z",
        )
        .await
        .unwrap();

        let records = by_conversation(&db, 7).await.unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].action, AuditAction::QueueEntered);
        assert_eq!(records[0].detail, detail);
        db.close().await.unwrap();
    }

    #[tokio::test]
    async fn time_range_and_action_filter() {
        let (db, _dir) = setup_db().await;
        let claimed = AuditDetail::AgentClaimed {
            agent_id: "agent-1".into(),
        };
        let closed = AuditDetail::ConversationClosed { reason: None };
        append(
            &db,
            1,
            Some("agent-1".into()),
            ActorRole::Agent,
            &claimed,
            "2026-01-01T10:00:00.000Z",
        )
        .await
        .unwrap();
        append(
            &db,
            1,
            Some("agent-1".into()),
            ActorRole::Agent,
            &closed,
            "2026-01-01T11:00:00.000Z",
        )
        .await
        .unwrap();
        append(
            &db,
            2,
            None,
            ActorRole::System,
            &closed,
            "2026-01-02T09:00:00.000Z",
        )
        .await
        .unwrap();

        let day_one = by_time_range(
            &db,
            "2026-01-01T00:00:00.000Z",
            "2026-01-02T00:00:00.000Z",
            None,
        )
        .await
        .unwrap();
        assert_eq!(day_one.len(), 2);

        let only_closed = by_time_range(
            &db,
            "2026-01-01T00:00:00.000Z",
            "2026-01-03T00:00:00.000Z",
            Some(AuditAction::ConversationClosed),
        )
        .await
        .unwrap();
        assert_eq!(only_closed.len(), 2);
        assert!(only_closed
            .iter()
            .all(|r| r.action == AuditAction::ConversationClosed));

        let by_agent = by_actor(&db, "agent-1").await.unwrap();
        assert_eq!(by_agent.len(), 2);

        let counts = count_by_action(
            &db,
            "2026-01-01T00:00:00.000Z",
            "2026-01-03T00:00:00.000Z",
        )
        .await
        .unwrap();
        assert!(counts.contains(&(AuditAction::AgentClaimed, 1)));
        assert!(counts.contains(&(AuditAction::ConversationClosed, 2)));
        db.close().await.unwrap();
    }
}
