// SPDX-FileCopyrightText: 2026 Frontdesk Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Knowledge base (FAQ) entry operations.

use frontdesk_core::types::FaqEntry;
use frontdesk_core::FrontdeskError;
use rusqlite::params;

use crate::database::{map_tr_err, Database};

const SELECT_COLUMNS: &str = "id, question, answer, keywords, active, usage_count, created_at";

fn row_to_entry(row: &rusqlite::Row<'_>) -> Result<FaqEntry, rusqlite::Error> {
    Ok(FaqEntry {
        id: row.get(0)?,
        question: row.get(1)?,
        answer: row.get(2)?,
        keywords: row.get(3)?,
        active: row.get::<_, i64>(4)? != 0,
        usage_count: row.get(5)?,
        created_at: row.get(6)?,
    })
}

/// Insert a new entry. Returns its id.
pub async fn insert(
    db: &Database,
    question: &str,
    answer: &str,
    keywords: &str,
    created_at: &str,
) -> Result<i64, FrontdeskError> {
    let question = question.to_string();
    let answer = answer.to_string();
    let keywords = keywords.to_string();
    let created_at = created_at.to_string();
    db.connection()
        .call(move |conn| {
            conn.execute(
                "INSERT INTO faq_entries (question, answer, keywords, created_at)
                 VALUES (?1, ?2, ?3, ?4)",
                params![question, answer, keywords, created_at],
            )?;
            Ok(conn.last_insert_rowid())
        })
        .await
        .map_err(map_tr_err)
}

/// All active entries.
pub async fn list_active(db: &Database) -> Result<Vec<FaqEntry>, FrontdeskError> {
    db.connection()
        .call(move |conn| {
            let mut stmt = conn.prepare(&format!(
                "SELECT {SELECT_COLUMNS} FROM faq_entries WHERE active = 1 ORDER BY id ASC"
            ))?;
            let rows = stmt.query_map([], row_to_entry)?;
            let mut entries = Vec::new();
            for row in rows {
                entries.push(row?);
            }
            Ok(entries)
        })
        .await
        .map_err(map_tr_err)
}

/// Increment the usage counter when an answer is consumed.
pub async fn bump_usage(db: &Database, id: i64) -> Result<(), FrontdeskError> {
    db.connection()
        .call(move |conn| {
            conn.execute(
                "UPDATE faq_entries SET usage_count = usage_count + 1 WHERE id = ?1",
                params![id],
            )?;
            Ok(())
        })
        .await
        .map_err(map_tr_err)
}

/// Activate or retire an entry.
pub async fn set_active(db: &Database, id: i64, active: bool) -> Result<(), FrontdeskError> {
    db.connection()
        .call(move |conn| {
            conn.execute(
                "UPDATE faq_entries SET active = ?1 WHERE id = ?2",
                params![active as i64, id],
            )?;
            Ok(())
        })
        .await
        .map_err(map_tr_err)
}
