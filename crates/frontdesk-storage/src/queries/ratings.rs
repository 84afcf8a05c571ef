// SPDX-FileCopyrightText: 2026 Frontdesk Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Rating operations. The primary-key constraint on `conversation_id`
//! enforces at most one rating per conversation; a duplicate insert maps to
//! `Conflict` so the caller sees "already rated", not a storage fault.

use frontdesk_core::types::Rating;
use frontdesk_core::FrontdeskError;
use rusqlite::params;

use crate::database::{map_constraint_err, map_tr_err, Database};

/// Insert a rating. Fails with `Conflict` if one already exists.
pub async fn insert(db: &Database, rating: &Rating) -> Result<(), FrontdeskError> {
    let rating = rating.clone();
    db.connection()
        .call(move |conn| {
            conn.execute(
                "INSERT INTO ratings (conversation_id, score, comment, created_at)
                 VALUES (?1, ?2, ?3, ?4)",
                params![
                    rating.conversation_id,
                    rating.score as i64,
                    rating.comment,
                    rating.created_at,
                ],
            )?;
            Ok(())
        })
        .await
        .map_err(|e| map_constraint_err(e, "conversation already rated"))
}

/// Get the rating for a conversation, if any.
pub async fn get(db: &Database, conversation_id: i64) -> Result<Option<Rating>, FrontdeskError> {
    db.connection()
        .call(move |conn| {
            let result = conn.query_row(
                "SELECT conversation_id, score, comment, created_at
                 FROM ratings WHERE conversation_id = ?1",
                params![conversation_id],
                |row| {
                    Ok(Rating {
                        conversation_id: row.get(0)?,
                        score: row.get::<_, i64>(1)? as u8,
                        comment: row.get(2)?,
                        created_at: row.get(3)?,
                    })
                },
            );
            match result {
                Ok(rating) => Ok(Some(rating)),
                Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
                Err(e) => Err(e.into()),
            }
        })
        .await
        .map_err(map_tr_err)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::queries::conversations;
    use frontdesk_core::types::Participant;
    use tempfile::tempdir;

    const NOW: &str = "2026-01-01T00:00:00.000Z";

    async fn setup_db_with_conversation() -> (Database, tempfile::TempDir, i64) {
        let dir = tempdir().unwrap();
        let db_path = dir.path().join("test.db");
        let db = Database::open(db_path.to_str().unwrap()).await.unwrap();
        let participant = Participant::Visitor {
            name: "ana".into(),
            email: "ana@x.com".into(),
            remote_addr: None,
            user_agent: None,
        };
        let id = conversations::create(&db, &participant, None, NOW)
            .await
            .unwrap()
            .id;
        (db, dir, id)
    }

    #[tokio::test]
    async fn second_rating_conflicts_and_first_is_unchanged() {
        let (db, _dir, cid) = setup_db_with_conversation().await;
        let first = Rating {
            conversation_id: cid,
            score: 5,
            comment: Some("great".into()),
            created_at: NOW.into(),
        };
        insert(&db, &first).await.unwrap();

        let second = Rating {
            conversation_id: cid,
            score: 1,
            comment: None,
            created_at: NOW.into(),
        };
        let err = insert(&db, &second).await.unwrap_err();
        assert!(matches!(err, FrontdeskError::Conflict(_)));

        let stored = get(&db, cid).await.unwrap().unwrap();
        assert_eq!(stored.score, 5);
        assert_eq!(stored.comment.as_deref(), Some("great"));
        db.close().await.unwrap();
    }

    #[tokio::test]
    async fn missing_rating_is_none() {
        let (db, _dir, cid) = setup_db_with_conversation().await;
        assert!(get(&db, cid).await.unwrap().is_none());
        db.close().await.unwrap();
    }
}
