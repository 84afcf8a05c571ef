// SPDX-FileCopyrightText: 2026 Frontdesk Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Wait-queue component.
//!
//! Thin wrapper over the queue storage; the one behavior it adds is that
//! `stats` degrades to zeroed defaults instead of propagating errors, so
//! dashboard statistics can never break a caller.

use std::sync::Arc;

use frontdesk_core::types::{QueueEntry, QueuePriority};
use frontdesk_core::FrontdeskError;
use frontdesk_storage::queries::queue;
pub use frontdesk_storage::queries::queue::{EnqueueOutcome, QueueStats};
use frontdesk_storage::Database;
use tracing::warn;

#[derive(Clone)]
pub struct WaitQueue {
    db: Arc<Database>,
}

impl WaitQueue {
    pub fn new(db: Arc<Database>) -> Self {
        Self { db }
    }

    /// Enqueue a `BOT` conversation, idempotently. The same transaction
    /// re-checks the status and flips it to `AWAITING_AGENT`.
    pub async fn enqueue(
        &self,
        conversation_id: i64,
        priority: QueuePriority,
        now: &str,
    ) -> Result<EnqueueOutcome, FrontdeskError> {
        queue::enqueue(&self.db, conversation_id, priority, now).await
    }

    /// Remove a queue entry. Returns whether one existed.
    pub async fn dequeue(&self, conversation_id: i64) -> Result<bool, FrontdeskError> {
        queue::remove(&self.db, conversation_id).await
    }

    pub async fn peek_next(&self) -> Result<Option<QueueEntry>, FrontdeskError> {
        queue::peek_next(&self.db).await
    }

    pub async fn position_of(
        &self,
        conversation_id: i64,
    ) -> Result<Option<i64>, FrontdeskError> {
        queue::position_of(&self.db, conversation_id).await
    }

    pub async fn list(&self, limit: i64) -> Result<Vec<QueueEntry>, FrontdeskError> {
        queue::list(&self.db, limit).await
    }

    pub async fn size(&self) -> Result<i64, FrontdeskError> {
        queue::size(&self.db).await
    }

    /// Aggregate statistics. Degrades to zeroed defaults on any error.
    pub async fn stats(&self, now: &str) -> QueueStats {
        match queue::stats(&self.db, now).await {
            Ok(stats) => stats,
            Err(e) => {
                warn!(error = %e, "queue stats query failed, returning defaults");
                QueueStats::default()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[tokio::test]
    async fn stats_degrades_to_defaults_when_the_query_fails() {
        let dir = tempdir().unwrap();
        let db_path = dir.path().join("stats.db");
        let db = Arc::new(Database::open(db_path.to_str().unwrap()).await.unwrap());
        let queue = WaitQueue::new(db.clone());

        // Break the query underneath the wrapper.
        db.connection()
            .call(|conn| conn.execute_batch("DROP TABLE wait_queue;"))
            .await
            .unwrap();

        let stats = queue.stats("2026-01-01T00:00:00.000Z").await;
        assert_eq!(stats, QueueStats::default());
    }
}
