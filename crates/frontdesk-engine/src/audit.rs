// SPDX-FileCopyrightText: 2026 Frontdesk Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Best-effort audit recording.
//!
//! A failed append is logged and swallowed: the transactional guarantees
//! live in the engine and queue, and a transient audit fault must never
//! fail a committed state transition. Read paths propagate errors normally.

use std::sync::Arc;

use frontdesk_core::types::{ActorRole, AuditAction, AuditDetail, AuditRecord};
use frontdesk_core::FrontdeskError;
use frontdesk_storage::queries::audit;
use frontdesk_storage::Database;
use tracing::warn;

#[derive(Clone)]
pub struct AuditRecorder {
    db: Arc<Database>,
}

impl AuditRecorder {
    pub fn new(db: Arc<Database>) -> Self {
        Self { db }
    }

    /// Appends one record. Never fails the caller.
    pub async fn record(
        &self,
        conversation_id: i64,
        actor_id: Option<String>,
        actor_role: ActorRole,
        detail: &AuditDetail,
        created_at: &str,
    ) {
        if let Err(e) = audit::append(
            &self.db,
            conversation_id,
            actor_id,
            actor_role,
            detail,
            created_at,
        )
        .await
        {
            warn!(
                conversation_id,
                action = %detail.action(),
                error = %e,
                "audit append failed, continuing"
            );
        }
    }

    pub async fn by_conversation(
        &self,
        conversation_id: i64,
    ) -> Result<Vec<AuditRecord>, FrontdeskError> {
        audit::by_conversation(&self.db, conversation_id).await
    }

    pub async fn by_actor(&self, actor_id: &str) -> Result<Vec<AuditRecord>, FrontdeskError> {
        audit::by_actor(&self.db, actor_id).await
    }

    pub async fn by_time_range(
        &self,
        from: &str,
        to: &str,
        action: Option<AuditAction>,
    ) -> Result<Vec<AuditRecord>, FrontdeskError> {
        audit::by_time_range(&self.db, from, to, action).await
    }

    pub async fn count_by_action(
        &self,
        from: &str,
        to: &str,
    ) -> Result<Vec<(AuditAction, i64)>, FrontdeskError> {
        audit::count_by_action(&self.db, from, to).await
    }
}
