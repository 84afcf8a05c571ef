// SPDX-FileCopyrightText: 2026 Frontdesk Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Lifecycle invariants under contention, exercised through the engine.

mod common;

use common::{harness, user, visitor, visitor_sender};
use frontdesk_core::types::ConversationStatus;
use frontdesk_core::FrontdeskError;

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_claims_admit_exactly_one_agent() {
    let h = harness(None).await;
    let started = h
        .engine
        .start_conversation(visitor("Ana", "ana@x.com"), None)
        .await
        .unwrap();
    let id = started.conversation.id;
    h.engine
        .request_human_handoff(id, &visitor_sender("Ana"))
        .await
        .unwrap();

    let mut handles = Vec::new();
    for i in 0..8 {
        let engine = h.engine.clone();
        handles.push(tokio::spawn(async move {
            engine.claim_conversation(id, &format!("agent-{i}")).await
        }));
    }

    let mut winners = Vec::new();
    let mut conflicts = 0;
    for handle in handles {
        match handle.await.unwrap() {
            Ok(conversation) => winners.push(conversation),
            Err(FrontdeskError::Conflict(_)) => conflicts += 1,
            Err(other) => panic!("unexpected error: {other:?}"),
        }
    }
    assert_eq!(winners.len(), 1);
    assert_eq!(conflicts, 7);

    // Exactly one agent assigned, no residual queue entry.
    let conversation = h.engine.get_conversation(id).await.unwrap();
    assert_eq!(conversation.status, ConversationStatus::InService);
    assert_eq!(conversation.agent_id, winners[0].agent_id);
    assert!(conversation.agent_id.is_some());
    assert_eq!(h.engine.queue().size().await.unwrap(), 0);
    assert!(h.engine.queue().position_of(id).await.unwrap().is_none());
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_starts_share_one_conversation_per_user() {
    let h = harness(None).await;

    let mut handles = Vec::new();
    for _ in 0..8 {
        let engine = h.engine.clone();
        handles.push(tokio::spawn(async move {
            engine.start_conversation(user("u-race"), None).await.unwrap()
        }));
    }

    let mut created = 0;
    let mut ids = Vec::new();
    for handle in handles {
        let outcome = handle.await.unwrap();
        if !outcome.already_existing {
            created += 1;
        }
        ids.push(outcome.conversation.id);
    }
    assert_eq!(created, 1);
    assert!(ids.iter().all(|&id| id == ids[0]));

    // Side effects fired once: one greeting, one agent-pool notification.
    let open = h
        .engine
        .list_conversations(Some(ConversationStatus::Bot))
        .await
        .unwrap();
    assert_eq!(open.len(), 1);
    assert_eq!(h.publisher.count_topic("conversation:new"), 1);
}

#[tokio::test]
async fn claim_after_close_is_a_conflict() {
    let h = harness(None).await;
    let started = h
        .engine
        .start_conversation(visitor("Ana", "ana@x.com"), None)
        .await
        .unwrap();
    let id = started.conversation.id;
    h.engine
        .request_human_handoff(id, &visitor_sender("Ana"))
        .await
        .unwrap();

    // The visitor abandons before any agent arrives.
    h.engine
        .close_conversation(
            id,
            &frontdesk_core::types::SenderContext::system(),
            Some("abandoned".into()),
        )
        .await
        .unwrap();

    let err = h.engine.claim_conversation(id, "agent-a").await.unwrap_err();
    assert!(matches!(err, FrontdeskError::Conflict(_)));
}
