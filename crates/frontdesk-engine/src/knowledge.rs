// SPDX-FileCopyrightText: 2026 Frontdesk Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! FAQ knowledge lookup.
//!
//! Scores a free-text question against the active knowledge entries:
//! +3 per configured keyword contained in the question, +1 per question
//! word (length > 2) found in the entry's canonical question text. A hit
//! is confident at score >= 3 and bumps the entry's usage counter when
//! consumed.

use std::sync::Arc;

use frontdesk_core::types::FaqEntry;
use frontdesk_core::FrontdeskError;
use frontdesk_storage::queries::faq;
use frontdesk_storage::Database;

const KEYWORD_WEIGHT: i64 = 3;
const WORD_WEIGHT: i64 = 1;
const CONFIDENT_SCORE: i64 = 3;
const MAX_RESULTS: usize = 5;

const CLOSING_NUDGE: &str =
    "If this doesn't solve it, you can keep asking or request a human agent.";

/// A scored search hit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScoredFaq {
    pub entry: FaqEntry,
    pub score: i64,
}

/// A confident answer ready to be posted as a bot reply.
#[derive(Debug, Clone, PartialEq)]
pub struct FaqAnswer {
    pub entry_id: i64,
    pub text: String,
    pub score: i64,
    /// Score mapped into 0..1 for the message's confidence column.
    pub confidence: f64,
}

/// Knowledge base over the active FAQ entries.
#[derive(Clone)]
pub struct KnowledgeBase {
    db: Arc<Database>,
}

impl KnowledgeBase {
    pub fn new(db: Arc<Database>) -> Self {
        Self { db }
    }

    fn score_entry(entry: &FaqEntry, question_lower: &str) -> i64 {
        let mut score = 0;
        for keyword in entry.keyword_list() {
            if question_lower.contains(&keyword) {
                score += KEYWORD_WEIGHT;
            }
        }
        let entry_question_lower = entry.question.to_lowercase();
        for word in question_lower
            .split(|c: char| !c.is_alphanumeric())
            .filter(|w| w.len() > 2)
        {
            if entry_question_lower.contains(word) {
                score += WORD_WEIGHT;
            }
        }
        score
    }

    /// Top matches with score > 0, best first. Ties keep entry-id order.
    pub async fn search(&self, question: &str) -> Result<Vec<ScoredFaq>, FrontdeskError> {
        let question_lower = question.to_lowercase();
        let entries = faq::list_active(&self.db).await?;
        let mut scored: Vec<ScoredFaq> = entries
            .into_iter()
            .map(|entry| {
                let score = Self::score_entry(&entry, &question_lower);
                ScoredFaq { entry, score }
            })
            .filter(|hit| hit.score > 0)
            .collect();
        scored.sort_by(|a, b| b.score.cmp(&a.score).then(a.entry.id.cmp(&b.entry.id)));
        scored.truncate(MAX_RESULTS);
        Ok(scored)
    }

    /// The confident top hit formatted with a closing nudge, or `None`.
    /// Consuming an answer increments the entry's usage counter.
    pub async fn answer(&self, question: &str) -> Result<Option<FaqAnswer>, FrontdeskError> {
        let hits = self.search(question).await?;
        let Some(top) = hits.first() else {
            return Ok(None);
        };
        if top.score < CONFIDENT_SCORE {
            return Ok(None);
        }
        faq::bump_usage(&self.db, top.entry.id).await?;
        let confidence = (top.score as f64 / 10.0).min(1.0);
        Ok(Some(FaqAnswer {
            entry_id: top.entry.id,
            text: format!("{}\n\n{CLOSING_NUDGE}", top.entry.answer),
            score: top.score,
            confidence,
        }))
    }

    /// Formats the active entries as system context for the assistant.
    pub async fn system_context(&self, service_name: &str) -> Result<String, FrontdeskError> {
        let entries = faq::list_active(&self.db).await?;
        let mut context = format!(
            "You are the support assistant for {service_name}, a facility-management \
             service. Answer briefly and factually. If you cannot help, suggest \
             asking for a human agent.\n\nKnowledge base:"
        );
        for entry in &entries {
            context.push_str(&format!("\nQ: {}\nA: {}", entry.question, entry.answer));
        }
        Ok(context)
    }

    /// Adds a new entry. Returns its id.
    pub async fn add_entry(
        &self,
        question: &str,
        answer: &str,
        keywords: &str,
        now: &str,
    ) -> Result<i64, FrontdeskError> {
        if question.trim().is_empty() || answer.trim().is_empty() {
            return Err(FrontdeskError::Validation(
                "FAQ question and answer must be non-empty".into(),
            ));
        }
        faq::insert(&self.db, question, answer, keywords, now).await
    }

    /// Activates or retires an entry.
    pub async fn set_active(&self, id: i64, active: bool) -> Result<(), FrontdeskError> {
        faq::set_active(&self.db, id, active).await
    }

    pub async fn list_active(&self) -> Result<Vec<FaqEntry>, FrontdeskError> {
        faq::list_active(&self.db).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    const NOW: &str = "2026-01-01T00:00:00.000Z";

    async fn setup() -> (KnowledgeBase, tempfile::TempDir) {
        let dir = tempdir().unwrap();
        let db_path = dir.path().join("kb.db");
        let db = Arc::new(Database::open(db_path.to_str().unwrap()).await.unwrap());
        (KnowledgeBase::new(db), dir)
    }

    #[tokio::test]
    async fn keyword_match_scores_three_per_keyword() {
        let (kb, _dir) = setup().await;
        kb.add_entry(
            "How do I get a visitor badge?",
            "Ask at reception with a photo ID.",
            "badge,visitor",
            NOW,
        )
        .await
        .unwrap();

        let hits = kb.search("where do I pick up my visitor badge").await.unwrap();
        assert_eq!(hits.len(), 1);
        // Two keywords plus the word overlaps ("visitor", "badge").
        assert!(hits[0].score >= 6);
    }

    #[tokio::test]
    async fn word_overlap_alone_scores_one_per_word() {
        let (kb, _dir) = setup().await;
        kb.add_entry(
            "Where is the underground parking entrance?",
            "Level B1, south side.",
            "garage",
            NOW,
        )
        .await
        .unwrap();

        let hits = kb.search("parking entrance").await.unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].score, 2);

        // Below the confidence bar: no answer.
        assert!(kb.answer("parking entrance").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn confident_answer_has_nudge_and_bumps_usage() {
        let (kb, _dir) = setup().await;
        let id = kb
            .add_entry(
                "What are the pool opening hours?",
                "The pool opens 8am to 8pm.",
                "pool,hours",
                NOW,
            )
            .await
            .unwrap();

        let answer = kb.answer("what are the pool hours?").await.unwrap().unwrap();
        assert_eq!(answer.entry_id, id);
        assert!(answer.text.starts_with("The pool opens 8am to 8pm."));
        assert!(answer.text.contains("human agent"));
        assert!(answer.score >= CONFIDENT_SCORE);
        assert!(answer.confidence > 0.0 && answer.confidence <= 1.0);

        let entries = kb.list_active().await.unwrap();
        assert_eq!(entries[0].usage_count, 1);
    }

    #[tokio::test]
    async fn results_ranked_by_score_and_capped() {
        let (kb, _dir) = setup().await;
        kb.add_entry("About badges", "a", "badge", NOW).await.unwrap();
        kb.add_entry("About badges and visitors", "b", "badge,visitor", NOW)
            .await
            .unwrap();
        for i in 0..6 {
            kb.add_entry(&format!("Badge note {i}"), "c", "badge", NOW)
                .await
                .unwrap();
        }

        let hits = kb.search("visitor badge question").await.unwrap();
        assert_eq!(hits.len(), MAX_RESULTS);
        assert_eq!(hits[0].entry.answer, "b");
        for pair in hits.windows(2) {
            assert!(pair[0].score >= pair[1].score);
        }
    }

    #[tokio::test]
    async fn no_match_returns_empty() {
        let (kb, _dir) = setup().await;
        kb.add_entry("Cargo intake schedule", "Weekdays only.", "cargo", NOW)
            .await
            .unwrap();
        assert!(kb.search("xyzzy").await.unwrap().is_empty());
        assert!(kb.answer("xyzzy").await.unwrap().is_none());
    }
}
