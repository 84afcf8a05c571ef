// SPDX-FileCopyrightText: 2026 Frontdesk Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Keyword-based escalation decision.
//!
//! Deterministic and offline: no model, no network. A message escalates
//! when its normalized lowercase text contains any keyword from the
//! human-request, frustration, or failure-report sets. Keyword sets carry
//! both English and Portuguese spellings since the facility serves both.

/// Keywords that mean the participant is asking for a person.
const HUMAN_REQUEST: &[&str] = &[
    "atendente",
    "humano",
    "human",
    "agent",
    "falar com alguem",
    "falar com alguém",
    "pessoa de verdade",
    "talk to a person",
    "real person",
    "representative",
];

/// Keywords signaling frustration with the automated handling.
const FRUSTRATION: &[&str] = &[
    "frustrado",
    "frustrada",
    "frustrated",
    "absurdo",
    "ridiculo",
    "ridículo",
    "ridiculous",
    "pessimo",
    "péssimo",
    "terrible",
    "inutil",
    "inútil",
    "useless",
];

/// Keywords reporting that something is broken.
const FAILURE_REPORT: &[&str] = &[
    "nao funciona",
    "não funciona",
    "not working",
    "doesn't work",
    "does not work",
    "quebrado",
    "broken",
    "falha",
    "failed",
];

/// Pure keyword classifier deciding whether a message should leave the
/// automated phase.
#[derive(Debug, Clone, Copy, Default)]
pub struct EscalationClassifier;

impl EscalationClassifier {
    pub fn new() -> Self {
        Self
    }

    /// Returns the matched keyword when the message should escalate to a
    /// human, `None` to keep handling automatically.
    pub fn classify(&self, body: &str) -> Option<&'static str> {
        let normalized = body.to_lowercase();
        HUMAN_REQUEST
            .iter()
            .chain(FRUSTRATION)
            .chain(FAILURE_REPORT)
            .find(|keyword| normalized.contains(*keyword))
            .copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn explicit_human_request_escalates() {
        let classifier = EscalationClassifier::new();
        assert_eq!(
            classifier.classify("quero falar com um atendente"),
            Some("atendente")
        );
        assert!(classifier.classify("I want to talk to a real person").is_some());
    }

    #[test]
    fn frustration_and_failure_escalate() {
        let classifier = EscalationClassifier::new();
        assert!(classifier.classify("isso é ridículo").is_some());
        assert!(classifier.classify("the badge reader is NOT WORKING").is_some());
        assert!(classifier.classify("o portão não funciona").is_some());
    }

    #[test]
    fn plain_question_does_not_escalate() {
        let classifier = EscalationClassifier::new();
        assert!(classifier.classify("what time does the pool open?").is_none());
        assert!(classifier.classify("como agendo uma visita?").is_none());
    }

    #[test]
    fn matching_is_case_insensitive() {
        let classifier = EscalationClassifier::new();
        assert!(classifier.classify("HUMANO por favor").is_some());
    }
}
