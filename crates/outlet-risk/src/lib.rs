// SPDX-FileCopyrightText: 2026 Outlet Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Heuristic risk classification for owner-authored messages.
//!
//! A case-insensitive substring match against a fixed list of self-harm and
//! violence phrases. No network, no state, no latency.
//!
//! This is a best-effort trigger for human review. It is not a clinical
//! judgment: it misses anything not on the list and flags quoted or negated
//! phrases the same as sincere ones.

use outlet_core::types::RiskLevel;

/// No phrase matched.
pub const NO_RISK: RiskLevel = 0;

/// A phrase matched.
pub const HIGH_RISK: RiskLevel = 2;

/// Scores at or above this force an escalation on `outlet` sessions.
pub const ESCALATION_THRESHOLD: RiskLevel = 2;

/// Phrases matched case-insensitively anywhere in the message.
const RISK_PHRASES: &[&str] = &[
    // self-harm
    "kill myself",
    "killing myself",
    "end my life",
    "ending my life",
    "take my own life",
    "want to die",
    "wanna die",
    "better off dead",
    "suicide",
    "suicidal",
    "self harm",
    "self-harm",
    "hurt myself",
    "hurting myself",
    "cut myself",
    "cutting myself",
    "no reason to live",
    "don't want to be alive",
    "dont want to be alive",
    // violence toward others
    "kill him",
    "kill her",
    "kill them",
    "kill someone",
    "kill everyone",
    "hurt someone",
    "shoot up",
    "bring a gun",
];

/// Result of classifying one message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RiskAssessment {
    pub level: RiskLevel,
    /// The phrase that triggered the match, if any.
    pub matched: Option<&'static str>,
}

impl RiskAssessment {
    pub fn should_escalate(&self) -> bool {
        should_escalate(self.level)
    }
}

/// Stateless phrase classifier.
#[derive(Debug, Clone, Copy, Default)]
pub struct RiskClassifier;

impl RiskClassifier {
    pub fn new() -> Self {
        Self
    }

    /// Classify a single message's text.
    pub fn assess(&self, text: &str) -> RiskAssessment {
        let lower = normalize(text);
        let matched = RISK_PHRASES
            .iter()
            .copied()
            .find(|phrase| lower.contains(phrase));
        RiskAssessment {
            level: if matched.is_some() { HIGH_RISK } else { NO_RISK },
            matched,
        }
    }

    pub fn score(&self, text: &str) -> RiskLevel {
        self.assess(text).level
    }
}

/// Whether a score reaches the automatic escalation threshold.
pub fn should_escalate(level: RiskLevel) -> bool {
    level >= ESCALATION_THRESHOLD
}

/// Map a score from an outside source onto the discrete `0 | 2` scale.
pub fn discretize(level: RiskLevel) -> RiskLevel {
    if should_escalate(level) {
        HIGH_RISK
    } else {
        NO_RISK
    }
}

/// Lowercase, fold curly apostrophes, and collapse whitespace runs so
/// "Kill   Myself" and "don’t want to be alive" still match.
fn normalize(text: &str) -> String {
    text.split_whitespace()
        .map(|word| word.to_lowercase().replace('\u{2019}', "'"))
        .collect::<Vec<_>>()
        .join(" ")
}
