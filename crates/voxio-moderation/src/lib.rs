// SPDX-FileCopyrightText: 2026 Voxio Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Client-side call topic moderation.
//!
//! A fixed blocklist screen applied before a placement request leaves the
//! process. The backend runs its own moderation on top of this, so a topic
//! passing here can still be refused server-side; that refusal comes back
//! through the placement outcome's `message` field.

/// Terms refused outright, matched case-insensitively as substrings.
const BANNED_TERMS: &[&str] = &[
    "kys",
    "kill yourself",
    "suicide",
    "die",
    "death threat",
    "bomb",
    "terrorist",
    "shoot",
    "murder",
    "attack",
];

/// Topics shorter than this (after trimming) are refused.
const MIN_TOPIC_CHARS: usize = 3;

/// Outcome of the pre-flight topic screen.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Verdict {
    Allowed,
    Rejected(String),
}

impl Verdict {
    pub fn is_allowed(&self) -> bool {
        matches!(self, Verdict::Allowed)
    }
}

/// Screen a call topic before placement.
///
/// Premium accounts skip the screen entirely (server-side moderation still
/// applies to them). The blocklist is checked before the length rule, so a
/// banned topic reports the prohibited-content reason even when it is also
/// too short.
pub fn screen_topic(topic: &str, premium: bool) -> Verdict {
    if premium {
        return Verdict::Allowed;
    }

    let lowered = topic.to_lowercase();
    for term in BANNED_TERMS {
        if lowered.contains(term) {
            return Verdict::Rejected(
                "Your topic contains prohibited content. Please choose a different topic."
                    .to_string(),
            );
        }
    }

    if topic.trim().chars().count() < MIN_TOPIC_CHARS {
        return Verdict::Rejected(
            "Please provide a more descriptive topic for your call.".to_string(),
        );
    }

    Verdict::Allowed
}

/// Non-blocking suggestion for sparse topics.
///
/// Returns advice for topics under three words; never refuses anything.
pub fn analyze_topic(topic: &str) -> Option<&'static str> {
    if topic.split_whitespace().count() < 3 {
        return Some("Consider adding more details to your topic for a better conversation.");
    }
    None
}
