// crates/nlu/src/keywords.rs

//! Deterministic keyword-weighted intent scoring.
//!
//! Each keyword contributes 2 points when it appears as a whitespace-bounded
//! word and 1 point when it only appears as a substring. The highest total
//! wins; ties go to the intent registered first in [`STRONG_KEYWORDS`].

use aari_core::Intent;

/// Keyword table in registration order. The order is part of the contract:
/// it decides ties.
pub const STRONG_KEYWORDS: &[(Intent, &[&str])] = &[
    (
        Intent::SendMessage,
        &["send", "message", "whatsapp", "text", "sms", "email", "tell"],
    ),
    (Intent::MakeCall, &["call", "phone", "ring", "dial", "telephone"]),
    (
        Intent::SetReminder,
        &["remind", "reminder", "alarm", "alert", "notification"],
    ),
    (Intent::PlayMedia, &["play", "music", "song", "podcast", "video"]),
    (Intent::DownloadFile, &["download", "fetch", "retrieve", "get"]),
    (Intent::SystemControl, &["open", "launch", "start", "close", "turn"]),
    (Intent::Query, &["what", "when", "where", "how", "why", "search"]),
    (Intent::Memory, &["remember", "recall", "save", "store", "bookmark"]),
    (Intent::Greeting, &["hello", "hi", "hey", "greetings", "morning"]),
];

const WORD_MATCH_POINTS: u32 = 2;
const SUBSTRING_MATCH_POINTS: u32 = 1;

#[derive(Debug, Clone, PartialEq)]
pub struct KeywordMatch {
    pub intent: Intent,
    pub score: u32,
    /// `min(score / (keywords * 2), 1.0)`; zero when nothing matched.
    pub confidence: f32,
}

#[derive(Debug, Clone)]
pub struct KeywordClassifier {
    table: Vec<(Intent, Vec<String>)>,
}

impl Default for KeywordClassifier {
    fn default() -> Self {
        Self::new()
    }
}

impl KeywordClassifier {
    pub fn new() -> Self {
        let table = STRONG_KEYWORDS
            .iter()
            .map(|(intent, keywords)| {
                (
                    *intent,
                    keywords.iter().map(|k| k.to_string()).collect::<Vec<_>>(),
                )
            })
            .collect();
        Self { table }
    }

    /// Scores `text` against one intent's keyword list.
    pub fn score(text: &str, keywords: &[String]) -> u32 {
        let padded = format!(" {} ", text);
        keywords
            .iter()
            .map(|keyword| {
                if padded.contains(&format!(" {} ", keyword)) {
                    WORD_MATCH_POINTS
                } else if text.contains(keyword.as_str()) {
                    SUBSTRING_MATCH_POINTS
                } else {
                    0
                }
            })
            .sum()
    }

    /// Best-scoring intent for an already lower-cased utterance, or `None`
    /// when no keyword of any intent is present.
    pub fn classify(&self, text: &str) -> Option<KeywordMatch> {
        let mut best: Option<(Intent, u32, usize)> = None;

        for (intent, keywords) in &self.table {
            let score = Self::score(text, keywords);
            let better = match best {
                Some((_, best_score, _)) => score > best_score,
                None => score > 0,
            };
            if better {
                best = Some((*intent, score, keywords.len()));
            }
        }

        best.map(|(intent, score, keyword_count)| KeywordMatch {
            intent,
            score,
            confidence: (score as f32 / (keyword_count as f32 * 2.0)).min(1.0),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn whole_words_score_double() {
        let keywords = vec!["call".to_string()];
        assert_eq!(KeywordClassifier::score("call mom", &keywords), 2);
        assert_eq!(KeywordClassifier::score("recall that", &keywords), 1);
        assert_eq!(KeywordClassifier::score("hello", &keywords), 0);
    }

    #[test]
    fn call_mom_scores_make_call_with_rule_confidence() {
        let classifier = KeywordClassifier::new();
        let m = classifier.classify("call mom").unwrap();
        assert_eq!(m.intent, Intent::MakeCall);
        assert_eq!(m.score, 2);
        assert!((m.confidence - 0.2).abs() < f32::EPSILON);
    }

    #[test]
    fn ties_go_to_the_first_registered_intent() {
        // make_call and play_media both score 2; make_call is registered first.
        let classifier = KeywordClassifier::new();
        let m = classifier.classify("play call").unwrap();
        assert_eq!(m.score, 2);
        assert_eq!(m.intent, Intent::MakeCall);
    }

    #[test]
    fn higher_score_beats_registration_order() {
        let classifier = KeywordClassifier::new();
        let m = classifier.classify("play music video").unwrap();
        assert_eq!(m.intent, Intent::PlayMedia);
        assert_eq!(m.score, 6);
        assert!((m.confidence - 0.6).abs() < 1e-6);
    }

    #[test]
    fn confidence_is_capped_at_one() {
        let classifier = KeywordClassifier::new();
        let m = classifier
            .classify("remind reminder alarm alert notification remind")
            .unwrap();
        assert_eq!(m.intent, Intent::SetReminder);
        assert!(m.confidence <= 1.0);
    }

    #[test]
    fn no_keyword_yields_none() {
        let classifier = KeywordClassifier::new();
        assert!(classifier.classify("purple elephants dance").is_none());
        assert!(classifier.classify("").is_none());
    }

    #[test]
    fn table_covers_every_classifiable_intent() {
        let classifier = KeywordClassifier::new();
        for intent in Intent::CLASSIFIABLE {
            assert!(
                classifier.table.iter().any(|(candidate, _)| *candidate == intent),
                "{}",
                intent
            );
        }
    }
}
