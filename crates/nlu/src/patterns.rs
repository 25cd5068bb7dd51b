// crates/nlu/src/patterns.rs

//! Rule tables used by the entity extractor.
//!
//! Several tables are ordered and the order is significant; the tests in
//! `extractor.rs` pin the cases that break when an order is changed.

use aari_core::{AariError, AariResult};
use regex::{Regex, RegexBuilder};

/// Verb phrases that introduce a contact name, highest priority first.
///
/// Multi-word phrases precede their single-word suffixes so that
/// "send message to john and tell mary" resolves to the phrase closest to
/// the command verb. Call phrases come last: they only apply when no
/// messaging phrase is present.
pub const CONTACT_VERB_PHRASES: &[&str] = &[
    "send message to",
    "send to",
    "tell",
    "message to",
    "text to",
    "text",
    "message",
    "contact",
    "make call to",
    "call",
    "dial",
    "ring",
    "phone",
];

/// Tokens never accepted as a contact name.
pub const CONTACT_STOPWORDS: &[&str] = &[
    "a", "the", "to", "at", "from", "me", "my", "him", "her", "them", "us", "someone",
];

/// Known contacts and relations, tried in order as a last resort.
pub const CONTACT_GAZETTEER: &[&str] = &[
    "john", "mom", "dad", "brother", "sister", "friend", "wife", "husband", "boss", "avnish",
    "alex", "mike", "sarah", "jane", "tom", "jerry", "david", "michael", "jennifer", "lisa",
    "james", "disha", "priya", "amit", "rajesh", "neha", "ravi", "anil",
];

/// Leading words skipped when a message has no explicit separator.
pub const MESSAGE_HEAD_FILLERS: &[&str] = &["my", "the"];

/// Substring triggers for contact and message extraction.
pub const MESSAGE_TRIGGERS: &[&str] = &["send", "message", "whatsapp", "text", "email", "sms"];

/// Extra triggers under which only the contact is extracted.
pub const CALL_TRIGGERS: &[&str] = &["call", "dial", "ring", "phone"];

/// Words after which the message body starts, in priority order.
pub const MESSAGE_KEYWORDS: &[&str] = &[
    "say", "tell", "message", "text", "send", "email", "sms", "whatsapp",
];

/// Separators between contact and message, in priority order.
pub const MESSAGE_SEPARATORS: &[&str] = &["that", "saying", "says", ":"];

/// Prepositions and articles stripped from the front of a message remainder.
pub const LEADING_FILLERS: &[&str] = &["to", "a", "the", "in", "on", "at"];

pub const DOWNLOAD_TRIGGERS: &[&str] = &["download"];
pub const APP_TRIGGERS: &[&str] = &["open", "launch"];
pub const MEDIA_TRIGGERS: &[&str] = &["play"];
pub const REMINDER_TRIGGERS: &[&str] = &["remind", "alarm", "alert"];

/// Words that introduce the reminder text itself.
pub const REMINDER_ANCHORS: &[&str] = &["remind", "reminder", "alarm", "alert"];

/// Leading words dropped from reminder text.
pub const REMINDER_FILLERS: &[&str] = &["me", "to", "about", "for", "that"];

/// Words dropped from file names.
pub const FILE_NAME_FILLERS: &[&str] = &["from", "on", "at"];

/// Closed set of recognised file extensions, longer entries first so "docx"
/// is not reported as "doc".
pub const FILE_TYPES: &[&str] = &["docx", "xlsx", "pdf", "ppt", "doc", "txt", "zip", "mp4"];

/// Applications recognised anywhere in the utterance. Multi-word names first.
pub const KNOWN_APPS: &[&str] = &[
    "file manager",
    "file explorer",
    "windows settings",
    "chrome",
    "firefox",
    "notepad",
    "calculator",
    "spotify",
    "whatsapp",
    "telegram",
    "gmail",
    "email",
];

/// Words that end a media or file phrase (the rest belongs to another step).
pub const PHRASE_TERMINATORS: &[&str] = &["and", "then"];

/// Time anchors in priority order.
pub const TIME_KEYWORDS: &[&str] = &[
    "tomorrow", "today", "tonight", "in", "at", "morning", "evening", "afternoon",
];

/// Words following a time anchor that belong to the expression.
pub const TIME_EXPRESSION_WORDS: usize = 3;

pub const DEFAULT_ALARM_TYPE: &str = "general";

/// Alarm categories in evaluation order.
pub const ALARM_TYPES: &[(&str, &[&str])] = &[
    ("alarm", &["alarm", "alarm clock", "wake me up"]),
    ("reminder", &["remind", "reminder", "alert"]),
    ("notification", &["notify", "notification", "notify me"]),
    ("bedtime", &["bedtime", "sleep", "go to sleep"]),
    ("workout", &["workout", "exercise", "gym"]),
    ("medication", &["medicine", "medication", "pill"]),
    ("meeting", &["meeting", "appointment", "call"]),
    ("study", &["study", "homework", "learning"]),
    ("break", &["break", "rest", "relax"]),
];

/// A compiled `<verb phrase> <name>` rule.
#[derive(Debug, Clone)]
pub struct ContactPattern {
    pub phrase: &'static str,
    pub regex: Regex,
}

/// Compiles [`CONTACT_VERB_PHRASES`] in priority order.
pub fn compile_contact_patterns() -> AariResult<Vec<ContactPattern>> {
    CONTACT_VERB_PHRASES
        .iter()
        .map(|phrase| {
            let verb = phrase
                .split_whitespace()
                .map(regex::escape)
                .collect::<Vec<_>>()
                .join(r"\s+");
            let regex = RegexBuilder::new(&format!(r"\b{}\s+([a-z]+)\b", verb))
                .build()
                .map_err(|e| {
                    AariError::Nlu(format!("Invalid contact pattern '{}': {}", phrase, e))
                })?;
            Ok(ContactPattern { phrase, regex })
        })
        .collect()
}

/// Source of PERSON spans for the second tier of contact extraction.
pub trait NameRecognizer: Send + Sync {
    /// PERSON spans found in the raw (original-case) utterance, in order.
    fn person_spans(&self, raw_text: &str) -> Vec<String>;
}

/// Treats runs of capitalised words that are not sentence-initial as names.
#[derive(Debug, Clone, Default)]
pub struct CapitalizedNameRecognizer;

const NON_NAME_CAPITALS: &[&str] = &["i", "i'm", "i'll", "ok", "okay"];

impl NameRecognizer for CapitalizedNameRecognizer {
    fn person_spans(&self, raw_text: &str) -> Vec<String> {
        let mut spans = Vec::new();
        let mut current: Vec<&str> = Vec::new();

        for (idx, token) in raw_text.split_whitespace().enumerate() {
            let word = token.trim_matches(|c: char| !c.is_alphanumeric() && c != '\'');
            let lower = word.to_lowercase();
            let is_name = idx > 0
                && word.chars().next().map(char::is_uppercase).unwrap_or(false)
                && word.chars().all(|c| c.is_alphabetic() || c == '\'')
                && !NON_NAME_CAPITALS.contains(&lower.as_str())
                && !CONTACT_VERB_PHRASES.contains(&lower.as_str());

            if is_name {
                current.push(word);
            } else if !current.is_empty() {
                spans.push(current.join(" "));
                current.clear();
            }
        }

        if !current.is_empty() {
            spans.push(current.join(" "));
        }

        spans
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn contact_patterns_compile_in_priority_order() {
        let patterns = compile_contact_patterns().unwrap();
        assert_eq!(patterns.len(), CONTACT_VERB_PHRASES.len());
        assert_eq!(patterns[0].phrase, "send message to");
        assert!(patterns[0].regex.is_match("please send  message to john"));
    }

    #[test]
    fn verb_patterns_respect_word_boundaries() {
        let patterns = compile_contact_patterns().unwrap();
        let tell = patterns.iter().find(|p| p.phrase == "tell").unwrap();
        assert!(!tell.regex.is_match("retell story"));
        let ring = patterns.iter().find(|p| p.phrase == "ring").unwrap();
        assert!(!ring.regex.is_match("bring milk"));
    }

    #[test]
    fn capitalised_runs_become_spans() {
        let spans = CapitalizedNameRecognizer.person_spans("Please ping Mary Jane about lunch");
        assert_eq!(spans, vec!["Mary Jane".to_string()]);
    }

    #[test]
    fn sentence_initial_and_pronoun_capitals_are_ignored() {
        let spans = CapitalizedNameRecognizer.person_spans("Tell them I said hi");
        assert!(spans.is_empty());
    }
}
