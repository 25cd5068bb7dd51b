// crates/nlu/src/extractor.rs

use std::sync::Arc;

use aari_core::{AariResult, EntityKind, EntityMap};
use tracing::debug;

use crate::patterns::{
    compile_contact_patterns, ContactPattern, NameRecognizer, ALARM_TYPES, APP_TRIGGERS,
    CALL_TRIGGERS, CONTACT_GAZETTEER, CONTACT_STOPWORDS, DEFAULT_ALARM_TYPE, DOWNLOAD_TRIGGERS,
    FILE_NAME_FILLERS, FILE_TYPES, KNOWN_APPS, LEADING_FILLERS, MEDIA_TRIGGERS,
    MESSAGE_HEAD_FILLERS, MESSAGE_KEYWORDS, MESSAGE_SEPARATORS, MESSAGE_TRIGGERS,
    PHRASE_TERMINATORS, REMINDER_ANCHORS, REMINDER_FILLERS, REMINDER_TRIGGERS,
    TIME_EXPRESSION_WORDS, TIME_KEYWORDS,
};

/// Rule-cascade entity extractor.
///
/// Every entity kind is gated by a cheap substring trigger and extracted
/// independently; a kind that cannot be found is simply absent from the
/// resulting [`EntityMap`].
pub struct EntityExtractor {
    contact_patterns: Vec<ContactPattern>,
    recognizer: Option<Arc<dyn NameRecognizer>>,
}

impl std::fmt::Debug for EntityExtractor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EntityExtractor")
            .field("contact_patterns", &self.contact_patterns.len())
            .field("recognizer", &self.recognizer.is_some())
            .finish()
    }
}

impl EntityExtractor {
    pub fn new() -> AariResult<Self> {
        Ok(Self {
            contact_patterns: compile_contact_patterns()?,
            recognizer: None,
        })
    }

    pub fn with_recognizer(mut self, recognizer: Arc<dyn NameRecognizer>) -> Self {
        self.recognizer = Some(recognizer);
        self
    }

    pub fn extract(&self, utterance: &str) -> EntityMap {
        let lower = utterance.to_lowercase();
        let mut entities = EntityMap::new();

        let wants_message = contains_any(&lower, MESSAGE_TRIGGERS);
        if wants_message || contains_any(&lower, CALL_TRIGGERS) {
            let contact = self.extract_contact(utterance, &lower);
            if wants_message {
                entities.insert_opt(
                    EntityKind::Message,
                    extract_message(&lower, contact.as_deref()),
                );
            }
            entities.insert_opt(EntityKind::Contact, contact);
        }

        if contains_any(&lower, DOWNLOAD_TRIGGERS) {
            entities.insert_opt(EntityKind::FileName, extract_file_name(&lower));
            entities.insert_opt(EntityKind::FileType, extract_file_type(&lower));
        }

        if contains_any(&lower, APP_TRIGGERS) {
            entities.insert_opt(EntityKind::App, extract_app(&lower));
        }

        if contains_any(&lower, MEDIA_TRIGGERS) {
            entities.insert_opt(EntityKind::Media, extract_media(&lower));
        }

        if contains_any(&lower, REMINDER_TRIGGERS) {
            let time = extract_time(&lower);
            entities.insert_opt(
                EntityKind::ReminderText,
                extract_reminder_text(&lower, time.as_ref().map(|(idx, _)| *idx)),
            );
            entities.insert_opt(EntityKind::Time, time.map(|(_, expr)| expr));
            entities.insert(EntityKind::Type, extract_alarm_type(&lower));
        }

        debug!("Extracted entities from '{}': {:?}", lower, entities);
        entities
    }

    /// Regex rules, then the name recognizer, then the gazetteer.
    pub fn extract_contact(&self, raw: &str, lower: &str) -> Option<String> {
        for pattern in &self.contact_patterns {
            for caps in pattern.regex.captures_iter(lower) {
                if let Some(candidate) = caps.get(1).map(|m| m.as_str()) {
                    if is_contact_candidate(candidate) {
                        return Some(candidate.to_string());
                    }
                }
            }
        }

        if let Some(recognizer) = &self.recognizer {
            let spans = recognizer.person_spans(raw);
            if let Some(span) = spans.first() {
                let last = span
                    .split_whitespace()
                    .last()
                    .map(|w| w.to_lowercase())
                    .unwrap_or_default();
                if is_contact_candidate(&last) {
                    return Some(last);
                }
            }
        }

        CONTACT_GAZETTEER
            .iter()
            .find(|name| !word_positions(lower, name).is_empty())
            .map(|name| name.to_string())
    }
}

fn is_contact_candidate(candidate: &str) -> bool {
    candidate.chars().count() > 1 && !CONTACT_STOPWORDS.contains(&candidate)
}

fn contains_any(text: &str, needles: &[&str]) -> bool {
    needles.iter().any(|needle| text.contains(needle))
}

/// Byte offsets where `needle` occurs bounded by non-alphanumeric characters.
fn word_positions(text: &str, needle: &str) -> Vec<usize> {
    let mut positions = Vec::new();
    if needle.is_empty() {
        return positions;
    }

    let mut from = 0;
    while let Some(found) = text[from..].find(needle) {
        let start = from + found;
        let end = start + needle.len();
        let before_ok = text[..start]
            .chars()
            .next_back()
            .map(|c| !c.is_alphanumeric())
            .unwrap_or(true);
        let after_ok = text[end..]
            .chars()
            .next()
            .map(|c| !c.is_alphanumeric())
            .unwrap_or(true);
        if before_ok && after_ok {
            positions.push(start);
        }
        from = start + needle.len();
    }

    positions
}

fn clean_word(word: &str) -> &str {
    word.trim_matches(|c: char| !c.is_alphanumeric() && c != '\'')
}

fn words(text: &str) -> Vec<&str> {
    text.split_whitespace()
        .map(clean_word)
        .filter(|w| !w.is_empty())
        .collect()
}

fn strip_leading_words<'a>(mut text: &'a str, fillers: &[&str]) -> &'a str {
    loop {
        let trimmed = text.trim_start();
        let first = trimmed.split_whitespace().next().unwrap_or("");
        if !first.is_empty() && fillers.contains(&first) {
            text = &trimmed[first.len()..];
        } else {
            return trimmed;
        }
    }
}

/// Message body following the first send-type keyword.
///
/// The first separator type present (in priority order) splits the remainder
/// at its last occurrence. Without a separator, up to two leading name-like
/// words are skipped.
fn extract_message(lower: &str, contact: Option<&str>) -> Option<String> {
    for keyword in MESSAGE_KEYWORDS {
        for pos in word_positions(lower, keyword) {
            let after = &lower[pos + keyword.len()..];
            if !after.starts_with(char::is_whitespace) {
                continue;
            }

            let remainder = strip_leading_words(after.trim(), LEADING_FILLERS).trim();
            if remainder.chars().count() <= 2 {
                continue;
            }

            if let Some(message) = split_on_separator(remainder) {
                return Some(message);
            }

            if let Some(message) = skip_contact_head(remainder, contact) {
                return Some(message);
            }
        }
    }

    None
}

fn split_on_separator(remainder: &str) -> Option<String> {
    for separator in MESSAGE_SEPARATORS {
        let last = if separator.chars().all(char::is_alphanumeric) {
            word_positions(remainder, separator).last().copied()
        } else {
            remainder.rfind(separator)
        };

        if let Some(pos) = last {
            let tail = remainder[pos + separator.len()..].trim();
            if tail.chars().count() > 1 {
                return Some(tail.to_string());
            }
        }
    }
    None
}

fn skip_contact_head(remainder: &str, contact: Option<&str>) -> Option<String> {
    let tokens: Vec<&str> = remainder.split_whitespace().collect();
    let mut start = 0;
    while start < tokens.len() && start < 2 {
        let word = clean_word(tokens[start]);
        let name_like = CONTACT_GAZETTEER.contains(&word)
            || MESSAGE_HEAD_FILLERS.contains(&word)
            || contact.map(|c| c == word).unwrap_or(false);
        if !name_like {
            break;
        }
        start += 1;
    }

    let message = tokens[start..].join(" ");
    if message.chars().count() > 1 {
        Some(message)
    } else {
        None
    }
}

/// Words after `trigger` up to a conjunction, with `fillers` removed.
fn phrase_after(lower: &str, trigger: &str, fillers: &[&str]) -> Option<String> {
    let tokens = words(lower);
    let idx = tokens.iter().position(|w| *w == trigger)?;
    let phrase = tokens[idx + 1..]
        .iter()
        .take_while(|w| !PHRASE_TERMINATORS.contains(*w))
        .filter(|w| !fillers.contains(*w))
        .copied()
        .collect::<Vec<_>>()
        .join(" ");
    if phrase.is_empty() {
        None
    } else {
        Some(phrase)
    }
}

fn extract_file_name(lower: &str) -> Option<String> {
    phrase_after(lower, "download", FILE_NAME_FILLERS)
}

fn extract_file_type(lower: &str) -> Option<String> {
    let tokens = words(lower);
    FILE_TYPES
        .iter()
        .find(|ext| {
            let dotted = format!(".{}", ext);
            tokens.iter().any(|t| t == *ext || t.ends_with(&dotted))
        })
        .map(|ext| ext.to_string())
}

fn extract_app(lower: &str) -> Option<String> {
    if let Some(app) = KNOWN_APPS
        .iter()
        .find(|app| !word_positions(lower, app).is_empty())
    {
        return Some(app.to_string());
    }

    let tokens = words(lower);
    let idx = tokens.iter().position(|w| APP_TRIGGERS.contains(w))?;
    tokens
        .get(idx + 1)
        .filter(|w| !PHRASE_TERMINATORS.contains(*w))
        .map(|w| w.to_string())
}

fn extract_media(lower: &str) -> Option<String> {
    phrase_after(lower, "play", &[])
}

/// Index of the time anchor among the utterance words plus the expression.
fn extract_time(lower: &str) -> Option<(usize, String)> {
    let tokens = words(lower);
    TIME_KEYWORDS.iter().find_map(|keyword| {
        tokens.iter().position(|w| w == keyword).map(|idx| {
            let end = (idx + 1 + TIME_EXPRESSION_WORDS).min(tokens.len());
            (idx, tokens[idx..end].join(" "))
        })
    })
}

fn extract_reminder_text(lower: &str, time_idx: Option<usize>) -> Option<String> {
    let tokens = words(lower);
    let anchor = tokens
        .iter()
        .position(|w| REMINDER_ANCHORS.iter().any(|a| w.starts_with(a)))?;

    let mut start = skip_reminder_fillers(&tokens, anchor + 1);
    let end = match time_idx {
        Some(idx) if idx > start => idx,
        Some(idx) if idx == start => {
            // Time leads the text ("remind me at 5 to call mom"): resume at
            // the first filler inside the time window, else after it.
            let window_end = (idx + 1 + TIME_EXPRESSION_WORDS).min(tokens.len());
            let resume = (idx + 1..window_end)
                .find(|&i| REMINDER_FILLERS.contains(&tokens[i]))
                .unwrap_or(window_end);
            start = skip_reminder_fillers(&tokens, resume);
            tokens.len()
        }
        _ => tokens.len(),
    };
    if start >= end {
        return None;
    }

    let text = tokens[start..end].join(" ");
    if text.is_empty() {
        None
    } else {
        Some(text)
    }
}

fn skip_reminder_fillers(tokens: &[&str], mut idx: usize) -> usize {
    while idx < tokens.len() && REMINDER_FILLERS.contains(&tokens[idx]) {
        idx += 1;
    }
    idx
}

fn extract_alarm_type(lower: &str) -> String {
    for (category, keywords) in ALARM_TYPES {
        let hit = keywords.iter().any(|keyword| {
            let mut from = 0;
            while let Some(found) = lower[from..].find(keyword) {
                let start = from + found;
                let at_word_start = lower[..start]
                    .chars()
                    .next_back()
                    .map(|c| !c.is_alphanumeric())
                    .unwrap_or(true);
                if at_word_start {
                    return true;
                }
                from = start + keyword.len();
            }
            false
        });
        if hit {
            return category.to_string();
        }
    }
    DEFAULT_ALARM_TYPE.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::patterns::{CapitalizedNameRecognizer, CONTACT_VERB_PHRASES};
    use regex::Regex;

    fn extractor() -> EntityExtractor {
        EntityExtractor::new().unwrap()
    }

    #[test]
    fn message_with_saying_separator() {
        let e = extractor().extract("send message to john saying hello friend");
        assert_eq!(e.get(EntityKind::Contact), Some("john"));
        assert_eq!(e.get(EntityKind::Message), Some("hello friend"));
    }

    #[test]
    fn whatsapp_with_that_separator() {
        let e = extractor().extract("whatsapp mom that i love her so much");
        assert_eq!(e.get(EntityKind::Contact), Some("mom"));
        assert_eq!(e.get(EntityKind::Message), Some("i love her so much"));
    }

    #[test]
    fn message_without_separator_skips_contact_head() {
        let e = extractor().extract("text mom love you");
        assert_eq!(e.get(EntityKind::Contact), Some("mom"));
        assert_eq!(e.get(EntityKind::Message), Some("love you"));
    }

    #[test]
    fn unknown_contact_from_regex_is_skipped_in_message() {
        let e = extractor().extract("send message to zorg see you soon");
        assert_eq!(e.get(EntityKind::Contact), Some("zorg"));
        assert_eq!(e.get(EntityKind::Message), Some("see you soon"));
    }

    #[test]
    fn separator_splits_on_last_occurrence() {
        let e = extractor().extract("tell john that she said that dinner is ready");
        assert_eq!(e.get(EntityKind::Contact), Some("john"));
        assert_eq!(e.get(EntityKind::Message), Some("dinner is ready"));

        let e = extractor().extract("tell john that the plan says go: ship it");
        assert_eq!(e.get(EntityKind::Message), Some("the plan says go: ship it"));
    }

    #[test]
    fn colon_separator() {
        let e = extractor().extract("text dad: running late");
        assert_eq!(e.get(EntityKind::Contact), Some("dad"));
        assert_eq!(e.get(EntityKind::Message), Some("running late"));
    }

    #[test]
    fn multi_word_phrase_outranks_later_single_verb() {
        let e = extractor().extract("send message to john and tell mary");
        assert_eq!(e.get(EntityKind::Contact), Some("john"));
    }

    #[test]
    fn reversed_priority_would_misparse() {
        // Pins why "send message to" must precede "tell".
        let lower = "send message to john and tell mary";
        let tell = Regex::new(r"\btell\s+([a-z]+)\b").unwrap();
        assert_eq!(&tell.captures(lower).unwrap()[1], "mary");
        let tell_pos = CONTACT_VERB_PHRASES.iter().position(|p| *p == "tell").unwrap();
        let send_pos = CONTACT_VERB_PHRASES
            .iter()
            .position(|p| *p == "send message to")
            .unwrap();
        assert!(send_pos < tell_pos);

        let text_pos = CONTACT_VERB_PHRASES.iter().position(|p| *p == "text").unwrap();
        let text_to_pos = CONTACT_VERB_PHRASES.iter().position(|p| *p == "text to").unwrap();
        assert!(text_to_pos < text_pos);
    }

    #[test]
    fn stopwords_fall_through_to_gazetteer() {
        let e = extractor().extract("message my wife happy birthday");
        assert_eq!(e.get(EntityKind::Contact), Some("wife"));
        assert_eq!(e.get(EntityKind::Message), Some("happy birthday"));
    }

    #[test]
    fn gazetteer_requires_whole_words() {
        let e = extractor().extract("send the report tomorrow");
        assert_eq!(e.get(EntityKind::Contact), None);
    }

    #[test]
    fn name_recognizer_is_second_tier() {
        let plain = extractor();
        let with_ner = extractor().with_recognizer(Arc::new(CapitalizedNameRecognizer));
        let utterance = "please email Mary Poppins";
        assert_eq!(plain.extract(utterance).get(EntityKind::Contact), None);
        assert_eq!(
            with_ner.extract(utterance).get(EntityKind::Contact),
            Some("poppins")
        );
    }

    #[test]
    fn call_commands_extract_contact_only() {
        let e = extractor().extract("call mom");
        assert_eq!(e.get(EntityKind::Contact), Some("mom"));
        assert!(!e.contains(EntityKind::Message));

        let e = extractor().extract("call zorg");
        assert_eq!(e.get(EntityKind::Contact), Some("zorg"));
    }

    #[test]
    fn reminder_with_relative_time() {
        let e = extractor().extract("remind me to buy milk in 10 minutes");
        assert!(e.get(EntityKind::ReminderText).unwrap().contains("buy milk"));
        assert!(e.get(EntityKind::Time).unwrap().contains("in 10 minutes"));
        assert_eq!(e.get(EntityKind::Type), Some("reminder"));
    }

    #[test]
    fn time_expression_is_anchor_plus_three_words() {
        let e = extractor().extract("remind me to stretch tomorrow morning at nine sharp please");
        assert_eq!(e.get(EntityKind::Time), Some("tomorrow morning at nine"));
        assert_eq!(e.get(EntityKind::ReminderText), Some("stretch"));
    }

    #[test]
    fn leading_time_is_not_part_of_the_reminder() {
        let e = extractor().extract("remind me at 5 to call mom");
        assert_eq!(e.get(EntityKind::ReminderText), Some("call mom"));
        assert!(e.get(EntityKind::Time).unwrap().starts_with("at 5"));

        let e = extractor().extract("remind me tomorrow to buy milk");
        assert_eq!(e.get(EntityKind::ReminderText), Some("buy milk"));
        assert_eq!(e.get(EntityKind::Time), Some("tomorrow to buy milk"));
    }

    #[test]
    fn time_keywords_match_whole_words_only() {
        // "in" inside "remind" must not anchor the time expression.
        let e = extractor().extract("remind me to water plants");
        assert_eq!(e.get(EntityKind::Time), None);
        assert_eq!(e.get(EntityKind::ReminderText), Some("water plants"));
    }

    #[test]
    fn alarm_categories() {
        let e = extractor().extract("set an alarm to wake me up tomorrow");
        assert_eq!(e.get(EntityKind::Type), Some("alarm"));

        let e = extractor().extract("alert me to take my medicine tonight");
        assert_eq!(e.get(EntityKind::Type), Some("reminder"));

        let e = extractor().extract("alert me about the gym session");
        assert_eq!(e.get(EntityKind::Type), Some("reminder"));
    }

    #[test]
    fn download_extracts_name_and_type() {
        let e = extractor().extract("download quarterly report pdf from drive");
        assert_eq!(e.get(EntityKind::FileName), Some("quarterly report pdf drive"));
        assert_eq!(e.get(EntityKind::FileType), Some("pdf"));

        let e = extractor().extract("download notes.docx");
        assert_eq!(e.get(EntityKind::FileType), Some("docx"));
    }

    #[test]
    fn download_without_target_omits_keys() {
        let e = extractor().extract("download");
        assert!(e.is_empty());
    }

    #[test]
    fn app_prefers_known_names() {
        let e = extractor().extract("open file manager");
        assert_eq!(e.get(EntityKind::App), Some("file manager"));

        let e = extractor().extract("launch blender");
        assert_eq!(e.get(EntityKind::App), Some("blender"));
    }

    #[test]
    fn media_phrase_stops_at_conjunction() {
        let e = extractor().extract("play bohemian rhapsody and then call mom");
        assert_eq!(e.get(EntityKind::Media), Some("bohemian rhapsody"));
    }

    #[test]
    fn unrelated_utterance_has_no_entities() {
        assert!(extractor().extract("what is the capital of france").is_empty());
    }

    #[test]
    fn extraction_is_idempotent() {
        let extractor = extractor();
        for utterance in [
            "send message to john saying hello friend",
            "remind me to buy milk in 10 minutes",
            "download report.pdf",
            "Play Jazz",
        ] {
            assert_eq!(extractor.extract(utterance), extractor.extract(utterance));
        }
    }

    #[test]
    fn keys_stay_within_the_fixed_set() {
        let extractor = extractor();
        for utterance in [
            "send message to john saying hello and open chrome and play music",
            "download the pdf and remind me at 5 to call mom",
            "",
            "!!!",
        ] {
            let e = extractor.extract(utterance);
            assert!(e.kinds().all(|k| EntityKind::ALL.contains(&k)));
            assert!(e.iter().all(|(_, v)| !v.is_empty()));
        }
    }
}
