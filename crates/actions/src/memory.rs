// crates/actions/src/memory.rs

use std::sync::Arc;

use aari_core::{
    AariError, AariResult, Contact, DispatchRequest, HandlerId, KeyValueStore, TaskOutcome,
    CONTACTS_NAMESPACE, FACTS_NAMESPACE, MEMORIES_NAMESPACE,
};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::info;
use uuid::Uuid;

use crate::ActionHandler;

const TITLE_CHARS: usize = 50;
const RECALL_LIMIT: usize = 3;
const TAG_MIN_CHARS: usize = 4;

// Questions opening with "what" classify as queries, so recall phrasing has
// to avoid them.
const RECALL_PHRASES: &[&str] = &["remind me about", "do you remember", "recall"];
const REMEMBER_PHRASES: &[&str] = &["remember that", "remember", "store", "save", "i said"];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MemoryEntry {
    pub title: String,
    pub content: String,
    pub category: String,
    pub timestamp: DateTime<Utc>,
    #[serde(default)]
    pub tags: Vec<String>,
}

impl MemoryEntry {
    fn matches(&self, query: &str) -> bool {
        self.title.to_lowercase().contains(query)
            || self.content.to_lowercase().contains(query)
            || self.tags.iter().any(|t| t.contains(query))
    }
}

/// First `TITLE_CHARS` characters of `text`.
pub fn memory_title(text: &str) -> String {
    text.chars().take(TITLE_CHARS).collect()
}

/// Memories, learned facts and contacts on top of a
/// [`KeyValueStore`].
#[derive(Clone)]
pub struct MemoryBook {
    store: Arc<dyn KeyValueStore>,
}

impl MemoryBook {
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self { store }
    }

    pub async fn remember(&self, title: &str, content: &str, category: &str) -> AariResult<String> {
        let now = Utc::now();
        let entry = MemoryEntry {
            title: title.to_string(),
            content: content.to_string(),
            category: category.to_string(),
            timestamp: now,
            tags: content
                .to_lowercase()
                .split_whitespace()
                .filter(|w| w.chars().count() >= TAG_MIN_CHARS)
                .map(str::to_string)
                .collect(),
        };

        // Time-prefixed keys keep namespace order chronological.
        let key = format!("{}-{}", now.format("%Y%m%dT%H%M%S%.6f"), Uuid::new_v4());
        self.store
            .put(MEMORIES_NAMESPACE, &key, serde_json::to_value(&entry)?)
            .await?;

        info!("Memory stored: {}", title);
        Ok(format!("I'll remember: {}", title))
    }

    /// Memories and learned facts whose text contains `query`, oldest first.
    pub async fn recall(&self, query: &str) -> AariResult<Vec<MemoryEntry>> {
        let query = query.trim().to_lowercase();
        let mut results = Vec::new();

        for (_, value) in self.store.entries(MEMORIES_NAMESPACE).await? {
            if let Ok(entry) = serde_json::from_value::<MemoryEntry>(value) {
                if entry.matches(&query) {
                    results.push(entry);
                }
            }
        }

        for (fact, value) in self.store.entries(FACTS_NAMESPACE).await? {
            let value = match value {
                Value::String(s) => s,
                other => other.to_string(),
            };
            if fact.contains(&query) || value.to_lowercase().contains(&query) {
                results.push(MemoryEntry {
                    content: format!("{} is {}", fact, value),
                    title: fact,
                    category: "learned_fact".to_string(),
                    timestamp: DateTime::<Utc>::default(),
                    tags: Vec::new(),
                });
            }
        }

        Ok(results)
    }

    pub async fn learn_fact(&self, fact: &str, value: &str) -> AariResult<String> {
        let fact = fact.trim().to_lowercase();
        self.store
            .put(FACTS_NAMESPACE, &fact, Value::String(value.trim().to_string()))
            .await?;
        info!("Learned fact: {} = {}", fact, value);
        Ok(format!("I've learned: {}", fact))
    }

    pub async fn add_contact(&self, name: &str, phone: &str, email: Option<&str>) -> AariResult<String> {
        let name = name.trim();
        if name.is_empty() || phone.trim().is_empty() {
            return Err(AariError::InvalidInput(
                "A contact needs a name and a phone number".to_string(),
            ));
        }

        let contact = Contact {
            name: name.to_string(),
            phone: phone.trim().to_string(),
            email: email.map(str::to_string),
            added_at: Utc::now(),
        };
        self.store
            .put(
                CONTACTS_NAMESPACE,
                &name.to_lowercase(),
                serde_json::to_value(&contact)?,
            )
            .await?;
        info!("Contact added: {}", name);
        Ok(format!("Contact saved: {}", name))
    }

    pub async fn contacts(&self) -> AariResult<Vec<Contact>> {
        Ok(self
            .store
            .entries(CONTACTS_NAMESPACE)
            .await?
            .into_iter()
            .filter_map(|(_, value)| serde_json::from_value(value).ok())
            .collect())
    }
}

/// Memory operation requested by an utterance. `None` payloads mean the
/// operation was recognised but its subject is missing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MemoryCommand {
    Recall(Option<String>),
    Learn(Option<(String, String)>),
    Remember(Option<String>),
    Unsupported,
}

impl MemoryCommand {
    pub fn parse(utterance: &str) -> Self {
        let lower = utterance.trim().to_lowercase();

        if let Some(query) = text_after_phrase(&lower, RECALL_PHRASES) {
            return MemoryCommand::Recall(non_empty(query));
        }

        if let Some(rest) = text_after_phrase(&lower, &["learn"]) {
            let rest = rest.strip_prefix("that ").unwrap_or(rest);
            let fact = rest
                .split_once(" is ")
                .map(|(fact, value)| (fact.trim().to_string(), value.trim().to_string()))
                .filter(|(fact, value)| !fact.is_empty() && !value.is_empty());
            return MemoryCommand::Learn(fact);
        }

        if let Some(content) = text_after_phrase(&lower, REMEMBER_PHRASES) {
            return MemoryCommand::Remember(non_empty(content));
        }

        MemoryCommand::Unsupported
    }

    /// Question asked when the subject is missing.
    pub fn clarification(&self) -> Option<&'static str> {
        match self {
            MemoryCommand::Remember(None) => Some("What would you like me to remember?"),
            MemoryCommand::Recall(None) => Some("What would you like me to recall?"),
            MemoryCommand::Learn(None) => Some(
                "Tell me the fact and what it is, for example: 'learn that my birthday is January 15'",
            ),
            _ => None,
        }
    }
}

/// Text after the last occurrence of the first phrase (in order) present.
fn text_after_phrase<'a>(text: &'a str, phrases: &[&str]) -> Option<&'a str> {
    phrases.iter().find_map(|phrase| {
        text.rfind(phrase)
            .map(|pos| text[pos + phrase.len()..].trim().trim_end_matches('?').trim())
    })
}

fn non_empty(text: &str) -> Option<String> {
    let text = text.trim();
    if text.is_empty() {
        None
    } else {
        Some(text.to_string())
    }
}

pub struct MemoryActions {
    book: MemoryBook,
}

impl MemoryActions {
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self {
            book: MemoryBook::new(store),
        }
    }
}

#[async_trait]
impl ActionHandler for MemoryActions {
    fn can_handle(&self, handler: HandlerId) -> bool {
        handler == HandlerId::Memory
    }

    async fn execute(&self, request: &DispatchRequest) -> AariResult<TaskOutcome> {
        match MemoryCommand::parse(&request.utterance) {
            MemoryCommand::Remember(Some(content)) => {
                let message = self
                    .book
                    .remember(&memory_title(&content), &content, "important")
                    .await?;
                Ok(TaskOutcome::success(message))
            }
            MemoryCommand::Recall(Some(query)) => {
                let memories = self.book.recall(&query).await?;
                if memories.is_empty() {
                    return Ok(TaskOutcome::success(format!(
                        "I don't have any memories about {}",
                        query
                    )));
                }
                let recalled = memories
                    .iter()
                    .take(RECALL_LIMIT)
                    .map(|m| m.content.as_str())
                    .collect::<Vec<_>>()
                    .join("; ");
                Ok(TaskOutcome::success(format!("I remember: {}", recalled)))
            }
            MemoryCommand::Learn(Some((fact, value))) => {
                Ok(TaskOutcome::success(self.book.learn_fact(&fact, &value).await?))
            }
            command => Ok(TaskOutcome::error(
                command
                    .clarification()
                    .unwrap_or("I'm not sure what memory operation you want"),
            )),
        }
    }

    fn name(&self) -> &str {
        "MemoryActions"
    }
}
