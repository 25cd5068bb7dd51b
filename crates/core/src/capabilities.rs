// crates/core/src/capabilities.rs
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::{AariResult, DispatchRequest, TaskOutcome};

pub const CONTACTS_NAMESPACE: &str = "contacts";
pub const MEMORIES_NAMESPACE: &str = "memories";
pub const FACTS_NAMESPACE: &str = "learned_facts";
pub const REMINDERS_NAMESPACE: &str = "reminders";

/// Stored contact record, keyed by lower-cased name in the contacts namespace.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Contact {
    pub name: String,
    pub phone: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    pub added_at: DateTime<Utc>,
}

/// Namespaced key-value persistence for contacts, memories and reminders.
///
/// Implementations own their concurrency discipline; callers never assume a
/// filesystem.
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    async fn get(&self, namespace: &str, key: &str) -> AariResult<Option<Value>>;

    async fn put(&self, namespace: &str, key: &str, value: Value) -> AariResult<()>;

    async fn remove(&self, namespace: &str, key: &str) -> AariResult<Option<Value>>;

    /// All entries of a namespace, ordered by key.
    async fn entries(&self, namespace: &str) -> AariResult<Vec<(String, Value)>>;

    /// Maps a spoken contact name to a phone number.
    async fn resolve_contact(&self, name: &str) -> AariResult<Option<String>> {
        let key = name.trim().to_lowercase();
        if key.is_empty() {
            return Ok(None);
        }

        let Some(value) = self.get(CONTACTS_NAMESPACE, &key).await? else {
            return Ok(None);
        };

        let phone = match value {
            Value::String(phone) => Some(phone),
            other => serde_json::from_value::<Contact>(other)
                .ok()
                .map(|contact| contact.phone),
        };

        Ok(phone.filter(|p| !p.trim().is_empty()))
    }
}

/// The single side-effecting surface the router dispatches to.
#[async_trait]
pub trait TaskSink: Send + Sync {
    async fn dispatch(&self, request: &DispatchRequest) -> AariResult<TaskOutcome>;

    fn name(&self) -> &str;
}
