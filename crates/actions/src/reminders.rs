// crates/actions/src/reminders.rs

use std::sync::Arc;

use aari_core::{
    AariError, AariResult, DispatchRequest, EntityKind, HandlerId, KeyValueStore, TaskOutcome,
    REMINDERS_NAMESPACE,
};
use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;

use crate::ActionHandler;

/// Scheduled reminder as persisted in the reminders namespace.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScheduledReminder {
    pub id: String,
    pub text: String,
    pub time: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub due_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
}

/// Resolves a spoken time expression relative to `now`.
///
/// Unrecognised expressions default to one hour from now.
pub fn resolve_due_time(expression: &str, now: DateTime<Utc>) -> DateTime<Utc> {
    let expression = expression.to_lowercase();
    let words: Vec<&str> = expression.split_whitespace().collect();

    if words.contains(&"tomorrow") {
        return now + Duration::days(1);
    }
    if words.contains(&"today") {
        return now;
    }
    if words.contains(&"in") {
        for pair in words.windows(2) {
            let Ok(amount) = pair[0].parse::<i64>() else {
                continue;
            };
            if pair[1].starts_with("min") {
                return now + Duration::minutes(amount);
            }
            if pair[1].starts_with("hour") {
                return now + Duration::hours(amount);
            }
            if pair[1].starts_with("day") {
                return now + Duration::days(amount);
            }
        }
    }

    now + Duration::hours(1)
}

pub struct ReminderActions {
    store: Arc<dyn KeyValueStore>,
}

impl ReminderActions {
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self { store }
    }

    /// Reminders whose due time is at or before `now`, earliest first.
    pub async fn due_reminders(&self, now: DateTime<Utc>) -> AariResult<Vec<ScheduledReminder>> {
        let mut due: Vec<ScheduledReminder> = self
            .store
            .entries(REMINDERS_NAMESPACE)
            .await?
            .into_iter()
            .filter_map(|(_, value)| serde_json::from_value::<ScheduledReminder>(value).ok())
            .filter(|reminder| reminder.due_at <= now)
            .collect();
        due.sort_by_key(|reminder| reminder.due_at);
        Ok(due)
    }

    pub async fn dismiss(&self, id: &str) -> AariResult<bool> {
        Ok(self.store.remove(REMINDERS_NAMESPACE, id).await?.is_some())
    }
}

#[async_trait]
impl ActionHandler for ReminderActions {
    fn can_handle(&self, handler: HandlerId) -> bool {
        handler == HandlerId::Reminder
    }

    async fn execute(&self, request: &DispatchRequest) -> AariResult<TaskOutcome> {
        let text = request
            .entities
            .get(EntityKind::ReminderText)
            .ok_or_else(|| AariError::Action("Reminder text not provided".to_string()))?;
        let time = request.entities.get(EntityKind::Time).unwrap_or("");
        let kind = request.entities.get(EntityKind::Type).unwrap_or("general");

        let now = Utc::now();
        let reminder = ScheduledReminder {
            id: Uuid::new_v4().to_string(),
            text: text.to_string(),
            time: time.to_string(),
            kind: kind.to_string(),
            due_at: resolve_due_time(time, now),
            created_at: now,
        };

        self.store
            .put(
                REMINDERS_NAMESPACE,
                &reminder.id,
                serde_json::to_value(&reminder)?,
            )
            .await?;

        info!("Reminder '{}' scheduled for {}", reminder.text, reminder.due_at);
        Ok(TaskOutcome::success(format!(
            "Reminder set for {}",
            reminder.due_at.format("%Y-%m-%d %H:%M")
        )))
    }

    fn name(&self) -> &str {
        "ReminderActions"
    }
}
