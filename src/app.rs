// src/app.rs
use std::collections::VecDeque;
use std::sync::Arc;

use aari_actions::{
    ActionExecutor, ActionStats, CommandRouter, InMemoryStore, JsonFileStore, MemoryBook,
    ReminderActions, RouteDecision, ScheduledReminder,
};
use aari_config::{AariConfig, StoreBackend};
use aari_core::{
    AariError, AariResult, ClassificationResult, Contact, KeyValueStore, TaskSink, TaskStatus,
};
use aari_nlu::NluEngine;
use aari_observability::{MetricType, MetricsCollector};
use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

pub const INVALID_INPUT_REPLY: &str = "I didn't catch that. Could you say it again?";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Speaker {
    User,
    Assistant,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConversationTurn {
    pub speaker: Speaker,
    pub text: String,
    pub timestamp: DateTime<Utc>,
}

/// One utterance and everything the assistant decided about it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssistantResponse {
    pub utterance: String,
    pub reply: String,
    /// Absent when the utterance was rejected before classification.
    pub classification: Option<ClassificationResult>,
    pub decision: Option<RouteDecision>,
}

pub struct AssistantApp {
    config: AariConfig,
    nlu: Arc<NluEngine>,
    router: CommandRouter,
    store: Arc<dyn KeyValueStore>,
    executor: Option<Arc<ActionExecutor>>,
    metrics: Arc<MetricsCollector>,
    history: Mutex<VecDeque<ConversationTurn>>,
}

impl AssistantApp {
    /// Builds the store, the classifier and the action handlers named in
    /// `config`.
    pub async fn new(config: AariConfig) -> AariResult<Self> {
        info!("Initializing aari components...");

        let store = open_store(&config).await?;
        let executor = Arc::new(ActionExecutor::with_config(
            config.actions.clone(),
            store.clone(),
        )?);
        info!("Action handlers: {:?}", executor.handler_names());

        let mut app = Self::with_parts(config, store, executor.clone())?;
        app.executor = Some(executor);
        Ok(app)
    }

    /// Wires the assistant around an existing store and task sink.
    pub fn with_parts(
        config: AariConfig,
        store: Arc<dyn KeyValueStore>,
        sink: Arc<dyn TaskSink>,
    ) -> AariResult<Self> {
        let nlu = Arc::new(NluEngine::new(config.nlu.clone())?);
        let metrics = Arc::new(MetricsCollector::with_config(config.observability.clone())?);
        let router = CommandRouter::new(config.router.clone(), nlu.clone(), store.clone(), sink);

        Ok(Self {
            config,
            nlu,
            router,
            store,
            executor: None,
            metrics,
            history: Mutex::new(VecDeque::new()),
        })
    }

    pub fn config(&self) -> &AariConfig {
        &self.config
    }

    pub fn metrics(&self) -> Arc<MetricsCollector> {
        self.metrics.clone()
    }

    /// Executor counters, when the app owns its handlers.
    pub fn action_stats(&self) -> Option<ActionStats> {
        self.executor.as_ref().map(|executor| executor.stats())
    }

    /// Classifies, routes and records one utterance. Never fails: rejected
    /// input gets a fixed reply.
    pub async fn respond(&self, utterance: &str) -> AssistantResponse {
        let classification = match self.nlu.process(utterance) {
            Ok(classification) => classification,
            Err(e) => {
                match &e {
                    AariError::InvalidInput(reason) => debug!("Rejected utterance: {}", reason),
                    other => warn!("Classification failed: {}", other),
                }
                self.metrics.increment(MetricType::Errors);
                return AssistantResponse {
                    utterance: utterance.to_string(),
                    reply: INVALID_INPUT_REPLY.to_string(),
                    classification: None,
                    decision: None,
                };
            }
        };

        self.metrics.record_classification(&classification);

        let outcome = self.router.route(&classification).await;
        self.record_decision(&outcome.decision);

        self.push_turn(Speaker::User, &classification.utterance);
        self.push_turn(Speaker::Assistant, &outcome.reply);

        AssistantResponse {
            utterance: classification.utterance.clone(),
            reply: outcome.reply,
            classification: Some(classification),
            decision: Some(outcome.decision),
        }
    }

    fn record_decision(&self, decision: &RouteDecision) {
        match decision {
            RouteDecision::Answered | RouteDecision::Unrecognized => {}
            RouteDecision::Clarify { .. } => self.metrics.increment(MetricType::Clarifications),
            RouteDecision::Dispatched { status, .. } => {
                self.metrics.increment(MetricType::Dispatches);
                if *status != TaskStatus::Success {
                    self.metrics.increment(MetricType::DispatchFailures);
                }
            }
            RouteDecision::Complex(report) => {
                self.metrics.increment(MetricType::ComplexTasks);
                let failed = report.subtasks.len() - report.completed;
                self.metrics.add(MetricType::DispatchFailures, failed as u64);
            }
            RouteDecision::ContactUnresolved { .. } => {
                self.metrics.increment(MetricType::ContactUnresolved)
            }
        }
    }

    fn push_turn(&self, speaker: Speaker, text: &str) {
        let mut history = self.history.lock();
        history.push_back(ConversationTurn {
            speaker,
            text: text.to_string(),
            timestamp: Utc::now(),
        });
        while history.len() > self.config.app.history_limit {
            history.pop_front();
        }
    }

    /// Conversation turns, oldest first.
    pub fn history(&self) -> Vec<ConversationTurn> {
        self.history.lock().iter().cloned().collect()
    }

    pub fn clear_history(&self) {
        self.history.lock().clear();
    }

    pub async fn add_contact(
        &self,
        name: &str,
        phone: &str,
        email: Option<&str>,
    ) -> AariResult<String> {
        MemoryBook::new(self.store.clone())
            .add_contact(name, phone, email)
            .await
    }

    pub async fn contacts(&self) -> AariResult<Vec<Contact>> {
        MemoryBook::new(self.store.clone()).contacts().await
    }

    /// Reminders due at `now`; each is returned once.
    pub async fn take_due_reminders(
        &self,
        now: DateTime<Utc>,
    ) -> AariResult<Vec<ScheduledReminder>> {
        let reminders = ReminderActions::new(self.store.clone());
        let due = reminders.due_reminders(now).await?;
        for reminder in &due {
            reminders.dismiss(&reminder.id).await?;
        }
        Ok(due)
    }
}

async fn open_store(config: &AariConfig) -> AariResult<Arc<dyn KeyValueStore>> {
    match config.store.backend {
        StoreBackend::Memory => Ok(Arc::new(InMemoryStore::new())),
        StoreBackend::JsonFile => {
            let path = config.store.path.as_ref().ok_or_else(|| {
                AariError::Config("The json_file store needs a path".to_string())
            })?;
            info!("Opening store at {:?}", path);
            Ok(Arc::new(JsonFileStore::open(path).await?))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use aari_actions::RecordingSink;
    use aari_core::Intent;

    fn app_with(config: AariConfig) -> (AssistantApp, Arc<RecordingSink>) {
        let sink = Arc::new(RecordingSink::new());
        let app =
            AssistantApp::with_parts(config, Arc::new(InMemoryStore::new()), sink.clone())
                .unwrap();
        (app, sink)
    }

    #[tokio::test]
    async fn blank_input_is_rejected_without_history() {
        let (app, sink) = app_with(AariConfig::default());
        let response = app.respond("   ").await;
        assert_eq!(response.reply, INVALID_INPUT_REPLY);
        assert!(response.classification.is_none());
        assert!(app.history().is_empty());
        assert_eq!(sink.dispatch_count(), 0);
        assert_eq!(app.metrics().metrics().get(MetricType::Errors), 1);
    }

    #[tokio::test]
    async fn history_is_bounded() {
        let mut config = AariConfig::default();
        config.app.history_limit = 4;
        let (app, _) = app_with(config);

        for _ in 0..5 {
            app.respond("hello").await;
        }
        let history = app.history();
        assert_eq!(history.len(), 4);
        assert_eq!(history[0].speaker, Speaker::User);
        assert_eq!(history[3].speaker, Speaker::Assistant);
    }

    #[tokio::test]
    async fn contacts_added_at_runtime_resolve() {
        let (app, sink) = app_with(AariConfig::default());
        let before = app.respond("call priya").await;
        assert!(matches!(
            before.decision,
            Some(RouteDecision::ContactUnresolved { .. })
        ));

        app.add_contact("Priya", "+15550199", None).await.unwrap();
        let after = app.respond("call priya").await;
        assert_eq!(after.reply, "Calling priya now");
        assert_eq!(sink.requests()[0].contact_number.as_deref(), Some("+15550199"));
        assert_eq!(
            after.classification.map(|c| c.intent),
            Some(Intent::MakeCall)
        );
    }

    #[tokio::test]
    async fn decisions_are_counted() {
        let (app, _) = app_with(AariConfig::default());
        app.respond("play").await;
        app.respond("open chrome").await;

        let summary = app.metrics().get_health_status().metrics;
        assert_eq!(summary.utterances_classified, 2);
        assert_eq!(summary.clarifications, 1);
        assert_eq!(summary.dispatches, 1);
    }

    #[tokio::test]
    async fn file_store_backend_persists_contacts() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = AariConfig::default();
        config.store.backend = StoreBackend::JsonFile;
        config.store.path = Some(dir.path().join("aari.json"));

        let app = AssistantApp::new(config.clone()).await.unwrap();
        app.add_contact("Mom", "+15550100", None).await.unwrap();
        drop(app);

        let reopened = AssistantApp::new(config).await.unwrap();
        let contacts = reopened.contacts().await.unwrap();
        assert_eq!(contacts.len(), 1);
        assert_eq!(contacts[0].phone, "+15550100");
        assert!(reopened.action_stats().is_some());
    }
}
