// crates/actions/src/lib.rs

use aari_core::{AariResult, DispatchRequest, HandlerId, KeyValueStore, TaskOutcome, TaskSink};
use async_trait::async_trait;
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{error, info, warn};

pub mod communication;
pub mod complex;
pub mod media;
pub mod memory;
pub mod recording;
pub mod reminders;
pub mod router;
pub mod store;
pub mod system;
pub mod web;

pub use complex::{decompose, ComplexReport, ComplexStatus, SubtaskReport};
pub use memory::{MemoryActions, MemoryBook, MemoryCommand, MemoryEntry};
pub use recording::RecordingSink;
pub use reminders::{ReminderActions, ScheduledReminder};
pub use router::{CommandRouter, RouteDecision, RouteOutcome, RouterConfig};
pub use store::{InMemoryStore, JsonFileStore};

use communication::CommunicationActions;
use media::MediaActions;
use system::SystemActions;
use web::WebActions;

/// Action configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActionsConfig {
    #[serde(default = "default_modules")]
    pub enabled_modules: Vec<String>,
    /// Log side effects instead of performing them.
    #[serde(default = "default_dry_run")]
    pub dry_run: bool,
    #[serde(default)]
    pub security: SecurityConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SecurityConfig {
    pub allow_system_commands: bool,
    /// Phrases that are refused by the system handler.
    pub blocked_commands: Vec<String>,
}

impl Default for SecurityConfig {
    fn default() -> Self {
        Self {
            allow_system_commands: true,
            blocked_commands: vec![
                "shutdown".to_string(),
                "shut down".to_string(),
                "restart".to_string(),
                "reboot".to_string(),
                "poweroff".to_string(),
                "halt".to_string(),
            ],
        }
    }
}

impl Default for ActionsConfig {
    fn default() -> Self {
        Self {
            enabled_modules: default_modules(),
            dry_run: default_dry_run(),
            security: SecurityConfig::default(),
        }
    }
}

fn default_modules() -> Vec<String> {
    ["communication", "web", "system", "media", "reminders", "memory"]
        .iter()
        .map(|m| m.to_string())
        .collect()
}

fn default_dry_run() -> bool {
    true
}

/// Action executor trait
#[async_trait]
pub trait ActionHandler: Send + Sync {
    fn can_handle(&self, handler: HandlerId) -> bool;
    async fn execute(&self, request: &DispatchRequest) -> AariResult<TaskOutcome>;
    fn name(&self) -> &str;
}

/// Counters kept by [`ActionExecutor`].
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ActionStats {
    pub total_executed: u64,
    pub successful: u64,
    pub failed: u64,
    pub unhandled: u64,
    pub average_execution_time_ms: f64,
}

/// Main action executor; the production [`TaskSink`].
pub struct ActionExecutor {
    handlers: Vec<Box<dyn ActionHandler>>,
    metrics: Arc<RwLock<ActionStats>>,
}

impl ActionExecutor {
    pub fn new(store: Arc<dyn KeyValueStore>) -> AariResult<Self> {
        Self::with_config(ActionsConfig::default(), store)
    }

    pub fn with_config(config: ActionsConfig, store: Arc<dyn KeyValueStore>) -> AariResult<Self> {
        let mut handlers: Vec<Box<dyn ActionHandler>> = Vec::new();

        for module in &config.enabled_modules {
            match module.as_str() {
                "communication" => {
                    handlers.push(Box::new(CommunicationActions::new(config.dry_run)));
                }
                "web" => {
                    handlers.push(Box::new(WebActions::new(config.dry_run)));
                }
                "system" => {
                    handlers.push(Box::new(SystemActions::new(
                        config.security.clone(),
                        config.dry_run,
                    )?));
                }
                "media" => {
                    handlers.push(Box::new(MediaActions::new(config.dry_run)));
                }
                "reminders" => {
                    handlers.push(Box::new(ReminderActions::new(store.clone())));
                }
                "memory" => {
                    handlers.push(Box::new(MemoryActions::new(store.clone())));
                }
                _ => warn!("Unknown action module: {}", module),
            }
        }

        Ok(Self::from_handlers(handlers))
    }

    pub fn from_handlers(handlers: Vec<Box<dyn ActionHandler>>) -> Self {
        Self {
            handlers,
            metrics: Arc::new(RwLock::new(ActionStats::default())),
        }
    }

    pub fn handler_names(&self) -> Vec<&str> {
        self.handlers.iter().map(|h| h.name()).collect()
    }

    pub fn stats(&self) -> ActionStats {
        self.metrics.read().clone()
    }

    pub async fn execute(&self, request: &DispatchRequest) -> AariResult<TaskOutcome> {
        let start = std::time::Instant::now();

        for handler in &self.handlers {
            if handler.can_handle(request.handler) {
                info!(
                    "Executing {} request with handler '{}'",
                    request.handler,
                    handler.name()
                );

                let result = match handler.execute(request).await {
                    Ok(outcome) => {
                        let mut metrics = self.metrics.write();
                        if outcome.is_success() {
                            metrics.successful += 1;
                        } else {
                            metrics.failed += 1;
                        }
                        Ok(outcome)
                    }
                    Err(e) => {
                        error!("Action execution failed: {}", e);
                        self.metrics.write().failed += 1;
                        Err(e)
                    }
                };

                let execution_time = start.elapsed().as_secs_f64() * 1000.0;
                let mut metrics = self.metrics.write();
                metrics.total_executed += 1;
                metrics.average_execution_time_ms = (metrics.average_execution_time_ms
                    * (metrics.total_executed - 1) as f64
                    + execution_time)
                    / metrics.total_executed as f64;

                return result;
            }
        }

        warn!("No handler found for {} request", request.handler);
        self.metrics.write().unhandled += 1;
        Ok(TaskOutcome::error(format!(
            "No handler is available for {} requests",
            request.handler
        )))
    }
}

#[async_trait]
impl TaskSink for ActionExecutor {
    async fn dispatch(&self, request: &DispatchRequest) -> AariResult<TaskOutcome> {
        self.execute(request).await
    }

    fn name(&self) -> &str {
        "ActionExecutor"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use aari_core::{AariError, EntityKind, EntityMap, Intent};

    struct Failing;

    #[async_trait]
    impl ActionHandler for Failing {
        fn can_handle(&self, handler: HandlerId) -> bool {
            handler == HandlerId::Media
        }

        async fn execute(&self, _request: &DispatchRequest) -> AariResult<TaskOutcome> {
            Err(AariError::Action("speaker unplugged".to_string()))
        }

        fn name(&self) -> &str {
            "Failing"
        }
    }

    fn request(handler: HandlerId, intent: Intent, entities: EntityMap) -> DispatchRequest {
        DispatchRequest {
            handler,
            intent,
            entities,
            utterance: String::new(),
            contact_number: None,
        }
    }

    #[tokio::test]
    async fn default_modules_cover_every_handler() {
        let executor = ActionExecutor::new(Arc::new(InMemoryStore::new())).unwrap();
        assert_eq!(executor.handler_names().len(), 6);

        let mut entities = EntityMap::new();
        entities.insert(EntityKind::Media, "jazz");
        let outcome = executor
            .execute(&request(HandlerId::Media, Intent::PlayMedia, entities))
            .await
            .unwrap();
        assert!(outcome.is_success());
        assert_eq!(executor.stats().successful, 1);
    }

    #[tokio::test]
    async fn missing_module_reports_error_outcome() {
        let config = ActionsConfig {
            enabled_modules: vec!["media".to_string()],
            ..ActionsConfig::default()
        };
        let executor = ActionExecutor::with_config(config, Arc::new(InMemoryStore::new())).unwrap();
        let outcome = executor
            .execute(&request(HandlerId::Download, Intent::DownloadFile, EntityMap::new()))
            .await
            .unwrap();
        assert!(!outcome.is_success());
        assert_eq!(executor.stats().unhandled, 1);
    }

    #[tokio::test]
    async fn handler_errors_are_counted_and_propagated() {
        let executor = ActionExecutor::from_handlers(vec![Box::new(Failing)]);
        let result = executor
            .dispatch(&request(HandlerId::Media, Intent::PlayMedia, EntityMap::new()))
            .await;
        assert!(result.is_err());
        let stats = executor.stats();
        assert_eq!(stats.failed, 1);
        assert_eq!(stats.total_executed, 1);
    }
}
