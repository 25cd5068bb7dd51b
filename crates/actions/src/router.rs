// crates/actions/src/router.rs

use std::sync::Arc;

use aari_core::{
    ClassificationResult, DispatchRequest, EntityKind, EntityMap, HandlerId, Intent,
    KeyValueStore, TaskOutcome, TaskSink, TaskStatus,
};
use aari_nlu::NluEngine;
use chrono::{Local, Timelike};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::{debug, error, info, warn};

use crate::complex::{decompose, ComplexReport, SubtaskReport};
use crate::memory::{memory_title, MemoryBook, MemoryCommand};

pub const UNKNOWN_REPLY: &str = "I'm not sure about that. Could you rephrase?";
const DEFAULT_USER_NAME: &str = "friend";
const DEFAULT_REMINDER_TYPE: &str = "general";
const LEARN_WORD: &str = "learn";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RouterConfig {
    /// Substrings that send an utterance down the multi-step path regardless
    /// of its intent.
    #[serde(default = "default_complex_task_triggers")]
    pub complex_task_triggers: Vec<String>,
    #[serde(default = "default_user_name")]
    pub user_name: String,
}

impl Default for RouterConfig {
    fn default() -> Self {
        Self {
            complex_task_triggers: default_complex_task_triggers(),
            user_name: default_user_name(),
        }
    }
}

pub fn default_complex_task_triggers() -> Vec<String> {
    [
        "and then",
        "after that",
        "organize",
        "automate",
        "batch",
        "workflow",
        "control",
        "manage",
        "system",
        "kill process",
        "schedule",
        "backup",
        "clean disk",
        "monitor",
    ]
    .iter()
    .map(|t| t.to_string())
    .collect()
}

fn default_user_name() -> String {
    DEFAULT_USER_NAME.to_string()
}

/// How a routed utterance was resolved.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum RouteDecision {
    /// Replied directly without any side effect.
    Answered,
    /// A required entity was missing; a question was asked instead.
    Clarify { missing: Option<EntityKind> },
    /// Exactly one request was handed to the task sink.
    Dispatched {
        handler: HandlerId,
        status: TaskStatus,
    },
    /// The multi-step path ran instead of intent routing.
    Complex(ComplexReport),
    /// Classification failed; nothing was dispatched.
    Unrecognized,
    /// The contact could not be mapped to a phone number.
    ContactUnresolved { contact: String },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RouteOutcome {
    pub reply: String,
    pub decision: RouteDecision,
}

impl RouteOutcome {
    fn new(reply: impl Into<String>, decision: RouteDecision) -> Self {
        Self {
            reply: reply.into(),
            decision,
        }
    }

    fn clarify(question: impl Into<String>, missing: Option<EntityKind>) -> Self {
        Self::new(question, RouteDecision::Clarify { missing })
    }

    /// True for direct answers and successful dispatches.
    pub fn succeeded(&self) -> bool {
        match &self.decision {
            RouteDecision::Answered => true,
            RouteDecision::Dispatched { status, .. } => *status == TaskStatus::Success,
            RouteDecision::Complex(report) => report.completed == report.subtasks.len(),
            _ => false,
        }
    }
}

/// Reply used when a handler reports a failure; the handler's message is
/// appended verbatim.
fn failure_prefix(handler: HandlerId) -> &'static str {
    match handler {
        HandlerId::Messaging => "I couldn't send the message.",
        HandlerId::Calling => "I couldn't make the call.",
        HandlerId::Download => "Couldn't find or download the file.",
        HandlerId::System => "I couldn't execute that command.",
        HandlerId::Query => "I'm having trouble answering that right now.",
        HandlerId::Reminder => "I couldn't set that reminder.",
        HandlerId::Media => "Couldn't play that.",
        HandlerId::Memory => "There was an error managing my memory.",
    }
}

pub fn greeting_for_hour(hour: u32, user_name: &str) -> String {
    if hour < 12 {
        format!(
            "Good morning, {}! I'm aari, your assistant. How can I help you today?",
            user_name
        )
    } else if hour < 18 {
        format!(
            "Good afternoon, {}! I'm aari. What can I help you with?",
            user_name
        )
    } else {
        format!(
            "Good evening, {}! I'm aari, ready to assist. How can I be of service?",
            user_name
        )
    }
}

/// Turns a classification into exactly one of: a direct reply, a clarifying
/// question, or a single dispatch to the task sink.
///
/// The complex-task override is checked first and shadows intent routing.
pub struct CommandRouter {
    config: RouterConfig,
    nlu: Arc<NluEngine>,
    store: Arc<dyn KeyValueStore>,
    sink: Arc<dyn TaskSink>,
    triggers: Vec<String>,
}

impl CommandRouter {
    pub fn new(
        config: RouterConfig,
        nlu: Arc<NluEngine>,
        store: Arc<dyn KeyValueStore>,
        sink: Arc<dyn TaskSink>,
    ) -> Self {
        let triggers = config
            .complex_task_triggers
            .iter()
            .map(|t| t.to_lowercase())
            .filter(|t| !t.trim().is_empty())
            .collect();

        Self {
            config,
            nlu,
            store,
            sink,
            triggers,
        }
    }

    pub fn config(&self) -> &RouterConfig {
        &self.config
    }

    /// First configured trigger present in `utterance`.
    pub fn complex_trigger(&self, utterance: &str) -> Option<&str> {
        let lower = utterance.to_lowercase();
        self.triggers
            .iter()
            .find(|trigger| lower.contains(trigger.as_str()))
            .map(String::as_str)
    }

    /// Routes one classified utterance.
    ///
    /// Precedence, highest first: a "learn" request goes straight to memory,
    /// then any complex-task trigger sends the utterance down the multi-step
    /// path, and only then does the intent table apply. Both overrides can
    /// shadow a literal intent match.
    pub async fn route(&self, result: &ClassificationResult) -> RouteOutcome {
        if is_learn_request(&result.utterance) {
            info!("Learn request overrides intent {}", result.intent);
            let learn = ClassificationResult {
                intent: Intent::Memory,
                ..result.clone()
            };
            return self.route_intent(&learn).await;
        }

        if let Some(trigger) = self.complex_trigger(&result.utterance) {
            info!(
                "Complex-task trigger '{}' overrides intent {}",
                trigger, result.intent
            );
            return self.route_complex(&result.utterance).await;
        }

        self.route_intent(result).await
    }

    async fn route_complex(&self, utterance: &str) -> RouteOutcome {
        let mut subtasks = Vec::new();

        for piece in decompose(utterance) {
            let report = match self.nlu.process(&piece) {
                Ok(classified) => {
                    let outcome = self.route_intent(&classified).await;
                    SubtaskReport {
                        utterance: piece,
                        intent: Some(classified.intent),
                        succeeded: outcome.succeeded(),
                        reply: outcome.reply,
                    }
                }
                Err(e) => {
                    warn!("Skipping subtask '{}': {}", piece, e);
                    SubtaskReport {
                        utterance: piece,
                        intent: None,
                        succeeded: false,
                        reply: UNKNOWN_REPLY.to_string(),
                    }
                }
            };
            subtasks.push(report);
        }

        let report = ComplexReport::from_subtasks(subtasks);
        info!(
            "Complex task finished: {:?}, {} of {} subtasks",
            report.status,
            report.completed,
            report.subtasks.len()
        );
        RouteOutcome::new(report.reply(), RouteDecision::Complex(report))
    }

    /// Intent-table routing without the overrides.
    pub async fn route_intent(&self, result: &ClassificationResult) -> RouteOutcome {
        let entities = &result.entities;

        let Some(handler) = result.intent.handler() else {
            return match result.intent {
                Intent::Greeting => RouteOutcome::new(
                    greeting_for_hour(Local::now().hour(), &self.config.user_name),
                    RouteDecision::Answered,
                ),
                _ => {
                    debug!("No intent for '{}'", result.utterance);
                    RouteOutcome::new(UNKNOWN_REPLY, RouteDecision::Unrecognized)
                }
            };
        };

        if let Some(missing) = missing_entity(result.intent, entities) {
            return RouteOutcome::clarify(
                clarifying_question(result.intent, missing, entities),
                Some(missing),
            );
        }

        let contact = entities
            .get(EntityKind::Contact)
            .filter(|_| result.intent.requires_contact());
        let contact_number = match contact {
            Some(contact) => match self.resolve_contact(contact).await {
                Ok(number) => Some(number),
                Err(outcome) => return outcome,
            },
            None => None,
        };

        match result.intent {
            Intent::Memory => {
                let command = MemoryCommand::parse(&result.utterance);
                if let Some(question) = command.clarification() {
                    return RouteOutcome::clarify(question, None);
                }
                if command == MemoryCommand::Unsupported {
                    return RouteOutcome::new(
                        "I'm not sure what memory operation you want",
                        RouteDecision::Unrecognized,
                    );
                }
            }
            Intent::SetReminder => self.record_reminder(result).await,
            _ => {}
        }

        self.dispatch(result, handler, contact_number).await
    }

    /// Contact gate: maps the spoken name to a phone number or produces the
    /// reply that stops the dispatch.
    async fn resolve_contact(&self, contact: &str) -> Result<String, RouteOutcome> {
        let unresolved = |reply: String| {
            RouteOutcome::new(
                reply,
                RouteDecision::ContactUnresolved {
                    contact: contact.to_string(),
                },
            )
        };

        match self.store.resolve_contact(contact).await {
            Ok(Some(number)) => Ok(number),
            Ok(None) => {
                info!("Contact '{}' not found", contact);
                Err(unresolved(format!(
                    "I don't have {} in my contacts. Please add {}'s contact first.",
                    contact, contact
                )))
            }
            Err(e) => {
                warn!("Contact lookup for '{}' failed: {}", contact, e);
                Err(unresolved(format!(
                    "I couldn't look up {} in my contacts right now.",
                    contact
                )))
            }
        }
    }

    async fn record_reminder(&self, result: &ClassificationResult) {
        let entities = &result.entities;
        let text = entities.get(EntityKind::ReminderText).unwrap_or_default();
        let content = json!({
            "reminder_text": text,
            "time": entities.get(EntityKind::Time),
            "type": reminder_type(entities),
            "command": result.utterance,
        });
        let book = MemoryBook::new(self.store.clone());
        if let Err(e) = book
            .remember(
                &format!("Reminder: {}", memory_title(text)),
                &content.to_string(),
                "reminder",
            )
            .await
        {
            warn!("Could not record reminder in memory: {}", e);
        }
    }

    async fn dispatch(
        &self,
        result: &ClassificationResult,
        handler: HandlerId,
        contact_number: Option<String>,
    ) -> RouteOutcome {
        let request = DispatchRequest {
            handler,
            intent: result.intent,
            entities: result.entities.clone(),
            utterance: result.utterance.clone(),
            contact_number,
        };

        info!(
            "Dispatching {} to {} via {}",
            result.intent,
            handler,
            self.sink.name()
        );

        match self.sink.dispatch(&request).await {
            Ok(outcome) if outcome.is_success() => RouteOutcome::new(
                success_reply(result.intent, &result.entities, &outcome),
                RouteDecision::Dispatched {
                    handler,
                    status: TaskStatus::Success,
                },
            ),
            Ok(outcome) => {
                warn!("{} handler reported failure: {}", handler, outcome.message);
                RouteOutcome::new(
                    format!("{} {}", failure_prefix(handler), outcome.message)
                        .trim_end()
                        .to_string(),
                    RouteDecision::Dispatched {
                        handler,
                        status: TaskStatus::Error,
                    },
                )
            }
            Err(e) => {
                error!("{} dispatch failed: {}", handler, e);
                RouteOutcome::new(
                    format!("{} Please try again.", failure_prefix(handler)),
                    RouteDecision::Dispatched {
                        handler,
                        status: TaskStatus::Error,
                    },
                )
            }
        }
    }
}

/// True when the utterance asks the assistant to learn a fact.
fn is_learn_request(utterance: &str) -> bool {
    utterance
        .split_whitespace()
        .any(|word| word.eq_ignore_ascii_case(LEARN_WORD))
}

fn reminder_type(entities: &EntityMap) -> &str {
    entities.get(EntityKind::Type).unwrap_or(DEFAULT_REMINDER_TYPE)
}

fn clarifying_question(intent: Intent, missing: EntityKind, entities: &EntityMap) -> String {
    let entity = |kind| entities.get(kind).unwrap_or_default();
    match (intent, missing) {
        (Intent::SendMessage, EntityKind::Contact) => {
            "Who would you like me to send a message to?".to_string()
        }
        (Intent::SendMessage, _) => format!(
            "What message would you like me to send to {}?",
            entity(EntityKind::Contact)
        ),
        (Intent::MakeCall, _) => "Who would you like me to call?".to_string(),
        (Intent::DownloadFile, _) => "What file would you like me to download?".to_string(),
        (Intent::SetReminder, EntityKind::ReminderText) => {
            "What should I remind you about?".to_string()
        }
        (Intent::SetReminder, _) => format!(
            "When would you like me to remind you about {}? Please say a time like 'tomorrow morning' or 'in 5 minutes'.",
            entity(EntityKind::ReminderText)
        ),
        (Intent::PlayMedia, _) => "What would you like me to play?".to_string(),
        (_, missing) => format!("I need the {} to do that.", missing),
    }
}

fn success_reply(intent: Intent, entities: &EntityMap, outcome: &TaskOutcome) -> String {
    let entity = |kind| entities.get(kind).unwrap_or_default();
    match intent {
        Intent::SendMessage => format!(
            "Message sent to {}. I said '{}'",
            entity(EntityKind::Contact),
            entity(EntityKind::Message)
        ),
        Intent::MakeCall => format!("Calling {} now", entity(EntityKind::Contact)),
        Intent::DownloadFile => format!(
            "Downloaded {}. Saved to your downloads folder.",
            entity(EntityKind::FileName)
        ),
        // Without an app the utterance went through as a free-form system
        // command; its handler's message is the reply.
        Intent::SystemControl => match entities.get(EntityKind::App) {
            Some(app) => format!("Opening {}.", app),
            None => outcome.message.clone(),
        },
        Intent::SetReminder => {
            let kind = reminder_type(entities);
            let mut reply = format!(
                "Reminder set! I'll remind you to {} {}.",
                entity(EntityKind::ReminderText),
                entity(EntityKind::Time)
            );
            if kind != DEFAULT_REMINDER_TYPE {
                reply.push_str(&format!(
                    " This is a {} alarm - I've saved this for future reference.",
                    kind
                ));
            }
            reply
        }
        Intent::PlayMedia => format!("Now playing {}.", entity(EntityKind::Media)),
        Intent::Query | Intent::Memory | Intent::Greeting | Intent::Unknown => {
            outcome.message.clone()
        }
    }
}

/// Entities a dispatch for `intent` cannot proceed without.
pub fn required_entities(intent: Intent) -> &'static [EntityKind] {
    match intent {
        Intent::SendMessage => &[EntityKind::Contact, EntityKind::Message],
        Intent::MakeCall => &[EntityKind::Contact],
        Intent::DownloadFile => &[EntityKind::FileName],
        Intent::SetReminder => &[EntityKind::ReminderText, EntityKind::Time],
        Intent::PlayMedia => &[EntityKind::Media],
        Intent::SystemControl
        | Intent::Query
        | Intent::Memory
        | Intent::Greeting
        | Intent::Unknown => &[],
    }
}

/// First required entity absent from `entities`.
pub fn missing_entity(intent: Intent, entities: &EntityMap) -> Option<EntityKind> {
    required_entities(intent)
        .iter()
        .copied()
        .find(|kind| !entities.contains(*kind))
}
