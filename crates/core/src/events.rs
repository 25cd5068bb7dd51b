// crates/core/src/events.rs
use serde::{Deserialize, Serialize};

use crate::{EntityMap, HandlerId, Intent};

/// Which scoring path produced the reported confidence.
///
/// Scores from different sources are not on the same scale and must not be
/// compared across intents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConfidenceSource {
    /// Normalised keyword-rule score.
    Keyword,
    /// Keyword decision backed by the statistical model; the score is the
    /// larger of the rule score and the model's posterior for the keyword
    /// intent.
    Corroborated,
    /// Keyword match whose rule score fell at or below the unknown
    /// confidence; lifted just above it so a match always outranks `Unknown`.
    Floored,
    /// Fixed low score attached to `Intent::Unknown`.
    Fallback,
}

/// Output of the NLU stage for one utterance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassificationResult {
    pub utterance: String,
    pub intent: Intent,
    pub entities: EntityMap,
    pub confidence: f32,
    pub source: ConfidenceSource,
    /// Label predicted by the statistical model, when it ran.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model_intent: Option<Intent>,
}

impl ClassificationResult {
    /// True when the statistical model ran and disagreed with the final intent.
    pub fn model_diverged(&self) -> bool {
        self.model_intent
            .map(|model| model != self.intent)
            .unwrap_or(false)
    }
}

/// A single side-effecting call handed to a [`crate::TaskSink`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DispatchRequest {
    pub handler: HandlerId,
    pub intent: Intent,
    pub entities: EntityMap,
    pub utterance: String,
    /// Phone number resolved through the contact gate (messaging and calls).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub contact_number: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskStatus {
    Success,
    Error,
}

/// Result reported by a task handler.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaskOutcome {
    pub status: TaskStatus,
    pub message: String,
}

impl TaskOutcome {
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            status: TaskStatus::Success,
            message: message.into(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            status: TaskStatus::Error,
            message: message.into(),
        }
    }

    pub fn is_success(&self) -> bool {
        self.status == TaskStatus::Success
    }
}
