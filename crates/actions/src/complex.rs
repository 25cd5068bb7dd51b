// crates/actions/src/complex.rs

//! Multi-step commands: splitting an utterance into subtasks and folding the
//! per-subtask results into one status.

use aari_core::Intent;
use serde::{Deserialize, Serialize};

/// Conjunctions that separate subtasks, longest first. Matched as whole words.
const SUBTASK_SEPARATORS: &[&str] = &[" and then ", " after that ", " and ", " then "];

/// Splits `utterance` into trimmed, non-empty subtasks. An utterance without
/// separators is a single subtask.
pub fn decompose(utterance: &str) -> Vec<String> {
    let mut pieces = vec![utterance.to_lowercase()];

    for separator in SUBTASK_SEPARATORS {
        pieces = pieces
            .iter()
            .flat_map(|piece| {
                // Pad so separators also match at the edges of a piece.
                format!(" {} ", piece)
                    .split(separator)
                    .map(|part| part.trim().to_string())
                    .collect::<Vec<_>>()
            })
            .filter(|piece| !piece.is_empty())
            .collect();
    }

    if pieces.is_empty() {
        let trimmed = utterance.trim();
        if !trimmed.is_empty() {
            pieces.push(trimmed.to_lowercase());
        }
    }

    pieces
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ComplexStatus {
    Success,
    Partial,
    Error,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubtaskReport {
    pub utterance: String,
    pub intent: Option<Intent>,
    pub succeeded: bool,
    pub reply: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComplexReport {
    pub status: ComplexStatus,
    pub completed: usize,
    pub subtasks: Vec<SubtaskReport>,
}

impl ComplexReport {
    pub fn from_subtasks(subtasks: Vec<SubtaskReport>) -> Self {
        let completed = subtasks.iter().filter(|s| s.succeeded).count();
        let status = if !subtasks.is_empty() && completed == subtasks.len() {
            ComplexStatus::Success
        } else if completed > 0 {
            ComplexStatus::Partial
        } else {
            ComplexStatus::Error
        };

        Self {
            status,
            completed,
            subtasks,
        }
    }

    pub fn reply(&self) -> String {
        let details = self
            .subtasks
            .iter()
            .map(|s| s.reply.as_str())
            .collect::<Vec<_>>()
            .join(" ");

        match self.status {
            ComplexStatus::Success => format!("Completed successfully. {}", details),
            ComplexStatus::Partial => format!(
                "Partially completed. {} of {} tasks done. {}",
                self.completed,
                self.subtasks.len(),
                details
            ),
            ComplexStatus::Error => format!(
                "I couldn't complete any of those {} tasks. {}",
                self.subtasks.len(),
                details
            ),
        }
        .trim_end()
        .to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn report(succeeded: bool) -> SubtaskReport {
        SubtaskReport {
            utterance: "x".to_string(),
            intent: None,
            succeeded,
            reply: if succeeded { "Done." } else { "Failed." }.to_string(),
        }
    }

    #[test]
    fn splits_on_conjunctions() {
        assert_eq!(
            decompose("Open chrome and then play music"),
            vec!["open chrome", "play music"]
        );
        assert_eq!(
            decompose("backup photos after that call mom then lock the screen"),
            vec!["backup photos", "call mom", "lock the screen"]
        );
        assert_eq!(
            decompose("download report and email it"),
            vec!["download report", "email it"]
        );
    }

    #[test]
    fn conjunctions_inside_words_do_not_split() {
        assert_eq!(decompose("organize android files"), vec!["organize android files"]);
        assert_eq!(decompose("monitor the theater"), vec!["monitor the theater"]);
    }

    #[test]
    fn drops_empty_pieces() {
        assert_eq!(decompose("and then play music and"), vec!["play music"]);
        assert!(decompose("   ").is_empty());
    }

    #[test]
    fn aggregates_status() {
        let all = ComplexReport::from_subtasks(vec![report(true), report(true)]);
        assert_eq!(all.status, ComplexStatus::Success);
        assert_eq!(all.reply(), "Completed successfully. Done. Done.");

        let some = ComplexReport::from_subtasks(vec![report(true), report(false)]);
        assert_eq!(some.status, ComplexStatus::Partial);
        assert!(some.reply().starts_with("Partially completed. 1 of 2 tasks done."));

        let none = ComplexReport::from_subtasks(vec![report(false)]);
        assert_eq!(none.status, ComplexStatus::Error);
        assert_eq!(ComplexReport::from_subtasks(Vec::new()).status, ComplexStatus::Error);
    }
}
