// crates/actions/src/recording.rs

use std::collections::HashMap;

use aari_core::{AariError, AariResult, DispatchRequest, HandlerId, TaskOutcome, TaskSink};
use async_trait::async_trait;
use parking_lot::Mutex;

#[derive(Debug, Clone)]
enum Scripted {
    Outcome(TaskOutcome),
    Failure(String),
}

/// `TaskSink` that records every request and answers with scripted outcomes.
/// Handlers without a script succeed with "ok".
#[derive(Debug, Default)]
pub struct RecordingSink {
    requests: Mutex<Vec<DispatchRequest>>,
    scripts: Mutex<HashMap<HandlerId, Scripted>>,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn respond_with(&self, handler: HandlerId, outcome: TaskOutcome) {
        self.scripts.lock().insert(handler, Scripted::Outcome(outcome));
    }

    pub fn fail_with(&self, handler: HandlerId, error: impl Into<String>) {
        self.scripts
            .lock()
            .insert(handler, Scripted::Failure(error.into()));
    }

    pub fn requests(&self) -> Vec<DispatchRequest> {
        self.requests.lock().clone()
    }

    pub fn dispatch_count(&self) -> usize {
        self.requests.lock().len()
    }
}

#[async_trait]
impl TaskSink for RecordingSink {
    async fn dispatch(&self, request: &DispatchRequest) -> AariResult<TaskOutcome> {
        self.requests.lock().push(request.clone());
        match self.scripts.lock().get(&request.handler).cloned() {
            Some(Scripted::Outcome(outcome)) => Ok(outcome),
            Some(Scripted::Failure(error)) => Err(AariError::Action(error)),
            None => Ok(TaskOutcome::success("ok")),
        }
    }

    fn name(&self) -> &str {
        "RecordingSink"
    }
}
