// crates/actions/src/media.rs

use async_trait::async_trait;

use crate::web::open_url;
use crate::ActionHandler;
use aari_core::{AariError, AariResult, DispatchRequest, EntityKind, HandlerId, TaskOutcome};

pub struct MediaActions {
    dry_run: bool,
}

impl MediaActions {
    pub fn new(dry_run: bool) -> Self {
        Self { dry_run }
    }
}

#[async_trait]
impl ActionHandler for MediaActions {
    fn can_handle(&self, handler: HandlerId) -> bool {
        handler == HandlerId::Media
    }

    async fn execute(&self, request: &DispatchRequest) -> AariResult<TaskOutcome> {
        let media = request
            .entities
            .get(EntityKind::Media)
            .ok_or_else(|| AariError::Action("Nothing to play".to_string()))?;

        let url = format!(
            "https://www.youtube.com/results?search_query={}",
            urlencoding::encode(media)
        );
        open_url(&url, self.dry_run)?;
        Ok(TaskOutcome::success(format!("Now playing {}", media)))
    }

    fn name(&self) -> &str {
        "MediaActions"
    }
}
