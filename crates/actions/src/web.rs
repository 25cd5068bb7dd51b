// crates/actions/src/web.rs

use async_trait::async_trait;
use std::process::Command as ProcessCommand;
use tracing::info;

use crate::ActionHandler;
use aari_core::{AariError, AariResult, DispatchRequest, EntityKind, HandlerId, TaskOutcome};

pub fn search_url(query: &str) -> String {
    format!(
        "https://www.google.com/search?q={}",
        urlencoding::encode(query)
    )
}

/// Opens `url` with the platform's default handler, or only logs it when
/// `dry_run` is set.
pub(crate) fn open_url(url: &str, dry_run: bool) -> AariResult<()> {
    if dry_run {
        info!("[dry run] would open {}", url);
        return Ok(());
    }

    let spawned = if cfg!(target_os = "windows") {
        ProcessCommand::new("cmd").args(["/c", "start", "", url]).spawn()
    } else if cfg!(target_os = "macos") {
        ProcessCommand::new("open").arg(url).spawn()
    } else {
        ProcessCommand::new("xdg-open").arg(url).spawn()
    };

    spawned
        .map(|_| ())
        .map_err(|e| AariError::Action(format!("Failed to open {}: {}", url, e)))
}

/// Search queries and file downloads through the browser.
pub struct WebActions {
    dry_run: bool,
}

impl WebActions {
    pub fn new(dry_run: bool) -> Self {
        Self { dry_run }
    }
}

#[async_trait]
impl ActionHandler for WebActions {
    fn can_handle(&self, handler: HandlerId) -> bool {
        matches!(handler, HandlerId::Query | HandlerId::Download)
    }

    async fn execute(&self, request: &DispatchRequest) -> AariResult<TaskOutcome> {
        match request.handler {
            HandlerId::Query => {
                let query = request.utterance.trim();
                if query.is_empty() {
                    return Err(AariError::Action("Search query not provided".to_string()));
                }

                open_url(&search_url(query), self.dry_run)?;
                Ok(TaskOutcome::success(format!("Searching for {}", query)))
            }

            HandlerId::Download => {
                let file_name = request
                    .entities
                    .get(EntityKind::FileName)
                    .ok_or_else(|| AariError::Action("File name not provided".to_string()))?;
                let query = match request.entities.get(EntityKind::FileType) {
                    Some(file_type) => format!("{} filetype:{}", file_name, file_type),
                    None => file_name.to_string(),
                };

                open_url(&search_url(&query), self.dry_run)?;
                Ok(TaskOutcome::success(format!("Downloaded {}", file_name)))
            }

            other => Err(AariError::Action(format!(
                "Unsupported web request: {}",
                other
            ))),
        }
    }

    fn name(&self) -> &str {
        "WebActions"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use aari_core::{EntityMap, Intent};

    #[test]
    fn search_urls_are_encoded() {
        assert_eq!(
            search_url("rust & tokio"),
            "https://www.google.com/search?q=rust%20%26%20tokio"
        );
    }

    #[tokio::test]
    async fn download_searches_with_file_type() {
        let mut entities = EntityMap::new();
        entities.insert(EntityKind::FileName, "annual report");
        entities.insert(EntityKind::FileType, "pdf");
        let request = DispatchRequest {
            handler: HandlerId::Download,
            intent: Intent::DownloadFile,
            entities,
            utterance: "download annual report pdf".to_string(),
            contact_number: None,
        };

        let outcome = WebActions::new(true).execute(&request).await.unwrap();
        assert!(outcome.is_success());
        assert_eq!(outcome.message, "Downloaded annual report");
    }

    #[tokio::test]
    async fn download_without_name_fails() {
        let request = DispatchRequest {
            handler: HandlerId::Download,
            intent: Intent::DownloadFile,
            entities: EntityMap::new(),
            utterance: "download".to_string(),
            contact_number: None,
        };
        assert!(WebActions::new(true).execute(&request).await.is_err());
    }
}
