// crates/actions/src/communication.rs

use async_trait::async_trait;
use tracing::info;

use crate::web::open_url;
use crate::ActionHandler;
use aari_core::{AariError, AariResult, DispatchRequest, EntityKind, HandlerId, TaskOutcome};

/// Messages through WhatsApp web links and calls through `tel:` links.
///
/// Both require the phone number resolved by the router's contact gate.
pub struct CommunicationActions {
    dry_run: bool,
}

impl CommunicationActions {
    pub fn new(dry_run: bool) -> Self {
        Self { dry_run }
    }
}

fn digits(number: &str) -> String {
    number.chars().filter(|c| c.is_ascii_digit()).collect()
}

#[async_trait]
impl ActionHandler for CommunicationActions {
    fn can_handle(&self, handler: HandlerId) -> bool {
        matches!(handler, HandlerId::Messaging | HandlerId::Calling)
    }

    async fn execute(&self, request: &DispatchRequest) -> AariResult<TaskOutcome> {
        let contact = request
            .entities
            .get(EntityKind::Contact)
            .ok_or_else(|| AariError::Action("Contact not provided".to_string()))?;
        let number = request
            .contact_number
            .as_deref()
            .ok_or_else(|| AariError::Action(format!("No phone number for {}", contact)))?;

        match request.handler {
            HandlerId::Messaging => {
                let message = request
                    .entities
                    .get(EntityKind::Message)
                    .ok_or_else(|| AariError::Action("Message not provided".to_string()))?;

                let url = format!(
                    "https://wa.me/{}?text={}",
                    digits(number),
                    urlencoding::encode(message)
                );
                info!("Sending message to {} ({})", contact, number);
                open_url(&url, self.dry_run)?;
                Ok(TaskOutcome::success(format!("Message sent to {}", contact)))
            }

            HandlerId::Calling => {
                info!("Initiating call to {} ({})", contact, number);
                open_url(&format!("tel:{}", number), self.dry_run)?;
                Ok(TaskOutcome::success(format!("Calling {}", contact)))
            }

            other => Err(AariError::Action(format!(
                "Unsupported communication request: {}",
                other
            ))),
        }
    }

    fn name(&self) -> &str {
        "CommunicationActions"
    }
}
