// crates/core/src/intent.rs
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::AariError;

/// Closed set of intents the assistant can act on.
///
/// `Unknown` is a regular outcome, not an error: it means no rule matched
/// with enough evidence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Intent {
    Greeting,
    SendMessage,
    MakeCall,
    DownloadFile,
    #[serde(alias = "open_app")]
    SystemControl,
    Query,
    SetReminder,
    PlayMedia,
    Memory,
    Unknown,
}

impl Intent {
    /// Every intent a classifier may return, excluding `Unknown`.
    pub const CLASSIFIABLE: [Intent; 9] = [
        Intent::Greeting,
        Intent::SendMessage,
        Intent::MakeCall,
        Intent::DownloadFile,
        Intent::SystemControl,
        Intent::Query,
        Intent::SetReminder,
        Intent::PlayMedia,
        Intent::Memory,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Intent::Greeting => "greeting",
            Intent::SendMessage => "send_message",
            Intent::MakeCall => "make_call",
            Intent::DownloadFile => "download_file",
            Intent::SystemControl => "system_control",
            Intent::Query => "query",
            Intent::SetReminder => "set_reminder",
            Intent::PlayMedia => "play_media",
            Intent::Memory => "memory",
            Intent::Unknown => "unknown",
        }
    }

    /// Handler that executes this intent. `None` means the intent is answered
    /// directly without touching any collaborator.
    pub fn handler(&self) -> Option<HandlerId> {
        match self {
            Intent::Greeting => None,
            Intent::SendMessage => Some(HandlerId::Messaging),
            Intent::MakeCall => Some(HandlerId::Calling),
            Intent::DownloadFile => Some(HandlerId::Download),
            Intent::SystemControl => Some(HandlerId::System),
            Intent::Query => Some(HandlerId::Query),
            Intent::SetReminder => Some(HandlerId::Reminder),
            Intent::PlayMedia => Some(HandlerId::Media),
            Intent::Memory => Some(HandlerId::Memory),
            Intent::Unknown => None,
        }
    }

    /// Intents whose dispatch must pass the contact-resolution gate.
    pub fn requires_contact(&self) -> bool {
        matches!(self, Intent::SendMessage | Intent::MakeCall)
    }
}

impl fmt::Display for Intent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Intent {
    type Err = AariError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "greeting" => Ok(Intent::Greeting),
            "send_message" => Ok(Intent::SendMessage),
            "make_call" => Ok(Intent::MakeCall),
            "download_file" => Ok(Intent::DownloadFile),
            "system_control" | "open_app" => Ok(Intent::SystemControl),
            "query" => Ok(Intent::Query),
            "set_reminder" => Ok(Intent::SetReminder),
            "play_media" => Ok(Intent::PlayMedia),
            "memory" => Ok(Intent::Memory),
            "unknown" => Ok(Intent::Unknown),
            other => Err(AariError::Nlu(format!("Unknown intent label '{}'", other))),
        }
    }
}

/// Identifier of an external task handler the router can dispatch to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HandlerId {
    Messaging,
    Calling,
    Download,
    System,
    Query,
    Reminder,
    Media,
    Memory,
}

impl HandlerId {
    pub fn as_str(&self) -> &'static str {
        match self {
            HandlerId::Messaging => "messaging",
            HandlerId::Calling => "calling",
            HandlerId::Download => "download",
            HandlerId::System => "system",
            HandlerId::Query => "query",
            HandlerId::Reminder => "reminder",
            HandlerId::Media => "media",
            HandlerId::Memory => "memory",
        }
    }
}

impl fmt::Display for HandlerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn open_app_is_an_alias_for_system_control() {
        assert_eq!("open_app".parse::<Intent>().unwrap(), Intent::SystemControl);
        let parsed: Intent = serde_json::from_str("\"open_app\"").unwrap();
        assert_eq!(parsed, Intent::SystemControl);
        assert_eq!(
            serde_json::to_string(&Intent::SystemControl).unwrap(),
            "\"system_control\""
        );
    }

    #[test]
    fn labels_round_trip_through_from_str() {
        for intent in Intent::CLASSIFIABLE {
            assert_eq!(intent.as_str().parse::<Intent>().unwrap(), intent);
        }
        assert!("dance".parse::<Intent>().is_err());
    }

    #[test]
    fn unknown_and_greeting_never_dispatch() {
        assert!(Intent::Unknown.handler().is_none());
        assert!(Intent::Greeting.handler().is_none());
        assert_eq!(Intent::MakeCall.handler(), Some(HandlerId::Calling));
        assert!(Intent::MakeCall.requires_contact());
        assert!(!Intent::PlayMedia.requires_contact());
    }
}
