// src/commands.rs
use serde::{Deserialize, Serialize};

/// A line typed at the prompt: either an utterance for the assistant or a
/// `/`-prefixed meta command.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Command {
    Utterance(String),
    Meta(MetaCommand),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum MetaCommand {
    Help,
    Quit,
    History,
    ClearHistory,
    Stats,
    Metrics,
    Contacts,
    AddContact {
        name: String,
        phone: String,
        email: Option<String>,
    },
    Reminders,
    /// Meta command that did not parse; carries the usage hint.
    Invalid(String),
}

pub const HELP_TEXT: &str = "\
Type a command in plain English, e.g. 'call mom' or 'remind me to stretch in 10 minutes'.

Meta commands:
  /help                          show this help
  /history                       show the conversation so far
  /clear                         forget the conversation
  /stats                         action and classification counters
  /metrics                       Prometheus metrics
  /contacts                      list saved contacts
  /contact <name> <phone> [email] save a contact
  /reminders                     show reminders that are due
  /quit                          exit";

impl Command {
    /// `None` for blank lines.
    pub fn parse(line: &str) -> Option<Self> {
        let line = line.trim();
        if line.is_empty() {
            return None;
        }

        let Some(meta) = line.strip_prefix('/') else {
            return Some(Command::Utterance(line.to_string()));
        };

        let mut parts = meta.split_whitespace();
        let name = parts.next().unwrap_or_default().to_lowercase();
        let args: Vec<&str> = parts.collect();

        let command = match name.as_str() {
            "help" | "?" => MetaCommand::Help,
            "quit" | "exit" | "q" => MetaCommand::Quit,
            "history" => MetaCommand::History,
            "clear" => MetaCommand::ClearHistory,
            "stats" | "status" => MetaCommand::Stats,
            "metrics" => MetaCommand::Metrics,
            "contacts" => MetaCommand::Contacts,
            "contact" => match args.as_slice() {
                [name, phone] => MetaCommand::AddContact {
                    name: name.to_string(),
                    phone: phone.to_string(),
                    email: None,
                },
                [name, phone, email] => MetaCommand::AddContact {
                    name: name.to_string(),
                    phone: phone.to_string(),
                    email: Some(email.to_string()),
                },
                _ => MetaCommand::Invalid("usage: /contact <name> <phone> [email]".to_string()),
            },
            "reminders" => MetaCommand::Reminders,
            other => MetaCommand::Invalid(format!("unknown command '/{}', try /help", other)),
        };

        Some(Command::Meta(command))
    }
}
