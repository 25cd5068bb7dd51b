// crates/core/src/entities.rs
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Kinds of entity the extractor can produce. No other keys ever appear in
/// an [`EntityMap`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityKind {
    Contact,
    Message,
    Time,
    App,
    Media,
    FileName,
    FileType,
    ReminderText,
    /// Alarm category (`alarm`, `reminder`, ..., `general`).
    Type,
}

impl EntityKind {
    pub const ALL: [EntityKind; 9] = [
        EntityKind::Contact,
        EntityKind::Message,
        EntityKind::Time,
        EntityKind::App,
        EntityKind::Media,
        EntityKind::FileName,
        EntityKind::FileType,
        EntityKind::ReminderText,
        EntityKind::Type,
    ];

    pub fn key(&self) -> &'static str {
        match self {
            EntityKind::Contact => "contact",
            EntityKind::Message => "message",
            EntityKind::Time => "time",
            EntityKind::App => "app",
            EntityKind::Media => "media",
            EntityKind::FileName => "file_name",
            EntityKind::FileType => "file_type",
            EntityKind::ReminderText => "reminder_text",
            EntityKind::Type => "type",
        }
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

/// Entities extracted from one utterance.
///
/// A key is present only when extraction produced a non-empty value; an
/// absent key always means "not found".
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EntityMap {
    values: BTreeMap<EntityKind, String>,
}

impl EntityMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores `value` under `kind` after trimming. Blank values are dropped
    /// and `false` is returned.
    pub fn insert(&mut self, kind: EntityKind, value: impl Into<String>) -> bool {
        let value = value.into();
        let trimmed = value.trim();
        if trimmed.is_empty() {
            return false;
        }
        self.values.insert(kind, trimmed.to_string());
        true
    }

    /// Inserts when `value` is `Some`, returning whether anything was stored.
    pub fn insert_opt(&mut self, kind: EntityKind, value: Option<String>) -> bool {
        match value {
            Some(value) => self.insert(kind, value),
            None => false,
        }
    }

    pub fn get(&self, kind: EntityKind) -> Option<&str> {
        self.values.get(&kind).map(String::as_str)
    }

    pub fn contains(&self, kind: EntityKind) -> bool {
        self.values.contains_key(&kind)
    }

    pub fn remove(&mut self, kind: EntityKind) -> Option<String> {
        self.values.remove(&kind)
    }

    pub fn kinds(&self) -> impl Iterator<Item = EntityKind> + '_ {
        self.values.keys().copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = (EntityKind, &str)> + '_ {
        self.values.iter().map(|(k, v)| (*k, v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}
