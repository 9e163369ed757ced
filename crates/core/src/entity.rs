//! Known-entity records (people, projects, services...).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A fact sheet about one entity the agent has encountered.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EntityRecord {
    pub id: String,

    /// Display name
    pub name: String,

    /// Entity kind, e.g. "person" or "service"
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,

    /// What is known about the entity
    #[serde(default)]
    pub description: String,

    /// How many times the entity has been mentioned
    #[serde(default)]
    pub mention_count: u32,

    /// When the entity was last mentioned
    pub last_seen: DateTime<Utc>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token_count: Option<usize>,
}

impl EntityRecord {
    pub fn new(name: impl Into<String>, description: impl Into<String>, mention_count: u32) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            name: name.into(),
            kind: None,
            description: description.into(),
            mention_count,
            last_seen: Utc::now(),
            token_count: None,
        }
    }

    pub fn with_kind(mut self, kind: impl Into<String>) -> Self {
        self.kind = Some(kind.into());
        self
    }

    pub fn at(mut self, last_seen: DateTime<Utc>) -> Self {
        self.last_seen = last_seen;
        self
    }
}
