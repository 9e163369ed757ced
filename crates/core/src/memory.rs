//! Memory records: persistent notes the agent keeps across sessions.
//!
//! Importance is assigned by whoever stored the memory and is carried
//! through to the context engine unchanged.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A single memory entry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MemoryRecord {
    /// Unique ID for this memory
    pub id: String,

    /// The content of the memory
    pub content: String,

    /// Caller-assigned importance in [0, 1]
    #[serde(default = "default_importance")]
    pub importance: f64,

    /// Tags for categorization (used for pinning in the bootstrap digest)
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,

    /// When this memory was created
    pub created_at: DateTime<Utc>,

    /// Pre-computed token count, if the store tracks one
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token_count: Option<usize>,

    /// Free-form metadata forwarded to the formatter
    #[serde(default, skip_serializing_if = "serde_json::Map::is_empty")]
    pub metadata: serde_json::Map<String, serde_json::Value>,
}

fn default_importance() -> f64 {
    0.5
}

impl MemoryRecord {
    /// Create a memory stamped now.
    pub fn new(content: impl Into<String>, importance: f64) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            content: content.into(),
            importance,
            tags: Vec::new(),
            created_at: Utc::now(),
            token_count: None,
            metadata: serde_json::Map::new(),
        }
    }

    /// Attach tags.
    pub fn with_tags<I, S>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.tags = tags.into_iter().map(Into::into).collect();
        self
    }

    /// Override the creation time.
    pub fn at(mut self, created_at: DateTime<Utc>) -> Self {
        self.created_at = created_at;
        self
    }

    /// Whether any of this memory's tags appear in `tags`.
    pub fn has_any_tag(&self, tags: &[String]) -> bool {
        self.tags.iter().any(|t| tags.contains(t))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn memory_serialization() {
        let entry = MemoryRecord::new("The user prefers Rust over C++", 0.9).with_tags(["preference"]);
        let json = serde_json::to_string(&entry).unwrap();
        assert!(json.contains("Rust over C++"));
        assert!(json.contains("preference"));
    }

    #[test]
    fn missing_importance_defaults_to_half() {
        let json = r#"{"id":"m1","content":"x","created_at":"2026-01-01T00:00:00Z"}"#;
        let entry: MemoryRecord = serde_json::from_str(json).unwrap();
        assert!((entry.importance - 0.5).abs() < 1e-12);
    }

    #[test]
    fn tag_intersection() {
        let entry = MemoryRecord::new("x", 0.1).with_tags(["core", "infra"]);
        assert!(entry.has_any_tag(&["core".to_string()]));
        assert!(!entry.has_any_tag(&["preference".to_string()]));
        assert!(!entry.has_any_tag(&[]));
    }
}
