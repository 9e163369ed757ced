//! Session summaries, consumed by the bootstrap digest.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::message::ConversationTurn;

/// A session as seen by the digest: an optional written summary plus
/// the tail of its conversation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionSummary {
    pub id: String,

    /// Written summary, if the session was summarised when it ended
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,

    pub started_at: DateTime<Utc>,

    /// `None` while the session is still running
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ended_at: Option<DateTime<Utc>>,

    /// Most recent turns, oldest first
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub recent_turns: Vec<ConversationTurn>,
}

impl SessionSummary {
    /// A session that started and ended at `ended_at`, with a summary.
    pub fn ended(summary: impl Into<String>, ended_at: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            summary: Some(summary.into()),
            started_at: ended_at,
            ended_at: Some(ended_at),
            recent_turns: Vec::new(),
        }
    }

    /// Whether the session has finished.
    pub fn is_ended(&self) -> bool {
        self.ended_at.is_some()
    }

    /// The summary, ignoring blank ones.
    pub fn summary_text(&self) -> Option<&str> {
        self.summary
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
    }
}
