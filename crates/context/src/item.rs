//! The uniform content item every candidate is converted into.

use chrono::{DateTime, Utc};
use recallkit_core::ContextError;
use serde::{Deserialize, Serialize};

/// Content category. Closed set; a new category needs a new converter.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Conversation,
    Memory,
    Lesson,
    Entity,
}

impl Category {
    /// Build order: the order categories are filled and concatenated.
    pub const ALL: [Category; 4] = [
        Category::Conversation,
        Category::Memory,
        Category::Lesson,
        Category::Entity,
    ];

    /// Heading order used by the grouped formatter.
    pub const PRESENTATION_ORDER: [Category; 4] = [
        Category::Memory,
        Category::Lesson,
        Category::Entity,
        Category::Conversation,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Conversation => "conversation",
            Self::Memory => "memory",
            Self::Lesson => "lesson",
            Self::Entity => "entity",
        }
    }

    /// Section heading for grouped output.
    pub fn heading(&self) -> &'static str {
        match self {
            Self::Conversation => "[Conversation]",
            Self::Memory => "[Memories]",
            Self::Lesson => "[Lessons Learned]",
            Self::Entity => "[Known Entities]",
        }
    }
}

impl std::fmt::Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One candidate piece of context.
///
/// Immutable once built: fields are private and only readable through
/// accessors, so the engine can reorder and filter items but never edit them.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ContentItem {
    category: Category,
    text: String,
    importance: f64,
    timestamp: DateTime<Utc>,
    estimated_tokens: usize,
    #[serde(skip_serializing_if = "serde_json::Map::is_empty")]
    source_metadata: serde_json::Map<String, serde_json::Value>,
}

impl ContentItem {
    /// Build an item, rejecting importance outside [0, 1].
    pub fn new(
        category: Category,
        text: impl Into<String>,
        importance: f64,
        timestamp: DateTime<Utc>,
        estimated_tokens: usize,
    ) -> Result<Self, ContextError> {
        validate_importance(importance)?;
        Ok(Self::trusted(
            category,
            text.into(),
            importance,
            timestamp,
            estimated_tokens,
        ))
    }

    /// Constructor for converter-assigned importances, which are in range by construction.
    pub(crate) fn trusted(
        category: Category,
        text: String,
        importance: f64,
        timestamp: DateTime<Utc>,
        estimated_tokens: usize,
    ) -> Self {
        debug_assert!((0.0..=1.0).contains(&importance));
        Self {
            category,
            text,
            importance,
            timestamp,
            estimated_tokens,
            source_metadata: serde_json::Map::new(),
        }
    }

    /// Attach passthrough metadata.
    pub fn with_metadata(mut self, metadata: serde_json::Map<String, serde_json::Value>) -> Self {
        self.source_metadata = metadata;
        self
    }

    pub fn category(&self) -> Category {
        self.category
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn importance(&self) -> f64 {
        self.importance
    }

    pub fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }

    pub fn estimated_tokens(&self) -> usize {
        self.estimated_tokens
    }

    pub fn source_metadata(&self) -> &serde_json::Map<String, serde_json::Value> {
        &self.source_metadata
    }
}

pub(crate) fn validate_importance(importance: f64) -> Result<(), ContextError> {
    if !importance.is_finite() || !(0.0..=1.0).contains(&importance) {
        return Err(ContextError::invalid(
            "importance",
            format!("must be a number within [0, 1], got {importance}"),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn valid_item_exposes_fields() {
        let now = Utc::now();
        let item = ContentItem::new(Category::Memory, "likes tea", 0.4, now, 3).unwrap();
        assert_eq!(item.category(), Category::Memory);
        assert_eq!(item.text(), "likes tea");
        assert_eq!(item.timestamp(), now);
        assert_eq!(item.estimated_tokens(), 3);
        assert!(item.source_metadata().is_empty());
    }

    // Hardening: out-of-range importance fails fast instead of skewing scores.
    #[test]
    fn out_of_range_importance_rejected() {
        let now = Utc::now();
        for bad in [-0.1, 1.01, f64::NAN, f64::INFINITY] {
            let err = ContentItem::new(Category::Lesson, "x", bad, now, 1).unwrap_err();
            assert!(matches!(err, ContextError::InvalidInput { ref field, .. } if field == "importance"));
        }
    }

    #[test]
    fn boundary_importances_accepted() {
        let now = Utc::now();
        assert!(ContentItem::new(Category::Entity, "a", 0.0, now, 1).is_ok());
        assert!(ContentItem::new(Category::Entity, "b", 1.0, now, 1).is_ok());
    }

    #[test]
    fn presentation_order_differs_from_build_order() {
        assert_eq!(Category::ALL[0], Category::Conversation);
        assert_eq!(Category::PRESENTATION_ORDER[3], Category::Conversation);
        assert_eq!(Category::Lesson.to_string(), "lesson");
    }
}
