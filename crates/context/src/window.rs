//! Window Builder: the end-to-end pipeline.
//!
//! For every category, in build order:
//!
//! 1. **Convert** the source records into [`ContentItem`]s
//! 2. **Select** against that category's sub-budget
//! 3. **Record** per-category stats and what was dropped
//!
//! The per-category selections are concatenated (conversation, memory,
//! lesson, entity) and then arranged for position, or sorted
//! chronologically.
//!
//! # Determinism
//!
//! The only time-dependent input is `now`, used for recency. [`WindowBuilder::build_at`]
//! takes it explicitly, so identical inputs give identical windows.

use chrono::{DateTime, Utc};
use recallkit_config::AppConfig;
use recallkit_core::{ContextError, ConversationTurn, EntityRecord, LessonRecord, MemoryRecord};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::arrange::Arrangement;
use crate::budget::{Budget, CategoryCounts};
use crate::convert;
use crate::item::{Category, ContentItem};
use crate::select::{select_detailed, SelectionWeights};
use crate::token::TokenEstimator;

// ── Types ─────────────────────────────────────────────────────────────────

/// Raw candidates for one build, one list per category.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CategoryCandidates {
    #[serde(default)]
    pub conversation: Vec<ConversationTurn>,
    #[serde(default)]
    pub memories: Vec<MemoryRecord>,
    #[serde(default)]
    pub lessons: Vec<LessonRecord>,
    #[serde(default)]
    pub entities: Vec<EntityRecord>,
}

impl CategoryCandidates {
    /// Candidate counts, as consumed by the adaptive budget planner.
    pub fn counts(&self) -> CategoryCounts {
        CategoryCounts {
            conversation: self.conversation.len(),
            memory: self.memories.len(),
            lesson: self.lessons.len(),
            entity: self.entities.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.counts().total() == 0
    }

    fn convert(
        &self,
        category: Category,
        estimator: TokenEstimator,
    ) -> Result<Vec<ContentItem>, ContextError> {
        Ok(match category {
            Category::Conversation => {
                convert::convert_conversation_items_with(&self.conversation, estimator)
            }
            Category::Memory => convert::convert_memory_items_with(&self.memories, estimator)?,
            Category::Lesson => convert::convert_lesson_items_with(&self.lessons, estimator),
            Category::Entity => convert::convert_entity_items_with(&self.entities, estimator),
        })
    }
}

/// Knobs for a build.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct BuildOptions {
    pub arrangement: Arrangement,
    pub weights: SelectionWeights,
    pub estimator: TokenEstimator,
}

impl BuildOptions {
    pub fn from_config(config: &AppConfig) -> Result<Self, ContextError> {
        Ok(Self {
            arrangement: config.window.arrangement.into(),
            weights: SelectionWeights::from_config(&config.selection)?,
            estimator: config.selection.estimator.into(),
        })
    }
}

/// The built window, ready for formatting.
#[derive(Debug, Clone, Serialize)]
pub struct ContextWindow {
    /// Final ordered items.
    pub items: Vec<ContentItem>,
    /// Sum of `estimated_tokens` over `items`.
    pub total_tokens: usize,
    /// The budget the window was built against.
    pub budget: Budget,
    /// True if any category had candidates that did not fit.
    pub truncated: bool,
    /// Stats for every category, in build order.
    pub per_category: Vec<CategoryStats>,
    /// One entry per category that lost items.
    pub drops: Vec<DropInfo>,
}

/// Statistics for a single category.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryStats {
    pub category: Category,
    /// Tokens consumed by the selected items.
    pub tokens: usize,
    /// Items selected.
    pub items_included: usize,
    /// Candidates before selection.
    pub items_total: usize,
}

/// Items dropped from a category during selection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DropInfo {
    pub category: Category,
    pub items_dropped: usize,
    /// Estimated tokens of dropped content.
    pub tokens_dropped: usize,
    pub reason: String,
}

// ── Builder ───────────────────────────────────────────────────────────────

/// Builds windows against a fixed budget. Stateless; reuse freely.
#[derive(Debug, Clone)]
pub struct WindowBuilder {
    budget: Budget,
    options: BuildOptions,
}

impl WindowBuilder {
    pub fn new(budget: Budget) -> Self {
        Self {
            budget,
            options: BuildOptions::default(),
        }
    }

    pub fn with_options(mut self, options: BuildOptions) -> Self {
        self.options = options;
        self
    }

    pub fn budget(&self) -> &Budget {
        &self.budget
    }

    /// Build against the current wall-clock time.
    pub fn build(&self, candidates: &CategoryCandidates) -> Result<ContextWindow, ContextError> {
        self.build_at(candidates, Utc::now())
    }

    /// Build with recency measured from `now`.
    pub fn build_at(
        &self,
        candidates: &CategoryCandidates,
        now: DateTime<Utc>,
    ) -> Result<ContextWindow, ContextError> {
        let mut selected: Vec<ContentItem> = Vec::with_capacity(candidates.counts().total());
        let mut per_category = Vec::with_capacity(Category::ALL.len());
        let mut drops = Vec::new();

        for category in Category::ALL {
            let items = candidates.convert(category, self.options.estimator)?;
            let sub_budget = self.budget.for_category(category);
            let selection = select_detailed(&items, sub_budget, &self.options.weights, now);

            debug!(
                category = %category,
                candidates = items.len(),
                selected = selection.selected.len(),
                tokens = selection.tokens,
                sub_budget,
                "Category selected"
            );

            per_category.push(CategoryStats {
                category,
                tokens: selection.tokens,
                items_included: selection.selected.len(),
                items_total: items.len(),
            });
            if let Some(drop) = drop_info(category, sub_budget, &selection) {
                drops.push(drop);
            }
            selected.extend(selection.selected);
        }

        let items = self.options.arrangement.apply(selected);
        let total_tokens = items
            .iter()
            .fold(0usize, |sum, item| sum.saturating_add(item.estimated_tokens()));
        let truncated = !drops.is_empty();

        info!(
            items = items.len(),
            total_tokens,
            allocated = self.budget.allocated(),
            truncated,
            "Context window built"
        );

        Ok(ContextWindow {
            items,
            total_tokens,
            budget: self.budget,
            truncated,
            per_category,
            drops,
        })
    }
}

/// Build a window in one call.
pub fn build(
    candidates: &CategoryCandidates,
    budget: Budget,
    options: BuildOptions,
) -> Result<ContextWindow, ContextError> {
    WindowBuilder::new(budget).with_options(options).build(candidates)
}

// ── Helpers ───────────────────────────────────────────────────────────────

fn drop_info(
    category: Category,
    sub_budget: usize,
    selection: &crate::select::Selection,
) -> Option<DropInfo> {
    if selection.dropped == 0 {
        return None;
    }
    let reason = if sub_budget == 0 {
        "No budget allocated for category"
    } else {
        "Lowest-scoring items did not fit"
    };
    Some(DropInfo {
        category,
        items_dropped: selection.dropped,
        tokens_dropped: selection.dropped_tokens,
        reason: reason.into(),
    })
}

// ── Tests ─────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::budget::{create_fixed_budget, FixedBudgetOptions};
    use chrono::Duration;
    use recallkit_core::Severity;

    // ── Helpers ────────────────────────────────────────────────────────

    fn budget(conversation: usize, memory: usize, lesson: usize, entity: usize) -> Budget {
        Budget {
            total: 10_000,
            system_prompt_reserve: 0,
            response_reserve: 0,
            conversation,
            memory,
            lesson,
            entity,
        }
    }

    fn candidates(now: DateTime<Utc>) -> CategoryCandidates {
        CategoryCandidates {
            conversation: vec![
                ConversationTurn::user("How do I deploy?")
                    .at(now - Duration::minutes(5))
                    .with_token_count(10),
                ConversationTurn::assistant("Run the release script.")
                    .at(now - Duration::minutes(4))
                    .with_token_count(10),
            ],
            memories: vec![
                MemoryRecord::new("Prefers staging first", 0.9).at(now - Duration::days(1)),
                MemoryRecord::new("Uses fish shell", 0.2).at(now - Duration::days(40)),
            ],
            lessons: vec![LessonRecord::new("Never deploy on Friday", Severity::Critical)],
            entities: vec![EntityRecord::new("release.sh", "Deploy script", 12).with_kind("file")],
        }
    }

    fn texts(window: &ContextWindow) -> Vec<&str> {
        window.items.iter().map(ContentItem::text).collect()
    }

    // ── Tests ──────────────────────────────────────────────────────────

    #[test]
    fn generous_budget_keeps_everything() {
        let now = Utc::now();
        let window = WindowBuilder::new(budget(1_000, 1_000, 1_000, 1_000))
            .build_at(&candidates(now), now)
            .unwrap();

        assert_eq!(window.items.len(), 6);
        assert!(!window.truncated);
        assert!(window.drops.is_empty());
        let sum: usize = window.items.iter().map(ContentItem::estimated_tokens).sum();
        assert_eq!(window.total_tokens, sum);
    }

    #[test]
    fn truncated_when_a_category_loses_items() {
        let now = Utc::now();
        // Conversation turns are 10 tokens each; only one fits.
        let window = WindowBuilder::new(budget(15, 1_000, 1_000, 1_000))
            .build_at(&candidates(now), now)
            .unwrap();

        assert!(window.truncated);
        assert_eq!(window.drops.len(), 1);
        assert_eq!(window.drops[0].category, Category::Conversation);
        assert_eq!(window.drops[0].items_dropped, 1);
        assert_eq!(window.drops[0].tokens_dropped, 10);

        let conv = &window.per_category[0];
        assert_eq!(conv.category, Category::Conversation);
        assert_eq!((conv.items_included, conv.items_total), (1, 2));
        // The user turn outranks the assistant turn.
        assert!(texts(&window).contains(&"user: How do I deploy?"));
        assert!(!texts(&window).contains(&"assistant: Run the release script."));
    }

    #[test]
    fn every_category_respects_its_sub_budget() {
        let now = Utc::now();
        let b = budget(12, 4, 20, 3);
        let window = WindowBuilder::new(b).build_at(&candidates(now), now).unwrap();
        for stats in &window.per_category {
            assert!(stats.tokens <= b.for_category(stats.category));
        }
        assert!(window.total_tokens <= b.allocated());
    }

    #[test]
    fn oversized_token_counts_never_enter_the_window() {
        let now = Utc::now();
        let mut c = candidates(now);
        let mut pasted = MemoryRecord::new("Pasted a whole log file", 0.1).at(now);
        pasted.token_count = Some(usize::MAX);
        c.memories.push(pasted);
        c.conversation.push(
            ConversationTurn::user("Another huge paste")
                .at(now)
                .with_token_count(usize::MAX),
        );
        let b = budget(1_000, 1_000, 1_000, 1_000);
        let window = WindowBuilder::new(b).build_at(&c, now).unwrap();

        assert_eq!(window.items.len(), 6);
        assert!(window.total_tokens <= b.allocated());
        assert_eq!(window.drops.len(), 2);
        assert!(window.drops.iter().all(|d| d.tokens_dropped == usize::MAX));
    }

    #[test]
    fn zero_budget_yields_empty_window() {
        let now = Utc::now();
        let window = WindowBuilder::new(budget(0, 0, 0, 0))
            .build_at(&candidates(now), now)
            .unwrap();
        assert!(window.items.is_empty());
        assert_eq!(window.total_tokens, 0);
        assert!(window.truncated);
        assert!(window.drops.iter().all(|d| d.reason.contains("No budget")));
    }

    #[test]
    fn empty_candidates_yield_empty_window() {
        let window = WindowBuilder::new(budget(100, 100, 100, 100))
            .build(&CategoryCandidates::default())
            .unwrap();
        assert!(window.items.is_empty());
        assert!(!window.truncated);
        assert_eq!(window.per_category.len(), 4);
    }

    #[test]
    fn chronological_arrangement_orders_by_time() {
        let now = Utc::now();
        let options = BuildOptions {
            arrangement: Arrangement::Chronological,
            ..BuildOptions::default()
        };
        let window = WindowBuilder::new(budget(1_000, 1_000, 1_000, 1_000))
            .with_options(options)
            .build_at(&candidates(now), now)
            .unwrap();
        assert!(
            window
                .items
                .windows(2)
                .all(|w| w[0].timestamp() <= w[1].timestamp())
        );
        assert_eq!(window.items[0].text(), "Uses fish shell");
    }

    #[test]
    fn lost_in_middle_puts_top_item_first() {
        let now = Utc::now();
        let window = WindowBuilder::new(budget(1_000, 1_000, 1_000, 1_000))
            .build_at(&candidates(now), now)
            .unwrap();
        let top = window
            .items
            .iter()
            .map(ContentItem::importance)
            .fold(0.0, f64::max);
        assert_eq!(window.items[0].importance(), top);
    }

    #[test]
    fn bad_memory_importance_surfaces_as_error() {
        let mut c = CategoryCandidates::default();
        c.memories.push(MemoryRecord::new("broken", 1.5));
        let err = WindowBuilder::new(budget(10, 10, 10, 10)).build(&c).unwrap_err();
        assert!(matches!(err, ContextError::InvalidInput { .. }));
    }

    #[test]
    fn deterministic_for_fixed_now() {
        let now = Utc::now();
        let c = candidates(now);
        let builder = WindowBuilder::new(budget(15, 8, 20, 5));
        let a = builder.build_at(&c, now).unwrap();
        let b = builder.build_at(&c, now).unwrap();
        assert_eq!(a.items, b.items);
        assert_eq!(a.per_category, b.per_category);
        assert_eq!(a.drops, b.drops);
    }

    #[test]
    fn counts_feed_the_adaptive_planner() {
        let now = Utc::now();
        let counts = candidates(now).counts();
        assert_eq!(counts.total(), 6);
        assert_eq!(counts.memory, 2);
        assert!(!candidates(now).is_empty());
        assert!(CategoryCandidates::default().is_empty());
    }

    #[test]
    fn options_from_config() {
        let mut config = AppConfig::default();
        config.window.arrangement = recallkit_config::ArrangementKind::Chronological;
        config.selection.estimator = recallkit_config::EstimatorKind::Words;
        let options = BuildOptions::from_config(&config).unwrap();
        assert_eq!(options.arrangement, Arrangement::Chronological);
        assert_eq!(options.estimator, TokenEstimator::Words);

        config.selection.importance_weight = -1.0;
        assert!(BuildOptions::from_config(&config).is_err());
    }

    #[test]
    fn candidates_deserialize_with_missing_lists() {
        let c: CategoryCandidates = serde_json::from_str(
            r#"{"memories":[{"id":"m1","content":"likes tea","importance":0.4,"created_at":"2026-01-01T00:00:00Z"}]}"#,
        )
        .unwrap();
        assert_eq!(c.memories.len(), 1);
        assert!(c.conversation.is_empty());
    }

    #[test]
    fn free_function_matches_builder() {
        let b = create_fixed_budget(&FixedBudgetOptions::with_total(8_192)).unwrap();
        let window = build(&CategoryCandidates::default(), b, BuildOptions::default()).unwrap();
        assert_eq!(window.budget, b);
    }
}
