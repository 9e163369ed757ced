//! Greedy, score-ordered selection under a single sub-budget.
//!
//! `score = importance_weight × importance + recency_weight × exp(−age_days / 30)`
//!
//! Items are walked in descending score order and kept whenever they still
//! fit. An item that doesn't fit is skipped, and smaller items after it are
//! still considered. This is a greedy fill, not an optimal knapsack.

use chrono::{DateTime, Utc};
use recallkit_config::SelectionConfig;
use recallkit_core::ContextError;
use serde::{Deserialize, Serialize};

use crate::item::ContentItem;

/// Decay scale for the exponential recency score, in days.
pub const RECENCY_DECAY_DAYS: f64 = 30.0;

const MILLIS_PER_DAY: f64 = 86_400_000.0;

/// Importance/recency blend. Both weights are finite and non-negative.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SelectionWeights {
    importance: f64,
    recency: f64,
}

impl Default for SelectionWeights {
    fn default() -> Self {
        Self {
            importance: 0.7,
            recency: 0.3,
        }
    }
}

impl SelectionWeights {
    pub fn new(importance: f64, recency: f64) -> Result<Self, ContextError> {
        for (field, value) in [("importance_weight", importance), ("recency_weight", recency)] {
            if !value.is_finite() || value < 0.0 {
                return Err(ContextError::invalid(
                    field,
                    format!("must be a non-negative number, got {value}"),
                ));
            }
        }
        Ok(Self { importance, recency })
    }

    pub fn from_config(cfg: &SelectionConfig) -> Result<Self, ContextError> {
        Self::new(cfg.importance_weight, cfg.recency_weight)
    }

    pub fn importance(&self) -> f64 {
        self.importance
    }

    pub fn recency(&self) -> f64 {
        self.recency
    }
}

/// Result of one selection pass, with drop accounting.
#[derive(Debug, Clone, Default)]
pub struct Selection {
    /// Kept items, in score order.
    pub selected: Vec<ContentItem>,
    /// Tokens used by the kept items.
    pub tokens: usize,
    /// Candidates that did not fit.
    pub dropped: usize,
    /// Tokens of the candidates that did not fit.
    pub dropped_tokens: usize,
}

/// Age in fractional days. Timestamps in the future count as age 0.
pub fn age_days(timestamp: DateTime<Utc>, now: DateTime<Utc>) -> f64 {
    let millis = (now - timestamp).num_milliseconds() as f64;
    (millis / MILLIS_PER_DAY).max(0.0)
}

/// Exponential recency: 1.0 when fresh, e⁻¹ at 30 days.
pub fn recency_score(age_days: f64) -> f64 {
    (-age_days / RECENCY_DECAY_DAYS).exp()
}

/// Composite score of one item at `now`.
pub fn score(item: &ContentItem, weights: &SelectionWeights, now: DateTime<Utc>) -> f64 {
    weights.importance * item.importance()
        + weights.recency * recency_score(age_days(item.timestamp(), now))
}

/// Pick the highest-scoring items that fit `sub_budget`.
pub fn select(
    items: &[ContentItem],
    sub_budget: usize,
    weights: &SelectionWeights,
    now: DateTime<Utc>,
) -> Vec<ContentItem> {
    select_detailed(items, sub_budget, weights, now).selected
}

/// Like [`select`], also reporting what was dropped.
pub fn select_detailed(
    items: &[ContentItem],
    sub_budget: usize,
    weights: &SelectionWeights,
    now: DateTime<Utc>,
) -> Selection {
    if sub_budget == 0 {
        return Selection {
            dropped: items.len(),
            dropped_tokens: items
                .iter()
                .fold(0usize, |sum, item| sum.saturating_add(item.estimated_tokens())),
            ..Selection::default()
        };
    }

    let mut scored: Vec<(f64, &ContentItem)> =
        items.iter().map(|item| (score(item, weights, now), item)).collect();
    // Stable: equal scores keep input order.
    scored.sort_by(|a, b| b.0.total_cmp(&a.0));

    let mut selection = Selection::default();
    for (_, item) in scored {
        let tokens = item.estimated_tokens();
        // selection.tokens <= sub_budget holds throughout
        if tokens <= sub_budget - selection.tokens {
            selection.tokens += tokens;
            selection.selected.push(item.clone());
        } else {
            selection.dropped += 1;
            selection.dropped_tokens = selection.dropped_tokens.saturating_add(tokens);
        }
    }
    selection
}
