//! Summary statistics for a built window.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::item::Category;
use crate::window::ContextWindow;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WindowStats {
    pub item_count: usize,
    pub total_tokens: usize,
    /// `total_tokens / Σ sub-budgets`, or 0 when nothing was allocated.
    pub utilization_ratio: f64,
    /// Every category is present, with 0 for categories with no items.
    pub counts_by_category: BTreeMap<Category, usize>,
    pub truncated: bool,
}

pub fn window_stats(window: &ContextWindow) -> WindowStats {
    let mut counts_by_category: BTreeMap<Category, usize> =
        Category::ALL.iter().map(|&c| (c, 0)).collect();
    for item in &window.items {
        *counts_by_category.entry(item.category()).or_default() += 1;
    }

    let allocated = window.budget.allocated();
    let utilization_ratio = if allocated == 0 {
        0.0
    } else {
        window.total_tokens as f64 / allocated as f64
    };

    WindowStats {
        item_count: window.items.len(),
        total_tokens: window.total_tokens,
        utilization_ratio,
        counts_by_category,
        truncated: window.truncated,
    }
}
