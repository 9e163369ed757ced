//! Budget planning: splitting a total token capacity into reserves and
//! four per-category sub-budgets.
//!
//! Three strategies:
//! - fixed ratios ([`create_fixed_budget`])
//! - proportional to candidate counts ([`create_adaptive_budget`])
//! - named model profiles (see [`crate::profiles`])
//!
//! Every strategy floors, so a plan may under-allocate but never
//! over-allocate: `reserves + Σ sub-budgets ≤ total`. Reserves that do not
//! fit in `total` are cut down to it, system prompt first.

use recallkit_config::{BudgetConfig, RatioConfig};
use recallkit_core::ContextError;
use serde::{Deserialize, Serialize};

use crate::item::Category;

pub const DEFAULT_TOTAL: usize = 128_000;
pub const DEFAULT_SYSTEM_PROMPT_RESERVE: usize = 2_000;
pub const DEFAULT_RESPONSE_RESERVE: usize = 4_000;

/// A planned token budget.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Budget {
    pub total: usize,
    pub system_prompt_reserve: usize,
    pub response_reserve: usize,
    pub conversation: usize,
    pub memory: usize,
    pub lesson: usize,
    pub entity: usize,
}

impl Budget {
    /// Tokens left once both reserves are taken out.
    pub fn available(&self) -> usize {
        available(self.total, self.system_prompt_reserve, self.response_reserve)
    }

    /// Sub-budget for one category.
    pub fn for_category(&self, category: Category) -> usize {
        match category {
            Category::Conversation => self.conversation,
            Category::Memory => self.memory,
            Category::Lesson => self.lesson,
            Category::Entity => self.entity,
        }
    }

    /// Sum of the four sub-budgets.
    pub fn allocated(&self) -> usize {
        [self.conversation, self.memory, self.lesson, self.entity]
            .into_iter()
            .fold(0, usize::saturating_add)
    }
}

/// Share of the available budget per category.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CategoryRatios {
    pub conversation: f64,
    pub memory: f64,
    pub lesson: f64,
    pub entity: f64,
}

impl Default for CategoryRatios {
    fn default() -> Self {
        Self {
            conversation: 0.4,
            memory: 0.3,
            lesson: 0.2,
            entity: 0.1,
        }
    }
}

impl CategoryRatios {
    fn validate(&self) -> Result<(), ContextError> {
        let values = [
            ("ratios.conversation", self.conversation),
            ("ratios.memory", self.memory),
            ("ratios.lesson", self.lesson),
            ("ratios.entity", self.entity),
        ];
        for (field, value) in values {
            if !value.is_finite() || value < 0.0 {
                return Err(ContextError::invalid(
                    field,
                    format!("must be a non-negative number, got {value}"),
                ));
            }
        }
        let sum: f64 = values.iter().map(|(_, v)| v).sum();
        if sum > 1.0 + 1e-9 {
            return Err(ContextError::invalid(
                "ratios",
                format!("must sum to at most 1.0, got {sum}"),
            ));
        }
        Ok(())
    }
}

impl From<&RatioConfig> for CategoryRatios {
    fn from(cfg: &RatioConfig) -> Self {
        Self {
            conversation: cfg.conversation,
            memory: cfg.memory,
            lesson: cfg.lesson,
            entity: cfg.entity,
        }
    }
}

/// Inputs to the fixed-ratio planner.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FixedBudgetOptions {
    pub total: usize,
    pub system_prompt_reserve: usize,
    pub response_reserve: usize,
    pub ratios: CategoryRatios,
}

impl Default for FixedBudgetOptions {
    fn default() -> Self {
        Self::with_total(DEFAULT_TOTAL)
    }
}

impl FixedBudgetOptions {
    /// Default reserves and ratios around a given total.
    pub fn with_total(total: usize) -> Self {
        Self {
            total,
            system_prompt_reserve: DEFAULT_SYSTEM_PROMPT_RESERVE,
            response_reserve: DEFAULT_RESPONSE_RESERVE,
            ratios: CategoryRatios::default(),
        }
    }
}

impl From<&BudgetConfig> for FixedBudgetOptions {
    fn from(cfg: &BudgetConfig) -> Self {
        Self {
            total: cfg.total,
            system_prompt_reserve: cfg.system_prompt_reserve,
            response_reserve: cfg.response_reserve,
            ratios: CategoryRatios::from(&cfg.ratios),
        }
    }
}

/// Number of candidates available per category.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryCounts {
    pub conversation: usize,
    pub memory: usize,
    pub lesson: usize,
    pub entity: usize,
}

impl CategoryCounts {
    pub fn total(&self) -> usize {
        self.conversation + self.memory + self.lesson + self.entity
    }
}

/// Fixed-ratio strategy: `floor(available × ratio)` per category.
pub fn create_fixed_budget(opts: &FixedBudgetOptions) -> Result<Budget, ContextError> {
    opts.ratios.validate()?;
    Ok(split_fixed(opts))
}

/// Infallible core of the fixed-ratio strategy; ratios must already be valid.
pub(crate) fn split_fixed(opts: &FixedBudgetOptions) -> Budget {
    let (system_prompt_reserve, response_reserve) =
        fit_reserves(opts.total, opts.system_prompt_reserve, opts.response_reserve);
    let available = opts.total - system_prompt_reserve - response_reserve;

    // f64 products can round past `available` for very large totals, so each
    // share is capped by what is still unallocated.
    let mut remaining = available;
    let mut share = |ratio: f64| {
        let granted = ((available as f64 * ratio).floor() as usize).min(remaining);
        remaining -= granted;
        granted
    };

    Budget {
        total: opts.total,
        system_prompt_reserve,
        response_reserve,
        conversation: share(opts.ratios.conversation),
        memory: share(opts.ratios.memory),
        lesson: share(opts.ratios.lesson),
        entity: share(opts.ratios.entity),
    }
}

/// Corpus-adaptive strategy: each category's share of the available budget
/// follows its share of the candidate count. No candidates at all falls back
/// to the default fixed ratios.
pub fn create_adaptive_budget(total: usize, counts: &CategoryCounts) -> Budget {
    let count_total = counts.total();
    if count_total == 0 {
        return split_fixed(&FixedBudgetOptions::with_total(total));
    }

    let (system_prompt_reserve, response_reserve) =
        fit_reserves(total, DEFAULT_SYSTEM_PROMPT_RESERVE, DEFAULT_RESPONSE_RESERVE);
    let available = total - system_prompt_reserve - response_reserve;
    // Integer arithmetic keeps the floor exact.
    let share = |count: usize| (available as u128 * count as u128 / count_total as u128) as usize;

    Budget {
        total,
        system_prompt_reserve,
        response_reserve,
        conversation: share(counts.conversation),
        memory: share(counts.memory),
        lesson: share(counts.lesson),
        entity: share(counts.entity),
    }
}

/// Reserves as stored in a plan: never more than `total` between them.
fn fit_reserves(total: usize, system_prompt_reserve: usize, response_reserve: usize) -> (usize, usize) {
    let system_prompt_reserve = system_prompt_reserve.min(total);
    let response_reserve = response_reserve.min(total - system_prompt_reserve);
    (system_prompt_reserve, response_reserve)
}

fn available(total: usize, system_prompt_reserve: usize, response_reserve: usize) -> usize {
    total
        .saturating_sub(system_prompt_reserve)
        .saturating_sub(response_reserve)
}
