//! Built-in model profiles: model identifier → context capacity.
//!
//! Each profile is expanded through the fixed-ratio planner once, the first
//! time the table is touched. The table is read-only afterwards.

use std::collections::BTreeMap;
use std::sync::LazyLock;

use crate::budget::{split_fixed, Budget, FixedBudgetOptions};

/// Profile used for unknown model identifiers.
pub const DEFAULT_PROFILE: &str = "default";

const PROFILE_CAPACITIES: &[(&str, usize)] = &[
    // ── Anthropic ──────────────────────────────────────────────
    ("claude-3-opus", 200_000),
    ("claude-3-sonnet", 200_000),
    ("claude-3-haiku", 200_000),
    ("claude-3.5-sonnet", 200_000),
    ("claude-sonnet-4", 200_000),
    // ── OpenAI ─────────────────────────────────────────────────
    ("gpt-4o", 128_000),
    ("gpt-4-turbo", 128_000),
    ("gpt-4", 8_192),
    ("gpt-3.5-turbo", 16_384),
    // ── Mistral ────────────────────────────────────────────────
    ("mistral-large", 32_000),
    // ── Fallback ───────────────────────────────────────────────
    (DEFAULT_PROFILE, 128_000),
];

static PROFILES: LazyLock<BTreeMap<&'static str, Budget>> = LazyLock::new(|| {
    PROFILE_CAPACITIES
        .iter()
        .map(|&(id, total)| (id, split_fixed(&FixedBudgetOptions::with_total(total))))
        .collect()
});

/// Budget for a model identifier, or the default profile if unknown.
pub fn get_named_budget(model_id: &str) -> Budget {
    resolve_profile(model_id).1
}

/// Resolve a model identifier to `(profile id, budget)`.
///
/// Matching is case-insensitive and tries, in order:
/// 1. the exact identifier
/// 2. the identifier without a `provider/` prefix (`openai/gpt-4o` → `gpt-4o`)
/// 3. the longest profile id that prefixes it (`gpt-4-0613` → `gpt-4`)
pub fn resolve_profile(model_id: &str) -> (&'static str, Budget) {
    let lower = model_id.trim().to_lowercase();
    let bare = lower.rsplit('/').next().unwrap_or(&lower);

    for candidate in [lower.as_str(), bare] {
        if let Some((id, budget)) = PROFILES.get_key_value(candidate) {
            return (*id, *budget);
        }
    }

    let best = PROFILES
        .iter()
        .filter(|(id, _)| **id != DEFAULT_PROFILE && bare.starts_with(**id))
        .max_by_key(|(id, _)| id.len());

    match best {
        Some((id, budget)) => (*id, *budget),
        None => {
            tracing::debug!(model = %model_id, "Unknown model, using default profile");
            (DEFAULT_PROFILE, PROFILES[DEFAULT_PROFILE])
        }
    }
}

/// All profiles, sorted by id.
pub fn profiles() -> impl Iterator<Item = (&'static str, &'static Budget)> {
    PROFILES.iter().map(|(id, budget)| (*id, budget))
}
