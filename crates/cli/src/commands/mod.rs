//! One module per subcommand, plus the helpers they share.

pub mod budget;
pub mod build;
pub mod config_cmd;
pub mod digest;
pub mod estimate;
pub mod onboard;

use std::path::Path;

use recallkit_config::{AppConfig, BudgetStrategy};
use recallkit_context::{
    create_adaptive_budget, create_fixed_budget, resolve_profile, Budget, CategoryCounts,
    FixedBudgetOptions,
};
use serde::de::DeserializeOwned;

/// Read and parse a JSON input file.
pub fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T, Box<dyn std::error::Error>> {
    let content = std::fs::read_to_string(path)
        .map_err(|e| format!("Failed to read {}: {e}", path.display()))?;
    let value = serde_json::from_str(&content).map_err(|e| {
        format!("Failed to parse {}: {}", path.display(), recallkit_core::Error::from(e))
    })?;
    Ok(value)
}

/// Plan the budget for a build.
///
/// An explicit model always selects its profile. Otherwise the configured
/// strategy decides: the `default_model` profile, fixed ratios around
/// `budget.total`, or an adaptive split of `budget.total` over `counts`.
pub fn plan_budget(
    config: &AppConfig,
    model: Option<&str>,
    counts: &CategoryCounts,
) -> recallkit_core::Result<(String, Budget)> {
    if let Some(model) = model {
        let (id, budget) = resolve_profile(model);
        return Ok((format!("profile {id}"), budget));
    }

    match config.budget.strategy {
        BudgetStrategy::Profile => {
            let (id, budget) = resolve_profile(&config.default_model);
            Ok((format!("profile {id}"), budget))
        }
        BudgetStrategy::Fixed => {
            let budget = create_fixed_budget(&FixedBudgetOptions::from(&config.budget))?;
            Ok(("fixed ratios".into(), budget))
        }
        BudgetStrategy::Adaptive => Ok((
            "adaptive".into(),
            create_adaptive_budget(config.budget.total, counts),
        )),
    }
}
