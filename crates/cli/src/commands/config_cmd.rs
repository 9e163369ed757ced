//! `recallkit config`: Configuration management commands.

use recallkit_config::{AppConfig, BudgetStrategy};
use recallkit_context::resolve_profile;

pub fn validate() -> Result<(), Box<dyn std::error::Error>> {
    println!("🔍 Validating configuration...");

    match AppConfig::load() {
        Ok(config) => {
            println!("   ✅ Config parsed successfully");

            // Checks that are legal but probably not intended
            let mut warnings = Vec::new();

            if config.budget.ratios.sum() < 1.0 - 1e-9 {
                warnings.push(format!(
                    "budget.ratios sum to {:.2}; the rest of the available budget is never used",
                    config.budget.ratios.sum()
                ));
            }

            if config.selection.importance_weight + config.selection.recency_weight <= 0.0 {
                warnings.push("Selection weights are both zero; every item scores the same".into());
            }

            let (profile, _) = resolve_profile(&config.default_model);
            if config.budget.strategy == BudgetStrategy::Profile
                && profile == "default"
                && config.default_model != "default"
            {
                warnings.push(format!(
                    "default_model '{}' matches no profile; the default profile is used",
                    config.default_model
                ));
            }

            if config.digest.top_memories == 0 {
                warnings.push("digest.top_memories is 0; digests will list no memories".into());
            }

            if warnings.is_empty() {
                println!("   ✅ All checks passed");
            } else {
                println!();
                for w in &warnings {
                    println!("   ⚠️  {w}");
                }
            }

            println!();
            println!("   Model:       {} (profile {profile})", config.default_model);
            println!("   Strategy:    {:?}", config.budget.strategy);
            println!("   Total:       {}", config.budget.total);
            println!("   Arrangement: {:?}", config.window.arrangement);
            println!("   Estimator:   {:?}", config.selection.estimator);
            println!("   Digest:      {} tokens", config.digest.max_tokens);
        }
        Err(e) => {
            println!("   ❌ Config error: {e}");
            return Err(e.into());
        }
    }

    Ok(())
}

pub fn show() -> Result<(), Box<dyn std::error::Error>> {
    let config = AppConfig::load().map_err(|e| format!("Failed to load config: {e}"))?;
    let toml_str = toml::to_string_pretty(&config)?;
    println!("{toml_str}");
    Ok(())
}

pub fn path() -> Result<(), Box<dyn std::error::Error>> {
    let config_path = AppConfig::config_dir().join("config.toml");
    println!("{}", config_path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    #[test]
    fn config_path_is_valid() {
        let path = recallkit_config::AppConfig::config_dir().join("config.toml");
        assert!(path.to_str().unwrap().contains("config.toml"));
    }
}
