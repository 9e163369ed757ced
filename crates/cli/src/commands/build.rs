//! `recallkit build`: Build a context window from a candidates file.

use std::path::PathBuf;

use recallkit_config::AppConfig;
use recallkit_context::{
    format_window, window_stats, Arrangement, BuildOptions, CategoryCandidates, FormatOptions,
    WindowBuilder,
};

pub struct BuildArgs {
    pub input: PathBuf,
    pub model: Option<String>,
    pub chronological: bool,
    pub flat: bool,
    pub metadata: bool,
    pub json: bool,
}

pub fn run(args: BuildArgs) -> Result<(), Box<dyn std::error::Error>> {
    let config = AppConfig::load()?;
    let candidates: CategoryCandidates = super::read_json(&args.input)?;

    let (label, budget) =
        super::plan_budget(&config, args.model.as_deref(), &candidates.counts())?;
    tracing::debug!(budget = %label, allocated = budget.allocated(), "Budget planned");

    let mut options = BuildOptions::from_config(&config)?;
    if args.chronological {
        options.arrangement = Arrangement::Chronological;
    }

    let window = WindowBuilder::new(budget).with_options(options).build(&candidates)?;

    if args.json {
        let report = serde_json::json!({
            "budget": window.budget,
            "stats": window_stats(&window),
            "per_category": window.per_category,
            "drops": window.drops,
        });
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    let mut format = FormatOptions::from(&config.format);
    if args.flat {
        format.group_by_category = false;
    }
    if args.metadata {
        format.include_metadata = true;
    }

    let text = format_window(&window, &format);
    if text.is_empty() {
        println!("(empty window: no candidates fit the {label} budget)");
    } else {
        println!("{text}");
    }

    let stats = window_stats(&window);
    eprintln!();
    eprintln!(
        "📦 {} items, {} tokens ({:.1}% of {} allocated, {label})",
        stats.item_count,
        stats.total_tokens,
        stats.utilization_ratio * 100.0,
        budget.allocated()
    );
    for drop in &window.drops {
        eprintln!(
            "   ⚠️  {}: dropped {} items ({} tokens), {}",
            drop.category, drop.items_dropped, drop.tokens_dropped, drop.reason
        );
    }

    Ok(())
}
