//! `recallkit budget` / `recallkit profiles`: Budget planning.

use std::path::PathBuf;

use recallkit_config::AppConfig;
use recallkit_context::{
    create_adaptive_budget, create_fixed_budget, profiles as profile_table, resolve_profile,
    Budget, CategoryCandidates, FixedBudgetOptions,
};

/// Plan and print one budget.
pub fn run(
    model: Option<String>,
    total: Option<usize>,
    adaptive: Option<PathBuf>,
) -> Result<(), Box<dyn std::error::Error>> {
    let config = AppConfig::load()?;

    let (label, budget) = if let Some(path) = adaptive {
        let candidates: CategoryCandidates = super::read_json(&path)?;
        let total = total.unwrap_or(config.budget.total);
        let counts = candidates.counts();
        println!(
            "   Candidates: {} conversation, {} memory, {} lesson, {} entity",
            counts.conversation, counts.memory, counts.lesson, counts.entity
        );
        ("adaptive".to_string(), create_adaptive_budget(total, &counts))
    } else if let Some(total) = total {
        let opts = FixedBudgetOptions {
            total,
            ..FixedBudgetOptions::from(&config.budget)
        };
        ("fixed ratios".to_string(), create_fixed_budget(&opts)?)
    } else {
        let requested = model.unwrap_or_else(|| config.default_model.clone());
        let (id, budget) = resolve_profile(&requested);
        (format!("profile {id}"), budget)
    };

    print_budget(&label, &budget);
    Ok(())
}

/// List the named profile table.
pub fn profiles() -> Result<(), Box<dyn std::error::Error>> {
    println!("📐 Model Profiles (tokens)");
    println!("──────────────────────────────────────────────────────────────────────");
    println!(
        "{:<20} {:>9} {:>9} {:>9} {:>9} {:>9}",
        "Profile", "Total", "Conv", "Memory", "Lesson", "Entity"
    );
    println!(
        "{:<20} {:>9} {:>9} {:>9} {:>9} {:>9}",
        "───────", "─────", "────", "──────", "──────", "──────"
    );

    let mut count = 0;
    for (id, b) in profile_table::profiles() {
        println!(
            "{:<20} {:>9} {:>9} {:>9} {:>9} {:>9}",
            id, b.total, b.conversation, b.memory, b.lesson, b.entity
        );
        count += 1;
    }

    println!();
    println!("  {count} profiles; unknown models use `default`");
    Ok(())
}

fn print_budget(label: &str, b: &Budget) {
    println!("📊 Token Budget ({label})");
    println!("─────────────────────────────────────");
    println!("  Total:             {}", b.total);
    println!("  System prompt:     {}", b.system_prompt_reserve);
    println!("  Response:          {}", b.response_reserve);
    println!("  Available:         {}", b.available());
    println!("  ├ Conversation:    {}", b.conversation);
    println!("  ├ Memory:          {}", b.memory);
    println!("  ├ Lesson:          {}", b.lesson);
    println!("  └ Entity:          {}", b.entity);
    println!("  Allocated:         {}", b.allocated());
}
