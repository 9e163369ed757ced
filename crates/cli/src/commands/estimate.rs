//! `recallkit estimate`: Token estimate for a piece of text.

use recallkit_context::TokenEstimator;

pub fn run(text: &str, accurate: bool) -> Result<(), Box<dyn std::error::Error>> {
    let estimator = if accurate {
        TokenEstimator::Words
    } else {
        TokenEstimator::Chars
    };
    let tokens = estimator.estimate(text);

    println!("🔢 Token estimate");
    println!("   Characters: {}", text.chars().count());
    println!("   Words:      {}", text.split_whitespace().count());
    println!(
        "   Tokens:     {tokens} ({})",
        if accurate { "word-based" } else { "character-based" }
    );

    Ok(())
}
