//! RecallKit CLI: the main entry point.
//!
//! Commands:
//! - `estimate` Estimate tokens for a piece of text
//! - `budget`   Plan a token budget (profile, fixed or adaptive)
//! - `profiles` List the named model profiles
//! - `build`    Build and print a context window from a candidates file
//! - `digest`   Print a bootstrap digest from a sessions/memories file
//! - `config`   Inspect configuration
//! - `onboard`  Write a default config file

use std::path::PathBuf;

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(
    name = "recallkit",
    about = "RecallKit: budgeted context windows for LLM agents",
    version,
    author
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Estimate the token count of a text
    Estimate {
        /// Text to estimate
        text: String,

        /// Use the word-based estimator instead of the character one
        #[arg(long)]
        accurate: bool,
    },

    /// Plan a token budget
    Budget {
        /// Model profile to use (defaults to `default_model` from config)
        #[arg(short, long)]
        model: Option<String>,

        /// Plan a fixed-ratio budget around this total instead of a profile
        #[arg(short, long)]
        total: Option<usize>,

        /// Plan an adaptive budget from the candidate counts in this JSON file
        #[arg(long, value_name = "FILE")]
        adaptive: Option<PathBuf>,
    },

    /// List the named model profiles
    Profiles,

    /// Build a context window from a candidates JSON file
    Build {
        /// Candidates file: `{ conversation, memories, lessons, entities }`
        #[arg(short, long, value_name = "FILE")]
        input: PathBuf,

        /// Model profile to budget against
        #[arg(short, long)]
        model: Option<String>,

        /// Order items by time instead of lost-in-middle arrangement
        #[arg(long)]
        chronological: bool,

        /// Print items in window order without category headings
        #[arg(long)]
        flat: bool,

        /// Append category and importance to each line
        #[arg(long)]
        metadata: bool,

        /// Print window stats as JSON instead of the formatted window
        #[arg(long)]
        json: bool,
    },

    /// Print a bootstrap digest
    Digest {
        /// Input file: `{ sessions, memories }`
        #[arg(short, long, value_name = "FILE")]
        input: PathBuf,

        /// Override the digest budget, in tokens
        #[arg(long)]
        max_tokens: Option<usize>,

        /// Override how many memories to list
        #[arg(long)]
        top: Option<usize>,
    },

    /// Inspect configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },

    /// Write a default config file
    Onboard,
}

#[derive(Subcommand)]
enum ConfigAction {
    /// Print the effective configuration as TOML
    Show,
    /// Validate the configuration file
    Validate,
    /// Print the configuration file path
    Path,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // Initialize tracing
    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(filter)),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Commands::Estimate { text, accurate } => commands::estimate::run(&text, accurate)?,
        Commands::Budget {
            model,
            total,
            adaptive,
        } => commands::budget::run(model, total, adaptive)?,
        Commands::Profiles => commands::budget::profiles()?,
        Commands::Build {
            input,
            model,
            chronological,
            flat,
            metadata,
            json,
        } => commands::build::run(commands::build::BuildArgs {
            input,
            model,
            chronological,
            flat,
            metadata,
            json,
        })?,
        Commands::Digest {
            input,
            max_tokens,
            top,
        } => commands::digest::run(&input, max_tokens, top)?,
        Commands::Config { action } => match action {
            ConfigAction::Show => commands::config_cmd::show()?,
            ConfigAction::Validate => commands::config_cmd::validate()?,
            ConfigAction::Path => commands::config_cmd::path()?,
        },
        Commands::Onboard => commands::onboard::run()?,
    }

    Ok(())
}
