//! `recallkit digest`: Bootstrap digest for a fresh session.

use std::path::Path;

use recallkit_config::AppConfig;
use recallkit_context::{digest, latest_ended_session, DigestOptions};
use recallkit_core::{MemoryRecord, SessionSummary};
use serde::Deserialize;

/// Input file layout.
#[derive(Debug, Default, Deserialize)]
pub struct DigestInput {
    #[serde(default)]
    pub sessions: Vec<SessionSummary>,
    #[serde(default)]
    pub memories: Vec<MemoryRecord>,
}

pub fn run(
    input: &Path,
    max_tokens: Option<usize>,
    top: Option<usize>,
) -> Result<(), Box<dyn std::error::Error>> {
    let config = AppConfig::load()?;
    let data: DigestInput = super::read_json(input)?;

    let mut opts = DigestOptions::from_config(&config.digest);
    if let Some(max_tokens) = max_tokens {
        opts.max_tokens = max_tokens;
    }
    if let Some(top) = top {
        opts.top_memories = top;
    }

    let session = latest_ended_session(&data.sessions);
    if session.is_none() && !data.sessions.is_empty() {
        tracing::info!("No ended session found, skipping recent context");
    }

    let text = digest(session, &data.memories, &opts)?;
    if text.is_empty() {
        println!("(nothing to include in the digest)");
    } else {
        println!("{text}");
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn input_lists_are_optional() {
        let input: DigestInput = serde_json::from_str("{}").unwrap();
        assert!(input.sessions.is_empty());
        assert!(input.memories.is_empty());
    }
}
