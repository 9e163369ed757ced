//! Bootstrap digest: a short, character-budgeted primer for a new session.
//!
//! Unlike the window builder this works in characters, not tokens
//! (`max_tokens × 4`), and has one flat budget instead of four sub-budgets.
//! Two sections, in priority order:
//!
//! | Section | Content |
//! |---------|---------|
//! | `## Recent Context (… ago)` | last session's summary, or its last 3 turns |
//! | `## Key Memories` | pinned memories first, then the best-scoring rest |
//!
//! Memory score here uses a **linear** recency, `max(0, 1 − age_days / 30)`,
//! blended by `recency_bias`. The selector's exponential recency is not used.

use chrono::{DateTime, Utc};
use recallkit_config::DigestConfig;
use recallkit_core::{ContextError, MemoryRecord, SessionSummary};
use tracing::debug;

use crate::item::validate_importance;
use crate::select::{age_days, RECENCY_DECAY_DAYS};

/// Characters per token in the digest's unit conversion.
pub const CHARS_PER_TOKEN: usize = 4;

/// Turns shown when a session has no written summary.
pub const FALLBACK_TURNS: usize = 3;

const RECENT_CONTEXT_HEADING: &str = "## Recent Context";
const KEY_MEMORIES_HEADING: &str = "## Key Memories";
const SECTION_SEPARATOR: &str = "\n\n";

#[derive(Debug, Clone, PartialEq)]
pub struct DigestOptions {
    /// Budget in tokens, converted to `max_tokens × 4` characters.
    pub max_tokens: usize,
    pub include_last_session: bool,
    pub top_memories: usize,
    /// Memories carrying any of these tags are listed before all others.
    pub always_include_tags: Vec<String>,
    /// Weight of recency against importance, within [0, 1].
    pub recency_bias: f64,
}

impl Default for DigestOptions {
    fn default() -> Self {
        Self::from_config(&DigestConfig::default())
    }
}

impl DigestOptions {
    pub fn from_config(cfg: &DigestConfig) -> Self {
        Self {
            max_tokens: cfg.max_tokens,
            include_last_session: cfg.include_last_session,
            top_memories: cfg.top_memories,
            always_include_tags: cfg.always_include_tags.clone(),
            recency_bias: cfg.recency_bias,
        }
    }

    pub fn char_budget(&self) -> usize {
        self.max_tokens.saturating_mul(CHARS_PER_TOKEN)
    }

    fn validate(&self) -> Result<(), ContextError> {
        if !(0.0..=1.0).contains(&self.recency_bias) {
            return Err(ContextError::invalid(
                "recency_bias",
                format!("must be within [0, 1], got {}", self.recency_bias),
            ));
        }
        Ok(())
    }
}

/// Most recently ended session. Sessions still running are skipped.
pub fn latest_ended_session(sessions: &[SessionSummary]) -> Option<&SessionSummary> {
    sessions
        .iter()
        .filter(|s| s.is_ended())
        .max_by_key(|s| s.ended_at)
}

/// Human-readable distance from `then` to `now`.
pub fn time_ago(then: DateTime<Utc>, now: DateTime<Utc>) -> String {
    let minutes = (now - then).num_minutes();
    if minutes < 1 {
        return "just now".into();
    }
    let (n, unit) = if minutes < 60 {
        (minutes, "minute")
    } else if minutes < 60 * 24 {
        (minutes / 60, "hour")
    } else {
        (minutes / (60 * 24), "day")
    };
    let plural = if n == 1 { "" } else { "s" };
    format!("{n} {unit}{plural} ago")
}

/// Linear recency: 1.0 when fresh, 0 from 30 days on.
pub fn linear_recency(age_days: f64) -> f64 {
    (1.0 - age_days / RECENCY_DECAY_DAYS).max(0.0)
}

/// Build a digest against the current wall-clock time.
pub fn digest(
    session: Option<&SessionSummary>,
    memories: &[MemoryRecord],
    opts: &DigestOptions,
) -> Result<String, ContextError> {
    digest_at(session, memories, opts, Utc::now())
}

/// Build a digest with ages measured from `now`.
///
/// Returns an empty string when no section qualifies. The result never
/// exceeds [`DigestOptions::char_budget`] characters.
pub fn digest_at(
    session: Option<&SessionSummary>,
    memories: &[MemoryRecord],
    opts: &DigestOptions,
    now: DateTime<Utc>,
) -> Result<String, ContextError> {
    opts.validate()?;

    let budget = opts.char_budget();
    let mut sections: Vec<String> = Vec::new();
    let mut used = 0usize;

    if opts.include_last_session {
        if let Some(section) = session.and_then(|s| recent_context(s, now)) {
            let len = char_len(&section);
            if len <= budget {
                used += len;
                sections.push(section);
            } else {
                debug!(chars = len, budget, "Recent context does not fit, skipped");
            }
        }
    }

    let lines = memory_lines(memories, opts, now)?;
    if !lines.is_empty() {
        let separator = if sections.is_empty() { 0 } else { char_len(SECTION_SEPARATOR) };
        let remaining = budget.saturating_sub(used + separator);
        if let Some(section) = fit_lines(KEY_MEMORIES_HEADING, &lines, remaining) {
            used += separator + char_len(&section);
            sections.push(section);
        }
    }

    debug!(sections = sections.len(), chars = used, budget, "Bootstrap digest built");
    Ok(sections.join(SECTION_SEPARATOR))
}

// ── Sections ──────────────────────────────────────────────────────────────

fn recent_context(session: &SessionSummary, now: DateTime<Utc>) -> Option<String> {
    let body = match session.summary_text() {
        Some(summary) => summary.to_string(),
        None => {
            let skip = session.recent_turns.len().saturating_sub(FALLBACK_TURNS);
            let turns: Vec<String> = session.recent_turns[skip..]
                .iter()
                .map(|t| format!("{}: {}", t.role, t.content))
                .collect();
            if turns.is_empty() {
                return None;
            }
            turns.join("\n")
        }
    };
    let reference = session.ended_at.unwrap_or(session.started_at);
    Some(format!(
        "{RECENT_CONTEXT_HEADING} ({})\n{body}",
        time_ago(reference, now)
    ))
}

/// Ranked `- content` lines: pinned first, each group by score descending.
fn memory_lines(
    memories: &[MemoryRecord],
    opts: &DigestOptions,
    now: DateTime<Utc>,
) -> Result<Vec<String>, ContextError> {
    if opts.top_memories == 0 {
        return Ok(Vec::new());
    }

    let mut ranked = Vec::with_capacity(memories.len());
    for memory in memories {
        validate_importance(memory.importance).map_err(|_| {
            ContextError::invalid(
                format!("memory {} importance", memory.id),
                format!("must be a number within [0, 1], got {}", memory.importance),
            )
        })?;
        let recency = linear_recency(age_days(memory.created_at, now));
        let score = memory.importance * (1.0 - opts.recency_bias) + recency * opts.recency_bias;
        let pinned = memory.has_any_tag(&opts.always_include_tags);
        ranked.push((pinned, score, memory));
    }

    // Stable: pinned before unpinned, then by score.
    ranked.sort_by(|a, b| b.0.cmp(&a.0).then(b.1.total_cmp(&a.1)));

    Ok(ranked
        .into_iter()
        .take(opts.top_memories)
        .map(|(_, _, m)| format!("- {}", single_line(&m.content)))
        .collect())
}

/// The whole section if it fits, else the heading plus as many leading
/// lines as fit. `None` if not even one line fits.
fn fit_lines(heading: &str, lines: &[String], budget: usize) -> Option<String> {
    let mut out = heading.to_string();
    let mut len = char_len(heading);
    let mut kept = 0;
    for line in lines {
        let next = 1 + char_len(line);
        if len + next > budget {
            break;
        }
        out.push('\n');
        out.push_str(line);
        len += next;
        kept += 1;
    }
    if kept < lines.len() {
        debug!(kept, total = lines.len(), "Key memories truncated to fit");
    }
    (kept > 0).then_some(out)
}

fn single_line(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn char_len(s: &str) -> usize {
    s.chars().count()
}
