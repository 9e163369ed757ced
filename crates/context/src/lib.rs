//! The context assembly engine.
//!
//! Given candidate records from four categories and a token budget, builds
//! the window of content that goes in front of the model:
//!
//! 1. **Plan** a budget: fixed ratios, adaptive to candidate counts, or a
//!    named model profile
//! 2. **Convert** each category's records into uniform [`ContentItem`]s
//! 3. **Select** the best-scoring items per category within its sub-budget
//! 4. **Arrange** the survivors so the most important sit at the edges
//! 5. **Format** the window as prompt text
//!
//! The [`bootstrap`] module is a sibling: a character-budgeted digest of the
//! last session and key memories, used to prime a fresh session.
//!
//! Everything here is synchronous and pure. The only clock reads are the
//! `now` defaults of [`WindowBuilder::build`] and [`bootstrap::digest`], and
//! both have `_at` variants taking `now` explicitly.

pub mod arrange;
pub mod bootstrap;
pub mod budget;
pub mod convert;
pub mod format;
pub mod item;
pub mod profiles;
pub mod select;
pub mod stats;
pub mod token;
pub mod window;

pub use arrange::{arrange, arrange_chronological, Arrangement};
pub use bootstrap::{digest, digest_at, latest_ended_session, DigestOptions};
pub use budget::{
    create_adaptive_budget, create_fixed_budget, Budget, CategoryCounts, CategoryRatios,
    FixedBudgetOptions,
};
pub use format::{format_window, FormatOptions};
pub use item::{Category, ContentItem};
pub use profiles::{get_named_budget, resolve_profile};
pub use select::{select, SelectionWeights};
pub use stats::{window_stats, WindowStats};
pub use token::{estimate_tokens, estimate_tokens_accurate, TokenEstimator};
pub use window::{
    build, BuildOptions, CategoryCandidates, CategoryStats, ContextWindow, DropInfo, WindowBuilder,
};
