//! # RecallKit Core
//!
//! Source record types and error definitions for RecallKit.
//! This crate has **no engine logic**: it defines the records that the
//! persistence layer hands to the context engine.
//!
//! ## Record kinds
//!
//! - [`ConversationTurn`]: one message of a conversation
//! - [`MemoryRecord`]: a long-term note with caller-assigned importance
//! - [`LessonRecord`]: a lessons-learned entry with a severity
//! - [`EntityRecord`]: a known entity and how often it has been mentioned
//! - [`SessionSummary`]: a finished (or ongoing) session, used by the bootstrap digest

pub mod entity;
pub mod error;
pub mod lesson;
pub mod memory;
pub mod message;
pub mod session;

// Re-export key types at crate root for ergonomics
pub use entity::EntityRecord;
pub use error::{ContextError, Error, Result};
pub use lesson::{LessonRecord, Severity};
pub use memory::MemoryRecord;
pub use message::{ConversationTurn, Role};
pub use session::SessionSummary;
