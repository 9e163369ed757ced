//! Category converters: source records → [`ContentItem`]s.
//!
//! Output always has the same length and order as the input. Default
//! importances:
//!
//! | Source | Importance |
//! |--------|------------|
//! | User turn | 0.8 |
//! | Any other turn | 0.6 |
//! | Lesson | critical 0.9, warning 0.7, info 0.5 |
//! | Entity | `min(mention_count / 20, 1)` |
//! | Memory | carried through |
//!
//! A record's own `token_count` wins over the estimator.

use recallkit_core::{
    ContextError, ConversationTurn, EntityRecord, LessonRecord, MemoryRecord, Severity,
};
use serde_json::{json, Map, Value};

use crate::item::{validate_importance, Category, ContentItem};
use crate::token::TokenEstimator;

pub const HUMAN_TURN_IMPORTANCE: f64 = 0.8;
pub const AGENT_TURN_IMPORTANCE: f64 = 0.6;

/// Mention count at which an entity reaches full importance.
pub const ENTITY_MENTION_SATURATION: f64 = 20.0;

pub fn severity_importance(severity: Severity) -> f64 {
    match severity {
        Severity::Critical => 0.9,
        Severity::Warning => 0.7,
        Severity::Info => 0.5,
    }
}

pub fn entity_importance(mention_count: u32) -> f64 {
    (f64::from(mention_count) / ENTITY_MENTION_SATURATION).min(1.0)
}

pub fn convert_conversation_items(turns: &[ConversationTurn]) -> Vec<ContentItem> {
    convert_conversation_items_with(turns, TokenEstimator::Chars)
}

pub fn convert_conversation_items_with(
    turns: &[ConversationTurn],
    estimator: TokenEstimator,
) -> Vec<ContentItem> {
    turns
        .iter()
        .map(|turn| {
            let text = format!("{}: {}", turn.role, turn.content);
            let importance = if turn.role.is_human() {
                HUMAN_TURN_IMPORTANCE
            } else {
                AGENT_TURN_IMPORTANCE
            };
            let tokens = token_count(turn.token_count, &text, estimator);

            let mut meta = source_id(&turn.id);
            meta.insert("role".into(), json!(turn.role));
            meta.extend(turn.metadata.clone());

            ContentItem::trusted(Category::Conversation, text, importance, turn.timestamp, tokens)
                .with_metadata(meta)
        })
        .collect()
}

/// Memories keep their stored importance, so this is the one converter
/// that can reject input.
pub fn convert_memory_items(memories: &[MemoryRecord]) -> Result<Vec<ContentItem>, ContextError> {
    convert_memory_items_with(memories, TokenEstimator::Chars)
}

pub fn convert_memory_items_with(
    memories: &[MemoryRecord],
    estimator: TokenEstimator,
) -> Result<Vec<ContentItem>, ContextError> {
    memories
        .iter()
        .map(|memory| {
            validate_importance(memory.importance).map_err(|_| {
                ContextError::invalid(
                    format!("memory {} importance", memory.id),
                    format!("must be a number within [0, 1], got {}", memory.importance),
                )
            })?;
            let tokens = token_count(memory.token_count, &memory.content, estimator);

            let mut meta = source_id(&memory.id);
            if !memory.tags.is_empty() {
                meta.insert("tags".into(), json!(memory.tags));
            }
            meta.extend(memory.metadata.clone());

            Ok(ContentItem::trusted(
                Category::Memory,
                memory.content.clone(),
                memory.importance,
                memory.created_at,
                tokens,
            )
            .with_metadata(meta))
        })
        .collect()
}

pub fn convert_lesson_items(lessons: &[LessonRecord]) -> Vec<ContentItem> {
    convert_lesson_items_with(lessons, TokenEstimator::Chars)
}

pub fn convert_lesson_items_with(
    lessons: &[LessonRecord],
    estimator: TokenEstimator,
) -> Vec<ContentItem> {
    lessons
        .iter()
        .map(|lesson| {
            let mut text = format!(
                "[{}] {}",
                lesson.severity.as_str().to_uppercase(),
                lesson.content
            );
            if let Some(ctx) = &lesson.context {
                text.push_str(&format!(" (context: {ctx})"));
            }
            let tokens = token_count(lesson.token_count, &text, estimator);

            let mut meta = source_id(&lesson.id);
            meta.insert("severity".into(), json!(lesson.severity));
            if let Some(ctx) = &lesson.context {
                meta.insert("context".into(), json!(ctx));
            }

            ContentItem::trusted(
                Category::Lesson,
                text,
                severity_importance(lesson.severity),
                lesson.created_at,
                tokens,
            )
            .with_metadata(meta)
        })
        .collect()
}

pub fn convert_entity_items(entities: &[EntityRecord]) -> Vec<ContentItem> {
    convert_entity_items_with(entities, TokenEstimator::Chars)
}

pub fn convert_entity_items_with(
    entities: &[EntityRecord],
    estimator: TokenEstimator,
) -> Vec<ContentItem> {
    entities
        .iter()
        .map(|entity| {
            let text = match &entity.kind {
                Some(kind) => format!("{} ({}): {}", entity.name, kind, entity.description),
                None => format!("{}: {}", entity.name, entity.description),
            };
            let tokens = token_count(entity.token_count, &text, estimator);

            let mut meta = source_id(&entity.id);
            meta.insert("name".into(), json!(entity.name));
            meta.insert("mention_count".into(), json!(entity.mention_count));
            if let Some(kind) = &entity.kind {
                meta.insert("kind".into(), json!(kind));
            }

            ContentItem::trusted(
                Category::Entity,
                text,
                entity_importance(entity.mention_count),
                entity.last_seen,
                tokens,
            )
            .with_metadata(meta)
        })
        .collect()
}

fn token_count(precomputed: Option<usize>, text: &str, estimator: TokenEstimator) -> usize {
    precomputed.unwrap_or_else(|| estimator.estimate(text))
}

fn source_id(id: &str) -> Map<String, Value> {
    let mut meta = Map::new();
    meta.insert("source_id".into(), Value::String(id.to_string()));
    meta
}
