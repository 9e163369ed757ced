//! Rendering a [`ContextWindow`] as prompt text.
//!
//! Grouped output (the default) looks like:
//!
//! ```text
//! [Memories]
//! Prefers staging first
//!
//! [Lessons Learned]
//! [CRITICAL] Never deploy on Friday
//!
//! [Conversation]
//! user: How do I deploy?
//! ```
//!
//! Within a group, items keep their window order.

use recallkit_config::FormatConfig;

use crate::item::{Category, ContentItem};
use crate::window::ContextWindow;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FormatOptions {
    /// One heading per non-empty category instead of a flat list.
    pub group_by_category: bool,
    /// Append ` [category, importance: X.XX]` to every line.
    pub include_metadata: bool,
}

impl Default for FormatOptions {
    fn default() -> Self {
        Self {
            group_by_category: true,
            include_metadata: false,
        }
    }
}

impl From<&FormatConfig> for FormatOptions {
    fn from(cfg: &FormatConfig) -> Self {
        Self {
            group_by_category: cfg.group_by_category,
            include_metadata: cfg.include_metadata,
        }
    }
}

/// Render the window. An empty window renders as an empty string.
pub fn format_window(window: &ContextWindow, opts: &FormatOptions) -> String {
    if !opts.group_by_category {
        return window
            .items
            .iter()
            .map(|item| line(item, opts.include_metadata))
            .collect::<Vec<_>>()
            .join("\n");
    }

    let mut groups = Vec::new();
    for category in Category::PRESENTATION_ORDER {
        let lines: Vec<String> = window
            .items
            .iter()
            .filter(|item| item.category() == category)
            .map(|item| line(item, opts.include_metadata))
            .collect();
        if lines.is_empty() {
            continue;
        }
        groups.push(format!("{}\n{}", category.heading(), lines.join("\n")));
    }
    groups.join("\n\n")
}

fn line(item: &ContentItem, include_metadata: bool) -> String {
    if include_metadata {
        format!(
            "{} [{}, importance: {:.2}]",
            item.text(),
            item.category(),
            item.importance()
        )
    } else {
        item.text().to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::budget::Budget;
    use chrono::Utc;

    fn window(items: Vec<ContentItem>) -> ContextWindow {
        let total_tokens = items.iter().map(ContentItem::estimated_tokens).sum();
        ContextWindow {
            items,
            total_tokens,
            budget: Budget {
                total: 100,
                system_prompt_reserve: 0,
                response_reserve: 0,
                conversation: 25,
                memory: 25,
                lesson: 25,
                entity: 25,
            },
            truncated: false,
            per_category: Vec::new(),
            drops: Vec::new(),
        }
    }

    fn item(category: Category, text: &str, importance: f64) -> ContentItem {
        ContentItem::new(category, text, importance, Utc::now(), 1).unwrap()
    }

    fn sample() -> ContextWindow {
        window(vec![
            item(Category::Conversation, "user: hi", 0.8),
            item(Category::Memory, "likes tea", 0.5),
            item(Category::Conversation, "assistant: hello", 0.6),
            item(Category::Lesson, "[INFO] docs in /docs", 0.5),
        ])
    }

    #[test]
    fn grouped_output_follows_presentation_order() {
        let text = format_window(&sample(), &FormatOptions::default());
        assert_eq!(
            text,
            "[Memories]\nlikes tea\n\n\
             [Lessons Learned]\n[INFO] docs in /docs\n\n\
             [Conversation]\nuser: hi\nassistant: hello"
        );
    }

    #[test]
    fn empty_categories_have_no_heading() {
        let text = format_window(&sample(), &FormatOptions::default());
        assert!(!text.contains("[Known Entities]"));
    }

    #[test]
    fn flat_output_keeps_window_order() {
        let opts = FormatOptions {
            group_by_category: false,
            include_metadata: false,
        };
        assert_eq!(
            format_window(&sample(), &opts),
            "user: hi\nlikes tea\nassistant: hello\n[INFO] docs in /docs"
        );
    }

    #[test]
    fn metadata_suffix() {
        let opts = FormatOptions {
            group_by_category: false,
            include_metadata: true,
        };
        let text = format_window(&window(vec![item(Category::Entity, "Alice: lead", 0.25)]), &opts);
        assert_eq!(text, "Alice: lead [entity, importance: 0.25]");
    }

    #[test]
    fn empty_window_renders_empty() {
        assert_eq!(format_window(&window(Vec::new()), &FormatOptions::default()), "");
    }

    #[test]
    fn options_from_config() {
        let cfg = FormatConfig {
            group_by_category: false,
            include_metadata: true,
        };
        let opts = FormatOptions::from(&cfg);
        assert!(!opts.group_by_category);
        assert!(opts.include_metadata);
    }
}
