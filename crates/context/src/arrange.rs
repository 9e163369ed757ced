//! Position arrangement of the final window.
//!
//! Models attend best to the start and end of a long context, so the most
//! important items are dealt alternately to the front and the back and the
//! least important ones end up in the middle.

use recallkit_config::ArrangementKind;
use serde::{Deserialize, Serialize};

use crate::item::ContentItem;

/// How the Window Builder orders its final item list.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Arrangement {
    #[default]
    LostInMiddle,
    Chronological,
}

impl From<ArrangementKind> for Arrangement {
    fn from(kind: ArrangementKind) -> Self {
        match kind {
            ArrangementKind::LostInMiddle => Self::LostInMiddle,
            ArrangementKind::Chronological => Self::Chronological,
        }
    }
}

impl Arrangement {
    pub fn apply(&self, items: Vec<ContentItem>) -> Vec<ContentItem> {
        match self {
            Self::LostInMiddle => arrange(items),
            Self::Chronological => arrange_chronological(items),
        }
    }
}

/// Reorder for lost-in-middle mitigation.
///
/// With items ranked by importance and `half = ceil(n / 2)`, the output is:
/// even ranks of the top half, then the bottom half, then odd ranks of the
/// top half. Three items or fewer are returned unchanged.
pub fn arrange(items: Vec<ContentItem>) -> Vec<ContentItem> {
    let n = items.len();
    if n <= 3 {
        return items;
    }

    let mut ranked = items;
    ranked.sort_by(|a, b| b.importance().total_cmp(&a.importance()));

    let half = n.div_ceil(2);
    let bottom = ranked.split_off(half);

    let mut front = Vec::with_capacity(half.div_ceil(2));
    let mut back = Vec::with_capacity(half / 2);
    for (rank, item) in ranked.into_iter().enumerate() {
        if rank % 2 == 0 {
            front.push(item);
        } else {
            back.push(item);
        }
    }

    front.extend(bottom);
    front.extend(back);
    front
}

/// Oldest first. Stable for equal timestamps.
pub fn arrange_chronological(mut items: Vec<ContentItem>) -> Vec<ContentItem> {
    items.sort_by_key(ContentItem::timestamp);
    items
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::item::Category;
    use chrono::{Duration, Utc};

    fn items(importances: &[f64]) -> Vec<ContentItem> {
        let now = Utc::now();
        importances
            .iter()
            .enumerate()
            .map(|(i, &imp)| {
                ContentItem::new(Category::Memory, format!("item{i}"), imp, now, 1).unwrap()
            })
            .collect()
    }

    fn importances(items: &[ContentItem]) -> Vec<f64> {
        items.iter().map(ContentItem::importance).collect()
    }

    #[test]
    fn five_items_reference_order() {
        let out = arrange(items(&[0.9, 0.8, 0.7, 0.6, 0.5]));
        assert_eq!(importances(&out), vec![0.9, 0.7, 0.6, 0.5, 0.8]);
    }

    #[test]
    fn input_order_does_not_matter() {
        let out = arrange(items(&[0.5, 0.7, 0.9, 0.6, 0.8]));
        assert_eq!(importances(&out), vec![0.9, 0.7, 0.6, 0.5, 0.8]);
    }

    #[test]
    fn even_count() {
        // top half [0.8, 0.7, 0.6] (ceil(6/2) = 3), bottom [0.4, 0.3, 0.2]
        let out = arrange(items(&[0.2, 0.3, 0.4, 0.6, 0.7, 0.8]));
        assert_eq!(importances(&out), vec![0.8, 0.6, 0.4, 0.3, 0.2, 0.7]);
    }

    #[test]
    fn short_lists_are_untouched() {
        for input in [vec![], vec![0.1], vec![0.1, 0.9], vec![0.2, 0.9, 0.5]] {
            let original = items(&input);
            assert_eq!(arrange(original.clone()), original);
        }
    }

    #[test]
    fn arrangement_is_a_permutation() {
        let original = items(&[0.3, 0.3, 0.9, 0.1, 0.5, 0.5, 0.7, 0.0, 1.0]);
        let mut before: Vec<String> = original.iter().map(|i| i.text().to_string()).collect();
        let mut after: Vec<String> = arrange(original).iter().map(|i| i.text().to_string()).collect();
        before.sort();
        after.sort();
        assert_eq!(before, after);
    }

    #[test]
    fn most_important_items_sit_at_the_edges() {
        let out = arrange(items(&[0.1, 0.2, 0.3, 0.4, 0.5, 0.6, 0.7, 0.8, 0.9, 1.0]));
        // front [1.0, 0.8, 0.6], middle [0.5 .. 0.1], back [0.9, 0.7]
        assert_eq!(out.first().map(ContentItem::importance), Some(1.0));
        assert_eq!(out[8].importance(), 0.9);
        assert_eq!(out.last().map(ContentItem::importance), Some(0.7));
        let middle = &out[4..6];
        assert!(middle.iter().all(|i| i.importance() <= 0.5));
    }

    #[test]
    fn equal_importance_keeps_input_order() {
        let out = arrange(items(&[0.5, 0.5, 0.5, 0.5]));
        let texts: Vec<&str> = out.iter().map(ContentItem::text).collect();
        // top half [item0, item1], bottom [item2, item3]
        assert_eq!(texts, vec!["item0", "item2", "item3", "item1"]);
    }

    #[test]
    fn chronological_sorts_oldest_first() {
        let now = Utc::now();
        let make = |text: &str, days: i64| {
            ContentItem::new(Category::Conversation, text, 0.5, now - Duration::days(days), 1).unwrap()
        };
        let out = arrange_chronological(vec![make("new", 0), make("old", 10), make("mid", 3)]);
        let texts: Vec<&str> = out.iter().map(ContentItem::text).collect();
        assert_eq!(texts, vec!["old", "mid", "new"]);
    }

    #[test]
    fn arrangement_dispatch() {
        let input = items(&[0.1, 0.2, 0.3, 0.4]);
        assert_eq!(Arrangement::LostInMiddle.apply(input.clone()), arrange(input.clone()));
        assert_eq!(
            Arrangement::from(ArrangementKind::Chronological),
            Arrangement::Chronological
        );
    }
}
