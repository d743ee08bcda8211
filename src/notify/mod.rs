//! Per-user unread overlay for list views.
//!
//! Every successful mutation appends a timeline event; an entity is
//! "unread" for a user until that user opens its detail or explicitly
//! acknowledges it. The overlay is a projection of one fresh unread-ID
//! fetch for one category — there is no durable cache, and each list view
//! requests its own category independently.

pub mod prioritize;

pub use prioritize::{prioritize, prioritize_by};

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;

/// Entity category a timeline event (and its unread marker) belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Category {
    Job,
    Application,
    Organization,
}

impl Category {
    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Job => "JOB",
            Category::Application => "APPLICATION",
            Category::Organization => "ORGANIZATION",
        }
    }

    pub fn parse(s: &str) -> Option<Category> {
        match s {
            "JOB" => Some(Category::Job),
            "APPLICATION" => Some(Category::Application),
            "ORGANIZATION" => Some(Category::Organization),
            _ => None,
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The unread-ID set for one actor and one category.
#[derive(Debug, Clone)]
pub struct NotificationOverlay {
    category: Category,
    unread: HashSet<i64>,
}

impl NotificationOverlay {
    pub fn new(category: Category, ids: impl IntoIterator<Item = i64>) -> Self {
        Self {
            category,
            unread: ids.into_iter().collect(),
        }
    }

    pub fn empty(category: Category) -> Self {
        Self {
            category,
            unread: HashSet::new(),
        }
    }

    /// Build the overlay from a fetch result. A failed fetch degrades to
    /// an empty set: notifications are an enhancement, and a broken
    /// unread query must never keep the underlying list from rendering.
    pub fn from_fetch<E: fmt::Display>(category: Category, fetched: Result<Vec<i64>, E>) -> Self {
        match fetched {
            Ok(ids) => Self::new(category, ids),
            Err(e) => {
                log::warn!("unread fetch failed for {category}, treating all as read: {e}");
                Self::empty(category)
            }
        }
    }

    pub fn category(&self) -> Category {
        self.category
    }

    pub fn is_unread(&self, id: i64) -> bool {
        self.unread.contains(&id)
    }

    pub fn unread_ids(&self) -> &HashSet<i64> {
        &self.unread
    }

    pub fn unread_count(&self) -> usize {
        self.unread.len()
    }
}
