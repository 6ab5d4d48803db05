use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use super::task::Task;

/// Search and tag filters applied before grouping.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskFilter {
    pub search: Option<String>,
    pub tags: BTreeSet<String>,
}

impl TaskFilter {
    pub fn search(text: impl Into<String>) -> Self {
        Self {
            search: Some(text.into()),
            ..Default::default()
        }
    }

    pub fn with_tag(mut self, tag: impl Into<String>) -> Self {
        self.tags.insert(tag.into());
        self
    }

    pub fn is_empty(&self) -> bool {
        self.search.as_deref().is_none_or(|s| s.trim().is_empty()) && self.tags.is_empty()
    }

    pub fn matches(&self, task: &Task) -> bool {
        if let Some(search) = self.search.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
            if !task.title.to_lowercase().contains(&search.to_lowercase()) {
                return false;
            }
        }
        self.tags.iter().all(|tag| task.tags.contains(tag))
    }
}
