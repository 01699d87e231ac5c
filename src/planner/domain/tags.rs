//! Ordered, duplicate-free task tags.

use serde::{Deserialize, Serialize};

/// Ordered list of unique, non-empty tags.
///
/// Tags are trimmed; empty tags are dropped and later duplicates of an
/// earlier tag are discarded. Stored rows may carry `null`, which reads as
/// no tags.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(from = "Option<Vec<String>>", into = "Vec<String>")]
pub struct TaskTags(Vec<String>);

impl TaskTags {
    /// Creates a normalized tag list.
    #[must_use]
    pub fn new(tags: impl IntoIterator<Item = impl Into<String>>) -> Self {
        let mut normalized: Vec<String> = Vec::new();
        for tag in tags {
            let raw: String = tag.into();
            let trimmed = raw.trim();
            if trimmed.is_empty() || normalized.iter().any(|existing| existing == trimmed) {
                continue;
            }
            normalized.push(trimmed.to_owned());
        }
        Self(normalized)
    }

    /// Returns a copy with `tag` appended unless already present.
    #[must_use]
    pub fn with(&self, tag: impl Into<String>) -> Self {
        Self::new(self.0.iter().cloned().chain(std::iter::once(tag.into())))
    }

    /// Returns a copy without `tag`.
    #[must_use]
    pub fn without(&self, tag: &str) -> Self {
        Self(self.0.iter().filter(|t| *t != tag).cloned().collect())
    }

    /// Returns whether `tag` is present.
    #[must_use]
    pub fn contains(&self, tag: &str) -> bool {
        self.0.iter().any(|t| t == tag)
    }

    /// Returns the tags in order.
    #[must_use]
    pub fn as_slice(&self) -> &[String] {
        &self.0
    }

    /// Returns the number of tags.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns whether there are no tags.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl From<Option<Vec<String>>> for TaskTags {
    fn from(value: Option<Vec<String>>) -> Self {
        Self::new(value.unwrap_or_default())
    }
}

impl From<TaskTags> for Vec<String> {
    fn from(tags: TaskTags) -> Self {
        tags.0
    }
}
