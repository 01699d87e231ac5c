//! Per-section status filtering and expansion state.

use crate::planner::domain::{ParseValueError, Section, SectionId, Task, TaskStatus};
use std::collections::{HashMap, HashSet};

/// Status filter applied to one section's task list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum StatusFilter {
    /// Every status.
    #[default]
    All,
    /// Only tasks with the given status.
    Only(TaskStatus),
}

impl StatusFilter {
    /// Returns whether `status` passes the filter.
    #[must_use]
    pub fn matches(self, status: TaskStatus) -> bool {
        match self {
            Self::All => true,
            Self::Only(wanted) => wanted == status,
        }
    }

    /// Returns the wire form: `all` or the status value.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::All => "all",
            Self::Only(status) => status.as_str(),
        }
    }
}

impl TryFrom<&str> for StatusFilter {
    type Error = ParseValueError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        if value.trim().eq_ignore_ascii_case("all") {
            return Ok(Self::All);
        }
        TaskStatus::try_from(value)
            .map(Self::Only)
            .map_err(|_| ParseValueError::new("status filter", value))
    }
}

/// Transient per-section display state.
///
/// Sections start collapsed with no filter. State for sections that no
/// longer exist is dropped by [`retain_sections`](Self::retain_sections).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SectionViewState {
    expanded: HashSet<SectionId>,
    filters: HashMap<SectionId, StatusFilter>,
}

impl SectionViewState {
    /// Creates empty state.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns whether `section` is expanded.
    #[must_use]
    pub fn is_expanded(&self, section: SectionId) -> bool {
        self.expanded.contains(&section)
    }

    /// Flips the expanded flag of `section` and returns the new value.
    pub fn toggle_expanded(&mut self, section: SectionId) -> bool {
        if self.expanded.remove(&section) {
            return false;
        }
        self.expanded.insert(section);
        true
    }

    /// Returns the filter of `section`.
    #[must_use]
    pub fn filter_for(&self, section: SectionId) -> StatusFilter {
        self.filters.get(&section).copied().unwrap_or_default()
    }

    /// Sets the filter of `section`.
    pub fn set_filter(&mut self, section: SectionId, filter: StatusFilter) {
        if filter == StatusFilter::All {
            self.filters.remove(&section);
        } else {
            self.filters.insert(section, filter);
        }
    }

    /// Forgets state for sections not in `sections`.
    pub fn retain_sections(&mut self, sections: &[Section]) {
        let live: HashSet<SectionId> = sections.iter().map(Section::id).collect();
        self.expanded.retain(|id| live.contains(id));
        self.filters.retain(|id, _| live.contains(id));
    }
}

/// Returns the tasks of `section` passing `filter`, in source order.
#[must_use]
pub fn filter_tasks(tasks: &[Task], section: SectionId, filter: StatusFilter) -> Vec<Task> {
    tasks
        .iter()
        .filter(|task| task.section_id() == Some(section) && filter.matches(task.status()))
        .cloned()
        .collect()
}

/// Task totals of one section.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct StatusCounts {
    /// All tasks in the section.
    pub total: usize,
    /// Pending tasks.
    pub pending: usize,
    /// Tasks in progress.
    pub in_progress: usize,
    /// Completed tasks.
    pub completed: usize,
}

impl StatusCounts {
    /// Returns the count shown for `filter`.
    #[must_use]
    pub const fn for_filter(&self, filter: StatusFilter) -> usize {
        match filter {
            StatusFilter::All => self.total,
            StatusFilter::Only(TaskStatus::Pending) => self.pending,
            StatusFilter::Only(TaskStatus::InProgress) => self.in_progress,
            StatusFilter::Only(TaskStatus::Completed) => self.completed,
        }
    }
}

/// Counts the tasks of `section` by status.
#[must_use]
pub fn status_counts(tasks: &[Task], section: SectionId) -> StatusCounts {
    tasks
        .iter()
        .filter(|task| task.section_id() == Some(section))
        .fold(StatusCounts::default(), |mut counts, task| {
            counts.total += 1;
            match task.status() {
                TaskStatus::Pending => counts.pending += 1,
                TaskStatus::InProgress => counts.in_progress += 1,
                TaskStatus::Completed => counts.completed += 1,
            }
            counts
        })
}

/// Returns whether `task` has no section or one missing from `known`.
#[must_use]
pub fn is_orphan<S: std::hash::BuildHasher>(task: &Task, known: &HashSet<SectionId, S>) -> bool {
    task.section_id().is_none_or(|id| !known.contains(&id))
}

/// Returns every orphan task, regardless of date, in source order.
#[must_use]
pub fn unsectioned_tasks(tasks: &[Task], sections: &[Section]) -> Vec<Task> {
    let known: HashSet<SectionId> = sections.iter().map(Section::id).collect();
    tasks
        .iter()
        .filter(|task| is_orphan(task, &known))
        .cloned()
        .collect()
}
