//! Task store and its section-scoped bulk delete.

use crate::planner::domain::{SectionId, Task};
use crate::planner::ports::TaskTable;
use crate::sync::services::{SyncResult, SyncStore};

/// Synchronized task collection, newest first.
pub type TaskStore<R> = SyncStore<Task, R>;

impl<R: TaskTable + ?Sized> SyncStore<Task, R> {
    /// Deletes every task filed under `section`, or every unsectioned task
    /// for `None`, and drops them from the cache in one pass.
    ///
    /// Returns the number of rows the remote deleted. Deleting a section
    /// never calls this implicitly.
    ///
    /// # Errors
    ///
    /// Returns [`SyncError::SignedOut`](crate::sync::services::SyncError::SignedOut)
    /// when unbound and [`SyncError::Remote`](crate::sync::services::SyncError::Remote)
    /// when the delete fails; the cache is unchanged on failure.
    pub async fn delete_by_section(&self, section: Option<SectionId>) -> SyncResult<u64> {
        let remote = self.remote();
        self.mutate(
            "delete_by_section",
            |owner| remote.delete_by_section(owner, section),
            |cache, _: &u64| {
                cache.remove_where(|task| task.section_id() == section);
            },
        )
        .await
    }
}
