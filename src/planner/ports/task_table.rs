//! Task table port with the section-scoped bulk delete.

use crate::identity::UserId;
use crate::planner::domain::{SectionId, Task};
use crate::sync::ports::{RemoteResult, RemoteTable};
use async_trait::async_trait;

/// Remote task table.
#[async_trait]
pub trait TaskTable: RemoteTable<Task> {
    /// Deletes every task of `owner` filed under `section`, or every
    /// unsectioned task for `None`, and returns how many rows went.
    ///
    /// Tasks whose section reference dangles are matched by that dangling
    /// id, not by `None`.
    ///
    /// # Errors
    ///
    /// Returns [`RemoteError`](crate::sync::ports::RemoteError) when the
    /// service rejects the delete.
    async fn delete_by_section(
        &self,
        owner: UserId,
        section: Option<SectionId>,
    ) -> RemoteResult<u64>;
}
