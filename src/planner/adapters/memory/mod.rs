//! In-memory planner tables.

use crate::identity::UserId;
use crate::planner::domain::{
    NewSection, NewTask, Section, SectionId, SectionPatch, Task, TaskId, TaskPatch,
};
use crate::planner::ports::TaskTable;
use crate::sync::adapters::{InMemoryTable, MemoryRow};
use crate::sync::ports::RemoteResult;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use mockable::Clock;

/// In-memory `sections` table.
pub type InMemorySectionTable<C> = InMemoryTable<Section, C>;

/// In-memory `tasks` table.
pub type InMemoryTaskTable<C> = InMemoryTable<Task, C>;

impl MemoryRow for Section {
    fn from_draft(owner: UserId, draft: NewSection, at: DateTime<Utc>) -> Self {
        draft.into_section(SectionId::new(), owner, at)
    }

    fn patched(&self, patch: &SectionPatch, at: DateTime<Utc>) -> Self {
        patch.apply_to(self, at)
    }
}

impl MemoryRow for Task {
    fn from_draft(owner: UserId, draft: NewTask, at: DateTime<Utc>) -> Self {
        draft.into_task(TaskId::new(), owner, at)
    }

    fn patched(&self, patch: &TaskPatch, at: DateTime<Utc>) -> Self {
        patch.apply_to(self, at)
    }
}

#[async_trait]
impl<C> TaskTable for InMemoryTable<Task, C>
where
    C: Clock + Send + Sync,
{
    async fn delete_by_section(
        &self,
        owner: UserId,
        section: Option<SectionId>,
    ) -> RemoteResult<u64> {
        let removed = self.delete_where(owner, |task| task.section_id() == section)?;
        Ok(u64::try_from(removed.len()).unwrap_or(u64::MAX))
    }
}
