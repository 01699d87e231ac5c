//! `PostgreSQL` `tasks` table.

use super::models::{NewTaskRow, TaskChangeset, TaskRow};
use super::schema::tasks;
use super::{PlannerPgPool, decode_error, query_error, run_blocking};
use crate::identity::UserId;
use crate::planner::domain::{
    NewTask, SectionId, Task, TaskId, TaskPatch, TaskPriority, TaskRecord, TaskStatus, TaskTags,
};
use crate::planner::ports::TaskTable;
use crate::sync::adapters::ChangeFeed;
use crate::sync::domain::{Entity, RowChange};
use crate::sync::ports::{ChangeStream, RemoteResult, RemoteTable};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use diesel::prelude::*;
use mockable::Clock;
use std::sync::Arc;
use tracing::debug;
use uuid::Uuid;

const TABLE: &str = <Task as Entity>::TABLE;

/// `PostgreSQL`-backed task table.
pub struct PostgresTaskTable<C> {
    pool: PlannerPgPool,
    feed: Arc<ChangeFeed<Task>>,
    clock: Arc<C>,
}

impl<C> Clone for PostgresTaskTable<C> {
    fn clone(&self) -> Self {
        Self {
            pool: self.pool.clone(),
            feed: Arc::clone(&self.feed),
            clock: Arc::clone(&self.clock),
        }
    }
}

impl<C: Clock + Send + Sync> PostgresTaskTable<C> {
    /// Creates a table over `pool`. Update timestamps come from `clock`.
    #[must_use]
    pub fn new(pool: PlannerPgPool, clock: Arc<C>) -> Self {
        Self {
            pool,
            feed: Arc::new(ChangeFeed::new()),
            clock,
        }
    }
}

#[async_trait]
impl<C: Clock + Send + Sync> RemoteTable<Task> for PostgresTaskTable<C> {
    async fn select(&self, owner: UserId) -> RemoteResult<Vec<Task>> {
        let owner_id = owner.into_inner();
        run_blocking(&self.pool, move |connection| {
            let rows = tasks::table
                .filter(tasks::user_id.eq(owner_id))
                .order((tasks::created_at.desc(), tasks::id.desc()))
                .select(TaskRow::as_select())
                .load::<TaskRow>(connection)
                .map_err(|err| query_error(TABLE, err))?;
            rows.into_iter().map(row_to_task).collect()
        })
        .await
    }

    async fn insert(&self, owner: UserId, draft: NewTask) -> RemoteResult<Task> {
        let new_row = to_new_row(owner, &draft);
        let task = run_blocking(&self.pool, move |connection| {
            let row = diesel::insert_into(tasks::table)
                .values(&new_row)
                .returning(TaskRow::as_returning())
                .get_result::<TaskRow>(connection)
                .map_err(|err| query_error(TABLE, err))?;
            row_to_task(row)
        })
        .await?;
        self.feed.publish(owner, &RowChange::Insert(task.clone()));
        Ok(task)
    }

    async fn update(&self, id: TaskId, patch: TaskPatch) -> RemoteResult<Option<Task>> {
        let changeset = to_changeset(&patch, self.clock.utc());
        let task_id = id.into_inner();
        let updated = run_blocking(&self.pool, move |connection| {
            let row = diesel::update(tasks::table.find(task_id))
                .set(&changeset)
                .returning(TaskRow::as_returning())
                .get_result::<TaskRow>(connection)
                .optional()
                .map_err(|err| query_error(TABLE, err))?;
            row.map(row_to_task).transpose()
        })
        .await?;
        if let Some(task) = &updated {
            self.feed.publish(task.user_id(), &RowChange::Update(task.clone()));
        }
        Ok(updated)
    }

    async fn delete(&self, id: TaskId) -> RemoteResult<()> {
        let task_id = id.into_inner();
        let owner = run_blocking(&self.pool, move |connection| {
            diesel::delete(tasks::table.find(task_id))
                .returning(tasks::user_id)
                .get_result::<Uuid>(connection)
                .optional()
                .map_err(|err| query_error(TABLE, err))
        })
        .await?;
        if let Some(owner_id) = owner {
            self.feed
                .publish(UserId::from_uuid(owner_id), &RowChange::Delete { id });
        }
        Ok(())
    }

    async fn subscribe(&self, owner: UserId) -> RemoteResult<ChangeStream<Task>> {
        Ok(self.feed.subscribe(owner))
    }
}

#[async_trait]
impl<C: Clock + Send + Sync> TaskTable for PostgresTaskTable<C> {
    async fn delete_by_section(
        &self,
        owner: UserId,
        section: Option<SectionId>,
    ) -> RemoteResult<u64> {
        let owner_id = owner.into_inner();
        let section_id = section.map(SectionId::into_inner);
        let removed = run_blocking(&self.pool, move |connection| {
            diesel::delete(
                tasks::table
                    .filter(tasks::user_id.eq(owner_id))
                    .filter(tasks::section_id.is_not_distinct_from(section_id)),
            )
            .returning(tasks::id)
            .get_results::<Uuid>(connection)
            .map_err(|err| query_error(TABLE, err))
        })
        .await?;
        debug!(owner = %owner, count = removed.len(), "section tasks deleted");
        for id in &removed {
            self.feed.publish(
                owner,
                &RowChange::Delete {
                    id: TaskId::from_uuid(*id),
                },
            );
        }
        Ok(u64::try_from(removed.len()).unwrap_or(u64::MAX))
    }
}

pub(super) fn to_new_row(owner: UserId, draft: &NewTask) -> NewTaskRow {
    NewTaskRow {
        user_id: owner.into_inner(),
        section_id: draft.section_id().map(SectionId::into_inner),
        title: draft.title().to_owned(),
        description: draft.description().map(str::to_owned),
        priority: draft.priority().as_str().to_owned(),
        status: draft.status().as_str().to_owned(),
        date: draft.date(),
        time: draft.time(),
        tags: Some(draft.tags().as_slice().to_vec()),
    }
}

pub(super) fn to_changeset(patch: &TaskPatch, at: DateTime<Utc>) -> TaskChangeset {
    TaskChangeset {
        title: patch.title().map(str::to_owned),
        description: patch
            .description()
            .map(|description| description.map(str::to_owned)),
        priority: patch.priority().map(|priority| priority.as_str().to_owned()),
        status: patch.status().map(|status| status.as_str().to_owned()),
        section_id: patch
            .section_id()
            .map(|section| section.map(SectionId::into_inner)),
        date: patch.date(),
        time: patch.time(),
        tags: patch.tags().map(|tags| tags.as_slice().to_vec()),
        updated_at: at,
    }
}

pub(super) fn row_to_task(row: TaskRow) -> RemoteResult<Task> {
    let TaskRow {
        id,
        user_id,
        section_id,
        title,
        description,
        priority,
        status,
        date,
        time,
        tags,
        created_at,
        updated_at,
    } = row;
    let parsed_priority =
        TaskPriority::try_from(priority.as_str()).map_err(|err| decode_error(TABLE, err))?;
    let parsed_status =
        TaskStatus::try_from(status.as_str()).map_err(|err| decode_error(TABLE, err))?;
    Ok(Task::from_record(TaskRecord {
        id: TaskId::from_uuid(id),
        user_id: UserId::from_uuid(user_id),
        section_id: section_id.map(SectionId::from_uuid),
        title,
        description,
        priority: parsed_priority,
        status: parsed_status,
        date,
        time,
        tags: TaskTags::new(tags.unwrap_or_default()),
        created_at,
        updated_at,
    }))
}
