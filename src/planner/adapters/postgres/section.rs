//! `PostgreSQL` `sections` table.

use super::models::{NewSectionRow, SectionChangeset, SectionRow};
use super::schema::sections;
use super::{PlannerPgPool, query_error, run_blocking};
use crate::identity::UserId;
use crate::planner::domain::{
    NewSection, Section, SectionColor, SectionId, SectionPatch, SectionRecord,
};
use crate::sync::adapters::ChangeFeed;
use crate::sync::domain::{Entity, RowChange};
use crate::sync::ports::{ChangeStream, RemoteResult, RemoteTable};
use async_trait::async_trait;
use diesel::prelude::*;
use mockable::Clock;
use std::sync::Arc;
use uuid::Uuid;

const TABLE: &str = <Section as Entity>::TABLE;

/// `PostgreSQL`-backed section table.
pub struct PostgresSectionTable<C> {
    pool: PlannerPgPool,
    feed: Arc<ChangeFeed<Section>>,
    clock: Arc<C>,
}

impl<C> Clone for PostgresSectionTable<C> {
    fn clone(&self) -> Self {
        Self {
            pool: self.pool.clone(),
            feed: Arc::clone(&self.feed),
            clock: Arc::clone(&self.clock),
        }
    }
}

impl<C: Clock + Send + Sync> PostgresSectionTable<C> {
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
impl<C: Clock + Send + Sync> RemoteTable<Section> for PostgresSectionTable<C> {
    async fn select(&self, owner: UserId) -> RemoteResult<Vec<Section>> {
        let owner_id = owner.into_inner();
        run_blocking(&self.pool, move |connection| {
            let rows = sections::table
                .filter(sections::user_id.eq(owner_id))
                .order((sections::created_at.asc(), sections::id.asc()))
                .select(SectionRow::as_select())
                .load::<SectionRow>(connection)
                .map_err(|err| query_error(TABLE, err))?;
            Ok(rows.into_iter().map(row_to_section).collect())
        })
        .await
    }

    async fn insert(&self, owner: UserId, draft: NewSection) -> RemoteResult<Section> {
        let new_row = to_new_row(owner, &draft);
        let section = run_blocking(&self.pool, move |connection| {
            diesel::insert_into(sections::table)
                .values(&new_row)
                .returning(SectionRow::as_returning())
                .get_result::<SectionRow>(connection)
                .map(row_to_section)
                .map_err(|err| query_error(TABLE, err))
        })
        .await?;
        self.feed.publish(owner, &RowChange::Insert(section.clone()));
        Ok(section)
    }

    async fn update(&self, id: SectionId, patch: SectionPatch) -> RemoteResult<Option<Section>> {
        let changeset = to_changeset(&patch, self.clock.utc());
        let section_id = id.into_inner();
        let updated = run_blocking(&self.pool, move |connection| {
            let row = diesel::update(sections::table.find(section_id))
                .set(&changeset)
                .returning(SectionRow::as_returning())
                .get_result::<SectionRow>(connection)
                .optional()
                .map_err(|err| query_error(TABLE, err))?;
            Ok(row.map(row_to_section))
        })
        .await?;
        if let Some(section) = &updated {
            self.feed
                .publish(section.user_id(), &RowChange::Update(section.clone()));
        }
        Ok(updated)
    }

    async fn delete(&self, id: SectionId) -> RemoteResult<()> {
        let section_id = id.into_inner();
        let owner = run_blocking(&self.pool, move |connection| {
            diesel::delete(sections::table.find(section_id))
                .returning(sections::user_id)
                .get_result::<Uuid>(connection)
                .optional()
                .map_err(|err| query_error(TABLE, err))
        })
        .await?;
        if let Some(owner) = owner {
            self.feed
                .publish(UserId::from_uuid(owner), &RowChange::Delete { id });
        }
        Ok(())
    }

    async fn subscribe(&self, owner: UserId) -> RemoteResult<ChangeStream<Section>> {
        Ok(self.feed.subscribe(owner))
    }
}

pub(super) fn to_new_row(owner: UserId, draft: &NewSection) -> NewSectionRow {
    NewSectionRow {
        user_id: owner.into_inner(),
        name: draft.name().to_owned(),
        color: Some(draft.color().as_token().to_owned()),
    }
}

pub(super) fn to_changeset(
    patch: &SectionPatch,
    at: chrono::DateTime<chrono::Utc>,
) -> SectionChangeset {
    SectionChangeset {
        name: patch.name().map(str::to_owned),
        color: patch.color().map(|color| color.as_token().to_owned()),
        updated_at: at,
    }
}

pub(super) fn row_to_section(row: SectionRow) -> Section {
    let SectionRow {
        id,
        user_id,
        name,
        color,
        created_at,
        updated_at,
    } = row;
    Section::from_record(SectionRecord {
        id: SectionId::from_uuid(id),
        user_id: UserId::from_uuid(user_id),
        name,
        color: SectionColor::from_stored(color.as_deref()),
        created_at,
        updated_at,
    })
}
