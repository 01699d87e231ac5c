//! Diesel row models for planner persistence.

use super::schema::{sections, tasks};
use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use diesel::prelude::*;
use uuid::Uuid;

/// Query result row for sections.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = sections)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct SectionRow {
    pub id: Uuid,
    pub user_id: Uuid,
    pub name: String,
    pub color: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Insert model for sections; the database assigns id and timestamps.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = sections)]
pub struct NewSectionRow {
    pub user_id: Uuid,
    pub name: String,
    pub color: Option<String>,
}

/// Partial update for sections. `None` fields are left untouched.
#[derive(Debug, Clone, AsChangeset)]
#[diesel(table_name = sections)]
pub struct SectionChangeset {
    pub name: Option<String>,
    pub color: Option<String>,
    pub updated_at: DateTime<Utc>,
}

/// Query result row for tasks.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = tasks)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct TaskRow {
    pub id: Uuid,
    pub user_id: Uuid,
    pub section_id: Option<Uuid>,
    pub title: String,
    pub description: Option<String>,
    pub priority: String,
    pub status: String,
    pub date: Option<NaiveDate>,
    pub time: Option<NaiveTime>,
    pub tags: Option<Vec<String>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Insert model for tasks; the database assigns id and timestamps.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = tasks)]
pub struct NewTaskRow {
    pub user_id: Uuid,
    pub section_id: Option<Uuid>,
    pub title: String,
    pub description: Option<String>,
    pub priority: String,
    pub status: String,
    pub date: Option<NaiveDate>,
    pub time: Option<NaiveTime>,
    pub tags: Option<Vec<String>>,
}

/// Partial update for tasks.
///
/// Nested options on nullable columns: `Some(None)` writes `NULL`.
#[derive(Debug, Clone, AsChangeset)]
#[diesel(table_name = tasks)]
pub struct TaskChangeset {
    pub title: Option<String>,
    pub description: Option<Option<String>>,
    pub priority: Option<String>,
    pub status: Option<String>,
    pub section_id: Option<Option<Uuid>>,
    pub date: Option<Option<NaiveDate>>,
    pub time: Option<Option<NaiveTime>>,
    pub tags: Option<Vec<String>>,
    pub updated_at: DateTime<Utc>,
}
