//! Task rows, drafts and patches.

use super::{ParseValueError, PlannerDomainError, SectionId, TaskId, TaskTags};
use crate::identity::UserId;
use crate::sync::domain::{CanonicalOrder, Entity};
use chrono::{DateTime, NaiveDate, NaiveTime, Timelike, Utc};
use serde::{Deserialize, Serialize};

/// Task priority.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TaskPriority {
    /// Low priority.
    Low,
    /// Medium priority, the default for new tasks.
    #[default]
    Medium,
    /// High priority.
    High,
}

impl TaskPriority {
    /// Returns the canonical storage representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
        }
    }
}

impl TryFrom<&str> for TaskPriority {
    type Error = ParseValueError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value.trim().to_ascii_lowercase().as_str() {
            "low" => Ok(Self::Low),
            "medium" => Ok(Self::Medium),
            "high" => Ok(Self::High),
            _ => Err(ParseValueError::new("task priority", value)),
        }
    }
}

/// Task progress status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TaskStatus {
    /// Not started, the default for new tasks.
    #[default]
    Pending,
    /// Being worked on.
    InProgress,
    /// Done.
    Completed,
}

impl TaskStatus {
    /// Every status in workflow order.
    pub const ALL: [Self; 3] = [Self::Pending, Self::InProgress, Self::Completed];

    /// Returns the canonical storage representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::InProgress => "in-progress",
            Self::Completed => "completed",
        }
    }
}

impl TryFrom<&str> for TaskStatus {
    type Error = ParseValueError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value.trim().to_ascii_lowercase().as_str() {
            "pending" => Ok(Self::Pending),
            "in-progress" | "in_progress" => Ok(Self::InProgress),
            "completed" => Ok(Self::Completed),
            _ => Err(ParseValueError::new("task status", value)),
        }
    }
}

/// To-do item owned by one user, optionally filed under a section.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    id: TaskId,
    user_id: UserId,
    section_id: Option<SectionId>,
    title: String,
    description: Option<String>,
    priority: TaskPriority,
    status: TaskStatus,
    date: Option<NaiveDate>,
    #[serde(with = "super::time_of_day::optional", default)]
    time: Option<NaiveTime>,
    #[serde(default)]
    tags: TaskTags,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

/// Parameter object for reconstructing a stored task.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskRecord {
    /// Stored identifier.
    pub id: TaskId,
    /// Owning user.
    pub user_id: UserId,
    /// Section reference, possibly dangling.
    pub section_id: Option<SectionId>,
    /// Title.
    pub title: String,
    /// Free-form description.
    pub description: Option<String>,
    /// Priority.
    pub priority: TaskPriority,
    /// Status.
    pub status: TaskStatus,
    /// Scheduled calendar date.
    pub date: Option<NaiveDate>,
    /// Scheduled time of day.
    pub time: Option<NaiveTime>,
    /// Tags.
    pub tags: TaskTags,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Last update timestamp.
    pub updated_at: DateTime<Utc>,
}

impl Task {
    /// Reconstructs a task from stored values.
    #[must_use]
    pub fn from_record(record: TaskRecord) -> Self {
        Self {
            id: record.id,
            user_id: record.user_id,
            section_id: record.section_id,
            title: record.title,
            description: record.description,
            priority: record.priority,
            status: record.status,
            date: record.date,
            time: record.time,
            tags: record.tags,
            created_at: record.created_at,
            updated_at: record.updated_at,
        }
    }

    /// Returns the task identifier.
    #[must_use]
    pub const fn id(&self) -> TaskId {
        self.id
    }

    /// Returns the owning user.
    #[must_use]
    pub const fn user_id(&self) -> UserId {
        self.user_id
    }

    /// Returns the section reference, which may be dangling.
    #[must_use]
    pub const fn section_id(&self) -> Option<SectionId> {
        self.section_id
    }

    /// Returns the title.
    #[must_use]
    pub fn title(&self) -> &str {
        &self.title
    }

    /// Returns the description, if any.
    #[must_use]
    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    /// Returns the priority.
    #[must_use]
    pub const fn priority(&self) -> TaskPriority {
        self.priority
    }

    /// Returns the status.
    #[must_use]
    pub const fn status(&self) -> TaskStatus {
        self.status
    }

    /// Returns the scheduled date, if any.
    #[must_use]
    pub const fn date(&self) -> Option<NaiveDate> {
        self.date
    }

    /// Returns the scheduled time of day, if any.
    #[must_use]
    pub const fn time(&self) -> Option<NaiveTime> {
        self.time
    }

    /// Returns the hour of the scheduled time, if any.
    #[must_use]
    pub fn hour(&self) -> Option<u32> {
        self.time.map(|time| time.hour())
    }

    /// Returns the tags.
    #[must_use]
    pub const fn tags(&self) -> &TaskTags {
        &self.tags
    }

    /// Returns the creation timestamp.
    #[must_use]
    pub const fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Returns the last update timestamp.
    #[must_use]
    pub const fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    /// Returns whether the task is scheduled on `date`.
    #[must_use]
    pub fn is_on(&self, date: NaiveDate) -> bool {
        self.date == Some(date)
    }
}

impl Entity for Task {
    type Id = TaskId;
    type Draft = NewTask;
    type Patch = TaskPatch;

    const TABLE: &'static str = "tasks";
    const ORDER: CanonicalOrder = CanonicalOrder::NewestFirst;

    fn id(&self) -> TaskId {
        self.id
    }

    fn owner(&self) -> UserId {
        self.user_id
    }

    fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    fn updated_at(&self) -> Option<DateTime<Utc>> {
        Some(self.updated_at)
    }
}

/// Insert payload for a task.
///
/// Unset fields take their defaults: medium priority, pending status, no
/// tags, no section and no schedule.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewTask {
    title: String,
    description: Option<String>,
    priority: TaskPriority,
    status: TaskStatus,
    section_id: Option<SectionId>,
    date: Option<NaiveDate>,
    time: Option<NaiveTime>,
    tags: TaskTags,
}

impl NewTask {
    /// Creates a draft with the required title.
    ///
    /// # Errors
    ///
    /// Returns [`PlannerDomainError::EmptyTaskTitle`] when the title is
    /// blank.
    pub fn new(title: impl Into<String>) -> Result<Self, PlannerDomainError> {
        Ok(Self {
            title: task_title(title)?,
            description: None,
            priority: TaskPriority::default(),
            status: TaskStatus::default(),
            section_id: None,
            date: None,
            time: None,
            tags: TaskTags::default(),
        })
    }

    /// Sets the description; blank descriptions are stored as none.
    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = non_blank(description.into());
        self
    }

    /// Sets the priority.
    #[must_use]
    pub const fn with_priority(mut self, priority: TaskPriority) -> Self {
        self.priority = priority;
        self
    }

    /// Sets the status.
    #[must_use]
    pub const fn with_status(mut self, status: TaskStatus) -> Self {
        self.status = status;
        self
    }

    /// Files the task under a section.
    #[must_use]
    pub const fn in_section(mut self, section_id: SectionId) -> Self {
        self.section_id = Some(section_id);
        self
    }

    /// Schedules the task on a date.
    #[must_use]
    pub const fn on(mut self, date: NaiveDate) -> Self {
        self.date = Some(date);
        self
    }

    /// Schedules the task at a time of day.
    #[must_use]
    pub const fn at(mut self, time: NaiveTime) -> Self {
        self.time = Some(time);
        self
    }

    /// Sets the tags.
    #[must_use]
    pub fn with_tags(mut self, tags: TaskTags) -> Self {
        self.tags = tags;
        self
    }

    /// Returns the trimmed title.
    #[must_use]
    pub fn title(&self) -> &str {
        &self.title
    }

    /// Returns the description.
    #[must_use]
    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    /// Returns the priority.
    #[must_use]
    pub const fn priority(&self) -> TaskPriority {
        self.priority
    }

    /// Returns the status.
    #[must_use]
    pub const fn status(&self) -> TaskStatus {
        self.status
    }

    /// Returns the section reference.
    #[must_use]
    pub const fn section_id(&self) -> Option<SectionId> {
        self.section_id
    }

    /// Returns the scheduled date.
    #[must_use]
    pub const fn date(&self) -> Option<NaiveDate> {
        self.date
    }

    /// Returns the scheduled time of day.
    #[must_use]
    pub const fn time(&self) -> Option<NaiveTime> {
        self.time
    }

    /// Returns the tags.
    #[must_use]
    pub const fn tags(&self) -> &TaskTags {
        &self.tags
    }

    /// Builds the stored task the remote returns for this draft.
    #[must_use]
    pub fn into_task(self, id: TaskId, owner: UserId, at: DateTime<Utc>) -> Task {
        Task {
            id,
            user_id: owner,
            section_id: self.section_id,
            title: self.title,
            description: self.description,
            priority: self.priority,
            status: self.status,
            date: self.date,
            time: self.time,
            tags: self.tags,
            created_at: at,
            updated_at: at,
        }
    }
}

/// Partial update for a task.
///
/// Nullable columns use a nested option: `None` leaves the column alone,
/// `Some(None)` clears it.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct TaskPatch {
    title: Option<String>,
    description: Option<Option<String>>,
    priority: Option<TaskPriority>,
    status: Option<TaskStatus>,
    section_id: Option<Option<SectionId>>,
    date: Option<Option<NaiveDate>>,
    time: Option<Option<NaiveTime>>,
    tags: Option<TaskTags>,
}

impl TaskPatch {
    /// Creates an empty patch.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Changes the title.
    ///
    /// # Errors
    ///
    /// Returns [`PlannerDomainError::EmptyTaskTitle`] when the title is
    /// blank.
    pub fn with_title(mut self, title: impl Into<String>) -> Result<Self, PlannerDomainError> {
        self.title = Some(task_title(title)?);
        Ok(self)
    }

    /// Changes or clears the description.
    #[must_use]
    pub fn with_description(mut self, description: Option<String>) -> Self {
        self.description = Some(description.and_then(non_blank));
        self
    }

    /// Changes the priority.
    #[must_use]
    pub const fn with_priority(mut self, priority: TaskPriority) -> Self {
        self.priority = Some(priority);
        self
    }

    /// Changes the status.
    #[must_use]
    pub const fn with_status(mut self, status: TaskStatus) -> Self {
        self.status = Some(status);
        self
    }

    /// Moves the task to a section, or out of any section for `None`.
    #[must_use]
    pub const fn with_section(mut self, section_id: Option<SectionId>) -> Self {
        self.section_id = Some(section_id);
        self
    }

    /// Changes or clears the scheduled date.
    #[must_use]
    pub const fn with_date(mut self, date: Option<NaiveDate>) -> Self {
        self.date = Some(date);
        self
    }

    /// Changes or clears the scheduled time.
    #[must_use]
    pub const fn with_time(mut self, time: Option<NaiveTime>) -> Self {
        self.time = Some(time);
        self
    }

    /// Replaces the tags.
    #[must_use]
    pub fn with_tags(mut self, tags: TaskTags) -> Self {
        self.tags = Some(tags);
        self
    }

    /// Returns the new title, if set.
    #[must_use]
    pub fn title(&self) -> Option<&str> {
        self.title.as_deref()
    }

    /// Returns the description change, if any.
    #[must_use]
    pub fn description(&self) -> Option<Option<&str>> {
        self.description.as_ref().map(Option::as_deref)
    }

    /// Returns the new priority, if set.
    #[must_use]
    pub const fn priority(&self) -> Option<TaskPriority> {
        self.priority
    }

    /// Returns the new status, if set.
    #[must_use]
    pub const fn status(&self) -> Option<TaskStatus> {
        self.status
    }

    /// Returns the section change, if any.
    #[must_use]
    pub const fn section_id(&self) -> Option<Option<SectionId>> {
        self.section_id
    }

    /// Returns the date change, if any.
    #[must_use]
    pub const fn date(&self) -> Option<Option<NaiveDate>> {
        self.date
    }

    /// Returns the time change, if any.
    #[must_use]
    pub const fn time(&self) -> Option<Option<NaiveTime>> {
        self.time
    }

    /// Returns the new tags, if set.
    #[must_use]
    pub const fn tags(&self) -> Option<&TaskTags> {
        self.tags.as_ref()
    }

    /// Returns whether the patch changes nothing.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.description.is_none()
            && self.priority.is_none()
            && self.status.is_none()
            && self.section_id.is_none()
            && self.date.is_none()
            && self.time.is_none()
            && self.tags.is_none()
    }

    /// Applies the patch to `task`, stamping `at` as the update time.
    #[must_use]
    pub fn apply_to(&self, task: &Task, at: DateTime<Utc>) -> Task {
        let mut updated = task.clone();
        if let Some(title) = &self.title {
            updated.title.clone_from(title);
        }
        if let Some(description) = &self.description {
            updated.description.clone_from(description);
        }
        if let Some(priority) = self.priority {
            updated.priority = priority;
        }
        if let Some(status) = self.status {
            updated.status = status;
        }
        if let Some(section_id) = self.section_id {
            updated.section_id = section_id;
        }
        if let Some(date) = self.date {
            updated.date = date;
        }
        if let Some(time) = self.time {
            updated.time = time;
        }
        if let Some(tags) = &self.tags {
            updated.tags.clone_from(tags);
        }
        updated.updated_at = at;
        updated
    }
}

fn task_title(title: impl Into<String>) -> Result<String, PlannerDomainError> {
    let raw = title.into();
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(PlannerDomainError::EmptyTaskTitle);
    }
    Ok(trimmed.to_owned())
}

fn non_blank(value: String) -> Option<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return None;
    }
    Some(trimmed.to_owned())
}
