//! Task table behaviour against a real database.

use super::helpers::{PlannerDb, published};
use chrono::{NaiveDate, NaiveTime};
use daybook::identity::UserId;
use daybook::planner::domain::{
    NewSection, NewTask, Task, TaskId, TaskPatch, TaskPriority, TaskStatus, TaskTags,
};
use daybook::planner::ports::TaskTable;
use daybook::sync::domain::RowChange;
use daybook::sync::ports::{RemoteError, RemoteTable};
use pg_embedded_setup_unpriv::{TestCluster, test_support::shared_test_cluster};
use rstest::rstest;
use std::collections::HashSet;

fn march_fifth() -> eyre::Result<NaiveDate> {
    NaiveDate::from_ymd_opt(2024, 3, 5).ok_or_else(|| eyre::eyre!("invalid date"))
}

fn half_past_two() -> eyre::Result<NaiveTime> {
    NaiveTime::from_hms_opt(14, 30, 0).ok_or_else(|| eyre::eyre!("invalid time"))
}

fn deleted_ids(changes: &[RowChange<Task>]) -> HashSet<TaskId> {
    changes
        .iter()
        .filter_map(|change| match change {
            RowChange::Delete { id } => Some(*id),
            RowChange::Insert(_) | RowChange::Update(_) => None,
        })
        .collect()
}

#[rstest]
fn insert_applies_defaults_and_keeps_the_schedule(
    shared_test_cluster: &'static TestCluster,
) -> eyre::Result<()> {
    let db = PlannerDb::create(shared_test_cluster)?;
    let owner = UserId::new();
    let draft = NewTask::new("Design review")?
        .on(march_fifth()?)
        .at(half_past_two()?)
        .with_tags(TaskTags::new(["work", "review"]));

    let created = db.block_on(db.tasks.insert(owner, draft))?;

    eyre::ensure!(created.priority() == TaskPriority::Medium, "priority default lost");
    eyre::ensure!(created.status() == TaskStatus::Pending, "status default lost");
    eyre::ensure!(created.section_id().is_none(), "task filed under a section");
    eyre::ensure!(created.date() == Some(march_fifth()?), "date not stored");
    eyre::ensure!(created.hour() == Some(14), "time not stored");
    eyre::ensure!(created.tags().len() == 2, "tags not stored");
    eyre::ensure!(
        db.block_on(db.tasks.select(owner))? == vec![created],
        "select disagrees with insert"
    );
    Ok(())
}

#[rstest]
fn select_lists_the_owners_tasks_newest_first(
    shared_test_cluster: &'static TestCluster,
) -> eyre::Result<()> {
    let db = PlannerDb::create(shared_test_cluster)?;
    let owner = UserId::new();
    let mut expected = Vec::new();
    for title in ["first", "second", "third"] {
        expected.push(db.block_on(db.tasks.insert(owner, NewTask::new(title)?))?);
    }
    db.block_on(db.tasks.insert(UserId::new(), NewTask::new("foreign")?))?;
    expected.sort_by_key(|task| (task.created_at(), task.id().into_inner()));
    expected.reverse();

    let listed = db.block_on(db.tasks.select(owner))?;

    eyre::ensure!(listed == expected, "expected {expected:?}, got {listed:?}");
    Ok(())
}

#[rstest]
fn update_can_clear_nullable_columns(
    shared_test_cluster: &'static TestCluster,
) -> eyre::Result<()> {
    let db = PlannerDb::create(shared_test_cluster)?;
    let owner = UserId::new();
    let created = db.block_on(db.tasks.insert(
        owner,
        NewTask::new("Call plumber")?
            .with_description("before noon")
            .on(march_fifth()?),
    ))?;
    let patch = TaskPatch::new()
        .with_description(None)
        .with_date(None)
        .with_status(TaskStatus::Completed);

    let updated = db
        .block_on(db.tasks.update(created.id(), patch))?
        .ok_or_else(|| eyre::eyre!("existing task not updated"))?;

    eyre::ensure!(updated.description().is_none(), "description not cleared");
    eyre::ensure!(updated.date().is_none(), "date not cleared");
    eyre::ensure!(updated.status() == TaskStatus::Completed, "status not patched");
    eyre::ensure!(updated.title() == "Call plumber", "untouched field changed");
    Ok(())
}

#[rstest]
fn update_of_a_missing_task_returns_none(
    shared_test_cluster: &'static TestCluster,
) -> eyre::Result<()> {
    let db = PlannerDb::create(shared_test_cluster)?;

    let outcome = db.block_on(
        db.tasks
            .update(TaskId::new(), TaskPatch::new().with_status(TaskStatus::Completed)),
    )?;

    eyre::ensure!(outcome.is_none(), "missing task reported as updated");
    Ok(())
}

#[rstest]
fn delete_by_section_removes_only_that_sections_tasks(
    shared_test_cluster: &'static TestCluster,
) -> eyre::Result<()> {
    let db = PlannerDb::create(shared_test_cluster)?;
    let owner = UserId::new();
    let other = UserId::new();
    let work = db.block_on(db.sections.insert(owner, NewSection::new("Work")?))?;
    let report = db.block_on(db.tasks.insert(owner, NewTask::new("Report")?.in_section(work.id())))?;
    let slides = db.block_on(db.tasks.insert(owner, NewTask::new("Slides")?.in_section(work.id())))?;
    let loose = db.block_on(db.tasks.insert(owner, NewTask::new("Loose")?))?;
    let foreign =
        db.block_on(db.tasks.insert(other, NewTask::new("Foreign")?.in_section(work.id())))?;
    let mut stream = db.block_on(db.tasks.subscribe(owner))?;

    let removed = db.block_on(db.tasks.delete_by_section(owner, Some(work.id())))?;

    eyre::ensure!(removed == 2, "expected 2 deletions, got {removed}");
    eyre::ensure!(
        db.block_on(db.tasks.select(owner))? == vec![loose],
        "unsectioned task affected"
    );
    eyre::ensure!(
        db.block_on(db.tasks.select(other))? == vec![foreign],
        "another owner's task affected"
    );
    eyre::ensure!(
        deleted_ids(&published(&mut stream)) == HashSet::from([report.id(), slides.id()]),
        "delete notifications do not match"
    );
    Ok(())
}

#[rstest]
fn delete_by_section_none_removes_unsectioned_tasks(
    shared_test_cluster: &'static TestCluster,
) -> eyre::Result<()> {
    let db = PlannerDb::create(shared_test_cluster)?;
    let owner = UserId::new();
    let work = db.block_on(db.sections.insert(owner, NewSection::new("Work")?))?;
    let filed = db.block_on(db.tasks.insert(owner, NewTask::new("Filed")?.in_section(work.id())))?;
    db.block_on(db.tasks.insert(owner, NewTask::new("Loose one")?))?;
    db.block_on(db.tasks.insert(owner, NewTask::new("Loose two")?))?;

    let removed = db.block_on(db.tasks.delete_by_section(owner, None))?;

    eyre::ensure!(removed == 2, "expected 2 deletions, got {removed}");
    eyre::ensure!(
        db.block_on(db.tasks.select(owner))? == vec![filed],
        "sectioned task affected"
    );
    Ok(())
}

#[rstest]
fn deleting_a_section_leaves_its_tasks_in_place(
    shared_test_cluster: &'static TestCluster,
) -> eyre::Result<()> {
    let db = PlannerDb::create(shared_test_cluster)?;
    let owner = UserId::new();
    let work = db.block_on(db.sections.insert(owner, NewSection::new("Work")?))?;
    let task = db.block_on(db.tasks.insert(owner, NewTask::new("Report")?.in_section(work.id())))?;

    db.block_on(db.sections.delete(work.id()))?;

    let listed = db.block_on(db.tasks.select(owner))?;
    eyre::ensure!(listed == vec![task], "section delete cascaded to tasks");
    Ok(())
}

#[rstest]
fn constraint_violations_surface_as_rejections(
    shared_test_cluster: &'static TestCluster,
) -> eyre::Result<()> {
    let db = PlannerDb::create(shared_test_cluster)?;
    let owner = UserId::new();
    let created = db.block_on(db.tasks.insert(owner, NewTask::new("Report")?))?;
    db.execute("ALTER TABLE tasks ADD CONSTRAINT tasks_title_short CHECK (length(title) < 10)")?;

    let result = db.block_on(
        db.tasks
            .update(created.id(), TaskPatch::new().with_title("A much longer title")?),
    );

    eyre::ensure!(
        matches!(result, Err(RemoteError::Rejected { table: "tasks", .. })),
        "expected a rejection, got {result:?}"
    );
    Ok(())
}
