//! Then steps for planner synchronization BDD scenarios.

use super::world::{PlannerWorld, parse_date, run_async};
use daybook::planner::domain::TaskStatus;
use daybook::sync::ports::RemoteTable;
use daybook::sync::services::SyncError;
use eyre::eyre;
use rstest_bdd_macros::then;

#[then("the task list holds {count:usize} task")]
fn task_list_holds(world: &PlannerWorld, count: usize) -> Result<(), eyre::Report> {
    let items = world.workspace.tasks().items();
    if items.len() != count {
        return Err(eyre!("expected {count} tasks, found {}", items.len()));
    }
    Ok(())
}

#[then(r#"the task list includes "{title}""#)]
fn task_list_includes(world: &PlannerWorld, title: String) -> Result<(), eyre::Report> {
    let found = world
        .workspace
        .tasks()
        .items()
        .iter()
        .any(|task| task.title() == title);
    if !found {
        return Err(eyre!("task '{title}' missing from the list"));
    }
    Ok(())
}

#[then(r#"the task "{title}" has status "{status}""#)]
fn task_has_status(world: &PlannerWorld, title: String, status: String) -> Result<(), eyre::Report> {
    let expected = TaskStatus::try_from(status.as_str())?;
    let task = world
        .workspace
        .tasks()
        .get(world.task_id(&title)?)
        .ok_or_else(|| eyre!("task '{title}' not cached"))?;
    if task.status() != expected {
        return Err(eyre!("expected {expected:?}, found {:?}", task.status()));
    }
    Ok(())
}

#[then(r#"the calendar for "{date}" shows {count:usize} orphan"#)]
fn calendar_shows_orphans(
    world: &PlannerWorld,
    date: String,
    count: usize,
) -> Result<(), eyre::Report> {
    let agenda = world.workspace.agenda(parse_date(&date)?);
    if agenda.orphan_count() != count {
        return Err(eyre!(
            "expected {count} orphans, found {}",
            agenda.orphan_count()
        ));
    }
    Ok(())
}

#[then(r#"the {hour:u32}:00 slot on "{date}" is empty"#)]
fn slot_is_empty(world: &PlannerWorld, hour: u32, date: String) -> Result<(), eyre::Report> {
    let agenda = world.workspace.agenda(parse_date(&date)?);
    let target = agenda
        .slot(hour)
        .ok_or_else(|| eyre!("no slot for hour {hour}"))?;
    if !target.is_empty() {
        return Err(eyre!("slot {} still lists entries", target.label()));
    }
    Ok(())
}

#[then(r#"the {hour:u32}:00 slot on "{date}" lists "{title}""#)]
fn slot_lists(
    world: &PlannerWorld,
    hour: u32,
    date: String,
    title: String,
) -> Result<(), eyre::Report> {
    let agenda = world.workspace.agenda(parse_date(&date)?);
    let target = agenda
        .slot(hour)
        .ok_or_else(|| eyre!("no slot for hour {hour}"))?;
    if !target.entries().iter().any(|entry| entry.task.title() == title) {
        return Err(eyre!("slot {} does not list '{title}'", target.label()));
    }
    Ok(())
}

#[then(r#"the task "{title}" still exists"#)]
fn task_still_exists(world: &PlannerWorld, title: String) -> Result<(), eyre::Report> {
    let id = world.task_id(&title)?;
    if world.workspace.tasks().get(id).is_none() {
        return Err(eyre!("task '{title}' dropped from the cache"));
    }
    let owner = world
        .workspace
        .tasks()
        .owner()
        .ok_or_else(|| eyre!("workspace is signed out"))?;
    let stored = run_async(world.workspace.tasks().remote().select(owner))?;
    if !stored.iter().any(|task| task.id() == id) {
        return Err(eyre!("task '{title}' deleted on the server"));
    }
    Ok(())
}

#[then(r#"the filtered tasks are "{titles}""#)]
fn filtered_tasks_are(world: &PlannerWorld, titles: String) -> Result<(), eyre::Report> {
    let actual: Vec<&str> = world.filtered.iter().map(|task| task.title()).collect();
    let expected: Vec<&str> = titles.split(", ").collect();
    if actual != expected {
        return Err(eyre!("expected {expected:?}, found {actual:?}"));
    }
    Ok(())
}

#[then("the request fails because nobody is signed in")]
fn request_fails_signed_out(world: &PlannerWorld) -> Result<(), eyre::Report> {
    match &world.last_error {
        Some(SyncError::SignedOut) => Ok(()),
        other => Err(eyre!("expected a signed-out error, got {other:?}")),
    }
}
