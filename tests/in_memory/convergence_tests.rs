//! Mutations and their push echoes converge to one entry per row.

use super::helpers::{Backend, backend, settle, user};
use daybook::identity::UserId;
use daybook::planner::domain::{NewTask, TaskPatch, TaskPriority, TaskStatus};
use daybook::sync::domain::RowChange;
use daybook::sync::ports::RemoteTable;
use rstest::rstest;
use std::collections::HashSet;

#[rstest]
#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn interleaved_creates_and_echoes_match_the_server(
    backend: Backend,
    user: UserId,
) -> eyre::Result<()> {
    backend.workspace.bind(Some(user)).await?;
    let tasks = backend.workspace.tasks().clone();
    let mut snapshots = tasks.watch();

    let mut handles = Vec::new();
    for index in 0..16 {
        let store = tasks.clone();
        handles.push(tokio::spawn(async move {
            store.create(NewTask::new(format!("task {index}"))?).await?;
            Ok::<_, eyre::Report>(())
        }));
    }
    for handle in handles {
        handle.await??;
    }
    let settled = settle(&mut snapshots, |s| s.change_count == 16).await?;

    let ids: HashSet<_> = settled.items.iter().map(|task| task.id()).collect();
    eyre::ensure!(ids.len() == 16, "expected 16 distinct tasks, got {}", ids.len());
    eyre::ensure!(
        settled.items == backend.tasks.rows(user)?,
        "cache diverged from the server rows"
    );
    Ok(())
}

#[rstest]
#[tokio::test]
async fn update_then_echo_leaves_a_single_updated_entry(
    backend: Backend,
    user: UserId,
) -> eyre::Result<()> {
    backend.workspace.bind(Some(user)).await?;
    let tasks = backend.workspace.tasks();
    let mut snapshots = tasks.watch();
    let created = tasks.create(NewTask::new("Draft plan")?).await?;
    settle(&mut snapshots, |s| s.change_count == 1).await?;

    let patch = TaskPatch::new()
        .with_status(TaskStatus::Completed)
        .with_priority(TaskPriority::High);
    tasks.update(created.id(), patch).await?;
    let settled = settle(&mut snapshots, |s| s.change_count == 2).await?;

    eyre::ensure!(settled.items.len() == 1, "expected exactly one task");
    let task = settled
        .items
        .first()
        .ok_or_else(|| eyre::eyre!("task missing"))?;
    eyre::ensure!(task.status() == TaskStatus::Completed, "status not updated");
    eyre::ensure!(task.priority() == TaskPriority::High, "priority not updated");
    Ok(())
}

#[rstest]
#[tokio::test]
async fn a_second_client_sees_writes_through_the_push_channel(
    backend: Backend,
    user: UserId,
) -> eyre::Result<()> {
    let phone = backend.second_client();
    backend.workspace.bind(Some(user)).await?;
    phone.bind(Some(user)).await?;
    let mut phone_tasks = phone.tasks().watch();

    let created = backend
        .workspace
        .tasks()
        .create(NewTask::new("Pick up parcel")?)
        .await?;
    let seen = settle(&mut phone_tasks, |s| !s.is_empty()).await?;
    eyre::ensure!(seen.items == vec![created.clone()], "phone missed the insert");

    backend.workspace.tasks().delete(created.id()).await?;
    settle(&mut phone_tasks, |s| s.is_empty()).await?;
    Ok(())
}

#[rstest]
#[tokio::test]
async fn stale_echo_of_a_deleted_row_does_not_resurrect_it(
    backend: Backend,
    user: UserId,
) -> eyre::Result<()> {
    backend.workspace.bind(Some(user)).await?;
    backend.tasks.set_echo(false)?;
    let tasks = backend.workspace.tasks();
    let mut snapshots = tasks.watch();
    let created = tasks.create(NewTask::new("Short lived")?).await?;
    tasks.delete(created.id()).await?;

    backend.tasks.inject(user, &RowChange::Update(created));
    let settled = settle(&mut snapshots, |s| s.change_count == 1).await?;

    eyre::ensure!(settled.items.is_empty(), "deleted task came back");
    Ok(())
}

#[rstest]
#[tokio::test]
async fn users_never_see_each_others_rows(backend: Backend) -> eyre::Result<()> {
    let alice = UserId::new();
    let bob = UserId::new();
    backend.tasks.insert(bob, NewTask::new("Bob's secret")?).await?;
    backend.workspace.bind(Some(alice)).await?;

    backend.tasks.insert(bob, NewTask::new("Another")?).await?;
    backend.workspace.tasks().fetch().await?;

    eyre::ensure!(
        backend.workspace.tasks().items().is_empty(),
        "alice sees bob's tasks"
    );
    Ok(())
}
