//! Identity-driven binding shared by several views.

use super::helpers::{Backend, backend, settle};
use daybook::identity::{InMemoryIdentity, UserId};
use daybook::planner::domain::{NewSection, NewTask};
use daybook::sync::ports::RemoteTable;
use rstest::rstest;

#[rstest]
#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn views_share_one_cache_per_collection(backend: Backend) -> eyre::Result<()> {
    let user = UserId::new();
    let identity = InMemoryIdentity::signed_in(user);
    let _follower = backend.workspace.attach(&identity).await;
    let list_view = backend.workspace.clone();
    let calendar_view = backend.workspace.clone();
    let mut calendar_tasks = calendar_view.tasks().watch();

    list_view.tasks().create(NewTask::new("Shared")?).await?;
    let seen = settle(&mut calendar_tasks, |s| s.items.len() == 1).await?;

    eyre::ensure!(seen.items == list_view.tasks().items(), "views disagree");
    eyre::ensure!(
        backend.tasks.subscriber_count(user) == 1,
        "one subscription expected for all views"
    );
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn signing_in_as_someone_else_replaces_the_caches(backend: Backend) -> eyre::Result<()> {
    let alice = UserId::new();
    let bob = UserId::new();
    backend.sections.insert(alice, NewSection::new("Alice work")?).await?;
    backend.tasks.insert(alice, NewTask::new("Alice task")?).await?;
    backend.tasks.insert(bob, NewTask::new("Bob task")?).await?;
    let identity = InMemoryIdentity::new();
    let follower = backend.workspace.attach(&identity).await;

    eyre::ensure!(backend.workspace.tasks().items().is_empty(), "signed out starts empty");

    identity.sign_in(alice);
    let mut tasks = backend.workspace.tasks().watch();
    settle(&mut tasks, |s| s.owner == Some(alice) && s.items.len() == 1).await?;

    identity.sign_in(bob);
    let bobs = settle(&mut tasks, |s| s.owner == Some(bob) && !s.loading && !s.is_empty()).await?;
    eyre::ensure!(
        bobs.items.iter().all(|task| task.user_id() == bob),
        "alice's tasks leaked into bob's cache"
    );
    let mut sections = backend.workspace.sections().watch();
    settle(&mut sections, |s| s.owner == Some(bob) && s.is_empty()).await?;

    follower.stop().await;
    Ok(())
}

#[rstest]
#[tokio::test]
async fn detach_unbinds_both_stores(backend: Backend) -> eyre::Result<()> {
    let user = UserId::new();
    backend.workspace.bind(Some(user)).await?;
    backend.workspace.tasks().create(NewTask::new("Temp")?).await?;

    backend.workspace.detach().await;

    eyre::ensure!(backend.workspace.tasks().owner().is_none(), "tasks still bound");
    eyre::ensure!(backend.workspace.sections().owner().is_none(), "sections still bound");
    eyre::ensure!(backend.workspace.tasks().items().is_empty(), "cache not cleared");
    Ok(())
}
