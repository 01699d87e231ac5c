//! Shared test helpers for in-memory integration tests.

use daybook::identity::UserId;
use daybook::planner::adapters::memory::{InMemorySectionTable, InMemoryTaskTable};
use daybook::planner::services::Workspace;
use daybook::sync::domain::{CacheSnapshot, Entity};
use eyre::eyre;
use mockable::DefaultClock;
use rstest::fixture;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;

/// Section table used by the integration tests.
pub type Sections = InMemorySectionTable<DefaultClock>;

/// Task table used by the integration tests.
pub type Tasks = InMemoryTaskTable<DefaultClock>;

/// Workspace over the in-memory tables.
pub type TestWorkspace = Workspace<Sections, Tasks>;

/// In-memory backend plus a workspace talking to it.
pub struct Backend {
    pub sections: Arc<Sections>,
    pub tasks: Arc<Tasks>,
    pub workspace: TestWorkspace,
}

impl Backend {
    /// Creates another workspace sharing this backend, as a second device
    /// of the same user would.
    #[must_use]
    pub fn second_client(&self) -> TestWorkspace {
        Workspace::new(Arc::clone(&self.sections), Arc::clone(&self.tasks))
    }
}

/// Provides an empty backend with an unbound workspace.
#[fixture]
pub fn backend() -> Backend {
    let clock = Arc::new(DefaultClock);
    let sections = Arc::new(Sections::new(Arc::clone(&clock)));
    let tasks = Arc::new(Tasks::new(clock));
    let workspace = Workspace::new(Arc::clone(&sections), Arc::clone(&tasks));
    Backend {
        sections,
        tasks,
        workspace,
    }
}

/// Provides a fresh user id.
#[fixture]
pub fn user() -> UserId {
    UserId::new()
}

/// Waits until a published snapshot satisfies `ready`.
///
/// # Errors
///
/// Returns an error when no matching snapshot arrives within two seconds.
pub async fn settle<E: Entity>(
    snapshots: &mut watch::Receiver<CacheSnapshot<E>>,
    ready: impl FnMut(&CacheSnapshot<E>) -> bool,
) -> eyre::Result<CacheSnapshot<E>> {
    let snapshot = tokio::time::timeout(Duration::from_secs(2), snapshots.wait_for(ready))
        .await
        .map_err(|_| eyre!("timed out waiting for snapshot"))?
        .map_err(|err| eyre!("snapshot channel closed: {err}"))?;
    Ok(snapshot.clone())
}
