//! Shared planner context: both stores, bound to the signed-in user.

use super::{SectionStore, TaskStore};
use crate::identity::{IdentitySource, UserId};
use crate::planner::domain::{Section, SectionId, Task};
use crate::planner::ports::TaskTable;
use crate::planner::views::{DayAgenda, StatusFilter, filter_tasks, is_orphan};
use crate::sync::ports::RemoteTable;
use crate::sync::services::SyncResult;
use chrono::NaiveDate;
use std::sync::Arc;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

/// Section and task stores shared by every planner view.
///
/// Views read through the same two stores instead of loading the
/// collections themselves, so one push subscription per table serves the
/// whole application. Clones share the stores.
pub struct Workspace<S: ?Sized, T: ?Sized> {
    sections: SectionStore<S>,
    tasks: TaskStore<T>,
}

impl<S: ?Sized, T: ?Sized> Clone for Workspace<S, T> {
    fn clone(&self) -> Self {
        Self {
            sections: self.sections.clone(),
            tasks: self.tasks.clone(),
        }
    }
}

/// Background task keeping a workspace bound to an identity source.
///
/// Dropping the follower stops it; the stores keep their last binding.
pub struct IdentityFollower {
    cancel: CancellationToken,
    handle: Option<JoinHandle<()>>,
}

impl IdentityFollower {
    /// Stops following and waits for the task to finish.
    pub async fn stop(mut self) {
        self.cancel.cancel();
        let Some(handle) = self.handle.take() else {
            return;
        };
        if let Err(err) = handle.await {
            warn!(error = %err, "identity follower ended abnormally");
        }
    }
}

impl Drop for IdentityFollower {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}

impl<S, T> Workspace<S, T>
where
    S: RemoteTable<Section> + ?Sized + 'static,
    T: TaskTable + ?Sized + 'static,
{
    /// Creates an unbound workspace over the two tables.
    #[must_use]
    pub fn new(sections: Arc<S>, tasks: Arc<T>) -> Self {
        Self {
            sections: SectionStore::new(sections),
            tasks: TaskStore::new(tasks),
        }
    }

    /// Returns the section store.
    #[must_use]
    pub const fn sections(&self) -> &SectionStore<S> {
        &self.sections
    }

    /// Returns the task store.
    #[must_use]
    pub const fn tasks(&self) -> &TaskStore<T> {
        &self.tasks
    }

    /// Binds both stores to `owner`, or unbinds them for `None`.
    ///
    /// Both stores are bound even when one of them fails.
    ///
    /// # Errors
    ///
    /// Returns the section store's error first, then the task store's.
    pub async fn bind(&self, owner: Option<UserId>) -> SyncResult<()> {
        let (sections, tasks) = tokio::join!(self.sections.bind(owner), self.tasks.bind(owner));
        sections.and(tasks)
    }

    /// Binds the workspace to the current user of `identity` and keeps it
    /// bound as the user signs in and out.
    ///
    /// The initial binding completes before this returns. Binding failures
    /// are logged and remain visible in the store snapshots.
    pub async fn attach(&self, identity: &(impl IdentitySource + ?Sized)) -> IdentityFollower {
        let mut users = identity.watch();
        let initial = *users.borrow_and_update();
        self.bind_logged(initial).await;

        let cancel = CancellationToken::new();
        let token = cancel.clone();
        let workspace = self.clone();
        let handle = tokio::spawn(async move {
            workspace.follow(users, token).await;
        });
        IdentityFollower {
            cancel,
            handle: Some(handle),
        }
    }

    /// Unbinds both stores.
    pub async fn detach(&self) {
        self.sections.unbind().await;
        self.tasks.unbind().await;
    }

    /// Returns the tasks of `section` passing `filter`, newest first.
    #[must_use]
    pub fn section_tasks(&self, section: SectionId, filter: StatusFilter) -> Vec<Task> {
        filter_tasks(&self.tasks.items(), section, filter)
    }

    /// Projects the cached tasks onto `date`.
    #[must_use]
    pub fn agenda(&self, date: NaiveDate) -> DayAgenda {
        DayAgenda::project(&self.tasks.items(), &self.sections.items(), date)
    }

    /// Returns the orphan tasks scheduled on `date`.
    #[must_use]
    pub fn orphans(&self, date: NaiveDate) -> Vec<Task> {
        let known = self.sections.known_ids();
        self.tasks
            .items()
            .into_iter()
            .filter(|task| task.is_on(date) && is_orphan(task, &known))
            .collect()
    }

    /// Deletes the orphan tasks scheduled on `date`, one at a time.
    ///
    /// Returns how many were deleted. Stops at the first failure; tasks
    /// deleted before it stay deleted.
    ///
    /// # Errors
    ///
    /// Returns the task store's error for the failing delete.
    pub async fn clean_orphans(&self, date: NaiveDate) -> SyncResult<usize> {
        let doomed = self.orphans(date);
        let mut removed = 0;
        for task in &doomed {
            self.tasks.delete(task.id()).await?;
            removed += 1;
        }
        info!(%date, removed, "orphan tasks cleaned");
        Ok(removed)
    }

    async fn bind_logged(&self, owner: Option<UserId>) {
        if let Err(err) = self.bind(owner).await {
            warn!(error = %err, "workspace binding failed");
        }
    }

    async fn follow(&self, mut users: watch::Receiver<Option<UserId>>, cancel: CancellationToken) {
        loop {
            tokio::select! {
                biased;
                () = cancel.cancelled() => break,
                changed = users.changed() => {
                    if changed.is_err() {
                        debug!("identity source closed");
                        break;
                    }
                }
            }
            let owner = *users.borrow_and_update();
            self.bind_logged(owner).await;
        }
    }
}
