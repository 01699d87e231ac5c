//! In-memory remote table for tests and offline use.

use super::ChangeFeed;
use crate::identity::UserId;
use crate::sync::domain::{CanonicalOrder, Entity, RowChange};
use crate::sync::ports::{ChangeStream, RemoteError, RemoteResult, RemoteTable};
use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use mockable::Clock;
use std::collections::HashMap;
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

/// Row type the in-memory table can materialize on the server side.
pub trait MemoryRow: Entity {
    /// Builds the stored row for an insert. Implementations assign a fresh
    /// id.
    fn from_draft(owner: UserId, draft: Self::Draft, at: DateTime<Utc>) -> Self;

    /// Returns the row with `patch` applied and `at` as update time.
    fn patched(&self, patch: &Self::Patch, at: DateTime<Utc>) -> Self;
}

/// Remote operation that can be made to fail.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TableOperation {
    /// Collection load.
    Select,
    /// Single-row insert.
    Insert,
    /// Single-row update.
    Update,
    /// Single-row delete.
    Delete,
    /// Predicate delete.
    BulkDelete,
    /// Push subscription.
    Subscribe,
}

/// Thread-safe in-memory table.
///
/// Acts as the server: it assigns ids, stamps strictly increasing
/// timestamps from the clock and publishes every committed write to the
/// owner's subscribers.
pub struct InMemoryTable<E: Entity, C> {
    state: Arc<RwLock<TableState<E>>>,
    feed: Arc<ChangeFeed<E>>,
    clock: Arc<C>,
}

impl<E: Entity, C> Clone for InMemoryTable<E, C> {
    fn clone(&self) -> Self {
        Self {
            state: Arc::clone(&self.state),
            feed: Arc::clone(&self.feed),
            clock: Arc::clone(&self.clock),
        }
    }
}

struct TableState<E: Entity> {
    rows: HashMap<E::Id, E>,
    last_stamp: Option<DateTime<Utc>>,
    failures: HashMap<TableOperation, RemoteError>,
    echo: bool,
}

impl<E: Entity> TableState<E> {
    fn take_failure(&mut self, operation: TableOperation) -> RemoteResult<()> {
        self.failures.remove(&operation).map_or(Ok(()), Err)
    }

    fn stamp(&mut self, now: DateTime<Utc>) -> DateTime<Utc> {
        let stamp = match self.last_stamp {
            Some(previous) if now <= previous => previous + Duration::microseconds(1),
            _ => now,
        };
        self.last_stamp = Some(stamp);
        stamp
    }
}

impl<E, C> InMemoryTable<E, C>
where
    E: MemoryRow,
    C: Clock + Send + Sync,
{
    /// Creates an empty table that echoes writes to subscribers.
    #[must_use]
    pub fn new(clock: Arc<C>) -> Self {
        Self {
            state: Arc::new(RwLock::new(TableState {
                rows: HashMap::new(),
                last_stamp: None,
                failures: HashMap::new(),
                echo: true,
            })),
            feed: Arc::new(ChangeFeed::new()),
            clock,
        }
    }

    /// Makes the next call of `operation` fail with `error`.
    ///
    /// # Errors
    ///
    /// Returns persistence errors when lock acquisition fails.
    pub fn fail_next(&self, operation: TableOperation, error: RemoteError) -> RemoteResult<()> {
        self.write()?.failures.insert(operation, error);
        Ok(())
    }

    /// Enables or disables publishing of committed writes.
    ///
    /// # Errors
    ///
    /// Returns persistence errors when lock acquisition fails.
    pub fn set_echo(&self, enabled: bool) -> RemoteResult<()> {
        self.write()?.echo = enabled;
        Ok(())
    }

    /// Returns the stored rows of `owner` in canonical order.
    ///
    /// # Errors
    ///
    /// Returns persistence errors when lock acquisition fails.
    pub fn rows(&self, owner: UserId) -> RemoteResult<Vec<E>> {
        let state = self.read()?;
        Ok(ordered_rows(&state, owner))
    }

    /// Delivers `change` to the subscribers of `owner` without storing it.
    pub fn inject(&self, owner: UserId, change: &RowChange<E>) {
        self.feed.publish(owner, change);
    }

    /// Returns the number of live subscriptions for `owner`.
    #[must_use]
    pub fn subscriber_count(&self, owner: UserId) -> usize {
        self.feed.subscriber_count(owner)
    }

    /// Deletes every row of `owner` matching `predicate` and returns the
    /// removed ids.
    ///
    /// # Errors
    ///
    /// Returns an injected [`TableOperation::BulkDelete`] failure or a
    /// persistence error when lock acquisition fails.
    pub fn delete_where(
        &self,
        owner: UserId,
        predicate: impl Fn(&E) -> bool,
    ) -> RemoteResult<Vec<E::Id>> {
        let (removed, echo) = {
            let mut state = self.write()?;
            state.take_failure(TableOperation::BulkDelete)?;
            let doomed: Vec<E::Id> = state
                .rows
                .values()
                .filter(|row| row.owner() == owner && predicate(row))
                .map(|row| row.id())
                .collect();
            for id in &doomed {
                state.rows.remove(id);
            }
            (doomed, state.echo)
        };
        if echo {
            for id in &removed {
                self.feed.publish(owner, &RowChange::Delete { id: *id });
            }
        }
        Ok(removed)
    }

    fn read(&self) -> RemoteResult<RwLockReadGuard<'_, TableState<E>>> {
        self.state
            .read()
            .map_err(|err| RemoteError::persistence(std::io::Error::other(err.to_string())))
    }

    fn write(&self) -> RemoteResult<RwLockWriteGuard<'_, TableState<E>>> {
        self.state
            .write()
            .map_err(|err| RemoteError::persistence(std::io::Error::other(err.to_string())))
    }

    fn publish_if_echoing(&self, echo: bool, owner: UserId, change: &RowChange<E>) {
        if echo {
            self.feed.publish(owner, change);
        }
    }
}

fn ordered_rows<E: Entity>(state: &TableState<E>, owner: UserId) -> Vec<E> {
    let mut rows: Vec<E> = state
        .rows
        .values()
        .filter(|row| row.owner() == owner)
        .cloned()
        .collect();
    rows.sort_by_key(|row| (row.created_at(), row.id()));
    if E::ORDER == CanonicalOrder::NewestFirst {
        rows.reverse();
    }
    rows
}

#[async_trait]
impl<E, C> RemoteTable<E> for InMemoryTable<E, C>
where
    E: MemoryRow,
    C: Clock + Send + Sync,
{
    async fn select(&self, owner: UserId) -> RemoteResult<Vec<E>> {
        let mut state = self.write()?;
        state.take_failure(TableOperation::Select)?;
        Ok(ordered_rows(&state, owner))
    }

    async fn insert(&self, owner: UserId, draft: E::Draft) -> RemoteResult<E> {
        let (row, echo) = {
            let mut state = self.write()?;
            state.take_failure(TableOperation::Insert)?;
            let at = state.stamp(self.clock.utc());
            let row = E::from_draft(owner, draft, at);
            state.rows.insert(row.id(), row.clone());
            (row, state.echo)
        };
        self.publish_if_echoing(echo, owner, &RowChange::Insert(row.clone()));
        Ok(row)
    }

    async fn update(&self, id: E::Id, patch: E::Patch) -> RemoteResult<Option<E>> {
        let (row, echo) = {
            let mut state = self.write()?;
            state.take_failure(TableOperation::Update)?;
            let at = state.stamp(self.clock.utc());
            let Some(existing) = state.rows.get(&id) else {
                return Ok(None);
            };
            let row = existing.patched(&patch, at);
            state.rows.insert(id, row.clone());
            (row, state.echo)
        };
        self.publish_if_echoing(echo, row.owner(), &RowChange::Update(row.clone()));
        Ok(Some(row))
    }

    async fn delete(&self, id: E::Id) -> RemoteResult<()> {
        let (removed, echo) = {
            let mut state = self.write()?;
            state.take_failure(TableOperation::Delete)?;
            (state.rows.remove(&id), state.echo)
        };
        if let Some(row) = removed {
            self.publish_if_echoing(echo, row.owner(), &RowChange::Delete { id });
        }
        Ok(())
    }

    async fn subscribe(&self, owner: UserId) -> RemoteResult<ChangeStream<E>> {
        self.write()?.take_failure(TableOperation::Subscribe)?;
        Ok(self.feed.subscribe(owner))
    }
}
