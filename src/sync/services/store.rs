//! Per-user synchronized collection backed by a remote table.

use super::{ChangeOutcome, EntityCache, SyncError, SyncResult};
use crate::identity::UserId;
use crate::sync::domain::{CacheSnapshot, ChangeDecodeError, ChangePayload, Entity, RowChange};
use crate::sync::ports::{ChangeStream, RemoteResult, RemoteTable};
use serde::de::DeserializeOwned;
use std::future::Future;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};
use tokio::sync::watch;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

/// Cache of one entity collection for the bound user.
///
/// The store loads the owner's rows, applies the rows returned by its own
/// mutations and merges push-channel changes from its subscription. All
/// cache writes happen inside one short critical section that is never
/// held across an await, so a result and its push echo cannot interleave
/// into a lost update or a duplicate.
///
/// Every rebinding bumps a generation counter. Results of remote calls
/// started under an older generation, and changes from the previous
/// subscription, are discarded instead of leaking into the new owner's
/// cache.
///
/// Clones share the same cache; [`watch`](Self::watch) lets any number of
/// views observe it without issuing their own loads.
pub struct SyncStore<E: Entity, R: ?Sized> {
    remote: Arc<R>,
    shared: Arc<Shared<E>>,
}

impl<E: Entity, R: ?Sized> Clone for SyncStore<E, R> {
    fn clone(&self) -> Self {
        Self {
            remote: Arc::clone(&self.remote),
            shared: Arc::clone(&self.shared),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Binding {
    owner: UserId,
    generation: u64,
}

struct Shared<E: Entity> {
    state: Mutex<StoreState<E>>,
    snapshots: watch::Sender<CacheSnapshot<E>>,
}

struct StoreState<E: Entity> {
    cache: EntityCache<E>,
    owner: Option<UserId>,
    generation: u64,
    loads_in_flight: u32,
    error: Option<String>,
    change_count: u64,
    channel: Option<ChannelGuard>,
}

/// Cancels the push pump of a subscription when dropped.
struct ChannelGuard {
    cancel: CancellationToken,
}

impl Drop for ChannelGuard {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}

impl<E: Entity> StoreState<E> {
    fn binding(&self) -> Option<Binding> {
        self.owner.map(|owner| Binding {
            owner,
            generation: self.generation,
        })
    }

    fn snapshot(&self) -> CacheSnapshot<E> {
        CacheSnapshot {
            items: self.cache.items(),
            loading: self.loads_in_flight > 0,
            error: self.error.clone(),
            owner: self.owner,
            change_count: self.change_count,
        }
    }
}

impl<E: Entity> Shared<E> {
    fn lock(&self) -> MutexGuard<'_, StoreState<E>> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn publish(&self, state: &StoreState<E>) {
        self.snapshots.send_replace(state.snapshot());
    }

    fn binding(&self) -> Option<Binding> {
        self.lock().binding()
    }

    /// Runs `f` against the state only while `binding` is still current.
    fn with_current<T>(
        &self,
        binding: Binding,
        f: impl FnOnce(&mut StoreState<E>) -> T,
    ) -> Option<T> {
        let mut state = self.lock();
        if state.generation != binding.generation {
            return None;
        }
        let output = f(&mut state);
        self.publish(&state);
        Some(output)
    }

    fn apply_remote(&self, binding: Binding, change: RowChange<E>) -> Option<ChangeOutcome> {
        self.with_current(binding, |state| {
            state.change_count += 1;
            let kind = change.kind();
            let id = change.id();
            let foreign = matches!(
                &change,
                RowChange::Insert(row) | RowChange::Update(row) if row.owner() != binding.owner
            );
            let outcome = if foreign {
                ChangeOutcome::Ignored
            } else {
                state.cache.apply(change)
            };
            debug!(
                table = E::TABLE,
                kind = kind.as_str(),
                id = %id,
                ?outcome,
                "push change handled"
            );
            outcome
        })
    }
}

impl<E: Entity, R: ?Sized> SyncStore<E, R> {
    /// Returns a receiver observing every published snapshot.
    #[must_use]
    pub fn watch(&self) -> watch::Receiver<CacheSnapshot<E>> {
        self.shared.snapshots.subscribe()
    }

    /// Returns the latest published snapshot.
    #[must_use]
    pub fn snapshot(&self) -> CacheSnapshot<E> {
        self.shared.snapshots.borrow().clone()
    }

    /// Returns the cached rows in canonical order.
    #[must_use]
    pub fn items(&self) -> Vec<E> {
        self.shared.lock().cache.items()
    }

    /// Returns the cached row with `id`.
    #[must_use]
    pub fn get(&self, id: E::Id) -> Option<E> {
        self.shared.lock().cache.get(id).cloned()
    }

    /// Returns the user the store is bound to.
    #[must_use]
    pub fn owner(&self) -> Option<UserId> {
        self.shared.lock().owner
    }

    /// Returns whether a push subscription is currently open.
    #[must_use]
    pub fn is_subscribed(&self) -> bool {
        self.shared.lock().channel.is_some()
    }

    /// Returns the remote table the store talks to.
    #[must_use]
    pub const fn remote(&self) -> &Arc<R> {
        &self.remote
    }

    /// Applies a push change to the current binding.
    ///
    /// This is the handler the subscription pump uses; hosts that deliver
    /// notifications through their own channel can call it directly. The
    /// change is ignored when the store is unbound or the row belongs to
    /// another user.
    pub fn apply_change(&self, change: RowChange<E>) -> ChangeOutcome {
        let Some(binding) = self.shared.binding() else {
            return ChangeOutcome::Ignored;
        };
        self.shared
            .apply_remote(binding, change)
            .unwrap_or(ChangeOutcome::Ignored)
    }

    /// Decodes a realtime payload and applies it like
    /// [`apply_change`](Self::apply_change).
    ///
    /// # Errors
    ///
    /// Returns [`ChangeDecodeError`] when the payload does not decode; the
    /// cache is left untouched.
    pub fn apply_payload(&self, payload: ChangePayload) -> Result<ChangeOutcome, ChangeDecodeError>
    where
        E: DeserializeOwned,
        E::Id: DeserializeOwned,
    {
        match payload.decode::<E>() {
            Ok(change) => Ok(self.apply_change(change)),
            Err(err) => {
                warn!(table = E::TABLE, error = %err, "push payload rejected");
                Err(err)
            }
        }
    }

    fn start_pump(&self, binding: Binding, mut stream: ChangeStream<E>) {
        let cancel = CancellationToken::new();
        let guard = ChannelGuard {
            cancel: cancel.clone(),
        };
        let installed = self
            .shared
            .with_current(binding, |state| state.channel = Some(guard))
            .is_some();
        if !installed {
            stream.close();
            return;
        }

        let weak: Weak<Shared<E>> = Arc::downgrade(&self.shared);
        tokio::spawn(async move {
            loop {
                let next = tokio::select! {
                    biased;
                    () = cancel.cancelled() => break,
                    next = stream.next() => next,
                };
                let Some(change) = next else {
                    debug!(table = E::TABLE, owner = %binding.owner, "push stream ended");
                    if let Some(shared) = weak.upgrade() {
                        shared.with_current(binding, |state| state.channel = None);
                    }
                    break;
                };
                let Some(shared) = weak.upgrade() else {
                    break;
                };
                if shared.apply_remote(binding, change).is_none() {
                    break;
                }
            }
            stream.close();
            debug!(table = E::TABLE, owner = %binding.owner, "push subscription closed");
        });
    }
}

impl<E, R> SyncStore<E, R>
where
    E: Entity,
    R: RemoteTable<E> + ?Sized,
{
    /// Creates an unbound store over `remote`.
    #[must_use]
    pub fn new(remote: Arc<R>) -> Self {
        let state = StoreState {
            cache: EntityCache::new(),
            owner: None,
            generation: 0,
            loads_in_flight: 0,
            error: None,
            change_count: 0,
            channel: None,
        };
        let (snapshots, _) = watch::channel(state.snapshot());
        Self {
            remote,
            shared: Arc::new(Shared {
                state: Mutex::new(state),
                snapshots,
            }),
        }
    }

    /// Binds the store to `owner`, or unbinds it for `None`.
    ///
    /// Changing owner clears the cache and closes the previous subscription
    /// before a new one is opened and the collection is loaded. Rebinding
    /// the owner that already has an open subscription does nothing.
    ///
    /// # Errors
    ///
    /// Returns [`SyncError::Remote`] when the subscription cannot be opened
    /// or the initial load fails; the error is also recorded in the
    /// snapshot.
    pub async fn bind(&self, owner: Option<UserId>) -> SyncResult<()> {
        let generation = {
            let mut state = self.shared.lock();
            let already_bound = owner.is_none() || state.channel.is_some();
            if state.owner == owner && already_bound {
                return Ok(());
            }
            state.generation += 1;
            state.channel = None;
            if state.owner != owner {
                state.cache.clear();
                state.error = None;
                state.change_count = 0;
            }
            state.owner = owner;
            state.loads_in_flight = 0;
            self.shared.publish(&state);
            state.generation
        };

        let Some(owner) = owner else {
            info!(table = E::TABLE, "store unbound");
            return Ok(());
        };
        info!(table = E::TABLE, owner = %owner, "store bound");
        let binding = Binding { owner, generation };

        match self.remote.subscribe(owner).await {
            Ok(stream) => self.start_pump(binding, stream),
            Err(err) => {
                warn!(table = E::TABLE, owner = %owner, error = %err, "push subscription failed");
                self.shared
                    .with_current(binding, |state| state.error = Some(err.to_string()));
                return Err(err.into());
            }
        }

        self.fetch().await
    }

    /// Unbinds the store, closing its subscription and clearing the cache.
    pub async fn unbind(&self) {
        // Unbinding never reaches the remote.
        if let Err(err) = self.bind(None).await {
            warn!(table = E::TABLE, error = %err, "unbind reported an error");
        }
    }

    /// Reloads the whole collection for the bound user.
    ///
    /// Does nothing when unbound. On failure the previous rows are kept and
    /// the error message is recorded in the snapshot.
    ///
    /// # Errors
    ///
    /// Returns [`SyncError::Remote`] when the load fails.
    pub async fn fetch(&self) -> SyncResult<()> {
        let Some(binding) = self.shared.binding() else {
            return Ok(());
        };
        self.shared.with_current(binding, |state| {
            state.loads_in_flight += 1;
            state.error = None;
        });
        debug!(table = E::TABLE, owner = %binding.owner, "loading collection");

        match self.remote.select(binding.owner).await {
            Ok(rows) => {
                let applied = self.shared.with_current(binding, |state| {
                    state.cache.replace_all(
                        rows.into_iter()
                            .filter(|row| row.owner() == binding.owner),
                    );
                    state.loads_in_flight = state.loads_in_flight.saturating_sub(1);
                    state.cache.len()
                });
                if let Some(count) = applied {
                    debug!(table = E::TABLE, owner = %binding.owner, count, "collection loaded");
                }
                Ok(())
            }
            Err(err) => {
                warn!(table = E::TABLE, owner = %binding.owner, error = %err, "collection load failed");
                self.shared.with_current(binding, |state| {
                    state.error = Some(err.to_string());
                    state.loads_in_flight = state.loads_in_flight.saturating_sub(1);
                });
                Err(err.into())
            }
        }
    }

    /// Inserts a row for the bound user and caches the stored row.
    ///
    /// # Errors
    ///
    /// Returns [`SyncError::SignedOut`] when unbound and
    /// [`SyncError::Remote`] when the insert fails.
    pub async fn create(&self, draft: E::Draft) -> SyncResult<E> {
        let remote = &self.remote;
        self.mutate(
            "create",
            |owner| remote.insert(owner, draft),
            |cache, row: &E| {
                cache.upsert(row.clone());
            },
        )
        .await
    }

    /// Updates the row with `id` and caches the stored row.
    ///
    /// Returns `Ok(None)` when no row matched; the cache is left as is.
    ///
    /// # Errors
    ///
    /// Returns [`SyncError::SignedOut`] when unbound and
    /// [`SyncError::Remote`] when the update fails.
    pub async fn update(&self, id: E::Id, patch: E::Patch) -> SyncResult<Option<E>> {
        let remote = &self.remote;
        self.mutate(
            "update",
            |_| remote.update(id, patch),
            |cache, row: &Option<E>| {
                if let Some(stored) = row {
                    cache.replace(stored.clone());
                }
            },
        )
        .await
    }

    /// Deletes the row with `id` and removes it from the cache.
    ///
    /// # Errors
    ///
    /// Returns [`SyncError::SignedOut`] when unbound and
    /// [`SyncError::Remote`] when the delete fails.
    pub async fn delete(&self, id: E::Id) -> SyncResult<()> {
        let remote = &self.remote;
        self.mutate(
            "delete",
            |_| remote.delete(id),
            |cache, _: &()| {
                cache.remove(id);
            },
        )
        .await
    }

    /// Runs a remote mutation for the bound user and commits its result.
    ///
    /// `commit` runs only on success and only while the binding that issued
    /// the call is still current.
    pub(crate) async fn mutate<T, F, Fut, C>(
        &self,
        operation: &'static str,
        call: F,
        commit: C,
    ) -> SyncResult<T>
    where
        T: Send,
        F: FnOnce(UserId) -> Fut + Send,
        Fut: Future<Output = RemoteResult<T>> + Send,
        C: FnOnce(&mut EntityCache<E>, &T) + Send,
    {
        let binding = self.shared.binding().ok_or(SyncError::SignedOut)?;
        match call(binding.owner).await {
            Ok(value) => {
                let committed = self
                    .shared
                    .with_current(binding, |state| commit(&mut state.cache, &value))
                    .is_some();
                if committed {
                    info!(table = E::TABLE, operation, owner = %binding.owner, "mutation applied");
                } else {
                    debug!(
                        table = E::TABLE,
                        operation,
                        "binding changed during mutation, result not cached"
                    );
                }
                Ok(value)
            }
            Err(err) => {
                warn!(table = E::TABLE, operation, error = %err, "mutation failed");
                Err(err.into())
            }
        }
    }
}
