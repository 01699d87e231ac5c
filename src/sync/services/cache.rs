//! Id-keyed entity cache projected to canonical order on read.

use crate::sync::domain::{CanonicalOrder, Entity, RowChange};
use chrono::{DateTime, Utc};
use std::collections::{BTreeSet, HashMap};

/// Effect a change had on the cache.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ChangeOutcome {
    /// A row that was not cached was added.
    Inserted,
    /// A cached row was replaced.
    Replaced,
    /// A cached row was removed.
    Removed,
    /// The cache was left untouched.
    Ignored,
}

/// Cache of one entity collection.
///
/// Rows are keyed by id, so every write is an idempotent upsert or remove:
/// applying the same row twice, or a local result followed by its push
/// echo, leaves exactly one entry. Display order is derived from the
/// `(created_at, id)` index rather than from insertion position.
#[derive(Debug, Clone)]
pub struct EntityCache<E: Entity> {
    rows: HashMap<E::Id, E>,
    order: BTreeSet<(DateTime<Utc>, E::Id)>,
}

impl<E: Entity> EntityCache<E> {
    /// Creates an empty cache.
    #[must_use]
    pub fn new() -> Self {
        Self {
            rows: HashMap::new(),
            order: BTreeSet::new(),
        }
    }

    /// Returns the number of cached rows.
    #[must_use]
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Returns whether the cache holds no rows.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Returns whether a row with `id` is cached.
    #[must_use]
    pub fn contains(&self, id: E::Id) -> bool {
        self.rows.contains_key(&id)
    }

    /// Returns the cached row with `id`.
    #[must_use]
    pub fn get(&self, id: E::Id) -> Option<&E> {
        self.rows.get(&id)
    }

    /// Inserts `row`, replacing any cached row with the same id.
    pub fn upsert(&mut self, row: E) -> ChangeOutcome {
        let outcome = if self.detach(row.id()).is_some() {
            ChangeOutcome::Replaced
        } else {
            ChangeOutcome::Inserted
        };
        self.attach(row);
        outcome
    }

    /// Replaces the cached row with the same id.
    ///
    /// Uncached rows are ignored, as are rows whose update timestamp is
    /// older than the cached one.
    pub fn replace(&mut self, row: E) -> ChangeOutcome {
        let Some(cached) = self.rows.get(&row.id()) else {
            return ChangeOutcome::Ignored;
        };
        let stale = matches!(
            (row.updated_at(), cached.updated_at()),
            (Some(incoming), Some(current)) if incoming < current
        );
        if stale {
            return ChangeOutcome::Ignored;
        }
        self.upsert(row)
    }

    /// Adds `row` unless a row with the same id is already cached.
    pub fn insert_new(&mut self, row: E) -> ChangeOutcome {
        if self.contains(row.id()) {
            return ChangeOutcome::Ignored;
        }
        self.attach(row);
        ChangeOutcome::Inserted
    }

    /// Removes the row with `id`.
    pub fn remove(&mut self, id: E::Id) -> ChangeOutcome {
        self.detach(id)
            .map_or(ChangeOutcome::Ignored, |_| ChangeOutcome::Removed)
    }

    /// Removes every row matching `predicate` and returns how many went.
    pub fn remove_where(&mut self, mut predicate: impl FnMut(&E) -> bool) -> usize {
        let doomed: Vec<E::Id> = self
            .rows
            .values()
            .filter(|row| predicate(row))
            .map(|row| row.id())
            .collect();
        for id in &doomed {
            self.detach(*id);
        }
        doomed.len()
    }

    /// Replaces the whole cache with `rows`.
    pub fn replace_all(&mut self, rows: impl IntoIterator<Item = E>) {
        self.clear();
        for row in rows {
            self.upsert(row);
        }
    }

    /// Removes every row.
    pub fn clear(&mut self) {
        self.rows.clear();
        self.order.clear();
    }

    /// Applies a push-channel change.
    ///
    /// Inserts of already cached ids and updates or deletes of uncached ids
    /// are ignored.
    pub fn apply(&mut self, change: RowChange<E>) -> ChangeOutcome {
        match change {
            RowChange::Insert(row) => self.insert_new(row),
            RowChange::Update(row) => self.replace(row),
            RowChange::Delete { id } => self.remove(id),
        }
    }

    /// Returns the cached rows in canonical order.
    #[must_use]
    pub fn items(&self) -> Vec<E> {
        let keys: Box<dyn Iterator<Item = &(DateTime<Utc>, E::Id)> + '_> = match E::ORDER {
            CanonicalOrder::OldestFirst => Box::new(self.order.iter()),
            CanonicalOrder::NewestFirst => Box::new(self.order.iter().rev()),
        };
        keys.filter_map(|(_, id)| self.rows.get(id).cloned())
            .collect()
    }

    fn attach(&mut self, row: E) {
        self.order.insert((row.created_at(), row.id()));
        self.rows.insert(row.id(), row);
    }

    fn detach(&mut self, id: E::Id) -> Option<E> {
        let row = self.rows.remove(&id)?;
        self.order.remove(&(row.created_at(), id));
        Some(row)
    }
}

impl<E: Entity> Default for EntityCache<E> {
    fn default() -> Self {
        Self::new()
    }
}
