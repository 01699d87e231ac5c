//! Section store.

use crate::planner::domain::{Section, SectionId};
use crate::sync::ports::RemoteTable;
use crate::sync::services::SyncStore;
use std::collections::HashSet;

/// Synchronized section collection, oldest first.
pub type SectionStore<R> = SyncStore<Section, R>;

impl<R: RemoteTable<Section> + ?Sized> SyncStore<Section, R> {
    /// Returns the ids of every cached section.
    ///
    /// Tasks referencing an id outside this set are orphans.
    #[must_use]
    pub fn known_ids(&self) -> HashSet<SectionId> {
        self.items().iter().map(Section::id).collect()
    }
}
