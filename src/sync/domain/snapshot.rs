//! Published cache state observed by views.

use super::Entity;
use crate::identity::UserId;

/// Point-in-time view of a synchronized collection.
#[derive(Debug, Clone, PartialEq)]
pub struct CacheSnapshot<E: Entity> {
    /// Cached rows in canonical order.
    pub items: Vec<E>,
    /// Whether a full load is in flight.
    pub loading: bool,
    /// Message of the last failed load, cleared when a new load starts.
    pub error: Option<String>,
    /// User the collection is bound to.
    pub owner: Option<UserId>,
    /// Push events handled since the store was bound, ignored ones included.
    pub change_count: u64,
}

impl<E: Entity> CacheSnapshot<E> {
    /// Returns the cached row with the given id.
    #[must_use]
    pub fn get(&self, id: E::Id) -> Option<&E> {
        self.items.iter().find(|item| item.id() == id)
    }

    /// Returns whether the collection has no cached rows.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

impl<E: Entity> Default for CacheSnapshot<E> {
    fn default() -> Self {
        Self {
            items: Vec::new(),
            loading: false,
            error: None,
            owner: None,
            change_count: 0,
        }
    }
}
