//! Trait implemented by every synchronized row type.

use crate::identity::UserId;
use chrono::{DateTime, Utc};
use std::fmt;
use std::hash::Hash;

/// Fixed display order a cache must preserve for its entity type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CanonicalOrder {
    /// Creation time ascending.
    OldestFirst,
    /// Creation time descending.
    NewestFirst,
}

/// A row of a remote table owned by exactly one user.
///
/// `Draft` carries the caller-supplied fields for an insert and `Patch` the
/// partial field set for an update. The server assigns the id and the
/// timestamps; the cache never fabricates them.
pub trait Entity: Clone + fmt::Debug + PartialEq + Send + Sync + 'static {
    /// Server-assigned identifier.
    type Id: Copy + Eq + Ord + Hash + fmt::Debug + fmt::Display + Send + Sync + 'static;
    /// Insert payload.
    type Draft: Clone + fmt::Debug + Send + Sync + 'static;
    /// Partial update payload.
    type Patch: Clone + fmt::Debug + Send + Sync + 'static;

    /// Remote table name, used for logging and error reporting.
    const TABLE: &'static str;
    /// Order in which cached rows are projected.
    const ORDER: CanonicalOrder;

    /// Returns the row identifier.
    fn id(&self) -> Self::Id;

    /// Returns the owning user.
    fn owner(&self) -> UserId;

    /// Returns the server-assigned creation timestamp.
    fn created_at(&self) -> DateTime<Utc>;

    /// Returns the last update timestamp, for rows that carry one.
    ///
    /// When both the cached row and an incoming replacement report a
    /// timestamp, the cache keeps the newer of the two.
    fn updated_at(&self) -> Option<DateTime<Utc>> {
        None
    }
}
