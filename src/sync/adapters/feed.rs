//! Owner-filtered fan-out of row changes to push subscribers.

use crate::identity::UserId;
use crate::sync::domain::{Entity, RowChange};
use crate::sync::ports::{ChangeSink, ChangeStream, change_channel};
use std::sync::{Mutex, PoisonError};
use tracing::debug;

/// Registry of open subscriptions for one table.
///
/// Adapters publish every committed write; only subscribers registered for
/// the row's owner receive it. Closed subscriptions are pruned lazily on
/// the next publish.
#[derive(Debug)]
pub struct ChangeFeed<E: Entity> {
    subscribers: Mutex<Vec<(UserId, ChangeSink<E>)>>,
}

impl<E: Entity> ChangeFeed<E> {
    /// Creates a feed with no subscribers.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            subscribers: Mutex::new(Vec::new()),
        }
    }

    /// Registers a subscription for rows owned by `owner`.
    pub fn subscribe(&self, owner: UserId) -> ChangeStream<E> {
        let (sink, stream) = change_channel();
        let mut subscribers = self
            .subscribers
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        subscribers.push((owner, sink));
        debug!(table = E::TABLE, owner = %owner, "push subscription opened");
        stream
    }

    /// Delivers `change` to every live subscriber of `owner`.
    pub fn publish(&self, owner: UserId, change: &RowChange<E>) {
        let mut subscribers = self
            .subscribers
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        subscribers.retain(|(subscriber, sink)| {
            if *subscriber != owner {
                return !sink.is_closed();
            }
            sink.send(change.clone())
        });
    }

    /// Returns the number of live subscriptions for `owner`.
    #[must_use]
    pub fn subscriber_count(&self, owner: UserId) -> usize {
        let subscribers = self
            .subscribers
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        subscribers
            .iter()
            .filter(|(subscriber, sink)| *subscriber == owner && !sink.is_closed())
            .count()
    }
}

impl<E: Entity> Default for ChangeFeed<E> {
    fn default() -> Self {
        Self::new()
    }
}
