//! Owner-filtered push channel carrying row changes.

use crate::sync::domain::{Entity, RowChange};
use tokio::sync::mpsc;

/// Creates a connected sink and stream pair.
#[must_use]
pub fn change_channel<E: Entity>() -> (ChangeSink<E>, ChangeStream<E>) {
    let (sender, receiver) = mpsc::unbounded_channel();
    (ChangeSink { sender }, ChangeStream { receiver })
}

/// Receiving end of a push subscription.
///
/// Dropping or [closing](Self::close) the stream unsubscribes; the remote
/// side notices through [`ChangeSink::is_closed`] and stops delivering.
#[derive(Debug)]
pub struct ChangeStream<E: Entity> {
    receiver: mpsc::UnboundedReceiver<RowChange<E>>,
}

impl<E: Entity> ChangeStream<E> {
    /// Waits for the next change.
    ///
    /// Returns `None` once the remote side has gone away and every buffered
    /// change has been received.
    pub async fn next(&mut self) -> Option<RowChange<E>> {
        self.receiver.recv().await
    }

    /// Returns a buffered change without waiting.
    pub fn try_next(&mut self) -> Option<RowChange<E>> {
        self.receiver.try_recv().ok()
    }

    /// Stops accepting further changes. Buffered changes remain readable.
    pub fn close(&mut self) {
        self.receiver.close();
    }
}

/// Sending end of a push subscription, held by remote adapters.
#[derive(Debug, Clone)]
pub struct ChangeSink<E: Entity> {
    sender: mpsc::UnboundedSender<RowChange<E>>,
}

impl<E: Entity> ChangeSink<E> {
    /// Delivers a change. Returns `false` when the subscriber has gone away.
    pub fn send(&self, change: RowChange<E>) -> bool {
        self.sender.send(change).is_ok()
    }

    /// Returns whether the subscriber has unsubscribed.
    #[must_use]
    pub fn is_closed(&self) -> bool {
        self.sender.is_closed()
    }
}
