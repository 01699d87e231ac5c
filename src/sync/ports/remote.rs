//! Remote table port: CRUD and push subscription for one entity type.

use super::ChangeStream;
use crate::identity::UserId;
use crate::sync::domain::Entity;
use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;

/// Result type for remote table operations.
pub type RemoteResult<T> = Result<T, RemoteError>;

/// Hosted table contract consumed by sync stores.
#[async_trait]
pub trait RemoteTable<E: Entity>: Send + Sync {
    /// Returns every row owned by `owner` in the entity's canonical order.
    ///
    /// # Errors
    ///
    /// Returns [`RemoteError`] when the service cannot be reached or rejects
    /// the query.
    async fn select(&self, owner: UserId) -> RemoteResult<Vec<E>>;

    /// Inserts a single row owned by `owner` and returns it as stored,
    /// including the server-assigned id and timestamps.
    ///
    /// # Errors
    ///
    /// Returns [`RemoteError`] when the service rejects the insert.
    async fn insert(&self, owner: UserId, draft: E::Draft) -> RemoteResult<E>;

    /// Updates the row with the given id and returns it as stored.
    ///
    /// Returns `None` when no row matched.
    ///
    /// # Errors
    ///
    /// Returns [`RemoteError`] when the service rejects the update.
    async fn update(&self, id: E::Id, patch: E::Patch) -> RemoteResult<Option<E>>;

    /// Deletes the row with the given id. Deleting a missing row succeeds.
    ///
    /// # Errors
    ///
    /// Returns [`RemoteError`] when the service rejects the delete.
    async fn delete(&self, id: E::Id) -> RemoteResult<()>;

    /// Opens a push subscription for rows owned by `owner`.
    ///
    /// # Errors
    ///
    /// Returns [`RemoteError`] when the channel cannot be opened.
    async fn subscribe(&self, owner: UserId) -> RemoteResult<ChangeStream<E>>;
}

/// Errors returned by remote table adapters.
#[derive(Debug, Clone, Error)]
pub enum RemoteError {
    /// The service refused the request (permission or constraint failure).
    #[error("{table}: request rejected: {message}")]
    Rejected {
        /// Table the request targeted.
        table: &'static str,
        /// Service-provided reason.
        message: String,
    },

    /// The service could not be reached.
    #[error("remote service unavailable: {0}")]
    Unavailable(String),

    /// A returned row could not be decoded.
    #[error("{table}: undecodable row: {message}")]
    Decode {
        /// Table the row came from.
        table: &'static str,
        /// Decoder message.
        message: String,
    },

    /// Storage-layer failure.
    #[error("persistence error: {0}")]
    Persistence(Arc<dyn std::error::Error + Send + Sync>),
}

impl RemoteError {
    /// Wraps a persistence error.
    pub fn persistence(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Persistence(Arc::new(err))
    }

    /// Builds a rejection for `table`.
    pub fn rejected(table: &'static str, message: impl Into<String>) -> Self {
        Self::Rejected {
            table,
            message: message.into(),
        }
    }
}
