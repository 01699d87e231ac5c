//! Errors surfaced by sync store operations.

use crate::sync::ports::RemoteError;
use thiserror::Error;

/// Service-level errors for sync store operations.
#[derive(Debug, Clone, Error)]
pub enum SyncError {
    /// A mutation was attempted without a signed-in user.
    #[error("no signed-in user")]
    SignedOut,

    /// The remote call failed; the cache was left unchanged.
    #[error(transparent)]
    Remote(#[from] RemoteError),
}

/// Result type for sync store operations.
pub type SyncResult<T> = Result<T, SyncError>;
