//! Port for the ambient identity collaborator.

use super::UserId;
use tokio::sync::watch;

/// Supplies the signed-in user and notifies when sign-in state changes.
///
/// `None` means signed out. Consumers must do nothing for a signed-out
/// identity and reset their state whenever the value changes.
pub trait IdentitySource: Send + Sync {
    /// Returns the currently signed-in user, if any.
    fn current(&self) -> Option<UserId>;

    /// Returns a receiver that observes every sign-in state change.
    fn watch(&self) -> watch::Receiver<Option<UserId>>;
}
