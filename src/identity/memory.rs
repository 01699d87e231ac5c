//! In-process identity holder.

use super::{IdentitySource, UserId};
use std::sync::Arc;
use tokio::sync::watch;
use tracing::info;

/// Identity source driven explicitly by sign-in and sign-out calls.
///
/// Cloned handles share the same state, so one handle can be given to the
/// auth layer while another feeds a workspace.
#[derive(Debug, Clone)]
pub struct InMemoryIdentity {
    sender: Arc<watch::Sender<Option<UserId>>>,
}

impl InMemoryIdentity {
    /// Creates a signed-out identity.
    #[must_use]
    pub fn new() -> Self {
        let (sender, _) = watch::channel(None);
        Self {
            sender: Arc::new(sender),
        }
    }

    /// Creates an identity that starts signed in as `user`.
    #[must_use]
    pub fn signed_in(user: UserId) -> Self {
        let identity = Self::new();
        identity.sign_in(user);
        identity
    }

    /// Marks `user` as the signed-in user.
    ///
    /// Watchers are only notified when the value actually changes.
    pub fn sign_in(&self, user: UserId) {
        let changed = self.sender.send_if_modified(|current| {
            if *current == Some(user) {
                return false;
            }
            *current = Some(user);
            true
        });
        if changed {
            info!(user_id = %user, "identity signed in");
        }
    }

    /// Clears the signed-in user.
    pub fn sign_out(&self) {
        let changed = self.sender.send_if_modified(|current| current.take().is_some());
        if changed {
            info!("identity signed out");
        }
    }
}

impl Default for InMemoryIdentity {
    fn default() -> Self {
        Self::new()
    }
}

impl IdentitySource for InMemoryIdentity {
    fn current(&self) -> Option<UserId> {
        *self.sender.borrow()
    }

    fn watch(&self) -> watch::Receiver<Option<UserId>> {
        self.sender.subscribe()
    }
}
