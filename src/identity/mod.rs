//! Ambient identity of the signed-in user.
//!
//! The authentication flow itself lives with the hosted auth provider. This
//! module only models the piece the caches depend on: an optional
//! [`UserId`] and a notification whenever it changes.

mod memory;
mod source;
mod user;

pub use memory::InMemoryIdentity;
pub use source::IdentitySource;
pub use user::UserId;
