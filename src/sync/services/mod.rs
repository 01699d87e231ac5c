//! Cache and store services for synchronized collections.

mod cache;
mod error;
mod store;

pub use cache::{ChangeOutcome, EntityCache};
pub use error::{SyncError, SyncResult};
pub use store::SyncStore;
