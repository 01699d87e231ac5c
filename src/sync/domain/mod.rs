//! Entity abstraction, change events and published cache state.

mod change;
mod entity;
mod snapshot;

pub use change::{ChangeDecodeError, ChangeKind, ChangePayload, RowChange};
pub use entity::{CanonicalOrder, Entity};
pub use snapshot::CacheSnapshot;
