//! Building blocks shared by remote table adapters.

mod feed;
mod memory;

pub use feed::ChangeFeed;
pub use memory::{InMemoryTable, MemoryRow, TableOperation};
