//! Port contracts specific to planner tables.
//!
//! Sections use the generic [`RemoteTable`](crate::sync::ports::RemoteTable)
//! contract as is; tasks add a bulk delete.

pub mod task_table;

pub use task_table::TaskTable;
