//! Adapter implementations for planner tables.

pub mod memory;
pub mod postgres;
