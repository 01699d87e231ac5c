//! Step definitions for planner synchronization scenarios.

pub mod then;
pub mod world;
