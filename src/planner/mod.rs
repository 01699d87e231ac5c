//! Sections, tasks and the views derived from them.
//!
//! Users group tasks into colored sections, filter each section by status
//! and review a day on an hourly calendar. The module follows hexagonal
//! architecture:
//!
//! - Domain types in [`domain`]
//! - Port contracts in [`ports`]
//! - Adapter implementations in [`adapters`]
//! - Stores and the shared workspace in [`services`]
//! - Pure projections in [`views`]

pub mod adapters;
pub mod domain;
pub mod ports;
pub mod services;
pub mod views;
