//! Daybook: client-side synchronization core for a personal planner.
//!
//! Users group tasks into colored sections, filter each section by status
//! and review their day on an hourly calendar. Persistence, sign-in and
//! change notification belong to a hosted data service; this crate keeps
//! a per-user cache of each collection in step with it.
//!
//! # Architecture
//!
//! Daybook follows hexagonal architecture principles:
//!
//! - **Domain**: Pure business logic with no infrastructure dependencies
//! - **Ports**: Abstract trait interfaces for external interactions
//! - **Adapters**: Concrete implementations of ports (database, in-memory)
//!
//! # Modules
//!
//! - [`sync`]: Generic synchronized collections and their remote contract
//! - [`planner`]: Sections, tasks, the shared workspace and calendar views
//! - [`identity`]: Signed-in user and its change notifications
//! - [`config`]: Backend connection settings

pub mod config;
pub mod identity;
pub mod planner;
pub mod sync;
