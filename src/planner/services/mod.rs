//! Planner stores and the shared workspace.

mod sections;
mod tasks;
mod workspace;

pub use sections::SectionStore;
pub use tasks::TaskStore;
pub use workspace::{IdentityFollower, Workspace};
