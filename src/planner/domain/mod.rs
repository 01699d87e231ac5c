//! Domain model for sections and tasks.
//!
//! Rows are owned by one user and carry server-assigned ids and
//! timestamps. Drafts and patches are the caller-supplied halves of inserts
//! and updates.

mod color;
mod error;
mod ids;
mod section;
mod tags;
mod task;
mod time_of_day;

pub use color::{NEUTRAL_HEX, SectionColor};
pub use error::{ParseValueError, PlannerDomainError};
pub use ids::{SectionId, TaskId};
pub use section::{NewSection, Section, SectionPatch, SectionRecord};
pub use tags::TaskTags;
pub use task::{NewTask, Task, TaskPatch, TaskPriority, TaskRecord, TaskStatus};
pub use time_of_day::parse_time_of_day;
