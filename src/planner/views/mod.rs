//! Pure projections over cache snapshots.

mod calendar;
mod filter;

pub use calendar::{AgendaEntry, DayAgenda, DayCursor, HourSlot};
pub use filter::{
    SectionViewState, StatusCounts, StatusFilter, filter_tasks, is_orphan, status_counts,
    unsectioned_tasks,
};
