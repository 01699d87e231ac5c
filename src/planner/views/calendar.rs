//! Hourly projection of one day's tasks.

use super::filter::is_orphan;
use crate::planner::domain::{Section, SectionId, Task, TaskId};
use chrono::{Days, NaiveDate};
use mockable::Clock;
use std::collections::{HashMap, HashSet};

const HOURS_PER_DAY: u32 = 24;

/// Task placed in an hour slot, with its section's display data.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AgendaEntry {
    /// The scheduled task.
    pub task: Task,
    /// Name of the task's section.
    pub section_name: String,
    /// Display hex color of the task's section.
    pub color_hex: &'static str,
}

/// Tasks scheduled within one hour of the day.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HourSlot {
    hour: u32,
    entries: Vec<AgendaEntry>,
}

impl HourSlot {
    /// Returns the hour, `0..24`.
    #[must_use]
    pub const fn hour(&self) -> u32 {
        self.hour
    }

    /// Returns the `HH:00` label.
    #[must_use]
    pub fn label(&self) -> String {
        format!("{:02}:00", self.hour)
    }

    /// Returns the entries in source order.
    #[must_use]
    pub fn entries(&self) -> &[AgendaEntry] {
        &self.entries
    }

    /// Returns whether nothing is scheduled in this hour.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// One day's tasks bucketed by hour.
///
/// Only tasks whose section resolves appear in the grid. Tasks for the day
/// with no section, or with a section that no longer exists, are reported
/// as orphans instead. Tasks without a time of day count towards the day
/// but sit in no slot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DayAgenda {
    date: NaiveDate,
    slots: Vec<HourSlot>,
    orphans: Vec<TaskId>,
    scheduled_count: usize,
}

impl DayAgenda {
    /// Projects `tasks` onto `date`.
    ///
    /// Dates compare as plain calendar dates with no time-zone conversion.
    #[must_use]
    pub fn project(tasks: &[Task], sections: &[Section], date: NaiveDate) -> Self {
        let by_id: HashMap<SectionId, &Section> =
            sections.iter().map(|section| (section.id(), section)).collect();
        let known: HashSet<SectionId> = by_id.keys().copied().collect();
        let mut slots: Vec<HourSlot> = (0..HOURS_PER_DAY)
            .map(|hour| HourSlot {
                hour,
                entries: Vec::new(),
            })
            .collect();
        let mut orphans = Vec::new();
        let mut scheduled_count = 0;

        for task in tasks.iter().filter(|task| task.is_on(date)) {
            if is_orphan(task, &known) {
                orphans.push(task.id());
                continue;
            }
            scheduled_count += 1;
            let resolved = task.section_id().and_then(|id| by_id.get(&id));
            let (Some(section), Some(hour)) = (resolved, task.hour()) else {
                continue;
            };
            let target = usize::try_from(hour)
                .ok()
                .and_then(|index| slots.get_mut(index));
            if let Some(slot) = target {
                slot.entries.push(AgendaEntry {
                    task: task.clone(),
                    section_name: section.name().to_owned(),
                    color_hex: section.display_hex(),
                });
            }
        }

        Self {
            date,
            slots,
            orphans,
            scheduled_count,
        }
    }

    /// Returns the projected date.
    #[must_use]
    pub const fn date(&self) -> NaiveDate {
        self.date
    }

    /// Returns all 24 slots from midnight.
    #[must_use]
    pub fn slots(&self) -> &[HourSlot] {
        &self.slots
    }

    /// Returns the slot for `hour`, if in range.
    #[must_use]
    pub fn slot(&self, hour: u32) -> Option<&HourSlot> {
        usize::try_from(hour).ok().and_then(|index| self.slots.get(index))
    }

    /// Returns the ids of the day's orphan tasks.
    #[must_use]
    pub fn orphan_ids(&self) -> &[TaskId] {
        &self.orphans
    }

    /// Returns how many of the day's tasks are orphans.
    #[must_use]
    pub fn orphan_count(&self) -> usize {
        self.orphans.len()
    }

    /// Returns how many of the day's tasks belong to a known section.
    #[must_use]
    pub const fn scheduled_count(&self) -> usize {
        self.scheduled_count
    }
}

/// Date shown by the calendar, with day-by-day navigation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DayCursor {
    date: NaiveDate,
}

impl DayCursor {
    /// Starts at today's local date.
    #[must_use]
    pub fn today(clock: &impl Clock) -> Self {
        Self {
            date: clock.local().date_naive(),
        }
    }

    /// Starts at `date`.
    #[must_use]
    pub const fn on(date: NaiveDate) -> Self {
        Self { date }
    }

    /// Returns the current date.
    #[must_use]
    pub const fn date(self) -> NaiveDate {
        self.date
    }

    /// Moves one day back. The earliest representable date stays put.
    #[must_use]
    pub fn previous(self) -> Self {
        Self {
            date: self.date.checked_sub_days(Days::new(1)).unwrap_or(self.date),
        }
    }

    /// Moves one day forward. The latest representable date stays put.
    #[must_use]
    pub fn next(self) -> Self {
        Self {
            date: self.date.checked_add_days(Days::new(1)).unwrap_or(self.date),
        }
    }

    /// Returns whether the cursor is on today's local date.
    #[must_use]
    pub fn is_today(self, clock: &impl Clock) -> bool {
        self.date == clock.local().date_naive()
    }
}
