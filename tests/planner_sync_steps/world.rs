//! Shared world state for planner synchronization BDD scenarios.

use chrono::NaiveDate;
use daybook::planner::adapters::memory::{InMemorySectionTable, InMemoryTaskTable};
use daybook::planner::domain::{SectionId, Task, TaskId};
use daybook::planner::services::Workspace;
use daybook::sync::services::SyncError;
use eyre::eyre;
use mockable::DefaultClock;
use rstest::fixture;
use std::collections::HashMap;
use std::sync::Arc;

/// Workspace type used by the BDD world.
pub type TestWorkspace =
    Workspace<InMemorySectionTable<DefaultClock>, InMemoryTaskTable<DefaultClock>>;

/// Scenario world for planner behaviour tests.
pub struct PlannerWorld {
    pub workspace: TestWorkspace,
    pub sections: HashMap<String, SectionId>,
    pub tasks: HashMap<String, TaskId>,
    pub filtered: Vec<Task>,
    pub last_error: Option<SyncError>,
}

impl PlannerWorld {
    /// Creates a world over an empty in-memory backend.
    #[must_use]
    pub fn new() -> Self {
        let clock = Arc::new(DefaultClock);
        let workspace = Workspace::new(
            Arc::new(InMemorySectionTable::new(Arc::clone(&clock))),
            Arc::new(InMemoryTaskTable::new(clock)),
        );
        Self {
            workspace,
            sections: HashMap::new(),
            tasks: HashMap::new(),
            filtered: Vec::new(),
            last_error: None,
        }
    }

    /// Looks up a section created earlier in the scenario.
    pub fn section_id(&self, name: &str) -> eyre::Result<SectionId> {
        self.sections
            .get(name)
            .copied()
            .ok_or_else(|| eyre!("no section named '{name}' in scenario world"))
    }

    /// Looks up a task created earlier in the scenario.
    pub fn task_id(&self, title: &str) -> eyre::Result<TaskId> {
        self.tasks
            .get(title)
            .copied()
            .ok_or_else(|| eyre!("no task titled '{title}' in scenario world"))
    }
}

impl Default for PlannerWorld {
    fn default() -> Self {
        Self::new()
    }
}

/// Fixture that creates a new scenario world.
#[fixture]
pub fn world() -> PlannerWorld {
    let _subscriber = tracing_subscriber::fmt().with_test_writer().try_init();
    PlannerWorld::default()
}

/// Parses an ISO calendar date from a step argument.
pub fn parse_date(raw: &str) -> eyre::Result<NaiveDate> {
    NaiveDate::parse_from_str(raw, "%Y-%m-%d").map_err(|err| eyre!("bad date '{raw}': {err}"))
}

/// Runs an async operation within sync step definitions.
pub fn run_async<T>(future: impl std::future::Future<Output = T>) -> T {
    tokio::task::block_in_place(|| tokio::runtime::Handle::current().block_on(future))
}
