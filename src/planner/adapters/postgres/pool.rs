//! Connection pool construction.

use crate::config::BackendConfig;
use crate::sync::ports::{RemoteError, RemoteResult};
use diesel::pg::PgConnection;
use diesel::r2d2::{ConnectionManager, Pool};
use tracing::info;

/// `PostgreSQL` connection pool shared by the planner tables.
pub type PlannerPgPool = Pool<ConnectionManager<PgConnection>>;

/// Builds a connection pool from `config`.
///
/// # Errors
///
/// Returns [`RemoteError::Unavailable`] when the initial connections cannot
/// be established.
pub fn connect(config: &BackendConfig) -> RemoteResult<PlannerPgPool> {
    let manager = ConnectionManager::<PgConnection>::new(config.database_url());
    let pool = Pool::builder()
        .max_size(config.max_connections())
        .build(manager)
        .map_err(|err| RemoteError::Unavailable(err.to_string()))?;
    info!(max_connections = config.max_connections(), "planner pool ready");
    Ok(pool)
}
