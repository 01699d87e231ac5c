//! `PostgreSQL` adapters for planner tables.
//!
//! Diesel calls are synchronous, so every query runs on the blocking pool.
//! Writes made through a table are published to that table's
//! [`ChangeFeed`](crate::sync::adapters::ChangeFeed); subscribers see
//! changes from every store sharing the adapter, but not writes made by
//! other processes.

mod models;
mod pool;
mod schema;
mod section;
mod task;

pub use pool::{PlannerPgPool, connect};
pub use section::PostgresSectionTable;
pub use task::PostgresTaskTable;

use crate::sync::ports::{RemoteError, RemoteResult};
use diesel::PgConnection;
use diesel::result::{DatabaseErrorKind, Error as DieselError};

async fn run_blocking<F, T>(pool: &PlannerPgPool, f: F) -> RemoteResult<T>
where
    F: FnOnce(&mut PgConnection) -> RemoteResult<T> + Send + 'static,
    T: Send + 'static,
{
    let pooled = pool.clone();
    tokio::task::spawn_blocking(move || {
        let mut connection = pooled
            .get()
            .map_err(|err| RemoteError::Unavailable(err.to_string()))?;
        f(&mut connection)
    })
    .await
    .map_err(RemoteError::persistence)?
}

fn query_error(table: &'static str, err: DieselError) -> RemoteError {
    match err {
        DieselError::DatabaseError(
            DatabaseErrorKind::UniqueViolation
            | DatabaseErrorKind::ForeignKeyViolation
            | DatabaseErrorKind::CheckViolation
            | DatabaseErrorKind::NotNullViolation,
            ref info,
        ) => RemoteError::rejected(table, info.message()),
        DieselError::DatabaseError(DatabaseErrorKind::ClosedConnection, ref info) => {
            RemoteError::Unavailable(info.message().to_owned())
        }
        DieselError::DeserializationError(ref source) => RemoteError::Decode {
            table,
            message: source.to_string(),
        },
        other => RemoteError::persistence(other),
    }
}

fn decode_error(table: &'static str, err: impl std::fmt::Display) -> RemoteError {
    RemoteError::Decode {
        table,
        message: err.to_string(),
    }
}
