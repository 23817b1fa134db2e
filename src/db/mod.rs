// Trailhead
// Copyright 2025 The Trailhead Authors
//
// Licensed under the Apache License, Version 2.0 (the "License"); you may not
// use this file except in compliance with the License.  You may obtain a copy
// of the License at:
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS, WITHOUT
// WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.  See the
// License for the specific language governing permissions and limitations
// under the License.

//! Persistence layer.
//!
//! The facilities in this module provide an abstraction over the PostgreSQL
//! database used in production and the SQLite database used by tests.  Each
//! table group has a sibling module with free functions that take an
//! `Executor` and issue backend-specific queries.

use crate::model::ModelError;
use async_trait::async_trait;

pub(crate) mod members;
pub(crate) mod postgres;
pub(crate) mod reviews;
pub(crate) mod sqlite;
pub(crate) mod teams;
pub(crate) mod terrain_types;
pub(crate) mod trails;
pub(crate) mod users;

/// Database errors.  Any unexpected errors that come from the database are classified as
/// `BackendError`, but errors we know about have more specific types.
#[derive(Debug, thiserror::Error, PartialEq)]
pub(crate) enum DbError {
    /// Indicates that a request to create an entry failed because it already exists.
    #[error("Already exists")]
    AlreadyExists,

    /// Catch-all error type for unexpected database errors.
    #[error("Database error: {0}")]
    BackendError(String),

    /// Indicates a failure processing the data that already exists in the database.
    #[error("Data integrity error: {0}")]
    DataIntegrityError(String),

    /// Indicates that a requested entry does not exist.
    #[error("Entity not found")]
    NotFound,

    /// Indicates that the database is not available (maybe because of too many active concurrent
    /// connections).
    #[error("Unavailable")]
    Unavailable,
}

impl From<ModelError> for DbError {
    fn from(e: ModelError) -> Self {
        DbError::DataIntegrityError(e.to_string())
    }
}

/// Result type for this module.
pub(crate) type DbResult<T> = Result<T, DbError>;

/// A database executor that can talk to multiple database implementations.
///
/// Note that this can wrap an executor that talks directly to a pool or to an open transaction.
pub(crate) enum Executor {
    /// A PostgreSQL executor.
    Postgres(postgres::PostgresExecutor),

    /// A SQLite executor.
    Sqlite(sqlite::SqliteExecutor),
}

/// A wrapper for a database executor backed by an open transaction.
pub(crate) struct TxExecutor(Executor);

impl TxExecutor {
    /// Returns the executor wrapped by this transaction.
    ///
    /// This would be better called `executor` but this method is used so frequently that it makes
    /// call sites too verbose.
    pub(crate) fn ex(&mut self) -> &mut Executor {
        &mut self.0
    }

    /// Commits the transaction.
    pub(crate) async fn commit(self) -> DbResult<()> {
        match self.0 {
            Executor::Postgres(e) => e.commit().await,
            Executor::Sqlite(e) => e.commit().await,
        }
    }
}

/// Abstraction over the database connection.
#[async_trait]
pub(crate) trait Db {
    /// Obtains an executor for direct access to the pool.
    ///
    /// This would be better called `executor` but this method is used so frequently that it makes
    /// call sites too verbose.
    async fn ex(&self) -> DbResult<Executor>;

    /// Begins a transaction.
    ///
    /// It is the responsibility of the caller to call `commit` on the returned executor.  Otherwise
    /// the transaction is rolled back on drop.
    async fn begin(&self) -> DbResult<TxExecutor>;

    /// Closes the connection pool, flushing any pending operations.
    async fn close(&self);
}

/// Initializes the database schema.
pub(crate) async fn init_schema(ex: &mut Executor) -> DbResult<()> {
    match ex {
        Executor::Postgres(ex) => postgres::run_schema(ex, include_str!("postgres.sql")).await,
        Executor::Sqlite(ex) => sqlite::run_schema(ex, include_str!("sqlite.sql")).await,
    }
}

/// Test utilities for the persistence layer.
#[cfg(test)]
pub(crate) mod testutils {
    use super::*;
    use std::sync::Arc;

    /// Initializes an in-memory test database with the service schema applied.
    pub(crate) async fn setup() -> Arc<dyn Db + Send + Sync> {
        let _can_fail = env_logger::builder().is_test(true).try_init();
        let db = Arc::from(sqlite::connect(":memory:").await.unwrap());
        init_schema(&mut db.ex().await.unwrap()).await.unwrap();
        db
    }
}

#[cfg(test)]
mod tests {
    use super::testutils::*;
    use super::*;
    use sqlx::Row;

    /// Runs a `query` on `ex` and does not care about its results.
    async fn exec(ex: &mut Executor, query: &str) {
        match ex {
            Executor::Postgres(ex) => {
                sqlx::query(query).execute(ex.conn()).await.unwrap();
            }
            Executor::Sqlite(ex) => {
                sqlx::query(query).execute(ex.conn()).await.unwrap();
            }
        }
    }

    /// Runs a `query` on `ex` that fetches a single row with an `i64` value on `column` and
    /// returns that value.
    async fn query_i64(ex: &mut Executor, column: &str, query: &str) -> i64 {
        match ex {
            Executor::Postgres(ex) => {
                let row = sqlx::query(query).fetch_one(ex.conn()).await.unwrap();
                row.try_get(column).unwrap()
            }
            Executor::Sqlite(ex) => {
                let row = sqlx::query(query).fetch_one(ex.conn()).await.unwrap();
                row.try_get(column).unwrap()
            }
        }
    }

    #[tokio::test]
    async fn test_direct_execution() {
        let db = setup().await;
        exec(&mut db.ex().await.unwrap(), "CREATE TABLE test (i INTEGER)").await;
        exec(&mut db.ex().await.unwrap(), "INSERT INTO test (i) VALUES (3)").await;
        assert_eq!(
            1,
            query_i64(
                &mut db.ex().await.unwrap(),
                "count",
                "SELECT COUNT(*) AS count FROM test"
            )
            .await
        );
    }

    #[tokio::test]
    async fn test_tx_commit() {
        let db = setup().await;
        exec(&mut db.ex().await.unwrap(), "CREATE TABLE test (i INTEGER)").await;

        let mut tx = db.begin().await.unwrap();
        exec(tx.ex(), "INSERT INTO test (i) VALUES (3)").await;
        tx.commit().await.unwrap();

        assert_eq!(
            1,
            query_i64(
                &mut db.ex().await.unwrap(),
                "count",
                "SELECT COUNT(*) AS count FROM test"
            )
            .await
        );
    }

    #[tokio::test]
    async fn test_tx_rollback_on_drop() {
        let db = setup().await;
        exec(&mut db.ex().await.unwrap(), "CREATE TABLE test (i INTEGER)").await;

        {
            let mut tx = db.begin().await.unwrap();
            exec(tx.ex(), "INSERT INTO test (i) VALUES (3)").await;
        }

        assert_eq!(
            0,
            query_i64(
                &mut db.ex().await.unwrap(),
                "count",
                "SELECT COUNT(*) AS count FROM test"
            )
            .await
        );
    }
}
