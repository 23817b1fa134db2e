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

//! Common utilities to interact with an SQLite database.

use crate::db::{Db, DbError, DbResult, Executor, TxExecutor};
use async_trait::async_trait;
use log::warn;
use sqlx::pool::PoolConnection;
use sqlx::sqlite::{Sqlite, SqliteConnection, SqlitePoolOptions};
use sqlx::{SqlitePool, Transaction};
use time::OffsetDateTime;

/// Takes a raw SQLx error `e` and converts it to our generic error type.
pub(crate) fn map_sqlx_error(e: sqlx::Error) -> DbError {
    match e {
        sqlx::Error::ColumnDecode { source, .. } => DbError::DataIntegrityError(source.to_string()),
        sqlx::Error::RowNotFound => DbError::NotFound,
        e if e.to_string().contains("FOREIGN KEY constraint failed") => DbError::NotFound,
        e if e.to_string().contains("UNIQUE constraint failed") => DbError::AlreadyExists,
        e => DbError::BackendError(e.to_string()),
    }
}

/// Creates a new connection pool against `conn_str`.
///
/// In-memory databases are restricted to a single connection: every SQLite connection to
/// `:memory:` opens a distinct database, and the tests need to see a consistent one.
pub(crate) async fn connect(conn_str: &str) -> DbResult<SqliteDb> {
    let mut options = SqlitePoolOptions::new();
    if conn_str.contains(":memory:") {
        options = options.max_connections(1).idle_timeout(None).max_lifetime(None);
    }
    let pool = options.connect(conn_str).await.map_err(map_sqlx_error)?;
    Ok(SqliteDb { pool })
}

/// A generic database executor implementation for SQLite.
#[derive(Debug)]
pub(crate) enum SqliteExecutor {
    /// An executor backed by a pool.  Operations issued via this executor aren't guaranteed to
    /// happen on the same connection.
    PoolExec(PoolConnection<Sqlite>),

    /// An executor backed by a transaction.
    TxExec(Transaction<'static, Sqlite>),
}

impl SqliteExecutor {
    /// Returns the raw connection backing this executor for use in `sqlx` operations.
    pub(crate) fn conn(&mut self) -> &mut SqliteConnection {
        match self {
            SqliteExecutor::PoolExec(conn) => &mut **conn,
            SqliteExecutor::TxExec(tx) => &mut **tx,
        }
    }

    /// Commits the transaction if this executor is backed by one.
    ///
    /// Calling this on a non-transaction-based executor results in a panic.
    pub(super) async fn commit(self) -> DbResult<()> {
        match self {
            SqliteExecutor::PoolExec(_) => unreachable!("Do not call commit on direct executors"),
            SqliteExecutor::TxExec(tx) => tx.commit().await.map_err(map_sqlx_error),
        }
    }
}

/// A database instance backed by a SQLite database.
pub(crate) struct SqliteDb {
    /// Shared SQLite connection pool.  This is a cloneable type that all concurrent
    /// transactions can use concurrently.
    pool: SqlitePool,
}

impl Drop for SqliteDb {
    fn drop(&mut self) {
        if !self.pool.is_closed() {
            warn!("Dropping connection without having called close() first");
        }
    }
}

#[async_trait]
impl Db for SqliteDb {
    async fn ex(&self) -> DbResult<Executor> {
        let conn = self.pool.acquire().await.map_err(map_sqlx_error)?;
        Ok(Executor::Sqlite(SqliteExecutor::PoolExec(conn)))
    }

    async fn begin(&self) -> DbResult<TxExecutor> {
        let tx = self.pool.begin().await.map_err(map_sqlx_error)?;
        Ok(TxExecutor(Executor::Sqlite(SqliteExecutor::TxExec(tx))))
    }

    async fn close(&self) {
        self.pool.close().await;
    }
}

/// Helper function to initialize the database with a schema.
pub(crate) async fn run_schema(ex: &mut SqliteExecutor, schema: &str) -> DbResult<()> {
    sqlx::raw_sql(schema).execute(ex.conn()).await.map_err(map_sqlx_error)?;
    Ok(())
}

/// Converts a timestamp as extracted from the database into an `OffsetDateTime`.
///
/// SQLite does not have a native timestamp type, so we store timestamps as the number of
/// microseconds since the Unix epoch.  The clock truncates to microseconds too, so no precision
/// is lost on a round trip.
pub(crate) fn build_timestamp(timestamp_us: i64) -> DbResult<OffsetDateTime> {
    if timestamp_us < 0 {
        return Err(DbError::DataIntegrityError(format!(
            "Timestamp cannot be negative: us={}",
            timestamp_us
        )));
    }

    match OffsetDateTime::from_unix_timestamp_nanos(i128::from(timestamp_us) * 1000) {
        Ok(timestamp) => Ok(timestamp),
        Err(e) => Err(DbError::DataIntegrityError(format!("Invalid timestamp: {}", e))),
    }
}

/// Converts a timestamp into the microseconds quantity stored in the database.
///
/// The timestamp must be positive because `build_timestamp` also expects it to be positive when
/// recovering its value from the database.
pub(crate) fn unpack_timestamp(ts: OffsetDateTime) -> i64 {
    let nanos = ts.unix_timestamp_nanos();
    assert!(nanos >= 0, "Cannot store a negative timestamp into the database");
    assert!(nanos % 1000 == 0, "Timestamps must have microsecond precision");
    i64::try_from(nanos / 1000).expect("Must have fit")
}


#[cfg(test)]
mod tests {
    use super::testutils::*;
    use super::*;

    #[tokio::test]
    async fn test_schema_multiple_statements() {
        let db = setup().await;
        let mut ex = db.ex().await.unwrap();
        match &mut ex {
            Executor::Sqlite(ex) => {
                run_schema(ex, "CREATE TABLE a (i INTEGER); CREATE TABLE b (j INTEGER);")
                    .await
                    .unwrap();
                sqlx::query("INSERT INTO a (i) VALUES (1)").execute(ex.conn()).await.unwrap();
                sqlx::query("INSERT INTO b (j) VALUES (2)").execute(ex.conn()).await.unwrap();
            }
            _ => panic!("Unexpected executor type"),
        }
        drop(ex);
        db.close().await;
    }

    #[test]
    fn test_build_unpack_timestamp_zero() {
        let d = OffsetDateTime::from_unix_timestamp(0).unwrap();
        let us = unpack_timestamp(d);
        assert_eq!(0, us);
        assert_eq!(Ok(d), build_timestamp(us));
    }

    #[test]
    fn test_build_unpack_timestamp_us_precision() {
        let d = OffsetDateTime::from_unix_timestamp_nanos(1234567899876543000i128).unwrap();
        let us = unpack_timestamp(d);
        assert_eq!(1234567899876543i64, us);
        assert_eq!(Ok(d), build_timestamp(us));
    }

    #[test]
    fn test_build_timestamp_negative() {
        match build_timestamp(-1) {
            Err(DbError::DataIntegrityError(_)) => (),
            e => panic!("Must have failed with a DataIntegrityError but got: {:?}", e),
        }
    }
}
