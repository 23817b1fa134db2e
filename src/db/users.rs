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

//! Database operations for the `users` table.

use crate::db::{postgres, sqlite, DbError, DbResult, Executor};
use crate::model::{EmailAddress, HashedPassword, User, Username};
use sqlx::postgres::PgRow;
use sqlx::sqlite::SqliteRow;
use sqlx::Row;
use time::OffsetDateTime;

impl TryFrom<PgRow> for User {
    type Error = DbError;

    fn try_from(row: PgRow) -> DbResult<Self> {
        let id: i64 = row.try_get("id").map_err(postgres::map_sqlx_error)?;
        let username: String = row.try_get("username").map_err(postgres::map_sqlx_error)?;
        let email: String = row.try_get("email").map_err(postgres::map_sqlx_error)?;
        let password: String = row.try_get("password").map_err(postgres::map_sqlx_error)?;
        let is_active: bool = row.try_get("is_active").map_err(postgres::map_sqlx_error)?;
        let created_at: OffsetDateTime =
            row.try_get("created_at").map_err(postgres::map_sqlx_error)?;
        let updated_at: OffsetDateTime =
            row.try_get("updated_at").map_err(postgres::map_sqlx_error)?;

        Ok(User {
            id,
            username: Username::new(username)?,
            email: EmailAddress::new(email)?,
            password: HashedPassword::new(password),
            is_active,
            created_at,
            updated_at,
        })
    }
}

impl TryFrom<SqliteRow> for User {
    type Error = DbError;

    fn try_from(row: SqliteRow) -> DbResult<Self> {
        let id: i64 = row.try_get("id").map_err(sqlite::map_sqlx_error)?;
        let username: String = row.try_get("username").map_err(sqlite::map_sqlx_error)?;
        let email: String = row.try_get("email").map_err(sqlite::map_sqlx_error)?;
        let password: String = row.try_get("password").map_err(sqlite::map_sqlx_error)?;
        let is_active: bool = row.try_get("is_active").map_err(sqlite::map_sqlx_error)?;
        let created_at: i64 = row.try_get("created_at").map_err(sqlite::map_sqlx_error)?;
        let updated_at: i64 = row.try_get("updated_at").map_err(sqlite::map_sqlx_error)?;

        Ok(User {
            id,
            username: Username::new(username)?,
            email: EmailAddress::new(email)?,
            password: HashedPassword::new(password),
            is_active,
            created_at: sqlite::build_timestamp(created_at)?,
            updated_at: sqlite::build_timestamp(updated_at)?,
        })
    }
}

/// Creates a new active user with the given credentials.
pub(crate) async fn create_user(
    ex: &mut Executor,
    username: Username,
    email: EmailAddress,
    password: HashedPassword,
    now: OffsetDateTime,
) -> DbResult<User> {
    let id = match ex {
        Executor::Postgres(ex) => {
            let query_str = "
                INSERT INTO users (username, email, password, is_active, created_at, updated_at)
                VALUES ($1, $2, $3, TRUE, $4, $4)
                RETURNING id";
            let row = sqlx::query(query_str)
                .bind(username.as_str())
                .bind(email.as_str())
                .bind(password.as_str())
                .bind(now)
                .fetch_one(ex.conn())
                .await
                .map_err(postgres::map_sqlx_error)?;
            row.try_get("id").map_err(postgres::map_sqlx_error)?
        }

        Executor::Sqlite(ex) => {
            let query_str = "
                INSERT INTO users (username, email, password, is_active, created_at, updated_at)
                VALUES (?, ?, ?, 1, ?, ?)";
            let now_us = sqlite::unpack_timestamp(now);
            let done = sqlx::query(query_str)
                .bind(username.as_str())
                .bind(email.as_str())
                .bind(password.as_str())
                .bind(now_us)
                .bind(now_us)
                .execute(ex.conn())
                .await
                .map_err(sqlite::map_sqlx_error)?;
            done.last_insert_rowid()
        }
    };

    Ok(User {
        id,
        username,
        email,
        password,
        is_active: true,
        created_at: now,
        updated_at: now,
    })
}

/// Gets the user that registered with `email`, if any.
pub(crate) async fn get_user_by_email(ex: &mut Executor, email: &EmailAddress) -> DbResult<User> {
    match ex {
        Executor::Postgres(ex) => {
            let query_str = "SELECT * FROM users WHERE email = $1";
            let raw_user = sqlx::query(query_str)
                .bind(email.as_str())
                .fetch_one(ex.conn())
                .await
                .map_err(postgres::map_sqlx_error)?;
            User::try_from(raw_user)
        }

        Executor::Sqlite(ex) => {
            let query_str = "SELECT * FROM users WHERE email = ?";
            let raw_user = sqlx::query(query_str)
                .bind(email.as_str())
                .fetch_one(ex.conn())
                .await
                .map_err(sqlite::map_sqlx_error)?;
            User::try_from(raw_user)
        }
    }
}

/// Gets the user with the given `id`.
pub(crate) async fn get_user_by_id(ex: &mut Executor, id: i64) -> DbResult<User> {
    match ex {
        Executor::Postgres(ex) => {
            let query_str = "SELECT * FROM users WHERE id = $1";
            let raw_user = sqlx::query(query_str)
                .bind(id)
                .fetch_one(ex.conn())
                .await
                .map_err(postgres::map_sqlx_error)?;
            User::try_from(raw_user)
        }

        Executor::Sqlite(ex) => {
            let query_str = "SELECT * FROM users WHERE id = ?";
            let raw_user = sqlx::query(query_str)
                .bind(id)
                .fetch_one(ex.conn())
                .await
                .map_err(sqlite::map_sqlx_error)?;
            User::try_from(raw_user)
        }
    }
}

/// Replaces the password hash of the user with the given `id`.
pub(crate) async fn set_user_password(
    ex: &mut Executor,
    id: i64,
    password: &HashedPassword,
    now: OffsetDateTime,
) -> DbResult<()> {
    let rows_affected = match ex {
        Executor::Postgres(ex) => {
            let query_str = "UPDATE users SET password = $1, updated_at = $2 WHERE id = $3";
            let done = sqlx::query(query_str)
                .bind(password.as_str())
                .bind(now)
                .bind(id)
                .execute(ex.conn())
                .await
                .map_err(postgres::map_sqlx_error)?;
            done.rows_affected()
        }

        Executor::Sqlite(ex) => {
            let query_str = "UPDATE users SET password = ?, updated_at = ? WHERE id = ?";
            let done = sqlx::query(query_str)
                .bind(password.as_str())
                .bind(sqlite::unpack_timestamp(now))
                .bind(id)
                .execute(ex.conn())
                .await
                .map_err(sqlite::map_sqlx_error)?;
            done.rows_affected()
        }
    };

    match rows_affected {
        0 => Err(DbError::NotFound),
        1 => Ok(()),
        _ => Err(DbError::BackendError("Update affected more than one row".to_owned())),
    }
}
