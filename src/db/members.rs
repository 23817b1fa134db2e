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

//! Database operations for the `members` table.

use crate::db::{postgres, sqlite, DbError, DbResult, Executor};
use crate::model::Member;
use sqlx::postgres::PgRow;
use sqlx::sqlite::SqliteRow;
use sqlx::Row;
use time::OffsetDateTime;

/// The mutable fields of a member profile, as received from the API.
#[derive(Clone)]
#[cfg_attr(test, derive(Debug, PartialEq))]
pub(crate) struct MemberData {
    /// Display name of the athlete.
    pub(crate) name: String,

    /// Resting heart rate in beats per minute, if measured.
    pub(crate) resting_hr: Option<i16>,

    /// Maximum heart rate in beats per minute, if measured.
    pub(crate) max_hr: Option<i16>,

    /// Free-form coaching notes.
    pub(crate) notes: Option<String>,
}

impl TryFrom<PgRow> for Member {
    type Error = DbError;

    fn try_from(row: PgRow) -> DbResult<Self> {
        let id: i64 = row.try_get("id").map_err(postgres::map_sqlx_error)?;
        let name: String = row.try_get("name").map_err(postgres::map_sqlx_error)?;
        let resting_hr: Option<i16> =
            row.try_get("resting_hr").map_err(postgres::map_sqlx_error)?;
        let max_hr: Option<i16> = row.try_get("max_hr").map_err(postgres::map_sqlx_error)?;
        let notes: Option<String> = row.try_get("notes").map_err(postgres::map_sqlx_error)?;
        let created_at: OffsetDateTime =
            row.try_get("created_at").map_err(postgres::map_sqlx_error)?;
        let updated_at: OffsetDateTime =
            row.try_get("updated_at").map_err(postgres::map_sqlx_error)?;

        Ok(Member { id, name, resting_hr, max_hr, notes, created_at, updated_at })
    }
}

impl TryFrom<SqliteRow> for Member {
    type Error = DbError;

    fn try_from(row: SqliteRow) -> DbResult<Self> {
        let id: i64 = row.try_get("id").map_err(sqlite::map_sqlx_error)?;
        let name: String = row.try_get("name").map_err(sqlite::map_sqlx_error)?;
        let resting_hr: Option<i16> = row.try_get("resting_hr").map_err(sqlite::map_sqlx_error)?;
        let max_hr: Option<i16> = row.try_get("max_hr").map_err(sqlite::map_sqlx_error)?;
        let notes: Option<String> = row.try_get("notes").map_err(sqlite::map_sqlx_error)?;
        let created_at: i64 = row.try_get("created_at").map_err(sqlite::map_sqlx_error)?;
        let updated_at: i64 = row.try_get("updated_at").map_err(sqlite::map_sqlx_error)?;

        Ok(Member {
            id,
            name,
            resting_hr,
            max_hr,
            notes,
            created_at: sqlite::build_timestamp(created_at)?,
            updated_at: sqlite::build_timestamp(updated_at)?,
        })
    }
}

/// Creates a new member profile.
pub(crate) async fn create_member(
    ex: &mut Executor,
    data: MemberData,
    now: OffsetDateTime,
) -> DbResult<Member> {
    let id = match ex {
        Executor::Postgres(ex) => {
            let query_str = "
                INSERT INTO members (name, resting_hr, max_hr, notes, created_at, updated_at)
                VALUES ($1, $2, $3, $4, $5, $5)
                RETURNING id";
            let row = sqlx::query(query_str)
                .bind(&data.name)
                .bind(data.resting_hr)
                .bind(data.max_hr)
                .bind(&data.notes)
                .bind(now)
                .fetch_one(ex.conn())
                .await
                .map_err(postgres::map_sqlx_error)?;
            row.try_get("id").map_err(postgres::map_sqlx_error)?
        }

        Executor::Sqlite(ex) => {
            let query_str = "
                INSERT INTO members (name, resting_hr, max_hr, notes, created_at, updated_at)
                VALUES (?, ?, ?, ?, ?, ?)";
            let now_us = sqlite::unpack_timestamp(now);
            let done = sqlx::query(query_str)
                .bind(&data.name)
                .bind(data.resting_hr)
                .bind(data.max_hr)
                .bind(&data.notes)
                .bind(now_us)
                .bind(now_us)
                .execute(ex.conn())
                .await
                .map_err(sqlite::map_sqlx_error)?;
            done.last_insert_rowid()
        }
    };

    Ok(Member {
        id,
        name: data.name,
        resting_hr: data.resting_hr,
        max_hr: data.max_hr,
        notes: data.notes,
        created_at: now,
        updated_at: now,
    })
}

/// Gets the member profile with the given `id`.
pub(crate) async fn get_member_by_id(ex: &mut Executor, id: i64) -> DbResult<Member> {
    match ex {
        Executor::Postgres(ex) => {
            let query_str = "SELECT * FROM members WHERE id = $1";
            let raw = sqlx::query(query_str)
                .bind(id)
                .fetch_one(ex.conn())
                .await
                .map_err(postgres::map_sqlx_error)?;
            Member::try_from(raw)
        }

        Executor::Sqlite(ex) => {
            let query_str = "SELECT * FROM members WHERE id = ?";
            let raw = sqlx::query(query_str)
                .bind(id)
                .fetch_one(ex.conn())
                .await
                .map_err(sqlite::map_sqlx_error)?;
            Member::try_from(raw)
        }
    }
}

/// Lists member profiles in insertion order, skipping `skip` rows and returning at most `limit`.
pub(crate) async fn list_members(
    ex: &mut Executor,
    skip: i64,
    limit: i64,
) -> DbResult<Vec<Member>> {
    let raw_members = match ex {
        Executor::Postgres(ex) => {
            let query_str = "SELECT * FROM members ORDER BY id LIMIT $1 OFFSET $2";
            sqlx::query(query_str)
                .bind(limit)
                .bind(skip)
                .fetch_all(ex.conn())
                .await
                .map_err(postgres::map_sqlx_error)?
                .into_iter()
                .map(Member::try_from)
                .collect::<DbResult<Vec<Member>>>()?
        }

        Executor::Sqlite(ex) => {
            let query_str = "SELECT * FROM members ORDER BY id LIMIT ? OFFSET ?";
            sqlx::query(query_str)
                .bind(limit)
                .bind(skip)
                .fetch_all(ex.conn())
                .await
                .map_err(sqlite::map_sqlx_error)?
                .into_iter()
                .map(Member::try_from)
                .collect::<DbResult<Vec<Member>>>()?
        }
    };
    Ok(raw_members)
}

/// Replaces the mutable fields of the member profile with the given `id`.
pub(crate) async fn update_member(
    ex: &mut Executor,
    id: i64,
    data: &MemberData,
    now: OffsetDateTime,
) -> DbResult<()> {
    let rows_affected = match ex {
        Executor::Postgres(ex) => {
            let query_str = "
                UPDATE members
                SET name = $1, resting_hr = $2, max_hr = $3, notes = $4, updated_at = $5
                WHERE id = $6";
            let done = sqlx::query(query_str)
                .bind(&data.name)
                .bind(data.resting_hr)
                .bind(data.max_hr)
                .bind(&data.notes)
                .bind(now)
                .bind(id)
                .execute(ex.conn())
                .await
                .map_err(postgres::map_sqlx_error)?;
            done.rows_affected()
        }

        Executor::Sqlite(ex) => {
            let query_str = "
                UPDATE members
                SET name = ?, resting_hr = ?, max_hr = ?, notes = ?, updated_at = ?
                WHERE id = ?";
            let done = sqlx::query(query_str)
                .bind(&data.name)
                .bind(data.resting_hr)
                .bind(data.max_hr)
                .bind(&data.notes)
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

/// Deletes the member profile with the given `id`.
pub(crate) async fn delete_member(ex: &mut Executor, id: i64) -> DbResult<()> {
    let rows_affected = match ex {
        Executor::Postgres(ex) => {
            let done = sqlx::query("DELETE FROM members WHERE id = $1")
                .bind(id)
                .execute(ex.conn())
                .await
                .map_err(postgres::map_sqlx_error)?;
            done.rows_affected()
        }

        Executor::Sqlite(ex) => {
            let done = sqlx::query("DELETE FROM members WHERE id = ?")
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
        _ => Err(DbError::BackendError("Delete affected more than one row".to_owned())),
    }
}
