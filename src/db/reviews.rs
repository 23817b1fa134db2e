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

//! Database operations for the `reviews` table.

use crate::db::{postgres, sqlite, DbError, DbResult, Executor};
use crate::model::{Rating, Review};
use sqlx::postgres::PgRow;
use sqlx::sqlite::SqliteRow;
use sqlx::Row;
use time::OffsetDateTime;

/// The mutable fields of a review, as received from the API.
#[derive(Clone)]
#[cfg_attr(test, derive(Debug, PartialEq))]
pub(crate) struct ReviewData {
    /// The member the review belongs to.
    pub(crate) member_id: i64,

    /// The trail the review is about.
    pub(crate) trail_id: i64,

    /// Subjective rating of the outing.
    pub(crate) rating: Rating,

    /// Free-form comments.
    pub(crate) comment: Option<String>,

    /// Duration of the outing in minutes, if recorded.
    pub(crate) duration_min: Option<i32>,

    /// Average heart rate during the outing, if recorded.
    pub(crate) avg_heart_rate: Option<i16>,
}

impl TryFrom<PgRow> for Review {
    type Error = DbError;

    fn try_from(row: PgRow) -> DbResult<Self> {
        let id: i64 = row.try_get("id").map_err(postgres::map_sqlx_error)?;
        let member_id: i64 = row.try_get("member_id").map_err(postgres::map_sqlx_error)?;
        let trail_id: i64 = row.try_get("trail_id").map_err(postgres::map_sqlx_error)?;
        let rating: i16 = row.try_get("rating").map_err(postgres::map_sqlx_error)?;
        let comment: Option<String> = row.try_get("comment").map_err(postgres::map_sqlx_error)?;
        let duration_min: Option<i32> =
            row.try_get("duration_min").map_err(postgres::map_sqlx_error)?;
        let avg_heart_rate: Option<i16> =
            row.try_get("avg_heart_rate").map_err(postgres::map_sqlx_error)?;
        let created_at: OffsetDateTime =
            row.try_get("created_at").map_err(postgres::map_sqlx_error)?;
        let updated_at: OffsetDateTime =
            row.try_get("updated_at").map_err(postgres::map_sqlx_error)?;

        Ok(Review {
            id,
            member_id,
            trail_id,
            rating: Rating::new(rating)?,
            comment,
            duration_min,
            avg_heart_rate,
            created_at,
            updated_at,
        })
    }
}

impl TryFrom<SqliteRow> for Review {
    type Error = DbError;

    fn try_from(row: SqliteRow) -> DbResult<Self> {
        let id: i64 = row.try_get("id").map_err(sqlite::map_sqlx_error)?;
        let member_id: i64 = row.try_get("member_id").map_err(sqlite::map_sqlx_error)?;
        let trail_id: i64 = row.try_get("trail_id").map_err(sqlite::map_sqlx_error)?;
        let rating: i16 = row.try_get("rating").map_err(sqlite::map_sqlx_error)?;
        let comment: Option<String> = row.try_get("comment").map_err(sqlite::map_sqlx_error)?;
        let duration_min: Option<i32> =
            row.try_get("duration_min").map_err(sqlite::map_sqlx_error)?;
        let avg_heart_rate: Option<i16> =
            row.try_get("avg_heart_rate").map_err(sqlite::map_sqlx_error)?;
        let created_at: i64 = row.try_get("created_at").map_err(sqlite::map_sqlx_error)?;
        let updated_at: i64 = row.try_get("updated_at").map_err(sqlite::map_sqlx_error)?;

        Ok(Review {
            id,
            member_id,
            trail_id,
            rating: Rating::new(rating)?,
            comment,
            duration_min,
            avg_heart_rate,
            created_at: sqlite::build_timestamp(created_at)?,
            updated_at: sqlite::build_timestamp(updated_at)?,
        })
    }
}

/// Creates a new review.  The member and trail references must exist.
pub(crate) async fn create_review(
    ex: &mut Executor,
    data: ReviewData,
    now: OffsetDateTime,
) -> DbResult<Review> {
    let id = match ex {
        Executor::Postgres(ex) => {
            let query_str = "
                INSERT INTO reviews
                    (member_id, trail_id, rating, comment, duration_min, avg_heart_rate,
                     created_at, updated_at)
                VALUES ($1, $2, $3, $4, $5, $6, $7, $7)
                RETURNING id";
            let row = sqlx::query(query_str)
                .bind(data.member_id)
                .bind(data.trail_id)
                .bind(data.rating.as_i16())
                .bind(&data.comment)
                .bind(data.duration_min)
                .bind(data.avg_heart_rate)
                .bind(now)
                .fetch_one(ex.conn())
                .await
                .map_err(postgres::map_sqlx_error)?;
            row.try_get("id").map_err(postgres::map_sqlx_error)?
        }

        Executor::Sqlite(ex) => {
            let query_str = "
                INSERT INTO reviews
                    (member_id, trail_id, rating, comment, duration_min, avg_heart_rate,
                     created_at, updated_at)
                VALUES (?, ?, ?, ?, ?, ?, ?, ?)";
            let now_us = sqlite::unpack_timestamp(now);
            let done = sqlx::query(query_str)
                .bind(data.member_id)
                .bind(data.trail_id)
                .bind(data.rating.as_i16())
                .bind(&data.comment)
                .bind(data.duration_min)
                .bind(data.avg_heart_rate)
                .bind(now_us)
                .bind(now_us)
                .execute(ex.conn())
                .await
                .map_err(sqlite::map_sqlx_error)?;
            done.last_insert_rowid()
        }
    };

    Ok(Review {
        id,
        member_id: data.member_id,
        trail_id: data.trail_id,
        rating: data.rating,
        comment: data.comment,
        duration_min: data.duration_min,
        avg_heart_rate: data.avg_heart_rate,
        created_at: now,
        updated_at: now,
    })
}

/// Gets the review with the given `id`.
pub(crate) async fn get_review_by_id(ex: &mut Executor, id: i64) -> DbResult<Review> {
    match ex {
        Executor::Postgres(ex) => {
            let raw = sqlx::query("SELECT * FROM reviews WHERE id = $1")
                .bind(id)
                .fetch_one(ex.conn())
                .await
                .map_err(postgres::map_sqlx_error)?;
            Review::try_from(raw)
        }

        Executor::Sqlite(ex) => {
            let raw = sqlx::query("SELECT * FROM reviews WHERE id = ?")
                .bind(id)
                .fetch_one(ex.conn())
                .await
                .map_err(sqlite::map_sqlx_error)?;
            Review::try_from(raw)
        }
    }
}

/// Lists reviews in insertion order, skipping `skip` rows and returning at most `limit`.
pub(crate) async fn list_reviews(
    ex: &mut Executor,
    skip: i64,
    limit: i64,
) -> DbResult<Vec<Review>> {
    match ex {
        Executor::Postgres(ex) => {
            sqlx::query("SELECT * FROM reviews ORDER BY id LIMIT $1 OFFSET $2")
                .bind(limit)
                .bind(skip)
                .fetch_all(ex.conn())
                .await
                .map_err(postgres::map_sqlx_error)?
                .into_iter()
                .map(Review::try_from)
                .collect()
        }

        Executor::Sqlite(ex) => {
            sqlx::query("SELECT * FROM reviews ORDER BY id LIMIT ? OFFSET ?")
                .bind(limit)
                .bind(skip)
                .fetch_all(ex.conn())
                .await
                .map_err(sqlite::map_sqlx_error)?
                .into_iter()
                .map(Review::try_from)
                .collect()
        }
    }
}

/// Lists all reviews belonging to `member_id`, in insertion order.
pub(crate) async fn list_reviews_by_member(
    ex: &mut Executor,
    member_id: i64,
) -> DbResult<Vec<Review>> {
    match ex {
        Executor::Postgres(ex) => {
            sqlx::query("SELECT * FROM reviews WHERE member_id = $1 ORDER BY id")
                .bind(member_id)
                .fetch_all(ex.conn())
                .await
                .map_err(postgres::map_sqlx_error)?
                .into_iter()
                .map(Review::try_from)
                .collect()
        }

        Executor::Sqlite(ex) => {
            sqlx::query("SELECT * FROM reviews WHERE member_id = ? ORDER BY id")
                .bind(member_id)
                .fetch_all(ex.conn())
                .await
                .map_err(sqlite::map_sqlx_error)?
                .into_iter()
                .map(Review::try_from)
                .collect()
        }
    }
}

/// Lists all reviews about `trail_id`, in insertion order.
pub(crate) async fn list_reviews_by_trail(
    ex: &mut Executor,
    trail_id: i64,
) -> DbResult<Vec<Review>> {
    match ex {
        Executor::Postgres(ex) => {
            sqlx::query("SELECT * FROM reviews WHERE trail_id = $1 ORDER BY id")
                .bind(trail_id)
                .fetch_all(ex.conn())
                .await
                .map_err(postgres::map_sqlx_error)?
                .into_iter()
                .map(Review::try_from)
                .collect()
        }

        Executor::Sqlite(ex) => {
            sqlx::query("SELECT * FROM reviews WHERE trail_id = ? ORDER BY id")
                .bind(trail_id)
                .fetch_all(ex.conn())
                .await
                .map_err(sqlite::map_sqlx_error)?
                .into_iter()
                .map(Review::try_from)
                .collect()
        }
    }
}

/// Replaces the mutable fields of the review with the given `id`.
pub(crate) async fn update_review(
    ex: &mut Executor,
    id: i64,
    data: &ReviewData,
    now: OffsetDateTime,
) -> DbResult<()> {
    let rows_affected = match ex {
        Executor::Postgres(ex) => {
            let query_str = "
                UPDATE reviews
                SET member_id = $1, trail_id = $2, rating = $3, comment = $4,
                    duration_min = $5, avg_heart_rate = $6, updated_at = $7
                WHERE id = $8";
            let done = sqlx::query(query_str)
                .bind(data.member_id)
                .bind(data.trail_id)
                .bind(data.rating.as_i16())
                .bind(&data.comment)
                .bind(data.duration_min)
                .bind(data.avg_heart_rate)
                .bind(now)
                .bind(id)
                .execute(ex.conn())
                .await
                .map_err(postgres::map_sqlx_error)?;
            done.rows_affected()
        }

        Executor::Sqlite(ex) => {
            let query_str = "
                UPDATE reviews
                SET member_id = ?, trail_id = ?, rating = ?, comment = ?,
                    duration_min = ?, avg_heart_rate = ?, updated_at = ?
                WHERE id = ?";
            let done = sqlx::query(query_str)
                .bind(data.member_id)
                .bind(data.trail_id)
                .bind(data.rating.as_i16())
                .bind(&data.comment)
                .bind(data.duration_min)
                .bind(data.avg_heart_rate)
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

/// Deletes the review with the given `id`.
pub(crate) async fn delete_review(ex: &mut Executor, id: i64) -> DbResult<()> {
    let rows_affected = match ex {
        Executor::Postgres(ex) => {
            let done = sqlx::query("DELETE FROM reviews WHERE id = $1")
                .bind(id)
                .execute(ex.conn())
                .await
                .map_err(postgres::map_sqlx_error)?;
            done.rows_affected()
        }

        Executor::Sqlite(ex) => {
            let done = sqlx::query("DELETE FROM reviews WHERE id = ?")
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
