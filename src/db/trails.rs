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

//! Database operations for the `trails` table.

use crate::db::{postgres, sqlite, DbError, DbResult, Executor};
use crate::model::Trail;
use sqlx::postgres::PgRow;
use sqlx::sqlite::SqliteRow;
use sqlx::Row;
use time::OffsetDateTime;

/// The mutable fields of a trail record, as received from the API.
#[derive(Clone)]
#[cfg_attr(test, derive(Debug, PartialEq))]
pub(crate) struct TrailData {
    /// Name of the trail.
    pub(crate) name: String,

    /// Where the trailhead is.
    pub(crate) location: String,

    /// Total distance in kilometers.
    pub(crate) distance_km: f64,

    /// Accumulated climb in meters.
    pub(crate) elevation_gain_m: i32,

    /// Dominant terrain.
    pub(crate) terrain: String,

    /// Longer description, if any.
    pub(crate) description: Option<String>,
}

impl TryFrom<PgRow> for Trail {
    type Error = DbError;

    fn try_from(row: PgRow) -> DbResult<Self> {
        let id: i64 = row.try_get("id").map_err(postgres::map_sqlx_error)?;
        let name: String = row.try_get("name").map_err(postgres::map_sqlx_error)?;
        let location: String = row.try_get("location").map_err(postgres::map_sqlx_error)?;
        let distance_km: f64 = row.try_get("distance_km").map_err(postgres::map_sqlx_error)?;
        let elevation_gain_m: i32 =
            row.try_get("elevation_gain_m").map_err(postgres::map_sqlx_error)?;
        let terrain: String = row.try_get("terrain").map_err(postgres::map_sqlx_error)?;
        let description: Option<String> =
            row.try_get("description").map_err(postgres::map_sqlx_error)?;
        let created_at: OffsetDateTime =
            row.try_get("created_at").map_err(postgres::map_sqlx_error)?;
        let updated_at: OffsetDateTime =
            row.try_get("updated_at").map_err(postgres::map_sqlx_error)?;

        Ok(Trail {
            id,
            name,
            location,
            distance_km,
            elevation_gain_m,
            terrain,
            description,
            created_at,
            updated_at,
        })
    }
}

impl TryFrom<SqliteRow> for Trail {
    type Error = DbError;

    fn try_from(row: SqliteRow) -> DbResult<Self> {
        let id: i64 = row.try_get("id").map_err(sqlite::map_sqlx_error)?;
        let name: String = row.try_get("name").map_err(sqlite::map_sqlx_error)?;
        let location: String = row.try_get("location").map_err(sqlite::map_sqlx_error)?;
        let distance_km: f64 = row.try_get("distance_km").map_err(sqlite::map_sqlx_error)?;
        let elevation_gain_m: i32 =
            row.try_get("elevation_gain_m").map_err(sqlite::map_sqlx_error)?;
        let terrain: String = row.try_get("terrain").map_err(sqlite::map_sqlx_error)?;
        let description: Option<String> =
            row.try_get("description").map_err(sqlite::map_sqlx_error)?;
        let created_at: i64 = row.try_get("created_at").map_err(sqlite::map_sqlx_error)?;
        let updated_at: i64 = row.try_get("updated_at").map_err(sqlite::map_sqlx_error)?;

        Ok(Trail {
            id,
            name,
            location,
            distance_km,
            elevation_gain_m,
            terrain,
            description,
            created_at: sqlite::build_timestamp(created_at)?,
            updated_at: sqlite::build_timestamp(updated_at)?,
        })
    }
}

/// Creates a new trail record.
pub(crate) async fn create_trail(
    ex: &mut Executor,
    data: TrailData,
    now: OffsetDateTime,
) -> DbResult<Trail> {
    let id = match ex {
        Executor::Postgres(ex) => {
            let query_str = "
                INSERT INTO trails
                    (name, location, distance_km, elevation_gain_m, terrain, description,
                     created_at, updated_at)
                VALUES ($1, $2, $3, $4, $5, $6, $7, $7)
                RETURNING id";
            let row = sqlx::query(query_str)
                .bind(&data.name)
                .bind(&data.location)
                .bind(data.distance_km)
                .bind(data.elevation_gain_m)
                .bind(&data.terrain)
                .bind(&data.description)
                .bind(now)
                .fetch_one(ex.conn())
                .await
                .map_err(postgres::map_sqlx_error)?;
            row.try_get("id").map_err(postgres::map_sqlx_error)?
        }

        Executor::Sqlite(ex) => {
            let query_str = "
                INSERT INTO trails
                    (name, location, distance_km, elevation_gain_m, terrain, description,
                     created_at, updated_at)
                VALUES (?, ?, ?, ?, ?, ?, ?, ?)";
            let now_us = sqlite::unpack_timestamp(now);
            let done = sqlx::query(query_str)
                .bind(&data.name)
                .bind(&data.location)
                .bind(data.distance_km)
                .bind(data.elevation_gain_m)
                .bind(&data.terrain)
                .bind(&data.description)
                .bind(now_us)
                .bind(now_us)
                .execute(ex.conn())
                .await
                .map_err(sqlite::map_sqlx_error)?;
            done.last_insert_rowid()
        }
    };

    Ok(Trail {
        id,
        name: data.name,
        location: data.location,
        distance_km: data.distance_km,
        elevation_gain_m: data.elevation_gain_m,
        terrain: data.terrain,
        description: data.description,
        created_at: now,
        updated_at: now,
    })
}

/// Gets the trail with the given `id`.
pub(crate) async fn get_trail_by_id(ex: &mut Executor, id: i64) -> DbResult<Trail> {
    match ex {
        Executor::Postgres(ex) => {
            let raw = sqlx::query("SELECT * FROM trails WHERE id = $1")
                .bind(id)
                .fetch_one(ex.conn())
                .await
                .map_err(postgres::map_sqlx_error)?;
            Trail::try_from(raw)
        }

        Executor::Sqlite(ex) => {
            let raw = sqlx::query("SELECT * FROM trails WHERE id = ?")
                .bind(id)
                .fetch_one(ex.conn())
                .await
                .map_err(sqlite::map_sqlx_error)?;
            Trail::try_from(raw)
        }
    }
}

/// Lists trails in insertion order, skipping `skip` rows and returning at most `limit`.
pub(crate) async fn list_trails(ex: &mut Executor, skip: i64, limit: i64) -> DbResult<Vec<Trail>> {
    match ex {
        Executor::Postgres(ex) => {
            sqlx::query("SELECT * FROM trails ORDER BY id LIMIT $1 OFFSET $2")
                .bind(limit)
                .bind(skip)
                .fetch_all(ex.conn())
                .await
                .map_err(postgres::map_sqlx_error)?
                .into_iter()
                .map(Trail::try_from)
                .collect()
        }

        Executor::Sqlite(ex) => {
            sqlx::query("SELECT * FROM trails ORDER BY id LIMIT ? OFFSET ?")
                .bind(limit)
                .bind(skip)
                .fetch_all(ex.conn())
                .await
                .map_err(sqlite::map_sqlx_error)?
                .into_iter()
                .map(Trail::try_from)
                .collect()
        }
    }
}

/// Replaces the mutable fields of the trail with the given `id`.
pub(crate) async fn update_trail(
    ex: &mut Executor,
    id: i64,
    data: &TrailData,
    now: OffsetDateTime,
) -> DbResult<()> {
    let rows_affected = match ex {
        Executor::Postgres(ex) => {
            let query_str = "
                UPDATE trails
                SET name = $1, location = $2, distance_km = $3, elevation_gain_m = $4,
                    terrain = $5, description = $6, updated_at = $7
                WHERE id = $8";
            let done = sqlx::query(query_str)
                .bind(&data.name)
                .bind(&data.location)
                .bind(data.distance_km)
                .bind(data.elevation_gain_m)
                .bind(&data.terrain)
                .bind(&data.description)
                .bind(now)
                .bind(id)
                .execute(ex.conn())
                .await
                .map_err(postgres::map_sqlx_error)?;
            done.rows_affected()
        }

        Executor::Sqlite(ex) => {
            let query_str = "
                UPDATE trails
                SET name = ?, location = ?, distance_km = ?, elevation_gain_m = ?,
                    terrain = ?, description = ?, updated_at = ?
                WHERE id = ?";
            let done = sqlx::query(query_str)
                .bind(&data.name)
                .bind(&data.location)
                .bind(data.distance_km)
                .bind(data.elevation_gain_m)
                .bind(&data.terrain)
                .bind(&data.description)
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

/// Deletes the trail with the given `id`.
pub(crate) async fn delete_trail(ex: &mut Executor, id: i64) -> DbResult<()> {
    let rows_affected = match ex {
        Executor::Postgres(ex) => {
            let done = sqlx::query("DELETE FROM trails WHERE id = $1")
                .bind(id)
                .execute(ex.conn())
                .await
                .map_err(postgres::map_sqlx_error)?;
            done.rows_affected()
        }

        Executor::Sqlite(ex) => {
            let done = sqlx::query("DELETE FROM trails WHERE id = ?")
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

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::db::testutils::setup;

    /// Shorthand to build a `TrailData` for a ridge route named `name`.
    pub(crate) fn ridge_trail(name: &str) -> TrailData {
        TrailData {
            name: name.to_owned(),
            location: "Sierra de Guadarrama".to_owned(),
            distance_km: 21.5,
            elevation_gain_m: 1150,
            terrain: "rocky ridge".to_owned(),
            description: None,
        }
    }

    #[tokio::test]
    async fn test_create_and_get_trail() {
        let db = setup().await;
        let mut ex = db.ex().await.unwrap();

        let inserted = create_trail(
            &mut ex,
            ridge_trail("Siete Picos"),
            OffsetDateTime::from_unix_timestamp(1_000_000).unwrap(),
        )
        .await
        .unwrap();

        let fetched = get_trail_by_id(&mut ex, inserted.id).await.unwrap();
        assert_eq!(inserted, fetched);
    }

    #[tokio::test]
    async fn test_list_trails_pagination() {
        let db = setup().await;
        let mut ex = db.ex().await.unwrap();

        for name in ["one", "two", "three"] {
            create_trail(
                &mut ex,
                ridge_trail(name),
                OffsetDateTime::from_unix_timestamp(1_000_000).unwrap(),
            )
            .await
            .unwrap();
        }

        let page = list_trails(&mut ex, 2, 10).await.unwrap();
        assert_eq!(
            vec!["three".to_owned()],
            page.into_iter().map(|t| t.name).collect::<Vec<String>>()
        );
    }

    #[tokio::test]
    async fn test_update_trail() {
        let db = setup().await;
        let mut ex = db.ex().await.unwrap();

        let trail = create_trail(
            &mut ex,
            ridge_trail("before"),
            OffsetDateTime::from_unix_timestamp(1_000_000).unwrap(),
        )
        .await
        .unwrap();

        let later = OffsetDateTime::from_unix_timestamp(2_000_000).unwrap();
        let mut data = ridge_trail("after");
        data.distance_km = 30.0;
        update_trail(&mut ex, trail.id, &data, later).await.unwrap();

        let fetched = get_trail_by_id(&mut ex, trail.id).await.unwrap();
        assert_eq!("after", fetched.name);
        assert_eq!(30.0, fetched.distance_km);
        assert_eq!(later, fetched.updated_at);
    }

    #[tokio::test]
    async fn test_update_and_delete_trail_not_found() {
        let db = setup().await;
        let mut ex = db.ex().await.unwrap();

        assert_eq!(
            DbError::NotFound,
            update_trail(
                &mut ex,
                77,
                &ridge_trail("ghost"),
                OffsetDateTime::from_unix_timestamp(1_000_000).unwrap()
            )
            .await
            .unwrap_err()
        );
        assert_eq!(DbError::NotFound, delete_trail(&mut ex, 77).await.unwrap_err());
    }

    #[tokio::test]
    async fn test_delete_trail() {
        let db = setup().await;
        let mut ex = db.ex().await.unwrap();

        let trail = create_trail(
            &mut ex,
            ridge_trail("gone"),
            OffsetDateTime::from_unix_timestamp(1_000_000).unwrap(),
        )
        .await
        .unwrap();

        delete_trail(&mut ex, trail.id).await.unwrap();
        assert_eq!(DbError::NotFound, get_trail_by_id(&mut ex, trail.id).await.unwrap_err());
    }
}
