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

//! Database operations for the `terrain_types` reference table.

use crate::db::{postgres, sqlite, DbError, DbResult, Executor};
use crate::model::TerrainType;
use sqlx::postgres::PgRow;
use sqlx::sqlite::SqliteRow;
use sqlx::Row;

/// The mutable fields of a terrain type, as received from the API.
#[derive(Clone)]
#[cfg_attr(test, derive(Debug, PartialEq))]
pub(crate) struct TerrainTypeData {
    /// Display name of the terrain category.
    pub(crate) name: String,

    /// Multiplier applied to a runner's base pace on this terrain.
    pub(crate) pace_factor: f64,

    /// Position of this entry in display listings (ascending).
    pub(crate) sort_order: i32,

    /// Whether the entry is offered by default.
    pub(crate) is_active: bool,
}

impl TryFrom<PgRow> for TerrainType {
    type Error = DbError;

    fn try_from(row: PgRow) -> DbResult<Self> {
        let id: i64 = row.try_get("id").map_err(postgres::map_sqlx_error)?;
        let name: String = row.try_get("name").map_err(postgres::map_sqlx_error)?;
        let pace_factor: f64 = row.try_get("pace_factor").map_err(postgres::map_sqlx_error)?;
        let sort_order: i32 = row.try_get("sort_order").map_err(postgres::map_sqlx_error)?;
        let is_active: bool = row.try_get("is_active").map_err(postgres::map_sqlx_error)?;

        Ok(TerrainType { id, name, pace_factor, sort_order, is_active })
    }
}

impl TryFrom<SqliteRow> for TerrainType {
    type Error = DbError;

    fn try_from(row: SqliteRow) -> DbResult<Self> {
        let id: i64 = row.try_get("id").map_err(sqlite::map_sqlx_error)?;
        let name: String = row.try_get("name").map_err(sqlite::map_sqlx_error)?;
        let pace_factor: f64 = row.try_get("pace_factor").map_err(sqlite::map_sqlx_error)?;
        let sort_order: i32 = row.try_get("sort_order").map_err(sqlite::map_sqlx_error)?;
        let is_active: bool = row.try_get("is_active").map_err(sqlite::map_sqlx_error)?;

        Ok(TerrainType { id, name, pace_factor, sort_order, is_active })
    }
}

/// Creates a new terrain type.
pub(crate) async fn create_terrain_type(
    ex: &mut Executor,
    data: TerrainTypeData,
) -> DbResult<TerrainType> {
    let id = match ex {
        Executor::Postgres(ex) => {
            let query_str = "
                INSERT INTO terrain_types (name, pace_factor, sort_order, is_active)
                VALUES ($1, $2, $3, $4)
                RETURNING id";
            let row = sqlx::query(query_str)
                .bind(&data.name)
                .bind(data.pace_factor)
                .bind(data.sort_order)
                .bind(data.is_active)
                .fetch_one(ex.conn())
                .await
                .map_err(postgres::map_sqlx_error)?;
            row.try_get("id").map_err(postgres::map_sqlx_error)?
        }

        Executor::Sqlite(ex) => {
            let query_str = "
                INSERT INTO terrain_types (name, pace_factor, sort_order, is_active)
                VALUES (?, ?, ?, ?)";
            let done = sqlx::query(query_str)
                .bind(&data.name)
                .bind(data.pace_factor)
                .bind(data.sort_order)
                .bind(data.is_active)
                .execute(ex.conn())
                .await
                .map_err(sqlite::map_sqlx_error)?;
            done.last_insert_rowid()
        }
    };

    Ok(TerrainType {
        id,
        name: data.name,
        pace_factor: data.pace_factor,
        sort_order: data.sort_order,
        is_active: data.is_active,
    })
}

/// Gets the terrain type with the given `id`.
pub(crate) async fn get_terrain_type_by_id(ex: &mut Executor, id: i64) -> DbResult<TerrainType> {
    match ex {
        Executor::Postgres(ex) => {
            let raw = sqlx::query("SELECT * FROM terrain_types WHERE id = $1")
                .bind(id)
                .fetch_one(ex.conn())
                .await
                .map_err(postgres::map_sqlx_error)?;
            TerrainType::try_from(raw)
        }

        Executor::Sqlite(ex) => {
            let raw = sqlx::query("SELECT * FROM terrain_types WHERE id = ?")
                .bind(id)
                .fetch_one(ex.conn())
                .await
                .map_err(sqlite::map_sqlx_error)?;
            TerrainType::try_from(raw)
        }
    }
}

/// Lists terrain types in display order.  Inactive entries are excluded unless
/// `include_inactive` is set.
pub(crate) async fn list_terrain_types(
    ex: &mut Executor,
    include_inactive: bool,
) -> DbResult<Vec<TerrainType>> {
    match ex {
        Executor::Postgres(ex) => {
            let query_str = "
                SELECT * FROM terrain_types
                WHERE is_active OR $1
                ORDER BY sort_order ASC, id ASC";
            sqlx::query(query_str)
                .bind(include_inactive)
                .fetch_all(ex.conn())
                .await
                .map_err(postgres::map_sqlx_error)?
                .into_iter()
                .map(TerrainType::try_from)
                .collect()
        }

        Executor::Sqlite(ex) => {
            let query_str = "
                SELECT * FROM terrain_types
                WHERE is_active OR ?
                ORDER BY sort_order ASC, id ASC";
            sqlx::query(query_str)
                .bind(include_inactive)
                .fetch_all(ex.conn())
                .await
                .map_err(sqlite::map_sqlx_error)?
                .into_iter()
                .map(TerrainType::try_from)
                .collect()
        }
    }
}

/// Replaces the mutable fields of the terrain type with the given `id`.
pub(crate) async fn update_terrain_type(
    ex: &mut Executor,
    id: i64,
    data: &TerrainTypeData,
) -> DbResult<()> {
    let rows_affected = match ex {
        Executor::Postgres(ex) => {
            let query_str = "
                UPDATE terrain_types
                SET name = $1, pace_factor = $2, sort_order = $3, is_active = $4
                WHERE id = $5";
            let done = sqlx::query(query_str)
                .bind(&data.name)
                .bind(data.pace_factor)
                .bind(data.sort_order)
                .bind(data.is_active)
                .bind(id)
                .execute(ex.conn())
                .await
                .map_err(postgres::map_sqlx_error)?;
            done.rows_affected()
        }

        Executor::Sqlite(ex) => {
            let query_str = "
                UPDATE terrain_types
                SET name = ?, pace_factor = ?, sort_order = ?, is_active = ?
                WHERE id = ?";
            let done = sqlx::query(query_str)
                .bind(&data.name)
                .bind(data.pace_factor)
                .bind(data.sort_order)
                .bind(data.is_active)
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

/// Deletes the terrain type with the given `id`.
pub(crate) async fn delete_terrain_type(ex: &mut Executor, id: i64) -> DbResult<()> {
    let rows_affected = match ex {
        Executor::Postgres(ex) => {
            let done = sqlx::query("DELETE FROM terrain_types WHERE id = $1")
                .bind(id)
                .execute(ex.conn())
                .await
                .map_err(postgres::map_sqlx_error)?;
            done.rows_affected()
        }

        Executor::Sqlite(ex) => {
            let done = sqlx::query("DELETE FROM terrain_types WHERE id = ?")
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
