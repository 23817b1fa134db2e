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

//! Operations on the trail catalog.

use crate::db::trails::TrailData;
use crate::db::{self, DbError};
use crate::driver::{Driver, DriverError, DriverResult};
use crate::model::Trail;

/// Validates the fields of a trail record.
fn validate(data: &TrailData) -> DriverResult<()> {
    if data.name.trim().is_empty() {
        return Err(DriverError::InvalidInput("Trail name cannot be empty".to_owned()));
    }
    if data.location.trim().is_empty() {
        return Err(DriverError::InvalidInput("Trail location cannot be empty".to_owned()));
    }
    if !data.distance_km.is_finite() || data.distance_km <= 0.0 {
        return Err(DriverError::InvalidInput("Trail distance must be positive".to_owned()));
    }
    if data.elevation_gain_m < 0 {
        return Err(DriverError::InvalidInput(
            "Trail elevation gain cannot be negative".to_owned(),
        ));
    }
    if data.terrain.trim().is_empty() {
        return Err(DriverError::InvalidInput("Trail terrain cannot be empty".to_owned()));
    }
    Ok(())
}

impl Driver {
    /// Creates a new trail record.
    pub(crate) async fn create_trail(self, data: TrailData) -> DriverResult<Trail> {
        validate(&data)?;
        let trail =
            db::trails::create_trail(&mut self.db.ex().await?, data, self.clock.now_utc())
                .await?;
        Ok(trail)
    }

    /// Gets an existing trail.
    pub(crate) async fn get_trail(self, id: i64) -> DriverResult<Trail> {
        let trail = db::trails::get_trail_by_id(&mut self.db.ex().await?, id).await?;
        Ok(trail)
    }

    /// Lists trails with pagination.
    pub(crate) async fn get_trails(self, skip: i64, limit: i64) -> DriverResult<Vec<Trail>> {
        let trails = db::trails::list_trails(&mut self.db.ex().await?, skip, limit).await?;
        Ok(trails)
    }

    /// Updates an existing trail and returns its new contents.
    pub(crate) async fn update_trail(self, id: i64, data: TrailData) -> DriverResult<Trail> {
        validate(&data)?;

        let mut tx = self.db.begin().await?;
        db::trails::update_trail(tx.ex(), id, &data, self.clock.now_utc()).await?;
        let trail = db::trails::get_trail_by_id(tx.ex(), id).await?;
        tx.commit().await?;
        Ok(trail)
    }

    /// Deletes an existing trail.
    pub(crate) async fn delete_trail(self, id: i64) -> DriverResult<()> {
        match db::trails::delete_trail(&mut self.db.ex().await?, id).await {
            Ok(()) => Ok(()),
            Err(DbError::NotFound) => Err(DriverError::NotFound("Trail not found".to_owned())),
            Err(e) => Err(e.into()),
        }
    }
}
