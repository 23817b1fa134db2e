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

//! API to create a trail record.

use crate::db::trails::TrailData;
use crate::driver::Driver;
use crate::model::Trail;
use crate::rest::{get_bearer_token, AppJson, Envelope, RestResult};
use axum::extract::State;
use axum::http::HeaderMap;
use axum::Json;
use serde::Deserialize;

/// Contents of a trail creation or update request.
#[derive(Deserialize)]
pub(crate) struct TrailRequest {
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

impl From<TrailRequest> for TrailData {
    fn from(request: TrailRequest) -> Self {
        TrailData {
            name: request.name,
            location: request.location,
            distance_km: request.distance_km,
            elevation_gain_m: request.elevation_gain_m,
            terrain: request.terrain,
            description: request.description,
        }
    }
}

/// POST handler for this API.
pub(crate) async fn handler(
    State(driver): State<Driver>,
    headers: HeaderMap,
    AppJson(request): AppJson<TrailRequest>,
) -> RestResult<(http::StatusCode, Json<Envelope<Trail>>)> {
    driver.session_user(&get_bearer_token(&headers)?).await?;
    let trail = driver.create_trail(request.into()).await?;
    Ok((http::StatusCode::CREATED, Envelope::ok(trail)))
}
