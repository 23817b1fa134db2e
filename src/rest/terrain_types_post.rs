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

//! API to create a terrain type.

use crate::db::terrain_types::TerrainTypeData;
use crate::driver::Driver;
use crate::model::TerrainType;
use crate::rest::{get_bearer_token, AppJson, Envelope, RestResult};
use axum::extract::State;
use axum::http::HeaderMap;
use axum::Json;
use serde::Deserialize;

/// Contents of a terrain type creation or update request.
#[derive(Deserialize)]
pub(crate) struct TerrainTypeRequest {
    /// Display name of the terrain category.
    pub(crate) name: String,

    /// Multiplier applied to a runner's base pace on this terrain.
    pub(crate) pace_factor: f64,

    /// Position of this entry in display listings (ascending).
    pub(crate) sort_order: i32,

    /// Whether the entry is offered by default.  New entries default to active.
    #[serde(default = "default_is_active")]
    pub(crate) is_active: bool,
}

/// Default for the `is_active` field of incoming requests.
fn default_is_active() -> bool {
    true
}

impl From<TerrainTypeRequest> for TerrainTypeData {
    fn from(request: TerrainTypeRequest) -> Self {
        TerrainTypeData {
            name: request.name,
            pace_factor: request.pace_factor,
            sort_order: request.sort_order,
            is_active: request.is_active,
        }
    }
}

/// POST handler for this API.
pub(crate) async fn handler(
    State(driver): State<Driver>,
    headers: HeaderMap,
    AppJson(request): AppJson<TerrainTypeRequest>,
) -> RestResult<(http::StatusCode, Json<Envelope<TerrainType>>)> {
    driver.session_user(&get_bearer_token(&headers)?).await?;
    let terrain_type = driver.create_terrain_type(request.into()).await?;
    Ok((http::StatusCode::CREATED, Envelope::ok(terrain_type)))
}
