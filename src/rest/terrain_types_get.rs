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

//! API to list terrain types in display order.
//!
//! This is reference data for rendering forms, so unlike the rest of the
//! catalog it can be read without a session.

use crate::driver::Driver;
use crate::model::TerrainType;
use crate::rest::{Envelope, RestResult};
use axum::extract::{Query, State};
use axum::Json;
use serde::Deserialize;

/// Query parameters accepted by this API.
#[derive(Deserialize)]
pub(crate) struct TerrainTypesQuery {
    /// Include entries that have been retired from the default listings.
    #[serde(default)]
    include_inactive: bool,
}

/// GET handler for this API.
pub(crate) async fn handler(
    State(driver): State<Driver>,
    Query(query): Query<TerrainTypesQuery>,
) -> RestResult<Json<Envelope<Vec<TerrainType>>>> {
    let terrain_types = driver.get_terrain_types(query.include_inactive).await?;
    Ok(Envelope::ok(terrain_types))
}
