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

//! API to update a terrain type.

use crate::driver::Driver;
use crate::model::TerrainType;
use crate::rest::terrain_types_post::TerrainTypeRequest;
use crate::rest::{get_bearer_token, AppJson, Envelope, RestResult};
use axum::extract::{Path, State};
use axum::http::HeaderMap;
use axum::Json;

/// PUT handler for this API.
pub(crate) async fn handler(
    State(driver): State<Driver>,
    headers: HeaderMap,
    Path(id): Path<i64>,
    AppJson(request): AppJson<TerrainTypeRequest>,
) -> RestResult<Json<Envelope<TerrainType>>> {
    driver.session_user(&get_bearer_token(&headers)?).await?;
    let terrain_type = driver.update_terrain_type(id, request.into()).await?;
    Ok(Envelope::ok(terrain_type))
}
