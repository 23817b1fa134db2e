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

//! API to fetch one trail.

use crate::driver::Driver;
use crate::model::Trail;
use crate::rest::{get_bearer_token, Envelope, RestResult};
use axum::extract::{Path, State};
use axum::http::HeaderMap;
use axum::Json;

/// GET handler for this API.
pub(crate) async fn handler(
    State(driver): State<Driver>,
    headers: HeaderMap,
    Path(id): Path<i64>,
) -> RestResult<Json<Envelope<Trail>>> {
    driver.session_user(&get_bearer_token(&headers)?).await?;
    let trail = driver.get_trail(id).await?;
    Ok(Envelope::ok(trail))
}
