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

//! API to list trails.

use crate::driver::Driver;
use crate::model::Trail;
use crate::rest::{get_bearer_token, Envelope, PageQuery, RestResult};
use axum::extract::{Query, State};
use axum::http::HeaderMap;
use axum::Json;

/// GET handler for this API.
pub(crate) async fn handler(
    State(driver): State<Driver>,
    headers: HeaderMap,
    Query(page): Query<PageQuery>,
) -> RestResult<Json<Envelope<Vec<Trail>>>> {
    driver.session_user(&get_bearer_token(&headers)?).await?;
    let (skip, limit) = page.validate()?;
    let trails = driver.get_trails(skip, limit).await?;
    Ok(Envelope::ok(trails))
}
