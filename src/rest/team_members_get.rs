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

//! API to list a team's membership rows, joined with user identities.

use crate::driver::Driver;
use crate::model::{MembershipStatus, TeamMemberInfo};
use crate::rest::{get_bearer_token, Envelope, RestResult};
use axum::extract::{Path, Query, State};
use axum::http::HeaderMap;
use axum::Json;
use serde::Deserialize;

/// Query parameters accepted by this API.
#[derive(Deserialize)]
pub(crate) struct TeamMembersQuery {
    /// Restrict the listing to rows in this status.
    status: Option<MembershipStatus>,
}

/// GET handler for this API.
pub(crate) async fn handler(
    State(driver): State<Driver>,
    headers: HeaderMap,
    Path(team_id): Path<i64>,
    Query(query): Query<TeamMembersQuery>,
) -> RestResult<Json<Envelope<Vec<TeamMemberInfo>>>> {
    driver.session_user(&get_bearer_token(&headers)?).await?;
    let members = driver.get_team_members(team_id, query.status).await?;
    Ok(Envelope::ok(members))
}
