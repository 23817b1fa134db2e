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

//! API to list the teams the authenticated user belongs to or has applied to.

use crate::driver::Driver;
use crate::model::{MembershipStatus, TeamMembership, TeamRole};
use crate::rest::{get_bearer_token, Envelope, RestResult};
use axum::extract::{Query, State};
use axum::http::HeaderMap;
use axum::Json;
use serde::Deserialize;

/// Query parameters accepted by this API.
#[derive(Deserialize)]
pub(crate) struct MyTeamsQuery {
    /// Restrict the listing to memberships in this status.
    status: Option<MembershipStatus>,

    /// Restrict the listing to memberships with this role.
    role: Option<TeamRole>,
}

/// GET handler for this API.
pub(crate) async fn handler(
    State(driver): State<Driver>,
    headers: HeaderMap,
    Query(query): Query<MyTeamsQuery>,
) -> RestResult<Json<Envelope<Vec<TeamMembership>>>> {
    let user = driver.session_user(&get_bearer_token(&headers)?).await?;
    let memberships = driver.get_user_teams(user.id, query.status, query.role).await?;
    Ok(Envelope::ok(memberships))
}
