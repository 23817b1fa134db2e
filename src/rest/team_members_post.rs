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

//! API to apply for membership in a team.
//!
//! The application is always filed for the authenticated user.  The body may
//! name a `user_id` for compatibility with older clients, but it must match
//! the session: applying on someone else's behalf is not a thing.

use crate::driver::Driver;
use crate::model::TeamMember;
use crate::rest::{get_bearer_token, AppJson, Envelope, RestResult};
use axum::extract::{Path, State};
use axum::http::HeaderMap;
use axum::Json;
use serde::Deserialize;

/// Contents of a membership application.
#[derive(Default, Deserialize)]
pub(crate) struct ApplyRequest {
    /// The applicant; must be the authenticated user when present.
    user_id: Option<i64>,
}

/// POST handler for this API.
pub(crate) async fn handler(
    State(driver): State<Driver>,
    headers: HeaderMap,
    Path(team_id): Path<i64>,
    body: Option<AppJson<ApplyRequest>>,
) -> RestResult<(http::StatusCode, Json<Envelope<TeamMember>>)> {
    let user = driver.session_user(&get_bearer_token(&headers)?).await?;

    let request = body.map(|AppJson(request)| request).unwrap_or_default();
    if let Some(user_id) = request.user_id {
        if user_id != user.id {
            return Err(crate::rest::RestError::Forbidden(
                "Cannot apply on behalf of another user".to_owned(),
            ));
        }
    }

    let membership = driver.apply_to_team(team_id, user.id).await?;
    Ok((http::StatusCode::CREATED, Envelope::ok(membership)))
}
