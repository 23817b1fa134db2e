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

//! API to create a member profile.

use crate::db::members::MemberData;
use crate::driver::Driver;
use crate::model::Member;
use crate::rest::{get_bearer_token, AppJson, Envelope, RestResult};
use axum::extract::State;
use axum::http::HeaderMap;
use axum::Json;
use serde::Deserialize;

/// Contents of a member creation or update request.
#[derive(Deserialize)]
pub(crate) struct MemberRequest {
    /// Display name of the athlete.
    pub(crate) name: String,

    /// Resting heart rate in beats per minute, if measured.
    pub(crate) resting_hr: Option<i16>,

    /// Maximum heart rate in beats per minute, if measured.
    pub(crate) max_hr: Option<i16>,

    /// Free-form coaching notes.
    pub(crate) notes: Option<String>,
}

impl From<MemberRequest> for MemberData {
    fn from(request: MemberRequest) -> Self {
        MemberData {
            name: request.name,
            resting_hr: request.resting_hr,
            max_hr: request.max_hr,
            notes: request.notes,
        }
    }
}

/// POST handler for this API.
pub(crate) async fn handler(
    State(driver): State<Driver>,
    headers: HeaderMap,
    AppJson(request): AppJson<MemberRequest>,
) -> RestResult<(http::StatusCode, Json<Envelope<Member>>)> {
    driver.session_user(&get_bearer_token(&headers)?).await?;
    let member = driver.create_member(request.into()).await?;
    Ok((http::StatusCode::CREATED, Envelope::ok(member)))
}
