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

//! API to fetch one member profile, including derived heart rate zones.

use crate::driver::Driver;
use crate::model::zones::{self, HrZone};
use crate::model::Member;
use crate::rest::{get_bearer_token, Envelope, RestResult};
use axum::extract::{Path, State};
use axum::http::HeaderMap;
use axum::Json;
use serde::Serialize;

/// A member profile extended with data derived from its heart rate figures.
#[derive(Serialize)]
pub(crate) struct MemberDetail {
    /// The stored profile.
    #[serde(flatten)]
    member: Member,

    /// Karvonen training zones; present only when both heart rates are on file.
    #[serde(skip_serializing_if = "Option::is_none")]
    hr_zones: Option<Vec<HrZone>>,
}

/// GET handler for this API.
pub(crate) async fn handler(
    State(driver): State<Driver>,
    headers: HeaderMap,
    Path(id): Path<i64>,
) -> RestResult<Json<Envelope<MemberDetail>>> {
    driver.session_user(&get_bearer_token(&headers)?).await?;
    let member = driver.get_member(id).await?;

    let hr_zones = match (member.resting_hr, member.max_hr) {
        (Some(resting_hr), Some(max_hr)) => Some(zones::karvonen(resting_hr, max_hr)),
        _ => None,
    };
    Ok(Envelope::ok(MemberDetail { member, hr_zones }))
}
