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

//! API to create a training review.

use crate::db::reviews::ReviewData;
use crate::driver::Driver;
use crate::model::{Rating, Review};
use crate::rest::{get_bearer_token, AppJson, Envelope, RestResult};
use axum::extract::State;
use axum::http::HeaderMap;
use axum::Json;
use serde::Deserialize;

/// Contents of a review creation or update request.
#[derive(Deserialize)]
pub(crate) struct ReviewRequest {
    /// The member the review belongs to.
    pub(crate) member_id: i64,

    /// The trail the review is about.
    pub(crate) trail_id: i64,

    /// Subjective rating of the outing, 1 to 5.
    pub(crate) rating: Rating,

    /// Free-form comments.
    pub(crate) comment: Option<String>,

    /// Duration of the outing in minutes, if recorded.
    pub(crate) duration_min: Option<i32>,

    /// Average heart rate during the outing, if recorded.
    pub(crate) avg_heart_rate: Option<i16>,
}

impl From<ReviewRequest> for ReviewData {
    fn from(request: ReviewRequest) -> Self {
        ReviewData {
            member_id: request.member_id,
            trail_id: request.trail_id,
            rating: request.rating,
            comment: request.comment,
            duration_min: request.duration_min,
            avg_heart_rate: request.avg_heart_rate,
        }
    }
}

/// POST handler for this API.
pub(crate) async fn handler(
    State(driver): State<Driver>,
    headers: HeaderMap,
    AppJson(request): AppJson<ReviewRequest>,
) -> RestResult<(http::StatusCode, Json<Envelope<Review>>)> {
    driver.session_user(&get_bearer_token(&headers)?).await?;
    let review = driver.create_review(request.into()).await?;
    Ok((http::StatusCode::CREATED, Envelope::ok(review)))
}
