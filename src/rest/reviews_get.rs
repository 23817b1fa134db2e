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

//! API to list reviews, optionally filtered by member or trail.

use crate::driver::{Driver, ReviewFilter};
use crate::model::Review;
use crate::rest::{get_bearer_token, Envelope, PageQuery, RestResult};
use axum::extract::{Query, State};
use axum::http::HeaderMap;
use axum::Json;
use serde::Deserialize;

/// Query parameters accepted by this API.
#[derive(Deserialize)]
pub(crate) struct ReviewsQuery {
    /// Restrict the listing to one member's reviews.  Wins over `trail_id`.
    member_id: Option<i64>,

    /// Restrict the listing to one trail's reviews.
    trail_id: Option<i64>,

    /// Pagination; only honored by the unfiltered listing.
    skip: Option<i64>,

    /// Pagination; only honored by the unfiltered listing.
    limit: Option<i64>,
}

/// GET handler for this API.
pub(crate) async fn handler(
    State(driver): State<Driver>,
    headers: HeaderMap,
    Query(query): Query<ReviewsQuery>,
) -> RestResult<Json<Envelope<Vec<Review>>>> {
    driver.session_user(&get_bearer_token(&headers)?).await?;

    let filter = match (query.member_id, query.trail_id) {
        (Some(member_id), _) => ReviewFilter::ByMember(member_id),
        (None, Some(trail_id)) => ReviewFilter::ByTrail(trail_id),
        (None, None) => {
            let (skip, limit) =
                PageQuery { skip: query.skip, limit: query.limit }.validate()?;
            ReviewFilter::All { skip, limit }
        }
    };
    let reviews = driver.get_reviews(filter).await?;
    Ok(Envelope::ok(reviews))
}
