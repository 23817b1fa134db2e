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

//! API to delete a review.

use crate::driver::Driver;
use crate::rest::{get_bearer_token, Envelope, RestResult};
use axum::extract::{Path, State};
use axum::http::HeaderMap;
use axum::Json;

/// DELETE handler for this API.
pub(crate) async fn handler(
    State(driver): State<Driver>,
    headers: HeaderMap,
    Path(id): Path<i64>,
) -> RestResult<Json<Envelope<()>>> {
    driver.session_user(&get_bearer_token(&headers)?).await?;
    driver.delete_review(id).await?;
    Ok(Envelope::message("Review deleted"))
}

#[cfg(test)]
mod tests {
    use crate::rest::testutils::*;
    use serde_json::json;

    fn route(id: i64) -> (http::Method, String) {
        (http::Method::DELETE, format!("/api/reviews/{}", id))
    }

    #[tokio::test]
    async fn test_ok_and_not_found() {
        let context = TestContext::setup().await;
        let (_, token) = context.create_session("coach").await;
        let (member_id, trail_id) = create_review_targets(&context).await;

        let id = OneShotBuilder::new(context.app(), (http::Method::POST, "/api/reviews"))
            .with_bearer_auth(&token)
            .send_json(json!({"member_id": member_id, "trail_id": trail_id, "rating": 2}))
            .await
            .expect_status(http::StatusCode::CREATED)
            .expect_data()
            .await["id"]
            .as_i64()
            .unwrap();

        OneShotBuilder::new(context.app(), route(id))
            .with_bearer_auth(&token)
            .send_empty()
            .await
            .expect_message()
            .await;

        OneShotBuilder::new(context.app(), route(id))
            .with_bearer_auth(&token)
            .send_empty()
            .await
            .expect_status(http::StatusCode::NOT_FOUND)
            .expect_error("Review not found")
            .await;
    }

    test_requires_session!(route(1));
}
