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

//! API to update a member profile.

use crate::driver::Driver;
use crate::model::Member;
use crate::rest::members_post::MemberRequest;
use crate::rest::{get_bearer_token, AppJson, Envelope, RestResult};
use axum::extract::{Path, State};
use axum::http::HeaderMap;
use axum::Json;

/// PUT handler for this API.
pub(crate) async fn handler(
    State(driver): State<Driver>,
    headers: HeaderMap,
    Path(id): Path<i64>,
    AppJson(request): AppJson<MemberRequest>,
) -> RestResult<Json<Envelope<Member>>> {
    driver.session_user(&get_bearer_token(&headers)?).await?;
    let member = driver.update_member(id, request.into()).await?;
    Ok(Envelope::ok(member))
}

#[cfg(test)]
mod tests {
    use crate::rest::testutils::*;
    use serde_json::json;

    fn route(id: i64) -> (http::Method, String) {
        (http::Method::PUT, format!("/api/members/{}", id))
    }

    #[tokio::test]
    async fn test_ok() {
        let context = TestContext::setup().await;
        let (_, token) = context.create_session("coach").await;

        let id = OneShotBuilder::new(context.app(), (http::Method::POST, "/api/members"))
            .with_bearer_auth(&token)
            .send_json(json!({"name": "before"}))
            .await
            .expect_status(http::StatusCode::CREATED)
            .expect_data()
            .await["id"]
            .as_i64()
            .unwrap();

        let data = OneShotBuilder::new(context.app(), route(id))
            .with_bearer_auth(&token)
            .send_json(json!({"name": "after", "notes": "new block"}))
            .await
            .expect_data()
            .await;
        assert_eq!("after", data["name"]);
        assert_eq!("new block", data["notes"]);
    }

    #[tokio::test]
    async fn test_not_found() {
        let context = TestContext::setup().await;
        let (_, token) = context.create_session("coach").await;

        OneShotBuilder::new(context.app(), route(123))
            .with_bearer_auth(&token)
            .send_json(json!({"name": "ghost"}))
            .await
            .expect_status(http::StatusCode::NOT_FOUND)
            .expect_error("not found")
            .await;
    }

    test_requires_session!(route(1), serde_json::json!({"name": "x"}));
}
