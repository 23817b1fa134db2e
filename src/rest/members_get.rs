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

//! API to list member profiles.

use crate::driver::Driver;
use crate::model::Member;
use crate::rest::{get_bearer_token, Envelope, PageQuery, RestResult};
use axum::extract::{Query, State};
use axum::http::HeaderMap;
use axum::Json;

/// GET handler for this API.
pub(crate) async fn handler(
    State(driver): State<Driver>,
    headers: HeaderMap,
    Query(page): Query<PageQuery>,
) -> RestResult<Json<Envelope<Vec<Member>>>> {
    driver.session_user(&get_bearer_token(&headers)?).await?;
    let (skip, limit) = page.validate()?;
    let members = driver.get_members(skip, limit).await?;
    Ok(Envelope::ok(members))
}

#[cfg(test)]
mod tests {
    use crate::rest::testutils::*;
    use serde_json::json;

    fn route() -> (http::Method, &'static str) {
        (http::Method::GET, "/api/members")
    }

    #[tokio::test]
    async fn test_pagination() {
        let context = TestContext::setup().await;
        let (_, token) = context.create_session("coach").await;

        for name in ["a", "b", "c"] {
            OneShotBuilder::new(context.app(), (http::Method::POST, "/api/members"))
                .with_bearer_auth(&token)
                .send_json(json!({"name": name}))
                .await
                .expect_status(http::StatusCode::CREATED)
                .expect_data()
                .await;
        }

        let data = OneShotBuilder::new(context.app(), route())
            .with_query([("skip", "1"), ("limit", "1")])
            .with_bearer_auth(&token)
            .send_empty()
            .await
            .expect_data()
            .await;
        let members = data.as_array().unwrap();
        assert_eq!(1, members.len());
        assert_eq!("b", members[0]["name"]);
    }

    #[tokio::test]
    async fn test_bad_pagination() {
        let context = TestContext::setup().await;
        let (_, token) = context.create_session("coach").await;

        OneShotBuilder::new(context.app(), route())
            .with_query([("limit", "0")])
            .with_bearer_auth(&token)
            .send_empty()
            .await
            .expect_status(http::StatusCode::BAD_REQUEST)
            .expect_error("limit must be")
            .await;
    }

    test_requires_session!(route());
}
