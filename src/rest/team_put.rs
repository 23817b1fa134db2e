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

//! API to update a team's name and description.

use crate::driver::Driver;
use crate::model::Team;
use crate::rest::teams_post::TeamRequest;
use crate::rest::{get_bearer_token, AppJson, Envelope, RestResult};
use axum::extract::{Path, State};
use axum::http::HeaderMap;
use axum::Json;

/// PUT handler for this API.
pub(crate) async fn handler(
    State(driver): State<Driver>,
    headers: HeaderMap,
    Path(id): Path<i64>,
    AppJson(request): AppJson<TeamRequest>,
) -> RestResult<Json<Envelope<Team>>> {
    let user = driver.session_user(&get_bearer_token(&headers)?).await?;
    let team =
        driver.update_team(id, user.id, &request.name, request.description.as_deref()).await?;
    Ok(Envelope::ok(team))
}

#[cfg(test)]
mod tests {
    use crate::rest::testutils::*;
    use serde_json::json;

    fn route(id: i64) -> (http::Method, String) {
        (http::Method::PUT, format!("/api/teams/{}", id))
    }

    #[tokio::test]
    async fn test_owner_can_update_others_cannot() {
        let context = TestContext::setup().await;
        let (_, owner_token) = context.create_session("founder").await;
        let (_, other_token) = context.create_session("other").await;

        let id = OneShotBuilder::new(context.app(), (http::Method::POST, "/api/teams"))
            .with_bearer_auth(&owner_token)
            .send_json(json!({"name": "Before"}))
            .await
            .expect_status(http::StatusCode::CREATED)
            .expect_data()
            .await["id"]
            .as_i64()
            .unwrap();

        OneShotBuilder::new(context.app(), route(id))
            .with_bearer_auth(&other_token)
            .send_json(json!({"name": "Hijacked"}))
            .await
            .expect_status(http::StatusCode::FORBIDDEN)
            .expect_error("owner or an admin")
            .await;

        let data = OneShotBuilder::new(context.app(), route(id))
            .with_bearer_auth(&owner_token)
            .send_json(json!({"name": "After"}))
            .await
            .expect_data()
            .await;
        assert_eq!("After", data["name"]);
    }

    test_requires_session!(route(1), serde_json::json!({"name": "x"}));
}
