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

//! API for the authenticated user to leave a team.

use crate::driver::Driver;
use crate::rest::{get_bearer_token, Envelope, RestResult};
use axum::extract::{Path, State};
use axum::http::HeaderMap;
use axum::Json;

/// POST handler for this API.
pub(crate) async fn handler(
    State(driver): State<Driver>,
    headers: HeaderMap,
    Path(team_id): Path<i64>,
) -> RestResult<Json<Envelope<()>>> {
    let user = driver.session_user(&get_bearer_token(&headers)?).await?;
    driver.leave_team(team_id, user.id).await?;
    Ok(Envelope::message("Left the team"))
}

#[cfg(test)]
mod tests {
    use crate::rest::testutils::*;
    use serde_json::json;

    fn route(team_id: i64) -> (http::Method, String) {
        (http::Method::POST, format!("/api/teams/{}/leave", team_id))
    }

    #[tokio::test]
    async fn test_ok_and_then_not_a_member() {
        let context = TestContext::setup().await;
        let (owner, owner_token) = context.create_session("founder").await;
        let (runner, runner_token) = context.create_session("runner").await;

        let team_id = OneShotBuilder::new(context.app(), (http::Method::POST, "/api/teams"))
            .with_bearer_auth(&owner_token)
            .send_json(json!({"name": "Team"}))
            .await
            .expect_status(http::StatusCode::CREATED)
            .expect_data()
            .await["id"]
            .as_i64()
            .unwrap();

        context.driver().apply_to_team(team_id, runner.id).await.unwrap();
        context.driver().approve_application(team_id, runner.id, owner.id).await.unwrap();

        OneShotBuilder::new(context.app(), route(team_id))
            .with_bearer_auth(&runner_token)
            .send_empty()
            .await
            .expect_message()
            .await;

        OneShotBuilder::new(context.app(), route(team_id))
            .with_bearer_auth(&runner_token)
            .send_empty()
            .await
            .expect_status(http::StatusCode::NOT_FOUND)
            .expect_error("Not an approved member")
            .await;
    }

    #[tokio::test]
    async fn test_owner_cannot_leave() {
        let context = TestContext::setup().await;
        let (_, owner_token) = context.create_session("founder").await;

        let team_id = OneShotBuilder::new(context.app(), (http::Method::POST, "/api/teams"))
            .with_bearer_auth(&owner_token)
            .send_json(json!({"name": "Team"}))
            .await
            .expect_status(http::StatusCode::CREATED)
            .expect_data()
            .await["id"]
            .as_i64()
            .unwrap();

        OneShotBuilder::new(context.app(), route(team_id))
            .with_bearer_auth(&owner_token)
            .send_empty()
            .await
            .expect_status(http::StatusCode::BAD_REQUEST)
            .expect_error("owner cannot leave")
            .await;
    }

    test_requires_session!(route(1));
}
