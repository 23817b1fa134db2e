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

//! API to create a team.  The authenticated caller becomes the owner.

use crate::driver::Driver;
use crate::model::Team;
use crate::rest::{get_bearer_token, AppJson, Envelope, RestResult};
use axum::extract::State;
use axum::http::HeaderMap;
use axum::Json;
use serde::Deserialize;

/// Contents of a team creation or update request.
#[derive(Deserialize)]
pub(crate) struct TeamRequest {
    /// Display name of the team.
    pub(crate) name: String,

    /// Longer description, if any.
    pub(crate) description: Option<String>,
}

/// POST handler for this API.
pub(crate) async fn handler(
    State(driver): State<Driver>,
    headers: HeaderMap,
    AppJson(request): AppJson<TeamRequest>,
) -> RestResult<(http::StatusCode, Json<Envelope<Team>>)> {
    let user = driver.session_user(&get_bearer_token(&headers)?).await?;
    let team =
        driver.create_team(user.id, &request.name, request.description.as_deref()).await?;
    Ok((http::StatusCode::CREATED, Envelope::ok(team)))
}

#[cfg(test)]
mod tests {
    use crate::rest::testutils::*;
    use serde_json::json;

    fn route() -> (http::Method, &'static str) {
        (http::Method::POST, "/api/teams")
    }

    #[tokio::test]
    async fn test_ok_owner_is_caller() {
        let context = TestContext::setup().await;
        let (user, token) = context.create_session("founder").await;

        let data = OneShotBuilder::new(context.app(), route())
            .with_bearer_auth(&token)
            .send_json(json!({"name": "Ridge Runners", "description": "Long stuff"}))
            .await
            .expect_status(http::StatusCode::CREATED)
            .expect_data()
            .await;

        assert_eq!("Ridge Runners", data["name"]);
        assert_eq!(user.id, data["owner_id"].as_i64().unwrap());
    }

    #[tokio::test]
    async fn test_empty_name() {
        let context = TestContext::setup().await;
        let (_, token) = context.create_session("founder").await;

        OneShotBuilder::new(context.app(), route())
            .with_bearer_auth(&token)
            .send_json(json!({"name": "  "}))
            .await
            .expect_status(http::StatusCode::BAD_REQUEST)
            .expect_error("name cannot be empty")
            .await;
    }

    test_requires_session!(route(), serde_json::json!({"name": "x"}));
}
