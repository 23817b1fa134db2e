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

//! API to remove a member from a team.
//!
//! Removing yourself is leaving; removing anyone else needs owner or admin
//! rights.  The distinction lives in the business layer, keyed on the
//! authenticated identity.

use crate::driver::Driver;
use crate::rest::{get_bearer_token, Envelope, RestResult};
use axum::extract::{Path, State};
use axum::http::HeaderMap;
use axum::Json;

/// DELETE handler for this API.
pub(crate) async fn handler(
    State(driver): State<Driver>,
    headers: HeaderMap,
    Path((team_id, user_id)): Path<(i64, i64)>,
) -> RestResult<Json<Envelope<()>>> {
    let user = driver.session_user(&get_bearer_token(&headers)?).await?;
    driver.remove_member(team_id, user_id, user.id).await?;
    Ok(Envelope::message("Member removed from team"))
}

#[cfg(test)]
mod tests {
    use crate::rest::testutils::*;
    use serde_json::json;

    fn route(team_id: i64, user_id: i64) -> (http::Method, String) {
        (http::Method::DELETE, format!("/api/teams/{}/members/{}", team_id, user_id))
    }

    /// Creates a team with one approved member; returns (team id, member user id, owner token,
    /// member token).
    async fn approved_member_fixture(context: &TestContext) -> (i64, i64, String, String) {
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

        (team_id, runner.id, owner_token, runner_token)
    }

    #[tokio::test]
    async fn test_admin_removal() {
        let context = TestContext::setup().await;
        let (team_id, runner_id, owner_token, _) = approved_member_fixture(&context).await;

        OneShotBuilder::new(context.app(), route(team_id, runner_id))
            .with_bearer_auth(&owner_token)
            .send_empty()
            .await
            .expect_message()
            .await;

        // The member must be gone from the approved listing.
        let data = OneShotBuilder::new(
            context.app(),
            (http::Method::GET, format!("/api/teams/{}/members", team_id)),
        )
        .with_query([("status", "approved")])
        .with_bearer_auth(&owner_token)
        .send_empty()
        .await
        .expect_data()
        .await;
        assert!(data.as_array().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_self_removal_is_leaving() {
        let context = TestContext::setup().await;
        let (team_id, runner_id, _, runner_token) = approved_member_fixture(&context).await;

        OneShotBuilder::new(context.app(), route(team_id, runner_id))
            .with_bearer_auth(&runner_token)
            .send_empty()
            .await
            .expect_message()
            .await;
    }

    #[tokio::test]
    async fn test_outsider_cannot_remove() {
        let context = TestContext::setup().await;
        let (team_id, runner_id, _, _) = approved_member_fixture(&context).await;
        let (_, outsider_token) = context.create_session("outsider").await;

        OneShotBuilder::new(context.app(), route(team_id, runner_id))
            .with_bearer_auth(&outsider_token)
            .send_empty()
            .await
            .expect_status(http::StatusCode::FORBIDDEN)
            .expect_error("owner or an admin")
            .await;
    }

    #[tokio::test]
    async fn test_not_a_member() {
        let context = TestContext::setup().await;
        let (team_id, _, owner_token, _) = approved_member_fixture(&context).await;
        let (outsider, _) = context.create_session("outsider").await;

        OneShotBuilder::new(context.app(), route(team_id, outsider.id))
            .with_bearer_auth(&owner_token)
            .send_empty()
            .await
            .expect_status(http::StatusCode::NOT_FOUND)
            .expect_error("Not an approved member")
            .await;
    }

    test_requires_session!(route(1, 2));
}
