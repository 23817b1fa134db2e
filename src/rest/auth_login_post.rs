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

//! API to create a new session for an existing account.

use crate::driver::Driver;
use crate::model::{EmailAddress, Password};
use crate::rest::auth_register_post::AuthData;
use crate::rest::{AppJson, Envelope, RestResult};
use axum::extract::State;
use axum::Json;
use serde::Deserialize;

/// Contents of a login request.
#[derive(Deserialize)]
pub(crate) struct LoginRequest {
    /// Email the account was registered with.
    email: EmailAddress,

    /// Password in the clear.
    password: Password,
}

/// POST handler for this API.
pub(crate) async fn handler(
    State(driver): State<Driver>,
    AppJson(request): AppJson<LoginRequest>,
) -> RestResult<Json<Envelope<AuthData>>> {
    let (user, token) = driver.login(request.email, request.password).await?;
    Ok(Envelope::ok(AuthData { user, token }))
}

#[cfg(test)]
mod tests {
    use crate::rest::testutils::*;
    use serde_json::json;

    fn route() -> (http::Method, &'static str) {
        (http::Method::POST, "/api/auth/login")
    }

    #[tokio::test]
    async fn test_ok() {
        let context = TestContext::setup().await;

        let (user, _) = context.create_session("amaia").await;

        let data = OneShotBuilder::new(context.app(), route())
            .send_json(json!({
                "email": "amaia@example.com",
                "password": "amaia password",
            }))
            .await
            .expect_data()
            .await;

        assert_eq!(user.id, data["user"]["id"].as_i64().unwrap());

        let whoami =
            context.driver().session_user(data["token"].as_str().unwrap()).await.unwrap();
        assert_eq!(user.id, whoami.id);
    }

    #[tokio::test]
    async fn test_bad_credentials_do_not_leak_which_part_failed() {
        let context = TestContext::setup().await;

        context.create_session("amaia").await;

        let checks = [
            json!({"email": "unknown@example.com", "password": "amaia password"}),
            json!({"email": "amaia@example.com", "password": "wrong password"}),
        ];
        for body in checks {
            OneShotBuilder::new(context.app(), route())
                .send_json(body)
                .await
                .expect_status(http::StatusCode::UNAUTHORIZED)
                .expect_error("^Invalid email or password$")
                .await;
        }
    }
}
