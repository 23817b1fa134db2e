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

//! API to create a new account.

use crate::driver::Driver;
use crate::model::{EmailAddress, Password, User, Username};
use crate::rest::{AppJson, Envelope, RestResult};
use axum::extract::State;
use axum::Json;
use serde::{Deserialize, Serialize};

/// Contents of a registration request.
#[derive(Deserialize)]
pub(crate) struct RegisterRequest {
    /// Desired login name.
    username: Username,

    /// Contact address; must be unique across accounts.
    email: EmailAddress,

    /// Password in the clear; hashed before it is stored.
    password: Password,
}

/// Payload returned after a successful registration or login.
#[derive(Serialize)]
pub(crate) struct AuthData {
    /// The account itself.  The password hash is not serialized.
    pub(crate) user: User,

    /// A fresh session token for the account.
    pub(crate) token: String,
}

/// POST handler for this API.
pub(crate) async fn handler(
    State(driver): State<Driver>,
    AppJson(request): AppJson<RegisterRequest>,
) -> RestResult<(http::StatusCode, Json<Envelope<AuthData>>)> {
    let (user, token) =
        driver.register(request.username, request.email, request.password).await?;
    Ok((http::StatusCode::CREATED, Envelope::ok(AuthData { user, token })))
}

#[cfg(test)]
mod tests {
    use crate::rest::testutils::*;
    use serde_json::json;

    fn route() -> (http::Method, &'static str) {
        (http::Method::POST, "/api/auth/register")
    }

    #[tokio::test]
    async fn test_ok() {
        let context = TestContext::setup().await;

        let data = OneShotBuilder::new(context.app(), route())
            .send_json(json!({
                "username": "amaia",
                "email": "amaia@example.com",
                "password": "correct horse",
            }))
            .await
            .expect_status(http::StatusCode::CREATED)
            .expect_data()
            .await;

        assert_eq!("amaia", data["user"]["username"]);
        assert_eq!("amaia@example.com", data["user"]["email"]);
        assert!(data["user"].get("password").is_none());

        // The returned token must open a session right away.
        let token = data["token"].as_str().unwrap();
        let user = context.driver().session_user(token).await.unwrap();
        assert_eq!(data["user"]["id"].as_i64().unwrap(), user.id);
    }

    #[tokio::test]
    async fn test_duplicate_email() {
        let context = TestContext::setup().await;

        context.create_session("amaia").await;

        OneShotBuilder::new(context.app(), route())
            .send_json(json!({
                "username": "other",
                "email": "amaia@example.com",
                "password": "correct horse",
            }))
            .await
            .expect_status(http::StatusCode::BAD_REQUEST)
            .expect_error("email already exists")
            .await;
    }

    #[tokio::test]
    async fn test_weak_password() {
        let context = TestContext::setup().await;

        OneShotBuilder::new(context.app(), route())
            .send_json(json!({
                "username": "amaia",
                "email": "amaia@example.com",
                "password": "short",
            }))
            .await
            .expect_status(http::StatusCode::BAD_REQUEST)
            .expect_error("Weak password")
            .await;
    }

    #[tokio::test]
    async fn test_malformed_email_is_enveloped() {
        let context = TestContext::setup().await;

        OneShotBuilder::new(context.app(), route())
            .send_json(json!({
                "username": "amaia",
                "email": "not an email",
                "password": "correct horse",
            }))
            .await
            .expect_status(http::StatusCode::BAD_REQUEST)
            .expect_error("valid address")
            .await;
    }

    #[tokio::test]
    async fn test_payload_must_be_json() {
        let context = TestContext::setup().await;

        OneShotBuilder::new(context.app(), route())
            .send_text("this is not json")
            .await
            .expect_status(http::StatusCode::BAD_REQUEST)
            .expect_error("Content-Type")
            .await;
    }
}
