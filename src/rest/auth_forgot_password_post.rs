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

//! API to request a password-reset link.

use crate::driver::Driver;
use crate::model::EmailAddress;
use crate::rest::{AppJson, Envelope, RestResult};
use axum::extract::State;
use axum::Json;
use serde::Deserialize;

/// Response sent whether or not the email is registered.
const RESET_REQUESTED: &str = "If the email is registered, a reset link has been sent";

/// Contents of a password-reset request.
#[derive(Deserialize)]
pub(crate) struct ForgotPasswordRequest {
    /// Email the account was (maybe) registered with.
    email: EmailAddress,
}

/// POST handler for this API.
pub(crate) async fn handler(
    State(driver): State<Driver>,
    AppJson(request): AppJson<ForgotPasswordRequest>,
) -> RestResult<Json<Envelope<()>>> {
    driver.forgot_password(request.email).await?;
    Ok(Envelope::message(RESET_REQUESTED))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rest::testutils::*;
    use serde_json::json;

    fn route() -> (http::Method, &'static str) {
        (http::Method::POST, "/api/auth/forgot-password")
    }

    #[tokio::test]
    async fn test_known_email_sends_link() {
        let context = TestContext::setup().await;

        context.create_session("amaia").await;

        let message = OneShotBuilder::new(context.app(), route())
            .send_json(json!({"email": "amaia@example.com"}))
            .await
            .expect_message()
            .await;
        assert_eq!(RESET_REQUESTED, message);

        assert!(
            context
                .mailer
                .has_message_for("amaia@example.com", "reset-password?token=")
                .await
        );
    }

    #[tokio::test]
    async fn test_unknown_email_is_indistinguishable() {
        let context = TestContext::setup().await;

        let message = OneShotBuilder::new(context.app(), route())
            .send_json(json!({"email": "unknown@example.com"}))
            .await
            .expect_message()
            .await;
        assert_eq!(RESET_REQUESTED, message);

        assert!(context.mailer.sent().await.is_empty());
    }
}
