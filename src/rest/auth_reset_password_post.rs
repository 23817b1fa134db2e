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

//! API to consume a password-reset link and set a new password.

use crate::driver::Driver;
use crate::model::Password;
use crate::rest::{AppJson, Envelope, RestResult};
use axum::extract::State;
use axum::Json;
use serde::Deserialize;

/// Contents of a password-reset confirmation.
#[derive(Deserialize)]
pub(crate) struct ResetPasswordRequest {
    /// The token carried by the emailed link.
    token: String,

    /// The new password in the clear.
    password: Password,
}

/// POST handler for this API.
pub(crate) async fn handler(
    State(driver): State<Driver>,
    AppJson(request): AppJson<ResetPasswordRequest>,
) -> RestResult<Json<Envelope<()>>> {
    driver.reset_password(&request.token, request.password).await?;
    Ok(Envelope::message("Password updated"))
}
