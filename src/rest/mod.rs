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

//! Entry point to the REST server.
//!
//! Every API lives in its own `<entity>_<method>.rs` file together with its
//! integration tests, which drive the full router in-process.  All responses
//! share the `{success, data|message}` envelope; errors acquire their HTTP
//! status code here and nowhere else.

use crate::driver::{Driver, DriverError};
use crate::model::ModelError;
use async_trait::async_trait;
use axum::extract::{FromRequest, Request};
use axum::http::header::AsHeaderName;
use axum::http::{HeaderMap, HeaderValue};
use axum::response::IntoResponse;
use axum::{Json, Router};
use log::error;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::sync::Arc;
use tower_http::cors::CorsLayer;

mod auth_forgot_password_post;
mod auth_login_post;
mod auth_register_post;
mod auth_reset_password_post;
mod base_urls;
pub(crate) use base_urls::BaseUrls;
mod member_delete;
mod member_get;
mod member_put;
mod members_get;
mod members_post;
mod review_delete;
mod review_get;
mod review_put;
mod reviews_get;
mod reviews_post;
mod team_approve_post;
mod team_delete;
mod team_get;
mod team_leave_post;
mod team_member_delete;
mod team_members_get;
mod team_members_post;
mod team_put;
mod team_reject_post;
mod teams_get;
mod teams_my_get;
mod teams_post;
mod terrain_type_delete;
mod terrain_type_get;
mod terrain_type_put;
mod terrain_types_get;
mod terrain_types_post;
#[cfg(test)]
pub(crate) mod testutils;
mod trail_delete;
mod trail_get;
mod trail_put;
mod trails_get;
mod trails_post;
mod uploads_get;

/// Default number of rows returned by list endpoints.
const DEFAULT_PAGE_LIMIT: i64 = 50;

/// Maximum number of rows a single list request may ask for.
const MAX_PAGE_LIMIT: i64 = 500;

/// Frontend errors.  These are the errors that are visible to the user on failed requests.
#[derive(Debug, PartialEq, thiserror::Error)]
pub(crate) enum RestError {
    /// Indicates that the caller is authenticated but not allowed to do this.
    #[error("{0}")]
    Forbidden(String),

    /// Catch-all error type for all unexpected errors.
    #[error("{0}")]
    InternalError(String),

    /// Indicates an error in the contents of the request.
    #[error("{0}")]
    InvalidRequest(String),

    /// Indicates that a requested entity does not exist.
    #[error("{0}")]
    NotFound(String),

    /// Indicates an authentication problem.
    #[error("{0}")]
    Unauthorized(String),
}

impl From<DriverError> for RestError {
    fn from(e: DriverError) -> Self {
        match e {
            DriverError::AlreadyExists(_) => RestError::InvalidRequest(e.to_string()),
            DriverError::BackendError(_) => RestError::InternalError(e.to_string()),
            DriverError::Forbidden(_) => RestError::Forbidden(e.to_string()),
            DriverError::InvalidInput(_) => RestError::InvalidRequest(e.to_string()),
            DriverError::NotFound(_) => RestError::NotFound(e.to_string()),
            DriverError::Unauthorized(_) => RestError::Unauthorized(e.to_string()),
        }
    }
}

impl From<ModelError> for RestError {
    fn from(e: ModelError) -> Self {
        RestError::InvalidRequest(e.to_string())
    }
}

impl IntoResponse for RestError {
    fn into_response(self) -> axum::response::Response {
        let status;
        let mut headers = HeaderMap::new();
        let message;
        match self {
            RestError::Forbidden(msg) => {
                status = http::StatusCode::FORBIDDEN;
                message = msg;
            }
            RestError::InternalError(msg) => {
                // The details stay in the server log; the caller gets a generic message.
                error!("Internal error in request: {}", msg);
                status = http::StatusCode::INTERNAL_SERVER_ERROR;
                message = "Internal error".to_owned();
            }
            RestError::InvalidRequest(msg) => {
                status = http::StatusCode::BAD_REQUEST;
                message = msg;
            }
            RestError::NotFound(msg) => {
                status = http::StatusCode::NOT_FOUND;
                message = msg;
            }
            RestError::Unauthorized(msg) => {
                status = http::StatusCode::UNAUTHORIZED;
                headers.insert("WWW-Authenticate", "Bearer realm=\"trailhead\"".parse().unwrap());
                message = msg;
            }
        };

        (status, headers, Json(Envelope::<()> { success: false, data: None, message: Some(message) }))
            .into_response()
    }
}

/// Result type for this module.
pub(crate) type RestResult<T> = Result<T, RestError>;

/// The uniform response shape of every endpoint.
#[derive(Serialize)]
#[cfg_attr(test, derive(Debug, Deserialize))]
pub(crate) struct Envelope<T> {
    /// Whether the request succeeded.
    pub(crate) success: bool,

    /// Payload of a successful request, if it has one.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) data: Option<T>,

    /// Human-readable message: the outcome of data-less operations, or the error description.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) message: Option<String>,
}

impl<T> Envelope<T> {
    /// Wraps the payload of a successful request.
    pub(crate) fn ok(data: T) -> Json<Self> {
        Json(Self { success: true, data: Some(data), message: None })
    }
}

impl Envelope<()> {
    /// Builds a data-less success response carrying just a `message`.
    pub(crate) fn message<S: Into<String>>(message: S) -> Json<Self> {
        Json(Self { success: true, data: None, message: Some(message.into()) })
    }
}

/// A JSON body extractor whose rejections use the error envelope.
///
/// `axum::Json` reports malformed payloads with plain-text bodies and a mix of status codes;
/// wrapping it keeps every response on this API, including deserialization failures, in the
/// uniform envelope with HTTP 400.
pub(crate) struct AppJson<T>(pub(crate) T);

#[async_trait]
impl<S, T> FromRequest<S> for AppJson<T>
where
    T: serde::de::DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = RestError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        match Json::<T>::from_request(req, state).await {
            Ok(Json(value)) => Ok(AppJson(value)),
            Err(rejection) => Err(RestError::InvalidRequest(rejection.body_text())),
        }
    }
}

/// Extracts the header `name` from `headers` and ensures it has at most one value.
pub(crate) fn get_unique_header<K: AsHeaderName + Copy>(
    headers: &HeaderMap,
    name: K,
) -> RestResult<Option<&HeaderValue>> {
    let mut iter = headers.get_all(name).iter();
    let value = iter.next();
    if iter.next().is_some() {
        return Err(RestError::InvalidRequest(format!(
            "Header {} cannot have more than one value",
            name.as_str()
        )));
    }
    Ok(value)
}

/// Extracts the bearer token from the `Authorization` header.
pub(crate) fn get_bearer_token(headers: &HeaderMap) -> RestResult<String> {
    let value = get_unique_header(headers, &http::header::AUTHORIZATION)?
        .ok_or_else(|| RestError::Unauthorized("Not logged in".to_owned()))?;
    let value = value
        .to_str()
        .map_err(|_| RestError::Unauthorized("Invalid authorization header".to_owned()))?;
    match value.strip_prefix("Bearer ") {
        Some(token) => Ok(token.to_owned()),
        None => Err(RestError::Unauthorized("Invalid authorization scheme".to_owned())),
    }
}

/// Query parameters shared by all paginated list endpoints.
#[derive(Default, Deserialize)]
pub(crate) struct PageQuery {
    /// Rows to skip from the beginning of the listing.
    pub(crate) skip: Option<i64>,

    /// Maximum rows to return.
    pub(crate) limit: Option<i64>,
}

impl PageQuery {
    /// Validates the pagination parameters and applies the defaults.
    pub(crate) fn validate(&self) -> RestResult<(i64, i64)> {
        let skip = self.skip.unwrap_or(0);
        if skip < 0 {
            return Err(RestError::InvalidRequest("skip cannot be negative".to_owned()));
        }
        let limit = self.limit.unwrap_or(DEFAULT_PAGE_LIMIT);
        if !(1..=MAX_PAGE_LIMIT).contains(&limit) {
            return Err(RestError::InvalidRequest(format!(
                "limit must be between 1 and {}",
                MAX_PAGE_LIMIT
            )));
        }
        Ok((skip, limit))
    }
}

/// Creates the router for the application.
pub(crate) fn app(driver: Driver, uploads_dir: PathBuf) -> Router {
    use axum::routing::{delete, get, post};

    let api = Router::new()
        .route("/api/auth/register", post(auth_register_post::handler))
        .route("/api/auth/login", post(auth_login_post::handler))
        .route("/api/auth/forgot-password", post(auth_forgot_password_post::handler))
        .route("/api/auth/reset-password", post(auth_reset_password_post::handler))
        .route("/api/members", get(members_get::handler).post(members_post::handler))
        .route(
            "/api/members/:id",
            get(member_get::handler).put(member_put::handler).delete(member_delete::handler),
        )
        .route("/api/trails", get(trails_get::handler).post(trails_post::handler))
        .route(
            "/api/trails/:id",
            get(trail_get::handler).put(trail_put::handler).delete(trail_delete::handler),
        )
        .route("/api/reviews", get(reviews_get::handler).post(reviews_post::handler))
        .route(
            "/api/reviews/:id",
            get(review_get::handler).put(review_put::handler).delete(review_delete::handler),
        )
        .route(
            "/api/terrain-types",
            get(terrain_types_get::handler).post(terrain_types_post::handler),
        )
        .route(
            "/api/terrain-types/:id",
            get(terrain_type_get::handler)
                .put(terrain_type_put::handler)
                .delete(terrain_type_delete::handler),
        )
        .route("/api/teams", get(teams_get::handler).post(teams_post::handler))
        .route("/api/teams/my", get(teams_my_get::handler))
        .route(
            "/api/teams/:id",
            get(team_get::handler).put(team_put::handler).delete(team_delete::handler),
        )
        .route(
            "/api/teams/:id/members",
            get(team_members_get::handler).post(team_members_post::handler),
        )
        .route("/api/teams/:id/members/:user_id", delete(team_member_delete::handler))
        .route("/api/teams/:id/approve", post(team_approve_post::handler))
        .route("/api/teams/:id/reject", post(team_reject_post::handler))
        .route("/api/teams/:id/leave", post(team_leave_post::handler))
        .with_state(driver);

    let uploads = Router::new()
        .route("/api/uploads/*path", get(uploads_get::handler))
        .with_state(Arc::from(uploads_dir));

    api.merge(uploads).layer(CorsLayer::permissive())
}
