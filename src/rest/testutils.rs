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

//! Test utilities for the REST API.

use crate::clocks::testutils::SettableClock;
use crate::db::{self, Db, Executor};
use crate::driver::{AuthOptions, Driver};
use crate::model::{EmailAddress, Password, User, Username};
use crate::rest::{app, BaseUrls, Envelope};
use crate::smtp::testutils::RecorderMailer;
use crate::tokens::TokenEncoder;
use axum::extract::Request;
use axum::Router;
use serde::Serialize;
use std::sync::Arc;
use time::macros::datetime;
use tower::util::ServiceExt;

/// State required to run REST tests: the full router backed by an in-memory database, plus
/// direct handles on the pieces behind it.
pub(crate) struct TestContext {
    /// The in-memory database.
    pub(crate) db: Arc<dyn Db + Send + Sync>,

    /// The clock every timestamp comes from.
    pub(crate) clock: Arc<SettableClock>,

    /// Captures outgoing email.
    pub(crate) mailer: Arc<RecorderMailer>,

    /// Where the uploads passthrough serves files from.
    pub(crate) uploads_dir: tempfile::TempDir,

    /// A driver handle for preparing state without going through HTTP.
    driver: Driver,

    /// The router under test.
    app: Router,
}

impl TestContext {
    /// Initializes the test context.
    pub(crate) async fn setup() -> Self {
        let db = db::testutils::setup().await;
        let clock = Arc::from(SettableClock::new(datetime!(2025-03-10 07:30:00 UTC)));
        let mailer = Arc::from(RecorderMailer::default());
        let uploads_dir = tempfile::tempdir().unwrap();
        let driver = Driver::new(
            db.clone(),
            clock.clone(),
            TokenEncoder::new(b"rest-test-secret"),
            mailer.clone(),
            Arc::from(BaseUrls::from_strs("https://api.example.com/", Some("https://example.com/"))),
            "Trailhead <no-reply@example.com>".parse().unwrap(),
            AuthOptions::default(),
        );
        let app = app(driver.clone(), uploads_dir.path().to_path_buf());
        Self { db, clock, mailer, uploads_dir, driver, app }
    }

    /// Returns the router under test.
    pub(crate) fn app(&self) -> Router {
        self.app.clone()
    }

    /// Returns a driver clone to prepare state behind the API's back.
    pub(crate) fn driver(&self) -> Driver {
        self.driver.clone()
    }

    /// Returns a direct database executor.
    pub(crate) async fn ex(&self) -> Executor {
        self.db.ex().await.unwrap()
    }

    /// Extracts the password-reset token from the most recently sent email.
    pub(crate) async fn latest_reset_token(&self) -> String {
        let messages = self.mailer.sent().await;
        let formatted = String::from_utf8(messages.last().unwrap().formatted()).unwrap();
        // The body is quoted-printable encoded, which escapes `=` and soft-wraps long lines; decode
        // it before extracting so the token is not truncated at a line break.
        let (_, encoded_body) = formatted.split_once("\r\n\r\n").unwrap();
        let decoded_body =
            quoted_printable::decode(encoded_body, quoted_printable::ParseMode::Robust).unwrap();
        let body = String::from_utf8(decoded_body).unwrap();
        let marker = "reset-password?token=";
        let start = body.find(marker).unwrap() + marker.len();
        body[start..]
            .chars()
            .take_while(|ch| ch.is_ascii_alphanumeric() || *ch == '.' || *ch == '_' || *ch == '-')
            .collect()
    }

    /// Registers a user named `username` and returns it along with a session token.
    pub(crate) async fn create_session(&self, username: &'static str) -> (User, String) {
        let email = format!("{}@example.com", username);
        self.driver()
            .register(
                Username::new(username).unwrap(),
                EmailAddress::new(email).unwrap(),
                Password::new(format!("{} password", username)).unwrap(),
            )
            .await
            .unwrap()
    }
}

/// Creates a member and a trail to hang reviews off, behind the API's back, and returns their
/// ids.
pub(crate) async fn create_review_targets(context: &TestContext) -> (i64, i64) {
    let member = context
        .driver()
        .create_member(crate::db::members::MemberData {
            name: "runner".to_owned(),
            resting_hr: None,
            max_hr: None,
            notes: None,
        })
        .await
        .unwrap();
    let trail = context
        .driver()
        .create_trail(crate::db::trails::TrailData {
            name: "loop".to_owned(),
            location: "valley".to_owned(),
            distance_km: 10.0,
            elevation_gain_m: 400,
            terrain: "forest".to_owned(),
            description: None,
        })
        .await
        .unwrap();
    (member.id, trail.id)
}

/// Builder for a single request to the API server.
#[must_use]
pub(crate) struct OneShotBuilder {
    /// The router for the app being tested.
    app: Router,

    /// Builder for the request that will be sent to the app.
    builder: axum::http::request::Builder,
}

impl OneShotBuilder {
    /// Creates a new request against a given `method`/`uri` pair served by an `app` router.
    pub(crate) fn new<U: AsRef<str>>(app: Router, (method, uri): (http::Method, U)) -> Self {
        let builder = Request::builder().method(method).uri(uri.as_ref());
        Self { app, builder }
    }

    /// Extends the URI in the request with a `query`.
    pub(crate) fn with_query<Q: Serialize>(mut self, query: Q) -> Self {
        let uri = self.builder.uri_ref().unwrap().to_string();
        assert!(!uri.contains('?'), "URI already contains a query: {}", uri);
        self.builder =
            self.builder.uri(format!("{}?{}", uri, serde_urlencoded::to_string(query).unwrap()));
        self
    }

    /// Adds bearer authentication to the request.
    pub(crate) fn with_bearer_auth<T: std::fmt::Display>(mut self, token: T) -> Self {
        self.builder =
            self.builder.header(http::header::AUTHORIZATION, format!("Bearer {}", token));
        self
    }

    /// Finishes building the request and sends it with an empty payload.
    pub(crate) async fn send_empty(self) -> ResponseChecker {
        let request = self.builder.body(axum::body::Body::empty()).unwrap();
        ResponseChecker::from(self.app.oneshot(request).await.unwrap())
    }

    /// Finishes building the request and sends it with a JSON payload.
    pub(crate) async fn send_json<T: Serialize>(self, request: T) -> ResponseChecker {
        let request = self
            .builder
            .header(http::header::CONTENT_TYPE, mime::APPLICATION_JSON.as_ref())
            .body(axum::body::Body::from(serde_json::to_vec(&request).unwrap()))
            .unwrap();
        ResponseChecker::from(self.app.oneshot(request).await.unwrap())
    }

    /// Finishes building the request and sends it with a text payload.
    pub(crate) async fn send_text<T: Into<String>>(self, text: T) -> ResponseChecker {
        let request = self
            .builder
            .header(http::header::CONTENT_TYPE, mime::TEXT_PLAIN.as_ref())
            .body(axum::body::Body::from(text.into()))
            .unwrap();
        ResponseChecker::from(self.app.oneshot(request).await.unwrap())
    }
}

/// Type alias for the complex type returned by the `oneshot` function.
type HttpResponse = hyper::Response<axum::body::Body>;

/// Maximum body size for testing purposes.
const MAX_BODY_SIZE: usize = 64 * 1024;

/// Validator for the outcome of a request sent by a `OneShotBuilder`.
#[must_use]
pub(crate) struct ResponseChecker {
    /// Actual response that we received from the app.
    response: HttpResponse,

    /// Expected HTTP status code in the response above.
    exp_status: http::StatusCode,
}

impl From<HttpResponse> for ResponseChecker {
    fn from(response: HttpResponse) -> Self {
        Self { response, exp_status: http::StatusCode::OK }
    }
}

impl ResponseChecker {
    /// Sets the expected exit HTTP status to `status`.
    pub(crate) fn expect_status(mut self, status: http::StatusCode) -> Self {
        self.exp_status = status;
        self
    }

    /// Consumes the response, checking the status code and returning the parsed envelope.
    async fn into_envelope(self) -> Envelope<serde_json::Value> {
        assert_eq!(self.exp_status, self.response.status());

        let body = axum::body::to_bytes(self.response.into_body(), MAX_BODY_SIZE).await.unwrap();
        match serde_json::from_slice(&body) {
            Ok(envelope) => envelope,
            Err(e) => {
                let body = String::from_utf8_lossy(&body).into_owned();
                panic!("Invalid envelope due to {}; content was {}", e, body);
            }
        }
    }

    /// Finishes checking the response and expects a successful envelope, returning its data.
    pub(crate) async fn expect_data(self) -> serde_json::Value {
        let envelope = self.into_envelope().await;
        assert!(envelope.success, "Expected success but got: {:?}", envelope.message);
        envelope.data.expect("Successful envelope must carry data")
    }

    /// Finishes checking the response and expects a successful, data-less envelope, returning
    /// its message.
    pub(crate) async fn expect_message(self) -> String {
        let envelope = self.into_envelope().await;
        assert!(envelope.success, "Expected success but got: {:?}", envelope.message);
        assert!(envelope.data.is_none(), "Data-less envelope expected");
        envelope.message.expect("Data-less envelope must carry a message")
    }

    /// Finishes checking the response and expects a failure envelope whose message matches
    /// `exp_re`.
    pub(crate) async fn expect_error(self, exp_re: &str) {
        let envelope = self.into_envelope().await;
        assert!(!envelope.success, "Expected a failure envelope");
        let message = envelope.message.expect("Failure envelopes must carry a message");
        let re = regex::Regex::new(exp_re).unwrap();
        assert!(re.is_match(&message), "Message '{}' does not match re '{}'", message, exp_re);
    }

    /// Finishes checking the response and returns the raw body and content type for out of band
    /// validation.
    pub(crate) async fn take_raw(self) -> (String, bytes::Bytes) {
        assert_eq!(self.exp_status, self.response.status());

        let content_type = self
            .response
            .headers()
            .get(http::header::CONTENT_TYPE)
            .map(|value| value.to_str().unwrap().to_owned())
            .unwrap_or_default();
        let body = axum::body::to_bytes(self.response.into_body(), MAX_BODY_SIZE).await.unwrap();
        (content_type, body)
    }
}

/// Generates a test to verify that an API rejects requests without a valid session.
///
/// The second form passes a syntactically valid JSON `body` so that requests with a body
/// extractor reach the handler's own authentication check.
macro_rules! test_requires_session [
    ( $route:expr ) => {
        #[tokio::test]
        async fn test_requires_session() {
            let context = crate::rest::testutils::TestContext::setup().await;

            for token in [None, Some("bogus")] {
                let mut builder =
                    crate::rest::testutils::OneShotBuilder::new(context.app(), $route);
                if let Some(token) = token {
                    builder = builder.with_bearer_auth(token);
                }
                builder
                    .send_empty()
                    .await
                    .expect_status(http::StatusCode::UNAUTHORIZED)
                    .expect_error("Not logged in|Invalid session")
                    .await;
            }
        }
    };

    ( $route:expr, $body:expr ) => {
        #[tokio::test]
        async fn test_requires_session() {
            let context = crate::rest::testutils::TestContext::setup().await;

            for token in [None, Some("bogus")] {
                let mut builder =
                    crate::rest::testutils::OneShotBuilder::new(context.app(), $route);
                if let Some(token) = token {
                    builder = builder.with_bearer_auth(token);
                }
                builder
                    .send_json($body)
                    .await
                    .expect_status(http::StatusCode::UNAUTHORIZED)
                    .expect_error("Not logged in|Invalid session")
                    .await;
            }
        }
    };
];

pub(crate) use test_requires_session;
