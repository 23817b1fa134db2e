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

//! Business logic for the service.

use crate::clocks::Clock;
use crate::db::{Db, DbError};
use crate::env::get_optional_var;
use crate::model::ModelError;
use crate::rest::BaseUrls;
use crate::smtp::Mailer;
use crate::tokens::TokenEncoder;
use lettre::message::Mailbox;
use std::sync::Arc;
use std::time::Duration;

mod auth;
mod members;
mod reviews;
pub(crate) use reviews::ReviewFilter;
mod teams;
mod terrain_types;
#[cfg(test)]
pub(crate) mod testutils;
mod trails;

/// Default value for the `SESSION_MAX_AGE` setting when not specified.
const DEFAULT_SESSION_MAX_AGE_SECONDS: u64 = 24 * 60 * 60;

/// Default value for the `RESET_MAX_AGE` setting when not specified.  Reset links are
/// deliberately short-lived.
const DEFAULT_RESET_MAX_AGE_SECONDS: u64 = 30 * 60;

/// Business logic errors.  These errors encompass backend and logical errors.
#[derive(Debug, PartialEq, thiserror::Error)]
pub(crate) enum DriverError {
    /// Indicates that a request to create an entry failed because it already exists.
    #[error("{0}")]
    AlreadyExists(String),

    /// Catch-all error type for unexpected database errors.
    #[error("{0}")]
    BackendError(String),

    /// Indicates that the caller is authenticated but not allowed to do this.
    #[error("{0}")]
    Forbidden(String),

    /// Indicates an error in the input data.
    #[error("{0}")]
    InvalidInput(String),

    /// Indicates that a requested entry does not exist.
    #[error("{0}")]
    NotFound(String),

    /// Indicates an authentication problem.
    #[error("{0}")]
    Unauthorized(String),
}

impl From<DbError> for DriverError {
    fn from(e: DbError) -> Self {
        match e {
            DbError::AlreadyExists => DriverError::AlreadyExists(e.to_string()),
            DbError::BackendError(_) => DriverError::BackendError(e.to_string()),
            DbError::DataIntegrityError(_) => DriverError::BackendError(e.to_string()),
            DbError::NotFound => DriverError::NotFound(e.to_string()),
            DbError::Unavailable => DriverError::BackendError(e.to_string()),
        }
    }
}

impl From<ModelError> for DriverError {
    fn from(e: ModelError) -> Self {
        DriverError::InvalidInput(e.to_string())
    }
}

/// Result type for this module.
pub(crate) type DriverResult<T> = Result<T, DriverError>;

/// Configuration options for the authentication flows.
#[derive(Clone, Debug)]
#[cfg_attr(test, derive(PartialEq))]
pub(crate) struct AuthOptions {
    /// The amount of time we consider sessions valid for.
    pub(crate) session_max_age: Duration,

    /// The amount of time a password-reset link stays valid for.
    pub(crate) reset_max_age: Duration,
}

impl Default for AuthOptions {
    fn default() -> Self {
        Self {
            session_max_age: Duration::from_secs(DEFAULT_SESSION_MAX_AGE_SECONDS),
            reset_max_age: Duration::from_secs(DEFAULT_RESET_MAX_AGE_SECONDS),
        }
    }
}

impl AuthOptions {
    /// Creates a new set of options from environment variables.
    pub(crate) fn from_env(prefix: &str) -> Result<Self, String> {
        Ok(Self {
            session_max_age: get_optional_var::<Duration>(prefix, "SESSION_MAX_AGE")?
                .unwrap_or_else(|| Duration::from_secs(DEFAULT_SESSION_MAX_AGE_SECONDS)),
            reset_max_age: get_optional_var::<Duration>(prefix, "RESET_MAX_AGE")?
                .unwrap_or_else(|| Duration::from_secs(DEFAULT_RESET_MAX_AGE_SECONDS)),
        })
    }
}

/// Business logic.
///
/// The public operations exposed by the driver are all "one shot": those that touch the database
/// more than once start and commit a transaction, so it's incorrect for the caller to compose two
/// separate calls.  For this reason, these operations consume the driver in an attempt to
/// minimize the possibility of executing two operations.
#[derive(Clone)]
pub(crate) struct Driver {
    /// The database that the driver uses for persistence.
    db: Arc<dyn Db + Send + Sync>,

    /// Clock instance to obtain the current time.
    clock: Arc<dyn Clock + Send + Sync>,

    /// Signer/verifier for session and password-reset tokens.
    tokens: TokenEncoder,

    /// Service to send email notifications with.
    mailer: Arc<dyn Mailer + Send + Sync>,

    /// Base URLs of the running service, used to build password-reset links.
    base_urls: Arc<BaseUrls>,

    /// Sender mailbox for outgoing email.
    mail_from: Mailbox,

    /// Options for the authentication flows.
    opts: AuthOptions,
}

impl Driver {
    /// Creates a new driver backed by the given injected components.
    pub(crate) fn new(
        db: Arc<dyn Db + Send + Sync>,
        clock: Arc<dyn Clock + Send + Sync>,
        tokens: TokenEncoder,
        mailer: Arc<dyn Mailer + Send + Sync>,
        base_urls: Arc<BaseUrls>,
        mail_from: Mailbox,
        opts: AuthOptions,
    ) -> Self {
        Self { db, clock, tokens, mailer, base_urls, mail_from, opts }
    }
}
