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

//! REST backend for managing trail-running training groups.
//!
//! The code is split into the usual layers: `model` holds validated domain
//! types, `db` talks to the relational store, `driver` implements the
//! business logic, and `rest` exposes the HTTP surface.  Errors float from
//! the bottom layers to the top via `?` and only become HTTP status codes
//! at the REST boundary.

// Keep these in sync with other top-level files.
#![warn(anonymous_parameters, bad_style, missing_docs)]
#![warn(unused, unused_extern_crates, unused_import_braces, unused_qualifications)]
#![warn(unsafe_code)]

use crate::clocks::SystemClock;
use crate::db::postgres::{PostgresDb, PostgresOptions};
use crate::db::Db;
use crate::driver::{AuthOptions, Driver};
use crate::rest::{app, BaseUrls};
use crate::smtp::{SmtpMailer, SmtpOptions};
use crate::tokens::TokenEncoder;
use std::error::Error;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

pub mod clocks;
pub(crate) mod db;
pub(crate) mod driver;
pub mod env;
pub(crate) mod model;
pub(crate) mod rest;
pub(crate) mod smtp;
pub(crate) mod tokens;

use env::{get_optional_var, get_required_var};

/// Environment variable prefix for all service configuration.
const ENV_PREFIX: &str = "TRAILHEAD";

/// Instantiates all resources and serves the application on `bind_addr`.
///
/// While it'd be nice to push this responsibility to `main`, doing so would
/// force us to expose many crate-internal types to the public, which in turn
/// would make dead code detection harder.
pub async fn serve(bind_addr: impl Into<SocketAddr>) -> Result<(), Box<dyn Error>> {
    let db_opts = PostgresOptions::from_env(&format!("{}_DB", ENV_PREFIX))?;
    let db: Arc<dyn Db + Send + Sync> = Arc::from(PostgresDb::connect(db_opts).await?);
    db::init_schema(&mut db.ex().await?).await?;

    let smtp_opts = SmtpOptions::from_env(&format!("{}_SMTP", ENV_PREFIX))?;
    let mail_from = smtp_opts.from.clone();
    let mailer = SmtpMailer::connect(smtp_opts)?;

    let secret = get_required_var::<String>(ENV_PREFIX, "JWT_SECRET")?;
    let base_urls = BaseUrls::from_env(ENV_PREFIX)?;
    let uploads_dir = get_optional_var::<String>(ENV_PREFIX, "UPLOADS_DIR")?
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("uploads"));

    let driver = Driver::new(
        db.clone(),
        Arc::from(SystemClock::default()),
        TokenEncoder::new(secret.as_bytes()),
        Arc::from(mailer),
        Arc::from(base_urls),
        mail_from,
        AuthOptions::from_env(ENV_PREFIX)?,
    );
    let app = app(driver, uploads_dir);

    let listener = tokio::net::TcpListener::bind(bind_addr.into()).await?;
    axum::serve(listener, app).await?;

    db.close().await;
    Ok(())
}
