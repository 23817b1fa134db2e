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

//! Test utilities for the business layer.

use crate::clocks::testutils::SettableClock;
use crate::clocks::Clock;
use crate::db::{self, Db, Executor};
use crate::driver::{AuthOptions, Driver};
use crate::model::{EmailAddress, HashedPassword, Password, User, Username};
use crate::rest::BaseUrls;
use crate::smtp::testutils::RecorderMailer;
use crate::tokens::TokenEncoder;
use std::sync::Arc;
use time::macros::datetime;

/// Signing secret used by all driver tests.
pub(crate) const TEST_SECRET: &[u8] = b"driver-test-secret";

/// State required to run driver tests against an in-memory database with a controllable clock
/// and a recording mailer.
pub(crate) struct TestContext {
    /// The in-memory database.
    pub(crate) db: Arc<dyn Db + Send + Sync>,

    /// The clock every timestamp comes from.
    pub(crate) clock: Arc<SettableClock>,

    /// Captures outgoing email.
    pub(crate) mailer: Arc<RecorderMailer>,

    /// The driver under test.
    driver: Driver,
}

impl TestContext {
    /// Initializes the test context with default authentication options.
    pub(crate) async fn setup() -> Self {
        Self::setup_with_opts(AuthOptions::default()).await
    }

    /// Initializes the test context with specific authentication options.
    pub(crate) async fn setup_with_opts(opts: AuthOptions) -> Self {
        let db = db::testutils::setup().await;
        let clock = Arc::from(SettableClock::new(datetime!(2025-03-10 07:30:00 UTC)));
        let mailer = Arc::from(RecorderMailer::default());
        let driver = Driver::new(
            db.clone(),
            clock.clone(),
            TokenEncoder::new(TEST_SECRET),
            mailer.clone(),
            Arc::from(BaseUrls::from_strs("https://api.example.com/", Some("https://example.com/"))),
            "Trailhead <no-reply@example.com>".parse().unwrap(),
            opts,
        );
        Self { db, clock, mailer, driver }
    }

    /// Returns a driver clone to invoke one operation on.
    pub(crate) fn driver(&self) -> Driver {
        self.driver.clone()
    }

    /// Returns a direct database executor to inspect or prepare state behind the driver's back.
    pub(crate) async fn ex(&self) -> Executor {
        self.db.ex().await.unwrap()
    }

    /// Inserts a user directly into the database with a properly hashed password and returns it.
    pub(crate) async fn insert_user(
        &self,
        username: &'static str,
        email: &'static str,
        password: &'static str,
    ) -> User {
        let hash = Password::new(password).unwrap().validate_and_hash().unwrap();
        self.insert_user_with_hash(username, email, hash).await
    }

    /// Inserts a user directly into the database with a raw password hash and returns it.
    pub(crate) async fn insert_user_with_hash(
        &self,
        username: &'static str,
        email: &'static str,
        hash: HashedPassword,
    ) -> User {
        db::users::create_user(
            &mut self.ex().await,
            Username::from(username),
            EmailAddress::from(email),
            hash,
            self.clock.now_utc(),
        )
        .await
        .unwrap()
    }
}
