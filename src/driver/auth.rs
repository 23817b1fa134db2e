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

//! Extends the driver with the account and credential flows.

use crate::db::{self, DbError};
use crate::driver::{Driver, DriverError, DriverResult};
use crate::model::{EmailAddress, HashedPassword, Password, User, Username};
use crate::tokens::{Claims, TokenError, TokenPurpose};
use lettre::Message;
use log::info;

/// Message returned on any credential mismatch during login.  Unknown emails and wrong
/// passwords are indistinguishable on purpose.
const INVALID_CREDENTIALS: &str = "Invalid email or password";

/// Message returned when a reset token fails verification for any reason other than expiry.
const INVALID_RESET_LINK: &str = "Invalid password reset link";

/// Length of the password-hash prefix embedded in reset tokens.
const FINGERPRINT_LENGTH: usize = 16;

/// Derives the fingerprint that binds a reset token to the password hash it was issued against.
///
/// bcrypt regenerates the salt on every hash, so any successful reset changes the fingerprint
/// and invalidates all previously issued links.
fn password_fingerprint(hash: &HashedPassword) -> String {
    hash.as_str().chars().take(FINGERPRINT_LENGTH).collect()
}

impl Driver {
    /// Signs a session token for `user_id` starting now.
    fn issue_session_token(&self, user_id: i64) -> DriverResult<String> {
        let claims = Claims::session(user_id, self.clock.now_utc(), self.opts.session_max_age);
        self.tokens.sign(&claims).map_err(|e| DriverError::BackendError(e.to_string()))
    }

    /// Registers a new account and logs it in, returning the user and a session token.
    pub(crate) async fn register(
        self,
        username: Username,
        email: EmailAddress,
        password: Password,
    ) -> DriverResult<(User, String)> {
        let hash = password.validate_and_hash()?;

        let mut tx = self.db.begin().await?;
        let now = self.clock.now_utc();

        match db::users::get_user_by_email(tx.ex(), &email).await {
            Ok(_) => {
                return Err(DriverError::AlreadyExists(
                    "A user with this email already exists".to_owned(),
                ));
            }
            Err(DbError::NotFound) => (),
            Err(e) => return Err(e.into()),
        }

        let user = match db::users::create_user(tx.ex(), username, email, hash, now).await {
            Ok(user) => user,
            Err(DbError::AlreadyExists) => {
                return Err(DriverError::AlreadyExists("Username is already taken".to_owned()));
            }
            Err(e) => return Err(e.into()),
        };
        tx.commit().await?;

        let token = self.issue_session_token(user.id)?;
        Ok((user, token))
    }

    /// Validates the credentials and returns the user plus a fresh session token.
    pub(crate) async fn login(
        self,
        email: EmailAddress,
        password: Password,
    ) -> DriverResult<(User, String)> {
        let mut ex = self.db.ex().await?;

        let user = match db::users::get_user_by_email(&mut ex, &email).await {
            Ok(user) => user,
            Err(DbError::NotFound) => {
                return Err(DriverError::Unauthorized(INVALID_CREDENTIALS.to_owned()));
            }
            Err(e) => return Err(e.into()),
        };

        if !password.verify(&user.password)? {
            return Err(DriverError::Unauthorized(INVALID_CREDENTIALS.to_owned()));
        }
        if !user.is_active {
            return Err(DriverError::Unauthorized(INVALID_CREDENTIALS.to_owned()));
        }

        let token = self.issue_session_token(user.id)?;
        Ok((user, token))
    }

    /// Decodes the session in `token`, validates it and returns the user that owns it.
    pub(crate) async fn session_user(&self, token: &str) -> DriverResult<User> {
        let claims = match self.tokens.verify(token, TokenPurpose::Session, self.clock.now_utc()) {
            Ok(claims) => claims,
            Err(TokenError::Expired) => {
                return Err(DriverError::Unauthorized(
                    "Session expired; please log in again".to_owned(),
                ));
            }
            Err(TokenError::Invalid(_)) => {
                return Err(DriverError::Unauthorized("Invalid session".to_owned()));
            }
        };

        let mut ex = self.db.ex().await?;
        let user = match db::users::get_user_by_id(&mut ex, claims.sub).await {
            Ok(user) => user,
            Err(DbError::NotFound) => {
                return Err(DriverError::Unauthorized("Invalid session".to_owned()));
            }
            Err(e) => return Err(e.into()),
        };
        if !user.is_active {
            return Err(DriverError::Unauthorized("Invalid session".to_owned()));
        }
        Ok(user)
    }

    /// Issues a password-reset link for the account behind `email` and mails it out.
    ///
    /// Unknown addresses are not an error: the caller must not be able to tell whether an email
    /// is registered.
    pub(crate) async fn forgot_password(self, email: EmailAddress) -> DriverResult<()> {
        let mut ex = self.db.ex().await?;

        let user = match db::users::get_user_by_email(&mut ex, &email).await {
            Ok(user) => user,
            Err(DbError::NotFound) => {
                info!("Ignoring password reset request for unknown email");
                return Ok(());
            }
            Err(e) => return Err(e.into()),
        };

        let claims = Claims::reset(
            user.id,
            password_fingerprint(&user.password),
            self.clock.now_utc(),
            self.opts.reset_max_age,
        );
        let token = self.tokens.sign(&claims).map_err(|e| DriverError::BackendError(e.to_string()))?;
        let link =
            self.base_urls.make_frontend_url(&format!("reset-password?token={}", token));

        let to: lettre::message::Mailbox = user
            .email
            .as_str()
            .parse()
            .map_err(|e| DriverError::BackendError(format!("Cannot parse email address: {}", e)))?;
        let message = Message::builder()
            .from(self.mail_from.clone())
            .to(to)
            .subject("Reset your Trailhead password")
            .body(format!(
                "Hello {},\n\nFollow this link to choose a new password:\n\n{}\n\n\
                 The link is valid for a limited time.  If you did not request it, you can\n\
                 safely ignore this message.\n",
                user.username.as_str(),
                link
            ))
            .map_err(|e| DriverError::BackendError(format!("Failed to build message: {}", e)))?;

        self.mailer.send(message).await
    }

    /// Consumes a password-reset token and replaces the account's password.
    pub(crate) async fn reset_password(self, token: &str, password: Password) -> DriverResult<()> {
        let claims = match self.tokens.verify(token, TokenPurpose::Reset, self.clock.now_utc()) {
            Ok(claims) => claims,
            Err(TokenError::Expired) => {
                return Err(DriverError::InvalidInput(
                    "The password reset link has expired; request a new one".to_owned(),
                ));
            }
            Err(TokenError::Invalid(_)) => {
                return Err(DriverError::InvalidInput(INVALID_RESET_LINK.to_owned()));
            }
        };

        let hash = password.validate_and_hash()?;

        let mut tx = self.db.begin().await?;
        let now = self.clock.now_utc();

        let user = match db::users::get_user_by_id(tx.ex(), claims.sub).await {
            Ok(user) => user,
            Err(DbError::NotFound) => {
                return Err(DriverError::InvalidInput(INVALID_RESET_LINK.to_owned()));
            }
            Err(e) => return Err(e.into()),
        };

        if claims.fp.as_deref() != Some(password_fingerprint(&user.password).as_str()) {
            return Err(DriverError::InvalidInput(
                "The password reset link has already been used".to_owned(),
            ));
        }

        db::users::set_user_password(tx.ex(), user.id, &hash, now).await?;
        tx.commit().await?;
        Ok(())
    }
}
