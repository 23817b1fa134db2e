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

//! Signed token utilities.
//!
//! Sessions and password-reset links are both JWTs signed with the service
//! secret, distinguished by a `purpose` claim so one can never stand in for
//! the other.  Expiry is checked against the caller-supplied clock rather
//! than the wall clock, which keeps token lifetimes testable.

use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use time::OffsetDateTime;

/// What a token is good for.  Stored in the `purpose` claim.
#[derive(Clone, Copy, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[serde(rename_all = "lowercase")]
pub(crate) enum TokenPurpose {
    /// A login session.
    Session,

    /// A password-reset link.
    Reset,
}

/// The claims carried by our tokens.
#[derive(Debug, Deserialize, Serialize)]
pub(crate) struct Claims {
    /// Id of the user the token belongs to.
    pub(crate) sub: i64,

    /// What the token is good for.
    pub(crate) purpose: TokenPurpose,

    /// Issue time as seconds since the Unix epoch.
    pub(crate) iat: i64,

    /// Expiry time as seconds since the Unix epoch.
    pub(crate) exp: i64,

    /// Fingerprint of the user's current password hash.  Only present in reset tokens: changing
    /// the password changes the fingerprint, which is what makes a reset link single-use.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) fp: Option<String>,
}

impl Claims {
    /// Creates the claims for a login session of `user_id` starting at `now`.
    pub(crate) fn session(user_id: i64, now: OffsetDateTime, max_age: Duration) -> Self {
        Self {
            sub: user_id,
            purpose: TokenPurpose::Session,
            iat: now.unix_timestamp(),
            exp: (now + max_age).unix_timestamp(),
            fp: None,
        }
    }

    /// Creates the claims for a password-reset link for `user_id`, bound to the current password
    /// hash via `fingerprint`.
    pub(crate) fn reset(
        user_id: i64,
        fingerprint: String,
        now: OffsetDateTime,
        max_age: Duration,
    ) -> Self {
        Self {
            sub: user_id,
            purpose: TokenPurpose::Reset,
            iat: now.unix_timestamp(),
            exp: (now + max_age).unix_timestamp(),
            fp: Some(fingerprint),
        }
    }
}

/// Errors from signing or verifying tokens.
#[derive(Debug, PartialEq, thiserror::Error)]
pub(crate) enum TokenError {
    /// The token was well-formed and correctly signed but its expiry time has passed.
    #[error("Token expired")]
    Expired,

    /// Any other verification failure: bad signature, garbage input, wrong purpose.
    #[error("Invalid token: {0}")]
    Invalid(String),
}

/// Signs and verifies the service's tokens with a shared secret.
#[derive(Clone)]
pub(crate) struct TokenEncoder {
    /// Key used to sign new tokens.
    encoding: EncodingKey,

    /// Key used to verify incoming tokens.
    decoding: DecodingKey,
}

impl TokenEncoder {
    /// Creates an encoder from the shared `secret`.
    pub(crate) fn new(secret: &[u8]) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret),
            decoding: DecodingKey::from_secret(secret),
        }
    }

    /// Signs `claims` into a compact token string.
    pub(crate) fn sign(&self, claims: &Claims) -> Result<String, TokenError> {
        encode(&Header::default(), claims, &self.encoding)
            .map_err(|e| TokenError::Invalid(e.to_string()))
    }

    /// Verifies the signature of `token`, that it carries `purpose`, and that it has not expired
    /// as of `now`.  Returns the decoded claims.
    pub(crate) fn verify(
        &self,
        token: &str,
        purpose: TokenPurpose,
        now: OffsetDateTime,
    ) -> Result<Claims, TokenError> {
        let mut validation = Validation::new(Algorithm::HS256);
        // Expiry is validated below against the injected clock, not the wall clock.
        validation.validate_exp = false;
        validation.required_spec_claims.clear();

        let data = decode::<Claims>(token, &self.decoding, &validation)
            .map_err(|e| TokenError::Invalid(e.to_string()))?;

        if data.claims.purpose != purpose {
            return Err(TokenError::Invalid("Wrong token purpose".to_owned()));
        }
        if data.claims.exp <= now.unix_timestamp() {
            return Err(TokenError::Expired);
        }
        Ok(data.claims)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// A fixed instant for tests that need a stable clock.
    fn t0() -> OffsetDateTime {
        OffsetDateTime::from_unix_timestamp(1_700_000_000).unwrap()
    }

    #[test]
    fn test_session_round_trip() {
        let encoder = TokenEncoder::new(b"test-secret");
        let token = encoder
            .sign(&Claims::session(42, t0(), Duration::from_secs(3600)))
            .unwrap();

        let claims = encoder.verify(&token, TokenPurpose::Session, t0()).unwrap();
        assert_eq!(42, claims.sub);
        assert_eq!(TokenPurpose::Session, claims.purpose);
        assert_eq!(None, claims.fp);
    }

    #[test]
    fn test_reset_round_trip_carries_fingerprint() {
        let encoder = TokenEncoder::new(b"test-secret");
        let token = encoder
            .sign(&Claims::reset(7, "fp123".to_owned(), t0(), Duration::from_secs(1800)))
            .unwrap();

        let claims = encoder.verify(&token, TokenPurpose::Reset, t0()).unwrap();
        assert_eq!(7, claims.sub);
        assert_eq!(Some("fp123".to_owned()), claims.fp);
    }

    #[test]
    fn test_wrong_purpose() {
        let encoder = TokenEncoder::new(b"test-secret");
        let token = encoder
            .sign(&Claims::session(42, t0(), Duration::from_secs(3600)))
            .unwrap();

        match encoder.verify(&token, TokenPurpose::Reset, t0()) {
            Err(TokenError::Invalid(msg)) => assert!(msg.contains("purpose")),
            e => panic!("{:?}", e),
        }
    }

    #[test]
    fn test_expiry_against_supplied_clock() {
        let encoder = TokenEncoder::new(b"test-secret");
        let token = encoder
            .sign(&Claims::session(42, t0(), Duration::from_secs(1800)))
            .unwrap();

        let just_before = t0() + Duration::from_secs(1799);
        encoder.verify(&token, TokenPurpose::Session, just_before).unwrap();

        let just_after = t0() + Duration::from_secs(1800);
        assert_eq!(
            Err(TokenError::Expired),
            encoder.verify(&token, TokenPurpose::Session, just_after).map(|_| ())
        );
    }

    #[test]
    fn test_bad_signature() {
        let encoder = TokenEncoder::new(b"test-secret");
        let other = TokenEncoder::new(b"other-secret");
        let token = encoder
            .sign(&Claims::session(42, t0(), Duration::from_secs(3600)))
            .unwrap();

        match other.verify(&token, TokenPurpose::Session, t0()) {
            Err(TokenError::Invalid(_)) => (),
            e => panic!("{:?}", e),
        }
    }

    #[test]
    fn test_garbage_token() {
        let encoder = TokenEncoder::new(b"test-secret");
        match encoder.verify("not-a-token", TokenPurpose::Session, t0()) {
            Err(TokenError::Invalid(_)) => (),
            e => panic!("{:?}", e),
        }
    }
}
