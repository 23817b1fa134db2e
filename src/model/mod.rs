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

//! High-level data types for the domain of the application.
//!
//! There is no logic in this layer beyond input validation: the newtypes
//! guarantee that a value that exists is well-formed.

use serde::Serialize;
use time::OffsetDateTime;

mod emailaddress;
pub(crate) use emailaddress::EmailAddress;
mod membership;
pub(crate) use membership::{MembershipStatus, TeamRole};
mod passwords;
pub(crate) use passwords::{HashedPassword, Password};
mod username;
pub(crate) use username::Username;
pub(crate) mod zones;

/// An error in the validation of model-level data.
#[derive(Debug, Eq, PartialEq, thiserror::Error)]
#[error("{0}")]
pub(crate) struct ModelError(pub(crate) String);

/// Result type for this module.
pub(crate) type ModelResult<T> = Result<T, ModelError>;

/// A registered account, including its hashed credentials.
///
/// The password hash is never serialized: responses that include a user rely
/// on this type's `Serialize` implementation.
#[derive(Clone, Serialize)]
#[cfg_attr(test, derive(Debug, PartialEq))]
pub(crate) struct User {
    /// Store-assigned identifier.
    pub(crate) id: i64,

    /// Unique login name.
    pub(crate) username: Username,

    /// Unique contact address.
    pub(crate) email: EmailAddress,

    /// Hashed password; opaque to everything but the auth flows.
    #[serde(skip_serializing)]
    pub(crate) password: HashedPassword,

    /// Whether the account can log in.
    pub(crate) is_active: bool,

    /// Creation time of the account.
    #[serde(with = "time::serde::rfc3339")]
    pub(crate) created_at: OffsetDateTime,

    /// Time of the last mutation (password changes only, at the moment).
    #[serde(with = "time::serde::rfc3339")]
    pub(crate) updated_at: OffsetDateTime,
}

/// An athlete profile.
///
/// Members are profile records, not accounts: they carry the data needed to
/// plan training (heart-rate characteristics) and are managed by coaches.
#[derive(Clone, Serialize)]
#[cfg_attr(test, derive(Debug, PartialEq))]
pub(crate) struct Member {
    /// Store-assigned identifier.
    pub(crate) id: i64,

    /// Display name of the athlete.
    pub(crate) name: String,

    /// Resting heart rate in beats per minute, if measured.
    pub(crate) resting_hr: Option<i16>,

    /// Maximum heart rate in beats per minute, if measured.
    pub(crate) max_hr: Option<i16>,

    /// Free-form coaching notes.
    pub(crate) notes: Option<String>,

    /// Creation time of the profile.
    #[serde(with = "time::serde::rfc3339")]
    pub(crate) created_at: OffsetDateTime,

    /// Time of the last update to the profile.
    #[serde(with = "time::serde::rfc3339")]
    pub(crate) updated_at: OffsetDateTime,
}

/// A route in the trail catalog.
#[derive(Clone, Serialize)]
#[cfg_attr(test, derive(Debug, PartialEq))]
pub(crate) struct Trail {
    /// Store-assigned identifier.
    pub(crate) id: i64,

    /// Name of the trail.
    pub(crate) name: String,

    /// Where the trailhead is.
    pub(crate) location: String,

    /// Total distance in kilometers.
    pub(crate) distance_km: f64,

    /// Accumulated climb in meters.
    pub(crate) elevation_gain_m: i32,

    /// Dominant terrain, free-form (see `TerrainType` for the catalog).
    pub(crate) terrain: String,

    /// Longer description, if any.
    pub(crate) description: Option<String>,

    /// Creation time of the record.
    #[serde(with = "time::serde::rfc3339")]
    pub(crate) created_at: OffsetDateTime,

    /// Time of the last update to the record.
    #[serde(with = "time::serde::rfc3339")]
    pub(crate) updated_at: OffsetDateTime,
}

/// A reference-table entry describing a terrain category and its pace impact.
#[derive(Clone, Serialize)]
#[cfg_attr(test, derive(Debug, PartialEq))]
pub(crate) struct TerrainType {
    /// Store-assigned identifier.
    pub(crate) id: i64,

    /// Display name of the terrain category.
    pub(crate) name: String,

    /// Multiplier applied to a runner's base pace on this terrain.
    pub(crate) pace_factor: f64,

    /// Position of this entry in display listings (ascending).
    pub(crate) sort_order: i32,

    /// Whether the entry is offered by default.
    pub(crate) is_active: bool,
}

/// A training review: one member's assessment of one trail outing.
#[derive(Clone, Serialize)]
#[cfg_attr(test, derive(Debug, PartialEq))]
pub(crate) struct Review {
    /// Store-assigned identifier.
    pub(crate) id: i64,

    /// The member the review belongs to.
    pub(crate) member_id: i64,

    /// The trail the review is about.
    pub(crate) trail_id: i64,

    /// Subjective rating of the outing.
    pub(crate) rating: Rating,

    /// Free-form comments.
    pub(crate) comment: Option<String>,

    /// Duration of the outing in minutes, if recorded.
    pub(crate) duration_min: Option<i32>,

    /// Average heart rate during the outing, if recorded.
    pub(crate) avg_heart_rate: Option<i16>,

    /// Creation time of the record.
    #[serde(with = "time::serde::rfc3339")]
    pub(crate) created_at: OffsetDateTime,

    /// Time of the last update to the record.
    #[serde(with = "time::serde::rfc3339")]
    pub(crate) updated_at: OffsetDateTime,
}

/// A training group owned by a user.
#[derive(Clone, Serialize)]
#[cfg_attr(test, derive(Debug, PartialEq))]
pub(crate) struct Team {
    /// Store-assigned identifier.
    pub(crate) id: i64,

    /// The user that created and administers the team.  Immutable.
    pub(crate) owner_id: i64,

    /// Display name of the team.
    pub(crate) name: String,

    /// Longer description, if any.
    pub(crate) description: Option<String>,

    /// Creation time of the team.
    #[serde(with = "time::serde::rfc3339")]
    pub(crate) created_at: OffsetDateTime,

    /// Time of the last update to the team.
    #[serde(with = "time::serde::rfc3339")]
    pub(crate) updated_at: OffsetDateTime,
}

/// A user's relationship to a team, as stored.
///
/// One row exists per (team, user) pair.  The row is created when the user
/// applies (status pending) and mutated or deleted by the workflow
/// transitions; the role only carries meaning once the status is approved.
#[derive(Clone, Serialize)]
#[cfg_attr(test, derive(Debug, PartialEq))]
pub(crate) struct TeamMember {
    /// Store-assigned identifier.
    pub(crate) id: i64,

    /// The team side of the relationship.
    pub(crate) team_id: i64,

    /// The user side of the relationship.
    pub(crate) user_id: i64,

    /// Role within the team once approved.
    pub(crate) role: TeamRole,

    /// Position in the membership workflow.
    pub(crate) status: MembershipStatus,

    /// Time the application was filed.
    #[serde(with = "time::serde::rfc3339")]
    pub(crate) created_at: OffsetDateTime,

    /// Time of the last workflow transition.
    #[serde(with = "time::serde::rfc3339")]
    pub(crate) updated_at: OffsetDateTime,
}

/// A membership row joined with the identity of the user it belongs to.
#[derive(Clone, Serialize)]
#[cfg_attr(test, derive(Debug, PartialEq))]
pub(crate) struct TeamMemberInfo {
    /// The user side of the relationship.
    pub(crate) user_id: i64,

    /// Login name of the user.
    pub(crate) username: Username,

    /// Contact address of the user.
    pub(crate) email: EmailAddress,

    /// Role within the team once approved.
    pub(crate) role: TeamRole,

    /// Position in the membership workflow.
    pub(crate) status: MembershipStatus,

    /// Time the application was filed.
    #[serde(with = "time::serde::rfc3339")]
    pub(crate) joined_at: OffsetDateTime,
}

/// A membership row joined with the team it refers to, from the user's side.
#[derive(Clone, Serialize)]
#[cfg_attr(test, derive(Debug, PartialEq))]
pub(crate) struct TeamMembership {
    /// The team the user belongs to or has applied to.
    pub(crate) team: Team,

    /// Role within the team once approved.
    pub(crate) role: TeamRole,

    /// Position in the membership workflow.
    pub(crate) status: MembershipStatus,
}

/// Newtype pattern for review ratings, which range from 1 to 5.
#[derive(Clone, Copy, Eq, Ord, PartialEq, PartialOrd, Serialize)]
#[serde(transparent)]
#[cfg_attr(test, derive(Debug))]
pub(crate) struct Rating(i16);

impl Rating {
    /// Creates a new rating from an untrusted value `n`, making sure it is in range.
    pub(crate) fn new(n: i16) -> ModelResult<Self> {
        if !(1..=5).contains(&n) {
            return Err(ModelError(format!("Rating {} must be between 1 and 5", n)));
        }
        Ok(Self(n))
    }

    /// Returns the rating as an `i16`.
    pub(crate) fn as_i16(&self) -> i16 {
        self.0
    }
}

impl<'de> serde::Deserialize<'de> for Rating {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let n = <i16 as serde::Deserialize>::deserialize(deserializer)?;
        Rating::new(n).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rating_ok() {
        assert_eq!(1, Rating::new(1).unwrap().as_i16());
        assert_eq!(5, Rating::new(5).unwrap().as_i16());
    }

    #[test]
    fn test_rating_out_of_range() {
        assert!(Rating::new(0).is_err());
        assert!(Rating::new(6).is_err());
        assert!(Rating::new(-3).is_err());
    }

    #[test]
    fn test_rating_deserialize_validates() {
        assert_eq!(Rating::new(4).unwrap(), serde_json::from_str::<Rating>("4").unwrap());
        assert!(serde_json::from_str::<Rating>("9").is_err());
    }
}
