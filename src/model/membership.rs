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

//! The `TeamRole` and `MembershipStatus` data types.

use crate::model::{ModelError, ModelResult};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// The role a user plays within a team.  Only meaningful once the membership is approved.
#[derive(Clone, Copy, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[serde(rename_all = "lowercase")]
pub(crate) enum TeamRole {
    /// The creator of the team.  Ownership is tracked on the team itself; this role exists so
    /// that listings can label the owner like any other member.
    Owner,

    /// A member that can manage applications and other members.
    Admin,

    /// A regular, approved member.
    Member,
}

impl TeamRole {
    /// Returns the stable textual representation stored in the database.
    pub(crate) fn as_str(&self) -> &'static str {
        match self {
            TeamRole::Owner => "owner",
            TeamRole::Admin => "admin",
            TeamRole::Member => "member",
        }
    }
}

impl FromStr for TeamRole {
    type Err = ModelError;

    fn from_str(s: &str) -> ModelResult<Self> {
        match s {
            "owner" => Ok(TeamRole::Owner),
            "admin" => Ok(TeamRole::Admin),
            "member" => Ok(TeamRole::Member),
            s => Err(ModelError(format!("Unknown team role '{}'", s))),
        }
    }
}

impl fmt::Display for TeamRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Position of a membership row in the application workflow.
///
/// Valid transitions are pending to approved, pending to rejected, and approved to gone (the row
/// is deleted when a member leaves or is removed).  Rejected rows are kept for auditability.
#[derive(Clone, Copy, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[serde(rename_all = "lowercase")]
pub(crate) enum MembershipStatus {
    /// Application filed, not yet resolved.
    Pending,

    /// Application accepted; the user is a member.
    Approved,

    /// Application turned down.  Terminal.
    Rejected,
}

impl MembershipStatus {
    /// Returns the stable textual representation stored in the database.
    pub(crate) fn as_str(&self) -> &'static str {
        match self {
            MembershipStatus::Pending => "pending",
            MembershipStatus::Approved => "approved",
            MembershipStatus::Rejected => "rejected",
        }
    }
}

impl FromStr for MembershipStatus {
    type Err = ModelError;

    fn from_str(s: &str) -> ModelResult<Self> {
        match s {
            "pending" => Ok(MembershipStatus::Pending),
            "approved" => Ok(MembershipStatus::Approved),
            "rejected" => Ok(MembershipStatus::Rejected),
            s => Err(ModelError(format!("Unknown membership status '{}'", s))),
        }
    }
}

impl fmt::Display for MembershipStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_teamrole_round_trip() {
        for role in [TeamRole::Owner, TeamRole::Admin, TeamRole::Member] {
            assert_eq!(role, TeamRole::from_str(role.as_str()).unwrap());
        }
        assert!(TeamRole::from_str("boss").is_err());
    }

    #[test]
    fn test_membershipstatus_round_trip() {
        for status in
            [MembershipStatus::Pending, MembershipStatus::Approved, MembershipStatus::Rejected]
        {
            assert_eq!(status, MembershipStatus::from_str(status.as_str()).unwrap());
        }
        assert!(MembershipStatus::from_str("left").is_err());
    }

    #[test]
    fn test_serde_lowercase() {
        assert_eq!("\"admin\"", serde_json::to_string(&TeamRole::Admin).unwrap());
        assert_eq!(
            MembershipStatus::Pending,
            serde_json::from_str::<MembershipStatus>("\"pending\"").unwrap()
        );
    }
}
