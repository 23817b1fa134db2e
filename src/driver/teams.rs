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

//! Operations on teams and the membership workflow.
//!
//! All privileged transitions check the acting user against the team before
//! mutating anything: the route handlers supply the authenticated identity
//! and make no policy decisions themselves.  Multi-step operations run
//! inside one transaction so that the check and the mutation see the same
//! state.

use crate::db::{self, DbError, Executor};
use crate::driver::{Driver, DriverError, DriverResult};
use crate::model::{MembershipStatus, Team, TeamMember, TeamMemberInfo, TeamMembership, TeamRole};

/// Validates the caller-editable fields of a team.
fn validate(name: &str) -> DriverResult<()> {
    if name.trim().is_empty() {
        return Err(DriverError::InvalidInput("Team name cannot be empty".to_owned()));
    }
    Ok(())
}

/// Checks that `acting` may administer `team`: they must be the owner or an approved admin.
async fn ensure_team_admin(ex: &mut Executor, team: &Team, acting: i64) -> DriverResult<()> {
    if team.owner_id == acting {
        return Ok(());
    }

    match db::teams::get_membership(ex, team.id, acting).await {
        Ok(TeamMember { role: TeamRole::Admin, status: MembershipStatus::Approved, .. }) => Ok(()),
        Ok(_) | Err(DbError::NotFound) => Err(DriverError::Forbidden(
            "Only the team owner or an admin can do this".to_owned(),
        )),
        Err(e) => Err(e.into()),
    }
}

/// Fetches `team_id` or reports a not-found error with a friendly message.
async fn get_existing_team(ex: &mut Executor, team_id: i64) -> DriverResult<Team> {
    match db::teams::get_team_by_id(ex, team_id).await {
        Ok(team) => Ok(team),
        Err(DbError::NotFound) => Err(DriverError::NotFound("Team not found".to_owned())),
        Err(e) => Err(e.into()),
    }
}

impl Driver {
    /// Creates a new team owned by the acting user.
    pub(crate) async fn create_team(
        self,
        acting: i64,
        name: &str,
        description: Option<&str>,
    ) -> DriverResult<Team> {
        validate(name)?;
        let team = db::teams::create_team(
            &mut self.db.ex().await?,
            acting,
            name,
            description,
            self.clock.now_utc(),
        )
        .await?;
        Ok(team)
    }

    /// Gets an existing team.
    pub(crate) async fn get_team(self, id: i64) -> DriverResult<Team> {
        get_existing_team(&mut self.db.ex().await?, id).await
    }

    /// Lists teams with pagination.
    pub(crate) async fn get_teams(self, skip: i64, limit: i64) -> DriverResult<Vec<Team>> {
        let teams = db::teams::list_teams(&mut self.db.ex().await?, skip, limit).await?;
        Ok(teams)
    }

    /// Updates a team's name and description.  Restricted to the owner and admins.
    pub(crate) async fn update_team(
        self,
        id: i64,
        acting: i64,
        name: &str,
        description: Option<&str>,
    ) -> DriverResult<Team> {
        validate(name)?;

        let mut tx = self.db.begin().await?;
        let team = get_existing_team(tx.ex(), id).await?;
        ensure_team_admin(tx.ex(), &team, acting).await?;
        db::teams::update_team(tx.ex(), id, name, description, self.clock.now_utc()).await?;
        let team = get_existing_team(tx.ex(), id).await?;
        tx.commit().await?;
        Ok(team)
    }

    /// Deletes a team and all its membership rows.  Restricted to the owner.
    pub(crate) async fn delete_team(self, id: i64, acting: i64) -> DriverResult<()> {
        let mut tx = self.db.begin().await?;
        let team = get_existing_team(tx.ex(), id).await?;
        if team.owner_id != acting {
            return Err(DriverError::Forbidden(
                "Only the team owner can delete the team".to_owned(),
            ));
        }
        db::teams::delete_team(tx.ex(), id).await?;
        tx.commit().await?;
        Ok(())
    }

    /// Files the acting user's application to join `team_id`.
    ///
    /// Any existing row for the pair, whatever its status, makes this a duplicate: pending and
    /// approved for obvious reasons, rejected because rejections are final unless an admin
    /// clears them.
    pub(crate) async fn apply_to_team(self, team_id: i64, acting: i64) -> DriverResult<TeamMember> {
        let mut tx = self.db.begin().await?;
        let team = get_existing_team(tx.ex(), team_id).await?;
        if team.owner_id == acting {
            return Err(DriverError::InvalidInput(
                "The team owner cannot apply to their own team".to_owned(),
            ));
        }

        let membership =
            match db::teams::create_application(tx.ex(), team_id, acting, self.clock.now_utc())
                .await
            {
                Ok(membership) => membership,
                Err(DbError::AlreadyExists) => {
                    return Err(DriverError::AlreadyExists(
                        "An application or membership for this team already exists".to_owned(),
                    ));
                }
                Err(e) => return Err(e.into()),
            };
        tx.commit().await?;
        Ok(membership)
    }

    /// Approves a pending application, making the user a regular member.  Restricted to the
    /// owner and admins.
    pub(crate) async fn approve_application(
        self,
        team_id: i64,
        user_id: i64,
        acting: i64,
    ) -> DriverResult<()> {
        self.resolve_application(team_id, user_id, acting, MembershipStatus::Approved).await
    }

    /// Rejects a pending application.  The row is kept with status rejected so that the decision
    /// remains visible.  Restricted to the owner and admins.
    pub(crate) async fn reject_application(
        self,
        team_id: i64,
        user_id: i64,
        acting: i64,
    ) -> DriverResult<()> {
        self.resolve_application(team_id, user_id, acting, MembershipStatus::Rejected).await
    }

    /// Shared implementation of approve and reject.
    async fn resolve_application(
        self,
        team_id: i64,
        user_id: i64,
        acting: i64,
        verdict: MembershipStatus,
    ) -> DriverResult<()> {
        let mut tx = self.db.begin().await?;
        let team = get_existing_team(tx.ex(), team_id).await?;
        ensure_team_admin(tx.ex(), &team, acting).await?;

        match db::teams::update_membership_status(
            tx.ex(),
            team_id,
            user_id,
            MembershipStatus::Pending,
            verdict,
            TeamRole::Member,
            self.clock.now_utc(),
        )
        .await
        {
            Ok(()) => (),
            Err(DbError::NotFound) => {
                // Already resolved or never applied; the distinction is invisible to us.
                return Err(DriverError::NotFound(
                    "No pending application for this user".to_owned(),
                ));
            }
            Err(e) => return Err(e.into()),
        }
        tx.commit().await?;
        Ok(())
    }

    /// Removes the acting user's own approved membership.
    pub(crate) async fn leave_team(self, team_id: i64, acting: i64) -> DriverResult<()> {
        self.remove_member(team_id, acting, acting).await
    }

    /// Removes an approved member from a team.
    ///
    /// Members may remove themselves (leaving); removing anyone else is restricted to the owner
    /// and admins.  The owner cannot be removed because ownership is not a membership row.
    pub(crate) async fn remove_member(
        self,
        team_id: i64,
        user_id: i64,
        acting: i64,
    ) -> DriverResult<()> {
        let mut tx = self.db.begin().await?;
        let team = get_existing_team(tx.ex(), team_id).await?;

        if user_id == acting {
            if team.owner_id == acting {
                return Err(DriverError::InvalidInput(
                    "The team owner cannot leave their own team".to_owned(),
                ));
            }
        } else {
            ensure_team_admin(tx.ex(), &team, acting).await?;
        }

        match db::teams::delete_membership(tx.ex(), team_id, user_id).await {
            Ok(()) => (),
            Err(DbError::NotFound) => {
                return Err(DriverError::NotFound(
                    "Not an approved member of this team".to_owned(),
                ));
            }
            Err(e) => return Err(e.into()),
        }
        tx.commit().await?;
        Ok(())
    }

    /// Lists the members of a team, optionally filtered by membership status.
    pub(crate) async fn get_team_members(
        self,
        team_id: i64,
        status: Option<MembershipStatus>,
    ) -> DriverResult<Vec<TeamMemberInfo>> {
        let mut ex = self.db.ex().await?;
        get_existing_team(&mut ex, team_id).await?;
        let members = db::teams::list_team_members(&mut ex, team_id, status).await?;
        Ok(members)
    }

    /// Lists the teams the acting user belongs to or has applied to.
    pub(crate) async fn get_user_teams(
        self,
        acting: i64,
        status: Option<MembershipStatus>,
        role: Option<TeamRole>,
    ) -> DriverResult<Vec<TeamMembership>> {
        let memberships =
            db::teams::list_user_teams(&mut self.db.ex().await?, acting, status, role).await?;
        Ok(memberships)
    }
}
