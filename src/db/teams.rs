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

//! Database operations for the `teams` and `team_members` tables.
//!
//! Membership rows move through a small workflow: they are born pending, get
//! approved or rejected, and approved rows disappear when the member leaves
//! or is removed.  The queries here implement each transition as a single
//! conditional statement so that a row can never skip a state: an UPDATE or
//! DELETE that matches zero rows reports `NotFound` and changes nothing.

use crate::db::{postgres, sqlite, DbError, DbResult, Executor};
use crate::model::{
    EmailAddress, MembershipStatus, Team, TeamMember, TeamMemberInfo, TeamMembership, TeamRole,
    Username,
};
use sqlx::postgres::PgRow;
use sqlx::sqlite::SqliteRow;
use sqlx::Row;
use std::str::FromStr;
use time::OffsetDateTime;

impl TryFrom<PgRow> for Team {
    type Error = DbError;

    fn try_from(row: PgRow) -> DbResult<Self> {
        let id: i64 = row.try_get("id").map_err(postgres::map_sqlx_error)?;
        let owner_id: i64 = row.try_get("owner_id").map_err(postgres::map_sqlx_error)?;
        let name: String = row.try_get("name").map_err(postgres::map_sqlx_error)?;
        let description: Option<String> =
            row.try_get("description").map_err(postgres::map_sqlx_error)?;
        let created_at: OffsetDateTime =
            row.try_get("created_at").map_err(postgres::map_sqlx_error)?;
        let updated_at: OffsetDateTime =
            row.try_get("updated_at").map_err(postgres::map_sqlx_error)?;

        Ok(Team { id, owner_id, name, description, created_at, updated_at })
    }
}

impl TryFrom<SqliteRow> for Team {
    type Error = DbError;

    fn try_from(row: SqliteRow) -> DbResult<Self> {
        let id: i64 = row.try_get("id").map_err(sqlite::map_sqlx_error)?;
        let owner_id: i64 = row.try_get("owner_id").map_err(sqlite::map_sqlx_error)?;
        let name: String = row.try_get("name").map_err(sqlite::map_sqlx_error)?;
        let description: Option<String> =
            row.try_get("description").map_err(sqlite::map_sqlx_error)?;
        let created_at: i64 = row.try_get("created_at").map_err(sqlite::map_sqlx_error)?;
        let updated_at: i64 = row.try_get("updated_at").map_err(sqlite::map_sqlx_error)?;

        Ok(Team {
            id,
            owner_id,
            name,
            description,
            created_at: sqlite::build_timestamp(created_at)?,
            updated_at: sqlite::build_timestamp(updated_at)?,
        })
    }
}

impl TryFrom<PgRow> for TeamMember {
    type Error = DbError;

    fn try_from(row: PgRow) -> DbResult<Self> {
        let id: i64 = row.try_get("id").map_err(postgres::map_sqlx_error)?;
        let team_id: i64 = row.try_get("team_id").map_err(postgres::map_sqlx_error)?;
        let user_id: i64 = row.try_get("user_id").map_err(postgres::map_sqlx_error)?;
        let role: String = row.try_get("role").map_err(postgres::map_sqlx_error)?;
        let status: String = row.try_get("status").map_err(postgres::map_sqlx_error)?;
        let created_at: OffsetDateTime =
            row.try_get("created_at").map_err(postgres::map_sqlx_error)?;
        let updated_at: OffsetDateTime =
            row.try_get("updated_at").map_err(postgres::map_sqlx_error)?;

        Ok(TeamMember {
            id,
            team_id,
            user_id,
            role: TeamRole::from_str(&role)?,
            status: MembershipStatus::from_str(&status)?,
            created_at,
            updated_at,
        })
    }
}

impl TryFrom<SqliteRow> for TeamMember {
    type Error = DbError;

    fn try_from(row: SqliteRow) -> DbResult<Self> {
        let id: i64 = row.try_get("id").map_err(sqlite::map_sqlx_error)?;
        let team_id: i64 = row.try_get("team_id").map_err(sqlite::map_sqlx_error)?;
        let user_id: i64 = row.try_get("user_id").map_err(sqlite::map_sqlx_error)?;
        let role: String = row.try_get("role").map_err(sqlite::map_sqlx_error)?;
        let status: String = row.try_get("status").map_err(sqlite::map_sqlx_error)?;
        let created_at: i64 = row.try_get("created_at").map_err(sqlite::map_sqlx_error)?;
        let updated_at: i64 = row.try_get("updated_at").map_err(sqlite::map_sqlx_error)?;

        Ok(TeamMember {
            id,
            team_id,
            user_id,
            role: TeamRole::from_str(&role)?,
            status: MembershipStatus::from_str(&status)?,
            created_at: sqlite::build_timestamp(created_at)?,
            updated_at: sqlite::build_timestamp(updated_at)?,
        })
    }
}

/// Creates a new team owned by `owner_id`, which must reference an existing user.
pub(crate) async fn create_team(
    ex: &mut Executor,
    owner_id: i64,
    name: &str,
    description: Option<&str>,
    now: OffsetDateTime,
) -> DbResult<Team> {
    let id = match ex {
        Executor::Postgres(ex) => {
            let query_str = "
                INSERT INTO teams (owner_id, name, description, created_at, updated_at)
                VALUES ($1, $2, $3, $4, $4)
                RETURNING id";
            let row = sqlx::query(query_str)
                .bind(owner_id)
                .bind(name)
                .bind(description)
                .bind(now)
                .fetch_one(ex.conn())
                .await
                .map_err(postgres::map_sqlx_error)?;
            row.try_get("id").map_err(postgres::map_sqlx_error)?
        }

        Executor::Sqlite(ex) => {
            let query_str = "
                INSERT INTO teams (owner_id, name, description, created_at, updated_at)
                VALUES (?, ?, ?, ?, ?)";
            let now_us = sqlite::unpack_timestamp(now);
            let done = sqlx::query(query_str)
                .bind(owner_id)
                .bind(name)
                .bind(description)
                .bind(now_us)
                .bind(now_us)
                .execute(ex.conn())
                .await
                .map_err(sqlite::map_sqlx_error)?;
            done.last_insert_rowid()
        }
    };

    Ok(Team {
        id,
        owner_id,
        name: name.to_owned(),
        description: description.map(str::to_owned),
        created_at: now,
        updated_at: now,
    })
}

/// Gets the team with the given `id`.
pub(crate) async fn get_team_by_id(ex: &mut Executor, id: i64) -> DbResult<Team> {
    match ex {
        Executor::Postgres(ex) => {
            let raw = sqlx::query("SELECT * FROM teams WHERE id = $1")
                .bind(id)
                .fetch_one(ex.conn())
                .await
                .map_err(postgres::map_sqlx_error)?;
            Team::try_from(raw)
        }

        Executor::Sqlite(ex) => {
            let raw = sqlx::query("SELECT * FROM teams WHERE id = ?")
                .bind(id)
                .fetch_one(ex.conn())
                .await
                .map_err(sqlite::map_sqlx_error)?;
            Team::try_from(raw)
        }
    }
}

/// Lists teams in insertion order, skipping `skip` rows and returning at most `limit`.
pub(crate) async fn list_teams(ex: &mut Executor, skip: i64, limit: i64) -> DbResult<Vec<Team>> {
    match ex {
        Executor::Postgres(ex) => {
            sqlx::query("SELECT * FROM teams ORDER BY id LIMIT $1 OFFSET $2")
                .bind(limit)
                .bind(skip)
                .fetch_all(ex.conn())
                .await
                .map_err(postgres::map_sqlx_error)?
                .into_iter()
                .map(Team::try_from)
                .collect()
        }

        Executor::Sqlite(ex) => {
            sqlx::query("SELECT * FROM teams ORDER BY id LIMIT ? OFFSET ?")
                .bind(limit)
                .bind(skip)
                .fetch_all(ex.conn())
                .await
                .map_err(sqlite::map_sqlx_error)?
                .into_iter()
                .map(Team::try_from)
                .collect()
        }
    }
}

/// Replaces the name and description of the team with the given `id`.  The owner is immutable.
pub(crate) async fn update_team(
    ex: &mut Executor,
    id: i64,
    name: &str,
    description: Option<&str>,
    now: OffsetDateTime,
) -> DbResult<()> {
    let rows_affected = match ex {
        Executor::Postgres(ex) => {
            let query_str =
                "UPDATE teams SET name = $1, description = $2, updated_at = $3 WHERE id = $4";
            let done = sqlx::query(query_str)
                .bind(name)
                .bind(description)
                .bind(now)
                .bind(id)
                .execute(ex.conn())
                .await
                .map_err(postgres::map_sqlx_error)?;
            done.rows_affected()
        }

        Executor::Sqlite(ex) => {
            let query_str =
                "UPDATE teams SET name = ?, description = ?, updated_at = ? WHERE id = ?";
            let done = sqlx::query(query_str)
                .bind(name)
                .bind(description)
                .bind(sqlite::unpack_timestamp(now))
                .bind(id)
                .execute(ex.conn())
                .await
                .map_err(sqlite::map_sqlx_error)?;
            done.rows_affected()
        }
    };

    match rows_affected {
        0 => Err(DbError::NotFound),
        1 => Ok(()),
        _ => Err(DbError::BackendError("Update affected more than one row".to_owned())),
    }
}

/// Deletes the team with the given `id`.  Membership rows go with it.
pub(crate) async fn delete_team(ex: &mut Executor, id: i64) -> DbResult<()> {
    let rows_affected = match ex {
        Executor::Postgres(ex) => {
            let done = sqlx::query("DELETE FROM teams WHERE id = $1")
                .bind(id)
                .execute(ex.conn())
                .await
                .map_err(postgres::map_sqlx_error)?;
            done.rows_affected()
        }

        Executor::Sqlite(ex) => {
            let done = sqlx::query("DELETE FROM teams WHERE id = ?")
                .bind(id)
                .execute(ex.conn())
                .await
                .map_err(sqlite::map_sqlx_error)?;
            done.rows_affected()
        }
    };

    match rows_affected {
        0 => Err(DbError::NotFound),
        1 => Ok(()),
        _ => Err(DbError::BackendError("Delete affected more than one row".to_owned())),
    }
}

/// Files a membership application: inserts a pending row for `(team_id, user_id)`.
///
/// The unique constraint on the pair turns a concurrent duplicate application into
/// `AlreadyExists`, so callers need no lock around the check-then-insert sequence.
pub(crate) async fn create_application(
    ex: &mut Executor,
    team_id: i64,
    user_id: i64,
    now: OffsetDateTime,
) -> DbResult<TeamMember> {
    let id = match ex {
        Executor::Postgres(ex) => {
            let query_str = "
                INSERT INTO team_members (team_id, user_id, role, status, created_at, updated_at)
                VALUES ($1, $2, $3, $4, $5, $5)
                RETURNING id";
            let row = sqlx::query(query_str)
                .bind(team_id)
                .bind(user_id)
                .bind(TeamRole::Member.as_str())
                .bind(MembershipStatus::Pending.as_str())
                .bind(now)
                .fetch_one(ex.conn())
                .await
                .map_err(postgres::map_sqlx_error)?;
            row.try_get("id").map_err(postgres::map_sqlx_error)?
        }

        Executor::Sqlite(ex) => {
            let query_str = "
                INSERT INTO team_members (team_id, user_id, role, status, created_at, updated_at)
                VALUES (?, ?, ?, ?, ?, ?)";
            let now_us = sqlite::unpack_timestamp(now);
            let done = sqlx::query(query_str)
                .bind(team_id)
                .bind(user_id)
                .bind(TeamRole::Member.as_str())
                .bind(MembershipStatus::Pending.as_str())
                .bind(now_us)
                .bind(now_us)
                .execute(ex.conn())
                .await
                .map_err(sqlite::map_sqlx_error)?;
            done.last_insert_rowid()
        }
    };

    Ok(TeamMember {
        id,
        team_id,
        user_id,
        role: TeamRole::Member,
        status: MembershipStatus::Pending,
        created_at: now,
        updated_at: now,
    })
}

/// Gets the membership row for `(team_id, user_id)`, whatever its status.
pub(crate) async fn get_membership(
    ex: &mut Executor,
    team_id: i64,
    user_id: i64,
) -> DbResult<TeamMember> {
    match ex {
        Executor::Postgres(ex) => {
            let query_str = "SELECT * FROM team_members WHERE team_id = $1 AND user_id = $2";
            let raw = sqlx::query(query_str)
                .bind(team_id)
                .bind(user_id)
                .fetch_one(ex.conn())
                .await
                .map_err(postgres::map_sqlx_error)?;
            TeamMember::try_from(raw)
        }

        Executor::Sqlite(ex) => {
            let query_str = "SELECT * FROM team_members WHERE team_id = ? AND user_id = ?";
            let raw = sqlx::query(query_str)
                .bind(team_id)
                .bind(user_id)
                .fetch_one(ex.conn())
                .await
                .map_err(sqlite::map_sqlx_error)?;
            TeamMember::try_from(raw)
        }
    }
}

/// Transitions the membership row for `(team_id, user_id)` from status `from` to status `to`,
/// assigning `role` at the same time.
///
/// Returns `NotFound` if the pair has no row in status `from`: the transition either already
/// happened or was never applicable, and the caller decides what that means.
pub(crate) async fn update_membership_status(
    ex: &mut Executor,
    team_id: i64,
    user_id: i64,
    from: MembershipStatus,
    to: MembershipStatus,
    role: TeamRole,
    now: OffsetDateTime,
) -> DbResult<()> {
    let rows_affected = match ex {
        Executor::Postgres(ex) => {
            let query_str = "
                UPDATE team_members SET status = $1, role = $2, updated_at = $3
                WHERE team_id = $4 AND user_id = $5 AND status = $6";
            let done = sqlx::query(query_str)
                .bind(to.as_str())
                .bind(role.as_str())
                .bind(now)
                .bind(team_id)
                .bind(user_id)
                .bind(from.as_str())
                .execute(ex.conn())
                .await
                .map_err(postgres::map_sqlx_error)?;
            done.rows_affected()
        }

        Executor::Sqlite(ex) => {
            let query_str = "
                UPDATE team_members SET status = ?, role = ?, updated_at = ?
                WHERE team_id = ? AND user_id = ? AND status = ?";
            let done = sqlx::query(query_str)
                .bind(to.as_str())
                .bind(role.as_str())
                .bind(sqlite::unpack_timestamp(now))
                .bind(team_id)
                .bind(user_id)
                .bind(from.as_str())
                .execute(ex.conn())
                .await
                .map_err(sqlite::map_sqlx_error)?;
            done.rows_affected()
        }
    };

    match rows_affected {
        0 => Err(DbError::NotFound),
        1 => Ok(()),
        _ => Err(DbError::BackendError("Update affected more than one row".to_owned())),
    }
}

/// Deletes the approved membership row for `(team_id, user_id)`.
///
/// Pending and rejected rows are not touched: resolving an application is a job for
/// `update_membership_status`, and rejected rows are kept on purpose.
pub(crate) async fn delete_membership(
    ex: &mut Executor,
    team_id: i64,
    user_id: i64,
) -> DbResult<()> {
    let rows_affected = match ex {
        Executor::Postgres(ex) => {
            let query_str = "
                DELETE FROM team_members
                WHERE team_id = $1 AND user_id = $2 AND status = $3";
            let done = sqlx::query(query_str)
                .bind(team_id)
                .bind(user_id)
                .bind(MembershipStatus::Approved.as_str())
                .execute(ex.conn())
                .await
                .map_err(postgres::map_sqlx_error)?;
            done.rows_affected()
        }

        Executor::Sqlite(ex) => {
            let query_str = "
                DELETE FROM team_members
                WHERE team_id = ? AND user_id = ? AND status = ?";
            let done = sqlx::query(query_str)
                .bind(team_id)
                .bind(user_id)
                .bind(MembershipStatus::Approved.as_str())
                .execute(ex.conn())
                .await
                .map_err(sqlite::map_sqlx_error)?;
            done.rows_affected()
        }
    };

    match rows_affected {
        0 => Err(DbError::NotFound),
        1 => Ok(()),
        _ => Err(DbError::BackendError("Delete affected more than one row".to_owned())),
    }
}

/// Lists the membership rows of `team_id` joined with each user's identity, optionally filtered
/// by `status`.
pub(crate) async fn list_team_members(
    ex: &mut Executor,
    team_id: i64,
    status: Option<MembershipStatus>,
) -> DbResult<Vec<TeamMemberInfo>> {
    /// Decodes one joined row into a `TeamMemberInfo` given already-extracted columns.
    fn build(
        user_id: i64,
        username: String,
        email: String,
        role: String,
        status: String,
        joined_at: OffsetDateTime,
    ) -> DbResult<TeamMemberInfo> {
        Ok(TeamMemberInfo {
            user_id,
            username: Username::new(username)?,
            email: EmailAddress::new(email)?,
            role: TeamRole::from_str(&role)?,
            status: MembershipStatus::from_str(&status)?,
            joined_at,
        })
    }

    match ex {
        Executor::Postgres(ex) => {
            let mut query_str = "
                SELECT tm.user_id, u.username, u.email, tm.role, tm.status, tm.created_at
                FROM team_members tm JOIN users u ON u.id = tm.user_id
                WHERE tm.team_id = $1"
                .to_owned();
            if status.is_some() {
                query_str.push_str(" AND tm.status = $2");
            }
            query_str.push_str(" ORDER BY tm.id");

            let mut query = sqlx::query(&query_str).bind(team_id);
            if let Some(status) = status {
                query = query.bind(status.as_str());
            }

            let rows =
                query.fetch_all(ex.conn()).await.map_err(postgres::map_sqlx_error)?;
            let mut members = Vec::with_capacity(rows.len());
            for row in rows {
                members.push(build(
                    row.try_get("user_id").map_err(postgres::map_sqlx_error)?,
                    row.try_get("username").map_err(postgres::map_sqlx_error)?,
                    row.try_get("email").map_err(postgres::map_sqlx_error)?,
                    row.try_get("role").map_err(postgres::map_sqlx_error)?,
                    row.try_get("status").map_err(postgres::map_sqlx_error)?,
                    row.try_get("created_at").map_err(postgres::map_sqlx_error)?,
                )?);
            }
            Ok(members)
        }

        Executor::Sqlite(ex) => {
            let mut query_str = "
                SELECT tm.user_id, u.username, u.email, tm.role, tm.status, tm.created_at
                FROM team_members tm JOIN users u ON u.id = tm.user_id
                WHERE tm.team_id = ?"
                .to_owned();
            if status.is_some() {
                query_str.push_str(" AND tm.status = ?");
            }
            query_str.push_str(" ORDER BY tm.id");

            let mut query = sqlx::query(&query_str).bind(team_id);
            if let Some(status) = status {
                query = query.bind(status.as_str());
            }

            let rows = query.fetch_all(ex.conn()).await.map_err(sqlite::map_sqlx_error)?;
            let mut members = Vec::with_capacity(rows.len());
            for row in rows {
                let joined_at: i64 =
                    row.try_get("created_at").map_err(sqlite::map_sqlx_error)?;
                members.push(build(
                    row.try_get("user_id").map_err(sqlite::map_sqlx_error)?,
                    row.try_get("username").map_err(sqlite::map_sqlx_error)?,
                    row.try_get("email").map_err(sqlite::map_sqlx_error)?,
                    row.try_get("role").map_err(sqlite::map_sqlx_error)?,
                    row.try_get("status").map_err(sqlite::map_sqlx_error)?,
                    sqlite::build_timestamp(joined_at)?,
                )?);
            }
            Ok(members)
        }
    }
}

/// Lists the teams `user_id` has a membership row in, joined with the team details and
/// optionally filtered by membership `status` and `role`.
pub(crate) async fn list_user_teams(
    ex: &mut Executor,
    user_id: i64,
    status: Option<MembershipStatus>,
    role: Option<TeamRole>,
) -> DbResult<Vec<TeamMembership>> {
    match ex {
        Executor::Postgres(ex) => {
            let mut query_str = "
                SELECT t.id, t.owner_id, t.name, t.description, t.created_at, t.updated_at,
                       tm.role, tm.status
                FROM team_members tm JOIN teams t ON t.id = tm.team_id
                WHERE tm.user_id = $1"
                .to_owned();
            let mut next_param = 2;
            if status.is_some() {
                query_str.push_str(&format!(" AND tm.status = ${}", next_param));
                next_param += 1;
            }
            if role.is_some() {
                query_str.push_str(&format!(" AND tm.role = ${}", next_param));
            }
            query_str.push_str(" ORDER BY t.id");

            let mut query = sqlx::query(&query_str).bind(user_id);
            if let Some(status) = status {
                query = query.bind(status.as_str());
            }
            if let Some(role) = role {
                query = query.bind(role.as_str());
            }

            let rows =
                query.fetch_all(ex.conn()).await.map_err(postgres::map_sqlx_error)?;
            let mut teams = Vec::with_capacity(rows.len());
            for row in rows {
                let role: String = row.try_get("role").map_err(postgres::map_sqlx_error)?;
                let status: String = row.try_get("status").map_err(postgres::map_sqlx_error)?;
                teams.push(TeamMembership {
                    team: Team::try_from(row)?,
                    role: TeamRole::from_str(&role)?,
                    status: MembershipStatus::from_str(&status)?,
                });
            }
            Ok(teams)
        }

        Executor::Sqlite(ex) => {
            let mut query_str = "
                SELECT t.id, t.owner_id, t.name, t.description, t.created_at, t.updated_at,
                       tm.role, tm.status
                FROM team_members tm JOIN teams t ON t.id = tm.team_id
                WHERE tm.user_id = ?"
                .to_owned();
            if status.is_some() {
                query_str.push_str(" AND tm.status = ?");
            }
            if role.is_some() {
                query_str.push_str(" AND tm.role = ?");
            }
            query_str.push_str(" ORDER BY t.id");

            let mut query = sqlx::query(&query_str).bind(user_id);
            if let Some(status) = status {
                query = query.bind(status.as_str());
            }
            if let Some(role) = role {
                query = query.bind(role.as_str());
            }

            let rows = query.fetch_all(ex.conn()).await.map_err(sqlite::map_sqlx_error)?;
            let mut teams = Vec::with_capacity(rows.len());
            for row in rows {
                let role: String = row.try_get("role").map_err(sqlite::map_sqlx_error)?;
                let status: String = row.try_get("status").map_err(sqlite::map_sqlx_error)?;
                teams.push(TeamMembership {
                    team: Team::try_from(row)?,
                    role: TeamRole::from_str(&role)?,
                    status: MembershipStatus::from_str(&status)?,
                });
            }
            Ok(teams)
        }
    }
}
