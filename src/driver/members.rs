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

//! Operations on member profiles.

use crate::db::members::MemberData;
use crate::db::{self, DbError};
use crate::driver::{Driver, DriverError, DriverResult};
use crate::model::Member;

/// Validates the free-form fields of a member profile.
fn validate(data: &MemberData) -> DriverResult<()> {
    if data.name.trim().is_empty() {
        return Err(DriverError::InvalidInput("Member name cannot be empty".to_owned()));
    }
    for hr in [data.resting_hr, data.max_hr].into_iter().flatten() {
        if hr <= 0 {
            return Err(DriverError::InvalidInput("Heart rates must be positive".to_owned()));
        }
    }
    if let (Some(resting), Some(max)) = (data.resting_hr, data.max_hr) {
        if resting >= max {
            return Err(DriverError::InvalidInput(
                "Resting heart rate must be below the maximum heart rate".to_owned(),
            ));
        }
    }
    Ok(())
}

impl Driver {
    /// Creates a new member profile.
    pub(crate) async fn create_member(self, data: MemberData) -> DriverResult<Member> {
        validate(&data)?;
        let member =
            db::members::create_member(&mut self.db.ex().await?, data, self.clock.now_utc())
                .await?;
        Ok(member)
    }

    /// Gets an existing member profile.
    pub(crate) async fn get_member(self, id: i64) -> DriverResult<Member> {
        let member = db::members::get_member_by_id(&mut self.db.ex().await?, id).await?;
        Ok(member)
    }

    /// Lists member profiles with pagination.
    pub(crate) async fn get_members(self, skip: i64, limit: i64) -> DriverResult<Vec<Member>> {
        let members = db::members::list_members(&mut self.db.ex().await?, skip, limit).await?;
        Ok(members)
    }

    /// Updates an existing member profile and returns its new contents.
    pub(crate) async fn update_member(self, id: i64, data: MemberData) -> DriverResult<Member> {
        validate(&data)?;

        let mut tx = self.db.begin().await?;
        db::members::update_member(tx.ex(), id, &data, self.clock.now_utc()).await?;
        let member = db::members::get_member_by_id(tx.ex(), id).await?;
        tx.commit().await?;
        Ok(member)
    }

    /// Deletes an existing member profile.
    pub(crate) async fn delete_member(self, id: i64) -> DriverResult<()> {
        match db::members::delete_member(&mut self.db.ex().await?, id).await {
            Ok(()) => Ok(()),
            Err(DbError::NotFound) => {
                Err(DriverError::NotFound("Member not found".to_owned()))
            }
            Err(e) => Err(e.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::members::tests::minimal_member;
    use crate::driver::testutils::*;

    #[tokio::test]
    async fn test_create_and_get_member() {
        let context = TestContext::setup().await;

        let member = context
            .driver()
            .create_member(MemberData {
                name: "Jon".to_owned(),
                resting_hr: Some(50),
                max_hr: Some(190),
                notes: None,
            })
            .await
            .unwrap();

        let fetched = context.driver().get_member(member.id).await.unwrap();
        assert_eq!(member, fetched);
    }

    #[tokio::test]
    async fn test_create_member_validation() {
        let context = TestContext::setup().await;

        match context.driver().create_member(minimal_member("   ")).await {
            Err(DriverError::InvalidInput(msg)) => assert!(msg.contains("name")),
            e => panic!("{:?}", e),
        }

        let mut data = minimal_member("Jon");
        data.resting_hr = Some(190);
        data.max_hr = Some(50);
        match context.driver().create_member(data).await {
            Err(DriverError::InvalidInput(msg)) => assert!(msg.contains("Resting heart rate")),
            e => panic!("{:?}", e),
        }
    }

    #[tokio::test]
    async fn test_update_member_returns_new_contents() {
        let context = TestContext::setup().await;

        let member = context.driver().create_member(minimal_member("before")).await.unwrap();
        let updated = context
            .driver()
            .update_member(member.id, minimal_member("after"))
            .await
            .unwrap();
        assert_eq!("after", updated.name);
    }

    #[tokio::test]
    async fn test_member_not_found() {
        let context = TestContext::setup().await;

        match context.driver().get_member(123).await {
            Err(DriverError::NotFound(_)) => (),
            e => panic!("{:?}", e),
        }
        match context.driver().update_member(123, minimal_member("x")).await {
            Err(DriverError::NotFound(_)) => (),
            e => panic!("{:?}", e),
        }
        match context.driver().delete_member(123).await {
            Err(DriverError::NotFound(msg)) => assert!(msg.contains("Member")),
            e => panic!("{:?}", e),
        }
    }
}
