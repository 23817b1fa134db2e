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

//! Operations on training reviews.

use crate::db::reviews::ReviewData;
use crate::db::{self, DbError};
use crate::driver::{Driver, DriverError, DriverResult};
use crate::model::Review;

/// Which reviews to return from a listing.  The API accepts both a member and a trail filter;
/// the member filter wins when both are present.
#[derive(Clone, Copy)]
#[cfg_attr(test, derive(Debug, PartialEq))]
pub(crate) enum ReviewFilter {
    /// All reviews, paginated.
    All {
        /// Rows to skip.
        skip: i64,
        /// Maximum rows to return.
        limit: i64,
    },

    /// Reviews belonging to one member.
    ByMember(i64),

    /// Reviews about one trail.
    ByTrail(i64),
}

/// Validates the fields of a review.  The rating validates itself at construction time.
fn validate(data: &ReviewData) -> DriverResult<()> {
    if let Some(duration_min) = data.duration_min {
        if duration_min <= 0 {
            return Err(DriverError::InvalidInput("Duration must be positive".to_owned()));
        }
    }
    if let Some(avg_heart_rate) = data.avg_heart_rate {
        if avg_heart_rate <= 0 {
            return Err(DriverError::InvalidInput(
                "Average heart rate must be positive".to_owned(),
            ));
        }
    }
    Ok(())
}

impl Driver {
    /// Creates a new review.  The referenced member and trail must exist.
    pub(crate) async fn create_review(self, data: ReviewData) -> DriverResult<Review> {
        validate(&data)?;
        match db::reviews::create_review(&mut self.db.ex().await?, data, self.clock.now_utc())
            .await
        {
            Ok(review) => Ok(review),
            Err(DbError::NotFound) => Err(DriverError::InvalidInput(
                "The referenced member or trail does not exist".to_owned(),
            )),
            Err(e) => Err(e.into()),
        }
    }

    /// Gets an existing review.
    pub(crate) async fn get_review(self, id: i64) -> DriverResult<Review> {
        let review = db::reviews::get_review_by_id(&mut self.db.ex().await?, id).await?;
        Ok(review)
    }

    /// Lists reviews according to `filter`.
    pub(crate) async fn get_reviews(self, filter: ReviewFilter) -> DriverResult<Vec<Review>> {
        let mut ex = self.db.ex().await?;
        let reviews = match filter {
            ReviewFilter::All { skip, limit } => {
                db::reviews::list_reviews(&mut ex, skip, limit).await?
            }
            ReviewFilter::ByMember(member_id) => {
                db::reviews::list_reviews_by_member(&mut ex, member_id).await?
            }
            ReviewFilter::ByTrail(trail_id) => {
                db::reviews::list_reviews_by_trail(&mut ex, trail_id).await?
            }
        };
        Ok(reviews)
    }

    /// Updates an existing review and returns its new contents.
    pub(crate) async fn update_review(self, id: i64, data: ReviewData) -> DriverResult<Review> {
        validate(&data)?;

        let mut tx = self.db.begin().await?;
        db::reviews::update_review(tx.ex(), id, &data, self.clock.now_utc()).await?;
        let review = db::reviews::get_review_by_id(tx.ex(), id).await?;
        tx.commit().await?;
        Ok(review)
    }

    /// Deletes an existing review.
    pub(crate) async fn delete_review(self, id: i64) -> DriverResult<()> {
        match db::reviews::delete_review(&mut self.db.ex().await?, id).await {
            Ok(()) => Ok(()),
            Err(DbError::NotFound) => Err(DriverError::NotFound("Review not found".to_owned())),
            Err(e) => Err(e.into()),
        }
    }
}
