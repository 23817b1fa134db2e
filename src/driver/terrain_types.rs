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

//! Operations on the terrain-type reference table.

use crate::db::terrain_types::TerrainTypeData;
use crate::db::{self, DbError};
use crate::driver::{Driver, DriverError, DriverResult};
use crate::model::TerrainType;

/// Validates the fields of a terrain type.
fn validate(data: &TerrainTypeData) -> DriverResult<()> {
    if data.name.trim().is_empty() {
        return Err(DriverError::InvalidInput("Terrain type name cannot be empty".to_owned()));
    }
    if !data.pace_factor.is_finite() || data.pace_factor <= 0.0 {
        return Err(DriverError::InvalidInput("Pace factor must be positive".to_owned()));
    }
    Ok(())
}

impl Driver {
    /// Creates a new terrain type.
    pub(crate) async fn create_terrain_type(
        self,
        data: TerrainTypeData,
    ) -> DriverResult<TerrainType> {
        validate(&data)?;
        match db::terrain_types::create_terrain_type(&mut self.db.ex().await?, data).await {
            Ok(terrain_type) => Ok(terrain_type),
            Err(DbError::AlreadyExists) => Err(DriverError::AlreadyExists(
                "A terrain type with this name already exists".to_owned(),
            )),
            Err(e) => Err(e.into()),
        }
    }

    /// Gets an existing terrain type.
    pub(crate) async fn get_terrain_type(self, id: i64) -> DriverResult<TerrainType> {
        let terrain_type =
            db::terrain_types::get_terrain_type_by_id(&mut self.db.ex().await?, id).await?;
        Ok(terrain_type)
    }

    /// Lists terrain types in display order, optionally including inactive ones.
    pub(crate) async fn get_terrain_types(
        self,
        include_inactive: bool,
    ) -> DriverResult<Vec<TerrainType>> {
        let terrain_types =
            db::terrain_types::list_terrain_types(&mut self.db.ex().await?, include_inactive)
                .await?;
        Ok(terrain_types)
    }

    /// Updates an existing terrain type and returns its new contents.
    pub(crate) async fn update_terrain_type(
        self,
        id: i64,
        data: TerrainTypeData,
    ) -> DriverResult<TerrainType> {
        validate(&data)?;

        let mut tx = self.db.begin().await?;
        db::terrain_types::update_terrain_type(tx.ex(), id, &data).await?;
        let terrain_type = db::terrain_types::get_terrain_type_by_id(tx.ex(), id).await?;
        tx.commit().await?;
        Ok(terrain_type)
    }

    /// Deletes an existing terrain type.
    pub(crate) async fn delete_terrain_type(self, id: i64) -> DriverResult<()> {
        match db::terrain_types::delete_terrain_type(&mut self.db.ex().await?, id).await {
            Ok(()) => Ok(()),
            Err(DbError::NotFound) => {
                Err(DriverError::NotFound("Terrain type not found".to_owned()))
            }
            Err(e) => Err(e.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::terrain_types::tests::terrain;
    use crate::driver::testutils::*;

    #[tokio::test]
    async fn test_create_and_list_terrain_types() {
        let context = TestContext::setup().await;

        context.driver().create_terrain_type(terrain("forest", 20, true)).await.unwrap();
        context.driver().create_terrain_type(terrain("scree", 10, true)).await.unwrap();
        context.driver().create_terrain_type(terrain("road", 30, false)).await.unwrap();

        let active = context.driver().get_terrain_types(false).await.unwrap();
        assert_eq!(
            vec!["scree".to_owned(), "forest".to_owned()],
            active.into_iter().map(|t| t.name).collect::<Vec<String>>()
        );

        let all = context.driver().get_terrain_types(true).await.unwrap();
        assert_eq!(3, all.len());
    }

    #[tokio::test]
    async fn test_create_terrain_type_validation_and_duplicates() {
        let context = TestContext::setup().await;

        let mut data = terrain("mud", 1, true);
        data.pace_factor = 0.0;
        match context.driver().create_terrain_type(data).await {
            Err(DriverError::InvalidInput(msg)) => assert!(msg.contains("Pace factor")),
            e => panic!("{:?}", e),
        }

        context.driver().create_terrain_type(terrain("mud", 1, true)).await.unwrap();
        match context.driver().create_terrain_type(terrain("mud", 2, true)).await {
            Err(DriverError::AlreadyExists(msg)) => assert!(msg.contains("terrain type")),
            e => panic!("{:?}", e),
        }
    }

    #[tokio::test]
    async fn test_terrain_type_not_found() {
        let context = TestContext::setup().await;

        match context.driver().get_terrain_type(8).await {
            Err(DriverError::NotFound(_)) => (),
            e => panic!("{:?}", e),
        }
        match context.driver().delete_terrain_type(8).await {
            Err(DriverError::NotFound(msg)) => assert!(msg.contains("Terrain type")),
            e => panic!("{:?}", e),
        }
    }
}
