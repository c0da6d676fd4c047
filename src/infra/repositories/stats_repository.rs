//! Platform-wide counters.

use async_trait::async_trait;
use sea_orm::{ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter};
use serde::Serialize;
use utoipa::ToSchema;

use super::entities::{listing, user};
use crate::domain::{ListingStatus, UserRole};
use crate::errors::AppResult;

#[derive(Debug, Clone, Copy, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PlatformStats {
    pub total_listings: u64,
    pub total_dealers: u64,
    pub total_users: u64,
}

#[async_trait]
pub trait StatsRepository: Send + Sync {
    /// Active listings, verified dealers and users, counted separately
    async fn platform_stats(&self) -> AppResult<PlatformStats>;
}

pub struct StatsStore {
    db: DatabaseConnection,
}

impl StatsStore {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

#[async_trait]
impl StatsRepository for StatsStore {
    async fn platform_stats(&self) -> AppResult<PlatformStats> {
        let total_listings = listing::Entity::find()
            .filter(listing::Column::Status.eq(ListingStatus::Active))
            .count(&self.db)
            .await?;

        let total_dealers = user::Entity::find()
            .filter(user::Column::Role.eq(UserRole::Dealer))
            .filter(user::Column::IsDealerVerified.eq(true))
            .count(&self.db)
            .await?;

        let total_users = user::Entity::find().count(&self.db).await?;

        Ok(PlatformStats {
            total_listings,
            total_dealers,
            total_users,
        })
    }
}
