//! Dealer service - public dealer directory and platform stats.

use async_trait::async_trait;
use std::sync::Arc;
use uuid::Uuid;

use crate::config::DEFAULT_DEALER_LISTINGS_LIMIT;
use crate::errors::{AppError, AppResult};
use crate::infra::repositories::entities::listing;
use crate::infra::repositories::{
    DealerProfile, DealerRepository, ListingRepository, PlatformStats, StatsRepository,
};

/// Dealer directory use cases
#[async_trait]
pub trait DealerService: Send + Sync {
    async fn verified_dealers(&self) -> AppResult<Vec<DealerProfile>>;

    async fn dealer(&self, id: Uuid) -> AppResult<DealerProfile>;

    /// Active listings shown on a dealer profile page
    async fn dealer_listings(&self, id: Uuid, limit: Option<u64>)
        -> AppResult<Vec<listing::Model>>;

    async fn platform_stats(&self) -> AppResult<PlatformStats>;
}

/// Concrete DealerService over the dealer, listings and stats repositories
pub struct DealerDirectory {
    dealers: Arc<dyn DealerRepository>,
    listings: Arc<dyn ListingRepository>,
    stats: Arc<dyn StatsRepository>,
}

impl DealerDirectory {
    pub fn new(
        dealers: Arc<dyn DealerRepository>,
        listings: Arc<dyn ListingRepository>,
        stats: Arc<dyn StatsRepository>,
    ) -> Self {
        Self {
            dealers,
            listings,
            stats,
        }
    }
}

#[async_trait]
impl DealerService for DealerDirectory {
    async fn verified_dealers(&self) -> AppResult<Vec<DealerProfile>> {
        self.dealers.verified_dealers().await
    }

    async fn dealer(&self, id: Uuid) -> AppResult<DealerProfile> {
        self.dealers.dealer_by_id(id).await?.ok_or(AppError::NotFound)
    }

    async fn dealer_listings(
        &self,
        id: Uuid,
        limit: Option<u64>,
    ) -> AppResult<Vec<listing::Model>> {
        // 404 for unknown or unverified dealers, consistent with the
        // profile endpoint
        self.dealers.dealer_by_id(id).await?.ok_or(AppError::NotFound)?;

        let limit = limit.unwrap_or(DEFAULT_DEALER_LISTINGS_LIMIT);
        self.listings.list_for_dealer(id, limit).await
    }

    async fn platform_stats(&self) -> AppResult<PlatformStats> {
        self.stats.platform_stats().await
    }
}
