//! Engagement service - saved listings and view tracking.

use async_trait::async_trait;
use std::sync::Arc;
use uuid::Uuid;

use crate::config::EVENT_LISTING_VIEW;
use crate::errors::{AppError, AppResult};
use crate::infra::repositories::entities::listing;
use crate::infra::repositories::{
    AnalyticsRepository, FavoriteRepository, ListingRepository, NewEvent,
};

/// Context captured alongside a recorded view
#[derive(Debug, Clone, Default)]
pub struct ViewContext {
    pub user_id: Option<Uuid>,
    pub ip_address: Option<String>,
    pub user_agent: Option<String>,
}

/// Saved-listing and view-tracking use cases
#[async_trait]
pub trait EngagementService: Send + Sync {
    /// Save an active listing to the user's favorites; idempotent
    async fn save_listing(&self, user_id: Uuid, listing_id: Uuid) -> AppResult<()>;

    async fn unsave_listing(&self, user_id: Uuid, listing_id: Uuid) -> AppResult<()>;

    /// The user's saved listings, most recently saved first
    async fn saved_listings(&self, user_id: Uuid) -> AppResult<Vec<listing::Model>>;

    async fn is_saved(&self, user_id: Uuid, listing_id: Uuid) -> AppResult<bool>;

    /// Best-effort view event; failures are logged, never surfaced
    async fn record_view(&self, listing_id: Uuid, context: ViewContext);

    /// View count of one of the caller's own listings
    async fn listing_views(&self, user_id: Uuid, listing_id: Uuid) -> AppResult<u64>;
}

/// Concrete EngagementService over the favorites, analytics and
/// listings repositories
pub struct EngagementTracker {
    favorites: Arc<dyn FavoriteRepository>,
    analytics: Arc<dyn AnalyticsRepository>,
    listings: Arc<dyn ListingRepository>,
}

impl EngagementTracker {
    pub fn new(
        favorites: Arc<dyn FavoriteRepository>,
        analytics: Arc<dyn AnalyticsRepository>,
        listings: Arc<dyn ListingRepository>,
    ) -> Self {
        Self {
            favorites,
            analytics,
            listings,
        }
    }
}

#[async_trait]
impl EngagementService for EngagementTracker {
    async fn save_listing(&self, user_id: Uuid, listing_id: Uuid) -> AppResult<()> {
        // Only live listings can be saved
        self.listings
            .find_public(listing_id)
            .await?
            .ok_or(AppError::NotFound)?;

        self.favorites.add(user_id, listing_id).await
    }

    async fn unsave_listing(&self, user_id: Uuid, listing_id: Uuid) -> AppResult<()> {
        if self.favorites.remove(user_id, listing_id).await? {
            Ok(())
        } else {
            Err(AppError::NotFound)
        }
    }

    async fn saved_listings(&self, user_id: Uuid) -> AppResult<Vec<listing::Model>> {
        self.favorites.listings_for_user(user_id).await
    }

    async fn is_saved(&self, user_id: Uuid, listing_id: Uuid) -> AppResult<bool> {
        self.favorites.is_saved(user_id, listing_id).await
    }

    async fn record_view(&self, listing_id: Uuid, context: ViewContext) {
        let event = NewEvent {
            listing_id,
            user_id: context.user_id,
            event_type: EVENT_LISTING_VIEW.to_string(),
            metadata: None,
            ip_address: context.ip_address,
            user_agent: context.user_agent,
        };

        if let Err(e) = self.analytics.record(event).await {
            tracing::warn!("failed to record listing view: {}", e);
        }
    }

    async fn listing_views(&self, user_id: Uuid, listing_id: Uuid) -> AppResult<u64> {
        // Owner-scoped; someone else's listing reads as missing
        self.listings
            .find_for_user(listing_id, user_id)
            .await?
            .ok_or(AppError::NotFound)?;

        self.analytics
            .event_count(listing_id, EVENT_LISTING_VIEW)
            .await
    }
}
