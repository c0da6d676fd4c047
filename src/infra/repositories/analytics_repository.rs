//! Analytics repository - append-only listing engagement events.

use async_trait::async_trait;
use chrono::Utc;
use sea_orm::{ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter, Set};
use uuid::Uuid;

use super::entities::analytics;
use crate::errors::AppResult;

/// Column values for a new analytics event
#[derive(Debug, Clone)]
pub struct NewEvent {
    pub listing_id: Uuid,
    pub user_id: Option<Uuid>,
    pub event_type: String,
    pub metadata: Option<serde_json::Value>,
    pub ip_address: Option<String>,
    pub user_agent: Option<String>,
}

/// Engagement event data access
#[async_trait]
pub trait AnalyticsRepository: Send + Sync {
    async fn record(&self, event: NewEvent) -> AppResult<()>;

    /// Events of one type recorded against a listing
    async fn event_count(&self, listing_id: Uuid, event_type: &str) -> AppResult<u64>;
}

/// SeaORM-backed analytics repository
pub struct AnalyticsStore {
    db: DatabaseConnection,
}

impl AnalyticsStore {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

#[async_trait]
impl AnalyticsRepository for AnalyticsStore {
    async fn record(&self, event: NewEvent) -> AppResult<()> {
        let active = analytics::ActiveModel {
            id: Set(Uuid::new_v4()),
            listing_id: Set(event.listing_id),
            user_id: Set(event.user_id),
            event_type: Set(event.event_type),
            metadata: Set(event.metadata),
            ip_address: Set(event.ip_address),
            user_agent: Set(event.user_agent),
            created_at: Set(Utc::now()),
        };

        analytics::Entity::insert(active)
            .exec_without_returning(&self.db)
            .await?;

        Ok(())
    }

    async fn event_count(&self, listing_id: Uuid, event_type: &str) -> AppResult<u64> {
        analytics::Entity::find()
            .filter(analytics::Column::ListingId.eq(listing_id))
            .filter(analytics::Column::EventType.eq(event_type))
            .count(&self.db)
            .await
            .map_err(Into::into)
    }
}
