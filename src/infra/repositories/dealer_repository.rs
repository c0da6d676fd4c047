//! Dealer directory repository.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sea_orm::{
    ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder,
};
use serde::Serialize;
use utoipa::ToSchema;
use uuid::Uuid;

use super::entities::{dealer_subscription, user};
use crate::domain::{SubscriptionTier, UserRole};
use crate::errors::AppResult;

/// Subscription fields exposed on a dealer profile
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SubscriptionSummary {
    pub tier: SubscriptionTier,
    pub is_active: bool,
    pub start_date: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

impl From<dealer_subscription::Model> for SubscriptionSummary {
    fn from(sub: dealer_subscription::Model) -> Self {
        Self {
            tier: sub.tier,
            is_active: sub.is_active,
            start_date: sub.start_date,
            expires_at: sub.expires_at,
        }
    }
}

/// A verified dealer with their current subscription, if any
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DealerProfile {
    pub id: Uuid,
    pub name: Option<String>,
    pub image: Option<String>,
    pub phone: Option<String>,
    pub is_dealer_verified: bool,
    pub subscription: Option<SubscriptionSummary>,
    pub created_at: DateTime<Utc>,
}

fn dealer_profile(
    user: user::Model,
    subscription: Option<dealer_subscription::Model>,
) -> DealerProfile {
    DealerProfile {
        id: user.id,
        name: user.name,
        image: user.image,
        phone: user.phone,
        is_dealer_verified: user.is_dealer_verified,
        subscription: subscription.map(Into::into),
        created_at: user.created_at,
    }
}

/// Dealer directory data access
#[async_trait]
pub trait DealerRepository: Send + Sync {
    /// All verified dealers with their active subscription, newest first
    async fn verified_dealers(&self) -> AppResult<Vec<DealerProfile>>;

    /// One verified dealer by id
    async fn dealer_by_id(&self, id: Uuid) -> AppResult<Option<DealerProfile>>;

    async fn verified_dealer_count(&self) -> AppResult<u64>;
}

/// SeaORM-backed dealer directory
pub struct DealerStore {
    db: DatabaseConnection,
}

impl DealerStore {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Newest active subscription per user, for a set of users
    async fn active_subscriptions(
        &self,
        user_ids: Vec<Uuid>,
    ) -> AppResult<HashMap<Uuid, dealer_subscription::Model>> {
        let rows = dealer_subscription::Entity::find()
            .filter(dealer_subscription::Column::UserId.is_in(user_ids))
            .filter(dealer_subscription::Column::IsActive.eq(true))
            .order_by_asc(dealer_subscription::Column::StartDate)
            .all(&self.db)
            .await?;

        // Ascending order means later rows overwrite earlier ones,
        // leaving the newest per user.
        let mut by_user = HashMap::new();
        for sub in rows {
            by_user.insert(sub.user_id, sub);
        }
        Ok(by_user)
    }
}

#[async_trait]
impl DealerRepository for DealerStore {
    async fn verified_dealers(&self) -> AppResult<Vec<DealerProfile>> {
        let dealers = user::Entity::find()
            .filter(user::Column::Role.eq(UserRole::Dealer))
            .filter(user::Column::IsDealerVerified.eq(true))
            .order_by_desc(user::Column::CreatedAt)
            .all(&self.db)
            .await?;

        let ids = dealers.iter().map(|d| d.id).collect();
        let mut subscriptions = self.active_subscriptions(ids).await?;

        Ok(dealers
            .into_iter()
            .map(|d| {
                let sub = subscriptions.remove(&d.id);
                dealer_profile(d, sub)
            })
            .collect())
    }

    async fn dealer_by_id(&self, id: Uuid) -> AppResult<Option<DealerProfile>> {
        let Some(dealer) = user::Entity::find_by_id(id)
            .filter(user::Column::Role.eq(UserRole::Dealer))
            .filter(user::Column::IsDealerVerified.eq(true))
            .one(&self.db)
            .await?
        else {
            return Ok(None);
        };

        let mut subscriptions = self.active_subscriptions(vec![dealer.id]).await?;
        let sub = subscriptions.remove(&dealer.id);

        Ok(Some(dealer_profile(dealer, sub)))
    }

    async fn verified_dealer_count(&self) -> AppResult<u64> {
        user::Entity::find()
            .filter(user::Column::Role.eq(UserRole::Dealer))
            .filter(user::Column::IsDealerVerified.eq(true))
            .count(&self.db)
            .await
            .map_err(Into::into)
    }
}
