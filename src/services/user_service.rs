//! User service - profiles and dealer subscriptions.

use async_trait::async_trait;
use chrono::{Duration, Utc};
use serde::Serialize;
use std::sync::Arc;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::config::SUBSCRIPTION_PERIOD_DAYS;
use crate::domain::SubscriptionTier;
use crate::errors::{AppError, AppResult};
use crate::infra::repositories::entities::{dealer_subscription, user};
use crate::infra::repositories::{NewSubscription, ProfileChanges, UserRepository};

/// Current subscription with its expiry verdict
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SubscriptionStatus {
    #[schema(value_type = Option<Object>)]
    pub subscription: Option<dealer_subscription::Model>,
    /// True when there is no active subscription or it has lapsed
    pub is_expired: bool,
}

/// Profile and subscription use cases
#[async_trait]
pub trait UserService: Send + Sync {
    async fn profile(&self, user_id: Uuid) -> AppResult<user::Model>;

    async fn update_profile(
        &self,
        user_id: Uuid,
        changes: ProfileChanges,
    ) -> AppResult<user::Model>;

    async fn subscription_status(&self, user_id: Uuid) -> AppResult<SubscriptionStatus>;

    /// Start a subscription period for a dealer account; any previous
    /// active period is closed first.
    async fn start_subscription(
        &self,
        user_id: Uuid,
        tier: SubscriptionTier,
        auto_renew: bool,
    ) -> AppResult<dealer_subscription::Model>;

    /// Change tier and/or auto-renew on the active subscription
    async fn update_subscription(
        &self,
        user_id: Uuid,
        tier: Option<SubscriptionTier>,
        auto_renew: Option<bool>,
    ) -> AppResult<dealer_subscription::Model>;

    async fn cancel_subscription(&self, user_id: Uuid) -> AppResult<()>;

    /// Grant the verified-dealer flag (operator action)
    async fn verify_dealer(&self, user_id: Uuid) -> AppResult<user::Model>;
}

/// Concrete UserService over the users repository
pub struct UserManager {
    users: Arc<dyn UserRepository>,
}

impl UserManager {
    pub fn new(users: Arc<dyn UserRepository>) -> Self {
        Self { users }
    }

    async fn dealer_account(&self, user_id: Uuid) -> AppResult<user::Model> {
        let user = self
            .users
            .find_by_id(user_id)
            .await?
            .ok_or(AppError::NotFound)?;

        if !user.role.is_dealer() {
            return Err(AppError::validation(
                "subscriptions are only available to dealer accounts",
            ));
        }

        Ok(user)
    }
}

#[async_trait]
impl UserService for UserManager {
    async fn profile(&self, user_id: Uuid) -> AppResult<user::Model> {
        self.users
            .find_by_id(user_id)
            .await?
            .ok_or(AppError::NotFound)
    }

    async fn update_profile(
        &self,
        user_id: Uuid,
        changes: ProfileChanges,
    ) -> AppResult<user::Model> {
        self.users
            .update_profile(user_id, changes)
            .await?
            .ok_or(AppError::NotFound)
    }

    async fn subscription_status(&self, user_id: Uuid) -> AppResult<SubscriptionStatus> {
        let subscription = self.users.active_subscription(user_id).await?;
        let is_expired = match &subscription {
            Some(sub) => sub.expires_at < Utc::now(),
            None => true,
        };

        Ok(SubscriptionStatus {
            subscription,
            is_expired,
        })
    }

    async fn start_subscription(
        &self,
        user_id: Uuid,
        tier: SubscriptionTier,
        auto_renew: bool,
    ) -> AppResult<dealer_subscription::Model> {
        let dealer = self.dealer_account(user_id).await?;

        // One active period at a time
        self.users.cancel_subscription(dealer.id).await?;

        self.users
            .create_subscription(NewSubscription {
                user_id: dealer.id,
                tier,
                expires_at: Utc::now() + Duration::days(SUBSCRIPTION_PERIOD_DAYS),
                auto_renew,
            })
            .await
    }

    async fn update_subscription(
        &self,
        user_id: Uuid,
        tier: Option<SubscriptionTier>,
        auto_renew: Option<bool>,
    ) -> AppResult<dealer_subscription::Model> {
        self.users
            .update_subscription(user_id, tier, auto_renew)
            .await?
            .ok_or(AppError::NotFound)
    }

    async fn cancel_subscription(&self, user_id: Uuid) -> AppResult<()> {
        if self.users.cancel_subscription(user_id).await? {
            Ok(())
        } else {
            Err(AppError::NotFound)
        }
    }

    async fn verify_dealer(&self, user_id: Uuid) -> AppResult<user::Model> {
        self.dealer_account(user_id).await?;

        self.users
            .verify_dealer(user_id)
            .await?
            .ok_or(AppError::NotFound)
    }
}
