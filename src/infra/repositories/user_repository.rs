//! Users and dealer subscriptions repository.

use async_trait::async_trait;
use chrono::Utc;
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, Set,
};
use uuid::Uuid;

use super::entities::{dealer_subscription, user};
use crate::domain::{SubscriptionTier, UserRole};
use crate::errors::AppResult;

/// Column values for a new user row
#[derive(Debug, Clone)]
pub struct NewUser {
    pub email: String,
    pub password_hash: String,
    pub name: Option<String>,
    pub phone: Option<String>,
    pub role: UserRole,
}

/// Partial profile update; absent fields are left untouched
#[derive(Debug, Clone, Default)]
pub struct ProfileChanges {
    pub name: Option<String>,
    pub phone: Option<String>,
    pub image: Option<String>,
}

/// Column values for a new dealer subscription row
#[derive(Debug, Clone)]
pub struct NewSubscription {
    pub user_id: Uuid,
    pub tier: SubscriptionTier,
    pub expires_at: chrono::DateTime<Utc>,
    pub auto_renew: bool,
}

/// Users and their dealer subscriptions
#[async_trait]
pub trait UserRepository: Send + Sync {
    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<user::Model>>;

    async fn find_by_email(&self, email: &str) -> AppResult<Option<user::Model>>;

    async fn create(&self, data: NewUser) -> AppResult<user::Model>;

    async fn update_profile(
        &self,
        id: Uuid,
        changes: ProfileChanges,
    ) -> AppResult<Option<user::Model>>;

    /// Set the verified-dealer flag. `None` when the user does not exist
    /// or does not hold the dealer role.
    async fn verify_dealer(&self, id: Uuid) -> AppResult<Option<user::Model>>;

    async fn create_subscription(
        &self,
        data: NewSubscription,
    ) -> AppResult<dealer_subscription::Model>;

    /// Newest active subscription row for a user, if any
    async fn active_subscription(
        &self,
        user_id: Uuid,
    ) -> AppResult<Option<dealer_subscription::Model>>;

    /// Change tier and/or auto-renew on the active subscription
    async fn update_subscription(
        &self,
        user_id: Uuid,
        tier: Option<SubscriptionTier>,
        auto_renew: Option<bool>,
    ) -> AppResult<Option<dealer_subscription::Model>>;

    /// Deactivate every active subscription of the user; returns whether
    /// anything changed
    async fn cancel_subscription(&self, user_id: Uuid) -> AppResult<bool>;
}

/// SeaORM-backed users repository
pub struct UserStore {
    db: DatabaseConnection,
}

impl UserStore {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

#[async_trait]
impl UserRepository for UserStore {
    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<user::Model>> {
        user::Entity::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(Into::into)
    }

    async fn find_by_email(&self, email: &str) -> AppResult<Option<user::Model>> {
        user::Entity::find()
            .filter(user::Column::Email.eq(email))
            .one(&self.db)
            .await
            .map_err(Into::into)
    }

    async fn create(&self, data: NewUser) -> AppResult<user::Model> {
        let now = Utc::now();

        let active = user::ActiveModel {
            id: Set(Uuid::new_v4()),
            email: Set(data.email),
            email_verified: Set(false),
            password_hash: Set(data.password_hash),
            name: Set(data.name),
            image: Set(None),
            phone: Set(data.phone),
            role: Set(data.role),
            is_dealer_verified: Set(false),
            created_at: Set(now),
            updated_at: Set(now),
        };

        active.insert(&self.db).await.map_err(Into::into)
    }

    async fn update_profile(
        &self,
        id: Uuid,
        changes: ProfileChanges,
    ) -> AppResult<Option<user::Model>> {
        let Some(existing) = self.find_by_id(id).await? else {
            return Ok(None);
        };

        let mut active: user::ActiveModel = existing.into();
        if let Some(name) = changes.name {
            active.name = Set(Some(name));
        }
        if let Some(phone) = changes.phone {
            active.phone = Set(Some(phone));
        }
        if let Some(image) = changes.image {
            active.image = Set(Some(image));
        }
        active.updated_at = Set(Utc::now());

        let updated = active.update(&self.db).await?;
        Ok(Some(updated))
    }

    async fn verify_dealer(&self, id: Uuid) -> AppResult<Option<user::Model>> {
        let Some(existing) = self.find_by_id(id).await? else {
            return Ok(None);
        };
        if !existing.role.is_dealer() {
            return Ok(None);
        }

        let mut active: user::ActiveModel = existing.into();
        active.is_dealer_verified = Set(true);
        active.updated_at = Set(Utc::now());

        let updated = active.update(&self.db).await?;
        Ok(Some(updated))
    }

    async fn create_subscription(
        &self,
        data: NewSubscription,
    ) -> AppResult<dealer_subscription::Model> {
        let now = Utc::now();

        let active = dealer_subscription::ActiveModel {
            id: Set(Uuid::new_v4()),
            user_id: Set(data.user_id),
            tier: Set(data.tier),
            is_active: Set(true),
            start_date: Set(now),
            expires_at: Set(data.expires_at),
            auto_renew: Set(data.auto_renew),
            created_at: Set(now),
            updated_at: Set(now),
        };

        active.insert(&self.db).await.map_err(Into::into)
    }

    async fn active_subscription(
        &self,
        user_id: Uuid,
    ) -> AppResult<Option<dealer_subscription::Model>> {
        dealer_subscription::Entity::find()
            .filter(dealer_subscription::Column::UserId.eq(user_id))
            .filter(dealer_subscription::Column::IsActive.eq(true))
            .order_by_desc(dealer_subscription::Column::StartDate)
            .one(&self.db)
            .await
            .map_err(Into::into)
    }

    async fn update_subscription(
        &self,
        user_id: Uuid,
        tier: Option<SubscriptionTier>,
        auto_renew: Option<bool>,
    ) -> AppResult<Option<dealer_subscription::Model>> {
        let Some(existing) = self.active_subscription(user_id).await? else {
            return Ok(None);
        };

        let mut active: dealer_subscription::ActiveModel = existing.into();
        if let Some(tier) = tier {
            active.tier = Set(tier);
        }
        if let Some(auto_renew) = auto_renew {
            active.auto_renew = Set(auto_renew);
        }
        active.updated_at = Set(Utc::now());

        let updated = active.update(&self.db).await?;
        Ok(Some(updated))
    }

    async fn cancel_subscription(&self, user_id: Uuid) -> AppResult<bool> {
        let result = dealer_subscription::Entity::update_many()
            .col_expr(dealer_subscription::Column::IsActive, Expr::value(false))
            .col_expr(dealer_subscription::Column::AutoRenew, Expr::value(false))
            .col_expr(
                dealer_subscription::Column::UpdatedAt,
                Expr::value(Utc::now()),
            )
            .filter(dealer_subscription::Column::UserId.eq(user_id))
            .filter(dealer_subscription::Column::IsActive.eq(true))
            .exec(&self.db)
            .await?;

        Ok(result.rows_affected > 0)
    }
}
