//! User service unit tests over a mocked repository.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{Duration, Utc};
use uuid::Uuid;

use gulfride::domain::{SubscriptionTier, UserRole};
use gulfride::errors::{AppError, AppResult};
use gulfride::infra::repositories::entities::{dealer_subscription, user};
use gulfride::infra::repositories::{NewSubscription, NewUser, ProfileChanges, UserRepository};
use gulfride::services::{UserManager, UserService};

mockall::mock! {
    pub UserRepo {}

    #[async_trait]
    impl UserRepository for UserRepo {
        async fn find_by_id(&self, id: Uuid) -> AppResult<Option<user::Model>>;
        async fn find_by_email(&self, email: &str) -> AppResult<Option<user::Model>>;
        async fn create(&self, data: NewUser) -> AppResult<user::Model>;
        async fn update_profile(
            &self,
            id: Uuid,
            changes: ProfileChanges,
        ) -> AppResult<Option<user::Model>>;
        async fn verify_dealer(&self, id: Uuid) -> AppResult<Option<user::Model>>;
        async fn create_subscription(
            &self,
            data: NewSubscription,
        ) -> AppResult<dealer_subscription::Model>;
        async fn active_subscription(
            &self,
            user_id: Uuid,
        ) -> AppResult<Option<dealer_subscription::Model>>;
        async fn update_subscription(
            &self,
            user_id: Uuid,
            tier: Option<SubscriptionTier>,
            auto_renew: Option<bool>,
        ) -> AppResult<Option<dealer_subscription::Model>>;
        async fn cancel_subscription(&self, user_id: Uuid) -> AppResult<bool>;
    }
}

fn sample_user(id: Uuid, role: UserRole) -> user::Model {
    user::Model {
        id,
        email: "someone@example.com".to_string(),
        email_verified: false,
        password_hash: "hashed".to_string(),
        name: Some("Someone".to_string()),
        image: None,
        phone: None,
        role,
        is_dealer_verified: false,
        created_at: Utc::now(),
        updated_at: Utc::now(),
    }
}

fn sample_subscription(user_id: Uuid, expires_at: chrono::DateTime<Utc>) -> dealer_subscription::Model {
    dealer_subscription::Model {
        id: Uuid::new_v4(),
        user_id,
        tier: SubscriptionTier::Basic,
        is_active: true,
        start_date: Utc::now(),
        expires_at,
        auto_renew: false,
        created_at: Utc::now(),
        updated_at: Utc::now(),
    }
}

#[tokio::test]
async fn individuals_cannot_start_a_subscription() {
    let id = Uuid::new_v4();
    let mut repo = MockUserRepo::new();
    repo.expect_find_by_id()
        .returning(move |id| Ok(Some(sample_user(id, UserRole::Individual))));

    let service = UserManager::new(Arc::new(repo));
    let result = service
        .start_subscription(id, SubscriptionTier::Basic, false)
        .await;

    assert!(matches!(result, Err(AppError::Validation(_))));
}

#[tokio::test]
async fn starting_a_subscription_closes_the_previous_period() {
    let id = Uuid::new_v4();
    let mut repo = MockUserRepo::new();
    repo.expect_find_by_id()
        .returning(move |id| Ok(Some(sample_user(id, UserRole::Dealer))));
    repo.expect_cancel_subscription()
        .times(1)
        .returning(|_| Ok(true));
    repo.expect_create_subscription()
        .withf(|data: &NewSubscription| {
            let period = data.expires_at - Utc::now();
            data.tier == SubscriptionTier::Premium
                && period > Duration::days(29)
                && period <= Duration::days(30)
        })
        .returning(|data| Ok(sample_subscription(data.user_id, data.expires_at)));

    let service = UserManager::new(Arc::new(repo));
    let subscription = service
        .start_subscription(id, SubscriptionTier::Premium, true)
        .await
        .unwrap();

    assert_eq!(subscription.user_id, id);
}

#[tokio::test]
async fn a_lapsed_subscription_reads_as_expired() {
    let id = Uuid::new_v4();
    let mut repo = MockUserRepo::new();
    repo.expect_active_subscription().returning(move |user_id| {
        Ok(Some(sample_subscription(
            user_id,
            Utc::now() - Duration::days(1),
        )))
    });

    let service = UserManager::new(Arc::new(repo));
    let status = service.subscription_status(id).await.unwrap();

    assert!(status.subscription.is_some());
    assert!(status.is_expired);
}

#[tokio::test]
async fn no_subscription_also_reads_as_expired() {
    let mut repo = MockUserRepo::new();
    repo.expect_active_subscription().returning(|_| Ok(None));

    let service = UserManager::new(Arc::new(repo));
    let status = service.subscription_status(Uuid::new_v4()).await.unwrap();

    assert!(status.subscription.is_none());
    assert!(status.is_expired);
}

#[tokio::test]
async fn cancelling_without_an_active_subscription_is_not_found() {
    let mut repo = MockUserRepo::new();
    repo.expect_cancel_subscription().returning(|_| Ok(false));

    let service = UserManager::new(Arc::new(repo));
    let result = service.cancel_subscription(Uuid::new_v4()).await;

    assert!(matches!(result, Err(AppError::NotFound)));
}

#[tokio::test]
async fn verify_dealer_rejects_individual_accounts() {
    let mut repo = MockUserRepo::new();
    repo.expect_find_by_id()
        .returning(move |id| Ok(Some(sample_user(id, UserRole::Individual))));

    let service = UserManager::new(Arc::new(repo));
    let result = service.verify_dealer(Uuid::new_v4()).await;

    assert!(matches!(result, Err(AppError::Validation(_))));
}

#[tokio::test]
async fn profile_updates_surface_the_stored_row() {
    let id = Uuid::new_v4();
    let mut repo = MockUserRepo::new();
    repo.expect_update_profile()
        .withf(|_, changes: &ProfileChanges| changes.name.as_deref() == Some("New Name"))
        .returning(|id, changes| {
            let mut user = sample_user(id, UserRole::Individual);
            user.name = changes.name;
            Ok(Some(user))
        });

    let service = UserManager::new(Arc::new(repo));
    let user = service
        .update_profile(
            id,
            ProfileChanges {
                name: Some("New Name".to_string()),
                ..Default::default()
            },
        )
        .await
        .unwrap();

    assert_eq!(user.name.as_deref(), Some("New Name"));
}
