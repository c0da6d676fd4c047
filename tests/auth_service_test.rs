//! Auth service unit tests over a mocked user repository.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use uuid::Uuid;

use gulfride::config::Config;
use gulfride::domain::{Password, UserRole};
use gulfride::errors::{AppError, AppResult};
use gulfride::infra::repositories::entities::{dealer_subscription, user};
use gulfride::infra::repositories::{NewSubscription, NewUser, ProfileChanges, UserRepository};
use gulfride::services::{AuthService, Authenticator};

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
            tier: Option<gulfride::domain::SubscriptionTier>,
            auto_renew: Option<bool>,
        ) -> AppResult<Option<dealer_subscription::Model>>;
        async fn cancel_subscription(&self, user_id: Uuid) -> AppResult<bool>;
    }
}

fn user_with_password(email: &str, password: &str) -> user::Model {
    user::Model {
        id: Uuid::new_v4(),
        email: email.to_string(),
        email_verified: false,
        password_hash: Password::new(password).unwrap().into_string(),
        name: None,
        image: None,
        phone: None,
        role: UserRole::Individual,
        is_dealer_verified: false,
        created_at: Utc::now(),
        updated_at: Utc::now(),
    }
}

#[tokio::test]
async fn registering_a_taken_email_conflicts() {
    let mut repo = MockUserRepo::new();
    repo.expect_find_by_email()
        .returning(|email| Ok(Some(user_with_password(email, "SecurePass123!"))));

    let service = Authenticator::new(Arc::new(repo), Config::for_tests());
    let result = service
        .register(
            "taken@example.com".to_string(),
            "SecurePass123!".to_string(),
            None,
            None,
            UserRole::Individual,
        )
        .await;

    assert!(matches!(result, Err(AppError::Conflict(_))));
}

#[tokio::test]
async fn registration_stores_a_hash_not_the_password() {
    let mut repo = MockUserRepo::new();
    repo.expect_find_by_email().returning(|_| Ok(None));
    repo.expect_create()
        .withf(|data: &NewUser| {
            data.password_hash != "SecurePass123!" && data.password_hash.starts_with("$argon2")
        })
        .returning(|data| {
            let mut user = user_with_password(&data.email, "SecurePass123!");
            user.role = data.role;
            Ok(user)
        });

    let service = Authenticator::new(Arc::new(repo), Config::for_tests());
    let user = service
        .register(
            "new@example.com".to_string(),
            "SecurePass123!".to_string(),
            None,
            None,
            UserRole::Dealer,
        )
        .await
        .unwrap();

    assert_eq!(user.role, UserRole::Dealer);
}

#[tokio::test]
async fn login_issues_a_verifiable_token() {
    let mut repo = MockUserRepo::new();
    repo.expect_find_by_email()
        .returning(|email| Ok(Some(user_with_password(email, "SecurePass123!"))));

    let service = Authenticator::new(Arc::new(repo), Config::for_tests());
    let token = service
        .login("buyer@example.com".to_string(), "SecurePass123!".to_string())
        .await
        .unwrap();

    let claims = service.verify_token(&token.access_token).unwrap();
    assert_eq!(claims.email, "buyer@example.com");
    assert_eq!(claims.role, "individual");
}

#[tokio::test]
async fn wrong_password_is_invalid_credentials() {
    let mut repo = MockUserRepo::new();
    repo.expect_find_by_email()
        .returning(|email| Ok(Some(user_with_password(email, "SecurePass123!"))));

    let service = Authenticator::new(Arc::new(repo), Config::for_tests());
    let result = service
        .login("buyer@example.com".to_string(), "wrong-password".to_string())
        .await;

    assert!(matches!(result, Err(AppError::InvalidCredentials)));
}

#[tokio::test]
async fn unknown_email_is_indistinguishable_from_wrong_password() {
    let mut repo = MockUserRepo::new();
    repo.expect_find_by_email().returning(|_| Ok(None));

    let service = Authenticator::new(Arc::new(repo), Config::for_tests());
    let result = service
        .login("ghost@example.com".to_string(), "whatever123".to_string())
        .await;

    assert!(matches!(result, Err(AppError::InvalidCredentials)));
}
