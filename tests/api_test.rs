//! Integration tests for API endpoints.
//!
//! These tests drive the full router with mock services, so no
//! database connection is required.

use std::sync::Arc;

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use chrono::Utc;
use rust_decimal::Decimal;
use tower::ServiceExt;
use uuid::Uuid;

use gulfride::api::create_router;
use gulfride::domain::{
    FilterOptions, ListingFilters, ListingSort, ListingStatus, MessageStatus, PriceRange,
    SubscriptionTier, UserRole, YearRange,
};
use gulfride::errors::{AppError, AppResult};
use gulfride::infra::repositories::entities::{
    conversation, dealer_subscription, listing, message, user,
};
use gulfride::infra::repositories::{
    ConversationListing, ConversationSummary, DealerProfile, ListingChanges, ListingWithSeller,
    NewListing, ParticipantSummary, PlatformStats, ProfileChanges, SellerSummary,
};
use gulfride::infra::Database;
use gulfride::services::{
    AuthService, Claims, DealerService, EngagementService, ListingService, MessagingService,
    Services, SubscriptionStatus, TokenResponse, UserService, ViewContext,
};
use gulfride::types::{Paginated, PaginationParams};
use gulfride::AppState;

// =============================================================================
// Mock Services
// =============================================================================

fn test_user_id() -> Uuid {
    Uuid::nil()
}

fn sample_user(id: Uuid) -> user::Model {
    user::Model {
        id,
        email: "buyer@example.com".to_string(),
        email_verified: true,
        password_hash: "hashed".to_string(),
        name: Some("Test Buyer".to_string()),
        image: None,
        phone: Some("+971501234567".to_string()),
        role: UserRole::Individual,
        is_dealer_verified: false,
        created_at: Utc::now(),
        updated_at: Utc::now(),
    }
}

fn sample_listing(id: Uuid, user_id: Uuid) -> listing::Model {
    listing::Model {
        id,
        user_id,
        title: "2021 Toyota Land Cruiser GXR".to_string(),
        description: Some("Full service history".to_string()),
        price: Decimal::from(215_000),
        currency: "AED".to_string(),
        status: ListingStatus::Active,
        make: "Toyota".to_string(),
        model: "Land Cruiser".to_string(),
        year: 2021,
        mileage: Some(42_000),
        fuel_type: Some("Petrol".to_string()),
        transmission: Some("Automatic".to_string()),
        body_type: Some("SUV".to_string()),
        color: Some("White".to_string()),
        doors: Some(5),
        cylinders: Some(8),
        horsepower: Some(400),
        emirate: Some("Dubai".to_string()),
        city: Some("Dubai".to_string()),
        area: None,
        features: None,
        condition: Some("excellent".to_string()),
        accident_history: Some(false),
        service_history: None,
        images: None,
        videos: None,
        slug: Some("2021-toyota-land-cruiser-gxr-abcd1234".to_string()),
        meta_title: None,
        meta_description: None,
        published_at: Some(Utc::now()),
        expires_at: None,
        created_at: Utc::now(),
        updated_at: Utc::now(),
    }
}

fn sample_conversation(id: Uuid, buyer: Uuid, seller: Uuid) -> conversation::Model {
    conversation::Model {
        id,
        listing_id: Uuid::new_v4(),
        buyer_user_id: buyer,
        seller_user_id: seller,
        last_message_at: Some(Utc::now()),
        is_active: true,
        created_at: Utc::now(),
        updated_at: Utc::now(),
    }
}

fn sample_message(listing_id: Uuid, from: Uuid, to: Uuid) -> message::Model {
    message::Model {
        id: Uuid::new_v4(),
        listing_id,
        from_user_id: from,
        to_user_id: to,
        content: "Is this car still available?".to_string(),
        status: MessageStatus::Sent,
        is_read: false,
        read_at: None,
        created_at: Utc::now(),
        updated_at: Utc::now(),
    }
}

fn sample_subscription(user_id: Uuid) -> dealer_subscription::Model {
    dealer_subscription::Model {
        id: Uuid::new_v4(),
        user_id,
        tier: SubscriptionTier::Basic,
        is_active: true,
        start_date: Utc::now(),
        expires_at: Utc::now() + chrono::Duration::days(30),
        auto_renew: false,
        created_at: Utc::now(),
        updated_at: Utc::now(),
    }
}

/// Mock auth service; only "valid-test-token" verifies
struct MockAuthService;

#[async_trait]
impl AuthService for MockAuthService {
    async fn register(
        &self,
        email: String,
        _password: String,
        name: Option<String>,
        phone: Option<String>,
        role: UserRole,
    ) -> AppResult<user::Model> {
        let mut user = sample_user(Uuid::new_v4());
        user.email = email;
        user.name = name;
        user.phone = phone;
        user.role = role;
        Ok(user)
    }

    async fn login(&self, _email: String, _password: String) -> AppResult<TokenResponse> {
        Ok(TokenResponse {
            access_token: "mock-token".to_string(),
            token_type: "Bearer".to_string(),
            expires_in: 86400,
        })
    }

    fn verify_token(&self, token: &str) -> AppResult<Claims> {
        if token == "valid-test-token" {
            Ok(Claims {
                sub: test_user_id(),
                email: "buyer@example.com".to_string(),
                role: "individual".to_string(),
                exp: Utc::now().timestamp() + 3600,
                iat: Utc::now().timestamp(),
            })
        } else {
            Err(AppError::Unauthorized)
        }
    }
}

struct MockListingService;

#[async_trait]
impl ListingService for MockListingService {
    async fn search(
        &self,
        _filters: ListingFilters,
        _sort: ListingSort,
        page: PaginationParams,
    ) -> AppResult<Paginated<listing::Model>> {
        let rows = vec![sample_listing(Uuid::new_v4(), Uuid::new_v4())];
        Ok(Paginated::new(rows, page.page.max(1), page.limit(), 1))
    }

    async fn get(&self, id: Uuid) -> AppResult<ListingWithSeller> {
        let seller = Uuid::new_v4();
        Ok(ListingWithSeller {
            listing: sample_listing(id, seller),
            user: SellerSummary {
                id: seller,
                name: Some("Seller".to_string()),
                role: UserRole::Individual,
                is_dealer_verified: false,
            },
        })
    }

    async fn featured(&self, _limit: Option<u64>) -> AppResult<Vec<listing::Model>> {
        Ok(vec![sample_listing(Uuid::new_v4(), Uuid::new_v4())])
    }

    async fn similar(&self, _id: Uuid, _limit: Option<u64>) -> AppResult<Vec<listing::Model>> {
        Ok(vec![])
    }

    async fn filter_options(&self) -> AppResult<FilterOptions> {
        Ok(FilterOptions {
            makes: vec!["Toyota".to_string()],
            fuel_types: vec!["Petrol".to_string()],
            transmissions: vec!["Automatic".to_string()],
            body_types: vec!["SUV".to_string()],
            emirates: vec!["Dubai".to_string()],
            conditions: vec!["excellent".to_string()],
            year_range: YearRange {
                min: 2015,
                max: 2026,
            },
            price_range: PriceRange {
                min: Decimal::from(20_000),
                max: Decimal::from(500_000),
            },
        })
    }

    async fn models_for_make(&self, _make: &str) -> AppResult<Vec<String>> {
        Ok(vec!["Land Cruiser".to_string(), "Camry".to_string()])
    }

    async fn my_listings(&self, user_id: Uuid) -> AppResult<Vec<listing::Model>> {
        Ok(vec![sample_listing(Uuid::new_v4(), user_id)])
    }

    async fn create(&self, data: NewListing) -> AppResult<listing::Model> {
        let mut listing = sample_listing(Uuid::new_v4(), data.user_id);
        listing.title = data.title;
        Ok(listing)
    }

    async fn update(
        &self,
        id: Uuid,
        user_id: Uuid,
        _changes: ListingChanges,
    ) -> AppResult<listing::Model> {
        Ok(sample_listing(id, user_id))
    }

    async fn delete(&self, _id: Uuid, _user_id: Uuid) -> AppResult<()> {
        Ok(())
    }
}

struct MockMessagingService;

#[async_trait]
impl MessagingService for MockMessagingService {
    async fn send(
        &self,
        from_user_id: Uuid,
        listing_id: Uuid,
        _content: String,
    ) -> AppResult<message::Model> {
        Ok(sample_message(listing_id, from_user_id, Uuid::new_v4()))
    }

    async fn reply(
        &self,
        user_id: Uuid,
        _conversation_id: Uuid,
        _content: String,
    ) -> AppResult<message::Model> {
        Ok(sample_message(Uuid::new_v4(), user_id, Uuid::new_v4()))
    }

    async fn conversations(&self, user_id: Uuid) -> AppResult<Vec<ConversationSummary>> {
        let seller = Uuid::new_v4();
        let conversation = sample_conversation(Uuid::new_v4(), user_id, seller);
        let last_message = sample_message(conversation.listing_id, seller, user_id);
        Ok(vec![ConversationSummary {
            listing: ConversationListing {
                id: conversation.listing_id,
                title: "2022 Toyota Land Cruiser".to_string(),
                images: None,
            },
            other_user: ParticipantSummary {
                id: seller,
                name: Some("Gulf Motors".to_string()),
                image: None,
            },
            last_message: Some(last_message),
            conversation,
        }])
    }

    async fn conversation_messages(
        &self,
        user_id: Uuid,
        _conversation_id: Uuid,
        page: PaginationParams,
    ) -> AppResult<Paginated<message::Model>> {
        let rows = vec![sample_message(Uuid::new_v4(), user_id, Uuid::new_v4())];
        Ok(Paginated::new(rows, page.page.max(1), page.limit(), 1))
    }

    async fn mark_read(&self, _user_id: Uuid, _conversation_id: Uuid) -> AppResult<u64> {
        Ok(2)
    }

    async fn unread_count(&self, _user_id: Uuid) -> AppResult<u64> {
        Ok(5)
    }

    async fn close(&self, _user_id: Uuid, _conversation_id: Uuid) -> AppResult<()> {
        Ok(())
    }
}

struct MockDealerService;

#[async_trait]
impl DealerService for MockDealerService {
    async fn verified_dealers(&self) -> AppResult<Vec<DealerProfile>> {
        Ok(vec![DealerProfile {
            id: Uuid::new_v4(),
            name: Some("Gulf Motors".to_string()),
            image: None,
            phone: None,
            is_dealer_verified: true,
            subscription: None,
            created_at: Utc::now(),
        }])
    }

    async fn dealer(&self, id: Uuid) -> AppResult<DealerProfile> {
        Ok(DealerProfile {
            id,
            name: Some("Gulf Motors".to_string()),
            image: None,
            phone: None,
            is_dealer_verified: true,
            subscription: None,
            created_at: Utc::now(),
        })
    }

    async fn dealer_listings(
        &self,
        id: Uuid,
        _limit: Option<u64>,
    ) -> AppResult<Vec<listing::Model>> {
        Ok(vec![sample_listing(Uuid::new_v4(), id)])
    }

    async fn platform_stats(&self) -> AppResult<PlatformStats> {
        Ok(PlatformStats {
            total_listings: 120,
            total_dealers: 8,
            total_users: 450,
        })
    }
}

struct MockUserService;

#[async_trait]
impl UserService for MockUserService {
    async fn profile(&self, user_id: Uuid) -> AppResult<user::Model> {
        Ok(sample_user(user_id))
    }

    async fn update_profile(
        &self,
        user_id: Uuid,
        changes: ProfileChanges,
    ) -> AppResult<user::Model> {
        let mut user = sample_user(user_id);
        if let Some(name) = changes.name {
            user.name = Some(name);
        }
        Ok(user)
    }

    async fn subscription_status(&self, user_id: Uuid) -> AppResult<SubscriptionStatus> {
        Ok(SubscriptionStatus {
            subscription: Some(sample_subscription(user_id)),
            is_expired: false,
        })
    }

    async fn start_subscription(
        &self,
        user_id: Uuid,
        tier: SubscriptionTier,
        auto_renew: bool,
    ) -> AppResult<dealer_subscription::Model> {
        let mut sub = sample_subscription(user_id);
        sub.tier = tier;
        sub.auto_renew = auto_renew;
        Ok(sub)
    }

    async fn update_subscription(
        &self,
        user_id: Uuid,
        tier: Option<SubscriptionTier>,
        auto_renew: Option<bool>,
    ) -> AppResult<dealer_subscription::Model> {
        let mut sub = sample_subscription(user_id);
        if let Some(tier) = tier {
            sub.tier = tier;
        }
        if let Some(auto_renew) = auto_renew {
            sub.auto_renew = auto_renew;
        }
        Ok(sub)
    }

    async fn cancel_subscription(&self, _user_id: Uuid) -> AppResult<()> {
        Ok(())
    }

    async fn verify_dealer(&self, user_id: Uuid) -> AppResult<user::Model> {
        let mut user = sample_user(user_id);
        user.role = UserRole::Dealer;
        user.is_dealer_verified = true;
        Ok(user)
    }
}

struct MockEngagementService;

#[async_trait]
impl EngagementService for MockEngagementService {
    async fn save_listing(&self, _user_id: Uuid, _listing_id: Uuid) -> AppResult<()> {
        Ok(())
    }

    async fn unsave_listing(&self, _user_id: Uuid, _listing_id: Uuid) -> AppResult<()> {
        Ok(())
    }

    async fn saved_listings(&self, user_id: Uuid) -> AppResult<Vec<listing::Model>> {
        Ok(vec![sample_listing(Uuid::new_v4(), user_id)])
    }

    async fn is_saved(&self, _user_id: Uuid, _listing_id: Uuid) -> AppResult<bool> {
        Ok(true)
    }

    async fn record_view(&self, _listing_id: Uuid, _context: ViewContext) {}

    async fn listing_views(&self, _user_id: Uuid, _listing_id: Uuid) -> AppResult<u64> {
        Ok(42)
    }
}

// =============================================================================
// Test Helpers
// =============================================================================

fn test_app() -> axum::Router {
    let services = Services::new(
        Arc::new(MockAuthService),
        Arc::new(MockListingService),
        Arc::new(MockMessagingService),
        Arc::new(MockDealerService),
        Arc::new(MockUserService),
        Arc::new(MockEngagementService),
    );
    let database = Arc::new(Database::from_connection(
        sea_orm::DatabaseConnection::default(),
    ));
    create_router(AppState::new(services, database))
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

fn get_authed(uri: &str) -> Request<Body> {
    Request::builder()
        .uri(uri)
        .header(header::AUTHORIZATION, "Bearer valid-test-token")
        .body(Body::empty())
        .unwrap()
}

fn post_json(uri: &str, body: serde_json::Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn post_json_authed(uri: &str, body: serde_json::Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .header(header::AUTHORIZATION, "Bearer valid-test-token")
        .body(Body::from(body.to_string()))
        .unwrap()
}

async fn body_json(response: axum::response::Response) -> serde_json::Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

// =============================================================================
// Public Routes
// =============================================================================

#[tokio::test]
async fn root_returns_api_name() {
    let response = test_app().oneshot(get("/")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    assert_eq!(&bytes[..], b"GulfRide API");
}

#[tokio::test]
async fn unknown_routes_return_json_not_found() {
    let response = test_app().oneshot(get("/api/nope")).await.unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let body = body_json(response).await;
    assert_eq!(body["error"]["code"], "NOT_FOUND");
}

#[tokio::test]
async fn listing_search_returns_rows_and_meta() {
    let response = test_app()
        .oneshot(get("/api/listings?make=Toyota&page=1&limit=12"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = body_json(response).await;
    assert_eq!(body["data"].as_array().unwrap().len(), 1);
    assert_eq!(body["meta"]["total"], 1);
}

#[tokio::test]
async fn listing_detail_includes_the_seller() {
    let id = Uuid::new_v4();
    let response = test_app()
        .oneshot(get(&format!("/api/listings/{id}")))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = body_json(response).await;
    assert_eq!(body["id"], id.to_string());
    assert!(body["user"].is_object());
}

#[tokio::test]
async fn featured_listings_are_public() {
    let response = test_app().oneshot(get("/api/listings/featured")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn filter_options_expose_facets_and_ranges() {
    let response = test_app().oneshot(get("/api/listings/filters")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = body_json(response).await;
    assert_eq!(body["makes"][0], "Toyota");
    assert_eq!(body["yearRange"]["min"], 2015);
}

#[tokio::test]
async fn dealer_directory_is_public() {
    let response = test_app().oneshot(get("/api/dealers")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = body_json(response).await;
    assert_eq!(body[0]["name"], "Gulf Motors");
}

#[tokio::test]
async fn platform_stats_are_public() {
    let response = test_app().oneshot(get("/api/stats")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = body_json(response).await;
    assert_eq!(body["totalListings"], 120);
    assert_eq!(body["totalDealers"], 8);
}

// =============================================================================
// Authentication
// =============================================================================

#[tokio::test]
async fn register_returns_created() {
    let response = test_app()
        .oneshot(post_json(
            "/api/auth/register",
            serde_json::json!({
                "email": "new@example.com",
                "password": "SecurePass123!",
                "name": "New Seller"
            }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);

    let body = body_json(response).await;
    assert_eq!(body["email"], "new@example.com");
    // The password hash must never appear in the response
    assert!(body.get("passwordHash").is_none());
    assert!(body.get("password_hash").is_none());
}

#[tokio::test]
async fn register_rejects_invalid_email() {
    let response = test_app()
        .oneshot(post_json(
            "/api/auth/register",
            serde_json::json!({
                "email": "not-an-email",
                "password": "SecurePass123!"
            }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn register_rejects_short_password() {
    let response = test_app()
        .oneshot(post_json(
            "/api/auth/register",
            serde_json::json!({
                "email": "new@example.com",
                "password": "short"
            }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn login_returns_a_bearer_token() {
    let response = test_app()
        .oneshot(post_json(
            "/api/auth/login",
            serde_json::json!({
                "email": "buyer@example.com",
                "password": "SecurePass123!"
            }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = body_json(response).await;
    assert_eq!(body["token_type"], "Bearer");
    assert!(!body["access_token"].as_str().unwrap().is_empty());
}

// =============================================================================
// Protected Routes
// =============================================================================

#[tokio::test]
async fn protected_routes_require_a_token() {
    let app = test_app();

    for uri in [
        "/api/users/me",
        "/api/messages/conversations",
        "/api/messages/unread-count",
        "/api/listings/mine",
    ] {
        let response = app.clone().oneshot(get(uri)).await.unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED, "{uri}");
    }
}

#[tokio::test]
async fn garbage_tokens_are_rejected() {
    let request = Request::builder()
        .uri("/api/users/me")
        .header(header::AUTHORIZATION, "Bearer not-the-token")
        .body(Body::empty())
        .unwrap();

    let response = test_app().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn token_without_bearer_prefix_is_rejected() {
    let request = Request::builder()
        .uri("/api/users/me")
        .header(header::AUTHORIZATION, "valid-test-token")
        .body(Body::empty())
        .unwrap();

    let response = test_app().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn profile_reflects_the_token_subject() {
    let response = test_app().oneshot(get_authed("/api/users/me")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = body_json(response).await;
    assert_eq!(body["id"], test_user_id().to_string());
    assert_eq!(body["email"], "buyer@example.com");
}

#[tokio::test]
async fn own_listings_require_and_accept_a_token() {
    let response = test_app()
        .oneshot(get_authed("/api/listings/mine"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn creating_a_listing_requires_a_token() {
    let body = serde_json::json!({
        "title": "2019 Nissan Patrol LE",
        "price": "160000",
        "make": "Nissan",
        "model": "Patrol",
        "year": 2019
    });

    let response = test_app()
        .oneshot(post_json("/api/listings", body.clone()))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let response = test_app()
        .oneshot(post_json_authed("/api/listings", body))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);
}

#[tokio::test]
async fn sending_a_message_requires_a_token() {
    let response = test_app()
        .oneshot(post_json_authed(
            "/api/messages",
            serde_json::json!({
                "listingId": Uuid::new_v4(),
                "content": "Is this car still available?"
            }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);
}

#[tokio::test]
async fn favorites_require_and_accept_a_token() {
    let app = test_app();
    let id = Uuid::new_v4();

    let response = app
        .clone()
        .oneshot(get(&format!("/api/listings/{id}/favorite")))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let response = app
        .clone()
        .oneshot(get_authed("/api/listings/favorites"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let response = app
        .oneshot(get_authed(&format!("/api/listings/{id}/favorite")))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["saved"], true);
}

#[tokio::test]
async fn saving_a_listing_returns_created() {
    let id = Uuid::new_v4();
    let request = Request::builder()
        .method("POST")
        .uri(format!("/api/listings/{id}/favorite"))
        .header(header::AUTHORIZATION, "Bearer valid-test-token")
        .body(Body::empty())
        .unwrap();

    let response = test_app().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);
}

#[tokio::test]
async fn owners_can_read_their_listing_view_count() {
    let id = Uuid::new_v4();
    let response = test_app()
        .oneshot(get_authed(&format!("/api/listings/{id}/views")))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = body_json(response).await;
    assert_eq!(body["views"], 42);
}

#[tokio::test]
async fn unread_count_is_returned_for_the_caller() {
    let response = test_app()
        .oneshot(get_authed("/api/messages/unread-count"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = body_json(response).await;
    assert_eq!(body["unreadCount"], 5);
}

#[tokio::test]
async fn conversations_are_listed_for_the_caller() {
    let response = test_app()
        .oneshot(get_authed("/api/messages/conversations"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = body_json(response).await;
    let rows = body.as_array().unwrap();
    assert_eq!(rows.len(), 1);

    // Each row carries the conversation fields plus the listing, the
    // other participant and the latest message.
    let row = &rows[0];
    assert!(row["listingId"].is_string());
    assert_eq!(row["listing"]["title"], "2022 Toyota Land Cruiser");
    assert_eq!(row["otherUser"]["name"], "Gulf Motors");
    assert!(row["lastMessage"]["content"].is_string());
}
