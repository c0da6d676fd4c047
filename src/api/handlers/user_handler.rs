//! Current-user profile and subscription handlers.

use axum::{extract::State, http::StatusCode, response::Json, routing::get, Extension, Router};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::api::extractors::ValidatedJson;
use crate::api::middleware::CurrentUser;
use crate::api::AppState;
use crate::domain::{SubscriptionTier, UserRole};
use crate::errors::AppResult;
use crate::infra::repositories::entities::user;
use crate::infra::repositories::ProfileChanges;
use crate::services::SubscriptionStatus;

/// User fields safe to return to clients
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UserResponse {
    pub id: Uuid,
    #[schema(example = "user@example.com")]
    pub email: String,
    #[schema(example = "Ahmed Al Mansoori")]
    pub name: Option<String>,
    pub image: Option<String>,
    pub phone: Option<String>,
    pub role: UserRole,
    pub is_dealer_verified: bool,
    pub created_at: DateTime<Utc>,
}

impl From<user::Model> for UserResponse {
    fn from(user: user::Model) -> Self {
        Self {
            id: user.id,
            email: user.email,
            name: user.name,
            image: user.image,
            phone: user.phone,
            role: user.role,
            is_dealer_verified: user.is_dealer_verified,
            created_at: user.created_at,
        }
    }
}

/// Profile update request; absent fields are left untouched
#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateProfileRequest {
    #[validate(length(min = 1, max = 100, message = "Name must be 1-100 characters"))]
    pub name: Option<String>,
    #[validate(length(max = 30, message = "Phone number is too long"))]
    pub phone: Option<String>,
    #[validate(url(message = "Image must be a valid URL"))]
    pub image: Option<String>,
}

/// Start a dealer subscription
#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct StartSubscriptionRequest {
    pub tier: SubscriptionTier,
    #[serde(default)]
    pub auto_renew: bool,
}

/// Change the active subscription
#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateSubscriptionRequest {
    pub tier: Option<SubscriptionTier>,
    pub auto_renew: Option<bool>,
}

/// Create authenticated user routes
pub fn user_routes() -> Router<AppState> {
    Router::new()
        .route("/me", get(get_me).put(update_me))
        .route(
            "/me/subscription",
            get(get_subscription)
                .post(start_subscription)
                .put(update_subscription)
                .delete(cancel_subscription),
        )
}

/// Current user's profile
#[utoipa::path(
    get,
    path = "/api/users/me",
    tag = "Users",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Current user", body = UserResponse),
        (status = 401, description = "Missing or invalid token")
    )
)]
pub async fn get_me(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
) -> AppResult<Json<UserResponse>> {
    let user = state.user_service.profile(current.id).await?;
    Ok(Json(UserResponse::from(user)))
}

/// Update the current user's profile
#[utoipa::path(
    put,
    path = "/api/users/me",
    tag = "Users",
    security(("bearer_auth" = [])),
    request_body = UpdateProfileRequest,
    responses(
        (status = 200, description = "Updated profile", body = UserResponse),
        (status = 400, description = "Validation error"),
        (status = 401, description = "Missing or invalid token")
    )
)]
pub async fn update_me(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    ValidatedJson(payload): ValidatedJson<UpdateProfileRequest>,
) -> AppResult<Json<UserResponse>> {
    let changes = ProfileChanges {
        name: payload.name,
        phone: payload.phone,
        image: payload.image,
    };

    let user = state.user_service.update_profile(current.id, changes).await?;
    Ok(Json(UserResponse::from(user)))
}

/// Current subscription with expiry verdict
#[utoipa::path(
    get,
    path = "/api/users/me/subscription",
    tag = "Users",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Subscription status", body = SubscriptionStatus),
        (status = 401, description = "Missing or invalid token")
    )
)]
pub async fn get_subscription(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
) -> AppResult<Json<SubscriptionStatus>> {
    let status = state.user_service.subscription_status(current.id).await?;
    Ok(Json(status))
}

/// Start a subscription period (dealer accounts only)
#[utoipa::path(
    post,
    path = "/api/users/me/subscription",
    tag = "Users",
    security(("bearer_auth" = [])),
    request_body = StartSubscriptionRequest,
    responses(
        (status = 201, description = "Subscription started"),
        (status = 400, description = "Not a dealer account"),
        (status = 401, description = "Missing or invalid token")
    )
)]
pub async fn start_subscription(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    ValidatedJson(payload): ValidatedJson<StartSubscriptionRequest>,
) -> AppResult<(StatusCode, Json<serde_json::Value>)> {
    let subscription = state
        .user_service
        .start_subscription(current.id, payload.tier, payload.auto_renew)
        .await?;

    Ok((StatusCode::CREATED, Json(serde_json::json!(subscription))))
}

/// Change tier or auto-renew on the active subscription
#[utoipa::path(
    put,
    path = "/api/users/me/subscription",
    tag = "Users",
    security(("bearer_auth" = [])),
    request_body = UpdateSubscriptionRequest,
    responses(
        (status = 200, description = "Subscription updated"),
        (status = 401, description = "Missing or invalid token"),
        (status = 404, description = "No active subscription")
    )
)]
pub async fn update_subscription(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    ValidatedJson(payload): ValidatedJson<UpdateSubscriptionRequest>,
) -> AppResult<Json<serde_json::Value>> {
    let subscription = state
        .user_service
        .update_subscription(current.id, payload.tier, payload.auto_renew)
        .await?;

    Ok(Json(serde_json::json!(subscription)))
}

/// Cancel the active subscription
#[utoipa::path(
    delete,
    path = "/api/users/me/subscription",
    tag = "Users",
    security(("bearer_auth" = [])),
    responses(
        (status = 204, description = "Subscription cancelled"),
        (status = 401, description = "Missing or invalid token"),
        (status = 404, description = "No active subscription")
    )
)]
pub async fn cancel_subscription(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
) -> AppResult<StatusCode> {
    state.user_service.cancel_subscription(current.id).await?;
    Ok(StatusCode::NO_CONTENT)
}
