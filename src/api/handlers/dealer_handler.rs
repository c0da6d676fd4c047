//! Dealer directory and platform stats handlers.

use axum::{
    extract::{Path, Query, State},
    response::Json,
    routing::get,
    Router,
};
use utoipa::IntoParams;
use uuid::Uuid;

use crate::api::AppState;
use crate::errors::AppResult;
use crate::infra::repositories::entities::listing;
use crate::infra::repositories::{DealerProfile, PlatformStats};

#[derive(Debug, serde::Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct DealerListingsQuery {
    pub limit: Option<u64>,
}

/// Create public dealer routes
pub fn dealer_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(list_dealers))
        .route("/:id", get(get_dealer))
        .route("/:id/listings", get(dealer_listings))
}

/// Create public stats routes
pub fn stats_routes() -> Router<AppState> {
    Router::new().route("/", get(platform_stats))
}

/// Verified dealers with their subscriptions
#[utoipa::path(
    get,
    path = "/api/dealers",
    tag = "Dealers",
    responses((status = 200, description = "Verified dealers", body = [DealerProfile]))
)]
pub async fn list_dealers(State(state): State<AppState>) -> AppResult<Json<Vec<DealerProfile>>> {
    let dealers = state.dealer_service.verified_dealers().await?;
    Ok(Json(dealers))
}

/// One verified dealer
#[utoipa::path(
    get,
    path = "/api/dealers/{id}",
    tag = "Dealers",
    params(("id" = Uuid, Path, description = "Dealer id")),
    responses(
        (status = 200, description = "Dealer profile", body = DealerProfile),
        (status = 404, description = "Unknown or unverified dealer")
    )
)]
pub async fn get_dealer(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<Json<DealerProfile>> {
    let dealer = state.dealer_service.dealer(id).await?;
    Ok(Json(dealer))
}

/// Active listings of a dealer
#[utoipa::path(
    get,
    path = "/api/dealers/{id}/listings",
    tag = "Dealers",
    params(("id" = Uuid, Path, description = "Dealer id"), DealerListingsQuery),
    responses(
        (status = 200, description = "Dealer's active listings"),
        (status = 404, description = "Unknown or unverified dealer")
    )
)]
pub async fn dealer_listings(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Query(query): Query<DealerListingsQuery>,
) -> AppResult<Json<Vec<listing::Model>>> {
    let listings = state.dealer_service.dealer_listings(id, query.limit).await?;
    Ok(Json(listings))
}

/// Platform-wide counters
#[utoipa::path(
    get,
    path = "/api/stats",
    tag = "Stats",
    responses((status = 200, description = "Platform stats", body = PlatformStats))
)]
pub async fn platform_stats(State(state): State<AppState>) -> AppResult<Json<PlatformStats>> {
    let stats = state.dealer_service.platform_stats().await?;
    Ok(Json(stats))
}
