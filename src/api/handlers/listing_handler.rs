//! Listing handlers - public catalogue plus owner CRUD.

use axum::{
    extract::{Path, Query, State},
    http::{header, HeaderMap, StatusCode},
    response::Json,
    routing::get,
    Extension, Router,
};
use chrono::{Datelike, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::{Validate, ValidationError};

use crate::api::extractors::ValidatedJson;
use crate::api::middleware::CurrentUser;
use crate::api::AppState;
use crate::config::{
    is_valid_emirate, DEFAULT_CURRENCY, MAX_LISTING_IMAGES, MAX_LISTING_MILEAGE,
    MAX_LISTING_PRICE, MAX_LISTING_VIDEOS, MIN_LISTING_PRICE, MIN_LISTING_YEAR,
};
use crate::domain::{FilterOptions, ListingFilters, ListingSort, ListingStatus};
use crate::errors::AppResult;
use crate::infra::repositories::entities::listing;
use crate::infra::repositories::{ListingChanges, ListingWithSeller, NewListing};
use crate::services::ViewContext;
use crate::types::{Paginated, PaginationParams};

/// Search query parameters; all filters are optional
#[derive(Debug, Default, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct ListingSearchQuery {
    /// 1-based page number
    pub page: Option<u64>,
    /// Page size (capped server-side)
    pub limit: Option<u64>,
    /// Free text matched against title, description, make and model
    pub search: Option<String>,
    pub make: Option<String>,
    pub model: Option<String>,
    pub year_from: Option<i32>,
    pub year_to: Option<i32>,
    pub price_from: Option<Decimal>,
    pub price_to: Option<Decimal>,
    pub mileage_from: Option<i32>,
    pub mileage_to: Option<i32>,
    pub fuel_type: Option<String>,
    pub transmission: Option<String>,
    pub body_type: Option<String>,
    pub emirate: Option<String>,
    pub city: Option<String>,
    pub condition: Option<String>,
    /// `field-order`, e.g. `price-asc`; defaults to `createdAt-desc`
    pub sort: Option<String>,
}

/// Blank query values apply no predicate
fn non_empty(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

impl ListingSearchQuery {
    pub fn filters(self) -> (ListingFilters, ListingSort, PaginationParams) {
        let page = PaginationParams::new(
            self.page.unwrap_or(1),
            self.limit.unwrap_or_else(|| PaginationParams::default().limit),
        );
        let sort = self
            .sort
            .as_deref()
            .map(ListingSort::parse)
            .unwrap_or_default();

        let filters = ListingFilters {
            make: non_empty(self.make),
            model: non_empty(self.model),
            year_from: self.year_from,
            year_to: self.year_to,
            price_from: self.price_from,
            price_to: self.price_to,
            mileage_from: self.mileage_from,
            mileage_to: self.mileage_to,
            fuel_type: non_empty(self.fuel_type),
            transmission: non_empty(self.transmission),
            body_type: non_empty(self.body_type),
            emirate: non_empty(self.emirate),
            city: non_empty(self.city),
            condition: non_empty(self.condition),
            search: non_empty(self.search),
        };

        (filters, sort, page)
    }
}

fn validate_price(price: &Decimal) -> Result<(), ValidationError> {
    let min = Decimal::try_from(MIN_LISTING_PRICE).unwrap_or(Decimal::ZERO);
    let max = Decimal::try_from(MAX_LISTING_PRICE).unwrap_or(Decimal::MAX);
    if *price < min || *price > max {
        return Err(ValidationError::new("price_out_of_range")
            .with_message("Price must be between 1,000 and 10,000,000 AED".into()));
    }
    Ok(())
}

fn validate_year(year: i32) -> Result<(), ValidationError> {
    // Next model year is sold before the calendar year starts
    let max = Utc::now().year() + 1;
    if year < MIN_LISTING_YEAR || year > max {
        return Err(ValidationError::new("year_out_of_range")
            .with_message("Year is outside the accepted range".into()));
    }
    Ok(())
}

fn validate_emirate(emirate: &str) -> Result<(), ValidationError> {
    if !is_valid_emirate(emirate) {
        return Err(ValidationError::new("unknown_emirate")
            .with_message("Emirate must be one of the seven emirates".into()));
    }
    Ok(())
}

/// New listing request
#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateListingRequest {
    #[validate(length(min = 3, max = 200, message = "Title must be 3-200 characters"))]
    #[schema(example = "2021 Toyota Land Cruiser GXR V6")]
    pub title: String,
    #[validate(length(max = 5000, message = "Description is too long"))]
    pub description: Option<String>,
    #[validate(custom(function = "validate_price"))]
    pub price: Decimal,
    #[validate(length(min = 1, max = 100, message = "Make is required"))]
    #[schema(example = "Toyota")]
    pub make: String,
    #[validate(length(min = 1, max = 100, message = "Model is required"))]
    #[schema(example = "Land Cruiser")]
    pub model: String,
    #[validate(custom(function = "validate_year"))]
    #[schema(example = 2021)]
    pub year: i32,
    #[validate(range(min = 0, max = MAX_LISTING_MILEAGE, message = "Mileage is out of range"))]
    pub mileage: Option<i32>,
    pub fuel_type: Option<String>,
    pub transmission: Option<String>,
    pub body_type: Option<String>,
    pub color: Option<String>,
    #[validate(range(min = 2, max = 6))]
    pub doors: Option<i32>,
    #[validate(range(min = 2, max = 16))]
    pub cylinders: Option<i32>,
    #[validate(range(min = 1, max = 2000))]
    pub horsepower: Option<i32>,
    #[validate(custom(function = "validate_emirate"))]
    #[schema(example = "Dubai")]
    pub emirate: Option<String>,
    pub city: Option<String>,
    pub area: Option<String>,
    pub features: Option<Vec<String>>,
    #[schema(example = "excellent")]
    pub condition: Option<String>,
    pub accident_history: Option<bool>,
    #[schema(value_type = Option<Object>)]
    pub service_history: Option<serde_json::Value>,
    #[validate(length(max = MAX_LISTING_IMAGES, message = "Too many images"))]
    pub images: Option<Vec<String>>,
    #[validate(length(max = MAX_LISTING_VIDEOS, message = "Too many videos"))]
    pub videos: Option<Vec<String>>,
    /// Defaults to active (published immediately)
    pub status: Option<ListingStatus>,
}

impl CreateListingRequest {
    fn into_new_listing(self, user_id: Uuid) -> NewListing {
        NewListing {
            user_id,
            title: self.title,
            description: self.description,
            price: self.price,
            currency: DEFAULT_CURRENCY.to_string(),
            status: self.status.unwrap_or(ListingStatus::Active),
            make: self.make,
            model: self.model,
            year: self.year,
            mileage: self.mileage,
            fuel_type: self.fuel_type,
            transmission: self.transmission,
            body_type: self.body_type,
            color: self.color,
            doors: self.doors,
            cylinders: self.cylinders,
            horsepower: self.horsepower,
            emirate: self.emirate,
            city: self.city,
            area: self.area,
            features: self.features.map(|v| serde_json::json!(v)),
            condition: self.condition,
            accident_history: self.accident_history,
            service_history: self.service_history,
            images: self.images.map(|v| serde_json::json!(v)),
            videos: self.videos.map(|v| serde_json::json!(v)),
            slug: None,
        }
    }
}

/// Partial listing update request
#[derive(Debug, Default, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateListingRequest {
    #[validate(length(min = 3, max = 200, message = "Title must be 3-200 characters"))]
    pub title: Option<String>,
    #[validate(length(max = 5000, message = "Description is too long"))]
    pub description: Option<String>,
    #[validate(custom(function = "validate_price"))]
    pub price: Option<Decimal>,
    /// Lifecycle transition, e.g. publish a draft or mark as sold
    pub status: Option<ListingStatus>,
    #[validate(length(min = 1, max = 100))]
    pub make: Option<String>,
    #[validate(length(min = 1, max = 100))]
    pub model: Option<String>,
    #[validate(custom(function = "validate_year"))]
    pub year: Option<i32>,
    #[validate(range(min = 0, max = MAX_LISTING_MILEAGE, message = "Mileage is out of range"))]
    pub mileage: Option<i32>,
    pub fuel_type: Option<String>,
    pub transmission: Option<String>,
    pub body_type: Option<String>,
    pub color: Option<String>,
    #[validate(range(min = 2, max = 6))]
    pub doors: Option<i32>,
    #[validate(range(min = 2, max = 16))]
    pub cylinders: Option<i32>,
    #[validate(range(min = 1, max = 2000))]
    pub horsepower: Option<i32>,
    #[validate(custom(function = "validate_emirate"))]
    pub emirate: Option<String>,
    pub city: Option<String>,
    pub area: Option<String>,
    pub features: Option<Vec<String>>,
    pub condition: Option<String>,
    pub accident_history: Option<bool>,
    #[schema(value_type = Option<Object>)]
    pub service_history: Option<serde_json::Value>,
    #[validate(length(max = MAX_LISTING_IMAGES, message = "Too many images"))]
    pub images: Option<Vec<String>>,
    #[validate(length(max = MAX_LISTING_VIDEOS, message = "Too many videos"))]
    pub videos: Option<Vec<String>>,
}

impl From<UpdateListingRequest> for ListingChanges {
    fn from(req: UpdateListingRequest) -> Self {
        ListingChanges {
            title: req.title,
            description: req.description,
            price: req.price,
            status: req.status,
            make: req.make,
            model: req.model,
            year: req.year,
            mileage: req.mileage,
            fuel_type: req.fuel_type,
            transmission: req.transmission,
            body_type: req.body_type,
            color: req.color,
            doors: req.doors,
            cylinders: req.cylinders,
            horsepower: req.horsepower,
            emirate: req.emirate,
            city: req.city,
            area: req.area,
            features: req.features.map(|v| serde_json::json!(v)),
            condition: req.condition,
            accident_history: req.accident_history,
            service_history: req.service_history,
            images: req.images.map(|v| serde_json::json!(v)),
            videos: req.videos.map(|v| serde_json::json!(v)),
            published_at: None,
        }
    }
}

#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct LimitQuery {
    pub limit: Option<u64>,
}

#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct MakeQuery {
    pub make: Option<String>,
}

/// Public catalogue routes
pub fn listing_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(search_listings))
        .route("/featured", get(featured_listings))
        .route("/filters", get(filter_options))
        .route("/models", get(models_for_make))
        .route("/:id", get(get_listing))
        .route("/:id/similar", get(similar_listings))
}

/// Owner routes, mounted behind the auth middleware
pub fn listing_owner_routes() -> Router<AppState> {
    Router::new()
        .route("/", axum::routing::post(create_listing))
        .route("/mine", get(my_listings))
        .route("/favorites", get(saved_listings))
        .route(
            "/:id",
            axum::routing::put(update_listing).delete(delete_listing),
        )
        .route(
            "/:id/favorite",
            get(favorite_state)
                .post(save_listing)
                .delete(unsave_listing),
        )
        .route("/:id/views", get(listing_views))
}

/// Search active listings
#[utoipa::path(
    get,
    path = "/api/listings",
    tag = "Listings",
    params(ListingSearchQuery),
    responses(
        (status = 200, description = "Page of matching listings with pagination meta")
    )
)]
pub async fn search_listings(
    State(state): State<AppState>,
    Query(query): Query<ListingSearchQuery>,
) -> AppResult<Json<Paginated<listing::Model>>> {
    let (filters, sort, page) = query.filters();
    let result = state.listing_service.search(filters, sort, page).await?;
    Ok(Json(result))
}

/// Newest active listings
#[utoipa::path(
    get,
    path = "/api/listings/featured",
    tag = "Listings",
    params(LimitQuery),
    responses((status = 200, description = "Featured listings"))
)]
pub async fn featured_listings(
    State(state): State<AppState>,
    Query(query): Query<LimitQuery>,
) -> AppResult<Json<Vec<listing::Model>>> {
    let listings = state.listing_service.featured(query.limit).await?;
    Ok(Json(listings))
}

/// Selectable filter values derived from active listings
#[utoipa::path(
    get,
    path = "/api/listings/filters",
    tag = "Listings",
    responses((status = 200, description = "Filter options", body = FilterOptions))
)]
pub async fn filter_options(State(state): State<AppState>) -> AppResult<Json<FilterOptions>> {
    let options = state.listing_service.filter_options().await?;
    Ok(Json(options))
}

/// Models available for a make
#[utoipa::path(
    get,
    path = "/api/listings/models",
    tag = "Listings",
    params(MakeQuery),
    responses(
        (status = 200, description = "Model names"),
        (status = 400, description = "Missing make parameter")
    )
)]
pub async fn models_for_make(
    State(state): State<AppState>,
    Query(query): Query<MakeQuery>,
) -> AppResult<Json<Vec<String>>> {
    let models = state
        .listing_service
        .models_for_make(query.make.as_deref().unwrap_or(""))
        .await?;
    Ok(Json(models))
}

/// Public listing detail with seller summary
#[utoipa::path(
    get,
    path = "/api/listings/{id}",
    tag = "Listings",
    params(("id" = Uuid, Path, description = "Listing id")),
    responses(
        (status = 200, description = "Listing with seller"),
        (status = 404, description = "Not found or not active")
    )
)]
pub async fn get_listing(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    headers: HeaderMap,
) -> AppResult<Json<ListingWithSeller>> {
    let listing = state.listing_service.get(id).await?;

    state
        .engagement_service
        .record_view(id, view_context(&headers))
        .await;

    Ok(Json(listing))
}

/// Client context for a recorded view; the detail route is public so
/// there is no authenticated user to attribute.
fn view_context(headers: &HeaderMap) -> ViewContext {
    let header_str = |name| {
        headers
            .get(name)
            .and_then(|v: &axum::http::HeaderValue| v.to_str().ok())
            .map(str::to_string)
    };

    let ip_address = header_str("x-forwarded-for")
        .and_then(|v| v.split(',').next().map(|ip| ip.trim().to_string()));

    ViewContext {
        user_id: None,
        ip_address,
        user_agent: header_str(header::USER_AGENT.as_str()),
    }
}

/// Active listings of the same make and model
#[utoipa::path(
    get,
    path = "/api/listings/{id}/similar",
    tag = "Listings",
    params(("id" = Uuid, Path, description = "Listing id"), LimitQuery),
    responses(
        (status = 200, description = "Similar listings"),
        (status = 404, description = "Reference listing not found")
    )
)]
pub async fn similar_listings(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Query(query): Query<LimitQuery>,
) -> AppResult<Json<Vec<listing::Model>>> {
    let listings = state.listing_service.similar(id, query.limit).await?;
    Ok(Json(listings))
}

/// Caller's own listings, any status
#[utoipa::path(
    get,
    path = "/api/listings/mine",
    tag = "Listings",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Own listings"),
        (status = 401, description = "Missing or invalid token")
    )
)]
pub async fn my_listings(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
) -> AppResult<Json<Vec<listing::Model>>> {
    let listings = state.listing_service.my_listings(current.id).await?;
    Ok(Json(listings))
}

/// Create a listing
#[utoipa::path(
    post,
    path = "/api/listings",
    tag = "Listings",
    security(("bearer_auth" = [])),
    request_body = CreateListingRequest,
    responses(
        (status = 201, description = "Listing created"),
        (status = 400, description = "Validation error"),
        (status = 401, description = "Missing or invalid token")
    )
)]
pub async fn create_listing(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    ValidatedJson(payload): ValidatedJson<CreateListingRequest>,
) -> AppResult<(StatusCode, Json<listing::Model>)> {
    let listing = state
        .listing_service
        .create(payload.into_new_listing(current.id))
        .await?;

    Ok((StatusCode::CREATED, Json(listing)))
}

/// Update an owned listing
#[utoipa::path(
    put,
    path = "/api/listings/{id}",
    tag = "Listings",
    security(("bearer_auth" = [])),
    params(("id" = Uuid, Path, description = "Listing id")),
    request_body = UpdateListingRequest,
    responses(
        (status = 200, description = "Listing updated"),
        (status = 400, description = "Validation error"),
        (status = 401, description = "Missing or invalid token"),
        (status = 404, description = "Not found or not owned by the caller")
    )
)]
pub async fn update_listing(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Extension(current): Extension<CurrentUser>,
    ValidatedJson(payload): ValidatedJson<UpdateListingRequest>,
) -> AppResult<Json<listing::Model>> {
    let listing = state
        .listing_service
        .update(id, current.id, payload.into())
        .await?;

    Ok(Json(listing))
}

/// Delete an owned listing
#[utoipa::path(
    delete,
    path = "/api/listings/{id}",
    tag = "Listings",
    security(("bearer_auth" = [])),
    params(("id" = Uuid, Path, description = "Listing id")),
    responses(
        (status = 204, description = "Listing deleted"),
        (status = 401, description = "Missing or invalid token"),
        (status = 404, description = "Not found or not owned by the caller")
    )
)]
pub async fn delete_listing(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Extension(current): Extension<CurrentUser>,
) -> AppResult<StatusCode> {
    state.listing_service.delete(id, current.id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Whether the caller has saved a listing
#[derive(Debug, Serialize, ToSchema)]
pub struct SavedResponse {
    pub saved: bool,
}

/// View count of an owned listing
#[derive(Debug, Serialize, ToSchema)]
pub struct ViewsResponse {
    pub views: u64,
}

/// The caller's saved listings
#[utoipa::path(
    get,
    path = "/api/listings/favorites",
    tag = "Favorites",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Saved listings, most recently saved first"),
        (status = 401, description = "Missing or invalid token")
    )
)]
pub async fn saved_listings(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
) -> AppResult<Json<Vec<listing::Model>>> {
    let listings = state.engagement_service.saved_listings(current.id).await?;
    Ok(Json(listings))
}

/// Check whether a listing is saved
#[utoipa::path(
    get,
    path = "/api/listings/{id}/favorite",
    tag = "Favorites",
    security(("bearer_auth" = [])),
    params(("id" = Uuid, Path, description = "Listing id")),
    responses((status = 200, description = "Saved state", body = SavedResponse))
)]
pub async fn favorite_state(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Extension(current): Extension<CurrentUser>,
) -> AppResult<Json<SavedResponse>> {
    let saved = state.engagement_service.is_saved(current.id, id).await?;
    Ok(Json(SavedResponse { saved }))
}

/// Save a listing to the caller's favorites
#[utoipa::path(
    post,
    path = "/api/listings/{id}/favorite",
    tag = "Favorites",
    security(("bearer_auth" = [])),
    params(("id" = Uuid, Path, description = "Listing id")),
    responses(
        (status = 201, description = "Listing saved"),
        (status = 404, description = "Listing not found or not active")
    )
)]
pub async fn save_listing(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Extension(current): Extension<CurrentUser>,
) -> AppResult<StatusCode> {
    state.engagement_service.save_listing(current.id, id).await?;
    Ok(StatusCode::CREATED)
}

/// Remove a listing from the caller's favorites
#[utoipa::path(
    delete,
    path = "/api/listings/{id}/favorite",
    tag = "Favorites",
    security(("bearer_auth" = [])),
    params(("id" = Uuid, Path, description = "Listing id")),
    responses(
        (status = 204, description = "Removed"),
        (status = 404, description = "Listing was not saved")
    )
)]
pub async fn unsave_listing(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Extension(current): Extension<CurrentUser>,
) -> AppResult<StatusCode> {
    state
        .engagement_service
        .unsave_listing(current.id, id)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

/// View count of one of the caller's own listings
#[utoipa::path(
    get,
    path = "/api/listings/{id}/views",
    tag = "Listings",
    security(("bearer_auth" = [])),
    params(("id" = Uuid, Path, description = "Listing id")),
    responses(
        (status = 200, description = "View count", body = ViewsResponse),
        (status = 404, description = "Not found or not owned by the caller")
    )
)]
pub async fn listing_views(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Extension(current): Extension<CurrentUser>,
) -> AppResult<Json<ViewsResponse>> {
    let views = state.engagement_service.listing_views(current.id, id).await?;
    Ok(Json(ViewsResponse { views }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_query_values_become_no_predicate() {
        let query = ListingSearchQuery {
            make: Some("  ".into()),
            model: Some("".into()),
            search: Some(" corolla ".into()),
            ..Default::default()
        };
        let (filters, _, _) = query.filters();
        assert_eq!(filters.make, None);
        assert_eq!(filters.model, None);
        assert_eq!(filters.search.as_deref(), Some("corolla"));
    }

    #[test]
    fn sort_defaults_to_newest_first() {
        let (_, sort, _) = ListingSearchQuery::default().filters();
        assert_eq!(sort, ListingSort::default());
    }

    #[test]
    fn year_bounds_follow_the_calendar() {
        assert!(validate_year(1989).is_err());
        assert!(validate_year(2005).is_ok());
        assert!(validate_year(Utc::now().year() + 1).is_ok());
        assert!(validate_year(Utc::now().year() + 2).is_err());
    }

    #[test]
    fn emirate_names_are_checked() {
        assert!(validate_emirate("Dubai").is_ok());
        assert!(validate_emirate("Riyadh").is_err());
    }
}
