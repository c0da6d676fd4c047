//! Listings repository - search, filter options and owner-scoped CRUD.
//!
//! The search path composes predicates dynamically from the optional
//! filters, always restricted to active listings, and runs two
//! statements: one bounded page and one count over the same condition
//! set. The count and the page are not taken in a single snapshot, so
//! they can skew under concurrent writes; callers accept that.

use async_trait::async_trait;
use chrono::{Datelike, Utc};
use rust_decimal::Decimal;
use sea_orm::sea_query::extension::postgres::PgExpr;
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, DatabaseConnection, EntityTrait, PaginatorTrait,
    QueryFilter, QueryOrder, QuerySelect, Set,
};
use serde::Serialize;
use utoipa::ToSchema;
use uuid::Uuid;

use super::entities::{listing, user};
use crate::config::{FALLBACK_MAX_PRICE, FALLBACK_MIN_YEAR};
use crate::domain::{
    FilterOptions, ListingFilters, ListingSort, ListingStatus, PriceRange, SortField, SortOrder,
    UserRole, YearRange,
};
use crate::errors::AppResult;
use crate::types::PaginationParams;

/// Seller fields exposed on a public listing
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SellerSummary {
    pub id: Uuid,
    pub name: Option<String>,
    pub role: UserRole,
    pub is_dealer_verified: bool,
}

impl From<user::Model> for SellerSummary {
    fn from(user: user::Model) -> Self {
        Self {
            id: user.id,
            name: user.name,
            role: user.role,
            is_dealer_verified: user.is_dealer_verified,
        }
    }
}

/// A public listing joined with its seller
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct ListingWithSeller {
    #[serde(flatten)]
    #[schema(value_type = Object)]
    pub listing: listing::Model,
    pub user: SellerSummary,
}

/// Column values for a new listing row
#[derive(Debug, Clone)]
pub struct NewListing {
    pub user_id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub price: Decimal,
    pub currency: String,
    pub status: ListingStatus,
    pub make: String,
    pub model: String,
    pub year: i32,
    pub mileage: Option<i32>,
    pub fuel_type: Option<String>,
    pub transmission: Option<String>,
    pub body_type: Option<String>,
    pub color: Option<String>,
    pub doors: Option<i32>,
    pub cylinders: Option<i32>,
    pub horsepower: Option<i32>,
    pub emirate: Option<String>,
    pub city: Option<String>,
    pub area: Option<String>,
    pub features: Option<serde_json::Value>,
    pub condition: Option<String>,
    pub accident_history: Option<bool>,
    pub service_history: Option<serde_json::Value>,
    pub images: Option<serde_json::Value>,
    pub videos: Option<serde_json::Value>,
    pub slug: Option<String>,
}

/// Partial update of an owned listing; absent fields are left untouched
#[derive(Debug, Clone, Default)]
pub struct ListingChanges {
    pub title: Option<String>,
    pub description: Option<String>,
    pub price: Option<Decimal>,
    pub status: Option<ListingStatus>,
    pub make: Option<String>,
    pub model: Option<String>,
    pub year: Option<i32>,
    pub mileage: Option<i32>,
    pub fuel_type: Option<String>,
    pub transmission: Option<String>,
    pub body_type: Option<String>,
    pub color: Option<String>,
    pub doors: Option<i32>,
    pub cylinders: Option<i32>,
    pub horsepower: Option<i32>,
    pub emirate: Option<String>,
    pub city: Option<String>,
    pub area: Option<String>,
    pub features: Option<serde_json::Value>,
    pub condition: Option<String>,
    pub accident_history: Option<bool>,
    pub service_history: Option<serde_json::Value>,
    pub images: Option<serde_json::Value>,
    pub videos: Option<serde_json::Value>,
    pub published_at: Option<chrono::DateTime<Utc>>,
}

/// Listings data access
#[async_trait]
pub trait ListingRepository: Send + Sync {
    /// Search active listings with filters, sort and offset pagination.
    /// Returns the page plus the total matching count.
    async fn search(
        &self,
        filters: &ListingFilters,
        sort: ListingSort,
        page: &PaginationParams,
    ) -> AppResult<(Vec<listing::Model>, u64)>;

    /// Distinct selectable values per filterable attribute over the
    /// active set, plus year/price bounds. Recomputed on every call.
    async fn filter_options(&self) -> AppResult<FilterOptions>;

    /// Distinct models available for a given make (active listings only)
    async fn models_for_make(&self, make: &str) -> AppResult<Vec<String>>;

    /// Active listing by id with seller summary
    async fn find_public(&self, id: Uuid) -> AppResult<Option<ListingWithSeller>>;

    /// Owner view of a single listing, any status
    async fn find_for_user(&self, id: Uuid, user_id: Uuid) -> AppResult<Option<listing::Model>>;

    /// Owner view of all own listings, any status, newest first
    async fn list_for_user(&self, user_id: Uuid) -> AppResult<Vec<listing::Model>>;

    async fn create(&self, data: NewListing) -> AppResult<listing::Model>;

    /// Update scoped by owner; `None` when the row is not owned by the caller
    async fn update(
        &self,
        id: Uuid,
        user_id: Uuid,
        changes: ListingChanges,
    ) -> AppResult<Option<listing::Model>>;

    /// Delete scoped by owner; `false` when nothing matched
    async fn delete(&self, id: Uuid, user_id: Uuid) -> AppResult<bool>;

    /// Newest active listings
    async fn featured(&self, limit: u64) -> AppResult<Vec<listing::Model>>;

    /// Active listings of the same make/model, excluding the listing itself
    async fn similar(
        &self,
        id: Uuid,
        make: &str,
        model: &str,
        limit: u64,
    ) -> AppResult<Vec<listing::Model>>;

    /// Active listings of a verified dealer
    async fn list_for_dealer(&self, dealer_id: Uuid, limit: u64) -> AppResult<Vec<listing::Model>>;
}

/// SeaORM-backed listings repository
pub struct ListingStore {
    db: DatabaseConnection,
}

impl ListingStore {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Distinct non-empty values of one categorical column over the
    /// active set, sorted ascending.
    async fn distinct_values(&self, column: listing::Column) -> AppResult<Vec<String>> {
        let values: Vec<String> = listing::Entity::find()
            .select_only()
            .column(column)
            .distinct()
            .filter(listing::Column::Status.eq(ListingStatus::Active))
            .filter(column.is_not_null())
            .filter(column.ne(""))
            .order_by_asc(column)
            .into_tuple()
            .all(&self.db)
            .await?;

        Ok(values)
    }
}

/// Compose the WHERE clause for a search. Every predicate is optional
/// except the active-status restriction; substring filters are
/// case-insensitive, range filters inclusive, free text ORs across
/// title/description/make/model.
pub(crate) fn search_conditions(filters: &ListingFilters) -> Condition {
    let mut cond = Condition::all().add(listing::Column::Status.eq(ListingStatus::Active));

    if let Some(make) = &filters.make {
        cond = cond.add(Expr::col(listing::Column::Make).ilike(format!("%{}%", make)));
    }
    if let Some(model) = &filters.model {
        cond = cond.add(Expr::col(listing::Column::Model).ilike(format!("%{}%", model)));
    }
    if let Some(year_from) = filters.year_from {
        cond = cond.add(listing::Column::Year.gte(year_from));
    }
    if let Some(year_to) = filters.year_to {
        cond = cond.add(listing::Column::Year.lte(year_to));
    }
    if let Some(price_from) = filters.price_from {
        cond = cond.add(listing::Column::Price.gte(price_from));
    }
    if let Some(price_to) = filters.price_to {
        cond = cond.add(listing::Column::Price.lte(price_to));
    }
    if let Some(mileage_from) = filters.mileage_from {
        cond = cond.add(listing::Column::Mileage.gte(mileage_from));
    }
    if let Some(mileage_to) = filters.mileage_to {
        cond = cond.add(listing::Column::Mileage.lte(mileage_to));
    }
    if let Some(fuel_type) = &filters.fuel_type {
        cond = cond.add(listing::Column::FuelType.eq(fuel_type));
    }
    if let Some(transmission) = &filters.transmission {
        cond = cond.add(listing::Column::Transmission.eq(transmission));
    }
    if let Some(body_type) = &filters.body_type {
        cond = cond.add(listing::Column::BodyType.eq(body_type));
    }
    if let Some(emirate) = &filters.emirate {
        cond = cond.add(listing::Column::Emirate.eq(emirate));
    }
    if let Some(city) = &filters.city {
        cond = cond.add(listing::Column::City.eq(city));
    }
    if let Some(condition) = &filters.condition {
        cond = cond.add(listing::Column::Condition.eq(condition));
    }
    if let Some(search) = &filters.search {
        let pattern = format!("%{}%", search);
        cond = cond.add(
            Condition::any()
                .add(Expr::col(listing::Column::Title).ilike(pattern.clone()))
                .add(Expr::col(listing::Column::Description).ilike(pattern.clone()))
                .add(Expr::col(listing::Column::Make).ilike(pattern.clone()))
                .add(Expr::col(listing::Column::Model).ilike(pattern)),
        );
    }

    cond
}

fn sort_column(field: SortField) -> listing::Column {
    match field {
        SortField::Price => listing::Column::Price,
        SortField::Year => listing::Column::Year,
        SortField::Mileage => listing::Column::Mileage,
        SortField::CreatedAt => listing::Column::CreatedAt,
    }
}

#[async_trait]
impl ListingRepository for ListingStore {
    async fn search(
        &self,
        filters: &ListingFilters,
        sort: ListingSort,
        page: &PaginationParams,
    ) -> AppResult<(Vec<listing::Model>, u64)> {
        let cond = search_conditions(filters);

        let query = listing::Entity::find().filter(cond.clone());
        let query = match sort.order {
            SortOrder::Asc => query.order_by_asc(sort_column(sort.field)),
            SortOrder::Desc => query.order_by_desc(sort_column(sort.field)),
        };

        let rows = query
            .limit(page.limit())
            .offset(page.offset())
            .all(&self.db)
            .await?;

        let total = listing::Entity::find()
            .filter(cond)
            .count(&self.db)
            .await?;

        Ok((rows, total))
    }

    async fn filter_options(&self) -> AppResult<FilterOptions> {
        let makes = self.distinct_values(listing::Column::Make).await?;
        let fuel_types = self.distinct_values(listing::Column::FuelType).await?;
        let transmissions = self.distinct_values(listing::Column::Transmission).await?;
        let body_types = self.distinct_values(listing::Column::BodyType).await?;
        let emirates = self.distinct_values(listing::Column::Emirate).await?;
        let conditions = self.distinct_values(listing::Column::Condition).await?;

        let year_bounds: Option<(Option<i32>, Option<i32>)> = listing::Entity::find()
            .select_only()
            .expr(listing::Column::Year.min())
            .expr(listing::Column::Year.max())
            .filter(listing::Column::Status.eq(ListingStatus::Active))
            .into_tuple()
            .one(&self.db)
            .await?;
        let (min_year, max_year) = year_bounds.unwrap_or((None, None));

        let price_bounds: Option<(Option<Decimal>, Option<Decimal>)> = listing::Entity::find()
            .select_only()
            .expr(listing::Column::Price.min())
            .expr(listing::Column::Price.max())
            .filter(listing::Column::Status.eq(ListingStatus::Active))
            .into_tuple()
            .one(&self.db)
            .await?;
        let (min_price, max_price) = price_bounds.unwrap_or((None, None));

        Ok(FilterOptions {
            makes,
            fuel_types,
            transmissions,
            body_types,
            emirates,
            conditions,
            year_range: YearRange {
                min: min_year.unwrap_or(FALLBACK_MIN_YEAR),
                max: max_year.unwrap_or_else(|| Utc::now().year()),
            },
            price_range: PriceRange {
                min: min_price.unwrap_or(Decimal::ZERO),
                max: max_price.unwrap_or_else(|| Decimal::from(FALLBACK_MAX_PRICE)),
            },
        })
    }

    async fn models_for_make(&self, make: &str) -> AppResult<Vec<String>> {
        let models: Vec<String> = listing::Entity::find()
            .select_only()
            .column(listing::Column::Model)
            .distinct()
            .filter(listing::Column::Status.eq(ListingStatus::Active))
            .filter(listing::Column::Make.eq(make))
            .filter(listing::Column::Model.ne(""))
            .order_by_asc(listing::Column::Model)
            .into_tuple()
            .all(&self.db)
            .await?;

        Ok(models)
    }

    async fn find_public(&self, id: Uuid) -> AppResult<Option<ListingWithSeller>> {
        let result = listing::Entity::find_by_id(id)
            .filter(listing::Column::Status.eq(ListingStatus::Active))
            .find_also_related(user::Entity)
            .one(&self.db)
            .await?;

        match result {
            // The user FK is not nullable; a missing seller means the
            // row was read mid-delete, treat it as absent.
            Some((listing, Some(seller))) => Ok(Some(ListingWithSeller {
                listing,
                user: SellerSummary::from(seller),
            })),
            _ => Ok(None),
        }
    }

    async fn find_for_user(&self, id: Uuid, user_id: Uuid) -> AppResult<Option<listing::Model>> {
        listing::Entity::find_by_id(id)
            .filter(listing::Column::UserId.eq(user_id))
            .one(&self.db)
            .await
            .map_err(Into::into)
    }

    async fn list_for_user(&self, user_id: Uuid) -> AppResult<Vec<listing::Model>> {
        listing::Entity::find()
            .filter(listing::Column::UserId.eq(user_id))
            .order_by_desc(listing::Column::CreatedAt)
            .all(&self.db)
            .await
            .map_err(Into::into)
    }

    async fn create(&self, data: NewListing) -> AppResult<listing::Model> {
        let now = Utc::now();
        let published_at = data.status.is_active().then_some(now);

        let active = listing::ActiveModel {
            id: Set(Uuid::new_v4()),
            user_id: Set(data.user_id),
            title: Set(data.title),
            description: Set(data.description),
            price: Set(data.price),
            currency: Set(data.currency),
            status: Set(data.status),
            make: Set(data.make),
            model: Set(data.model),
            year: Set(data.year),
            mileage: Set(data.mileage),
            fuel_type: Set(data.fuel_type),
            transmission: Set(data.transmission),
            body_type: Set(data.body_type),
            color: Set(data.color),
            doors: Set(data.doors),
            cylinders: Set(data.cylinders),
            horsepower: Set(data.horsepower),
            emirate: Set(data.emirate),
            city: Set(data.city),
            area: Set(data.area),
            features: Set(data.features),
            condition: Set(data.condition),
            accident_history: Set(data.accident_history),
            service_history: Set(data.service_history),
            images: Set(data.images),
            videos: Set(data.videos),
            slug: Set(data.slug),
            meta_title: Set(None),
            meta_description: Set(None),
            published_at: Set(published_at),
            expires_at: Set(None),
            created_at: Set(now),
            updated_at: Set(now),
        };

        active.insert(&self.db).await.map_err(Into::into)
    }

    async fn update(
        &self,
        id: Uuid,
        user_id: Uuid,
        changes: ListingChanges,
    ) -> AppResult<Option<listing::Model>> {
        let Some(existing) = self.find_for_user(id, user_id).await? else {
            return Ok(None);
        };

        let mut active: listing::ActiveModel = existing.into();

        if let Some(title) = changes.title {
            active.title = Set(title);
        }
        if let Some(description) = changes.description {
            active.description = Set(Some(description));
        }
        if let Some(price) = changes.price {
            active.price = Set(price);
        }
        if let Some(status) = changes.status {
            active.status = Set(status);
        }
        if let Some(make) = changes.make {
            active.make = Set(make);
        }
        if let Some(model) = changes.model {
            active.model = Set(model);
        }
        if let Some(year) = changes.year {
            active.year = Set(year);
        }
        if let Some(mileage) = changes.mileage {
            active.mileage = Set(Some(mileage));
        }
        if let Some(fuel_type) = changes.fuel_type {
            active.fuel_type = Set(Some(fuel_type));
        }
        if let Some(transmission) = changes.transmission {
            active.transmission = Set(Some(transmission));
        }
        if let Some(body_type) = changes.body_type {
            active.body_type = Set(Some(body_type));
        }
        if let Some(color) = changes.color {
            active.color = Set(Some(color));
        }
        if let Some(doors) = changes.doors {
            active.doors = Set(Some(doors));
        }
        if let Some(cylinders) = changes.cylinders {
            active.cylinders = Set(Some(cylinders));
        }
        if let Some(horsepower) = changes.horsepower {
            active.horsepower = Set(Some(horsepower));
        }
        if let Some(emirate) = changes.emirate {
            active.emirate = Set(Some(emirate));
        }
        if let Some(city) = changes.city {
            active.city = Set(Some(city));
        }
        if let Some(area) = changes.area {
            active.area = Set(Some(area));
        }
        if let Some(features) = changes.features {
            active.features = Set(Some(features));
        }
        if let Some(condition) = changes.condition {
            active.condition = Set(Some(condition));
        }
        if let Some(accident_history) = changes.accident_history {
            active.accident_history = Set(Some(accident_history));
        }
        if let Some(service_history) = changes.service_history {
            active.service_history = Set(Some(service_history));
        }
        if let Some(images) = changes.images {
            active.images = Set(Some(images));
        }
        if let Some(videos) = changes.videos {
            active.videos = Set(Some(videos));
        }
        if let Some(published_at) = changes.published_at {
            active.published_at = Set(Some(published_at));
        }
        active.updated_at = Set(Utc::now());

        let updated = active.update(&self.db).await?;
        Ok(Some(updated))
    }

    async fn delete(&self, id: Uuid, user_id: Uuid) -> AppResult<bool> {
        let result = listing::Entity::delete_many()
            .filter(listing::Column::Id.eq(id))
            .filter(listing::Column::UserId.eq(user_id))
            .exec(&self.db)
            .await?;

        Ok(result.rows_affected > 0)
    }

    async fn featured(&self, limit: u64) -> AppResult<Vec<listing::Model>> {
        listing::Entity::find()
            .filter(listing::Column::Status.eq(ListingStatus::Active))
            .order_by_desc(listing::Column::CreatedAt)
            .limit(limit)
            .all(&self.db)
            .await
            .map_err(Into::into)
    }

    async fn similar(
        &self,
        id: Uuid,
        make: &str,
        model: &str,
        limit: u64,
    ) -> AppResult<Vec<listing::Model>> {
        listing::Entity::find()
            .filter(listing::Column::Status.eq(ListingStatus::Active))
            .filter(listing::Column::Id.ne(id))
            .filter(listing::Column::Make.eq(make))
            .filter(Expr::col(listing::Column::Model).ilike(format!("%{}%", model)))
            .order_by_desc(listing::Column::CreatedAt)
            .limit(limit)
            .all(&self.db)
            .await
            .map_err(Into::into)
    }

    async fn list_for_dealer(&self, dealer_id: Uuid, limit: u64) -> AppResult<Vec<listing::Model>> {
        listing::Entity::find()
            .filter(listing::Column::Status.eq(ListingStatus::Active))
            .inner_join(user::Entity)
            .filter(user::Column::Id.eq(dealer_id))
            .filter(user::Column::Role.eq(UserRole::Dealer))
            .filter(user::Column::IsDealerVerified.eq(true))
            .order_by_desc(listing::Column::CreatedAt)
            .limit(limit)
            .all(&self.db)
            .await
            .map_err(Into::into)
    }
}
