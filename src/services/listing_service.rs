//! Listing service - public catalogue reads and owner-scoped writes.

use async_trait::async_trait;
use chrono::Utc;
use std::sync::Arc;
use uuid::Uuid;

use crate::config::{DEFAULT_FEATURED_LIMIT, DEFAULT_SIMILAR_LIMIT, MAX_PAGE_SIZE};
use crate::domain::{FilterOptions, ListingFilters, ListingSort, ListingStatus};
use crate::errors::{AppError, AppResult};
use crate::infra::repositories::entities::listing;
use crate::infra::repositories::{ListingChanges, ListingRepository, ListingWithSeller, NewListing};
use crate::types::{Paginated, PaginationParams};

/// Listing use cases
#[async_trait]
pub trait ListingService: Send + Sync {
    /// Public search over active listings
    async fn search(
        &self,
        filters: ListingFilters,
        sort: ListingSort,
        page: PaginationParams,
    ) -> AppResult<Paginated<listing::Model>>;

    /// Public listing detail with seller summary
    async fn get(&self, id: Uuid) -> AppResult<ListingWithSeller>;

    async fn featured(&self, limit: Option<u64>) -> AppResult<Vec<listing::Model>>;

    /// Active listings of the same make and model
    async fn similar(&self, id: Uuid, limit: Option<u64>) -> AppResult<Vec<listing::Model>>;

    async fn filter_options(&self) -> AppResult<FilterOptions>;

    async fn models_for_make(&self, make: &str) -> AppResult<Vec<String>>;

    /// All of the caller's own listings, any status
    async fn my_listings(&self, user_id: Uuid) -> AppResult<Vec<listing::Model>>;

    async fn create(&self, data: NewListing) -> AppResult<listing::Model>;

    async fn update(
        &self,
        id: Uuid,
        user_id: Uuid,
        changes: ListingChanges,
    ) -> AppResult<listing::Model>;

    async fn delete(&self, id: Uuid, user_id: Uuid) -> AppResult<()>;
}

/// URL-safe slug from a listing title, suffixed for uniqueness
fn listing_slug(title: &str) -> String {
    let mut slug = String::with_capacity(title.len());
    let mut last_dash = true;

    for c in title.chars() {
        if c.is_ascii_alphanumeric() {
            slug.push(c.to_ascii_lowercase());
            last_dash = false;
        } else if !last_dash {
            slug.push('-');
            last_dash = true;
        }
    }
    while slug.ends_with('-') {
        slug.pop();
    }

    let suffix = Uuid::new_v4().simple().to_string();
    if slug.is_empty() {
        suffix[..8].to_string()
    } else {
        format!("{}-{}", slug, &suffix[..8])
    }
}

/// Concrete ListingService over the listings repository
pub struct ListingManager {
    listings: Arc<dyn ListingRepository>,
}

impl ListingManager {
    pub fn new(listings: Arc<dyn ListingRepository>) -> Self {
        Self { listings }
    }
}

#[async_trait]
impl ListingService for ListingManager {
    async fn search(
        &self,
        filters: ListingFilters,
        sort: ListingSort,
        page: PaginationParams,
    ) -> AppResult<Paginated<listing::Model>> {
        let (rows, total) = self.listings.search(&filters, sort, &page).await?;
        Ok(Paginated::new(rows, page.page.max(1), page.limit(), total))
    }

    async fn get(&self, id: Uuid) -> AppResult<ListingWithSeller> {
        self.listings
            .find_public(id)
            .await?
            .ok_or(AppError::NotFound)
    }

    async fn featured(&self, limit: Option<u64>) -> AppResult<Vec<listing::Model>> {
        let limit = limit.unwrap_or(DEFAULT_FEATURED_LIMIT).clamp(1, MAX_PAGE_SIZE);
        self.listings.featured(limit).await
    }

    async fn similar(&self, id: Uuid, limit: Option<u64>) -> AppResult<Vec<listing::Model>> {
        let reference = self
            .listings
            .find_public(id)
            .await?
            .ok_or(AppError::NotFound)?;

        let limit = limit.unwrap_or(DEFAULT_SIMILAR_LIMIT).clamp(1, MAX_PAGE_SIZE);
        self.listings
            .similar(id, &reference.listing.make, &reference.listing.model, limit)
            .await
    }

    async fn filter_options(&self) -> AppResult<FilterOptions> {
        self.listings.filter_options().await
    }

    async fn models_for_make(&self, make: &str) -> AppResult<Vec<String>> {
        let make = make.trim();
        if make.is_empty() {
            return Err(AppError::validation("make parameter is required"));
        }
        self.listings.models_for_make(make).await
    }

    async fn my_listings(&self, user_id: Uuid) -> AppResult<Vec<listing::Model>> {
        self.listings.list_for_user(user_id).await
    }

    async fn create(&self, mut data: NewListing) -> AppResult<listing::Model> {
        data.slug = Some(listing_slug(&data.title));
        self.listings.create(data).await
    }

    async fn update(
        &self,
        id: Uuid,
        user_id: Uuid,
        mut changes: ListingChanges,
    ) -> AppResult<listing::Model> {
        let existing = self
            .listings
            .find_for_user(id, user_id)
            .await?
            .ok_or(AppError::NotFound)?;

        // First transition into active publishes the listing
        if changes.status == Some(ListingStatus::Active) && existing.published_at.is_none() {
            changes.published_at = Some(Utc::now());
        }

        self.listings
            .update(id, user_id, changes)
            .await?
            .ok_or(AppError::NotFound)
    }

    async fn delete(&self, id: Uuid, user_id: Uuid) -> AppResult<()> {
        if self.listings.delete(id, user_id).await? {
            Ok(())
        } else {
            Err(AppError::NotFound)
        }
    }
}
