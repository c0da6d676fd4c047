//! Listing service unit tests over a mocked repository.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use mockall::predicate::eq;
use rust_decimal::Decimal;
use uuid::Uuid;

use gulfride::domain::{FilterOptions, ListingFilters, ListingSort, ListingStatus};
use gulfride::errors::{AppError, AppResult};
use gulfride::infra::repositories::entities::listing;
use gulfride::infra::repositories::{
    ListingChanges, ListingRepository, ListingWithSeller, NewListing,
};
use gulfride::services::{ListingManager, ListingService};
use gulfride::types::PaginationParams;

mockall::mock! {
    pub ListingRepo {}

    #[async_trait]
    impl ListingRepository for ListingRepo {
        async fn search(
            &self,
            filters: &ListingFilters,
            sort: ListingSort,
            page: &PaginationParams,
        ) -> AppResult<(Vec<listing::Model>, u64)>;
        async fn filter_options(&self) -> AppResult<FilterOptions>;
        async fn models_for_make(&self, make: &str) -> AppResult<Vec<String>>;
        async fn find_public(&self, id: Uuid) -> AppResult<Option<ListingWithSeller>>;
        async fn find_for_user(&self, id: Uuid, user_id: Uuid) -> AppResult<Option<listing::Model>>;
        async fn list_for_user(&self, user_id: Uuid) -> AppResult<Vec<listing::Model>>;
        async fn create(&self, data: NewListing) -> AppResult<listing::Model>;
        async fn update(
            &self,
            id: Uuid,
            user_id: Uuid,
            changes: ListingChanges,
        ) -> AppResult<Option<listing::Model>>;
        async fn delete(&self, id: Uuid, user_id: Uuid) -> AppResult<bool>;
        async fn featured(&self, limit: u64) -> AppResult<Vec<listing::Model>>;
        async fn similar(
            &self,
            id: Uuid,
            make: &str,
            model: &str,
            limit: u64,
        ) -> AppResult<Vec<listing::Model>>;
        async fn list_for_dealer(&self, dealer_id: Uuid, limit: u64) -> AppResult<Vec<listing::Model>>;
    }
}

fn sample_listing(id: Uuid, user_id: Uuid, status: ListingStatus) -> listing::Model {
    listing::Model {
        id,
        user_id,
        title: "2021 Toyota Land Cruiser GXR".to_string(),
        description: None,
        price: Decimal::from(215_000),
        currency: "AED".to_string(),
        status,
        make: "Toyota".to_string(),
        model: "Land Cruiser".to_string(),
        year: 2021,
        mileage: Some(42_000),
        fuel_type: Some("Petrol".to_string()),
        transmission: Some("Automatic".to_string()),
        body_type: Some("SUV".to_string()),
        color: None,
        doors: None,
        cylinders: None,
        horsepower: None,
        emirate: Some("Dubai".to_string()),
        city: None,
        area: None,
        features: None,
        condition: Some("excellent".to_string()),
        accident_history: Some(false),
        service_history: None,
        images: None,
        videos: None,
        slug: None,
        meta_title: None,
        meta_description: None,
        published_at: None,
        expires_at: None,
        created_at: Utc::now(),
        updated_at: Utc::now(),
    }
}

fn new_listing(user_id: Uuid) -> NewListing {
    NewListing {
        user_id,
        title: "2019 Nissan Patrol LE".to_string(),
        description: None,
        price: Decimal::from(160_000),
        currency: "AED".to_string(),
        status: ListingStatus::Active,
        make: "Nissan".to_string(),
        model: "Patrol".to_string(),
        year: 2019,
        mileage: None,
        fuel_type: None,
        transmission: None,
        body_type: None,
        color: None,
        doors: None,
        cylinders: None,
        horsepower: None,
        emirate: None,
        city: None,
        area: None,
        features: None,
        condition: None,
        accident_history: None,
        service_history: None,
        images: None,
        videos: None,
        slug: None,
    }
}

#[tokio::test]
async fn search_wraps_rows_in_pagination_meta() {
    let owner = Uuid::new_v4();
    let mut repo = MockListingRepo::new();
    repo.expect_search().returning(move |_, _, _| {
        Ok((
            vec![sample_listing(Uuid::new_v4(), owner, ListingStatus::Active)],
            25,
        ))
    });

    let service = ListingManager::new(Arc::new(repo));
    let page = service
        .search(
            ListingFilters::default(),
            ListingSort::default(),
            PaginationParams::new(2, 12),
        )
        .await
        .unwrap();

    assert_eq!(page.data.len(), 1);
    assert_eq!(page.meta.page, 2);
    assert_eq!(page.meta.limit, 12);
    assert_eq!(page.meta.total, 25);
    assert_eq!(page.meta.total_pages, 3);
}

#[tokio::test]
async fn missing_listing_is_not_found() {
    let id = Uuid::new_v4();
    let mut repo = MockListingRepo::new();
    repo.expect_find_public()
        .with(eq(id))
        .returning(|_| Ok(None));

    let service = ListingManager::new(Arc::new(repo));
    let result = service.get(id).await;

    assert!(matches!(result, Err(AppError::NotFound)));
}

#[tokio::test]
async fn create_generates_a_slug_from_the_title() {
    let owner = Uuid::new_v4();
    let mut repo = MockListingRepo::new();
    repo.expect_create()
        .withf(|data: &NewListing| {
            data.slug
                .as_deref()
                .is_some_and(|s| s.starts_with("2019-nissan-patrol-le-"))
        })
        .returning(move |data| {
            let mut listing = sample_listing(Uuid::new_v4(), data.user_id, data.status);
            listing.slug = data.slug;
            Ok(listing)
        });

    let service = ListingManager::new(Arc::new(repo));
    let created = service.create(new_listing(owner)).await.unwrap();

    assert!(created.slug.is_some());
}

#[tokio::test]
async fn publishing_a_draft_sets_published_at() {
    let id = Uuid::new_v4();
    let owner = Uuid::new_v4();

    let mut repo = MockListingRepo::new();
    repo.expect_find_for_user()
        .with(eq(id), eq(owner))
        .returning(move |id, owner| Ok(Some(sample_listing(id, owner, ListingStatus::Draft))));
    repo.expect_update()
        .withf(|_, _, changes: &ListingChanges| {
            changes.status == Some(ListingStatus::Active) && changes.published_at.is_some()
        })
        .returning(move |id, owner, changes| {
            let mut listing = sample_listing(id, owner, ListingStatus::Active);
            listing.published_at = changes.published_at;
            Ok(Some(listing))
        });

    let service = ListingManager::new(Arc::new(repo));
    let changes = ListingChanges {
        status: Some(ListingStatus::Active),
        ..Default::default()
    };
    let updated = service.update(id, owner, changes).await.unwrap();

    assert!(updated.published_at.is_some());
}

#[tokio::test]
async fn republishing_does_not_reset_published_at() {
    let id = Uuid::new_v4();
    let owner = Uuid::new_v4();
    let first_published = Utc::now() - chrono::Duration::days(7);

    let mut repo = MockListingRepo::new();
    repo.expect_find_for_user().returning(move |id, owner| {
        let mut listing = sample_listing(id, owner, ListingStatus::Suspended);
        listing.published_at = Some(first_published);
        Ok(Some(listing))
    });
    repo.expect_update()
        .withf(|_, _, changes: &ListingChanges| changes.published_at.is_none())
        .returning(move |id, owner, _| {
            Ok(Some(sample_listing(id, owner, ListingStatus::Active)))
        });

    let service = ListingManager::new(Arc::new(repo));
    let changes = ListingChanges {
        status: Some(ListingStatus::Active),
        ..Default::default()
    };
    service.update(id, owner, changes).await.unwrap();
}

#[tokio::test]
async fn updating_someone_elses_listing_is_not_found() {
    let mut repo = MockListingRepo::new();
    repo.expect_find_for_user().returning(|_, _| Ok(None));

    let service = ListingManager::new(Arc::new(repo));
    let result = service
        .update(Uuid::new_v4(), Uuid::new_v4(), ListingChanges::default())
        .await;

    assert!(matches!(result, Err(AppError::NotFound)));
}

#[tokio::test]
async fn delete_miss_is_not_found() {
    let mut repo = MockListingRepo::new();
    repo.expect_delete().returning(|_, _| Ok(false));

    let service = ListingManager::new(Arc::new(repo));
    let result = service.delete(Uuid::new_v4(), Uuid::new_v4()).await;

    assert!(matches!(result, Err(AppError::NotFound)));
}

#[tokio::test]
async fn models_require_a_make() {
    // The repository must not be called at all
    let repo = MockListingRepo::new();
    let service = ListingManager::new(Arc::new(repo));

    let result = service.models_for_make("   ").await;
    assert!(matches!(result, Err(AppError::Validation(_))));
}

#[tokio::test]
async fn similar_uses_the_reference_listings_make_and_model() {
    let id = Uuid::new_v4();
    let owner = Uuid::new_v4();

    let mut repo = MockListingRepo::new();
    repo.expect_find_public().returning(move |id| {
        Ok(Some(ListingWithSeller {
            listing: sample_listing(id, owner, ListingStatus::Active),
            user: gulfride::infra::repositories::SellerSummary {
                id: owner,
                name: Some("Seller".to_string()),
                role: gulfride::domain::UserRole::Individual,
                is_dealer_verified: false,
            },
        }))
    });
    repo.expect_similar()
        .withf(move |sid, make, model, limit| {
            *sid == id && make == "Toyota" && model == "Land Cruiser" && *limit == 5
        })
        .returning(|_, _, _, _| Ok(vec![]));

    let service = ListingManager::new(Arc::new(repo));
    let result = service.similar(id, None).await.unwrap();

    assert!(result.is_empty());
}
