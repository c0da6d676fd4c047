//! Favorites repository - the user <-> listing saved-car join.

use async_trait::async_trait;
use chrono::Utc;
use sea_orm::sea_query::OnConflict;
use sea_orm::{
    ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, Set,
};
use uuid::Uuid;

use super::entities::{favorite, listing};
use crate::errors::AppResult;

/// Saved-listing data access
#[async_trait]
pub trait FavoriteRepository: Send + Sync {
    /// Idempotent save; re-saving an already saved listing is a no-op
    async fn add(&self, user_id: Uuid, listing_id: Uuid) -> AppResult<()>;

    /// Returns whether a row was actually removed
    async fn remove(&self, user_id: Uuid, listing_id: Uuid) -> AppResult<bool>;

    /// The user's saved listings, most recently saved first
    async fn listings_for_user(&self, user_id: Uuid) -> AppResult<Vec<listing::Model>>;

    async fn is_saved(&self, user_id: Uuid, listing_id: Uuid) -> AppResult<bool>;
}

/// SeaORM-backed favorites repository
pub struct FavoriteStore {
    db: DatabaseConnection,
}

impl FavoriteStore {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

#[async_trait]
impl FavoriteRepository for FavoriteStore {
    async fn add(&self, user_id: Uuid, listing_id: Uuid) -> AppResult<()> {
        let active = favorite::ActiveModel {
            id: Set(Uuid::new_v4()),
            user_id: Set(user_id),
            listing_id: Set(listing_id),
            created_at: Set(Utc::now()),
        };

        // Conditional insert against the unique (user, listing) index
        favorite::Entity::insert(active)
            .on_conflict(
                OnConflict::columns([favorite::Column::UserId, favorite::Column::ListingId])
                    .do_nothing()
                    .to_owned(),
            )
            .exec_without_returning(&self.db)
            .await?;

        Ok(())
    }

    async fn remove(&self, user_id: Uuid, listing_id: Uuid) -> AppResult<bool> {
        let result = favorite::Entity::delete_many()
            .filter(favorite::Column::UserId.eq(user_id))
            .filter(favorite::Column::ListingId.eq(listing_id))
            .exec(&self.db)
            .await?;

        Ok(result.rows_affected > 0)
    }

    async fn listings_for_user(&self, user_id: Uuid) -> AppResult<Vec<listing::Model>> {
        let favorites = favorite::Entity::find()
            .filter(favorite::Column::UserId.eq(user_id))
            .order_by_desc(favorite::Column::CreatedAt)
            .all(&self.db)
            .await?;

        if favorites.is_empty() {
            return Ok(vec![]);
        }

        let ids: Vec<Uuid> = favorites.iter().map(|f| f.listing_id).collect();
        let mut listings = listing::Entity::find()
            .filter(listing::Column::Id.is_in(ids.clone()))
            .all(&self.db)
            .await?;

        // Preserve save order; the id query returns rows unordered
        listings.sort_by_key(|l| ids.iter().position(|id| *id == l.id));
        Ok(listings)
    }

    async fn is_saved(&self, user_id: Uuid, listing_id: Uuid) -> AppResult<bool> {
        let row = favorite::Entity::find()
            .filter(favorite::Column::UserId.eq(user_id))
            .filter(favorite::Column::ListingId.eq(listing_id))
            .one(&self.db)
            .await?;

        Ok(row.is_some())
    }
}
