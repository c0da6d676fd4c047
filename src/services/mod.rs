//! Application services layer - use cases over the repository traits.
//!
//! Services orchestrate domain logic and infrastructure; each one
//! receives its repositories as injected trait objects.

mod auth_service;
mod dealer_service;
mod engagement_service;
mod listing_service;
mod messaging_service;
mod user_service;

pub use auth_service::{AuthService, Authenticator, Claims, TokenResponse};
pub use dealer_service::{DealerDirectory, DealerService};
pub use engagement_service::{EngagementService, EngagementTracker, ViewContext};
pub use listing_service::{ListingManager, ListingService};
pub use messaging_service::{Messenger, MessagingService};
pub use user_service::{SubscriptionStatus, UserManager, UserService};

use std::sync::Arc;

use crate::config::Config;
use crate::infra::repositories::{
    AnalyticsStore, DealerStore, FavoriteStore, ListingStore, MessagingStore, StatsStore,
    UserStore,
};

/// All application services, wired against one database connection
pub struct Services {
    pub auth: Arc<dyn AuthService>,
    pub listings: Arc<dyn ListingService>,
    pub messaging: Arc<dyn MessagingService>,
    pub dealers: Arc<dyn DealerService>,
    pub users: Arc<dyn UserService>,
    pub engagement: Arc<dyn EngagementService>,
}

impl Services {
    pub fn new(
        auth: Arc<dyn AuthService>,
        listings: Arc<dyn ListingService>,
        messaging: Arc<dyn MessagingService>,
        dealers: Arc<dyn DealerService>,
        users: Arc<dyn UserService>,
        engagement: Arc<dyn EngagementService>,
    ) -> Self {
        Self {
            auth,
            listings,
            messaging,
            dealers,
            users,
            engagement,
        }
    }

    /// Wire every repository and service against a live connection
    pub fn from_connection(db: sea_orm::DatabaseConnection, config: Config) -> Self {
        let user_store: Arc<UserStore> = Arc::new(UserStore::new(db.clone()));
        let listing_store: Arc<ListingStore> = Arc::new(ListingStore::new(db.clone()));
        let messaging_store = Arc::new(MessagingStore::new(db.clone()));
        let dealer_store = Arc::new(DealerStore::new(db.clone()));
        let favorite_store = Arc::new(FavoriteStore::new(db.clone()));
        let analytics_store = Arc::new(AnalyticsStore::new(db.clone()));
        let stats_store = Arc::new(StatsStore::new(db));

        Self {
            auth: Arc::new(Authenticator::new(user_store.clone(), config)),
            listings: Arc::new(ListingManager::new(listing_store.clone())),
            messaging: Arc::new(Messenger::new(messaging_store, listing_store.clone())),
            dealers: Arc::new(DealerDirectory::new(
                dealer_store,
                listing_store.clone(),
                stats_store,
            )),
            users: Arc::new(UserManager::new(user_store)),
            engagement: Arc::new(EngagementTracker::new(
                favorite_store,
                analytics_store,
                listing_store,
            )),
        }
    }
}
