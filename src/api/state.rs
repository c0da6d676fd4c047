//! Application state - dependency injection container.

use std::sync::Arc;

use crate::config::Config;
use crate::infra::Database;
use crate::services::{
    AuthService, DealerService, EngagementService, ListingService, MessagingService, Services,
    UserService,
};

/// Application state handed to every handler
#[derive(Clone)]
pub struct AppState {
    pub auth_service: Arc<dyn AuthService>,
    pub listing_service: Arc<dyn ListingService>,
    pub messaging_service: Arc<dyn MessagingService>,
    pub dealer_service: Arc<dyn DealerService>,
    pub user_service: Arc<dyn UserService>,
    pub engagement_service: Arc<dyn EngagementService>,
    pub database: Arc<Database>,
}

impl AppState {
    /// Wire all services against a live database connection
    pub fn from_config(database: Arc<Database>, config: Config) -> Self {
        let services = Services::from_connection(database.get_connection(), config);
        Self::new(services, database)
    }

    /// Build state from pre-wired services; tests inject mocks here
    pub fn new(services: Services, database: Arc<Database>) -> Self {
        Self {
            auth_service: services.auth,
            listing_service: services.listings,
            messaging_service: services.messaging,
            dealer_service: services.dealers,
            user_service: services.users,
            engagement_service: services.engagement,
            database,
        }
    }
}
