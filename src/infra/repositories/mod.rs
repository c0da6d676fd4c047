//! Repository layer: trait-per-aggregate data access over SeaORM.

pub mod analytics_repository;
pub mod dealer_repository;
pub mod entities;
pub mod favorite_repository;
pub mod listing_repository;
pub mod messaging_repository;
pub mod stats_repository;
pub mod user_repository;

pub use analytics_repository::{AnalyticsRepository, AnalyticsStore, NewEvent};
pub use dealer_repository::{DealerProfile, DealerRepository, DealerStore, SubscriptionSummary};
pub use favorite_repository::{FavoriteRepository, FavoriteStore};
pub use listing_repository::{
    ListingChanges, ListingRepository, ListingStore, ListingWithSeller, NewListing, SellerSummary,
};
pub use messaging_repository::{
    ConversationListing, ConversationSummary, MessagingRepository, MessagingStore, NewMessage,
    ParticipantSummary,
};
pub use stats_repository::{PlatformStats, StatsRepository, StatsStore};
pub use user_repository::{NewSubscription, NewUser, ProfileChanges, UserRepository, UserStore};
