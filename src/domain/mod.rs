//! Domain layer - Core business entities and logic
//!
//! This module contains the core domain models that represent
//! marketplace concepts independent of infrastructure concerns:
//! users and dealers, vehicle listings with their search vocabulary,
//! subscriptions, and buyer/seller messaging.

pub mod listing;
pub mod messaging;
pub mod password;
pub mod subscription;
pub mod user;

pub use listing::{
    FilterOptions, ListingFilters, ListingSort, ListingStatus, PriceRange, SortField, SortOrder,
    YearRange,
};
pub use messaging::MessageStatus;
pub use password::Password;
pub use subscription::SubscriptionTier;
pub use user::UserRole;
