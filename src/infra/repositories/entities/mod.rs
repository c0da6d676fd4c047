//! SeaORM entity definitions
//!
//! These are database-specific entities separate from domain models.
//! Enumerated columns use the ActiveEnums defined in the domain layer.

pub mod analytics;
pub mod conversation;
pub mod dealer_subscription;
pub mod favorite;
pub mod listing;
pub mod message;
pub mod user;
