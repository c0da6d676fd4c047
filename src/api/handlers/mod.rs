//! HTTP request handlers.

pub mod auth_handler;
pub mod dealer_handler;
pub mod listing_handler;
pub mod message_handler;
pub mod user_handler;

pub use auth_handler::auth_routes;
pub use dealer_handler::{dealer_routes, stats_routes};
pub use listing_handler::{listing_owner_routes, listing_routes};
pub use message_handler::message_routes;
pub use user_handler::{user_routes, UserResponse};
