//! OpenAPI documentation configuration.
//!
//! Provides Swagger UI for API exploration and testing.

use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};

use crate::api::handlers::{
    auth_handler, dealer_handler, listing_handler, message_handler, user_handler,
};
use crate::domain::{
    FilterOptions, ListingStatus, PriceRange, SortField, SortOrder, SubscriptionTier, UserRole,
    YearRange,
};
use crate::infra::repositories::{DealerProfile, PlatformStats, SubscriptionSummary};
use crate::services::{SubscriptionStatus, TokenResponse};

/// OpenAPI documentation for the GulfRide marketplace API
#[derive(OpenApi)]
#[openapi(
    info(
        title = "GulfRide API",
        version = "0.1.0",
        description = "Car marketplace API for the UAE: listings search, dealer directory and buyer/seller messaging",
        license(name = "MIT", url = "https://opensource.org/licenses/MIT")
    ),
    servers(
        (url = "http://localhost:3000", description = "Local development server")
    ),
    paths(
        auth_handler::register,
        auth_handler::login,
        listing_handler::search_listings,
        listing_handler::featured_listings,
        listing_handler::filter_options,
        listing_handler::models_for_make,
        listing_handler::get_listing,
        listing_handler::similar_listings,
        listing_handler::my_listings,
        listing_handler::create_listing,
        listing_handler::update_listing,
        listing_handler::delete_listing,
        listing_handler::saved_listings,
        listing_handler::favorite_state,
        listing_handler::save_listing,
        listing_handler::unsave_listing,
        listing_handler::listing_views,
        message_handler::send_message,
        message_handler::list_conversations,
        message_handler::conversation_messages,
        message_handler::reply,
        message_handler::mark_read,
        message_handler::close_conversation,
        message_handler::unread_count,
        user_handler::get_me,
        user_handler::update_me,
        user_handler::get_subscription,
        user_handler::start_subscription,
        user_handler::update_subscription,
        user_handler::cancel_subscription,
        dealer_handler::list_dealers,
        dealer_handler::get_dealer,
        dealer_handler::dealer_listings,
        dealer_handler::platform_stats,
    ),
    components(
        schemas(
            UserRole,
            ListingStatus,
            SubscriptionTier,
            SortField,
            SortOrder,
            FilterOptions,
            YearRange,
            PriceRange,
            user_handler::UserResponse,
            user_handler::UpdateProfileRequest,
            user_handler::StartSubscriptionRequest,
            user_handler::UpdateSubscriptionRequest,
            auth_handler::RegisterRequest,
            auth_handler::LoginRequest,
            TokenResponse,
            listing_handler::CreateListingRequest,
            listing_handler::UpdateListingRequest,
            listing_handler::SavedResponse,
            listing_handler::ViewsResponse,
            message_handler::SendMessageRequest,
            message_handler::ReplyRequest,
            message_handler::UnreadCountResponse,
            message_handler::MarkReadResponse,
            crate::infra::repositories::ConversationSummary,
            crate::infra::repositories::ConversationListing,
            crate::infra::repositories::ParticipantSummary,
            DealerProfile,
            SubscriptionSummary,
            PlatformStats,
            SubscriptionStatus,
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "Authentication", description = "Registration and login"),
        (name = "Listings", description = "Vehicle listings search and management"),
        (name = "Favorites", description = "Saved listings"),
        (name = "Messages", description = "Buyer/seller messaging"),
        (name = "Users", description = "Profile and subscription management"),
        (name = "Dealers", description = "Dealer directory"),
        (name = "Stats", description = "Platform statistics")
    )
)]
pub struct ApiDoc;

/// Security scheme modifier for JWT Bearer authentication
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .description(Some("JWT token obtained from /api/auth/login"))
                        .build(),
                ),
            );
        }
    }
}
