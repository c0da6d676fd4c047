//! Messaging handlers - all routes require authentication.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::Json,
    routing::{get, post},
    Extension, Router,
};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::Validate;

use crate::api::extractors::ValidatedJson;
use crate::api::middleware::CurrentUser;
use crate::api::AppState;
use crate::config::DEFAULT_MESSAGE_PAGE_SIZE;
use crate::errors::AppResult;
use crate::infra::repositories::entities::message;
use crate::infra::repositories::ConversationSummary;
use crate::types::{Paginated, PaginationParams};

/// First contact about a listing
#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SendMessageRequest {
    pub listing_id: Uuid,
    #[validate(length(min = 1, max = 2000, message = "Message must be 1-2000 characters"))]
    #[schema(example = "Is this car still available?")]
    pub content: String,
}

/// Reply within an existing conversation
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct ReplyRequest {
    #[validate(length(min = 1, max = 2000, message = "Message must be 1-2000 characters"))]
    pub content: String,
}

#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct MessagePageQuery {
    pub page: Option<u64>,
    pub limit: Option<u64>,
}

/// Count of unread messages addressed to the caller
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UnreadCountResponse {
    pub unread_count: u64,
}

/// Number of messages flipped by a mark-read call
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct MarkReadResponse {
    pub marked_read: u64,
}

/// Create authenticated messaging routes
pub fn message_routes() -> Router<AppState> {
    Router::new()
        .route("/", post(send_message))
        .route("/conversations", get(list_conversations))
        .route(
            "/conversations/:id",
            get(conversation_messages).post(reply).delete(close_conversation),
        )
        .route("/conversations/:id/read", post(mark_read))
        .route("/unread-count", get(unread_count))
}

/// Message a seller about a listing
#[utoipa::path(
    post,
    path = "/api/messages",
    tag = "Messages",
    security(("bearer_auth" = [])),
    request_body = SendMessageRequest,
    responses(
        (status = 201, description = "Message sent"),
        (status = 400, description = "Own listing, closed listing or empty message"),
        (status = 401, description = "Missing or invalid token"),
        (status = 404, description = "Listing not found or not active")
    )
)]
pub async fn send_message(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    ValidatedJson(payload): ValidatedJson<SendMessageRequest>,
) -> AppResult<(StatusCode, Json<message::Model>)> {
    let message = state
        .messaging_service
        .send(current.id, payload.listing_id, payload.content)
        .await?;

    Ok((StatusCode::CREATED, Json(message)))
}

/// Open conversations for the caller
#[utoipa::path(
    get,
    path = "/api/messages/conversations",
    tag = "Messages",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Conversations, most recent activity first, each with listing, counterpart and latest message", body = [ConversationSummary]),
        (status = 401, description = "Missing or invalid token")
    )
)]
pub async fn list_conversations(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
) -> AppResult<Json<Vec<ConversationSummary>>> {
    let conversations = state.messaging_service.conversations(current.id).await?;
    Ok(Json(conversations))
}

/// Message history of one conversation
#[utoipa::path(
    get,
    path = "/api/messages/conversations/{id}",
    tag = "Messages",
    security(("bearer_auth" = [])),
    params(("id" = Uuid, Path, description = "Conversation id"), MessagePageQuery),
    responses(
        (status = 200, description = "Messages, newest first"),
        (status = 401, description = "Missing or invalid token"),
        (status = 403, description = "Caller is not a participant"),
        (status = 404, description = "Conversation not found")
    )
)]
pub async fn conversation_messages(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Extension(current): Extension<CurrentUser>,
    Query(query): Query<MessagePageQuery>,
) -> AppResult<Json<Paginated<message::Model>>> {
    let page = PaginationParams::new(
        query.page.unwrap_or(1),
        query.limit.unwrap_or(DEFAULT_MESSAGE_PAGE_SIZE),
    );

    let messages = state
        .messaging_service
        .conversation_messages(current.id, id, page)
        .await?;

    Ok(Json(messages))
}

/// Reply within a conversation
#[utoipa::path(
    post,
    path = "/api/messages/conversations/{id}",
    tag = "Messages",
    security(("bearer_auth" = [])),
    params(("id" = Uuid, Path, description = "Conversation id")),
    request_body = ReplyRequest,
    responses(
        (status = 201, description = "Reply sent"),
        (status = 400, description = "Conversation is closed"),
        (status = 401, description = "Missing or invalid token"),
        (status = 403, description = "Caller is not a participant"),
        (status = 404, description = "Conversation not found")
    )
)]
pub async fn reply(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Extension(current): Extension<CurrentUser>,
    ValidatedJson(payload): ValidatedJson<ReplyRequest>,
) -> AppResult<(StatusCode, Json<message::Model>)> {
    let message = state
        .messaging_service
        .reply(current.id, id, payload.content)
        .await?;

    Ok((StatusCode::CREATED, Json(message)))
}

/// Mark the messages addressed to the caller as read
#[utoipa::path(
    post,
    path = "/api/messages/conversations/{id}/read",
    tag = "Messages",
    security(("bearer_auth" = [])),
    params(("id" = Uuid, Path, description = "Conversation id")),
    responses(
        (status = 200, description = "Messages marked read", body = MarkReadResponse),
        (status = 401, description = "Missing or invalid token"),
        (status = 403, description = "Caller is not a participant"),
        (status = 404, description = "Conversation not found")
    )
)]
pub async fn mark_read(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Extension(current): Extension<CurrentUser>,
) -> AppResult<Json<MarkReadResponse>> {
    let marked_read = state.messaging_service.mark_read(current.id, id).await?;
    Ok(Json(MarkReadResponse { marked_read }))
}

/// Close a conversation
#[utoipa::path(
    delete,
    path = "/api/messages/conversations/{id}",
    tag = "Messages",
    security(("bearer_auth" = [])),
    params(("id" = Uuid, Path, description = "Conversation id")),
    responses(
        (status = 204, description = "Conversation closed"),
        (status = 401, description = "Missing or invalid token"),
        (status = 404, description = "Conversation not found or already closed")
    )
)]
pub async fn close_conversation(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Extension(current): Extension<CurrentUser>,
) -> AppResult<StatusCode> {
    state.messaging_service.close(current.id, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Unread message count for the caller
#[utoipa::path(
    get,
    path = "/api/messages/unread-count",
    tag = "Messages",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Unread count", body = UnreadCountResponse),
        (status = 401, description = "Missing or invalid token")
    )
)]
pub async fn unread_count(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
) -> AppResult<Json<UnreadCountResponse>> {
    let unread_count = state.messaging_service.unread_count(current.id).await?;
    Ok(Json(UnreadCountResponse { unread_count }))
}
