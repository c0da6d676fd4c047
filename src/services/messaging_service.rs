//! Messaging service - buyer/seller threads around a listing.

use async_trait::async_trait;
use std::sync::Arc;
use uuid::Uuid;

use crate::errors::{AppError, AppResult};
use crate::infra::repositories::entities::{conversation, message};
use crate::infra::repositories::{
    ConversationSummary, ListingRepository, MessagingRepository, NewMessage,
};
use crate::types::{Paginated, PaginationParams};

/// Messaging use cases; every operation is scoped to the calling user
#[async_trait]
pub trait MessagingService: Send + Sync {
    /// Send a message about a listing. The seller is resolved from the
    /// listing; the conversation is created on first contact.
    async fn send(
        &self,
        from_user_id: Uuid,
        listing_id: Uuid,
        content: String,
    ) -> AppResult<message::Model>;

    /// Reply within an existing conversation; the recipient is the
    /// other participant
    async fn reply(
        &self,
        user_id: Uuid,
        conversation_id: Uuid,
        content: String,
    ) -> AppResult<message::Model>;

    /// Open conversations the user participates in, enriched with the
    /// listing, counterpart and latest message
    async fn conversations(&self, user_id: Uuid) -> AppResult<Vec<ConversationSummary>>;

    /// Message history of one conversation, newest first
    async fn conversation_messages(
        &self,
        user_id: Uuid,
        conversation_id: Uuid,
        page: PaginationParams,
    ) -> AppResult<Paginated<message::Model>>;

    /// Mark the messages addressed to the user as read; returns the
    /// number flipped
    async fn mark_read(&self, user_id: Uuid, conversation_id: Uuid) -> AppResult<u64>;

    async fn unread_count(&self, user_id: Uuid) -> AppResult<u64>;

    /// Soft-close a conversation the user participates in
    async fn close(&self, user_id: Uuid, conversation_id: Uuid) -> AppResult<()>;
}

/// Concrete MessagingService over the messaging and listings repositories
pub struct Messenger {
    messaging: Arc<dyn MessagingRepository>,
    listings: Arc<dyn ListingRepository>,
}

impl Messenger {
    pub fn new(
        messaging: Arc<dyn MessagingRepository>,
        listings: Arc<dyn ListingRepository>,
    ) -> Self {
        Self {
            messaging,
            listings,
        }
    }

    /// Conversation by id, visible only to its participants
    async fn participant_conversation(
        &self,
        user_id: Uuid,
        conversation_id: Uuid,
    ) -> AppResult<conversation::Model> {
        let conversation = self
            .messaging
            .find_conversation_by_id(conversation_id)
            .await?
            .ok_or(AppError::NotFound)?;

        if !conversation.has_participant(user_id) {
            return Err(AppError::Forbidden);
        }

        Ok(conversation)
    }
}

#[async_trait]
impl MessagingService for Messenger {
    async fn send(
        &self,
        from_user_id: Uuid,
        listing_id: Uuid,
        content: String,
    ) -> AppResult<message::Model> {
        let content = content.trim().to_string();
        if content.is_empty() {
            return Err(AppError::validation("message content cannot be empty"));
        }

        // Only active listings accept messages, and only from others
        let listing = self
            .listings
            .find_public(listing_id)
            .await?
            .ok_or(AppError::NotFound)?;

        let seller_id = listing.listing.user_id;
        if seller_id == from_user_id {
            return Err(AppError::validation("you cannot message your own listing"));
        }

        let conversation = self
            .messaging
            .create_or_get_conversation(listing_id, from_user_id, seller_id)
            .await?;

        self.messaging
            .send_message(
                conversation.id,
                NewMessage {
                    listing_id,
                    from_user_id,
                    to_user_id: seller_id,
                    content,
                },
            )
            .await
    }

    async fn reply(
        &self,
        user_id: Uuid,
        conversation_id: Uuid,
        content: String,
    ) -> AppResult<message::Model> {
        let content = content.trim().to_string();
        if content.is_empty() {
            return Err(AppError::validation("message content cannot be empty"));
        }

        let conversation = self.participant_conversation(user_id, conversation_id).await?;
        if !conversation.is_active {
            return Err(AppError::validation("conversation is closed"));
        }

        self.messaging
            .send_message(
                conversation.id,
                NewMessage {
                    listing_id: conversation.listing_id,
                    from_user_id: user_id,
                    to_user_id: conversation.other_participant(user_id),
                    content,
                },
            )
            .await
    }

    async fn conversations(&self, user_id: Uuid) -> AppResult<Vec<ConversationSummary>> {
        self.messaging.user_conversations(user_id).await
    }

    async fn conversation_messages(
        &self,
        user_id: Uuid,
        conversation_id: Uuid,
        page: PaginationParams,
    ) -> AppResult<Paginated<message::Model>> {
        let conversation = self.participant_conversation(user_id, conversation_id).await?;

        let (rows, total) = self
            .messaging
            .conversation_messages(&conversation, &page)
            .await?;

        Ok(Paginated::new(rows, page.page.max(1), page.limit(), total))
    }

    async fn mark_read(&self, user_id: Uuid, conversation_id: Uuid) -> AppResult<u64> {
        let conversation = self.participant_conversation(user_id, conversation_id).await?;
        self.messaging.mark_read(&conversation, user_id).await
    }

    async fn unread_count(&self, user_id: Uuid) -> AppResult<u64> {
        self.messaging.unread_count(user_id).await
    }

    async fn close(&self, user_id: Uuid, conversation_id: Uuid) -> AppResult<()> {
        // Scoped update: a miss is either an unknown id, an already
        // closed thread, or a non-participant caller
        if self.messaging.close_conversation(conversation_id, user_id).await? {
            Ok(())
        } else {
            Err(AppError::NotFound)
        }
    }
}
