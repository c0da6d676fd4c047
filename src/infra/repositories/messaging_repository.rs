//! Messaging repository.
//!
//! Conversations are threads keyed by the (listing, buyer, seller)
//! triple; messages reference the listing and the two participants
//! directly rather than a conversation FK, so the history query
//! reconstructs the thread from those three columns.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::Utc;
use sea_orm::sea_query::{Expr, OnConflict};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, DatabaseConnection, EntityTrait, Order,
    PaginatorTrait, QueryFilter, QueryOrder, QuerySelect, Select, Set,
};
use sea_orm::sea_query::NullOrdering;
use serde::Serialize;
use utoipa::ToSchema;
use uuid::Uuid;

use super::entities::{conversation, listing, message, user};
use crate::domain::MessageStatus;
use crate::errors::{AppError, AppResult};
use crate::types::PaginationParams;

/// Column values for a new message row
#[derive(Debug, Clone)]
pub struct NewMessage {
    pub listing_id: Uuid,
    pub from_user_id: Uuid,
    pub to_user_id: Uuid,
    pub content: String,
}

/// Listing fields shown on an inbox row
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ConversationListing {
    pub id: Uuid,
    pub title: String,
    #[schema(value_type = Object)]
    pub images: Option<serde_json::Value>,
}

/// The counterpart in a conversation
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ParticipantSummary {
    pub id: Uuid,
    pub name: Option<String>,
    pub image: Option<String>,
}

impl From<user::Model> for ParticipantSummary {
    fn from(user: user::Model) -> Self {
        Self {
            id: user.id,
            name: user.name,
            image: user.image,
        }
    }
}

/// A conversation enriched for the inbox view: the listing, the other
/// participant and the latest message of the thread
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ConversationSummary {
    #[serde(flatten)]
    #[schema(value_type = Object)]
    pub conversation: conversation::Model,
    pub listing: ConversationListing,
    pub other_user: ParticipantSummary,
    pub last_message: Option<message::Model>,
}

/// Conversations and messages data access
#[async_trait]
pub trait MessagingRepository: Send + Sync {
    async fn find_conversation(
        &self,
        listing_id: Uuid,
        buyer_user_id: Uuid,
        seller_user_id: Uuid,
    ) -> AppResult<Option<conversation::Model>>;

    async fn find_conversation_by_id(&self, id: Uuid) -> AppResult<Option<conversation::Model>>;

    /// Idempotent on the triple: a lost insert race still returns the
    /// surviving row.
    async fn create_or_get_conversation(
        &self,
        listing_id: Uuid,
        buyer_user_id: Uuid,
        seller_user_id: Uuid,
    ) -> AppResult<conversation::Model>;

    /// Insert a message and bump the owning conversation's
    /// last-message timestamp.
    async fn send_message(
        &self,
        conversation_id: Uuid,
        data: NewMessage,
    ) -> AppResult<message::Model>;

    /// Messages of a conversation, newest first, with the total count
    async fn conversation_messages(
        &self,
        conversation: &conversation::Model,
        page: &PaginationParams,
    ) -> AppResult<(Vec<message::Model>, u64)>;

    /// Open conversations the user participates in, most recent
    /// activity first, each carrying its listing, counterpart and
    /// latest message
    async fn user_conversations(&self, user_id: Uuid) -> AppResult<Vec<ConversationSummary>>;

    /// Mark the unread messages the other participant sent the user in
    /// this conversation as read; returns how many were flipped.
    async fn mark_read(
        &self,
        conversation: &conversation::Model,
        user_id: Uuid,
    ) -> AppResult<u64>;

    async fn unread_count(&self, user_id: Uuid) -> AppResult<u64>;

    /// Participant-scoped soft close; returns whether anything changed
    async fn close_conversation(&self, id: Uuid, user_id: Uuid) -> AppResult<bool>;
}

/// SeaORM-backed messaging repository
pub struct MessagingStore {
    db: DatabaseConnection,
}

impl MessagingStore {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

/// Messages exchanged within one conversation, in either direction
fn thread_condition(conversation: &conversation::Model) -> Condition {
    Condition::all()
        .add(message::Column::ListingId.eq(conversation.listing_id))
        .add(
            Condition::any()
                .add(
                    Condition::all()
                        .add(message::Column::FromUserId.eq(conversation.buyer_user_id))
                        .add(message::Column::ToUserId.eq(conversation.seller_user_id)),
                )
                .add(
                    Condition::all()
                        .add(message::Column::FromUserId.eq(conversation.seller_user_id))
                        .add(message::Column::ToUserId.eq(conversation.buyer_user_id)),
                ),
        )
}

/// History query: the thread's messages, latest first, so offset page 1
/// always holds the most recent messages
fn thread_page_query(conversation: &conversation::Model) -> Select<message::Entity> {
    message::Entity::find()
        .filter(thread_condition(conversation))
        .order_by_desc(message::Column::CreatedAt)
}

/// Unread messages the other participant sent the user in this
/// conversation; another buyer's thread on the same listing stays out
/// of scope
fn unread_inbound_condition(conversation: &conversation::Model, user_id: Uuid) -> Condition {
    Condition::all()
        .add(message::Column::ListingId.eq(conversation.listing_id))
        .add(message::Column::ToUserId.eq(user_id))
        .add(message::Column::FromUserId.eq(conversation.other_participant(user_id)))
        .add(message::Column::IsRead.eq(false))
}

/// Zip conversations with their listing, counterpart and latest
/// message; `recent_messages` must be ordered newest first.
fn assemble_summaries(
    conversations: Vec<conversation::Model>,
    user_id: Uuid,
    listings: &HashMap<Uuid, listing::Model>,
    users: &HashMap<Uuid, user::Model>,
    recent_messages: &[message::Model],
) -> Vec<ConversationSummary> {
    conversations
        .into_iter()
        .filter_map(|conv| {
            let listing = listings.get(&conv.listing_id)?;
            let other = users.get(&conv.other_participant(user_id))?;

            let last_message = recent_messages
                .iter()
                .find(|m| {
                    m.listing_id == conv.listing_id
                        && ((m.from_user_id == conv.buyer_user_id
                            && m.to_user_id == conv.seller_user_id)
                            || (m.from_user_id == conv.seller_user_id
                                && m.to_user_id == conv.buyer_user_id))
                })
                .cloned();

            Some(ConversationSummary {
                listing: ConversationListing {
                    id: listing.id,
                    title: listing.title.clone(),
                    images: listing.images.clone(),
                },
                other_user: ParticipantSummary::from(other.clone()),
                last_message,
                conversation: conv,
            })
        })
        .collect()
}

#[async_trait]
impl MessagingRepository for MessagingStore {
    async fn find_conversation(
        &self,
        listing_id: Uuid,
        buyer_user_id: Uuid,
        seller_user_id: Uuid,
    ) -> AppResult<Option<conversation::Model>> {
        conversation::Entity::find()
            .filter(conversation::Column::ListingId.eq(listing_id))
            .filter(conversation::Column::BuyerUserId.eq(buyer_user_id))
            .filter(conversation::Column::SellerUserId.eq(seller_user_id))
            .one(&self.db)
            .await
            .map_err(Into::into)
    }

    async fn find_conversation_by_id(&self, id: Uuid) -> AppResult<Option<conversation::Model>> {
        conversation::Entity::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(Into::into)
    }

    async fn create_or_get_conversation(
        &self,
        listing_id: Uuid,
        buyer_user_id: Uuid,
        seller_user_id: Uuid,
    ) -> AppResult<conversation::Model> {
        let now = Utc::now();

        let active = conversation::ActiveModel {
            id: Set(Uuid::new_v4()),
            listing_id: Set(listing_id),
            buyer_user_id: Set(buyer_user_id),
            seller_user_id: Set(seller_user_id),
            last_message_at: Set(None),
            is_active: Set(true),
            created_at: Set(now),
            updated_at: Set(now),
        };

        // Conditional insert against the unique triple index; losing
        // the race leaves the existing row in place.
        conversation::Entity::insert(active)
            .on_conflict(
                OnConflict::columns([
                    conversation::Column::ListingId,
                    conversation::Column::BuyerUserId,
                    conversation::Column::SellerUserId,
                ])
                .do_nothing()
                .to_owned(),
            )
            .exec_without_returning(&self.db)
            .await?;

        self.find_conversation(listing_id, buyer_user_id, seller_user_id)
            .await?
            .ok_or_else(|| AppError::internal("conversation missing after upsert"))
    }

    async fn send_message(
        &self,
        conversation_id: Uuid,
        data: NewMessage,
    ) -> AppResult<message::Model> {
        let now = Utc::now();

        let active = message::ActiveModel {
            id: Set(Uuid::new_v4()),
            listing_id: Set(data.listing_id),
            from_user_id: Set(data.from_user_id),
            to_user_id: Set(data.to_user_id),
            content: Set(data.content),
            status: Set(MessageStatus::Sent),
            is_read: Set(false),
            read_at: Set(None),
            created_at: Set(now),
            updated_at: Set(now),
        };

        let inserted = active.insert(&self.db).await?;

        conversation::Entity::update_many()
            .col_expr(conversation::Column::LastMessageAt, Expr::value(now))
            .col_expr(conversation::Column::UpdatedAt, Expr::value(now))
            .filter(conversation::Column::Id.eq(conversation_id))
            .exec(&self.db)
            .await?;

        Ok(inserted)
    }

    async fn conversation_messages(
        &self,
        conversation: &conversation::Model,
        page: &PaginationParams,
    ) -> AppResult<(Vec<message::Model>, u64)> {
        let rows = thread_page_query(conversation)
            .limit(page.limit())
            .offset(page.offset())
            .all(&self.db)
            .await?;

        let total = message::Entity::find()
            .filter(thread_condition(conversation))
            .count(&self.db)
            .await?;

        Ok((rows, total))
    }

    async fn user_conversations(&self, user_id: Uuid) -> AppResult<Vec<ConversationSummary>> {
        let conversations = conversation::Entity::find()
            .filter(conversation::Column::IsActive.eq(true))
            .filter(
                Condition::any()
                    .add(conversation::Column::BuyerUserId.eq(user_id))
                    .add(conversation::Column::SellerUserId.eq(user_id)),
            )
            .order_by_with_nulls(
                conversation::Column::LastMessageAt,
                Order::Desc,
                NullOrdering::Last,
            )
            .order_by_desc(conversation::Column::CreatedAt)
            .all(&self.db)
            .await?;

        if conversations.is_empty() {
            return Ok(Vec::new());
        }

        let listing_ids: Vec<Uuid> = conversations.iter().map(|c| c.listing_id).collect();
        let other_ids: Vec<Uuid> = conversations
            .iter()
            .map(|c| c.other_participant(user_id))
            .collect();

        let listings: HashMap<Uuid, listing::Model> = listing::Entity::find()
            .filter(listing::Column::Id.is_in(listing_ids.clone()))
            .all(&self.db)
            .await?
            .into_iter()
            .map(|l| (l.id, l))
            .collect();

        let users: HashMap<Uuid, user::Model> = user::Entity::find()
            .filter(user::Column::Id.is_in(other_ids))
            .all(&self.db)
            .await?
            .into_iter()
            .map(|u| (u.id, u))
            .collect();

        // One fetch over the affected listings; the newest row per
        // thread is picked in memory.
        let recent = message::Entity::find()
            .filter(message::Column::ListingId.is_in(listing_ids))
            .order_by_desc(message::Column::CreatedAt)
            .all(&self.db)
            .await?;

        Ok(assemble_summaries(
            conversations,
            user_id,
            &listings,
            &users,
            &recent,
        ))
    }

    async fn mark_read(
        &self,
        conversation: &conversation::Model,
        user_id: Uuid,
    ) -> AppResult<u64> {
        let now = Utc::now();

        let result = message::Entity::update_many()
            .col_expr(message::Column::IsRead, Expr::value(true))
            .col_expr(message::Column::ReadAt, Expr::value(now))
            .col_expr(message::Column::Status, Expr::value(MessageStatus::Read))
            .col_expr(message::Column::UpdatedAt, Expr::value(now))
            .filter(unread_inbound_condition(conversation, user_id))
            .exec(&self.db)
            .await?;

        Ok(result.rows_affected)
    }

    async fn unread_count(&self, user_id: Uuid) -> AppResult<u64> {
        message::Entity::find()
            .filter(message::Column::ToUserId.eq(user_id))
            .filter(message::Column::IsRead.eq(false))
            .count(&self.db)
            .await
            .map_err(Into::into)
    }

    async fn close_conversation(&self, id: Uuid, user_id: Uuid) -> AppResult<bool> {
        let result = conversation::Entity::update_many()
            .col_expr(conversation::Column::IsActive, Expr::value(false))
            .col_expr(conversation::Column::UpdatedAt, Expr::value(Utc::now()))
            .filter(conversation::Column::Id.eq(id))
            .filter(conversation::Column::IsActive.eq(true))
            .filter(
                Condition::any()
                    .add(conversation::Column::BuyerUserId.eq(user_id))
                    .add(conversation::Column::SellerUserId.eq(user_id)),
            )
            .exec(&self.db)
            .await?;

        Ok(result.rows_affected > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use sea_orm::{DbBackend, QueryTrait};

    use crate::domain::{ListingStatus, UserRole};

    fn sample_conversation() -> conversation::Model {
        conversation::Model {
            id: Uuid::new_v4(),
            listing_id: Uuid::new_v4(),
            buyer_user_id: Uuid::new_v4(),
            seller_user_id: Uuid::new_v4(),
            last_message_at: None,
            is_active: true,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn sample_listing(id: Uuid, seller: Uuid) -> listing::Model {
        listing::Model {
            id,
            user_id: seller,
            title: "2020 Nissan Patrol".to_string(),
            description: None,
            price: rust_decimal::Decimal::new(180_000, 0),
            currency: "AED".to_string(),
            status: ListingStatus::Active,
            make: "Nissan".to_string(),
            model: "Patrol".to_string(),
            year: 2020,
            mileage: None,
            fuel_type: None,
            transmission: None,
            body_type: None,
            color: None,
            doors: None,
            cylinders: None,
            horsepower: None,
            emirate: None,
            city: None,
            area: None,
            features: None,
            condition: None,
            accident_history: None,
            service_history: None,
            images: Some(serde_json::json!(["patrol.jpg"])),
            videos: None,
            slug: None,
            meta_title: None,
            meta_description: None,
            published_at: None,
            expires_at: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn sample_user(id: Uuid, name: &str) -> user::Model {
        user::Model {
            id,
            email: format!("{}@example.com", name),
            email_verified: true,
            password_hash: "hash".to_string(),
            name: Some(name.to_string()),
            image: None,
            phone: None,
            role: UserRole::Individual,
            is_dealer_verified: false,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn sample_message(
        listing_id: Uuid,
        from: Uuid,
        to: Uuid,
        content: &str,
        sent_at: chrono::DateTime<Utc>,
    ) -> message::Model {
        message::Model {
            id: Uuid::new_v4(),
            listing_id,
            from_user_id: from,
            to_user_id: to,
            content: content.to_string(),
            status: MessageStatus::Sent,
            is_read: false,
            read_at: None,
            created_at: sent_at,
            updated_at: sent_at,
        }
    }

    #[test]
    fn thread_condition_matches_both_directions() {
        let conv = sample_conversation();
        let sql = message::Entity::find()
            .filter(thread_condition(&conv))
            .build(DbBackend::Postgres)
            .to_string();

        assert!(sql.contains("\"listing_id\""));
        assert!(sql.contains(" OR "));
        assert_eq!(sql.matches("\"from_user_id\"").count(), 2);
        assert_eq!(sql.matches("\"to_user_id\"").count(), 2);
    }

    #[test]
    fn history_pages_start_at_the_latest_message() {
        let conv = sample_conversation();
        let sql = thread_page_query(&conv)
            .build(DbBackend::Postgres)
            .to_string();

        assert!(sql.contains("ORDER BY \"messages\".\"created_at\" DESC"));
    }

    #[test]
    fn mark_read_only_touches_the_counterparts_messages() {
        let conv = sample_conversation();
        let other_buyer = Uuid::new_v4();

        let sql = message::Entity::find()
            .filter(unread_inbound_condition(&conv, conv.seller_user_id))
            .build(DbBackend::Postgres)
            .to_string();

        // Scoped to what this conversation's buyer sent the seller;
        // a second buyer messaging the same listing stays untouched.
        assert!(sql.contains(&format!("\"to_user_id\" = '{}'", conv.seller_user_id)));
        assert!(sql.contains(&format!("\"from_user_id\" = '{}'", conv.buyer_user_id)));
        assert!(!sql.contains(&other_buyer.to_string()));
        assert!(sql.contains("\"is_read\" = FALSE"));
    }

    #[test]
    fn inbox_rows_carry_listing_counterpart_and_latest_message() {
        let conv = sample_conversation();
        let listing = sample_listing(conv.listing_id, conv.seller_user_id);
        let seller = sample_user(conv.seller_user_id, "seller");

        let listings = HashMap::from([(listing.id, listing)]);
        let users = HashMap::from([(seller.id, seller)]);

        let now = Utc::now();
        let recent = vec![
            sample_message(
                conv.listing_id,
                conv.seller_user_id,
                conv.buyer_user_id,
                "Yes, still available",
                now,
            ),
            sample_message(
                conv.listing_id,
                conv.buyer_user_id,
                conv.seller_user_id,
                "Is it available?",
                now - Duration::minutes(5),
            ),
        ];

        let rows =
            assemble_summaries(vec![conv.clone()], conv.buyer_user_id, &listings, &users, &recent);

        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].listing.title, "2020 Nissan Patrol");
        assert_eq!(rows[0].other_user.id, conv.seller_user_id);
        let last = rows[0].last_message.as_ref().unwrap();
        assert_eq!(last.content, "Yes, still available");
    }

    #[test]
    fn inbox_latest_message_stays_within_the_thread() {
        // Two buyers on the same listing: each inbox row must show its
        // own thread's latest message, not the listing's.
        let conv = sample_conversation();
        let other_buyer = Uuid::new_v4();
        let listing = sample_listing(conv.listing_id, conv.seller_user_id);
        let seller = sample_user(conv.seller_user_id, "seller");

        let listings = HashMap::from([(listing.id, listing)]);
        let users = HashMap::from([(seller.id, seller)]);

        let now = Utc::now();
        let recent = vec![
            sample_message(
                conv.listing_id,
                other_buyer,
                conv.seller_user_id,
                "From someone else",
                now,
            ),
            sample_message(
                conv.listing_id,
                conv.buyer_user_id,
                conv.seller_user_id,
                "From this buyer",
                now - Duration::minutes(1),
            ),
        ];

        let rows =
            assemble_summaries(vec![conv.clone()], conv.buyer_user_id, &listings, &users, &recent);

        let last = rows[0].last_message.as_ref().unwrap();
        assert_eq!(last.content, "From this buyer");
    }
}
