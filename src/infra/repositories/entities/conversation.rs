//! SeaORM entity for the conversations table.
//!
//! A conversation is uniquely identified by its
//! (listing, buyer, seller) triple; the unique index lives in the
//! migration and backs the conditional-insert create-or-get.

use sea_orm::entity::prelude::*;
use serde::Serialize;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize)]
#[sea_orm(table_name = "conversations")]
#[serde(rename_all = "camelCase")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub listing_id: Uuid,
    pub buyer_user_id: Uuid,
    pub seller_user_id: Uuid,
    pub last_message_at: Option<DateTimeUtc>,
    pub is_active: bool,
    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
}

impl Model {
    /// Check whether a user is one of the two participants
    pub fn has_participant(&self, user_id: Uuid) -> bool {
        self.buyer_user_id == user_id || self.seller_user_id == user_id
    }

    /// The participant that is not the given user
    pub fn other_participant(&self, user_id: Uuid) -> Uuid {
        if self.buyer_user_id == user_id {
            self.seller_user_id
        } else {
            self.buyer_user_id
        }
    }
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::listing::Entity",
        from = "Column::ListingId",
        to = "super::listing::Column::Id",
        on_update = "NoAction",
        on_delete = "Cascade"
    )]
    Listing,
    #[sea_orm(
        belongs_to = "super::user::Entity",
        from = "Column::BuyerUserId",
        to = "super::user::Column::Id",
        on_update = "NoAction",
        on_delete = "Cascade"
    )]
    BuyerUser,
    #[sea_orm(
        belongs_to = "super::user::Entity",
        from = "Column::SellerUserId",
        to = "super::user::Column::Id",
        on_update = "NoAction",
        on_delete = "Cascade"
    )]
    SellerUser,
}

impl Related<super::listing::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Listing.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
