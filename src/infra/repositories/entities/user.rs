//! SeaORM entity for the users table.

use sea_orm::entity::prelude::*;
use serde::Serialize;

use crate::domain::UserRole;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize)]
#[sea_orm(table_name = "users")]
#[serde(rename_all = "camelCase")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    #[sea_orm(unique)]
    pub email: String,
    pub email_verified: bool,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub name: Option<String>,
    pub image: Option<String>,
    pub phone: Option<String>,
    pub role: UserRole,
    pub is_dealer_verified: bool,
    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
}

impl Model {
    /// A verified dealer has the dealer role and passed verification
    pub fn is_verified_dealer(&self) -> bool {
        self.role.is_dealer() && self.is_dealer_verified
    }
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::listing::Entity")]
    Listings,
    #[sea_orm(has_many = "super::dealer_subscription::Entity")]
    DealerSubscriptions,
    #[sea_orm(has_many = "super::favorite::Entity")]
    Favorites,
}

impl Related<super::listing::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Listings.def()
    }
}

impl Related<super::dealer_subscription::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::DealerSubscriptions.def()
    }
}

impl Related<super::favorite::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Favorites.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
