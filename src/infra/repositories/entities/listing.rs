//! SeaORM entity for the listings table.

use sea_orm::entity::prelude::*;
use serde::Serialize;

use crate::domain::ListingStatus;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize)]
#[sea_orm(table_name = "listings")]
#[serde(rename_all = "camelCase")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub user_id: Uuid,

    // Basic info
    pub title: String,
    pub description: Option<String>,
    #[sea_orm(column_type = "Decimal(Some((12, 2)))")]
    pub price: Decimal,
    pub currency: String,
    pub status: ListingStatus,

    // Car details
    pub make: String,
    pub model: String,
    pub year: i32,
    pub mileage: Option<i32>,
    pub fuel_type: Option<String>,
    pub transmission: Option<String>,
    pub body_type: Option<String>,
    pub color: Option<String>,
    pub doors: Option<i32>,
    pub cylinders: Option<i32>,
    pub horsepower: Option<i32>,

    // Location
    pub emirate: Option<String>,
    pub city: Option<String>,
    pub area: Option<String>,

    // Features and condition
    pub features: Option<Json>,
    pub condition: Option<String>,
    pub accident_history: Option<bool>,
    pub service_history: Option<Json>,

    // Media
    pub images: Option<Json>,
    pub videos: Option<Json>,

    // SEO and meta
    #[sea_orm(unique)]
    pub slug: Option<String>,
    pub meta_title: Option<String>,
    pub meta_description: Option<String>,

    // Timestamps
    pub published_at: Option<DateTimeUtc>,
    pub expires_at: Option<DateTimeUtc>,
    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::user::Entity",
        from = "Column::UserId",
        to = "super::user::Column::Id",
        on_update = "NoAction",
        on_delete = "Cascade"
    )]
    User,
    #[sea_orm(has_many = "super::message::Entity")]
    Messages,
    #[sea_orm(has_many = "super::conversation::Entity")]
    Conversations,
    #[sea_orm(has_many = "super::favorite::Entity")]
    Favorites,
}

impl Related<super::user::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::User.def()
    }
}

impl Related<super::message::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Messages.def()
    }
}

impl Related<super::conversation::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Conversations.def()
    }
}

impl Related<super::favorite::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Favorites.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl PartialEq for Column {
    fn eq(&self, other: &Self) -> bool {
        std::mem::discriminant(self) == std::mem::discriminant(other)
    }
}

// `.eq(..)`/`.ne(..)` method calls on Column would be ambiguous between
// `ColumnTrait` and the `PartialEq` impl above; these inherent methods take
// precedence in method resolution and keep them resolving to `ColumnTrait`.
impl Column {
    pub fn eq<V>(&self, v: V) -> sea_orm::sea_query::SimpleExpr
    where
        V: Into<sea_orm::Value>,
    {
        ColumnTrait::eq(self, v)
    }

    pub fn ne<V>(&self, v: V) -> sea_orm::sea_query::SimpleExpr
    where
        V: Into<sea_orm::Value>,
    {
        ColumnTrait::ne(self, v)
    }
}
