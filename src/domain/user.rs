//! User roles.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// User roles enumeration.
///
/// Stored as a Postgres enum; dealers are business sellers,
/// individuals are private sellers.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize, ToSchema,
)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "user_role")]
#[serde(rename_all = "lowercase")]
pub enum UserRole {
    #[sea_orm(string_value = "individual")]
    Individual,
    #[sea_orm(string_value = "dealer")]
    Dealer,
}

impl UserRole {
    pub fn is_dealer(&self) -> bool {
        matches!(self, UserRole::Dealer)
    }
}

impl std::fmt::Display for UserRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            UserRole::Individual => write!(f, "individual"),
            UserRole::Dealer => write!(f, "dealer"),
        }
    }
}

impl From<&str> for UserRole {
    fn from(s: &str) -> Self {
        match s {
            "dealer" => UserRole::Dealer,
            _ => UserRole::Individual,
        }
    }
}
