//! Listing domain types: lifecycle status and the search vocabulary.

use rust_decimal::Decimal;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Listing lifecycle status.
///
/// draft -> active (on publish) -> sold/suspended. Public search only
/// ever sees active rows.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize, ToSchema,
)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "listing_status")]
#[serde(rename_all = "lowercase")]
pub enum ListingStatus {
    #[sea_orm(string_value = "draft")]
    Draft,
    #[sea_orm(string_value = "active")]
    Active,
    #[sea_orm(string_value = "sold")]
    Sold,
    #[sea_orm(string_value = "suspended")]
    Suspended,
}

impl ListingStatus {
    pub fn is_active(&self) -> bool {
        matches!(self, ListingStatus::Active)
    }
}

/// Structured search filters. Absent fields apply no predicate.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ListingFilters {
    pub make: Option<String>,
    pub model: Option<String>,
    pub year_from: Option<i32>,
    pub year_to: Option<i32>,
    pub price_from: Option<Decimal>,
    pub price_to: Option<Decimal>,
    pub mileage_from: Option<i32>,
    pub mileage_to: Option<i32>,
    pub fuel_type: Option<String>,
    pub transmission: Option<String>,
    pub body_type: Option<String>,
    pub emirate: Option<String>,
    pub city: Option<String>,
    pub condition: Option<String>,
    /// Free text matched against title, description, make and model
    pub search: Option<String>,
}

impl ListingFilters {
    pub fn is_empty(&self) -> bool {
        *self == ListingFilters::default()
    }
}

/// Sortable listing fields
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub enum SortField {
    Price,
    Year,
    Mileage,
    CreatedAt,
}

/// Sort direction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    Asc,
    Desc,
}

/// Sort descriptor, encoded on the wire as `field-order` (e.g. `price-asc`)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ListingSort {
    pub field: SortField,
    pub order: SortOrder,
}

impl Default for ListingSort {
    fn default() -> Self {
        Self {
            field: SortField::CreatedAt,
            order: SortOrder::Desc,
        }
    }
}

impl ListingSort {
    /// Parse the `field-order` wire encoding; unknown values fall back
    /// to the default (newest first).
    pub fn parse(raw: &str) -> Self {
        let Some((field, order)) = raw.rsplit_once('-') else {
            return Self::default();
        };

        let field = match field {
            "price" => SortField::Price,
            "year" => SortField::Year,
            "mileage" => SortField::Mileage,
            "createdAt" => SortField::CreatedAt,
            _ => return Self::default(),
        };

        let order = match order {
            "asc" => SortOrder::Asc,
            "desc" => SortOrder::Desc,
            _ => return Self::default(),
        };

        Self { field, order }
    }
}

/// Inclusive year bounds for the filter UI
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct YearRange {
    pub min: i32,
    pub max: i32,
}

/// Inclusive price bounds for the filter UI
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct PriceRange {
    pub min: Decimal,
    pub max: Decimal,
}

/// Distinct selectable values for each filterable attribute,
/// derived from the current active listings.
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct FilterOptions {
    pub makes: Vec<String>,
    pub fuel_types: Vec<String>,
    pub transmissions: Vec<String>,
    pub body_types: Vec<String>,
    pub emirates: Vec<String>,
    pub conditions: Vec<String>,
    pub year_range: YearRange,
    pub price_range: PriceRange,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sort_parses_field_and_order() {
        let sort = ListingSort::parse("price-asc");
        assert_eq!(sort.field, SortField::Price);
        assert_eq!(sort.order, SortOrder::Asc);

        let sort = ListingSort::parse("createdAt-desc");
        assert_eq!(sort.field, SortField::CreatedAt);
        assert_eq!(sort.order, SortOrder::Desc);
    }

    #[test]
    fn unknown_sort_falls_back_to_default() {
        assert_eq!(ListingSort::parse("horsepower-asc"), ListingSort::default());
        assert_eq!(ListingSort::parse("price-sideways"), ListingSort::default());
        assert_eq!(ListingSort::parse("garbage"), ListingSort::default());
    }

    #[test]
    fn empty_filters_report_empty() {
        assert!(ListingFilters::default().is_empty());
        let filters = ListingFilters {
            make: Some("Toyota".into()),
            ..Default::default()
        };
        assert!(!filters.is_empty());
    }
}
