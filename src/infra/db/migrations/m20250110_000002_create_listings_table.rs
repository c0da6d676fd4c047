//! Migration: Create the listings table and the listing_status enum.

use sea_orm_migration::prelude::*;
use sea_orm_migration::sea_query::extension::postgres::Type;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_type(
                Type::create()
                    .as_enum(Alias::new("listing_status"))
                    .values([
                        Alias::new("draft"),
                        Alias::new("active"),
                        Alias::new("sold"),
                        Alias::new("suspended"),
                    ])
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Listings::Table)
                    .col(ColumnDef::new(Listings::Id).uuid().not_null().primary_key())
                    .col(ColumnDef::new(Listings::UserId).uuid().not_null())
                    // Basic info
                    .col(ColumnDef::new(Listings::Title).string_len(255).not_null())
                    .col(ColumnDef::new(Listings::Description).text())
                    .col(
                        ColumnDef::new(Listings::Price)
                            .decimal_len(12, 2)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Listings::Currency)
                            .string_len(3)
                            .not_null()
                            .default("AED"),
                    )
                    .col(
                        ColumnDef::new(Listings::Status)
                            .custom(Alias::new("listing_status"))
                            .not_null(),
                    )
                    // Car details
                    .col(ColumnDef::new(Listings::Make).string_len(100).not_null())
                    .col(ColumnDef::new(Listings::Model).string_len(100).not_null())
                    .col(ColumnDef::new(Listings::Year).integer().not_null())
                    .col(ColumnDef::new(Listings::Mileage).integer())
                    .col(ColumnDef::new(Listings::FuelType).string_len(50))
                    .col(ColumnDef::new(Listings::Transmission).string_len(50))
                    .col(ColumnDef::new(Listings::BodyType).string_len(50))
                    .col(ColumnDef::new(Listings::Color).string_len(50))
                    .col(ColumnDef::new(Listings::Doors).integer())
                    .col(ColumnDef::new(Listings::Cylinders).integer())
                    .col(ColumnDef::new(Listings::Horsepower).integer())
                    // Location
                    .col(ColumnDef::new(Listings::Emirate).string_len(100))
                    .col(ColumnDef::new(Listings::City).string_len(100))
                    .col(ColumnDef::new(Listings::Area).string_len(100))
                    // Features and condition
                    .col(ColumnDef::new(Listings::Features).json_binary())
                    .col(ColumnDef::new(Listings::Condition).string_len(50))
                    .col(ColumnDef::new(Listings::AccidentHistory).boolean())
                    .col(ColumnDef::new(Listings::ServiceHistory).json_binary())
                    // Media
                    .col(ColumnDef::new(Listings::Images).json_binary())
                    .col(ColumnDef::new(Listings::Videos).json_binary())
                    // SEO and meta
                    .col(
                        ColumnDef::new(Listings::Slug)
                            .string_len(255)
                            .unique_key(),
                    )
                    .col(ColumnDef::new(Listings::MetaTitle).string_len(255))
                    .col(ColumnDef::new(Listings::MetaDescription).text())
                    // Timestamps
                    .col(ColumnDef::new(Listings::PublishedAt).timestamp_with_time_zone())
                    .col(ColumnDef::new(Listings::ExpiresAt).timestamp_with_time_zone())
                    .col(
                        ColumnDef::new(Listings::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .col(
                        ColumnDef::new(Listings::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_listings_user_id")
                            .from(Listings::Table, Listings::UserId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // Search always narrows on status; make/created_at drive the
        // most common filter and sort paths.
        manager
            .create_index(
                Index::create()
                    .name("idx_listings_status")
                    .table(Listings::Table)
                    .col(Listings::Status)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_listings_make")
                    .table(Listings::Table)
                    .col(Listings::Make)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_listings_created_at")
                    .table(Listings::Table)
                    .col(Listings::CreatedAt)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Listings::Table).to_owned())
            .await?;

        manager
            .drop_type(Type::drop().name(Alias::new("listing_status")).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum Listings {
    Table,
    Id,
    UserId,
    Title,
    Description,
    Price,
    Currency,
    Status,
    Make,
    Model,
    Year,
    Mileage,
    FuelType,
    Transmission,
    BodyType,
    Color,
    Doors,
    Cylinders,
    Horsepower,
    Emirate,
    City,
    Area,
    Features,
    Condition,
    AccidentHistory,
    ServiceHistory,
    Images,
    Videos,
    Slug,
    MetaTitle,
    MetaDescription,
    PublishedAt,
    ExpiresAt,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum Users {
    Table,
    Id,
}
