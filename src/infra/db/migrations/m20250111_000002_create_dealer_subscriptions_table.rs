//! Migration: Create the dealer_subscriptions table and subscription_tier enum.

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
                    .as_enum(Alias::new("subscription_tier"))
                    .values([
                        Alias::new("basic"),
                        Alias::new("premium"),
                        Alias::new("enterprise"),
                    ])
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(DealerSubscriptions::Table)
                    .col(
                        ColumnDef::new(DealerSubscriptions::Id)
                            .uuid()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(DealerSubscriptions::UserId).uuid().not_null())
                    .col(
                        ColumnDef::new(DealerSubscriptions::Tier)
                            .custom(Alias::new("subscription_tier"))
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(DealerSubscriptions::IsActive)
                            .boolean()
                            .not_null()
                            .default(true),
                    )
                    .col(
                        ColumnDef::new(DealerSubscriptions::StartDate)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .col(
                        ColumnDef::new(DealerSubscriptions::ExpiresAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(DealerSubscriptions::AutoRenew)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(
                        ColumnDef::new(DealerSubscriptions::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .col(
                        ColumnDef::new(DealerSubscriptions::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_dealer_subscriptions_user_id")
                            .from(DealerSubscriptions::Table, DealerSubscriptions::UserId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_dealer_subscriptions_user_active")
                    .table(DealerSubscriptions::Table)
                    .col(DealerSubscriptions::UserId)
                    .col(DealerSubscriptions::IsActive)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(DealerSubscriptions::Table).to_owned())
            .await?;

        manager
            .drop_type(
                Type::drop()
                    .name(Alias::new("subscription_tier"))
                    .to_owned(),
            )
            .await
    }
}

#[derive(DeriveIden)]
enum DealerSubscriptions {
    Table,
    Id,
    UserId,
    Tier,
    IsActive,
    StartDate,
    ExpiresAt,
    AutoRenew,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum Users {
    Table,
    Id,
}
