use sea_orm_migration::{prelude::*, schema::*};

use super::m20250810_000001_create_users::User;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Location::Table)
                    .if_not_exists()
                    .col(uuid(Location::Id).primary_key())
                    .col(string_len(Location::Title, 255).not_null())
                    .col(text_null(Location::Description))
                    .col(uuid(Location::UserId).not_null())
                    .col(
                        timestamp_with_time_zone(Location::CreatedAt)
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .col(
                        timestamp_with_time_zone(Location::UpdatedAt)
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_location_user")
                            .from(Location::Table, Location::UserId)
                            .to(User::Table, User::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(LocationImage::Table)
                    .if_not_exists()
                    .col(uuid(LocationImage::Id).primary_key())
                    .col(uuid(LocationImage::LocationId).not_null())
                    .col(string_len(LocationImage::FilePath, 500).not_null())
                    .col(string_len(LocationImage::Caption, 255).not_null().default(""))
                    .col(integer(LocationImage::SortOrder).not_null().default(0))
                    .col(
                        timestamp_with_time_zone(LocationImage::CreatedAt)
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_location_image_location")
                            .from(LocationImage::Table, LocationImage::LocationId)
                            .to(Location::Table, Location::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(LocationImage::Table).to_owned())
            .await?;

        manager
            .drop_table(Table::drop().table(Location::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
pub enum Location {
    Table,
    Id,
    Title,
    Description,
    UserId,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
pub enum LocationImage {
    Table,
    Id,
    LocationId,
    FilePath,
    Caption,
    SortOrder,
    CreatedAt,
}
