use sea_orm_migration::{prelude::*, schema::*, sea_orm::sea_query::extension::postgres::Type};

use super::m20250810_000001_create_users::User;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // Create tour status enum
        manager
            .create_type(
                Type::create()
                    .as_enum(TourStatus::Enum)
                    .values([
                        TourStatus::Scheduled,
                        TourStatus::Active,
                        TourStatus::Completed,
                        TourStatus::Cancelled,
                    ])
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Tour::Table)
                    .if_not_exists()
                    .col(uuid(Tour::Id).primary_key())
                    .col(string_len(Tour::Title, 255).not_null())
                    .col(text(Tour::Description).not_null().default(""))
                    .col(string_len(Tour::Destination, 255).not_null())
                    .col(date(Tour::StartDate).not_null())
                    .col(date(Tour::EndDate).not_null())
                    .col(time_null(Tour::StartTime))
                    .col(integer(Tour::MaxCapacity).not_null().default(8))
                    .col(integer(Tour::CurrentBookings).not_null().default(0))
                    .col(double_null(Tour::PricePerPerson))
                    .col(
                        ColumnDef::new(Tour::Status)
                            .custom(TourStatus::Enum)
                            .not_null(),
                    )
                    .col(text(Tour::Notes).not_null().default(""))
                    .col(uuid(Tour::CreatedBy).not_null())
                    .col(
                        timestamp_with_time_zone(Tour::CreatedAt)
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .col(
                        timestamp_with_time_zone(Tour::UpdatedAt)
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_tour_created_by")
                            .from(Tour::Table, Tour::CreatedBy)
                            .to(User::Table, User::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Tour::Table).to_owned())
            .await?;

        manager
            .drop_type(Type::drop().name(TourStatus::Enum).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
pub enum Tour {
    Table,
    Id,
    Title,
    Description,
    Destination,
    StartDate,
    EndDate,
    StartTime,
    MaxCapacity,
    CurrentBookings,
    PricePerPerson,
    Status,
    Notes,
    CreatedBy,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
pub enum TourStatus {
    #[sea_orm(iden = "tour_status")]
    Enum,
    #[sea_orm(iden = "scheduled")]
    Scheduled,
    #[sea_orm(iden = "active")]
    Active,
    #[sea_orm(iden = "completed")]
    Completed,
    #[sea_orm(iden = "cancelled")]
    Cancelled,
}
