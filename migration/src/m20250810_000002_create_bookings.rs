use sea_orm_migration::{prelude::*, schema::*, sea_orm::sea_query::extension::postgres::Type};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // Create booking status enum
        manager
            .create_type(
                Type::create()
                    .as_enum(BookingStatus::Enum)
                    .values([
                        BookingStatus::Pending,
                        BookingStatus::Confirmed,
                        BookingStatus::Cancelled,
                        BookingStatus::Completed,
                    ])
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Booking::Table)
                    .if_not_exists()
                    .col(uuid(Booking::Id).primary_key())
                    .col(string_len(Booking::CustomerName, 255).not_null())
                    .col(string_len(Booking::CustomerEmail, 255).not_null())
                    .col(string_len_null(Booking::CustomerPhone, 20))
                    .col(string_len(Booking::Destination, 255).not_null())
                    .col(integer(Booking::GroupSize).not_null().default(1))
                    .col(date_null(Booking::PreferredDate))
                    .col(date_null(Booking::ConfirmedDate))
                    .col(time_null(Booking::ConfirmedTime))
                    .col(date_null(Booking::PreviousConfirmedDate))
                    .col(time_null(Booking::PreviousConfirmedTime))
                    .col(integer(Booking::DurationDays).not_null().default(1))
                    .col(double_null(Booking::Amount))
                    .col(text(Booking::SpecialRequests).not_null().default(""))
                    .col(text(Booking::Notes).not_null().default(""))
                    .col(text(Booking::AdminMessage).not_null().default(""))
                    .col(
                        ColumnDef::new(Booking::Status)
                            .custom(BookingStatus::Enum)
                            .not_null(),
                    )
                    .col(boolean(Booking::CustomerNotified).not_null().default(false))
                    .col(timestamp_with_time_zone_null(Booking::LastNotificationSent))
                    .col(
                        timestamp_with_time_zone(Booking::CreatedAt)
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .col(
                        timestamp_with_time_zone(Booking::UpdatedAt)
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Booking::Table).to_owned())
            .await?;

        manager
            .drop_type(Type::drop().name(BookingStatus::Enum).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
pub enum Booking {
    Table,
    Id,
    CustomerName,
    CustomerEmail,
    CustomerPhone,
    Destination,
    GroupSize,
    PreferredDate,
    ConfirmedDate,
    ConfirmedTime,
    PreviousConfirmedDate,
    PreviousConfirmedTime,
    DurationDays,
    Amount,
    SpecialRequests,
    Notes,
    AdminMessage,
    Status,
    CustomerNotified,
    LastNotificationSent,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
pub enum BookingStatus {
    #[sea_orm(iden = "booking_status")]
    Enum,
    #[sea_orm(iden = "pending")]
    Pending,
    #[sea_orm(iden = "confirmed")]
    Confirmed,
    #[sea_orm(iden = "cancelled")]
    Cancelled,
    #[sea_orm(iden = "completed")]
    Completed,
}
