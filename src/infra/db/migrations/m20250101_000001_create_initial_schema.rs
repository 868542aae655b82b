//! Migration: Create users, chats, memberships, checkins, settings and daily_stats.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Users::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Users::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Users::TelegramId).big_integer().not_null())
                    .col(ColumnDef::new(Users::Username).string_len(64).null())
                    .col(ColumnDef::new(Users::FullName).string_len(255).null())
                    .col(ColumnDef::new(Users::PhoneLast4).string_len(4).null())
                    .col(ColumnDef::new(Users::PhoneSha256).string_len(255).null())
                    .col(
                        ColumnDef::new(Users::PhoneVerifiedAt)
                            .timestamp_with_time_zone()
                            .null(),
                    )
                    .col(
                        ColumnDef::new(Users::DmBlocked)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(ColumnDef::new(Users::Locale).string_len(8).null())
                    .col(
                        ColumnDef::new(Users::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("uq_users_telegram_id")
                    .table(Users::Table)
                    .col(Users::TelegramId)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Chats::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Chats::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Chats::ChatId).big_integer().not_null())
                    .col(ColumnDef::new(Chats::Title).string_len(255).null())
                    .col(
                        ColumnDef::new(Chats::Timezone)
                            .string_len(64)
                            .not_null()
                            .default("Europe/Sofia"),
                    )
                    .col(
                        ColumnDef::new(Chats::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("uq_chats_chat_id")
                    .table(Chats::Table)
                    .col(Chats::ChatId)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Memberships::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Memberships::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Memberships::UserId).integer().not_null())
                    .col(ColumnDef::new(Memberships::ChatId).integer().not_null())
                    .col(
                        ColumnDef::new(Memberships::Role)
                            .string_len(16)
                            .not_null()
                            .default("OPERATOR"),
                    )
                    .col(
                        ColumnDef::new(Memberships::Authorized)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(ColumnDef::new(Memberships::AuthorizedVia).string_len(16).null())
                    .col(
                        ColumnDef::new(Memberships::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .col(
                        ColumnDef::new(Memberships::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_memberships_user_id")
                            .from(Memberships::Table, Memberships::UserId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_memberships_chat_id")
                            .from(Memberships::Table, Memberships::ChatId)
                            .to(Chats::Table, Chats::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("uq_membership_user_chat")
                    .table(Memberships::Table)
                    .col(Memberships::UserId)
                    .col(Memberships::ChatId)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Checkins::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Checkins::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Checkins::UserId).integer().not_null())
                    .col(ColumnDef::new(Checkins::ChatId).integer().not_null())
                    .col(ColumnDef::new(Checkins::Kind).string_len(16).not_null())
                    .col(ColumnDef::new(Checkins::PhotoFileId).string_len(255).not_null())
                    .col(ColumnDef::new(Checkins::FileUniqueId).string_len(255).not_null())
                    .col(
                        ColumnDef::new(Checkins::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .col(ColumnDef::new(Checkins::CheckinDate).date().not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_checkins_user_id")
                            .from(Checkins::Table, Checkins::UserId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_checkins_chat_id")
                            .from(Checkins::Table, Checkins::ChatId)
                            .to(Chats::Table, Chats::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("uq_checkins_user_chat_type_date")
                    .table(Checkins::Table)
                    .col(Checkins::UserId)
                    .col(Checkins::ChatId)
                    .col(Checkins::Kind)
                    .col(Checkins::CheckinDate)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_checkins_created_at")
                    .table(Checkins::Table)
                    .col(Checkins::CreatedAt)
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Settings::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Settings::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Settings::ChatId).integer().null())
                    .col(ColumnDef::new(Settings::MorningStart).time().not_null())
                    .col(ColumnDef::new(Settings::MorningEnd).time().not_null())
                    .col(ColumnDef::new(Settings::EveningStart).time().not_null())
                    .col(ColumnDef::new(Settings::EveningEnd).time().not_null())
                    .col(
                        ColumnDef::new(Settings::AlertsEnabled)
                            .boolean()
                            .not_null()
                            .default(true),
                    )
                    .col(
                        ColumnDef::new(Settings::IncludeWeekends)
                            .boolean()
                            .not_null()
                            .default(true),
                    )
                    .col(ColumnDef::new(Settings::Timezone).string_len(64).not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_settings_chat_id")
                            .from(Settings::Table, Settings::ChatId)
                            .to(Chats::Table, Chats::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // NULL chat ids do not collide, so the global row is guarded at startup.
        manager
            .create_index(
                Index::create()
                    .name("uq_settings_chat_id")
                    .table(Settings::Table)
                    .col(Settings::ChatId)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(DailyStats::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(DailyStats::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(DailyStats::ChatId).integer().not_null())
                    .col(ColumnDef::new(DailyStats::Date).date().not_null())
                    .col(
                        ColumnDef::new(DailyStats::MorningCnt)
                            .integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(DailyStats::EveningCnt)
                            .integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(DailyStats::TotalOperators)
                            .integer()
                            .not_null()
                            .default(0),
                    )
                    .col(ColumnDef::new(DailyStats::Misses).json().not_null())
                    .col(
                        ColumnDef::new(DailyStats::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_daily_stats_chat_id")
                            .from(DailyStats::Table, DailyStats::ChatId)
                            .to(Chats::Table, Chats::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("uq_daily_stats_chat_date")
                    .table(DailyStats::Table)
                    .col(DailyStats::ChatId)
                    .col(DailyStats::Date)
                    .unique()
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(DailyStats::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Settings::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Checkins::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Memberships::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Chats::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Users::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum Users {
    Table,
    Id,
    TelegramId,
    Username,
    FullName,
    PhoneLast4,
    PhoneSha256,
    PhoneVerifiedAt,
    DmBlocked,
    Locale,
    CreatedAt,
}

#[derive(Iden)]
enum Chats {
    Table,
    Id,
    ChatId,
    Title,
    Timezone,
    CreatedAt,
}

#[derive(Iden)]
enum Memberships {
    Table,
    Id,
    UserId,
    ChatId,
    Role,
    Authorized,
    AuthorizedVia,
    CreatedAt,
    UpdatedAt,
}

#[derive(Iden)]
enum Checkins {
    Table,
    Id,
    UserId,
    ChatId,
    #[iden = "type"]
    Kind,
    PhotoFileId,
    FileUniqueId,
    CreatedAt,
    CheckinDate,
}

#[derive(Iden)]
enum Settings {
    Table,
    Id,
    ChatId,
    MorningStart,
    MorningEnd,
    EveningStart,
    EveningEnd,
    AlertsEnabled,
    IncludeWeekends,
    Timezone,
}

#[derive(Iden)]
enum DailyStats {
    Table,
    Id,
    ChatId,
    Date,
    MorningCnt,
    EveningCnt,
    TotalOperators,
    Misses,
    CreatedAt,
}
