//! Create profile table migration.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Profile::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Profile::UserId).string_len(64).not_null().primary_key())
                    .col(ColumnDef::new(Profile::DisplayName).string_len(128))
                    .col(ColumnDef::new(Profile::Initials).string_len(8))
                    .col(ColumnDef::new(Profile::AvatarUrl).string_len(1024))
                    .col(ColumnDef::new(Profile::IsAdmin).boolean().not_null().default(false))
                    .col(ColumnDef::new(Profile::IsPro).boolean().not_null().default(false))
                    .col(
                        ColumnDef::new(Profile::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .col(ColumnDef::new(Profile::UpdatedAt).timestamp_with_time_zone())
                    .to_owned(),
            )
            .await?;

        // Foreign key: user_id -> identity.id
        manager
            .create_foreign_key(
                ForeignKey::create()
                    .name("fk_profile_user_id")
                    .from(Profile::Table, Profile::UserId)
                    .to(Identity::Table, Identity::Id)
                    .on_delete(ForeignKeyAction::Cascade)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Profile::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum Profile {
    Table,
    UserId,
    DisplayName,
    Initials,
    AvatarUrl,
    IsAdmin,
    IsPro,
    CreatedAt,
    UpdatedAt,
}

#[derive(Iden)]
enum Identity {
    Table,
    Id,
}
