//! Create identity table migration.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Identity::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Identity::Id).string_len(64).not_null().primary_key())
                    .col(ColumnDef::new(Identity::Email).string_len(320))
                    .col(ColumnDef::new(Identity::AccessToken).string_len(512).unique_key())
                    .col(
                        ColumnDef::new(Identity::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Identity::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum Identity {
    Table,
    Id,
    Email,
    AccessToken,
    CreatedAt,
}
