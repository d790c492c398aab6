//! Create account deletion request table migration.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(AccountDeletionRequest::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(AccountDeletionRequest::Id)
                            .string_len(32)
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(AccountDeletionRequest::UserId).string_len(64).not_null())
                    .col(
                        ColumnDef::new(AccountDeletionRequest::Status)
                            .string_len(16)
                            .not_null()
                            .default("requested"),
                    )
                    .col(ColumnDef::new(AccountDeletionRequest::Reason).text())
                    .col(
                        ColumnDef::new(AccountDeletionRequest::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .col(ColumnDef::new(AccountDeletionRequest::ResolvedAt).timestamp_with_time_zone())
                    .to_owned(),
            )
            .await?;

        // Composite index: (user_id, status) for the open-request lookup
        manager
            .create_index(
                Index::create()
                    .name("idx_account_deletion_request_user_id_status")
                    .table(AccountDeletionRequest::Table)
                    .col(AccountDeletionRequest::UserId)
                    .col(AccountDeletionRequest::Status)
                    .to_owned(),
            )
            .await?;

        // Foreign key: user_id -> identity.id
        manager
            .create_foreign_key(
                ForeignKey::create()
                    .name("fk_account_deletion_request_user_id")
                    .from(AccountDeletionRequest::Table, AccountDeletionRequest::UserId)
                    .to(Identity::Table, Identity::Id)
                    .on_delete(ForeignKeyAction::Cascade)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(AccountDeletionRequest::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum AccountDeletionRequest {
    Table,
    Id,
    UserId,
    Status,
    Reason,
    CreatedAt,
    ResolvedAt,
}

#[derive(Iden)]
enum Identity {
    Table,
    Id,
}
