//! Create billing entitlement table migration.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(BillingEntitlement::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(BillingEntitlement::UserId)
                            .string_len(64)
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(BillingEntitlement::RcAppUserId).string_len(128))
                    .col(ColumnDef::new(BillingEntitlement::ProActive).boolean())
                    .col(ColumnDef::new(BillingEntitlement::ProExpiresAt).timestamp_with_time_zone())
                    .col(ColumnDef::new(BillingEntitlement::Source).string_len(32))
                    .col(ColumnDef::new(BillingEntitlement::LastEventId).string_len(128))
                    .col(ColumnDef::new(BillingEntitlement::LastEventAt).timestamp_with_time_zone())
                    .col(ColumnDef::new(BillingEntitlement::UpdatedAt).timestamp_with_time_zone())
                    .to_owned(),
            )
            .await?;

        // Index: updated_at (admin billing overview)
        manager
            .create_index(
                Index::create()
                    .name("idx_billing_entitlement_updated_at")
                    .table(BillingEntitlement::Table)
                    .col(BillingEntitlement::UpdatedAt)
                    .to_owned(),
            )
            .await?;

        // Foreign key: user_id -> identity.id
        manager
            .create_foreign_key(
                ForeignKey::create()
                    .name("fk_billing_entitlement_user_id")
                    .from(BillingEntitlement::Table, BillingEntitlement::UserId)
                    .to(Identity::Table, Identity::Id)
                    .on_delete(ForeignKeyAction::Cascade)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(BillingEntitlement::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum BillingEntitlement {
    Table,
    UserId,
    RcAppUserId,
    ProActive,
    ProExpiresAt,
    Source,
    LastEventId,
    LastEventAt,
    UpdatedAt,
}

#[derive(Iden)]
enum Identity {
    Table,
    Id,
}
