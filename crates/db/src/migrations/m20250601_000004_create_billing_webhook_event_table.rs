//! Create billing webhook event table migration.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(BillingWebhookEvent::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(BillingWebhookEvent::EventId)
                            .string_len(128)
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(BillingWebhookEvent::EventType).string_len(64).not_null())
                    .col(ColumnDef::new(BillingWebhookEvent::RcAppUserId).string_len(128).not_null())
                    .col(
                        ColumnDef::new(BillingWebhookEvent::Payload)
                            .json_binary()
                            .not_null()
                            .default("{}"),
                    )
                    .col(
                        ColumnDef::new(BillingWebhookEvent::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .to_owned(),
            )
            .await?;

        // Composite index: (rc_app_user_id, created_at) for billing history
        manager
            .create_index(
                Index::create()
                    .name("idx_billing_webhook_event_app_user_created_at")
                    .table(BillingWebhookEvent::Table)
                    .col(BillingWebhookEvent::RcAppUserId)
                    .col(BillingWebhookEvent::CreatedAt)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(BillingWebhookEvent::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum BillingWebhookEvent {
    Table,
    EventId,
    EventType,
    RcAppUserId,
    Payload,
    CreatedAt,
}
