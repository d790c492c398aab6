//! Billing webhook event entity (idempotency ledger and billing history).

use peptalk_common::BillingEventView;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "billing_webhook_event")]
pub struct Model {
    /// Platform event ID
    #[sea_orm(primary_key, auto_increment = false)]
    pub event_id: String,

    pub event_type: String,

    #[sea_orm(indexed)]
    pub rc_app_user_id: String,

    /// Raw payload as received
    #[sea_orm(column_type = "JsonBinary")]
    pub payload: Json,

    pub created_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl From<Model> for BillingEventView {
    fn from(e: Model) -> Self {
        Self {
            id: e.event_id,
            event_type: e.event_type,
            created_at: e.created_at.to_utc(),
        }
    }
}
