//! Billing entitlement entity.
//!
//! Written only by the subscription webhook sync. A missing row means the
//! user never subscribed.

use peptalk_common::{EntitlementFlags, EntitlementView};
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "billing_entitlement")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub user_id: String,

    #[sea_orm(nullable)]
    pub rc_app_user_id: Option<String>,

    #[sea_orm(nullable)]
    pub pro_active: Option<bool>,

    /// NULL with `pro_active` = lifetime
    #[sea_orm(nullable)]
    pub pro_expires_at: Option<DateTimeWithTimeZone>,

    #[sea_orm(nullable)]
    pub source: Option<String>,

    #[sea_orm(nullable)]
    pub last_event_id: Option<String>,

    #[sea_orm(nullable)]
    pub last_event_at: Option<DateTimeWithTimeZone>,

    #[sea_orm(nullable)]
    pub updated_at: Option<DateTimeWithTimeZone>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::identity::Entity",
        from = "Column::UserId",
        to = "super::identity::Column::Id",
        on_delete = "Cascade"
    )]
    Identity,
}

impl Related<super::identity::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Identity.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    /// Flags consumed by the plan resolver.
    #[must_use]
    pub const fn flags(&self) -> EntitlementFlags {
        EntitlementFlags {
            pro_active: self.pro_active,
        }
    }
}

impl From<Model> for EntitlementView {
    fn from(e: Model) -> Self {
        Self {
            user_id: e.user_id,
            rc_app_user_id: e.rc_app_user_id,
            pro_active: e.pro_active,
            pro_expires_at: e.pro_expires_at.map(|t| t.to_utc()),
            source: e.source,
            last_event_id: e.last_event_id,
            last_event_at: e.last_event_at.map(|t| t.to_utc()),
            updated_at: e.updated_at.map(|t| t.to_utc()),
        }
    }
}
