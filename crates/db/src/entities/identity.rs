//! Identity entity (mirrors the auth provider's user record).

use peptalk_common::SessionUser;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "identity")]
pub struct Model {
    /// ID issued by the auth provider.
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,

    /// Email address
    #[sea_orm(nullable)]
    pub email: Option<String>,

    /// Current session token issued by the auth provider
    #[sea_orm(unique, nullable)]
    #[serde(skip_serializing)]
    pub access_token: Option<String>,

    pub created_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_one = "super::profile::Entity")]
    Profile,
    #[sea_orm(has_one = "super::billing_entitlement::Entity")]
    BillingEntitlement,
}

impl Related<super::profile::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Profile.def()
    }
}

impl Related<super::billing_entitlement::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::BillingEntitlement.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl From<&Model> for SessionUser {
    fn from(identity: &Model) -> Self {
        Self {
            id: identity.id.clone(),
            email: identity.email.clone(),
            created_at: Some(identity.created_at.to_utc()),
        }
    }
}
