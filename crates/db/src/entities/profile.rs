//! Profile entity (display metadata and cached flags).

use peptalk_common::{ProfileFlags, ProfileView};
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "profile")]
pub struct Model {
    /// Same as identity.id (1:1 relationship)
    #[sea_orm(primary_key, auto_increment = false)]
    pub user_id: String,

    #[sea_orm(nullable)]
    pub display_name: Option<String>,

    #[sea_orm(nullable)]
    pub initials: Option<String>,

    #[sea_orm(nullable)]
    pub avatar_url: Option<String>,

    #[sea_orm(default_value = false)]
    pub is_admin: bool,

    /// Cached Pro flag, mirrored from the entitlement by the billing sync.
    /// Not the source of truth.
    #[sea_orm(default_value = false)]
    pub is_pro: bool,

    pub created_at: DateTimeWithTimeZone,

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
    pub const fn flags(&self) -> ProfileFlags {
        ProfileFlags {
            is_admin: self.is_admin,
            is_pro: self.is_pro,
        }
    }

    /// Wire view, with the email taken from the identity.
    #[must_use]
    pub fn to_view(&self, email: Option<String>) -> ProfileView {
        ProfileView {
            id: self.user_id.clone(),
            email,
            display_name: self.display_name.clone(),
            initials: self.initials.clone(),
            avatar_url: self.avatar_url.clone(),
            is_admin: self.is_admin,
            is_pro: self.is_pro,
        }
    }
}
