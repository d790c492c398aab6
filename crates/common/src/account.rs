//! Wire schema for `GET /api/account`.
//!
//! The server builds an [`AccountPayload`]; the client validates it once with
//! [`AccountPayload::into_snapshot`] and works with [`AccountSnapshot`] from
//! then on, so consumers never re-check nullable fields.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::plan::ViewerPlan;

/// The signed-in identity as exposed to the viewer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionUser {
    /// Identity ID issued by the auth provider.
    pub id: String,
    /// Email address, if the provider shared one.
    #[serde(default)]
    pub email: Option<String>,
    /// Account creation time.
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

/// Display metadata for the viewer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProfileView {
    /// Same as the identity ID.
    pub id: String,
    /// Email copied from the identity.
    #[serde(default)]
    pub email: Option<String>,
    /// Display name.
    #[serde(default)]
    pub display_name: Option<String>,
    /// Two-letter avatar initials.
    #[serde(default)]
    pub initials: Option<String>,
    /// Avatar image URL.
    #[serde(default)]
    pub avatar_url: Option<String>,
    /// Admin flag.
    #[serde(default)]
    pub is_admin: bool,
    /// Cached Pro flag.
    #[serde(default)]
    pub is_pro: bool,
}

/// Subscription state for the viewer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntitlementView {
    /// Owner identity ID.
    pub user_id: String,
    /// Subscription platform app-user ID.
    #[serde(default)]
    pub rc_app_user_id: Option<String>,
    /// Live Pro state.
    #[serde(default)]
    pub pro_active: Option<bool>,
    /// Renewal or expiry time; `None` with `pro_active` means lifetime.
    #[serde(default)]
    pub pro_expires_at: Option<DateTime<Utc>>,
    /// Platform that wrote the row.
    #[serde(default)]
    pub source: Option<String>,
    /// Last processed billing event.
    #[serde(default)]
    pub last_event_id: Option<String>,
    /// When the last billing event was processed.
    #[serde(default)]
    pub last_event_at: Option<DateTime<Utc>>,
    /// Last row update.
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
}

/// One row of billing history.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BillingEventView {
    /// Platform event ID.
    pub id: String,
    /// Platform event type, such as `INITIAL_PURCHASE` or `RENEWAL`.
    pub event_type: String,
    /// When the event was received.
    pub created_at: DateTime<Utc>,
}

/// Combined account payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AccountPayload {
    /// Whether the request itself succeeded.
    pub ok: bool,
    /// Whether a session was present.
    pub is_authed: bool,
    /// Session identity; `None` when signed out.
    #[serde(default)]
    pub user: Option<SessionUser>,
    /// Profile; `None` when signed out or never created.
    #[serde(default)]
    pub profile: Option<ProfileView>,
    /// Resolved plan; default when signed out.
    #[serde(default)]
    pub plan: ViewerPlan,
    /// Entitlement; `None` when signed out or never subscribed.
    #[serde(default)]
    pub entitlement: Option<EntitlementView>,
    /// Most recent billing events, newest first.
    #[serde(default)]
    pub events: Vec<BillingEventView>,
}

impl AccountPayload {
    /// Payload for a request without a session.
    #[must_use]
    pub fn anonymous() -> Self {
        Self {
            ok: true,
            is_authed: false,
            user: None,
            profile: None,
            plan: ViewerPlan::default(),
            entitlement: None,
            events: Vec::new(),
        }
    }

    /// Validate the payload into a snapshot.
    ///
    /// A signed-out payload drops whatever else it carried. A signed-in
    /// payload must name its user.
    pub fn into_snapshot(self) -> Result<AccountSnapshot, PayloadError> {
        if !self.ok {
            return Err(PayloadError::NotOk);
        }
        if !self.is_authed {
            return Ok(AccountSnapshot::SignedOut);
        }

        let user = self.user.ok_or(PayloadError::MissingUser)?;
        if self.profile.as_ref().is_some_and(|p| p.id != user.id) {
            return Err(PayloadError::ProfileMismatch);
        }

        Ok(AccountSnapshot::SignedIn(Box::new(SignedInAccount {
            user,
            profile: self.profile,
            plan: self.plan,
            entitlement: self.entitlement,
            events: self.events,
        })))
    }
}

/// Validated account state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AccountSnapshot {
    /// No session.
    SignedOut,
    /// Signed in.
    SignedIn(Box<SignedInAccount>),
}

/// Account data for a signed-in viewer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignedInAccount {
    /// Session identity.
    pub user: SessionUser,
    /// Profile, if one exists.
    pub profile: Option<ProfileView>,
    /// Resolved plan.
    pub plan: ViewerPlan,
    /// Entitlement, if the viewer ever subscribed.
    pub entitlement: Option<EntitlementView>,
    /// Billing history, newest first.
    pub events: Vec<BillingEventView>,
}

/// Reasons an account payload is rejected at the client edge.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PayloadError {
    /// The server reported `ok: false`.
    #[error("the account service reported a failure")]
    NotOk,
    /// `isAuthed` was true without a `user`.
    #[error("signed-in account payload is missing its user")]
    MissingUser,
    /// The profile belongs to another identity.
    #[error("account profile does not belong to the signed-in user")]
    ProfileMismatch,
}
