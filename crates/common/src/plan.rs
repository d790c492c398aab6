//! Viewer plan resolution.
//!
//! Every Pro or admin decision (navigation badges, upgrade CTA, account page,
//! admin endpoints) goes through [`resolve_plan`]. The precedence is:
//!
//! 1. the deployment-wide `force_pro_on` override,
//! 2. the live entitlement row's `pro_active` flag, when present,
//! 3. the cached `profile.is_pro` flag,
//! 4. not Pro.

use serde::{Deserialize, Serialize};

use crate::account::SessionUser;

/// Access flags derived for a signed-in viewer. Never persisted.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ViewerPlan {
    /// Effective Pro access.
    pub is_pro: bool,
    /// Admin access.
    pub is_admin: bool,
    /// Whether the deployment-wide override is on.
    pub force_pro_on: bool,
}

/// The profile flags the resolver reads.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ProfileFlags {
    /// Admin flag.
    pub is_admin: bool,
    /// Cached Pro flag; only consulted when the entitlement has no answer.
    pub is_pro: bool,
}

/// The entitlement flags the resolver reads.
///
/// Passing `Some(EntitlementFlags { pro_active: None })` means a row exists
/// without a recorded state, which falls back to the profile flag.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EntitlementFlags {
    /// Live Pro state from the subscription platform.
    pub pro_active: Option<bool>,
}

/// Resolved viewer state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViewerState {
    /// No session; render the signed-out view.
    Anonymous,
    /// Signed in with a resolved plan.
    SignedIn(ViewerPlan),
}

impl ViewerState {
    /// Whether there is a session.
    #[must_use]
    pub const fn is_authed(&self) -> bool {
        matches!(self, Self::SignedIn(_))
    }

    /// The resolved plan, or the default (free, non-admin) plan when anonymous.
    #[must_use]
    pub const fn plan(&self) -> ViewerPlan {
        match self {
            Self::Anonymous => ViewerPlan {
                is_pro: false,
                is_admin: false,
                force_pro_on: false,
            },
            Self::SignedIn(plan) => *plan,
        }
    }

    /// Effective Pro access.
    #[must_use]
    pub const fn is_pro(&self) -> bool {
        self.plan().is_pro
    }

    /// Admin access.
    #[must_use]
    pub const fn is_admin(&self) -> bool {
        self.plan().is_admin
    }
}

/// Combine session, profile, entitlement and the deployment override.
///
/// Pure and infallible: missing inputs degrade to "not Pro" and "not admin".
/// With no session the profile and entitlement are not looked at.
#[must_use]
pub fn resolve_plan(
    session: Option<&SessionUser>,
    profile: Option<ProfileFlags>,
    entitlement: Option<EntitlementFlags>,
    force_pro_on: bool,
) -> ViewerState {
    if session.is_none() {
        return ViewerState::Anonymous;
    }

    let is_admin = profile.is_some_and(|p| p.is_admin);
    let is_pro = force_pro_on
        || entitlement
            .and_then(|e| e.pro_active)
            .or_else(|| profile.map(|p| p.is_pro))
            .unwrap_or(false);

    ViewerState::SignedIn(ViewerPlan {
        is_pro,
        is_admin,
        force_pro_on,
    })
}
