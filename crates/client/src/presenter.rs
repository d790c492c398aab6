//! Account page presentation.
//!
//! Turns a [`ViewState`] plus the local recent-activity entries into the
//! labels and links the page renders. Every Pro-dependent label reads the
//! plan the server resolved; nothing here re-derives Pro status.

use chrono::{DateTime, Utc};
use peptalk_common::{AccountSnapshot, BillingEventView, SignedInAccount, safe_next_path};

use crate::{
    recent_activity::{ActivityEntry, MAX_DISPLAYED},
    view::ViewState,
};

/// Where the account page lives; used as the post-sign-in target.
const ACCOUNT_PATH: &str = "/account";
const MANAGE_SUBSCRIPTION_PATH: &str = "/account/subscription";
const UPGRADE_PATH: &str = "/upgrade";
const SIGNUP_PATH: &str = "/signup";
const MAX_BILLING_ROWS: usize = 10;

/// A labelled link.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Link {
    /// Visible text.
    pub label: String,
    /// Site-relative target.
    pub href: String,
}

impl Link {
    fn new(label: &str, href: impl Into<String>) -> Self {
        Self {
            label: label.to_string(),
            href: href.into(),
        }
    }
}

/// What to draw.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AccountScreen {
    /// Fetch in flight.
    Loading,
    /// `Error: <message>`.
    Error(String),
    /// No session.
    SignedOut(SignedOutScreen),
    /// Account details for a signed-in viewer.
    SignedIn(Box<SignedInScreen>),
}

impl AccountScreen {
    /// Plain-text line shown instead of the page while loading or failed.
    #[must_use]
    pub fn status_text(&self) -> Option<String> {
        match self {
            Self::Loading => Some("Loading...".to_string()),
            Self::Error(message) => Some(format!("Error: {message}")),
            Self::SignedOut(_) | Self::SignedIn(_) => None,
        }
    }
}

/// Prompt shown to anonymous viewers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignedOutScreen {
    /// Explanation above the links.
    pub message: String,
    /// Sign in and return to the account page.
    pub sign_in: Link,
    /// Sign up.
    pub create_account: Link,
}

/// One recently visited page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActivityRow {
    /// Visited path.
    pub path: String,
    /// Formatted visit time.
    pub at: String,
}

/// One billing event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BillingHistoryRow {
    /// RevenueCat event type, e.g. `RENEWAL`.
    pub event_type: String,
    /// Formatted receipt time.
    pub at: String,
}

/// The signed-in account page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignedInScreen {
    /// Display name, else email, else `Account`.
    pub name: String,
    /// Email, or `-`.
    pub email: String,
    /// Two uppercase avatar letters.
    pub initials: String,
    /// `Member since: ...`, when the creation time is known.
    pub member_since: Option<String>,
    /// `Pep-Talk Pro` or `Free`.
    pub plan_label: String,
    /// `PRO` or `FREE`.
    pub badge: String,
    /// `Dev unlock` and `Admin` badges, when they apply.
    pub extra_badges: Vec<String>,
    /// `Active` or `Inactive`.
    pub status: String,
    /// `Renews/Expires: ...`, when an expiry is known.
    pub renewal: Option<String>,
    /// Manage or upgrade link.
    pub primary_cta: Link,
    /// At most six recent pages, newest first.
    pub activity: Vec<ActivityRow>,
    /// At most ten billing events, newest first.
    pub billing_history: Vec<BillingHistoryRow>,
}

/// Builds [`AccountScreen`]s.
#[derive(Debug, Clone, Copy, Default)]
pub struct AccountPresenter;

impl AccountPresenter {
    /// Present the current view state.
    #[must_use]
    pub fn present(&self, state: &ViewState, activity: &[ActivityEntry]) -> AccountScreen {
        match state {
            ViewState::Loading => AccountScreen::Loading,
            ViewState::Error(message) => AccountScreen::Error(message.clone()),
            ViewState::Ready(AccountSnapshot::SignedOut) => {
                AccountScreen::SignedOut(self.signed_out())
            }
            ViewState::Ready(AccountSnapshot::SignedIn(account)) => {
                AccountScreen::SignedIn(Box::new(self.signed_in(account, activity)))
            }
        }
    }

    /// Link to sign in and come back to the account page.
    #[must_use]
    pub fn login_href(&self) -> String {
        let next = safe_next_path(Some(ACCOUNT_PATH));
        format!("/login?next={}", urlencoding::encode(&next))
    }

    fn signed_out(&self) -> SignedOutScreen {
        SignedOutScreen {
            message: "Sign in to view your account details and manage your subscription."
                .to_string(),
            sign_in: Link::new("Sign in", self.login_href()),
            create_account: Link::new("Create account", SIGNUP_PATH),
        }
    }

    fn signed_in(&self, account: &SignedInAccount, activity: &[ActivityEntry]) -> SignedInScreen {
        let email = account.user.email.clone().filter(|e| !e.trim().is_empty());
        let profile = account.profile.as_ref();
        let plan = account.plan;

        let name = profile
            .and_then(|p| p.display_name.clone())
            .filter(|n| !n.trim().is_empty())
            .or_else(|| email.clone())
            .unwrap_or_else(|| "Account".to_string());

        let initials = profile
            .and_then(|p| p.initials.as_deref())
            .filter(|i| !i.trim().is_empty())
            .map_or_else(|| initials_fallback(email.as_deref()), ToString::to_string)
            .chars()
            .take(2)
            .collect::<String>()
            .to_uppercase();

        let mut extra_badges = Vec::new();
        if plan.force_pro_on {
            extra_badges.push("Dev unlock".to_string());
        }
        if plan.is_admin {
            extra_badges.push("Admin".to_string());
        }

        let primary_cta = if plan.is_pro {
            Link::new("Manage subscription", MANAGE_SUBSCRIPTION_PATH)
        } else {
            Link::new("Upgrade to Pro", UPGRADE_PATH)
        };

        SignedInScreen {
            name,
            email: email.unwrap_or_else(|| "-".to_string()),
            initials,
            member_since: account
                .user
                .created_at
                .map(|t| format!("Member since: {}", format_time(t))),
            plan_label: if plan.is_pro { "Pep-Talk Pro" } else { "Free" }.to_string(),
            badge: if plan.is_pro { "PRO" } else { "FREE" }.to_string(),
            extra_badges,
            status: if plan.is_pro { "Active" } else { "Inactive" }.to_string(),
            renewal: account
                .entitlement
                .as_ref()
                .and_then(|e| e.pro_expires_at)
                .map(|t| format!("Renews/Expires: {}", format_time(t))),
            primary_cta,
            activity: activity
                .iter()
                .take(MAX_DISPLAYED)
                .map(activity_row)
                .collect(),
            billing_history: account
                .events
                .iter()
                .take(MAX_BILLING_ROWS)
                .map(billing_row)
                .collect(),
        }
    }
}

/// Avatar initials derived from the email local part.
///
/// Two or more `.`/`_`/`-` separated parts give their first letters; a single
/// part gives its first two letters, or its letter plus `X`. Anything else,
/// including a missing email, gives `ME`.
#[must_use]
pub fn initials_fallback(email: Option<&str>) -> String {
    let email = email.map(str::trim).unwrap_or_default();
    let local = email.split('@').next().unwrap_or_default();
    let parts: Vec<&str> = local
        .split(['.', '_', '-'])
        .filter(|p| !p.is_empty())
        .collect();

    let first = |part: &str| part.chars().next();
    let initials = match parts.as_slice() {
        [a, b, ..] => first(*a).into_iter().chain(first(*b)).collect::<String>(),
        [only] => {
            let mut chars = only.chars();
            match (chars.next(), chars.next()) {
                (Some(a), Some(b)) => [a, b].iter().collect(),
                (Some(a), None) => format!("{a}X"),
                _ => String::new(),
            }
        }
        [] => String::new(),
    };

    if initials.is_empty() {
        "ME".to_string()
    } else {
        initials.to_uppercase()
    }
}

fn format_time(t: DateTime<Utc>) -> String {
    t.format("%Y-%m-%d %H:%M UTC").to_string()
}

fn activity_row(entry: &ActivityEntry) -> ActivityRow {
    let at = DateTime::from_timestamp_millis(entry.at as i64)
        .map_or_else(|| entry.at.to_string(), format_time);
    ActivityRow {
        path: entry.path.clone(),
        at,
    }
}

fn billing_row(event: &BillingEventView) -> BillingHistoryRow {
    BillingHistoryRow {
        event_type: event.event_type.clone(),
        at: format_time(event.created_at),
    }
}
