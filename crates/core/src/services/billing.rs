//! Billing sync for subscription platform webhooks.
//!
//! A delivery is authorized, recorded in the webhook event ledger (which
//! makes redeliveries no-ops), then resolved against the platform's
//! canonical subscriber record. Only users with a profile get an entitlement
//! row; the cached `profile.is_pro` flag is mirrored from it.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use peptalk_common::{AppResult, BillingConfig, EntitlementView};
use peptalk_db::{
    entities::billing_webhook_event,
    repositories::{
        BillingEntitlementRepository, BillingWebhookEventRepository, EntitlementUpsert,
        IdentityRepository, ProfileRepository,
    },
};
use sea_orm::Set;
use serde::Serialize;
use serde_json::Value;
use sha2::{Digest, Sha256};
use thiserror::Error;

use super::revenuecat::{SubscriberResponse, SubscriberSource};

const SOURCE_REVENUECAT: &str = "revenuecat";

/// Successful webhook handling.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WebhookOutcome {
    /// The entitlement was synced.
    Synced {
        /// Live Pro state.
        pro_active: bool,
        /// Expiry as reported by the platform.
        expires_at: Option<String>,
    },
    /// The event ID was already recorded.
    Deduped,
    /// The app user has no profile; the event was recorded and nothing else.
    UnknownUser {
        /// App user ID from the event.
        app_user_id: String,
    },
}

/// Reasons a webhook delivery is rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum WebhookRejection {
    #[error("unauthorized")]
    Unauthorized,
    #[error("bad_json")]
    BadJson,
    #[error("missing_event_id")]
    MissingEventId,
    #[error("missing_app_user_id")]
    MissingAppUserId,
    #[error("event_store_failed")]
    EventStoreFailed,
    #[error("subscriber_fetch_failed")]
    SubscriberFetchFailed,
    #[error("profile_lookup_failed")]
    ProfileLookupFailed,
    #[error("entitlement_upsert_failed")]
    EntitlementUpsertFailed,
    #[error("profile_update_failed")]
    ProfileUpdateFailed,
}

impl WebhookRejection {
    /// Whether the platform should retry the delivery.
    #[must_use]
    pub const fn is_server_error(&self) -> bool {
        !matches!(
            self,
            Self::Unauthorized | Self::BadJson | Self::MissingEventId | Self::MissingAppUserId
        )
    }
}

// === Envelope ===

/// Whether a payload value counts as present when choosing the event object.
fn is_present(value: &Value) -> bool {
    match value {
        Value::Null | Value::Bool(false) => false,
        Value::String(s) => !s.is_empty(),
        Value::Number(n) => n.as_f64() != Some(0.0),
        _ => true,
    }
}

/// A string or non-zero number at `value`. Blank strings and any other
/// shape count as missing.
fn scalar_text(value: Option<&Value>) -> Option<String> {
    match value? {
        Value::String(s) => Some(s.trim()).filter(|s| !s.is_empty()).map(ToString::to_string),
        Value::Number(n) if n.as_f64() == Some(0.0) => None,
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

/// First candidate `(root, pointer)` holding usable text.
fn first_text(candidates: &[(&Value, &str)]) -> Option<String> {
    candidates
        .iter()
        .find_map(|(root, path)| scalar_text(root.pointer(path)))
}

/// Identifiers picked from a webhook payload.
///
/// Fields are read from the nested `event` object first and from the top
/// level after that. Each path is read on its own, so a malformed sibling
/// never hides a well-formed field. Blank strings count as missing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WebhookEnvelope {
    /// Platform event ID.
    pub event_id: Option<String>,
    /// Platform event type; `unknown` when absent.
    pub event_type: String,
    /// App user ID, which is the identity ID.
    pub app_user_id: Option<String>,
}

impl WebhookEnvelope {
    /// Pick the identifiers out of a parsed payload.
    #[must_use]
    pub fn from_value(payload: &Value) -> Self {
        let ev = payload.get("event").filter(|v| is_present(v)).unwrap_or(payload);
        let event_id = first_text(&[(ev, "/id"), (payload, "/event_id"), (payload, "/id")]);
        let event_type = first_text(&[(ev, "/type"), (payload, "/event_type"), (payload, "/type")])
            .unwrap_or_else(|| "unknown".to_string());
        let app_user_id = first_text(&[
            (ev, "/app_user_id"),
            (payload, "/app_user_id"),
            (payload, "/subscriber/app_user_id"),
            (payload, "/customer/app_user_id"),
        ]);

        Self {
            event_id,
            event_type,
            app_user_id,
        }
    }
}

// === Entitlement derivation ===

/// Pro state derived from a subscriber record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntitlementState {
    /// Whether Pro is active.
    pub pro_active: bool,
    /// Expiry exactly as the platform sent it.
    pub expires_at: Option<String>,
    /// Parsed expiry; `None` for lifetime or an unparseable date.
    pub expires_at_time: Option<DateTime<Utc>>,
}

/// Derive the Pro state for `entitlement_id` at `now`.
///
/// No entitlement means inactive. No expiry means lifetime. An expiry that
/// does not parse keeps the entitlement active.
#[must_use]
pub fn entitlement_from_subscriber(
    subscriber: &SubscriberResponse,
    entitlement_id: &str,
    now: DateTime<Utc>,
) -> EntitlementState {
    let Some(entitlement) = subscriber.entitlement(entitlement_id.trim()) else {
        return EntitlementState {
            pro_active: false,
            expires_at: None,
            expires_at_time: None,
        };
    };

    let Some(raw) = entitlement
        .expires_date
        .as_deref()
        .filter(|s| !s.trim().is_empty())
    else {
        return EntitlementState {
            pro_active: true,
            expires_at: None,
            expires_at_time: None,
        };
    };

    match DateTime::parse_from_rfc3339(raw.trim()) {
        Ok(expiry) => {
            let expiry = expiry.to_utc();
            EntitlementState {
                pro_active: expiry > now,
                expires_at: Some(raw.to_string()),
                expires_at_time: Some(expiry),
            }
        }
        Err(_) => EntitlementState {
            pro_active: true,
            expires_at: Some(raw.to_string()),
            expires_at_time: None,
        },
    }
}

// === Admin summary ===

/// One row of the admin billing overview.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BillingRow {
    /// Owner email, or the user ID when unknown.
    pub email: String,
    /// The entitlement row.
    #[serde(flatten)]
    pub entitlement: EntitlementView,
}

/// Admin billing overview.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BillingSummary {
    /// Subscribers with Pro active.
    pub active_count: usize,
    /// Users who ever subscribed.
    pub total_count: usize,
    /// `active_count` times the monthly price.
    pub estimated_mrr_cents: u64,
    /// Entitlement rows, most recently updated first.
    pub rows: Vec<BillingRow>,
}

// === Service ===

/// Billing service for webhook sync and the admin overview.
#[derive(Clone)]
pub struct BillingService {
    identity_repo: IdentityRepository,
    profile_repo: ProfileRepository,
    entitlement_repo: BillingEntitlementRepository,
    event_repo: BillingWebhookEventRepository,
    subscribers: Arc<dyn SubscriberSource>,
    config: BillingConfig,
}

impl BillingService {
    /// Create a new billing service.
    #[must_use]
    pub fn new(
        identity_repo: IdentityRepository,
        profile_repo: ProfileRepository,
        entitlement_repo: BillingEntitlementRepository,
        event_repo: BillingWebhookEventRepository,
        subscribers: Arc<dyn SubscriberSource>,
        config: BillingConfig,
    ) -> Self {
        Self {
            identity_repo,
            profile_repo,
            entitlement_repo,
            event_repo,
            subscribers,
            config,
        }
    }

    /// Check the webhook `Authorization` header.
    ///
    /// Accepts the configured secret as-is or as a bearer token. Every
    /// delivery is rejected while no secret is configured.
    #[must_use]
    pub fn authorize(&self, header: Option<&str>) -> bool {
        let Some(want) = self
            .config
            .webhook_auth
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
        else {
            return false;
        };
        let Some(got) = header.map(str::trim).filter(|s| !s.is_empty()) else {
            return false;
        };

        let got = digest(got);
        got == digest(want) || got == digest(&format!("Bearer {want}"))
    }

    /// Handle one webhook delivery.
    pub async fn handle_webhook(
        &self,
        authorization: Option<&str>,
        body: &[u8],
    ) -> Result<WebhookOutcome, WebhookRejection> {
        if !self.authorize(authorization) {
            tracing::warn!("Rejected unauthorized billing webhook");
            return Err(WebhookRejection::Unauthorized);
        }

        let payload: Value = match serde_json::from_slice(body) {
            Ok(Value::Null) | Err(_) => return Err(WebhookRejection::BadJson),
            Ok(value) => value,
        };

        let envelope = WebhookEnvelope::from_value(&payload);
        let event_id = envelope.event_id.ok_or(WebhookRejection::MissingEventId)?;
        let app_user_id = envelope
            .app_user_id
            .ok_or(WebhookRejection::MissingAppUserId)?;

        let fresh = self
            .event_repo
            .insert_if_new(billing_webhook_event::ActiveModel {
                event_id: Set(event_id.clone()),
                event_type: Set(envelope.event_type.clone()),
                rc_app_user_id: Set(app_user_id.clone()),
                payload: Set(payload),
                created_at: Set(Utc::now().into()),
            })
            .await
            .map_err(|e| {
                tracing::error!(error = %e, event_id = %event_id, "Failed to store billing event");
                WebhookRejection::EventStoreFailed
            })?;

        if !fresh {
            tracing::debug!(event_id = %event_id, "Duplicate billing event");
            return Ok(WebhookOutcome::Deduped);
        }

        match self.sync(&event_id, &app_user_id).await {
            Ok(outcome) => {
                tracing::info!(
                    event_id = %event_id,
                    event_type = %envelope.event_type,
                    app_user_id = %app_user_id,
                    "Processed billing event"
                );
                Ok(outcome)
            }
            Err(rejection) => {
                // Release the event so a redelivery is processed again.
                if let Err(e) = self.event_repo.delete(&event_id).await {
                    tracing::error!(error = %e, event_id = %event_id, "Failed to release billing event");
                }
                Err(rejection)
            }
        }
    }

    async fn sync(
        &self,
        event_id: &str,
        app_user_id: &str,
    ) -> Result<WebhookOutcome, WebhookRejection> {
        let subscriber = self
            .subscribers
            .fetch_subscriber(app_user_id)
            .await
            .map_err(|e| {
                tracing::error!(error = %e, app_user_id = %app_user_id, "Failed to fetch subscriber");
                WebhookRejection::SubscriberFetchFailed
            })?;

        let now = Utc::now();
        let state = entitlement_from_subscriber(&subscriber, &self.config.pro_entitlement_id, now);

        let profile = self
            .profile_repo
            .find_by_user_id(app_user_id)
            .await
            .map_err(|e| {
                tracing::error!(error = %e, "Failed to look up profile");
                WebhookRejection::ProfileLookupFailed
            })?;
        if profile.is_none() {
            tracing::info!(app_user_id = %app_user_id, "Billing event for unknown user");
            return Ok(WebhookOutcome::UnknownUser {
                app_user_id: app_user_id.to_string(),
            });
        }

        self.entitlement_repo
            .upsert(EntitlementUpsert {
                user_id: app_user_id.to_string(),
                rc_app_user_id: app_user_id.to_string(),
                pro_active: state.pro_active,
                pro_expires_at: state.expires_at_time,
                source: SOURCE_REVENUECAT.to_string(),
                last_event_id: event_id.to_string(),
                synced_at: now,
            })
            .await
            .map_err(|e| {
                tracing::error!(error = %e, "Failed to upsert entitlement");
                WebhookRejection::EntitlementUpsertFailed
            })?;

        self.profile_repo
            .set_pro(app_user_id, state.pro_active)
            .await
            .map_err(|e| {
                tracing::error!(error = %e, "Failed to mirror Pro flag");
                WebhookRejection::ProfileUpdateFailed
            })?;

        Ok(WebhookOutcome::Synced {
            pro_active: state.pro_active,
            expires_at: state.expires_at,
        })
    }

    /// Admin billing overview.
    pub async fn billing_summary(&self) -> AppResult<BillingSummary> {
        let entitlements = self.entitlement_repo.list_all().await?;

        let user_ids: Vec<String> = entitlements.iter().map(|e| e.user_id.clone()).collect();
        let emails: HashMap<String, String> = self
            .identity_repo
            .find_by_ids(&user_ids)
            .await?
            .into_iter()
            .filter_map(|i| i.email.map(|email| (i.id, email)))
            .collect();

        let rows: Vec<BillingRow> = entitlements
            .into_iter()
            .map(|e| BillingRow {
                email: emails.get(&e.user_id).cloned().unwrap_or_else(|| e.user_id.clone()),
                entitlement: e.into(),
            })
            .collect();

        let active_count = rows
            .iter()
            .filter(|r| r.entitlement.pro_active == Some(true))
            .count();

        Ok(BillingSummary {
            active_count,
            total_count: rows.len(),
            estimated_mrr_cents: active_count as u64 * u64::from(self.config.pro_monthly_price_cents),
            rows,
        })
    }
}

fn digest(value: &str) -> [u8; 32] {
    Sha256::digest(value.as_bytes()).into()
}
