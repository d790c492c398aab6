//! `RevenueCat` subscriber lookups.
//!
//! Webhook deliveries can arrive out of order, so the billing sync never
//! trusts the event body for the Pro state. It asks the platform for the
//! canonical subscriber record instead.

use std::collections::HashMap;

use async_trait::async_trait;
use peptalk_common::{AppError, AppResult, BillingConfig};
use serde::Deserialize;
use url::Url;

/// Response of `GET /v1/subscribers/{app_user_id}`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct SubscriberResponse {
    /// The subscriber record, when the platform returned one.
    #[serde(default)]
    pub subscriber: Option<Subscriber>,
}

/// Canonical subscriber record.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct Subscriber {
    /// Entitlements keyed by entitlement identifier.
    #[serde(default)]
    pub entitlements: HashMap<String, SubscriberEntitlement>,
}

/// One entitlement on a subscriber.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct SubscriberEntitlement {
    /// Expiry as sent by the platform; `None` for lifetime purchases.
    #[serde(default)]
    pub expires_date: Option<String>,
    /// Store product that granted the entitlement.
    #[serde(default)]
    pub product_identifier: Option<String>,
    /// Latest purchase time.
    #[serde(default)]
    pub purchase_date: Option<String>,
}

impl SubscriberResponse {
    /// Look up an entitlement by identifier.
    #[must_use]
    pub fn entitlement(&self, entitlement_id: &str) -> Option<&SubscriberEntitlement> {
        self.subscriber
            .as_ref()
            .and_then(|s| s.entitlements.get(entitlement_id))
    }
}

/// Source of canonical subscriber records.
#[async_trait]
pub trait SubscriberSource: Send + Sync {
    /// Fetch the subscriber for an app user ID.
    async fn fetch_subscriber(&self, app_user_id: &str) -> AppResult<SubscriberResponse>;
}

/// `RevenueCat` REST client.
#[derive(Clone)]
pub struct RevenueCatClient {
    http_client: reqwest::Client,
    api_url: Url,
    secret_api_key: Option<String>,
}

impl RevenueCatClient {
    /// Create a client from the billing configuration.
    pub fn new(config: &BillingConfig) -> AppResult<Self> {
        let mut base = config.revenuecat_api_url.trim().to_string();
        if !base.ends_with('/') {
            base.push('/');
        }
        let api_url = Url::parse(&base)
            .map_err(|e| AppError::Config(format!("Invalid RevenueCat API URL: {e}")))?;

        Ok(Self {
            http_client: reqwest::Client::new(),
            api_url,
            secret_api_key: config
                .revenuecat_secret_api_key
                .as_deref()
                .map(str::trim)
                .filter(|k| !k.is_empty())
                .map(ToString::to_string),
        })
    }

    fn subscriber_url(&self, app_user_id: &str) -> AppResult<Url> {
        self.api_url
            .join(&format!("v1/subscribers/{}", urlencoding::encode(app_user_id)))
            .map_err(|e| AppError::Internal(format!("Failed to build subscriber URL: {e}")))
    }
}

#[async_trait]
impl SubscriberSource for RevenueCatClient {
    async fn fetch_subscriber(&self, app_user_id: &str) -> AppResult<SubscriberResponse> {
        let secret = self
            .secret_api_key
            .as_ref()
            .ok_or_else(|| AppError::Config("RevenueCat secret API key not configured".to_string()))?;

        let response = self
            .http_client
            .get(self.subscriber_url(app_user_id)?)
            .bearer_auth(secret)
            .header("Content-Type", "application/json")
            .send()
            .await
            .map_err(|e| AppError::ExternalService(format!("RevenueCat request failed: {e}")))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(AppError::ExternalService(format!(
                "RevenueCat API error: {status} - {body}"
            )));
        }

        response.json().await.map_err(|e| {
            AppError::ExternalService(format!("Failed to parse RevenueCat response: {e}"))
        })
    }
}
