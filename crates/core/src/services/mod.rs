//! Business logic services.

#![allow(missing_docs)]

pub mod account;
pub mod billing;
pub mod revenuecat;

pub use account::AccountService;
pub use billing::{
    BillingRow, BillingService, BillingSummary, EntitlementState, WebhookEnvelope,
    WebhookOutcome, WebhookRejection, entitlement_from_subscriber,
};
pub use revenuecat::{
    RevenueCatClient, Subscriber, SubscriberEntitlement, SubscriberResponse, SubscriberSource,
};
