//! Database entities.

pub mod account_deletion_request;
pub mod billing_entitlement;
pub mod billing_webhook_event;
pub mod identity;
pub mod profile;

pub use account_deletion_request::Entity as AccountDeletionRequest;
pub use billing_entitlement::Entity as BillingEntitlement;
pub use billing_webhook_event::Entity as BillingWebhookEvent;
pub use identity::Entity as Identity;
pub use profile::Entity as Profile;
