//! Repositories for database access.

mod billing_entitlement;
mod billing_webhook_event;
mod deletion_request;
mod identity;
mod profile;

pub use billing_entitlement::{BillingEntitlementRepository, EntitlementUpsert};
pub use billing_webhook_event::BillingWebhookEventRepository;
pub use deletion_request::DeletionRequestRepository;
pub use identity::IdentityRepository;
pub use profile::ProfileRepository;
