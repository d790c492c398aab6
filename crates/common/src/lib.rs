//! Common types shared by every Pep-Talk crate.
//!
//! - **Configuration**: Application settings via [`Config`]
//! - **Error handling**: Unified error types via [`AppError`] and [`AppResult`]
//! - **ID Generation**: ULID-based identifiers via [`IdGenerator`]
//! - **Plan resolution**: The single Pro/admin precedence chain, [`resolve_plan`]
//! - **Redirects**: The post-auth `next` guard, [`safe_next_path`]
//! - **Account schema**: The `/api/account` wire types used by server and client
//!
//! # Example
//!
//! ```
//! use peptalk_common::{ProfileFlags, SessionUser, resolve_plan};
//!
//! let session = SessionUser {
//!     id: "u1".to_string(),
//!     email: Some("reader@example.com".to_string()),
//!     created_at: None,
//! };
//! let profile = ProfileFlags { is_admin: false, is_pro: true };
//! let state = resolve_plan(Some(&session), Some(profile), None, false);
//! assert!(state.is_pro());
//! ```

pub mod account;
pub mod config;
pub mod error;
pub mod id;
pub mod plan;
pub mod redirect;

pub use account::{
    AccountPayload, AccountSnapshot, BillingEventView, EntitlementView, PayloadError, ProfileView,
    SessionUser, SignedInAccount,
};
pub use config::{BillingConfig, Config};
pub use error::{AppError, AppResult};
pub use id::IdGenerator;
pub use plan::{EntitlementFlags, ProfileFlags, ViewerPlan, ViewerState, resolve_plan};
pub use redirect::{DEFAULT_NEXT_PATH, safe_next_path};
