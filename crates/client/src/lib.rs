//! Viewer side of the Pep-Talk account page.
//!
//! - **API client**: [`AccountApi`] and the HTTP implementation [`HttpAccountApi`]
//! - **View lifecycle**: [`AccountView`] fetches once per mount and never
//!   updates after unmount
//! - **Actions**: [`SingleFlight`] and [`DeleteRequestAction`]
//! - **Recent activity**: [`RecentActivity`] over an [`ActivityStorage`]
//! - **Presentation**: [`AccountPresenter`] turns view state into labels and links

pub mod action;
pub mod api;
pub mod error;
pub mod presenter;
pub mod recent_activity;
pub mod view;

pub use action::{ClickOutcome, DeleteRequestAction, DeleteStatus, FlightGuard, SingleFlight};
pub use api::{AccountApi, HttpAccountApi};
pub use error::ClientError;
pub use presenter::{
    AccountPresenter, AccountScreen, ActivityRow, BillingHistoryRow, Link, SignedInScreen,
    SignedOutScreen, initials_fallback,
};
pub use recent_activity::{
    ActivityEntry, ActivityStorage, FileStorage, MemoryStorage, RecentActivity,
};
pub use view::{AccountView, ViewState};
