//! Account view lifecycle.
//!
//! A view fetches the account exactly once when mounted. The fetch result is
//! published only while the view is still mounted: the state sender lives
//! behind a lock and `unmount` takes it, so `unmount` and a late-arriving
//! result cannot interleave.

use std::sync::{Arc, Mutex, PoisonError};

use peptalk_common::AccountSnapshot;
use tokio::{sync::watch, task::JoinHandle};

use crate::api::AccountApi;

/// What the account page shows.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ViewState {
    /// Fetch in flight.
    Loading,
    /// Fetch finished with a validated snapshot.
    Ready(AccountSnapshot),
    /// Fetch failed; the message is shown as `Error: <message>`.
    Error(String),
}

impl ViewState {
    /// Whether the fetch has finished, successfully or not.
    #[must_use]
    pub const fn is_settled(&self) -> bool {
        !matches!(self, Self::Loading)
    }
}

/// State sender; `None` once the view is unmounted.
struct Slot {
    tx: Option<watch::Sender<ViewState>>,
}

impl Slot {
    /// Publish unless disposed. Returns whether the state changed.
    fn publish(&self, state: ViewState) -> bool {
        match &self.tx {
            Some(tx) => {
                tx.send_replace(state);
                true
            }
            None => false,
        }
    }
}

/// A mounted account view.
pub struct AccountView {
    slot: Arc<Mutex<Slot>>,
    rx: watch::Receiver<ViewState>,
    fetch: JoinHandle<()>,
}

impl AccountView {
    /// Mount the view and start its single fetch.
    ///
    /// Must be called from within a tokio runtime.
    pub fn mount(api: Arc<dyn AccountApi>) -> Self {
        let (tx, rx) = watch::channel(ViewState::Loading);
        let slot = Arc::new(Mutex::new(Slot { tx: Some(tx) }));

        let task_slot = Arc::clone(&slot);
        let fetch = tokio::spawn(async move {
            let state = match api.fetch_account().await {
                Ok(snapshot) => ViewState::Ready(snapshot),
                Err(e) => {
                    tracing::debug!(error = %e, "Account fetch failed");
                    ViewState::Error(e.to_string())
                }
            };

            let slot = task_slot.lock().unwrap_or_else(PoisonError::into_inner);
            if !slot.publish(state) {
                tracing::debug!("Account view unmounted before fetch finished; result dropped");
            }
        });

        Self { slot, rx, fetch }
    }

    /// Current state.
    #[must_use]
    pub fn state(&self) -> ViewState {
        self.rx.borrow().clone()
    }

    /// Receiver that observes every state change.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<ViewState> {
        self.rx.clone()
    }

    /// Wait until the fetch has settled.
    ///
    /// Returns the last published state once the view is unmounted.
    pub async fn settled(&self) -> ViewState {
        let mut rx = self.rx.clone();
        match rx.wait_for(ViewState::is_settled).await {
            Ok(state) => state.clone(),
            Err(_) => self.state(),
        }
    }

    /// Whether the view has been unmounted.
    #[must_use]
    pub fn is_unmounted(&self) -> bool {
        self.slot
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .tx
            .is_none()
    }

    /// Unmount the view. No state update happens after this returns.
    pub fn unmount(&self) {
        self.slot
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .tx
            .take();
        self.fetch.abort();
    }
}

impl Drop for AccountView {
    fn drop(&mut self) {
        self.unmount();
    }
}
