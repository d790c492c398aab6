//! User-triggered mutations.

use std::sync::{
    Arc, Mutex, PoisonError,
    atomic::{AtomicBool, Ordering},
};

use crate::api::AccountApi;

/// Busy flag allowing one operation at a time.
#[derive(Debug, Clone, Default)]
pub struct SingleFlight {
    busy: Arc<AtomicBool>,
}

impl SingleFlight {
    /// Create an idle guard.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Claim the flight. `None` while another operation holds it.
    #[must_use]
    pub fn try_begin(&self) -> Option<FlightGuard> {
        self.busy
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| FlightGuard {
                busy: Arc::clone(&self.busy),
            })
    }

    /// Whether an operation is in flight.
    #[must_use]
    pub fn is_busy(&self) -> bool {
        self.busy.load(Ordering::Acquire)
    }
}

/// Releases the flight when dropped.
#[derive(Debug)]
pub struct FlightGuard {
    busy: Arc<AtomicBool>,
}

impl Drop for FlightGuard {
    fn drop(&mut self) {
        self.busy.store(false, Ordering::Release);
    }
}

/// Status line under the delete button.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum DeleteStatus {
    /// Nothing sent yet.
    #[default]
    Idle,
    /// Request in flight.
    Pending,
    /// Request accepted.
    Sent,
    /// Request failed with a user-visible message.
    Failed(String),
}

/// Result of one click.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClickOutcome {
    /// A request was already in flight; nothing was sent.
    Ignored,
    /// The request was accepted.
    Sent,
    /// The request failed with a user-visible message.
    Failed(String),
}

/// The "request account deletion" button.
#[derive(Clone)]
pub struct DeleteRequestAction {
    api: Arc<dyn AccountApi>,
    flight: SingleFlight,
    status: Arc<Mutex<DeleteStatus>>,
}

impl DeleteRequestAction {
    /// Button backed by `api`.
    pub fn new(api: Arc<dyn AccountApi>) -> Self {
        Self {
            api,
            flight: SingleFlight::new(),
            status: Arc::new(Mutex::new(DeleteStatus::Idle)),
        }
    }

    /// Current status line.
    pub fn status(&self) -> DeleteStatus {
        self.status
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    fn set_status(&self, status: DeleteStatus) {
        *self.status.lock().unwrap_or_else(PoisonError::into_inner) = status;
    }

    /// Send a deletion request unless one is already in flight.
    pub async fn click(&self, reason: Option<&str>) -> ClickOutcome {
        let Some(_guard) = self.flight.try_begin() else {
            tracing::debug!("Deletion request already in flight; click ignored");
            return ClickOutcome::Ignored;
        };

        self.set_status(DeleteStatus::Pending);
        match self.api.request_deletion(reason).await {
            Ok(()) => {
                self.set_status(DeleteStatus::Sent);
                ClickOutcome::Sent
            }
            Err(e) => {
                tracing::debug!(error = %e, "Deletion request failed");
                let message = e.to_string();
                self.set_status(DeleteStatus::Failed(message.clone()));
                ClickOutcome::Failed(message)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ClientError;
    use async_trait::async_trait;
    use peptalk_common::AccountSnapshot;
    use std::{sync::atomic::AtomicUsize, time::Duration};

    struct FakeApi {
        deletions: AtomicUsize,
        fail_with: Option<ClientError>,
    }

    impl FakeApi {
        fn new(fail_with: Option<ClientError>) -> Arc<Self> {
            Arc::new(Self {
                deletions: AtomicUsize::new(0),
                fail_with,
            })
        }
    }

    #[async_trait]
    impl AccountApi for FakeApi {
        async fn fetch_account(&self) -> Result<AccountSnapshot, ClientError> {
            Ok(AccountSnapshot::SignedOut)
        }

        async fn request_deletion(&self, _reason: Option<&str>) -> Result<(), ClientError> {
            self.deletions.fetch_add(1, Ordering::SeqCst);
            tokio::time::sleep(Duration::from_millis(10)).await;
            self.fail_with.clone().map_or(Ok(()), Err)
        }
    }

    #[test]
    fn test_single_flight_releases_on_drop() {
        let flight = SingleFlight::new();
        let guard = flight.try_begin();
        assert!(guard.is_some());
        assert!(flight.is_busy());
        assert!(flight.try_begin().is_none());

        drop(guard);
        assert!(!flight.is_busy());
        assert!(flight.try_begin().is_some());
    }

    #[tokio::test]
    async fn test_rapid_clicks_send_one_request() {
        let api = FakeApi::new(None);
        let action = DeleteRequestAction::new(api.clone());

        let (first, second) = tokio::join!(action.click(None), action.click(None));

        assert_eq!(first, ClickOutcome::Sent);
        assert_eq!(second, ClickOutcome::Ignored);
        assert_eq!(api.deletions.load(Ordering::SeqCst), 1);
        assert_eq!(action.status(), DeleteStatus::Sent);
    }

    #[tokio::test]
    async fn test_click_after_completion_sends_again() {
        let api = FakeApi::new(None);
        let action = DeleteRequestAction::new(api.clone());

        action.click(None).await;
        action.click(Some("second thoughts")).await;

        assert_eq!(api.deletions.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_failure_is_user_visible() {
        let api = FakeApi::new(Some(ClientError::Rejected("Unauthorized".to_string())));
        let action = DeleteRequestAction::new(api);

        let outcome = action.click(None).await;

        assert_eq!(outcome, ClickOutcome::Failed("Unauthorized".to_string()));
        assert_eq!(
            action.status(),
            DeleteStatus::Failed("Unauthorized".to_string())
        );
    }
}
