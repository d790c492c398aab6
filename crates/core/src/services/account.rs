//! Account service: session lookup, viewer plan, account payload and
//! deletion requests.

use peptalk_common::{
    AccountPayload, AppResult, IdGenerator, SessionUser, ViewerState, resolve_plan,
};
use peptalk_db::{
    entities::account_deletion_request::{self, DeletionRequestStatus},
    repositories::{
        BillingEntitlementRepository, BillingWebhookEventRepository, DeletionRequestRepository,
        IdentityRepository, ProfileRepository,
    },
};
use sea_orm::Set;

/// Billing history rows shown on the account page.
const RECENT_EVENT_LIMIT: u64 = 10;

/// Account service for business logic.
#[derive(Clone)]
pub struct AccountService {
    identity_repo: IdentityRepository,
    profile_repo: ProfileRepository,
    entitlement_repo: BillingEntitlementRepository,
    event_repo: BillingWebhookEventRepository,
    deletion_repo: DeletionRequestRepository,
    force_pro_on: bool,
    id_gen: IdGenerator,
}

impl AccountService {
    /// Create a new account service.
    #[must_use]
    pub const fn new(
        identity_repo: IdentityRepository,
        profile_repo: ProfileRepository,
        entitlement_repo: BillingEntitlementRepository,
        event_repo: BillingWebhookEventRepository,
        deletion_repo: DeletionRequestRepository,
        force_pro_on: bool,
    ) -> Self {
        Self {
            identity_repo,
            profile_repo,
            entitlement_repo,
            event_repo,
            deletion_repo,
            force_pro_on,
            id_gen: IdGenerator::new(),
        }
    }

    /// Resolve a session token to the signed-in identity.
    ///
    /// Unknown tokens give `Ok(None)`. A failed lookup is an error, not an
    /// anonymous session.
    pub async fn session_for_token(&self, token: &str) -> AppResult<Option<SessionUser>> {
        let identity = self.identity_repo.find_by_access_token(token).await?;
        Ok(identity.as_ref().map(SessionUser::from))
    }

    /// Resolve the viewer's plan.
    pub async fn viewer_state(&self, session: Option<&SessionUser>) -> AppResult<ViewerState> {
        let Some(user) = session else {
            return Ok(ViewerState::Anonymous);
        };

        let (profile, entitlement) = tokio::try_join!(
            self.profile_repo.find_by_user_id(&user.id),
            self.entitlement_repo.find_by_user_id(&user.id),
        )?;

        Ok(resolve_plan(
            session,
            profile.as_ref().map(|p| p.flags()),
            entitlement.as_ref().map(|e| e.flags()),
            self.force_pro_on,
        ))
    }

    /// Build the combined account payload.
    pub async fn account_payload(&self, session: Option<&SessionUser>) -> AppResult<AccountPayload> {
        let Some(user) = session else {
            return Ok(AccountPayload::anonymous());
        };

        let (profile, entitlement, events) = tokio::try_join!(
            self.profile_repo.find_by_user_id(&user.id),
            self.entitlement_repo.find_by_user_id(&user.id),
            self.event_repo
                .find_recent_for_app_user(&user.id, RECENT_EVENT_LIMIT),
        )?;

        let state = resolve_plan(
            session,
            profile.as_ref().map(|p| p.flags()),
            entitlement.as_ref().map(|e| e.flags()),
            self.force_pro_on,
        );

        Ok(AccountPayload {
            ok: true,
            is_authed: true,
            user: Some(user.clone()),
            profile: profile.map(|p| p.to_view(user.email.clone())),
            plan: state.plan(),
            entitlement: entitlement.map(Into::into),
            events: events.into_iter().map(Into::into).collect(),
        })
    }

    /// Request deletion of the user's account.
    ///
    /// Idempotent: while a request is open it is returned unchanged.
    pub async fn request_deletion(
        &self,
        user_id: &str,
        reason: Option<String>,
    ) -> AppResult<account_deletion_request::Model> {
        if let Some(open) = self.deletion_repo.find_open_by_user_id(user_id).await? {
            tracing::debug!(user_id = %user_id, request_id = %open.id, "Deletion already requested");
            return Ok(open);
        }

        let reason = reason
            .map(|r| r.trim().to_string())
            .filter(|r| !r.is_empty());

        let request = self
            .deletion_repo
            .create(account_deletion_request::ActiveModel {
                id: Set(self.id_gen.generate()),
                user_id: Set(user_id.to_string()),
                status: Set(DeletionRequestStatus::Requested),
                reason: Set(reason),
                created_at: Set(chrono::Utc::now().into()),
                resolved_at: Set(None),
            })
            .await?;

        tracing::info!(user_id = %user_id, request_id = %request.id, "Account deletion requested");
        Ok(request)
    }

    /// Open deletion requests, oldest first.
    pub async fn open_deletion_requests(&self) -> AppResult<Vec<account_deletion_request::Model>> {
        self.deletion_repo.list_open().await
    }

    /// Mark a deletion request as handled by support.
    pub async fn complete_deletion_request(
        &self,
        id: &str,
    ) -> AppResult<account_deletion_request::Model> {
        let request = self.deletion_repo.mark_completed(id).await?;
        tracing::info!(request_id = %id, user_id = %request.user_id, "Account deletion completed");
        Ok(request)
    }
}
