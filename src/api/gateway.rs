use std::sync::Arc;
use std::time::Duration;

use tokio::sync::Mutex;
use tokio::time::timeout;
use tracing::{debug, info, warn};
use uuid::Uuid;

use super::endpoints::AuthEndpoint;
use super::request::ApiRequest;
use super::response::ApiResponse;
use super::transport::Transport;
use crate::error::{GatewayError, Result};
use crate::models::{AccessTokenData, Session, UserSummary};
use crate::session::SessionStore;

pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Result of a silent refresh attempt.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum RefreshOutcome {
    /// A new access token was issued and persisted
    Renewed(String),
    /// The refresh credential was refused or unreachable; the session is gone
    Rejected,
}

/// Mediates every outbound API call.
///
/// Attaches the current access token, and when a call comes back 401 from
/// an endpoint that is not refresh-exempt it renews the token once through
/// the refresh cookie and replays the call once. Concurrent 401s share a
/// single refresh: whoever takes `refresh_lock` first renews, the others
/// notice the token moved on and replay with it.
pub struct SessionGateway {
    transport: Arc<dyn Transport>,
    store: Arc<dyn SessionStore>,
    refresh_lock: Mutex<()>,
    request_timeout: Duration,
}

impl SessionGateway {
    pub fn new(transport: Arc<dyn Transport>, store: Arc<dyn SessionStore>) -> Self {
        Self {
            transport,
            store,
            refresh_lock: Mutex::new(()),
            request_timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        }
    }

    pub fn with_timeout(mut self, request_timeout: Duration) -> Self {
        self.request_timeout = request_timeout;
        self
    }

    pub fn store(&self) -> &Arc<dyn SessionStore> {
        &self.store
    }

    pub fn session(&self) -> Session {
        self.store.snapshot()
    }

    pub fn is_authenticated(&self) -> bool {
        self.store.snapshot().is_authenticated()
    }

    /// Record a session established by login or registration
    pub fn set_session(&self, user: UserSummary, access_token: impl Into<String>) -> Result<()> {
        let session = Session::new(user, access_token);
        if let Some(user) = &session.current_user {
            info!(user_id = %user.id, role = %user.role, "session established");
        }
        self.store.save(session)
    }

    /// Forget token and user. Safe to call when already logged out.
    pub fn clear_session(&self) -> Result<()> {
        self.store.clear()?;
        info!("session cleared");
        Ok(())
    }

    /// Send a request, renewing the access token at most once on a 401.
    ///
    /// Every non-success status comes back as `GatewayError::Api` carrying
    /// the status of the call the caller made, even when the refresh in
    /// between failed.
    pub async fn send(&self, request: &ApiRequest) -> Result<ApiResponse> {
        let request_id = Uuid::new_v4();
        let attached = if request.has_authorization() {
            None
        } else {
            self.store.access_token()
        };

        debug!(%request_id, %request, authenticated = attached.is_some(), "sending request");
        let response = self.dispatch(request, attached.as_deref()).await?;
        if response.is_success() {
            return Ok(response);
        }

        if !response.is_unauthorized() || request.is_refresh_exempt() || request.has_authorization()
        {
            return Err(response.into_error());
        }

        let token = match self.renew_after_rejection(attached.as_deref()).await {
            Some(token) => token,
            None => return Err(response.into_error()),
        };

        // The replay is final: a second 401 goes straight back to the caller
        debug!(%request_id, %request, "replaying with renewed token");
        let replay = self.dispatch(request, Some(&token)).await?;
        if replay.is_success() {
            Ok(replay)
        } else {
            if replay.is_unauthorized() {
                warn!(%request_id, %request, "still unauthorized after token renewal");
            }
            Err(replay.into_error())
        }
    }

    /// Ask the server for a new access token using the refresh cookie.
    ///
    /// On success the token is persisted next to the cached user. On any
    /// failure the session is cleared. Never returns an error.
    pub async fn refresh_silently(&self) -> RefreshOutcome {
        let _guard = self.refresh_lock.lock().await;
        self.refresh_locked().await
    }

    async fn renew_after_rejection(&self, rejected: Option<&str>) -> Option<String> {
        let _guard = self.refresh_lock.lock().await;

        let current = self.store.access_token();
        if current.as_deref() != rejected {
            // Another request refreshed (or the session ended) while we waited
            debug!(renewed = current.is_some(), "session changed by a concurrent request");
            return current;
        }

        match self.refresh_locked().await {
            RefreshOutcome::Renewed(token) => Some(token),
            RefreshOutcome::Rejected => None,
        }
    }

    async fn refresh_locked(&self) -> RefreshOutcome {
        let request = ApiRequest::get(AuthEndpoint::AccessToken.path());

        let response = match self.dispatch(&request, None).await {
            Ok(response) => response,
            Err(e) => {
                warn!(error = %e, "token refresh failed");
                return self.expire();
            }
        };

        if !response.is_success() {
            info!(status = response.status, "refresh credential rejected");
            return self.expire();
        }

        let token = match response.data::<AccessTokenData>() {
            Ok(data) => data.access_token,
            Err(e) => {
                warn!(error = %e, "malformed token refresh response");
                return self.expire();
            }
        };

        if let Err(e) = self.store.set_access_token(token.clone()) {
            warn!(error = %e, "could not persist renewed access token");
            return self.expire();
        }

        info!("access token renewed");
        RefreshOutcome::Renewed(token)
    }

    fn expire(&self) -> RefreshOutcome {
        if let Err(e) = self.store.clear() {
            warn!(error = %e, "could not clear session after failed refresh");
        } else {
            info!("session expired");
        }
        RefreshOutcome::Rejected
    }

    async fn dispatch(&self, request: &ApiRequest, access_token: Option<&str>) -> Result<ApiResponse> {
        match timeout(
            self.request_timeout,
            self.transport.execute(request, access_token),
        )
        .await
        {
            Ok(result) => result,
            Err(_) => {
                warn!(
                    %request,
                    timeout_secs = self.request_timeout.as_secs_f64(),
                    "request timed out"
                );
                Err(GatewayError::Timeout)
            }
        }
    }
}
