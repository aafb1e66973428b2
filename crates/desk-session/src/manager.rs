//! Session manager: login, logout, refresh, verify, impersonation.

use crate::status::{session_machine, SessionStatus};
use crate::{
    IdentityStack, MemoryProfileCache, ProfileCache, SessionError, SessionResult, UserProfile,
};
use desk_client::{ApiClient, Payload, RequestOptions};
use serde_json::json;
use std::sync::{Arc, Mutex};
use tracing::{debug, info, warn};

/// Fixed fallback shown when the server gives no usable login error.
pub const FALLBACK_LOGIN_MESSAGE: &str = "Invalid username or password.";

/// Session manager for authentication state.
///
/// Constructed explicitly and shared by reference; tests build isolated
/// instances over a mock transport. The manager is the only writer of the
/// profile cache; everything else reads.
pub struct SessionManager {
    client: Arc<ApiClient>,
    cache: Arc<dyn ProfileCache>,
    /// Internal FSM for status transitions.
    machine: Mutex<session_machine::StateMachine>,
    /// Message from the most recent failed login.
    last_error: Mutex<Option<String>>,
    /// Saved identity while impersonating.
    identities: Mutex<IdentityStack>,
}

impl SessionManager {
    /// Create a session manager with an in-memory profile cache.
    pub fn new(client: Arc<ApiClient>) -> Self {
        Self::with_cache(client, Arc::new(MemoryProfileCache::new()))
    }

    /// Create a session manager over an explicit profile cache.
    pub fn with_cache(client: Arc<ApiClient>, cache: Arc<dyn ProfileCache>) -> Self {
        Self {
            client,
            cache,
            machine: Mutex::new(session_machine::StateMachine::new()),
            last_error: Mutex::new(None),
            identities: Mutex::new(IdentityStack::new()),
        }
    }

    /// Current session status.
    pub fn status(&self) -> SessionStatus {
        SessionStatus::from(self.machine.lock().unwrap().state())
    }

    /// The last known user profile, if any.
    pub fn current_user(&self) -> Option<UserProfile> {
        self.cache.load()
    }

    /// Message from the most recent failed login.
    pub fn last_error(&self) -> Option<String> {
        self.last_error.lock().unwrap().clone()
    }

    /// Whether an impersonation is active.
    pub fn is_impersonating(&self) -> bool {
        self.identities.lock().unwrap().is_impersonating()
    }

    /// Apply an FSM input, logging the transition.
    fn transition(&self, input: &session_machine::Input) -> SessionResult<SessionStatus> {
        let mut machine = self.machine.lock().unwrap();
        let old_status = SessionStatus::from(machine.state());

        machine.consume(input).map_err(|_| {
            SessionError::InvalidTransition(format!(
                "cannot apply {:?} in state {:?}",
                input,
                machine.state()
            ))
        })?;

        let new_status = SessionStatus::from(machine.state());
        drop(machine);

        if old_status != new_status {
            debug!(?old_status, ?new_status, "Session status transition");
        }
        Ok(new_status)
    }

    /// Settle the initial status from the local cache, without a network call.
    ///
    /// A cached profile gives a best-effort `Ready` so the UI can redraw
    /// optimistically; [`verify`](Self::verify) confirms with the server.
    /// A no-op once the status has left `Unknown`.
    pub fn bootstrap(&self) -> SessionStatus {
        if self.status() != SessionStatus::Unknown {
            return self.status();
        }

        let input = if self.cache.load().is_some() {
            session_machine::Input::CachedProfileFound
        } else {
            session_machine::Input::NoCredential
        };
        // Both inputs are valid from Unknown.
        self.transition(&input).unwrap_or_else(|_| self.status())
    }

    /// Verify the session cookie with the server.
    ///
    /// Returns true when the server confirms the session; anything else
    /// (including a transport failure) demotes the status to `Missing`.
    pub async fn verify(&self) -> bool {
        let confirmed = match self
            .client
            .execute("/auth/verify", RequestOptions::post_empty())
            .await
        {
            Ok(payload) => {
                let json = payload.as_json();
                let flag = |key: &str| {
                    json.and_then(|v| v.get(key))
                        .and_then(|v| v.as_bool())
                        .unwrap_or(false)
                };
                flag("ok") || flag("valid")
            }
            Err(e) => {
                debug!(error = %e, "Session verification failed");
                false
            }
        };

        let input = if confirmed {
            session_machine::Input::VerifyPassed
        } else {
            session_machine::Input::VerifyFailed
        };
        if let Err(e) = self.transition(&input) {
            debug!(error = %e, "Ignoring verify result in current state");
        }
        confirmed
    }

    /// Log in with username, password, and an optional one-time code.
    ///
    /// On success the returned user replaces the cached profile wholesale.
    /// On failure the status moves to `Error` with the most specific message
    /// available, and any previously cached profile is left untouched.
    pub async fn login(
        &self,
        username: &str,
        password: &str,
        totp_code: Option<&str>,
    ) -> SessionResult<UserProfile> {
        self.transition(&session_machine::Input::LoginAttempt)?;
        *self.last_error.lock().unwrap() = None;

        let mut body = json!({
            "username": username,
            "password": password,
        });
        if let Some(code) = totp_code {
            body["totp_code"] = json!(code);
        }

        let result = self.client.execute("/auth/login/", RequestOptions::post(body)).await;

        match result {
            Ok(payload) => match extract_user(&payload) {
                Some(user) => {
                    info!(user_id = user.id, "Login successful");
                    self.cache.store(&user);
                    self.transition(&session_machine::Input::LoginSucceeded)?;
                    Ok(user)
                }
                None => {
                    let message = FALLBACK_LOGIN_MESSAGE.to_string();
                    *self.last_error.lock().unwrap() = Some(message.clone());
                    self.transition(&session_machine::Input::LoginFailed)?;
                    Err(SessionError::MalformedResponse(
                        "login response had no user object".to_string(),
                    ))
                }
            },
            Err(e) => {
                let message = e.user_message(FALLBACK_LOGIN_MESSAGE);
                warn!(error = %e, "Login failed");
                *self.last_error.lock().unwrap() = Some(message.clone());
                self.transition(&session_machine::Input::LoginFailed)?;
                Err(SessionError::Login(message))
            }
        }
    }

    /// Log out.
    ///
    /// The server call is best-effort: a network failure is swallowed, and
    /// local state is cleared unconditionally either way.
    pub async fn logout(&self) {
        if let Err(e) = self
            .client
            .execute("/auth/logout", RequestOptions::post_empty())
            .await
        {
            warn!(error = %e, "Logout request failed, clearing local session anyway");
        }

        self.cache.clear();
        self.identities.lock().unwrap().clear();
        *self.last_error.lock().unwrap() = None;
        // LogoutCompleted is valid from every state.
        let _ = self.transition(&session_machine::Input::LogoutCompleted);
        info!("Logged out");
    }

    /// Rotate the session via the refresh endpoint.
    ///
    /// Returns true on success. Any failure clears local state; callers must
    /// treat a failed refresh as a logout.
    pub async fn refresh(&self) -> bool {
        match self
            .client
            .execute("/auth/refresh", RequestOptions::post_empty())
            .await
        {
            Ok(payload) => {
                if let Some(user) = extract_user(&payload) {
                    self.cache.store(&user);
                    let _ = self.transition(&session_machine::Input::RefreshSucceeded);
                    true
                } else {
                    debug!("Refresh response had no user object, clearing session");
                    self.clear_after_failed_refresh();
                    false
                }
            }
            Err(e) => {
                warn!(error = %e, "Session refresh failed, clearing session");
                self.clear_after_failed_refresh();
                false
            }
        }
    }

    fn clear_after_failed_refresh(&self) {
        self.cache.clear();
        self.identities.lock().unwrap().clear();
        let _ = self.transition(&session_machine::Input::RefreshFailed);
    }

    /// Impersonate another user (administrative).
    ///
    /// The server swaps the session cookie for the target user's session;
    /// locally the current profile is stashed (at most one saved identity)
    /// and replaced with the target's profile.
    pub async fn impersonate(&self, user_id: i64) -> SessionResult<UserProfile> {
        let current = self.cache.load().ok_or(SessionError::NotAuthenticated)?;

        let payload = self
            .client
            .execute(
                &format!("/users/{}/impersonate/", user_id),
                RequestOptions::post_empty(),
            )
            .await?;

        let user = extract_user(&payload).ok_or_else(|| {
            SessionError::MalformedResponse("impersonate response had no user object".to_string())
        })?;

        let stashed = self.identities.lock().unwrap().stash_if_empty(current);
        if !stashed {
            debug!("Already impersonating, keeping the original saved identity");
        }
        self.cache.store(&user);
        info!(user_id = user.id, "Impersonation started");
        Ok(user)
    }

    /// Stop impersonating and restore the stashed identity.
    pub async fn stop_impersonating(&self) -> SessionResult<UserProfile> {
        if !self.is_impersonating() {
            return Err(SessionError::NotImpersonating);
        }

        // Server side swaps the session cookie back before the stash is
        // consumed, so a failed call leaves the impersonation intact.
        self.client
            .execute("/users/stop-impersonation/", RequestOptions::post_empty())
            .await?;

        let restored = self
            .identities
            .lock()
            .unwrap()
            .pop()
            .ok_or(SessionError::NotImpersonating)?;
        self.cache.store(&restored);
        info!(user_id = restored.id, "Impersonation stopped");
        Ok(restored)
    }
}

impl std::fmt::Debug for SessionManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionManager")
            .field("status", &self.status())
            .finish_non_exhaustive()
    }
}

/// Pull the `user` object out of an auth endpoint payload.
fn extract_user(payload: &Payload) -> Option<UserProfile> {
    let value = payload.as_json()?.get("user")?;
    match serde_json::from_value(value.clone()) {
        Ok(user) => Some(user),
        Err(e) => {
            warn!(error = %e, "Server user object did not deserialize");
            None
        }
    }
}
