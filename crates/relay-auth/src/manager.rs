//! Session manager: owns the one Session and every transition on it
//!
//! Concurrency model: the status field is the guard. Each mutating
//! operation claims the guard by swapping the status to its transitional
//! state inside a single write-lock critical section, performs its
//! collaborator calls with the lock released, then commits or reverts under
//! the lock again. Anything arriving while the guard is claimed fails fast
//! with `OperationInProgress` and mutates nothing. Operations cannot be
//! cancelled once started; callers wait for completion or failure.

use chrono::{Duration as ChronoDuration, Utc};
use parking_lot::RwLock;
use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::error::AuthError;
use crate::provider::IdentityProvider;
use crate::session::{Session, SessionConfig, SessionStatus, UserRecord};
use crate::store::{SessionStore, StoredSession};
use crate::Result;

pub struct SessionManager {
    session: Arc<RwLock<Session>>,
    provider: Arc<dyn IdentityProvider>,
    store: Arc<dyn SessionStore>,
    config: SessionConfig,
}

impl SessionManager {
    pub fn new(provider: Arc<dyn IdentityProvider>, store: Arc<dyn SessionStore>) -> Self {
        Self::with_config(provider, store, SessionConfig::default())
    }

    pub fn with_config(
        provider: Arc<dyn IdentityProvider>,
        store: Arc<dyn SessionStore>,
        config: SessionConfig,
    ) -> Self {
        Self {
            session: Arc::new(RwLock::new(Session::signed_out())),
            provider,
            store,
            config,
        }
    }

    /// Sign in with email and password.
    ///
    /// Only valid from `SignedOut`. On success the session holds the user,
    /// both tokens, and a fresh issue timestamp, and the store has been
    /// updated. On any failure the session is back in `SignedOut` exactly
    /// as it was.
    pub async fn login(&self, email: &str, password: &str) -> Result<UserRecord> {
        if email.trim().is_empty() {
            return Err(AuthError::InvalidInput("email must not be empty"));
        }
        if password.is_empty() {
            return Err(AuthError::InvalidInput("password must not be empty"));
        }

        self.begin(SessionStatus::SignedOut, SessionStatus::Authenticating)?;

        let grant = match self.provider.verify_credentials(email, password).await {
            Ok(grant) => grant,
            Err(e) => {
                self.revert(SessionStatus::SignedOut);
                debug!(email = %email, error = %e, "Login rejected");
                return Err(e);
            }
        };

        let stored = StoredSession {
            user: grant.user.clone(),
            access_token: grant.access_token.clone(),
            refresh_token: grant.refresh_token.clone(),
            token_issued_at: Utc::now(),
        };

        if let Err(e) = self.store.save(&stored).await {
            self.revert(SessionStatus::SignedOut);
            warn!(error = %e, "Failed to persist session after login");
            return Err(AuthError::Storage(e));
        }

        {
            let mut session = self.session.write();
            session.user = Some(stored.user);
            session.access_token = Some(stored.access_token);
            session.refresh_token = Some(stored.refresh_token);
            session.token_issued_at = Some(stored.token_issued_at);
            session.status = SessionStatus::Authenticated;
        }

        info!(email = %grant.user.email, "Signed in");

        Ok(grant.user)
    }

    /// Sign out.
    ///
    /// Only valid from `Authenticated`. The session always ends up empty in
    /// `SignedOut`, even when clearing persisted state fails; that failure
    /// is reported as `CleanupFailed` so the caller can log it, but it never
    /// leaves the app looking signed in.
    pub async fn logout(&self) -> Result<()> {
        self.begin(SessionStatus::Authenticated, SessionStatus::SigningOut)?;

        let cleared = self.store.clear().await;

        *self.session.write() = Session::signed_out();

        match cleared {
            Ok(()) => {
                info!("Signed out");
                Ok(())
            }
            Err(e) => {
                warn!(error = %e, "Signed out locally but stored session cleanup failed");
                Err(AuthError::CleanupFailed(e))
            }
        }
    }

    /// Exchange the refresh token for a new access token.
    ///
    /// Only valid from `Authenticated`. On failure the session is left
    /// exactly as it was, previous access token included; the caller
    /// decides whether repeated failures warrant a logout.
    pub async fn refresh_access_token(&self) -> Result<String> {
        let refresh_token = {
            let mut session = self.session.write();
            if session.status != SessionStatus::Authenticated {
                return Err(AuthError::OperationInProgress {
                    status: session.status,
                });
            }
            let Some(token) = session.refresh_token.clone() else {
                // Unreachable while the session invariant holds
                return Err(AuthError::RefreshFailed("no refresh token held".to_string()));
            };
            session.status = SessionStatus::Refreshing;
            token
        };

        let grant = match self.provider.exchange_refresh_token(&refresh_token).await {
            Ok(grant) => grant,
            Err(e) => {
                self.revert(SessionStatus::Authenticated);
                warn!(error = %e, "Token refresh failed");
                return Err(match e {
                    AuthError::RefreshFailed(_) => e,
                    other => AuthError::RefreshFailed(other.to_string()),
                });
            }
        };

        let issued_at = Utc::now();
        let stored = {
            let session = self.session.read();
            let Some(user) = session.user.clone() else {
                drop(session);
                self.revert(SessionStatus::Authenticated);
                return Err(AuthError::RefreshFailed("no user in session".to_string()));
            };
            StoredSession {
                user,
                access_token: grant.access_token.clone(),
                refresh_token,
                token_issued_at: issued_at,
            }
        };

        if let Err(e) = self.store.save(&stored).await {
            self.revert(SessionStatus::Authenticated);
            warn!(error = %e, "Failed to persist refreshed token");
            return Err(AuthError::Storage(e));
        }

        {
            let mut session = self.session.write();
            session.access_token = Some(grant.access_token.clone());
            session.token_issued_at = Some(issued_at);
            session.status = SessionStatus::Authenticated;
        }

        debug!("Access token refreshed");

        Ok(grant.access_token)
    }

    /// Restore a previously persisted session, intended to run once at
    /// startup.
    ///
    /// Only valid from `SignedOut`. A missing stored session is a normal
    /// outcome (`Ok(None)`), not an error.
    pub async fn restore_session(&self) -> Result<Option<UserRecord>> {
        self.begin(SessionStatus::SignedOut, SessionStatus::Authenticating)?;

        let stored = match self.store.load().await {
            Ok(stored) => stored,
            Err(e) => {
                self.revert(SessionStatus::SignedOut);
                warn!(error = %e, "Failed to read stored session");
                return Err(AuthError::Storage(e));
            }
        };

        let Some(stored) = stored else {
            self.revert(SessionStatus::SignedOut);
            debug!("No stored session found");
            return Ok(None);
        };

        let user = stored.user.clone();

        {
            let mut session = self.session.write();
            session.user = Some(stored.user);
            session.access_token = Some(stored.access_token);
            session.refresh_token = Some(stored.refresh_token);
            session.token_issued_at = Some(stored.token_issued_at);
            session.status = SessionStatus::Authenticated;
        }

        info!(email = %user.email, "Restored session");

        Ok(Some(user))
    }

    // === Pure reads (no guard, no mutation) ===

    pub fn status(&self) -> SessionStatus {
        self.session.read().status
    }

    pub fn is_authenticated(&self) -> bool {
        self.status() == SessionStatus::Authenticated
    }

    pub fn access_token(&self) -> Option<String> {
        self.session.read().access_token.clone()
    }

    pub fn current_user(&self) -> Option<UserRecord> {
        self.session.read().user.clone()
    }

    /// Cloned view of the session for the UI layer
    pub fn snapshot(&self) -> Session {
        self.session.read().clone()
    }

    /// Age of the held access token, if any
    pub fn token_age(&self) -> Option<ChronoDuration> {
        self.session.read().token_age(Utc::now())
    }

    /// Whether the held token has outlived the configured lifetime.
    /// False when no token is held. Staleness does not trigger anything by
    /// itself; the caller polls this and invokes `refresh_access_token`.
    pub fn is_token_stale(&self) -> bool {
        match self.token_age() {
            Some(age) => age.to_std().is_ok_and(|age| age > self.config.token_lifetime),
            None => false,
        }
    }

    /// Claim the guard: atomically require `from` and move to `to`.
    fn begin(&self, from: SessionStatus, to: SessionStatus) -> Result<()> {
        let mut session = self.session.write();
        if session.status != from {
            return Err(AuthError::OperationInProgress {
                status: session.status,
            });
        }
        session.status = to;
        Ok(())
    }

    /// Release the guard without touching any other field
    fn revert(&self, to: SessionStatus) {
        self.session.write().status = to;
    }
}

impl Clone for SessionManager {
    fn clone(&self) -> Self {
        Self {
            session: Arc::clone(&self.session),
            provider: Arc::clone(&self.provider),
            store: Arc::clone(&self.store),
            config: self.config.clone(),
        }
    }
}
