//! Session data structures and the status state machine

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

/// Lifecycle status of the session.
///
/// `SignedOut` and `Authenticated` are the resting states; the other three
/// mark an operation in flight and double as the concurrency guard: while
/// the session sits in one of them, every mutating call is rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionStatus {
    /// No user signed in
    SignedOut,
    /// Login or session restore in flight
    Authenticating,
    /// User signed in, tokens valid
    Authenticated,
    /// Access token exchange in flight
    Refreshing,
    /// Logout in flight
    SigningOut,
}

impl SessionStatus {
    /// Resting states accept new operations; transitional states reject them.
    pub fn is_idle(&self) -> bool {
        matches!(self, SessionStatus::SignedOut | SessionStatus::Authenticated)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            SessionStatus::SignedOut => "signed_out",
            SessionStatus::Authenticating => "authenticating",
            SessionStatus::Authenticated => "authenticated",
            SessionStatus::Refreshing => "refreshing",
            SessionStatus::SigningOut => "signing_out",
        }
    }
}

impl std::fmt::Display for SessionStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for SessionStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "signed_out" => Ok(SessionStatus::SignedOut),
            "authenticating" => Ok(SessionStatus::Authenticating),
            "authenticated" => Ok(SessionStatus::Authenticated),
            "refreshing" => Ok(SessionStatus::Refreshing),
            "signing_out" => Ok(SessionStatus::SigningOut),
            _ => Err(format!("Unknown session status: {}", s)),
        }
    }
}

/// OIDC-style user profile, as returned by the identity provider
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserRecord {
    pub id: String,
    pub email: String,
    pub name: String,
    pub given_name: String,
    pub family_name: String,
    pub picture_url: String,
    pub email_verified: bool,
    /// OIDC subject claim
    pub subject: String,
}

/// The one session owned by [`SessionManager`](crate::SessionManager).
///
/// Invariant: `user`, `access_token` and `refresh_token` are all set or all
/// unset, matching whether the status is on the signed-in side of the
/// machine.
#[derive(Debug, Clone, Serialize)]
pub struct Session {
    pub status: SessionStatus,
    pub user: Option<UserRecord>,
    pub access_token: Option<String>,
    pub refresh_token: Option<String>,
    /// Set whenever the access token is (re)issued
    pub token_issued_at: Option<DateTime<Utc>>,
}

impl Session {
    /// The initial (and post-logout) empty session
    pub fn signed_out() -> Self {
        Self {
            status: SessionStatus::SignedOut,
            user: None,
            access_token: None,
            refresh_token: None,
            token_issued_at: None,
        }
    }

    /// Check the user/token presence invariant
    pub fn is_consistent(&self) -> bool {
        self.user.is_some() == self.access_token.is_some()
            && self.user.is_some() == self.refresh_token.is_some()
    }

    /// Age of the current access token, if one is held
    pub fn token_age(&self, now: DateTime<Utc>) -> Option<Duration> {
        self.token_issued_at.map(|issued| now - issued)
    }
}

/// Session tuning knobs
#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// Nominal access token lifetime; used only by the staleness read
    /// helpers. Nothing here schedules a refresh.
    pub token_lifetime: std::time::Duration,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            token_lifetime: std::time::Duration::from_secs(3600),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_roundtrip() {
        for status in [
            SessionStatus::SignedOut,
            SessionStatus::Authenticating,
            SessionStatus::Authenticated,
            SessionStatus::Refreshing,
            SessionStatus::SigningOut,
        ] {
            let parsed: SessionStatus = status.as_str().parse().unwrap();
            assert_eq!(parsed, status);
        }

        assert!("half_signed_in".parse::<SessionStatus>().is_err());
    }

    #[test]
    fn test_idle_states() {
        assert!(SessionStatus::SignedOut.is_idle());
        assert!(SessionStatus::Authenticated.is_idle());
        assert!(!SessionStatus::Authenticating.is_idle());
        assert!(!SessionStatus::Refreshing.is_idle());
        assert!(!SessionStatus::SigningOut.is_idle());
    }

    #[test]
    fn test_empty_session_is_consistent() {
        let session = Session::signed_out();
        assert!(session.is_consistent());
        assert_eq!(session.status, SessionStatus::SignedOut);
        assert!(session.user.is_none());
        assert!(session.token_issued_at.is_none());
    }
}
