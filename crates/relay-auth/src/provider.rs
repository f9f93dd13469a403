//! Identity provider collaborator
//!
//! In a real deployment this seam is filled by an OIDC/OAuth client; the
//! demo build ships a constant-match verifier with canned profile data.
//! The manager treats either one as an opaque success-or-failure call.

use async_trait::async_trait;
use std::time::Duration;
use uuid::Uuid;

use crate::error::AuthError;
use crate::session::UserRecord;

/// Result of a successful credential check
#[derive(Debug, Clone)]
pub struct ProviderGrant {
    pub user: UserRecord,
    pub access_token: String,
    pub refresh_token: String,
    /// Provider-reported token lifetime, seconds
    pub expires_in: u64,
}

/// Result of a successful refresh-token exchange
#[derive(Debug, Clone)]
pub struct TokenGrant {
    pub access_token: String,
    pub expires_in: u64,
}

/// Abstract identity provider. Implementations must be safe to call from
/// any task; the session manager never holds its lock across these awaits.
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    async fn verify_credentials(
        &self,
        email: &str,
        password: &str,
    ) -> Result<ProviderGrant, AuthError>;

    async fn exchange_refresh_token(&self, refresh_token: &str)
        -> Result<TokenGrant, AuthError>;
}

/// Demo credentials accepted by [`DemoIdentityProvider`]
pub const DEMO_EMAIL: &str = "user@example.com";
pub const DEMO_PASSWORD: &str = "password";

const DEMO_TOKEN_LIFETIME_SECS: u64 = 3600;

/// Stand-in provider for the demo build: accepts exactly one fixed
/// credential pair and mints opaque tokens locally.
pub struct DemoIdentityProvider {
    /// Simulated network latency, zero by default
    latency: Duration,
}

impl DemoIdentityProvider {
    pub fn new() -> Self {
        Self {
            latency: Duration::ZERO,
        }
    }

    pub fn with_latency(latency: Duration) -> Self {
        Self { latency }
    }

    fn demo_user() -> UserRecord {
        UserRecord {
            id: "user_123".to_string(),
            email: DEMO_EMAIL.to_string(),
            name: "John Doe".to_string(),
            given_name: "John".to_string(),
            family_name: "Doe".to_string(),
            picture_url: "https://via.placeholder.com/150/007AFF/FFFFFF?text=JD".to_string(),
            email_verified: true,
            subject: "user_123".to_string(),
        }
    }
}

impl Default for DemoIdentityProvider {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl IdentityProvider for DemoIdentityProvider {
    async fn verify_credentials(
        &self,
        email: &str,
        password: &str,
    ) -> Result<ProviderGrant, AuthError> {
        if !self.latency.is_zero() {
            tokio::time::sleep(self.latency).await;
        }

        if email != DEMO_EMAIL || password != DEMO_PASSWORD {
            return Err(AuthError::InvalidCredentials);
        }

        Ok(ProviderGrant {
            user: Self::demo_user(),
            access_token: mint_token("access"),
            refresh_token: mint_token("refresh"),
            expires_in: DEMO_TOKEN_LIFETIME_SECS,
        })
    }

    async fn exchange_refresh_token(
        &self,
        refresh_token: &str,
    ) -> Result<TokenGrant, AuthError> {
        if !self.latency.is_zero() {
            tokio::time::sleep(self.latency).await;
        }

        if refresh_token.is_empty() {
            return Err(AuthError::RefreshFailed("empty refresh token".to_string()));
        }

        Ok(TokenGrant {
            access_token: mint_token("access"),
            expires_in: DEMO_TOKEN_LIFETIME_SECS,
        })
    }
}

/// Mint an opaque hex token. Unique per call; carries no claims.
fn mint_token(kind: &str) -> String {
    use sha2::{Digest, Sha256};

    let mut hasher = Sha256::new();
    hasher.update(kind.as_bytes());
    hasher.update(Uuid::new_v4().as_bytes());
    hasher.update(chrono::Utc::now().timestamp_nanos_opt().unwrap_or_default().to_le_bytes());
    let digest = hasher.finalize();

    digest.iter().map(|b| format!("{:02x}", b)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_demo_provider_accepts_fixed_credentials() {
        let provider = DemoIdentityProvider::new();

        let grant = provider
            .verify_credentials(DEMO_EMAIL, DEMO_PASSWORD)
            .await
            .unwrap();

        assert_eq!(grant.user.email, DEMO_EMAIL);
        assert_eq!(grant.user.id, "user_123");
        assert!(grant.user.email_verified);
        assert_eq!(grant.expires_in, 3600);
        assert!(!grant.access_token.is_empty());
        assert_ne!(grant.access_token, grant.refresh_token);
    }

    #[tokio::test]
    async fn test_demo_provider_rejects_other_credentials() {
        let provider = DemoIdentityProvider::new();

        let result = provider.verify_credentials("bad@x.com", "x").await;
        assert!(matches!(result, Err(AuthError::InvalidCredentials)));

        // Right email, wrong password
        let result = provider.verify_credentials(DEMO_EMAIL, "hunter2").await;
        assert!(matches!(result, Err(AuthError::InvalidCredentials)));
    }

    #[tokio::test]
    async fn test_refresh_exchange_mints_new_token() {
        let provider = DemoIdentityProvider::new();

        let grant = provider
            .verify_credentials(DEMO_EMAIL, DEMO_PASSWORD)
            .await
            .unwrap();
        let refreshed = provider
            .exchange_refresh_token(&grant.refresh_token)
            .await
            .unwrap();

        assert_ne!(refreshed.access_token, grant.access_token);
    }

    #[test]
    fn test_minted_tokens_are_unique_hex() {
        let a = mint_token("access");
        let b = mint_token("access");

        assert_ne!(a, b);
        assert_eq!(a.len(), 64);
        assert!(a.chars().all(|c| c.is_ascii_hexdigit()));
    }
}
