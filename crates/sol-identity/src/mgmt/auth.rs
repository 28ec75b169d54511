//! OAuth2 client-credentials authentication for the Management API.
//!
//! The token cache is the process-wide "currently valid client" handle:
//! callers ask for a token per request and never hold one across awaits.

use chrono::{DateTime, Duration, Utc};
use secrecy::ExposeSecret;
use serde::Deserialize;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::debug;

use crate::shared::error::{IdentityError, Result};
use super::Auth0Config;

/// Token response from the provider's token endpoint.
#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    expires_in: i64,
}

/// Cached access token with its absolute expiry.
#[derive(Debug, Clone)]
struct CachedToken {
    access_token: String,
    expires_at: DateTime<Utc>,
}

impl CachedToken {
    /// True if the token is expired or expires within the grace period.
    fn is_expired(&self, grace_period: Duration) -> bool {
        Utc::now() + grace_period >= self.expires_at
    }
}

/// Caches Management API access tokens and refreshes them under the hood
/// via the client-credentials grant.
pub struct TokenCache {
    config: Auth0Config,
    http_client: reqwest::Client,
    cached_token: Arc<RwLock<Option<CachedToken>>>,
    /// Grace period before expiry that triggers a refresh.
    grace_period: Duration,
}

impl TokenCache {
    pub fn new(config: Auth0Config) -> Self {
        Self {
            config,
            http_client: reqwest::Client::new(),
            cached_token: Arc::new(RwLock::new(None)),
            grace_period: Duration::minutes(5),
        }
    }

    /// Returns a currently valid access token, refreshing if necessary.
    pub async fn get_token(&self) -> Result<String> {
        {
            let cache = self.cached_token.read().await;
            if let Some(ref token) = *cache {
                if !token.is_expired(self.grace_period) {
                    return Ok(token.access_token.clone());
                }
            }
        }

        debug!("refreshing Management API access token");
        let new_token = self.acquire_token().await?;

        {
            let mut cache = self.cached_token.write().await;
            *cache = Some(new_token.clone());
        }

        Ok(new_token.access_token)
    }

    /// Acquires a fresh token via the client-credentials grant.
    async fn acquire_token(&self) -> Result<CachedToken> {
        let params = [
            ("grant_type", "client_credentials"),
            ("client_id", &self.config.client_id),
            ("client_secret", self.config.client_secret.expose_secret()),
            ("audience", &self.config.audience()),
        ];

        let response = self
            .http_client
            .post(self.config.token_url())
            .form(&params)
            .send()
            .await
            .map_err(|e| IdentityError::Auth(format!("token request failed: {e}")))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(IdentityError::Auth(format!(
                "token request failed with status {status}: {body}"
            )));
        }

        let token_response: TokenResponse = response
            .json()
            .await
            .map_err(|e| IdentityError::Auth(format!("failed to parse token response: {e}")))?;

        let expires_at = Utc::now() + Duration::seconds(token_response.expires_in);
        debug!(%expires_at, "acquired new Management API token");

        Ok(CachedToken {
            access_token: token_response.access_token,
            expires_at,
        })
    }

    /// Invalidates the cached token, forcing a refresh on next use.
    pub async fn invalidate(&self) {
        let mut cache = self.cached_token.write().await;
        *cache = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cached_token_expiry() {
        let token = CachedToken {
            access_token: "test".to_string(),
            expires_at: Utc::now() + Duration::minutes(10),
        };

        assert!(!token.is_expired(Duration::minutes(5)));
        assert!(token.is_expired(Duration::minutes(15)));
    }

    #[test]
    fn test_cached_token_already_expired() {
        let token = CachedToken {
            access_token: "test".to_string(),
            expires_at: Utc::now() - Duration::minutes(1),
        };

        assert!(token.is_expired(Duration::zero()));
    }
}
