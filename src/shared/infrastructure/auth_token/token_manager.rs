// Caches the current database credential and refreshes it ahead of expiry.
//
// Responsibilities
// - Serve the cached token under a read lock while it is fresh.
// - Refresh under the write lock, re-checking freshness first so concurrent
//   callers trigger a single issuance.
// - Never cache a failed issuance.

use crate::shared::infrastructure::auth_token::{
    AuthToken, DEFAULT_REFRESH_BUFFER, TokenError, TokenIssuer,
};
use chrono::{Duration, Utc};
use tokio::sync::RwLock;

pub struct TokenManager<TIssuer>
where
    TIssuer: TokenIssuer,
{
    issuer: TIssuer,
    refresh_buffer: Duration,
    cached: RwLock<Option<AuthToken>>,
}

impl<TIssuer> TokenManager<TIssuer>
where
    TIssuer: TokenIssuer,
{
    pub fn new(issuer: TIssuer) -> Self {
        Self::with_refresh_buffer(issuer, DEFAULT_REFRESH_BUFFER)
    }

    pub fn with_refresh_buffer(issuer: TIssuer, refresh_buffer: Duration) -> Self {
        Self {
            issuer,
            refresh_buffer,
            cached: RwLock::new(None),
        }
    }

    pub fn refresh_buffer(&self) -> Duration {
        self.refresh_buffer
    }

    pub async fn get_token(&self) -> Result<AuthToken, TokenError> {
        {
            let cached = self.cached.read().await;
            if let Some(token) = cached.as_ref() {
                if token.is_fresh(Utc::now(), self.refresh_buffer) {
                    return Ok(token.clone());
                }
            }
        }
        self.refresh().await
    }

    async fn refresh(&self) -> Result<AuthToken, TokenError> {
        let mut cached = self.cached.write().await;

        // Another caller may have refreshed while we waited for the lock.
        if let Some(token) = cached.as_ref() {
            if token.is_fresh(Utc::now(), self.refresh_buffer) {
                return Ok(token.clone());
            }
        }

        tracing::info!("refreshing database auth token");
        let token = self.issuer.issue().await.map_err(|err| {
            tracing::error!(error = %err, "database auth token refresh failed");
            err
        })?;
        if token.value().is_empty() {
            return Err(TokenError::Empty);
        }

        tracing::info!(expires_at = %token.expires_at(), "database auth token refreshed");
        *cached = Some(token.clone());
        Ok(token)
    }
}
