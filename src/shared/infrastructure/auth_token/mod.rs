use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use std::fmt;
use thiserror::Error;

/// Validity requested for issued database tokens.
pub const DEFAULT_TOKEN_LIFETIME: Duration = Duration::minutes(15);

/// Tokens closer than this to expiry are replaced before use.
pub const DEFAULT_REFRESH_BUFFER: Duration = Duration::minutes(3);

/// Short-lived database credential. Never mutated, only superseded.
#[derive(Clone, PartialEq, Eq)]
pub struct AuthToken {
    value: String,
    expires_at: DateTime<Utc>,
}

impl AuthToken {
    pub fn new(value: impl Into<String>, expires_at: DateTime<Utc>) -> Self {
        Self {
            value: value.into(),
            expires_at,
        }
    }

    pub fn value(&self) -> &str {
        &self.value
    }

    pub fn expires_at(&self) -> DateTime<Utc> {
        self.expires_at
    }

    /// True while `now + refresh_buffer` is still before expiry.
    pub fn is_fresh(&self, now: DateTime<Utc>, refresh_buffer: Duration) -> bool {
        !self.value.is_empty() && now + refresh_buffer < self.expires_at
    }
}

impl fmt::Debug for AuthToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AuthToken")
            .field("value", &"<redacted>")
            .field("expires_at", &self.expires_at)
            .finish()
    }
}

#[derive(Debug, Error)]
pub enum TokenError {
    #[error("credential issuance failed: {0}")]
    Issuance(String),

    #[error("credential issuer returned an empty token")]
    Empty,
}

/// The authority that hands out database credentials.
#[async_trait]
pub trait TokenIssuer: Send + Sync {
    async fn issue(&self) -> Result<AuthToken, TokenError>;
}

pub mod command_issuer;
pub mod static_issuer;
pub mod token_manager;
