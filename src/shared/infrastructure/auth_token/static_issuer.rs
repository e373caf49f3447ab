use crate::shared::infrastructure::auth_token::{AuthToken, TokenError, TokenIssuer};
use async_trait::async_trait;
use chrono::{Duration, Utc};

/// Issues a configured secret with a nominal lifetime, for databases that use
/// plain password authentication.
pub struct StaticTokenIssuer {
    secret: String,
    lifetime: Duration,
}

impl StaticTokenIssuer {
    pub fn new(secret: impl Into<String>, lifetime: Duration) -> Self {
        Self {
            secret: secret.into(),
            lifetime,
        }
    }
}

#[async_trait]
impl TokenIssuer for StaticTokenIssuer {
    async fn issue(&self) -> Result<AuthToken, TokenError> {
        if self.secret.is_empty() {
            return Err(TokenError::Empty);
        }
        Ok(AuthToken::new(self.secret.clone(), Utc::now() + self.lifetime))
    }
}
