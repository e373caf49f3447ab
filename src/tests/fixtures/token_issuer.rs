// Controllable token issuer for TokenManager and connection factory tests.
// Clones share their counters, so a test can keep a handle after moving the
// issuer into a manager.

use crate::shared::infrastructure::auth_token::{AuthToken, TokenError, TokenIssuer};
use async_trait::async_trait;
use chrono::{Duration, Utc};
use std::sync::Arc;
use std::sync::atomic::{AtomicU32, Ordering};

#[derive(Clone)]
pub struct FakeTokenIssuer {
    lifetime: Duration,
    delay_ms: u64,
    empty: bool,
    issued: Arc<AtomicU32>,
    failures: Arc<AtomicU32>,
}

impl FakeTokenIssuer {
    /// Issues `token-<n>` valid for `lifetime`, where n counts issue attempts.
    pub fn lasting(lifetime: Duration) -> Self {
        Self {
            lifetime,
            delay_ms: 0,
            empty: false,
            issued: Arc::new(AtomicU32::new(0)),
            failures: Arc::new(AtomicU32::new(0)),
        }
    }

    pub fn with_delay_ms(mut self, delay_ms: u64) -> Self {
        self.delay_ms = delay_ms;
        self
    }

    pub fn issuing_empty(mut self) -> Self {
        self.empty = true;
        self
    }

    pub fn fail_next(&self, count: u32) {
        self.failures.store(count, Ordering::SeqCst);
    }

    pub fn issued(&self) -> u32 {
        self.issued.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl TokenIssuer for FakeTokenIssuer {
    async fn issue(&self) -> Result<AuthToken, TokenError> {
        let attempt = self.issued.fetch_add(1, Ordering::SeqCst) + 1;
        if self.delay_ms > 0 {
            tokio::time::sleep(std::time::Duration::from_millis(self.delay_ms)).await;
        }
        if self
            .failures
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok()
        {
            return Err(TokenError::Issuance(format!("issuer unavailable (attempt {attempt})")));
        }
        let value = if self.empty {
            String::new()
        } else {
            format!("token-{attempt}")
        };
        Ok(AuthToken::new(value, Utc::now() + self.lifetime))
    }
}
