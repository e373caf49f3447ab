use crate::modules::products::core::product::ProductError;
use crate::shared::infrastructure::database::{ErrorKind, StoreError};
use crate::shared::infrastructure::outbox::OutboxError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ApplicationError {
    #[error(transparent)]
    Domain(#[from] ProductError),

    #[error("product {0} not found")]
    NotFound(String),

    #[error(transparent)]
    Store(StoreError),

    #[error(transparent)]
    Outbox(#[from] OutboxError),
}

impl ApplicationError {
    /// Whether the caller may try the same command again later.
    pub fn is_transient(&self) -> bool {
        matches!(self, ApplicationError::Store(err) if err.kind() == ErrorKind::Transient)
    }
}

impl From<StoreError> for ApplicationError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound { id, .. } => ApplicationError::NotFound(id),
            other => ApplicationError::Store(other),
        }
    }
}
