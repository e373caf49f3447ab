use crate::shared::infrastructure::auth_token::TokenError;
use thiserror::Error;

/// Whether a failure is worth retrying with a fresh connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Transient,
    Permanent,
}

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("{entity} {id} not found")]
    NotFound { entity: &'static str, id: String },

    #[error("conflict: {0}")]
    Conflict(String),

    #[error("transient backend error: {0}")]
    Transient(String),

    #[error("backend error: {0}")]
    Backend(String),

    #[error("operation failed after {attempts} attempts: {source}")]
    RetriesExhausted {
        attempts: u32,
        #[source]
        source: Box<StoreError>,
    },
}

impl StoreError {
    pub fn not_found(entity: &'static str, id: impl Into<String>) -> Self {
        Self::NotFound {
            entity,
            id: id.into(),
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            StoreError::Transient(_) => ErrorKind::Transient,
            StoreError::RetriesExhausted { source, .. } => source.kind(),
            StoreError::NotFound { .. } | StoreError::Conflict(_) | StoreError::Backend(_) => {
                ErrorKind::Permanent
            }
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, StoreError::NotFound { .. })
    }
}

// A failed issuance is retried: the next attempt asks for a new token.
impl From<TokenError> for StoreError {
    fn from(err: TokenError) -> Self {
        StoreError::Transient(format!("auth token unavailable: {err}"))
    }
}

impl From<sqlx::Error> for StoreError {
    fn from(err: sqlx::Error) -> Self {
        match &err {
            sqlx::Error::Io(_)
            | sqlx::Error::Tls(_)
            | sqlx::Error::PoolTimedOut
            | sqlx::Error::PoolClosed
            | sqlx::Error::WorkerCrashed => StoreError::Transient(err.to_string()),
            sqlx::Error::Database(db_err) => {
                let code = db_err.code().map(|c| c.into_owned()).unwrap_or_default();
                if code == "23505" {
                    StoreError::Conflict(db_err.message().to_string())
                } else if is_transient_sqlstate(&code) {
                    StoreError::Transient(format!("{code}: {}", db_err.message()))
                } else {
                    StoreError::Backend(format!("{code}: {}", db_err.message()))
                }
            }
            _ => StoreError::Backend(err.to_string()),
        }
    }
}

/// SQLSTATE classes that a new connection with a new token can clear:
/// `08` connection exception, `28` invalid authorization, `57P0x` shutdown.
pub fn is_transient_sqlstate(code: &str) -> bool {
    code.starts_with("08")
        || code.starts_with("28")
        || matches!(code, "57P01" | "57P02" | "57P03" | "40001")
}

pub mod connection_factory;
pub mod retry;
