// Opens Postgres connections authenticated with the current short-lived token.
//
// Purpose
// - Every operation gets a freshly built pool so the embedded credential is
//   never older than the token manager allows. Tokens rotate faster than a
//   long-lived pool would recycle its connections.
//
// Responsibilities
// - Build connect options from settings plus the current token.
// - Bound the pool (max connections, idle count, max lifetime below the token
//   validity).
// - Run a closure inside a transaction: commit on success, roll back on error.
//   A dropped or panicking transaction is rolled back by sqlx.

use crate::shared::infrastructure::auth_token::TokenIssuer;
use crate::shared::infrastructure::auth_token::token_manager::TokenManager;
use crate::shared::infrastructure::database::StoreError;
use sqlx::postgres::{PgConnectOptions, PgPoolOptions, PgSslMode};
use sqlx::{PgPool, Postgres, Transaction};
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::time::Duration;

pub type TxFuture<'t, T> = Pin<Box<dyn Future<Output = Result<T, StoreError>> + Send + 't>>;

#[derive(Debug, Clone)]
pub struct ConnectionSettings {
    pub host: String,
    pub port: u16,
    pub database: String,
    pub user: String,
    pub ssl_mode: PgSslMode,
}

#[derive(Debug, Clone)]
pub struct PoolSettings {
    pub max_connections: u32,
    pub min_connections: u32,
    pub max_lifetime: Duration,
    pub idle_timeout: Duration,
    pub acquire_timeout: Duration,
}

impl Default for PoolSettings {
    fn default() -> Self {
        Self {
            max_connections: 10,
            min_connections: 0,
            max_lifetime: Duration::from_secs(12 * 60),
            idle_timeout: Duration::from_secs(5 * 60),
            acquire_timeout: Duration::from_secs(10),
        }
    }
}

pub struct PgConnectionFactory<TIssuer>
where
    TIssuer: TokenIssuer,
{
    token_manager: Arc<TokenManager<TIssuer>>,
    settings: ConnectionSettings,
    pool_settings: PoolSettings,
}

impl<TIssuer> PgConnectionFactory<TIssuer>
where
    TIssuer: TokenIssuer,
{
    pub fn new(
        token_manager: Arc<TokenManager<TIssuer>>,
        settings: ConnectionSettings,
        pool_settings: PoolSettings,
    ) -> Self {
        Self {
            token_manager,
            settings,
            pool_settings,
        }
    }

    pub fn connect_options(&self, password: &str) -> PgConnectOptions {
        PgConnectOptions::new()
            .host(&self.settings.host)
            .port(self.settings.port)
            .database(&self.settings.database)
            .username(&self.settings.user)
            .password(password)
            .ssl_mode(self.settings.ssl_mode)
    }

    pub fn pool_options(&self) -> PgPoolOptions {
        PgPoolOptions::new()
            .max_connections(self.pool_settings.max_connections)
            .min_connections(self.pool_settings.min_connections)
            .max_lifetime(self.pool_settings.max_lifetime)
            .idle_timeout(self.pool_settings.idle_timeout)
            .acquire_timeout(self.pool_settings.acquire_timeout)
            .test_before_acquire(true)
    }

    /// Opens a new pool using the current token. Connecting verifies the
    /// credential, so auth failures surface here as transient errors.
    pub async fn create_connection(&self) -> Result<PgPool, StoreError> {
        let token = self.token_manager.get_token().await?;
        let pool = self
            .pool_options()
            .connect_with(self.connect_options(token.value()))
            .await
            .map_err(|err| {
                tracing::warn!(host = %self.settings.host, error = %err, "failed to open database connection");
                StoreError::from(err)
            })?;
        Ok(pool)
    }

    pub async fn with_connection<T, TOperation, TFuture>(
        &self,
        operation: TOperation,
    ) -> Result<T, StoreError>
    where
        TOperation: FnOnce(PgPool) -> TFuture,
        TFuture: Future<Output = Result<T, StoreError>>,
    {
        let pool = self.create_connection().await?;
        let result = operation(pool.clone()).await;
        pool.close().await;
        result
    }

    pub async fn with_transaction<T, TWork>(&self, work: TWork) -> Result<T, StoreError>
    where
        T: Send,
        TWork: for<'t> FnOnce(&'t mut Transaction<'static, Postgres>) -> TxFuture<'t, T> + Send,
    {
        self.with_connection(|pool| async move {
            let mut tx = pool.begin().await?;
            match work(&mut tx).await {
                Ok(value) => {
                    tx.commit().await?;
                    Ok(value)
                }
                Err(err) => {
                    if let Err(rollback_err) = tx.rollback().await {
                        tracing::warn!(error = %rollback_err, "transaction rollback failed");
                    }
                    Err(err)
                }
            }
        })
        .await
    }
}
