// Worker configuration read from the environment (optionally seeded from a
// `.env` file by the binary). Every value except `DB_HOST` and the credential
// has a default.

use crate::modules::products::adapters::outbound::bus_event_publisher::ProductTopics;
use crate::shared::infrastructure::auth_token::command_issuer::CommandTokenIssuer;
use crate::shared::infrastructure::auth_token::static_issuer::StaticTokenIssuer;
use crate::shared::infrastructure::auth_token::{AuthToken, TokenError, TokenIssuer};
use crate::shared::infrastructure::database::connection_factory::{
    ConnectionSettings, PoolSettings,
};
use crate::shell::workers::SweepSettings;
use async_trait::async_trait;
use sqlx::postgres::PgSslMode;
use std::fmt;
use std::str::FromStr;
use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("missing required variable {0}")]
    Missing(&'static str),

    #[error("invalid value for {name}: {value:?}")]
    Invalid { name: &'static str, value: String },

    #[error("inconsistent configuration: {0}")]
    Inconsistent(String),
}

#[derive(Clone, PartialEq, Eq)]
pub enum Credential {
    Password(String),
    Command(String),
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Credential::Password(_) => f.write_str("Password(<redacted>)"),
            Credential::Command(command) => f.debug_tuple("Command").field(command).finish(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    pub connection: ConnectionSettings,
    pub pool: PoolSettings,
    pub credential: Credential,
    pub token_lifetime: chrono::Duration,
    pub refresh_buffer: chrono::Duration,
}

#[derive(Debug, Clone)]
pub struct BusConfig {
    pub broker_url: String,
    pub tenant: String,
    pub namespace: String,
    pub producer_name: String,
    pub source_env: String,
    pub topics: ProductTopics,
}

#[derive(Debug, Clone)]
pub struct Config {
    pub database: DatabaseConfig,
    pub bus: BusConfig,
    pub sweep: SweepSettings,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let vars = Vars { lookup };

        let credential = match (vars.get("DB_TOKEN_COMMAND"), vars.get("DB_PASSWORD")) {
            (Some(command), _) => Credential::Command(command),
            (None, Some(password)) => Credential::Password(password),
            (None, None) => return Err(ConfigError::Missing("DB_PASSWORD or DB_TOKEN_COMMAND")),
        };

        let database = DatabaseConfig {
            connection: ConnectionSettings {
                host: vars.require("DB_HOST")?,
                port: vars.parse("DB_PORT", 5432)?,
                database: vars.or("DB_NAME", "postgres"),
                user: vars.or("DB_USER", "admin"),
                ssl_mode: vars.parse("DB_SSL_MODE", PgSslMode::Require)?,
            },
            pool: PoolSettings {
                max_connections: vars.parse("DB_MAX_CONNECTIONS", 10)?,
                min_connections: vars.parse("DB_MIN_CONNECTIONS", 0)?,
                max_lifetime: vars.seconds("DB_CONN_MAX_LIFETIME_SECS", 720)?,
                idle_timeout: vars.seconds("DB_CONN_IDLE_TIMEOUT_SECS", 300)?,
                ..PoolSettings::default()
            },
            credential,
            token_lifetime: chrono::Duration::seconds(vars.parse("DB_TOKEN_LIFETIME_SECS", 900)?),
            refresh_buffer: chrono::Duration::seconds(vars.parse("DB_TOKEN_REFRESH_BUFFER_SECS", 180)?),
        };

        let bus = BusConfig {
            broker_url: vars.or("BUS_BROKER_URL", "http://localhost:8080"),
            tenant: vars.or("BUS_TENANT", "public"),
            namespace: vars.or("BUS_NAMESPACE", "default"),
            producer_name: vars.or("BUS_PRODUCER_NAME", "products-outbox"),
            source_env: vars.or("EVENT_SOURCE_ENV", "dev"),
            topics: ProductTopics {
                created: vars.or("PRODUCT_CREATED_TOPIC", "product-created"),
                updated: vars.or("PRODUCT_UPDATED_TOPIC", "product-updated"),
                deleted: vars.or("PRODUCT_DELETED_TOPIC", "product-deleted"),
            },
        };

        let sweep = SweepSettings {
            interval: vars.seconds("SWEEP_INTERVAL_SECS", 60)?,
            timeout: vars.seconds("SWEEP_TIMEOUT_SECS", 50)?,
        };

        let config = Self {
            database,
            bus,
            sweep,
        };
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        let db = &self.database;
        if db.token_lifetime <= chrono::Duration::zero() {
            return Err(ConfigError::Inconsistent("token lifetime must be positive".into()));
        }
        if db.refresh_buffer >= db.token_lifetime {
            return Err(ConfigError::Inconsistent(
                "token refresh buffer must be shorter than the token lifetime".into(),
            ));
        }
        let token_lifetime = db.token_lifetime.to_std().unwrap_or_default();
        if db.pool.max_lifetime >= token_lifetime {
            return Err(ConfigError::Inconsistent(
                "connection max lifetime must be shorter than the token lifetime".into(),
            ));
        }
        if db.pool.min_connections > db.pool.max_connections {
            return Err(ConfigError::Inconsistent(
                "min connections exceeds max connections".into(),
            ));
        }
        if self.sweep.interval.is_zero() || self.sweep.timeout > self.sweep.interval {
            return Err(ConfigError::Inconsistent(
                "sweep timeout must not exceed a non-zero sweep interval".into(),
            ));
        }
        Ok(())
    }
}

impl DatabaseConfig {
    pub fn token_issuer(&self) -> Result<ConfiguredTokenIssuer, ConfigError> {
        match &self.credential {
            Credential::Password(password) => Ok(ConfiguredTokenIssuer::Static(
                StaticTokenIssuer::new(password.clone(), self.token_lifetime),
            )),
            Credential::Command(command) => {
                CommandTokenIssuer::from_command_line(command, self.token_lifetime)
                    .map(ConfiguredTokenIssuer::Command)
                    .ok_or_else(|| ConfigError::Invalid {
                        name: "DB_TOKEN_COMMAND",
                        value: command.clone(),
                    })
            }
        }
    }
}

/// The issuer selected by configuration.
pub enum ConfiguredTokenIssuer {
    Static(StaticTokenIssuer),
    Command(CommandTokenIssuer),
}

#[async_trait]
impl TokenIssuer for ConfiguredTokenIssuer {
    async fn issue(&self) -> Result<AuthToken, TokenError> {
        match self {
            ConfiguredTokenIssuer::Static(issuer) => issuer.issue().await,
            ConfiguredTokenIssuer::Command(issuer) => issuer.issue().await,
        }
    }
}

struct Vars<TLookup>
where
    TLookup: Fn(&str) -> Option<String>,
{
    lookup: TLookup,
}

impl<TLookup> Vars<TLookup>
where
    TLookup: Fn(&str) -> Option<String>,
{
    /// Blank values count as unset.
    fn get(&self, name: &str) -> Option<String> {
        (self.lookup)(name).filter(|value| !value.trim().is_empty())
    }

    fn require(&self, name: &'static str) -> Result<String, ConfigError> {
        self.get(name).ok_or(ConfigError::Missing(name))
    }

    fn or(&self, name: &str, default: &str) -> String {
        self.get(name).unwrap_or_else(|| default.to_string())
    }

    fn parse<T>(&self, name: &'static str, default: T) -> Result<T, ConfigError>
    where
        T: FromStr,
    {
        match self.get(name) {
            None => Ok(default),
            Some(value) => value
                .trim()
                .parse()
                .map_err(|_| ConfigError::Invalid { name, value }),
        }
    }

    fn seconds(&self, name: &'static str, default: u64) -> Result<Duration, ConfigError> {
        self.parse(name, default).map(Duration::from_secs)
    }
}
