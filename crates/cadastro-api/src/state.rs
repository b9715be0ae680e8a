//! # Application State
//!
//! Configuration loaded from the environment and the shared state handed to
//! every route handler. Repositories are constructed here and injected into
//! the services; there is no process-global connection anywhere.

use std::sync::Arc;

use sqlx::PgPool;
use thiserror::Error;

use crate::auth::SecretString;
use crate::db::{PgAddressRepository, PgCustomerRepository};
use crate::repo::{
    AddressRepository, CustomerRepository, InMemoryAddressRepository, InMemoryCustomerRepository,
};
use crate::service::{AddressService, CustomerService};

/// Configuration loading failures. The process refuses to start without a
/// token secret.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("CADASTRO_JWT_SECRET is not set")]
    MissingJwtSecret,

    #[error("invalid value for {0}")]
    InvalidValue(&'static str),
}

/// Service configuration, loaded once at startup.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub port: u16,
    /// Absent means the in-memory store (development and tests).
    pub database_url: Option<String>,
    pub jwt_secret: SecretString,
    /// The single origin allowed by CORS.
    pub cors_origin: String,
    pub token_ttl_secs: i64,
}

impl AppConfig {
    pub const DEFAULT_PORT: u16 = 8080;
    pub const DEFAULT_CORS_ORIGIN: &'static str = "http://localhost:3000";
    pub const DEFAULT_TOKEN_TTL_SECS: i64 = 3600;

    /// Load configuration from the environment.
    ///
    /// # Errors
    ///
    /// Fails when `CADASTRO_JWT_SECRET` is absent or a numeric variable
    /// does not parse.
    pub fn from_env() -> Result<Self, ConfigError> {
        let port = match std::env::var("CADASTRO_PORT") {
            Ok(raw) => raw
                .parse()
                .map_err(|_| ConfigError::InvalidValue("CADASTRO_PORT"))?,
            Err(_) => Self::DEFAULT_PORT,
        };

        let token_ttl_secs = match std::env::var("CADASTRO_TOKEN_TTL_SECS") {
            Ok(raw) => raw
                .parse()
                .map_err(|_| ConfigError::InvalidValue("CADASTRO_TOKEN_TTL_SECS"))?,
            Err(_) => Self::DEFAULT_TOKEN_TTL_SECS,
        };

        let jwt_secret = std::env::var("CADASTRO_JWT_SECRET")
            .map(SecretString::new)
            .map_err(|_| ConfigError::MissingJwtSecret)?;

        Ok(Self {
            port,
            database_url: std::env::var("DATABASE_URL").ok(),
            jwt_secret,
            cors_origin: std::env::var("CADASTRO_CORS_ORIGIN")
                .unwrap_or_else(|_| Self::DEFAULT_CORS_ORIGIN.to_string()),
            token_ttl_secs,
        })
    }
}

/// Shared application state passed to all route handlers.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub customers: CustomerService,
    pub addresses: AddressService,
}

impl AppState {
    /// State over the in-memory stores.
    pub fn new(config: AppConfig) -> Self {
        Self::assemble(
            config,
            Arc::new(InMemoryCustomerRepository::new()),
            Arc::new(InMemoryAddressRepository::new()),
        )
    }

    /// State over Postgres repositories sharing one pool.
    pub fn with_pool(config: AppConfig, pool: PgPool) -> Self {
        Self::assemble(
            config,
            Arc::new(PgCustomerRepository::new(pool.clone())),
            Arc::new(PgAddressRepository::new(pool)),
        )
    }

    fn assemble(
        config: AppConfig,
        customer_repo: Arc<dyn CustomerRepository>,
        address_repo: Arc<dyn AddressRepository>,
    ) -> Self {
        let addresses = AddressService::new(address_repo);
        let customers = CustomerService::new(customer_repo, addresses.clone());

        Self {
            config: Arc::new(config),
            customers,
            addresses,
        }
    }
}
