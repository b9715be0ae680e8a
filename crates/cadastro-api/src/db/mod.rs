//! # Database Persistence Layer
//!
//! Postgres persistence via SQLx. The database is optional: when
//! `DATABASE_URL` is set the repositories in this module back the services,
//! otherwise the process runs on the in-memory stores in [`crate::repo`]
//! (suitable for development and the test suite).
//!
//! All access is through parameterized queries. The pool is constructed
//! once at startup and handed to the repositories through their
//! constructors; there is no process-global connection.

pub mod addresses;
pub mod customers;

pub use addresses::PgAddressRepository;
pub use customers::PgCustomerRepository;

use sqlx::postgres::{PgPool, PgPoolOptions};

/// Connect the pool and run embedded migrations.
///
/// # Errors
///
/// Returns the SQLx error when the connection or a migration fails.
pub async fn init_pool(url: &str) -> Result<PgPool, sqlx::Error> {
    let pool = PgPoolOptions::new()
        .max_connections(20)
        .min_connections(2)
        .acquire_timeout(std::time::Duration::from_secs(5))
        .connect(url)
        .await?;

    tracing::info!("Connected to PostgreSQL");

    sqlx::migrate!("./migrations").run(&pool).await?;
    tracing::info!("Database migrations applied");

    Ok(pool)
}
