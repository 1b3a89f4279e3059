//! Taskdash Database Crate
//!
//! SQLite persistence for the Taskdash backend: connection setup with a
//! bounded retry, embedded migrations, and [`SqliteUserStore`], the
//! durable implementation of [`taskdash_users::UserStore`].

use anyhow::Result;
use sqlx::SqlitePool;
use taskdash_config::DatabaseConfig;

pub mod connection;
pub mod migrations;
pub mod user_store;

pub use connection::{connect_options, prepare_database};
pub use migrations::{run_migrations, MIGRATOR};
pub use user_store::SqliteUserStore;

/// Connect (with retry) and bring the schema up to date.
pub async fn initialize_database(config: &DatabaseConfig) -> Result<SqlitePool> {
    let pool = prepare_database(config).await?;
    run_migrations(&pool).await?;
    Ok(pool)
}
