use std::sync::Arc;

use anyhow::{Context, Result};
use sqlx::SqlitePool;
use taskdash_auth::{Authenticator, JwtManager};
use taskdash_config::{AppConfig, DatabaseBackend};
use taskdash_database::{initialize_database, SqliteUserStore};
use taskdash_users::{MemoryUserStore, UserService, UserStore};
use tracing::{info, warn};

pub mod telemetry {
    use anyhow::Result;
    use tracing::Level;
    use tracing_subscriber::{fmt::SubscriberBuilder, EnvFilter};

    pub fn init_tracing() -> Result<()> {
        let env_filter =
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

        let subscriber = SubscriberBuilder::default()
            .with_max_level(Level::TRACE)
            .with_env_filter(env_filter)
            .finish();

        tracing::subscriber::set_global_default(subscriber)
            .map_err(|error| anyhow::anyhow!("failed to set tracing subscriber: {error}"))
    }
}

#[derive(Clone)]
pub struct BackendServices {
    /// Present only for the sqlite backend.
    pub db_pool: Option<SqlitePool>,
    pub store: Arc<dyn UserStore>,
    pub authenticator: Authenticator,
    pub users: UserService,
}

impl BackendServices {
    /// Validate the configuration, open the configured store and wire the
    /// services that share it.
    pub async fn initialise(config: &AppConfig) -> Result<Self> {
        config.validate().context("invalid configuration")?;

        let jwt = JwtManager::from_config(&config.auth).context("failed to set up token signing")?;

        let (db_pool, store): (Option<SqlitePool>, Arc<dyn UserStore>) =
            match config.database.backend {
                DatabaseBackend::Sqlite => {
                    let pool = initialize_database(&config.database).await?;
                    (Some(pool.clone()), Arc::new(SqliteUserStore::new(pool)))
                }
                DatabaseBackend::Memory => {
                    warn!("using in-memory user store, data is lost on restart");
                    (None, Arc::new(MemoryUserStore::new()))
                }
            };

        let authenticator = Authenticator::new(Arc::clone(&store), jwt);
        let users = UserService::new(Arc::clone(&store));

        info!(
            backend = ?config.database.backend,
            token_ttl_seconds = config.auth.token_ttl_seconds,
            "backend services ready"
        );

        Ok(Self {
            db_pool,
            store,
            authenticator,
            users,
        })
    }
}

pub async fn shutdown_signal() {
    if let Err(error) = tokio::signal::ctrl_c().await {
        tracing::warn!(?error, "failed to listen for shutdown signal");
    }
    info!("shutdown signal received");
}
