//! Database connection management

use std::path::Path;
use std::str::FromStr;
use std::time::Duration;

use anyhow::{bail, Context, Result};
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions};
use sqlx::SqlitePool;
use taskdash_config::DatabaseConfig;
use tokio::fs;
use tracing::{info, warn};

/// Connect to the configured database, retrying a bounded number of times.
///
/// Attempts are spaced by a fixed `connect_retry_delay_ms`; the error of
/// the final attempt is returned once `connect_attempts` is exhausted.
pub async fn prepare_database(config: &DatabaseConfig) -> Result<SqlitePool> {
    let attempts = config.connect_attempts.max(1);
    let delay = Duration::from_millis(config.connect_retry_delay_ms);

    let mut attempt = 1;
    loop {
        match connect_once(config).await {
            Ok(pool) => {
                info!(url = %config.url, attempt, "database connection established");
                return Ok(pool);
            }
            Err(err) if attempt < attempts => {
                warn!(
                    url = %config.url,
                    attempt,
                    attempts,
                    error = %format!("{err:#}"),
                    "database connection failed, retrying"
                );
                tokio::time::sleep(delay).await;
                attempt += 1;
            }
            Err(err) => {
                return Err(err).with_context(|| {
                    format!("giving up on database {} after {attempts} attempt(s)", config.url)
                });
            }
        }
    }
}

/// Parse the URL and apply the pragmas every pooled connection needs.
pub fn connect_options(url: &str) -> Result<SqliteConnectOptions> {
    if !url.starts_with("sqlite:") {
        bail!("invalid sqlite url {url}: expected a sqlite: scheme");
    }

    let options = SqliteConnectOptions::from_str(url)
        .with_context(|| format!("invalid sqlite url {url}"))?
        .create_if_missing(true)
        .foreign_keys(true)
        .journal_mode(SqliteJournalMode::Wal)
        .busy_timeout(Duration::from_secs(5));
    Ok(options)
}

async fn connect_once(config: &DatabaseConfig) -> Result<SqlitePool> {
    ensure_sqlite_dir(&config.url).await?;

    SqlitePoolOptions::new()
        .max_connections(config.max_connections.max(1))
        .connect_with(connect_options(&config.url)?)
        .await
        .with_context(|| format!("failed to connect to database {}", config.url))
}

/// Make sure the directory holding the SQLite file exists.
async fn ensure_sqlite_dir(url: &str) -> Result<()> {
    let Some(rest) = url
        .strip_prefix("sqlite://")
        .or_else(|| url.strip_prefix("sqlite:"))
    else {
        return Ok(());
    };

    let sqlite_path = rest.split('?').next().unwrap_or_default();
    if sqlite_path.is_empty() || sqlite_path.starts_with(":memory:") {
        return Ok(());
    }

    if let Some(parent) = Path::new(sqlite_path).parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent).await.with_context(|| {
                format!("failed to create sqlite directory {}", parent.display())
            })?;
        }
    }

    Ok(())
}
