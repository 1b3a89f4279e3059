use std::{path::Path, time::Duration};

use anyhow::{Context, Result};
use sqlx::Row;
use taskdash_config::{AppConfig, DatabaseBackend};
use taskdash_runtime::{self, BackendServices};
use tempfile::TempDir;
use tokio::time::{sleep, timeout};

const SECRET: &str = "runtime-test-secret-runtime-test-secret";

fn sqlite_url(path: &Path) -> String {
    format!("sqlite://{}", path.to_string_lossy())
}

fn build_config(database_url: String, max_connections: u32) -> AppConfig {
    let mut config = AppConfig::default();
    config.database.url = database_url;
    config.database.max_connections = max_connections;
    config.database.connect_attempts = 1;
    config.database.connect_retry_delay_ms = 0;
    config.auth.jwt_secret = Some(SECRET.into());
    config
}

async fn initialise(config: &AppConfig) -> Result<BackendServices> {
    BackendServices::initialise(config)
        .await
        .context("failed to initialise backend services")
}

fn expect_failure(result: Result<BackendServices>) -> anyhow::Error {
    match result {
        Ok(_) => panic!("expected backend initialisation to fail"),
        Err(error) => error,
    }
}

#[tokio::test(flavor = "multi_thread")]
async fn initialise_runs_migrations_for_sqlite_backend() -> Result<()> {
    let temp_dir = TempDir::new()?;
    let db_path = temp_dir.path().join("runtime/init.db");
    let config = build_config(sqlite_url(&db_path), 4);

    let services = initialise(&config).await?;
    let pool = services.db_pool.clone().context("sqlite backend must expose a pool")?;
    let table: String = sqlx::query_scalar(
        "SELECT name FROM sqlite_master WHERE type = 'table' AND name = 'users'",
    )
    .fetch_one(&pool)
    .await?;

    assert_eq!("users", table);
    Ok(())
}

#[tokio::test(flavor = "multi_thread")]
async fn initialise_wires_authenticator_and_user_service_to_one_store() -> Result<()> {
    let mut config = build_config(String::new(), 1);
    config.database.backend = DatabaseBackend::Memory;

    let services = initialise(&config).await?;
    assert!(services.db_pool.is_none());

    let user = services
        .authenticator
        .register("ada", "ada@example.com", "password123")
        .await?;
    let settings = services.users.get_settings(&user.id).await?;
    assert!(settings.email_notifications);
    assert!(services.store.find_by_id(&user.id).await?.is_some());
    Ok(())
}

#[tokio::test(flavor = "multi_thread")]
async fn initialise_refuses_to_start_without_secret() -> Result<()> {
    let mut config = build_config(String::new(), 1);
    config.database.backend = DatabaseBackend::Memory;
    config.auth.jwt_secret = None;

    let error = expect_failure(BackendServices::initialise(&config).await);
    let message = format!("{error:#}");
    assert!(
        message.contains("invalid configuration") && message.contains("jwt_secret"),
        "unexpected error: {message}"
    );
    Ok(())
}

#[tokio::test(flavor = "multi_thread")]
async fn prepare_database_creates_sqlite_directory_if_missing() -> Result<()> {
    let temp_dir = TempDir::new()?;
    let db_dir = temp_dir.path().join("nested");
    let db_path = db_dir.join("prepared.db");
    let config = build_config(sqlite_url(&db_path), 2);

    assert!(!db_dir.exists());

    let services = initialise(&config).await?;
    assert!(db_dir.exists(), "database directory should be created");
    assert!(db_path.exists(), "sqlite database file should be created");
    drop(services);
    Ok(())
}

#[tokio::test(flavor = "multi_thread")]
async fn prepare_database_enables_sqlite_foreign_keys() -> Result<()> {
    let temp_dir = TempDir::new()?;
    let db_path = temp_dir.path().join("runtime/foreign_keys.db");
    let config = build_config(sqlite_url(&db_path), 2);

    let services = initialise(&config).await?;
    let pool = services.db_pool.clone().context("pool")?;

    let enabled: i64 = sqlx::query_scalar("PRAGMA foreign_keys")
        .fetch_one(&pool)
        .await?;
    assert_eq!(1, enabled, "foreign key enforcement must be enabled");
    Ok(())
}

#[tokio::test(flavor = "multi_thread")]
async fn prepare_database_applies_max_connections_setting() -> Result<()> {
    let temp_dir = TempDir::new()?;
    let db_path = temp_dir.path().join("runtime/max_conn.db");
    let max_connections = 3;
    let config = build_config(sqlite_url(&db_path), max_connections);

    let services = initialise(&config).await?;
    let pool = services.db_pool.clone().context("pool")?;
    assert_eq!(max_connections, pool.options().get_max_connections());
    Ok(())
}

#[tokio::test(flavor = "multi_thread")]
async fn memory_sqlite_url_creates_no_files() -> Result<()> {
    let config = build_config("sqlite://:memory:".into(), 1);
    let services = initialise(&config).await?;
    let pool = services.db_pool.clone().context("pool")?;

    let databases = sqlx::query("PRAGMA database_list").fetch_all(&pool).await?;
    let main_db = databases
        .into_iter()
        .find(|row| {
            row.try_get::<String, _>("name")
                .map(|name| name == "main")
                .unwrap_or(false)
        })
        .context("expected main in PRAGMA database_list")?;
    let file: String = main_db.try_get("file")?;
    assert!(
        file.is_empty(),
        "in-memory sqlite database should not create filesystem entries"
    );
    Ok(())
}

#[tokio::test(flavor = "multi_thread")]
async fn non_sqlite_urls_fail_without_touching_filesystem() -> Result<()> {
    let temp_dir = TempDir::new()?;
    let target_dir = temp_dir.path().join("should_not_exist");
    let malformed_url = format!("postgres://{}/ignored.db", target_dir.to_string_lossy());
    let config = build_config(malformed_url, 1);

    let error = expect_failure(BackendServices::initialise(&config).await);
    assert!(
        !target_dir.exists(),
        "non-sqlite URLs must not create filesystem structures"
    );
    let message = format!("{error:#}");
    assert!(
        message.contains("invalid sqlite url"),
        "expected url rejection, got {message}"
    );
    Ok(())
}

#[tokio::test(flavor = "multi_thread")]
async fn connection_retries_are_bounded() -> Result<()> {
    let temp_dir = TempDir::new()?;
    let blocker = temp_dir.path().join("blocker");
    std::fs::write(&blocker, b"")?;

    let mut config = build_config(sqlite_url(&blocker.join("app.db")), 1);
    config.database.connect_attempts = 2;
    config.database.connect_retry_delay_ms = 10;

    let error = expect_failure(BackendServices::initialise(&config).await);
    assert!(format!("{error:#}").contains("after 2 attempt(s)"));
    Ok(())
}

#[test]
fn telemetry_init_tracing_sets_global_subscriber() {
    taskdash_runtime::telemetry::init_tracing().expect("first initialisation should succeed");

    let second = taskdash_runtime::telemetry::init_tracing();
    assert!(
        second.is_err(),
        "initialising telemetry twice should fail with global subscriber already set"
    );
}

#[tokio::test(flavor = "multi_thread")]
#[cfg_attr(not(unix), ignore = "requires Unix signal handling")]
async fn shutdown_signal_completes_on_ctrl_c_notification() -> Result<()> {
    let shutdown_task = tokio::spawn(async { taskdash_runtime::shutdown_signal().await });

    sleep(Duration::from_millis(50)).await;
    #[cfg(unix)]
    unsafe {
        libc::raise(libc::SIGINT);
    }

    timeout(Duration::from_secs(2), shutdown_task).await??;
    Ok(())
}
