use anyhow::{bail, Context};
use clap::{Parser, Subcommand};
use sqlx::Row;
use taskdash_api::{build_router, AppState};
use taskdash_config::{load as load_config, AppConfig, DatabaseBackend, DatabaseConfig};
use taskdash_database::initialize_database;
use taskdash_runtime::{telemetry, BackendServices};
use tokio::net::TcpListener;
use tracing::info;

#[derive(Parser)]
#[command(name = "taskdash-server")]
#[command(about = "Taskdash backend (serves HTTP by default)")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the HTTP server (default)
    Serve,
    /// Load and validate the configuration, then print a summary
    CheckConfig,
    /// List registered users from the sqlite database
    DumpUsers,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    match cli.command.unwrap_or(Commands::Serve) {
        Commands::Serve => run_server().await,
        Commands::CheckConfig => check_config(),
        Commands::DumpUsers => dump_users().await,
    }
}

async fn run_server() -> anyhow::Result<()> {
    telemetry::init_tracing().context("failed to initialise tracing")?;

    info!("starting Taskdash backend");

    let config = load_config().context("failed to load configuration")?;

    let services = BackendServices::initialise(&config)
        .await
        .context("failed to initialise backend services")?;

    let state = AppState::new(services.authenticator, services.users)
        .with_allowed_origins(config.cors.allowed_origins.clone());
    let app = build_router(state);

    let address = format!("{}:{}", config.http.address, config.http.port);
    let listener = TcpListener::bind(&address)
        .await
        .with_context(|| format!("failed to bind http listener on {address}"))?;

    info!(%address, "http server listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(taskdash_runtime::shutdown_signal())
        .await
        .context("http server error")?;

    info!("backend shut down");
    Ok(())
}

fn check_config() -> anyhow::Result<()> {
    let config = load_config().context("failed to load configuration")?;
    config.validate().context("configuration is not usable")?;

    print_summary(&config);
    println!("configuration OK");
    Ok(())
}

fn print_summary(config: &AppConfig) {
    println!("http.address                   {}", config.http.address);
    println!("http.port                      {}", config.http.port);
    println!("database.backend               {:?}", config.database.backend);
    println!("database.url                   {}", config.database.url);
    println!("database.max_connections       {}", config.database.max_connections);
    println!("database.connect_attempts      {}", config.database.connect_attempts);
    println!("database.connect_retry_delay_ms {}", config.database.connect_retry_delay_ms);
    println!(
        "auth.jwt_secret                {}",
        if config.auth.jwt_secret.is_some() { "<set>" } else { "<missing>" }
    );
    println!("auth.issuer                    {}", config.auth.issuer);
    println!("auth.token_ttl_seconds         {}", config.auth.token_ttl_seconds);
    if config.cors.allowed_origins.is_empty() {
        println!("cors.allowed_origins           <any>");
    } else {
        println!("cors.allowed_origins           {}", config.cors.allowed_origins.join(", "));
    }
}

struct UserRow {
    id: String,
    username: String,
    email: String,
    created_at: String,
}

async fn dump_users() -> anyhow::Result<()> {
    telemetry::init_tracing().context("failed to initialise tracing")?;

    let config = load_config().context("failed to load configuration")?;
    let users = load_user_rows(&config.database).await?;

    if users.is_empty() {
        println!("No users found in database");
        return Ok(());
    }

    println!("Found {} users:", users.len());
    println!("{:<26} {:<32} {:<40} {:<25}", "ID", "Username", "Email", "Created At");
    println!("{}", "-".repeat(126));

    for user in users {
        println!(
            "{:<26} {:<32} {:<40} {:<25}",
            user.id, user.username, user.email, user.created_at
        );
    }

    Ok(())
}

/// Read user rows straight from the database. Only the database section of
/// the configuration is consulted, so no signing secret is needed.
async fn load_user_rows(database: &DatabaseConfig) -> anyhow::Result<Vec<UserRow>> {
    if database.backend != DatabaseBackend::Sqlite {
        bail!("dump-users needs the sqlite backend, the memory store is empty at startup");
    }

    let pool = initialize_database(database)
        .await
        .context("failed to open the user database")?;

    let rows = sqlx::query(
        r#"
        SELECT id, username, email, created_at
        FROM users
        ORDER BY created_at ASC
        "#,
    )
    .fetch_all(&pool)
    .await
    .context("failed to fetch users")?;

    rows.iter()
        .map(|row| -> anyhow::Result<UserRow> {
            Ok(UserRow {
                id: row.try_get("id")?,
                username: row.try_get("username")?,
                email: row.try_get("email")?,
                created_at: row.try_get("created_at")?,
            })
        })
        .collect()
}
