use anyhow::{bail, Context};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use tracing::debug;

const DEFAULT_CONFIG_FILES: &[&str] = &[
    "taskdash.toml",
    "config/taskdash.toml",
    "../taskdash.toml",
    "../config/taskdash.toml",
];

/// Minimum accepted length, in bytes, of the token signing secret.
pub const MIN_JWT_SECRET_LEN: usize = 32;

/// Longest accepted token lifetime (30 days).
pub const MAX_TOKEN_TTL_SECONDS: u64 = 30 * 24 * 60 * 60;

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct AppConfig {
    pub http: HttpConfig,
    pub database: DatabaseConfig,
    pub auth: AuthConfig,
    #[serde(default)]
    pub cors: CorsConfig,
}

impl AppConfig {
    /// Reject configurations the server must not start with.
    ///
    /// ```
    /// use taskdash_config::AppConfig;
    ///
    /// let mut config = AppConfig::default();
    /// assert!(config.validate().is_err());
    ///
    /// config.auth.jwt_secret = Some("0123456789abcdef0123456789abcdef".into());
    /// assert!(config.validate().is_ok());
    /// ```
    pub fn validate(&self) -> anyhow::Result<()> {
        match self.auth.jwt_secret.as_deref() {
            None => bail!("auth.jwt_secret must be configured"),
            Some(secret) if secret.trim().len() < MIN_JWT_SECRET_LEN => {
                bail!("auth.jwt_secret must be at least {MIN_JWT_SECRET_LEN} bytes")
            }
            Some(_) => {}
        }

        if self.auth.token_ttl_seconds == 0 {
            bail!("auth.token_ttl_seconds must be greater than zero");
        }

        if self.auth.token_ttl_seconds > MAX_TOKEN_TTL_SECONDS {
            bail!("auth.token_ttl_seconds must be at most {MAX_TOKEN_TTL_SECONDS}");
        }

        if self.database.backend == DatabaseBackend::Sqlite && self.database.url.trim().is_empty() {
            bail!("database.url must be configured for the sqlite backend");
        }

        if self.database.connect_attempts == 0 {
            bail!("database.connect_attempts must be at least 1");
        }

        Ok(())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HttpConfig {
    pub address: String,
    pub port: u16,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            address: "127.0.0.1".to_string(),
            port: 5000,
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum DatabaseBackend {
    #[default]
    Sqlite,
    Memory,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    #[serde(default)]
    pub backend: DatabaseBackend,
    pub url: String,
    pub max_connections: u32,
    #[serde(default = "DatabaseConfig::default_connect_attempts")]
    pub connect_attempts: u32,
    #[serde(default = "DatabaseConfig::default_connect_retry_delay_ms")]
    pub connect_retry_delay_ms: u64,
}

impl DatabaseConfig {
    const fn default_connect_attempts() -> u32 {
        3
    }

    const fn default_connect_retry_delay_ms() -> u64 {
        5_000
    }
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            backend: DatabaseBackend::default(),
            url: "sqlite://taskdash.db".to_string(),
            max_connections: 10,
            connect_attempts: Self::default_connect_attempts(),
            connect_retry_delay_ms: Self::default_connect_retry_delay_ms(),
        }
    }
}

/// Token signing settings. There is deliberately no default secret.
#[derive(Clone, Serialize, Deserialize)]
pub struct AuthConfig {
    #[serde(default)]
    pub jwt_secret: Option<String>,
    #[serde(default = "AuthConfig::default_issuer")]
    pub issuer: String,
    #[serde(default = "AuthConfig::default_token_ttl")]
    pub token_ttl_seconds: u64,
}

impl AuthConfig {
    fn default_issuer() -> String {
        "taskdash".to_string()
    }

    const fn default_token_ttl() -> u64 {
        86_400
    }
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            jwt_secret: None,
            issuer: Self::default_issuer(),
            token_ttl_seconds: Self::default_token_ttl(),
        }
    }
}

// Hand-written so the secret never ends up in logs.
impl std::fmt::Debug for AuthConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthConfig")
            .field("jwt_secret", &self.jwt_secret.as_ref().map(|_| "<redacted>"))
            .field("issuer", &self.issuer)
            .field("token_ttl_seconds", &self.token_ttl_seconds)
            .finish()
    }
}

/// Allowed browser origins. An empty list allows any origin.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct CorsConfig {
    #[serde(default)]
    pub allowed_origins: Vec<String>,
}

/// Load the application configuration by combining defaults, files, and environment overrides.
///
/// ```
/// use taskdash_config::load;
///
/// std::env::remove_var("TASKDASH_CONFIG");
///
/// let config = load().expect("configuration should load with defaults");
/// assert!(!config.http.address.is_empty());
/// ```
pub fn load() -> anyhow::Result<AppConfig> {
    let defaults = AppConfig::default();

    let token_ttl = i64::try_from(defaults.auth.token_ttl_seconds).unwrap_or(i64::MAX);

    let mut builder = config::Config::builder()
        .set_default("http.address", defaults.http.address.clone())?
        .set_default("http.port", i64::from(defaults.http.port))?
        .set_default("database.backend", "sqlite")?
        .set_default("database.url", defaults.database.url.clone())?
        .set_default(
            "database.max_connections",
            i64::from(defaults.database.max_connections),
        )?
        .set_default(
            "database.connect_attempts",
            i64::from(defaults.database.connect_attempts),
        )?
        .set_default(
            "database.connect_retry_delay_ms",
            i64::try_from(defaults.database.connect_retry_delay_ms).unwrap_or(i64::MAX),
        )?
        .set_default("auth.issuer", defaults.auth.issuer.clone())?
        .set_default("auth.token_ttl_seconds", token_ttl)?;

    let mut config_file_attached = false;

    if let Ok(path) = std::env::var("TASKDASH_CONFIG") {
        builder = builder.add_source(config::File::from(PathBuf::from(&path)));
        config_file_attached = true;
        debug!(path, "loading configuration via TASKDASH_CONFIG");
    } else if let Ok(cwd) = std::env::current_dir() {
        let fallback = DEFAULT_CONFIG_FILES
            .iter()
            .map(|candidate| cwd.join(candidate))
            .find(|path| path.exists());

        if let Some(path) = fallback {
            debug!(path = %path.display(), "loading configuration file");
            builder = builder.add_source(config::File::from(path));
            config_file_attached = true;
        }
    }

    if !config_file_attached {
        debug!("no configuration file found, relying on defaults and environment overrides");
    }

    builder = builder.add_source(config::Environment::with_prefix("TASKDASH").separator("__"));

    let cfg = builder.build().context("unable to build configuration")?;

    let config = cfg
        .try_deserialize::<AppConfig>()
        .context("invalid configuration")?;

    debug!(?config, "loaded backend configuration");
    Ok(config)
}
