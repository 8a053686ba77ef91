/// Configuration management for the API server
///
/// Configuration is read from environment variables (and a `.env` file if
/// present) into a type-safe struct.
///
/// # Environment Variables
///
/// - `API_HOST`: Host to bind to (default: 0.0.0.0)
/// - `API_PORT` or `PORT`: Port to bind to (default: 3000)
/// - `CORS_ORIGINS`: Comma-separated allowed origins (default: `*`)
/// - `PRODUCTION`: Enables HSTS (default: false)
/// - `STATIC_DIR`: Directory of front-end files to serve (default: none)
/// - `DATABASE_URL`: PostgreSQL connection string (default: none, in-memory stores)
/// - `DATABASE_MAX_CONNECTIONS`: Pool size (default: 10)
/// - `DATABASE_AUTO_CREATE`: Create the database on startup if missing (default: false)
/// - `SESSION_TTL_SECONDS`: Session lifetime (default: 28800, 8 hours, at most 365 days)
/// - `SESSION_COOKIE_SECURE`: Mark the session cookie `Secure` (default: false)
/// - `REQUIRE_LOGIN`: Reject requests without a session (default: true)
/// - `AUTO_REGISTER`: Create accounts on first login (default: true)
///
/// # Example
///
/// ```no_run
/// use todoboard_api::config::Config;
///
/// # fn example() -> anyhow::Result<()> {
/// let config = Config::from_env()?;
/// println!("Server will listen on {}", config.bind_address());
/// # Ok(())
/// # }
/// ```

use serde::{Deserialize, Serialize};
use std::{env, path::PathBuf, str::FromStr};
use todoboard_shared::{
    auth::session::{DEFAULT_SESSION_TTL_SECONDS, MAX_SESSION_TTL_SECONDS},
    db::pool::DatabaseConfig,
};

/// Complete application configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// API server configuration
    pub api: ApiConfig,

    /// Database settings; `None` selects the in-memory stores
    pub database: Option<DatabaseSettings>,

    /// Session and login behaviour
    pub session: SessionConfig,
}

/// API server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    /// Host to bind to
    pub host: String,

    /// Port to bind to
    pub port: u16,

    /// Allowed CORS origins; `*` means permissive
    pub cors_origins: Vec<String>,

    /// Production mode (enables HSTS)
    pub production: bool,

    /// Directory served for requests no route matches
    pub static_dir: Option<PathBuf>,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 3000,
            cors_origins: vec!["*".to_string()],
            production: false,
            static_dir: None,
        }
    }
}

/// Database settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseSettings {
    /// PostgreSQL connection URL
    pub url: String,

    /// Maximum number of connections in pool
    pub max_connections: u32,

    /// Create the database on startup when it does not exist
    ///
    /// Needs a role allowed to connect to the maintenance database and
    /// holding `CREATEDB`.
    pub auto_create: bool,
}

impl DatabaseSettings {
    /// Pool configuration for these settings
    pub fn pool_config(&self) -> DatabaseConfig {
        DatabaseConfig {
            url: self.url.clone(),
            max_connections: self.max_connections,
            ..Default::default()
        }
    }
}

/// Session configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionConfig {
    /// Session lifetime and cookie `Max-Age`, in seconds
    pub ttl_seconds: i64,

    /// Add the `Secure` attribute to the session cookie
    pub secure_cookie: bool,

    /// When false, requests without a session act as the single anonymous owner
    pub require_login: bool,

    /// Create an account when an unseen username logs in
    pub auto_register: bool,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            ttl_seconds: DEFAULT_SESSION_TTL_SECONDS,
            secure_cookie: false,
            require_login: true,
            auto_register: true,
        }
    }
}

impl Config {
    /// Loads configuration from environment variables
    ///
    /// # Errors
    ///
    /// Returns an error if a variable is set to a value that does not parse.
    pub fn from_env() -> anyhow::Result<Self> {
        // Load .env file if present (for development)
        dotenvy::dotenv().ok();

        let defaults = Config::default();

        let port = match env::var("API_PORT").or_else(|_| env::var("PORT")) {
            Ok(port) => port
                .parse::<u16>()
                .map_err(|e| anyhow::anyhow!("Invalid port {:?}: {}", port, e))?,
            Err(_) => defaults.api.port,
        };

        let cors_origins = match env::var("CORS_ORIGINS") {
            Ok(origins) => parse_list(&origins),
            Err(_) => defaults.api.cors_origins,
        };

        let database = match env::var("DATABASE_URL") {
            Ok(url) if !url.trim().is_empty() => Some(DatabaseSettings {
                url,
                max_connections: env_or("DATABASE_MAX_CONNECTIONS", 10)?,
                auto_create: env_flag("DATABASE_AUTO_CREATE", false)?,
            }),
            _ => None,
        };

        let ttl_seconds =
            check_session_ttl(env_or("SESSION_TTL_SECONDS", defaults.session.ttl_seconds)?)?;

        Ok(Self {
            api: ApiConfig {
                host: env::var("API_HOST").unwrap_or(defaults.api.host),
                port,
                cors_origins,
                production: env_flag("PRODUCTION", defaults.api.production)?,
                static_dir: env::var("STATIC_DIR").ok().map(PathBuf::from),
            },
            database,
            session: SessionConfig {
                ttl_seconds,
                secure_cookie: env_flag("SESSION_COOKIE_SECURE", defaults.session.secure_cookie)?,
                require_login: env_flag("REQUIRE_LOGIN", defaults.session.require_login)?,
                auto_register: env_flag("AUTO_REGISTER", defaults.session.auto_register)?,
            },
        })
    }

    /// Returns the server bind address
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.api.host, self.api.port)
    }
}

fn check_session_ttl(ttl_seconds: i64) -> anyhow::Result<i64> {
    if !(1..=MAX_SESSION_TTL_SECONDS).contains(&ttl_seconds) {
        anyhow::bail!(
            "SESSION_TTL_SECONDS must be between 1 and {}, got {}",
            MAX_SESSION_TTL_SECONDS,
            ttl_seconds
        );
    }
    Ok(ttl_seconds)
}

fn env_or<T>(key: &str, default: T) -> anyhow::Result<T>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match env::var(key) {
        Ok(value) => value
            .trim()
            .parse::<T>()
            .map_err(|e| anyhow::anyhow!("Invalid value for {}: {}", key, e)),
        Err(_) => Ok(default),
    }
}

fn env_flag(key: &str, default: bool) -> anyhow::Result<bool> {
    match env::var(key) {
        Ok(value) => parse_flag(&value)
            .ok_or_else(|| anyhow::anyhow!("Invalid boolean for {}: {:?}", key, value)),
        Err(_) => Ok(default),
    }
}

fn parse_flag(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

fn parse_list(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}
