//! Application configuration structs
//!
//! Each binary loads its own config from environment variables; a `.env`
//! file is honoured when present. Loaders take a lookup function so they can
//! be exercised without touching the process environment.

use serde::Deserialize;
use std::env;
use std::str::FromStr;
use std::time::Duration;

/// General application settings
#[derive(Debug, Clone, Deserialize)]
pub struct AppSettings {
    pub name: String,
    pub env: Environment,
}

/// Environment type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    #[default]
    Development,
    Staging,
    Production,
}

impl Environment {
    #[must_use]
    pub fn is_production(&self) -> bool {
        matches!(self, Self::Production)
    }

    #[must_use]
    pub fn is_development(&self) -> bool {
        matches!(self, Self::Development)
    }

    fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "production" => Some(Self::Production),
            "staging" => Some(Self::Staging),
            "development" => Some(Self::Development),
            _ => None,
        }
    }
}

/// Listen address of one service
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl ServerConfig {
    #[must_use]
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// Database configuration
#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
    pub min_connections: u32,
    pub run_migrations: bool,
}

/// Access/refresh token lifetimes and the signing secret
#[derive(Clone, Deserialize)]
pub struct JwtConfig {
    pub secret: String,
    /// Seconds
    pub access_token_ttl: i64,
    /// Seconds
    pub refresh_token_ttl: i64,
}

impl std::fmt::Debug for JwtConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JwtConfig")
            .field("access_token_ttl", &self.access_token_ttl)
            .field("refresh_token_ttl", &self.refresh_token_ttl)
            .finish_non_exhaustive()
    }
}

/// Shared secret for service-to-service calls
#[derive(Clone, Deserialize)]
pub struct InternalConfig {
    pub token: String,
}

impl std::fmt::Debug for InternalConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InternalConfig").finish_non_exhaustive()
    }
}

/// Base URLs of the services the gateway forwards to
#[derive(Debug, Clone, Deserialize)]
pub struct UpstreamConfig {
    pub user_service_url: String,
    pub auth_service_url: String,
    pub product_service_url: Option<String>,
    pub timeout_secs: u64,
}

impl UpstreamConfig {
    #[must_use]
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

/// Rate limiting configuration
#[derive(Debug, Clone, Deserialize)]
pub struct RateLimitConfig {
    pub requests_per_second: u32,
    pub burst: u32,
}

/// CORS configuration
#[derive(Debug, Clone, Deserialize)]
pub struct CorsConfig {
    pub allowed_origins: Vec<String>,
}

/// auth-service configuration
#[derive(Debug, Clone)]
pub struct AuthServiceConfig {
    pub app: AppSettings,
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub jwt: JwtConfig,
    pub internal: InternalConfig,
    /// Used to re-read users during refresh
    pub user_service_url: String,
    pub upstream_timeout_secs: u64,
    /// 0 disables the periodic purge
    pub purge_interval_secs: u64,
}

/// user-service configuration
#[derive(Debug, Clone)]
pub struct UserServiceConfig {
    pub app: AppSettings,
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub internal: InternalConfig,
    /// Seconds a password-reset token stays usable
    pub password_reset_ttl: i64,
}

/// Gateway configuration
#[derive(Debug, Clone)]
pub struct GatewayConfig {
    pub app: AppSettings,
    pub server: ServerConfig,
    pub jwt_secret: String,
    pub internal: InternalConfig,
    pub upstream: UpstreamConfig,
    pub rate_limit: RateLimitConfig,
    pub cors: CorsConfig,
}

// Default values
const DEFAULT_HOST: &str = "127.0.0.1";
const DEFAULT_MAX_CONNECTIONS: u32 = 20;
const DEFAULT_MIN_CONNECTIONS: u32 = 5;
const DEFAULT_ACCESS_TOKEN_TTL: i64 = 900; // 15 minutes
const DEFAULT_REFRESH_TOKEN_TTL: i64 = 604_800; // 7 days
const DEFAULT_PASSWORD_RESET_TTL: i64 = 3600;
const DEFAULT_UPSTREAM_TIMEOUT: u64 = 10;
const DEFAULT_REQUESTS_PER_SECOND: u32 = 10;
const DEFAULT_BURST: u32 = 50;

/// Variable lookup used by all loaders
struct Vars<F> {
    lookup: F,
}

impl<F> Vars<F>
where
    F: Fn(&str) -> Option<String>,
{
    fn get(&self, key: &str) -> Option<String> {
        (self.lookup)(key).filter(|v| !v.trim().is_empty())
    }

    fn required(&self, key: &'static str) -> Result<String, ConfigError> {
        self.get(key).ok_or(ConfigError::MissingVar(key))
    }

    fn or(&self, key: &str, default: &str) -> String {
        self.get(key).unwrap_or_else(|| default.to_string())
    }

    fn parsed<T: FromStr>(&self, key: &'static str) -> Result<Option<T>, ConfigError> {
        self.get(key)
            .map(|raw| {
                raw.trim()
                    .parse()
                    .map_err(|_| ConfigError::InvalidValue(key, raw.clone()))
            })
            .transpose()
    }

    fn parsed_or<T: FromStr>(&self, key: &'static str, default: T) -> Result<T, ConfigError> {
        Ok(self.parsed(key)?.unwrap_or(default))
    }

    fn app(&self, default_name: &str) -> AppSettings {
        AppSettings {
            name: self.or("APP_NAME", default_name),
            env: self
                .get("APP_ENV")
                .and_then(|s| Environment::parse(&s))
                .unwrap_or_default(),
        }
    }

    fn server(
        &self,
        host_key: &'static str,
        port_key: &'static str,
    ) -> Result<ServerConfig, ConfigError> {
        Ok(ServerConfig {
            host: self.or(host_key, DEFAULT_HOST),
            port: self.parsed(port_key)?.ok_or(ConfigError::MissingVar(port_key))?,
        })
    }

    fn database(&self, url_key: &'static str) -> Result<DatabaseConfig, ConfigError> {
        let url = self
            .get(url_key)
            .or_else(|| self.get("DATABASE_URL"))
            .ok_or(ConfigError::MissingVar(url_key))?;

        Ok(DatabaseConfig {
            url,
            max_connections: self.parsed_or("DATABASE_MAX_CONNECTIONS", DEFAULT_MAX_CONNECTIONS)?,
            min_connections: self.parsed_or("DATABASE_MIN_CONNECTIONS", DEFAULT_MIN_CONNECTIONS)?,
            run_migrations: self.parsed_or("DATABASE_RUN_MIGRATIONS", true)?,
        })
    }

    fn internal(&self) -> Result<InternalConfig, ConfigError> {
        Ok(InternalConfig {
            token: self.required("INTERNAL_SERVICE_TOKEN")?,
        })
    }
}

fn process_env(key: &str) -> Option<String> {
    env::var(key).ok()
}

fn load_dotenv() {
    // Load .env file if present (ignore errors if not found)
    let _ = dotenvy::dotenv();
}

impl AuthServiceConfig {
    /// Load configuration from environment variables
    ///
    /// # Errors
    /// Returns an error if required environment variables are missing or malformed
    pub fn from_env() -> Result<Self, ConfigError> {
        load_dotenv();
        Self::from_lookup(process_env)
    }

    /// Load configuration from an arbitrary variable source
    ///
    /// # Errors
    /// Returns an error if required variables are missing or malformed
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let vars = Vars { lookup };

        Ok(Self {
            app: vars.app("auth-service"),
            server: vars.server("AUTH_SERVICE_HOST", "AUTH_SERVICE_PORT")?,
            database: vars.database("AUTH_DATABASE_URL")?,
            jwt: JwtConfig {
                secret: vars.required("JWT_SECRET")?,
                access_token_ttl: vars.parsed_or("ACCESS_TOKEN_TTL", DEFAULT_ACCESS_TOKEN_TTL)?,
                refresh_token_ttl: vars.parsed_or("REFRESH_TOKEN_TTL", DEFAULT_REFRESH_TOKEN_TTL)?,
            },
            internal: vars.internal()?,
            user_service_url: vars.required("USER_SERVICE_URL")?,
            upstream_timeout_secs: vars.parsed_or("UPSTREAM_TIMEOUT", DEFAULT_UPSTREAM_TIMEOUT)?,
            purge_interval_secs: vars.parsed_or("REFRESH_TOKEN_PURGE_INTERVAL", 0)?,
        })
    }
}

impl UserServiceConfig {
    /// Load configuration from environment variables
    ///
    /// # Errors
    /// Returns an error if required environment variables are missing or malformed
    pub fn from_env() -> Result<Self, ConfigError> {
        load_dotenv();
        Self::from_lookup(process_env)
    }

    /// Load configuration from an arbitrary variable source
    ///
    /// # Errors
    /// Returns an error if required variables are missing or malformed
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let vars = Vars { lookup };

        Ok(Self {
            app: vars.app("user-service"),
            server: vars.server("USER_SERVICE_HOST", "USER_SERVICE_PORT")?,
            database: vars.database("USER_DATABASE_URL")?,
            internal: vars.internal()?,
            password_reset_ttl: vars.parsed_or("PASSWORD_RESET_TTL", DEFAULT_PASSWORD_RESET_TTL)?,
        })
    }
}

impl GatewayConfig {
    /// Load configuration from environment variables
    ///
    /// # Errors
    /// Returns an error if required environment variables are missing or malformed
    pub fn from_env() -> Result<Self, ConfigError> {
        load_dotenv();
        Self::from_lookup(process_env)
    }

    /// Load configuration from an arbitrary variable source
    ///
    /// # Errors
    /// Returns an error if required variables are missing or malformed
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let vars = Vars { lookup };

        Ok(Self {
            app: vars.app("gateway"),
            server: vars.server("GATEWAY_HOST", "GATEWAY_PORT")?,
            jwt_secret: vars.required("JWT_SECRET")?,
            internal: vars.internal()?,
            upstream: UpstreamConfig {
                user_service_url: vars.required("USER_SERVICE_URL")?,
                auth_service_url: vars.required("AUTH_SERVICE_URL")?,
                product_service_url: vars.get("PRODUCT_SERVICE_URL"),
                timeout_secs: vars.parsed_or("UPSTREAM_TIMEOUT", DEFAULT_UPSTREAM_TIMEOUT)?,
            },
            rate_limit: RateLimitConfig {
                requests_per_second: vars
                    .parsed_or("RATE_LIMIT_REQUESTS_PER_SECOND", DEFAULT_REQUESTS_PER_SECOND)?,
                burst: vars.parsed_or("RATE_LIMIT_BURST", DEFAULT_BURST)?,
            },
            cors: CorsConfig {
                allowed_origins: vars
                    .get("CORS_ALLOWED_ORIGINS")
                    .map(|s| s.split(',').map(str::trim).map(String::from).collect())
                    .unwrap_or_default(),
            },
        })
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    MissingVar(&'static str),

    #[error("Invalid value for {0}: {1}")]
    InvalidValue(&'static str, String),
}
