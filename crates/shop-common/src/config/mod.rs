//! Configuration management

mod app_config;

pub use app_config::{
    AppSettings, AuthServiceConfig, ConfigError, CorsConfig, DatabaseConfig, Environment,
    GatewayConfig, InternalConfig, JwtConfig, RateLimitConfig, ServerConfig, UpstreamConfig,
    UserServiceConfig,
};
