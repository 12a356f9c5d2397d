//! # shop-common
//!
//! Shared utilities including configuration, error handling, token cryptography,
//! the internal trust gate, the JSON envelope, the outbound service client and telemetry.

pub mod auth;
pub mod client;
pub mod config;
pub mod envelope;
pub mod error;
pub mod telemetry;

// Re-export commonly used types at crate root
pub use auth::{
    compare_password, generate_opaque_token, hash_password, hash_token,
    validate_password_strength, AccessClaims, GatewayIdentity, InternalTrustGate, JwtService,
    PasswordService, SessionValidator, INTERNAL_TOKEN_HEADER, USER_EMAIL_HEADER, USER_ID_HEADER,
    USER_ROLE_HEADER,
};
pub use client::ServiceClient;
pub use config::{
    AppSettings, AuthServiceConfig, ConfigError, CorsConfig, DatabaseConfig, Environment,
    GatewayConfig, InternalConfig, JwtConfig, RateLimitConfig, ServerConfig, UpstreamConfig,
    UserServiceConfig,
};
pub use envelope::{Envelope, ErrorInfo};
pub use error::{AppError, AppResult};
pub use telemetry::{
    init_tracing, init_tracing_with_config, try_init_tracing, try_init_tracing_with_config,
    TracingConfig, TracingError,
};
