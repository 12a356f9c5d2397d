//! Server setup and initialization
//!
//! Builds each service's state from its config, wires the router and
//! middleware, and runs it until Ctrl-C.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use axum::Router;
use shop_common::{
    AppError, AuthServiceConfig, DatabaseConfig, InternalTrustGate, JwtService, PasswordService,
    ServiceClient, UserServiceConfig,
};
use shop_db::{
    create_pool, run_migrations, MigrationSet, PgPool, PgRefreshTokenRepository, PgUserRepository,
};
use shop_service::{AuthContext, AuthContextBuilder, TokenService, UserContextBuilder};
use tokio::net::TcpListener;
use tokio::task::JoinHandle;
use tracing::{error, info};

use crate::directory::HttpUserDirectory;
use crate::middleware::{apply_middleware, DEFAULT_REQUEST_TIMEOUT};
use crate::routes::{auth_router, user_router};
use crate::state::{AuthState, UserState};

/// Build the auth-service application with all routes and middleware
pub fn create_auth_app(state: AuthState) -> Router {
    apply_middleware(auth_router(), DEFAULT_REQUEST_TIMEOUT).with_state(state)
}

/// Build the user-service application with all routes and middleware
pub fn create_user_app(state: UserState) -> Router {
    apply_middleware(user_router(), DEFAULT_REQUEST_TIMEOUT).with_state(state)
}

/// Connect to PostgreSQL and apply the service's migrations
async fn connect(config: &DatabaseConfig, set: MigrationSet) -> Result<PgPool, AppError> {
    info!("Connecting to PostgreSQL...");
    let pool = create_pool(config)
        .await
        .map_err(|e| AppError::Database(e.to_string()))?;
    info!("PostgreSQL connection established");

    if config.run_migrations {
        run_migrations(&pool, set)
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
    }

    Ok(pool)
}

/// Initialize the auth-service dependencies
pub async fn create_auth_state(config: &AuthServiceConfig) -> Result<AuthState, AppError> {
    let pool = connect(&config.database, MigrationSet::Auth).await?;

    let user_service = ServiceClient::new(
        "user-service",
        &config.user_service_url,
        Duration::from_secs(config.upstream_timeout_secs),
    )?
    .with_internal_token(&config.internal.token);

    let context = AuthContextBuilder::new()
        .refresh_repo(Arc::new(PgRefreshTokenRepository::new(pool)))
        .directory(Arc::new(HttpUserDirectory::new(user_service)))
        .jwt_service(Arc::new(JwtService::new(
            &config.jwt.secret,
            config.jwt.access_token_ttl,
        )))
        .refresh_token_ttl(config.jwt.refresh_token_ttl)
        .build()
        .map_err(|e| AppError::Config(e.to_string()))?;

    Ok(AuthState::new(
        context,
        InternalTrustGate::new(config.internal.token.as_str()),
    ))
}

/// Initialize the user-service dependencies
pub async fn create_user_state(config: &UserServiceConfig) -> Result<UserState, AppError> {
    let pool = connect(&config.database, MigrationSet::Users).await?;

    let context = UserContextBuilder::new()
        .user_repo(Arc::new(PgUserRepository::new(pool)))
        .password_service(PasswordService::new())
        .password_reset_ttl(config.password_reset_ttl)
        .build()
        .map_err(|e| AppError::Config(e.to_string()))?;

    Ok(UserState::new(
        context,
        InternalTrustGate::new(config.internal.token.as_str()),
    ))
}

/// Periodically delete expired refresh tokens
pub fn spawn_purge_task(context: Arc<AuthContext>, every: Duration) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(every);
        // the first tick completes immediately
        ticker.tick().await;

        loop {
            ticker.tick().await;
            if let Err(e) = TokenService::new(&context).purge_expired().await {
                error!(error = %e, "Refresh token purge failed");
            }
        }
    })
}

/// Resolve on Ctrl-C
pub async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!(error = %e, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}

/// Run an HTTP server until shutdown
pub async fn run_server(app: Router, addr: &str) -> Result<(), AppError> {
    let addr: SocketAddr = addr
        .parse()
        .map_err(|e| AppError::Config(format!("Invalid listen address {addr}: {e}")))?;

    let listener = TcpListener::bind(addr)
        .await
        .map_err(|e| AppError::Config(format!("Failed to bind to {addr}: {e}")))?;

    info!("Server listening on http://{}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|e| AppError::Config(format!("Server error: {e}")))?;

    Ok(())
}

/// Run the auth-service with configuration
pub async fn run_auth_service(config: AuthServiceConfig) -> Result<(), AppError> {
    let state = create_auth_state(&config).await?;

    let purge = (config.purge_interval_secs > 0).then(|| {
        info!(every_secs = config.purge_interval_secs, "Refresh token purge enabled");
        spawn_purge_task(
            state.shared_context(),
            Duration::from_secs(config.purge_interval_secs),
        )
    });

    let result = run_server(create_auth_app(state), &config.server.address()).await;

    if let Some(handle) = purge {
        handle.abort();
    }
    result
}

/// Run the user-service with configuration
pub async fn run_user_service(config: UserServiceConfig) -> Result<(), AppError> {
    let state = create_user_state(&config).await?;
    run_server(create_user_app(state), &config.server.address()).await
}
