//! Gateway server setup

use axum::{
    routing::{get, post},
    Router,
};
use shop_api::handlers::health;
use shop_api::middleware::{apply_middleware, DEFAULT_REQUEST_TIMEOUT};
use shop_common::{AppError, GatewayConfig};
use tracing::info;

use crate::handlers;
use crate::middleware::apply_gateway_middleware;
use crate::proxy;
use crate::state::GatewayState;

/// Create the gateway router
///
/// Composed routes are matched first; every other path goes through the
/// policy table in the fallback.
pub fn create_router() -> Router<GatewayState> {
    Router::new()
        .route("/health", get(|| health::health_check("gateway")))
        .route("/v1/users/login", post(handlers::login))
        .route("/v1/users/logout", post(handlers::logout))
        .fallback(proxy::forward)
}

/// Router with the shared middleware stack, without CORS or rate limiting
pub fn create_app(state: GatewayState) -> Router {
    apply_middleware(create_router(), DEFAULT_REQUEST_TIMEOUT).with_state(state)
}

/// Complete application as served in production
///
/// # Errors
/// Returns an error for an unusable rate limit configuration
pub fn create_app_with_config(
    state: GatewayState,
    config: &GatewayConfig,
) -> Result<Router, AppError> {
    let router = apply_gateway_middleware(
        create_router(),
        &config.rate_limit,
        &config.cors,
        config.app.env.is_production(),
        DEFAULT_REQUEST_TIMEOUT,
    )?;
    Ok(router.with_state(state))
}

/// Run the gateway with configuration
pub async fn run(config: GatewayConfig) -> Result<(), AppError> {
    let state = GatewayState::from_config(&config)?;
    info!(
        users = %config.upstream.user_service_url,
        auth = %config.upstream.auth_service_url,
        products = config.upstream.product_service_url.as_deref().unwrap_or("disabled"),
        "Upstreams configured"
    );

    let app = create_app_with_config(state, &config)?;
    shop_api::server::run_server(app, &config.server.address()).await
}
