//! Gateway middleware: rate limiting and CORS on top of the shared stack

use std::sync::Arc;
use std::time::Duration;

use axum::{
    http::{header, HeaderName, HeaderValue, Method},
    Router,
};
use shop_api::middleware::{apply_middleware, REQUEST_ID_HEADER};
use shop_common::{AppError, CorsConfig, RateLimitConfig};
use tower_governor::{
    governor::GovernorConfigBuilder, key_extractor::GlobalKeyExtractor, GovernorLayer,
};
use tower_http::cors::{AllowOrigin, Any, CorsLayer};

/// Apply the shared stack plus configured CORS and rate limiting
///
/// Request -> RateLimit -> RequestID -> Trace -> Timeout -> CORS -> Handler
///
/// # Errors
/// Returns an error if the rate limit values are rejected (zero rate or burst)
pub fn apply_gateway_middleware<S>(
    router: Router<S>,
    rate_limit: &RateLimitConfig,
    cors: &CorsConfig,
    is_production: bool,
    timeout: Duration,
) -> Result<Router<S>, AppError>
where
    S: Clone + Send + Sync + 'static,
{
    // Global key: one bucket shared by every caller
    let governor_conf = Arc::new(
        GovernorConfigBuilder::default()
            .per_second(rate_limit.requests_per_second.into())
            .burst_size(rate_limit.burst)
            .key_extractor(GlobalKeyExtractor)
            .finish()
            .ok_or_else(|| {
                AppError::Config(format!(
                    "Invalid rate limit: {} req/s, burst {}",
                    rate_limit.requests_per_second, rate_limit.burst
                ))
            })?,
    );

    let router = router.layer(create_cors_layer_from_config(cors, is_production));
    let router = apply_middleware(router, timeout);

    Ok(router.layer(GovernorLayer {
        config: governor_conf,
    }))
}

/// Create CORS layer from configuration
fn create_cors_layer_from_config(config: &CorsConfig, is_production: bool) -> CorsLayer {
    let request_id = HeaderName::from_static(REQUEST_ID_HEADER);
    let base_layer = CorsLayer::new()
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::PATCH,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([
            header::AUTHORIZATION,
            header::CONTENT_TYPE,
            header::ACCEPT,
            request_id.clone(),
        ])
        .expose_headers([
            request_id,
            HeaderName::from_static("x-ratelimit-limit"),
            HeaderName::from_static("x-ratelimit-remaining"),
            HeaderName::from_static("x-ratelimit-reset"),
        ]);

    // Development with no list configured allows any origin
    if !is_production && config.allowed_origins.is_empty() {
        tracing::warn!(
            "CORS: Allowing any origin (development mode). \
             Configure CORS_ALLOWED_ORIGINS for production."
        );
        return base_layer.allow_origin(Any);
    }

    if config.allowed_origins.is_empty() {
        tracing::warn!(
            "CORS: No allowed origins configured in production mode. \
             Requests from browsers will be blocked."
        );
    }

    let origins: Vec<HeaderValue> = config
        .allowed_origins
        .iter()
        .filter_map(|origin| {
            origin.parse::<HeaderValue>().ok().or_else(|| {
                tracing::warn!("Invalid CORS origin: {}", origin);
                None
            })
        })
        .collect();

    tracing::info!("CORS: Allowing {} configured origins", origins.len());
    base_layer.allow_origin(AllowOrigin::list(origins))
}
