//! Health check handler

use shop_service::dto::HealthResponse;

use crate::response::ApiSuccess;

/// Liveness probe
///
/// GET /health
pub async fn health_check(service: &'static str) -> ApiSuccess<HealthResponse> {
    ApiSuccess::ok("Service is healthy", HealthResponse::healthy(service))
}
