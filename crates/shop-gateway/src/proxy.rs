//! Pass-through forwarding
//!
//! The request is classified against the policy table, the bearer token is
//! verified when the route needs one, gateway-owned headers are replaced and
//! the request goes to the owning backend unchanged otherwise. The upstream
//! status, headers and body are relayed as received.

use axum::{
    body::{to_bytes, Body},
    extract::{Request, State},
    http::{HeaderMap, HeaderName, HeaderValue},
    response::Response,
};
use axum_extra::headers::{authorization::Bearer, Authorization, HeaderMapExt};
use reqwest::RequestBuilder;
use shop_api::middleware::REQUEST_ID_HEADER;
use shop_api::{ApiError, ApiResult};
use shop_common::{AppError, GatewayIdentity, ServiceClient, INTERNAL_TOKEN_HEADER};
use tracing::{debug, warn};

use crate::policy::{classify, Access};
use crate::state::GatewayState;

/// Largest request body the gateway buffers
pub const MAX_BODY_BYTES: usize = 2 * 1024 * 1024;

/// Forward any request the policy table accepts
pub async fn forward(State(state): State<GatewayState>, request: Request) -> ApiResult<Response> {
    let (parts, body) = request.into_parts();
    let path = parts.uri.path();

    let route = match classify(&parts.method, path) {
        Some(route) if route.access != Access::Blocked => route,
        Some(_) => {
            debug!(path, "Blocked internal route");
            return Err(AppError::not_found("Route").into());
        }
        None => return Err(AppError::not_found("Route").into()),
    };

    let Some(client) = state.client(route.upstream) else {
        return Err(AppError::not_found("Route").into());
    };

    let identity = authenticate(&state, &parts.headers, route.access)?;

    let body = to_bytes(body, MAX_BODY_BYTES)
        .await
        .map_err(|_| ApiError::invalid_body("Request body too large"))?;

    let mut headers = forwarded_headers(&parts.headers);
    if let Some(identity) = &identity {
        inject_identity(&mut headers, identity)?;
    }

    let path_and_query = parts.uri.path_and_query().map_or(path, |pq| pq.as_str());
    let upstream = client
        .request(parts.method.clone(), path_and_query)
        .headers(headers)
        .body(body);

    let response = client.send(upstream).await?;
    relay(client, response).await
}

/// Resolve the identity a route requires
///
/// # Errors
/// `MissingAuth`/`InvalidToken`/`TokenExpired` for a bad bearer token,
/// `InsufficientPermissions` when an admin route sees another role
pub fn authenticate(
    state: &GatewayState,
    headers: &HeaderMap,
    access: Access,
) -> Result<Option<GatewayIdentity>, AppError> {
    if !access.needs_identity() {
        return Ok(None);
    }

    let bearer = headers
        .typed_get::<Authorization<Bearer>>()
        .ok_or(AppError::MissingAuth)?;
    let claims = state.validator().verify(bearer.token())?;
    let identity = GatewayIdentity(claims.subject());

    if access == Access::Admin && !identity.is_admin() {
        warn!(user_id = %identity.user_id(), "Admin route refused");
        return Err(AppError::InsufficientPermissions);
    }

    Ok(Some(identity))
}

/// Client headers minus hop-by-hop and gateway-owned ones
fn forwarded_headers(incoming: &HeaderMap) -> HeaderMap {
    let mut headers = HeaderMap::with_capacity(incoming.len());
    for (name, value) in incoming {
        if !is_hop_by_hop(name) && !is_gateway_owned(name) {
            headers.append(name.clone(), value.clone());
        }
    }
    headers
}

fn inject_identity(headers: &mut HeaderMap, identity: &GatewayIdentity) -> Result<(), AppError> {
    for (name, value) in identity.header_values() {
        let value = HeaderValue::from_str(&value).map_err(|_| AppError::InvalidToken)?;
        headers.insert(HeaderName::from_static(name), value);
    }
    Ok(())
}

/// Carry the request id over to a composed upstream call
pub fn with_request_id(builder: RequestBuilder, incoming: &HeaderMap) -> RequestBuilder {
    match incoming.get(REQUEST_ID_HEADER) {
        Some(id) => builder.header(REQUEST_ID_HEADER, id.clone()),
        None => builder,
    }
}

async fn relay(client: &ServiceClient, response: reqwest::Response) -> ApiResult<Response> {
    let status = response.status();
    let mut headers = HeaderMap::with_capacity(response.headers().len());
    for (name, value) in response.headers() {
        if !is_hop_by_hop(name) {
            headers.append(name.clone(), value.clone());
        }
    }

    let body = response.bytes().await.map_err(|e| {
        warn!(service = client.service(), error = %e, "Upstream body could not be read");
        AppError::unavailable(format!("{} returned an unreadable response", client.service()))
    })?;

    let mut relayed = Response::new(Body::from(body));
    *relayed.status_mut() = status;
    *relayed.headers_mut() = headers;
    Ok(relayed)
}

fn is_hop_by_hop(name: &HeaderName) -> bool {
    matches!(
        name.as_str(),
        "connection"
            | "keep-alive"
            | "proxy-connection"
            | "proxy-authorization"
            | "te"
            | "trailer"
            | "transfer-encoding"
            | "upgrade"
            | "host"
            | "content-length"
    )
}

fn is_gateway_owned(name: &HeaderName) -> bool {
    name.as_str() == INTERNAL_TOKEN_HEADER || GatewayIdentity::HEADERS.contains(&name.as_str())
}
