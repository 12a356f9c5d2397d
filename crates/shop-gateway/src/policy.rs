//! Route policy table
//!
//! Every request the gateway accepts is classified before it is forwarded:
//! which backend owns the path and what the caller must prove. Paths the
//! table does not know, and internal routes, answer 404.

use axum::http::Method;

/// What the caller must present
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Access {
    /// Forwarded as is
    Public,
    /// Valid bearer token; identity headers are injected
    Protected,
    /// Valid bearer token whose role is admin
    Admin,
    /// Never reachable through the gateway
    Blocked,
}

impl Access {
    pub fn needs_identity(self) -> bool {
        matches!(self, Self::Protected | Self::Admin)
    }
}

/// Backend owning a path prefix
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Upstream {
    Auth,
    Users,
    Products,
}

impl Upstream {
    const PREFIXES: [(&'static str, Upstream); 3] = [
        ("/v1/auth", Upstream::Auth),
        ("/v1/users", Upstream::Users),
        ("/v1/products", Upstream::Products),
    ];

    /// Backend for `path`, `None` when no prefix matches
    pub fn for_path(path: &str) -> Option<Self> {
        Self::PREFIXES
            .iter()
            .find(|(prefix, _)| rest_of(path, prefix).is_some())
            .map(|(_, upstream)| *upstream)
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::Auth => "auth-service",
            Self::Users => "user-service",
            Self::Products => "product-service",
        }
    }
}

/// A classified request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Route {
    pub upstream: Upstream,
    pub access: Access,
}

/// Classify `method path`, `None` for unknown paths
pub fn classify(method: &Method, path: &str) -> Option<Route> {
    let upstream = Upstream::for_path(path)?;

    let access = if is_internal(path) {
        Access::Blocked
    } else {
        match upstream {
            Upstream::Auth => auth_access(rest_of(path, "/v1/auth").unwrap_or_default()),
            Upstream::Users => user_access(rest_of(path, "/v1/users").unwrap_or_default()),
            Upstream::Products => product_access(method),
        }
    };

    Some(Route { upstream, access })
}

fn auth_access(rest: &str) -> Access {
    match rest {
        "/create-tokens" => Access::Blocked,
        "/verify-token" | "/refresh-token" | "/revoke-token" => Access::Public,
        _ => Access::Protected,
    }
}

fn user_access(rest: &str) -> Access {
    match rest {
        "/register" | "/login" | "/forgot-password" | "/reset-password" => Access::Public,
        _ if rest_of(rest, "/admin").is_some() => Access::Admin,
        _ => Access::Protected,
    }
}

fn product_access(method: &Method) -> Access {
    if *method == Method::GET || *method == Method::HEAD {
        Access::Public
    } else {
        Access::Admin
    }
}

fn is_internal(path: &str) -> bool {
    path.split('/').any(|segment| segment == "internal")
}

/// Remainder of `path` after `prefix`, only on a segment boundary
fn rest_of<'a>(path: &'a str, prefix: &str) -> Option<&'a str> {
    let rest = path.strip_prefix(prefix)?;
    (rest.is_empty() || rest.starts_with('/')).then_some(rest)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn access(method: Method, path: &str) -> Option<Access> {
        classify(&method, path).map(|route| route.access)
    }

    #[test]
    fn test_public_allow_list() {
        for path in [
            "/v1/auth/verify-token",
            "/v1/auth/refresh-token",
            "/v1/auth/revoke-token",
            "/v1/users/register",
            "/v1/users/login",
            "/v1/users/forgot-password",
            "/v1/users/reset-password",
        ] {
            assert_eq!(access(Method::POST, path), Some(Access::Public), "{path}");
        }
    }

    #[test]
    fn test_everything_else_needs_a_token() {
        assert_eq!(access(Method::GET, "/v1/users/profile"), Some(Access::Protected));
        assert_eq!(access(Method::POST, "/v1/users/logout"), Some(Access::Protected));
        assert_eq!(access(Method::POST, "/v1/auth/revoke-all"), Some(Access::Protected));
        assert_eq!(access(Method::GET, "/v1/auth/sessions"), Some(Access::Protected));
    }

    #[test]
    fn test_admin_routes() {
        assert_eq!(access(Method::GET, "/v1/users/admin"), Some(Access::Admin));
        assert_eq!(
            access(Method::DELETE, "/v1/users/admin/abc/permanent"),
            Some(Access::Admin)
        );
        // Prefix match is segment-aware
        assert_eq!(
            access(Method::GET, "/v1/users/administrators"),
            Some(Access::Protected)
        );
    }

    #[test]
    fn test_internal_routes_are_blocked() {
        assert_eq!(access(Method::POST, "/v1/auth/create-tokens"), Some(Access::Blocked));
        assert_eq!(
            access(Method::POST, "/v1/auth/internal/purge-expired"),
            Some(Access::Blocked)
        );
        assert_eq!(
            access(Method::GET, "/v1/users/internal/123"),
            Some(Access::Blocked)
        );
    }

    #[test]
    fn test_products_reads_public_writes_admin() {
        assert_eq!(access(Method::GET, "/v1/products"), Some(Access::Public));
        assert_eq!(access(Method::GET, "/v1/products/42"), Some(Access::Public));
        assert_eq!(access(Method::POST, "/v1/products"), Some(Access::Admin));
        assert_eq!(access(Method::DELETE, "/v1/products/42"), Some(Access::Admin));
    }

    #[test]
    fn test_unknown_prefixes() {
        assert_eq!(classify(&Method::GET, "/v1/orders"), None);
        assert_eq!(classify(&Method::GET, "/v1/authx/verify-token"), None);
        assert_eq!(classify(&Method::GET, "/"), None);
    }

    #[test]
    fn test_upstream_selection() {
        assert_eq!(Upstream::for_path("/v1/auth/sessions"), Some(Upstream::Auth));
        assert_eq!(Upstream::for_path("/v1/users"), Some(Upstream::Users));
        assert_eq!(Upstream::Products.name(), "product-service");
    }
}
