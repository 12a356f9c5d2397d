//! Gateway identity headers
//!
//! After verifying a bearer token the gateway forwards the caller's identity
//! as plain headers. Backends trust them without any signature check, so they
//! must only be reachable through the gateway.

use shop_core::{TokenSubject, UserId, UserRole};

use crate::error::AppError;

pub const USER_ID_HEADER: &str = "x-user-id";
pub const USER_EMAIL_HEADER: &str = "x-user-email";
pub const USER_ROLE_HEADER: &str = "x-user-role";

/// Caller identity as carried by `x-user-*` headers
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GatewayIdentity(pub TokenSubject);

impl GatewayIdentity {
    /// Every header name the gateway owns. Client-supplied copies are stripped.
    pub const HEADERS: [&'static str; 3] = [USER_ID_HEADER, USER_EMAIL_HEADER, USER_ROLE_HEADER];

    /// Parse the three raw header values
    ///
    /// # Errors
    /// `MissingAuth` if any header is absent, `InvalidToken` if a value does not parse
    pub fn from_header_values(
        id: Option<&str>,
        email: Option<&str>,
        role: Option<&str>,
    ) -> Result<Self, AppError> {
        let (Some(id), Some(email), Some(role)) = (id, email, role) else {
            return Err(AppError::MissingAuth);
        };

        let id = UserId::parse(id.trim()).map_err(|_| AppError::InvalidToken)?;
        let role: UserRole = role.parse().map_err(|_| AppError::InvalidToken)?;
        let email = email.trim();
        if email.is_empty() {
            return Err(AppError::MissingAuth);
        }

        Ok(Self(TokenSubject {
            id,
            email: email.to_string(),
            role,
        }))
    }

    /// Header name/value pairs to inject on a forwarded request
    #[must_use]
    pub fn header_values(&self) -> [(&'static str, String); 3] {
        [
            (USER_ID_HEADER, self.0.id.to_string()),
            (USER_EMAIL_HEADER, self.0.email.clone()),
            (USER_ROLE_HEADER, self.0.role.as_str().to_string()),
        ]
    }

    #[must_use]
    pub fn subject(&self) -> &TokenSubject {
        &self.0
    }

    #[must_use]
    pub fn user_id(&self) -> UserId {
        self.0.id
    }

    #[must_use]
    pub fn is_admin(&self) -> bool {
        self.0.role.is_admin()
    }
}

impl From<TokenSubject> for GatewayIdentity {
    fn from(subject: TokenSubject) -> Self {
        Self(subject)
    }
}
