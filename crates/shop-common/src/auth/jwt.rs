//! Access token signing and verification
//!
//! Access tokens are stateless HS256 JWTs carrying the user's id, email and
//! role. Nothing is persisted: a token stays valid until `exp` regardless of
//! logout.

use chrono::{Duration, Utc};
use jsonwebtoken::{
    decode, encode, errors::ErrorKind, DecodingKey, EncodingKey, Header, Validation,
};
use serde::{Deserialize, Serialize};
use shop_core::{TokenSubject, UserId, UserRole};

use crate::error::AppError;

/// JWT claims structure
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccessClaims {
    /// User ID
    pub id: UserId,
    pub email: String,
    pub role: UserRole,
    /// Issued at (Unix timestamp)
    pub iat: i64,
    /// Expiration time (Unix timestamp)
    pub exp: i64,
}

impl AccessClaims {
    /// Identity carried by these claims
    #[must_use]
    pub fn subject(&self) -> TokenSubject {
        TokenSubject {
            id: self.id,
            email: self.email.clone(),
            role: self.role,
        }
    }

    /// Check if the token is expired
    #[must_use]
    pub fn is_expired(&self) -> bool {
        Utc::now().timestamp() >= self.exp
    }
}

/// Stateless verifier for access tokens.
///
/// Holds only the decoding key; it performs no I/O and can be shared by the
/// gateway and the auth-service alike.
#[derive(Clone)]
pub struct SessionValidator {
    decoding_key: DecodingKey,
    validation: Validation,
}

impl SessionValidator {
    #[must_use]
    pub fn new(secret: &str) -> Self {
        let mut validation = Validation::default();
        validation.leeway = 0;
        validation.set_required_spec_claims(&["exp", "iat"]);

        Self {
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            validation,
        }
    }

    /// Decode and validate an access token
    ///
    /// # Errors
    /// `TokenExpired` once `exp` has passed, `InvalidToken` for anything else
    /// (bad signature, malformed, missing claims)
    pub fn verify(&self, token: &str) -> Result<AccessClaims, AppError> {
        decode::<AccessClaims>(token, &self.decoding_key, &self.validation)
            .map(|data| data.claims)
            .map_err(|e| match e.kind() {
                ErrorKind::ExpiredSignature => AppError::TokenExpired,
                _ => AppError::InvalidToken,
            })
    }
}

impl std::fmt::Debug for SessionValidator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionValidator").finish_non_exhaustive()
    }
}

/// Signs access tokens for the token issuer
#[derive(Clone)]
pub struct JwtService {
    encoding_key: EncodingKey,
    validator: SessionValidator,
    access_token_ttl: i64,
}

impl JwtService {
    /// Create a new JWT service with the given secret and access-token lifetime in seconds
    #[must_use]
    pub fn new(secret: &str, access_token_ttl: i64) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            validator: SessionValidator::new(secret),
            access_token_ttl,
        }
    }

    /// Lifetime of issued access tokens in seconds
    #[must_use]
    pub fn access_token_ttl(&self) -> i64 {
        self.access_token_ttl
    }

    /// Sign an access token for `subject`
    ///
    /// # Errors
    /// Returns an error if token encoding fails
    pub fn issue_access_token(&self, subject: &TokenSubject) -> Result<String, AppError> {
        let now = Utc::now();
        let claims = AccessClaims {
            id: subject.id,
            email: subject.email.clone(),
            role: subject.role,
            iat: now.timestamp(),
            exp: (now + Duration::seconds(self.access_token_ttl)).timestamp(),
        };

        self.sign(&claims)
    }

    /// Sign arbitrary claims with this service's key
    ///
    /// # Errors
    /// Returns an error if token encoding fails
    pub fn sign(&self, claims: &AccessClaims) -> Result<String, AppError> {
        encode(&Header::default(), claims, &self.encoding_key)
            .map_err(|e| AppError::Internal(anyhow::anyhow!("Failed to encode JWT: {e}")))
    }

    /// Verify a token signed with the same secret
    ///
    /// # Errors
    /// See [`SessionValidator::verify`]
    pub fn verify(&self, token: &str) -> Result<AccessClaims, AppError> {
        self.validator.verify(token)
    }

    /// The verifier sharing this service's secret
    #[must_use]
    pub fn validator(&self) -> &SessionValidator {
        &self.validator
    }
}

impl std::fmt::Debug for JwtService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JwtService")
            .field("access_token_ttl", &self.access_token_ttl)
            .finish_non_exhaustive()
    }
}
