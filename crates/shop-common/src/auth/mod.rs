//! Authentication utilities

mod identity;
mod internal;
mod jwt;
mod opaque;
mod password;

pub use identity::{GatewayIdentity, USER_EMAIL_HEADER, USER_ID_HEADER, USER_ROLE_HEADER};
pub use internal::{InternalTrustGate, INTERNAL_TOKEN_HEADER};
pub use jwt::{AccessClaims, JwtService, SessionValidator};
pub use opaque::{generate_opaque_token, hash_token, OPAQUE_TOKEN_BYTES};
pub use password::{compare_password, hash_password, validate_password_strength, PasswordService};
