//! Axum extractors for request handling
//!
//! Custom extractors for the three trust models (bearer token, gateway
//! identity headers, internal shared secret), validation and pagination.

mod auth;
mod identity;
mod internal;
mod pagination;
mod path;
mod validated;

pub use auth::AuthUser;
pub use identity::{AdminUser, IdentityUser};
pub use internal::InternalCaller;
pub use pagination::Pagination;
pub use path::UserIdPath;
pub use validated::{OptionalValidatedJson, ValidatedJson};
