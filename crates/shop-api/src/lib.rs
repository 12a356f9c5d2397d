//! # shop-api
//!
//! HTTP surfaces of the auth-service (token issuer) and the user-service
//! (credential store), built with Axum, plus the extractors, envelope
//! responses and middleware both share with the gateway.

pub mod directory;
pub mod extractors;
pub mod handlers;
pub mod middleware;
pub mod response;
pub mod routes;
pub mod server;
pub mod state;

pub use directory::HttpUserDirectory;
pub use response::{ApiError, ApiResult, ApiSuccess};
pub use state::{AuthState, UserState};
