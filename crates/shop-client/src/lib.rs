//! # shop-client
//!
//! Storefront-side SDK for the gateway. It stores the token pair of the
//! signed-in user and coordinates token refresh so that a burst of 401s
//! produces a single refresh call.

pub mod client;
pub mod error;
pub mod session;

pub use client::StorefrontClient;
pub use error::{ClientError, ClientResult};
pub use session::{SessionManager, TokenPair, TokenRefresher};
