//! # shop-gateway
//!
//! The single public entry point. Requests are classified by the route
//! policy table, bearer tokens are verified here and only here, and the
//! caller's identity travels to the backends as `x-user-*` headers.
//! Backends must not be reachable except through the gateway.

pub mod handlers;
pub mod middleware;
pub mod policy;
pub mod proxy;
pub mod server;
pub mod state;

pub use policy::{classify, Access, Route, Upstream};
pub use server::{create_app, create_app_with_config, create_router, run};
pub use state::GatewayState;
