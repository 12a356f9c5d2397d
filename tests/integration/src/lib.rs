//! Integration test utilities for the storefront services
//!
//! This crate starts the user-service, the auth-service and the gateway
//! against a real PostgreSQL database and drives them over HTTP.

pub mod fixtures;
pub mod helpers;

pub use fixtures::*;
pub use helpers::*;
