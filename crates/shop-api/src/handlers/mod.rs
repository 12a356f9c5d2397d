//! HTTP handlers, one module per route group

pub mod admin;
pub mod auth;
pub mod health;
pub mod users;
