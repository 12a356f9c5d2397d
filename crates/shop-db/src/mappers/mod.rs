//! Entity <-> model mappers

mod refresh_token;
mod user;
