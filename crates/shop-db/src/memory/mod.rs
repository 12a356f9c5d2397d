//! In-memory repositories
//!
//! Mutex-guarded maps with the same observable semantics as the PostgreSQL
//! repositories. Used by unit tests and single-process local runs.

mod refresh_token;
mod user;

pub use refresh_token::MemoryRefreshTokenRepository;
pub use user::MemoryUserRepository;
