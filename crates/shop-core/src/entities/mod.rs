//! Domain entities - core business objects

mod refresh_token;
mod user;

pub use refresh_token::{NewRefreshToken, RefreshToken, RefreshTokenState};
pub use user::{TokenSubject, User, UserRole, UserStatus};
