//! Database models with SQLx `FromRow` derives

mod refresh_token;
mod user;

pub use refresh_token::RefreshTokenModel;
pub use user::UserModel;
