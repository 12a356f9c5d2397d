//! Delivery of password reset tokens

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use shop_core::User;
use tracing::info;

use super::error::ServiceResult;

/// Delivers a freshly issued password reset token to its owner.
///
/// The raw token only exists for the duration of this call; the store keeps
/// its digest.
#[async_trait]
pub trait ResetTokenNotifier: Send + Sync {
    async fn send_reset_token(
        &self,
        user: &User,
        token: &str,
        expires_at: DateTime<Utc>,
    ) -> ServiceResult<()>;
}

/// Writes reset tokens to the log. Development only.
#[derive(Debug, Clone, Copy, Default)]
pub struct LoggingResetNotifier;

#[async_trait]
impl ResetTokenNotifier for LoggingResetNotifier {
    async fn send_reset_token(
        &self,
        user: &User,
        token: &str,
        expires_at: DateTime<Utc>,
    ) -> ServiceResult<()> {
        info!(
            user_id = %user.id,
            email = %user.email,
            reset_token = %token,
            expires_at = %expires_at,
            "Password reset token issued"
        );
        Ok(())
    }
}
