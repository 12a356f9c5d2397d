//! Internal trust gate
//!
//! Service-to-service endpoints are guarded by one static shared secret sent
//! in the `x-internal-token` header. Any holder of the secret can act as any
//! internal caller.

use std::sync::Arc;

use crate::error::AppError;

/// Header carrying the shared internal secret
pub const INTERNAL_TOKEN_HEADER: &str = "x-internal-token";

/// Checks the shared secret presented by internal callers
#[derive(Clone)]
pub struct InternalTrustGate {
    secret: Arc<str>,
}

impl InternalTrustGate {
    #[must_use]
    pub fn new(secret: impl Into<Arc<str>>) -> Self {
        Self {
            secret: secret.into(),
        }
    }

    /// Check a presented header value. Fails closed.
    ///
    /// # Errors
    /// `MissingInternalToken` when absent or empty, `InvalidInternalToken`
    /// when it does not match
    pub fn check(&self, presented: Option<&str>) -> Result<(), AppError> {
        match presented.map(str::trim) {
            None | Some("") => Err(AppError::MissingInternalToken),
            Some(value) if constant_time_eq(value.as_bytes(), self.secret.as_bytes()) => Ok(()),
            Some(_) => Err(AppError::InvalidInternalToken),
        }
    }

    /// Value to send on outbound internal calls
    #[must_use]
    pub fn secret(&self) -> &str {
        &self.secret
    }
}

impl std::fmt::Debug for InternalTrustGate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InternalTrustGate").finish_non_exhaustive()
    }
}

fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    a.iter().zip(b).fold(0u8, |acc, (x, y)| acc | (x ^ y)) == 0
}
