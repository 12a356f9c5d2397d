//! Application state
//!
//! One state type per service. Extractors reach the pieces they need
//! (`SessionValidator`, `InternalTrustGate`) through `FromRef`.

use std::sync::Arc;

use axum::extract::FromRef;
use shop_common::{InternalTrustGate, SessionValidator};
use shop_service::{AuthContext, UserContext};

/// auth-service state
#[derive(Clone)]
pub struct AuthState {
    context: Arc<AuthContext>,
    validator: SessionValidator,
    gate: InternalTrustGate,
}

impl AuthState {
    pub fn new(context: AuthContext, gate: InternalTrustGate) -> Self {
        let validator = context.jwt_service().validator().clone();
        Self {
            context: Arc::new(context),
            validator,
            gate,
        }
    }

    /// Get the token issuer's dependencies
    pub fn context(&self) -> &AuthContext {
        &self.context
    }

    /// Shared handle to the context, for background tasks
    pub fn shared_context(&self) -> Arc<AuthContext> {
        Arc::clone(&self.context)
    }
}

impl FromRef<AuthState> for SessionValidator {
    fn from_ref(state: &AuthState) -> Self {
        state.validator.clone()
    }
}

impl FromRef<AuthState> for InternalTrustGate {
    fn from_ref(state: &AuthState) -> Self {
        state.gate.clone()
    }
}

impl std::fmt::Debug for AuthState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthState")
            .field("context", &self.context)
            .field("gate", &self.gate)
            .finish_non_exhaustive()
    }
}

/// user-service state
#[derive(Clone)]
pub struct UserState {
    context: Arc<UserContext>,
    gate: InternalTrustGate,
}

impl UserState {
    pub fn new(context: UserContext, gate: InternalTrustGate) -> Self {
        Self {
            context: Arc::new(context),
            gate,
        }
    }

    /// Get the credential store's dependencies
    pub fn context(&self) -> &UserContext {
        &self.context
    }
}

impl FromRef<UserState> for InternalTrustGate {
    fn from_ref(state: &UserState) -> Self {
        state.gate.clone()
    }
}

impl std::fmt::Debug for UserState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UserState")
            .field("context", &self.context)
            .field("gate", &self.gate)
            .finish()
    }
}
