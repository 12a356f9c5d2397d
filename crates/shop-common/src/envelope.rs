//! JSON response envelope shared by every service
//!
//! Success: `{"success": true, "message": "...", "data": ...}`
//! Failure: `{"success": false, "message": "...", "error": {"code": "...", "details": ...}}`

use serde::{Deserialize, Serialize};

use crate::error::{AppError, ErrorResponse};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Envelope<T> {
    pub success: bool,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<ErrorInfo>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorInfo {
    pub code: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

impl<T> Envelope<T> {
    pub fn ok(message: impl Into<String>, data: T) -> Self {
        Self {
            success: true,
            message: message.into(),
            data: Some(data),
            error: None,
        }
    }

    pub fn failure(
        code: impl Into<String>,
        message: impl Into<String>,
        details: Option<serde_json::Value>,
    ) -> Self {
        Self {
            success: false,
            message: message.into(),
            data: None,
            error: Some(ErrorInfo {
                code: code.into(),
                details,
            }),
        }
    }

    /// Unwrap a received envelope, turning a failure into a relayable error
    ///
    /// # Errors
    /// `AppError::Upstream` carrying `status` and the envelope's code/message
    pub fn into_data(self, status: u16) -> Result<T, AppError> {
        match (self.success, self.data) {
            (true, Some(data)) => Ok(data),
            (_, _) => Err(AppError::Upstream {
                status: if self.success { 502 } else { status },
                code: self
                    .error
                    .map_or_else(|| "UPSTREAM_ERROR".to_string(), |e| e.code),
                message: self.message,
            }),
        }
    }
}

impl From<&AppError> for Envelope<()> {
    fn from(err: &AppError) -> Self {
        let ErrorResponse {
            code,
            message,
            details,
        } = ErrorResponse::from(err);
        Self::failure(code, message, details)
    }
}
