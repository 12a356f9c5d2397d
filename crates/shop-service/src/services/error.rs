//! Service layer error type

use shop_common::AppError;
use shop_core::DomainError;
use thiserror::Error;

/// Everything a service operation can fail with
#[derive(Debug, Error)]
pub enum ServiceError {
    /// Business rule violation, surfaced to the caller with its own code
    #[error(transparent)]
    Domain(DomainError),

    /// Infrastructure or authentication failure
    #[error(transparent)]
    App(AppError),

    /// A context was built without one of its collaborators
    #[error("Missing service dependency: {0}")]
    MissingDependency(&'static str),
}

impl ServiceError {
    /// The wrapped domain error, if any
    pub fn as_domain(&self) -> Option<&DomainError> {
        match self {
            Self::Domain(e) | Self::App(AppError::Domain(e)) => Some(e),
            _ => None,
        }
    }

    /// HTTP status this error renders as
    pub fn status_code(&self) -> u16 {
        match self {
            Self::Domain(e) => e.status_code(),
            Self::App(e) => e.status_code(),
            Self::MissingDependency(_) => 500,
        }
    }

    /// Error code for API responses
    pub fn error_code(&self) -> &str {
        match self {
            Self::Domain(e) => e.code(),
            Self::App(e) => e.error_code(),
            Self::MissingDependency(_) => "CONFIG_ERROR",
        }
    }
}

impl From<DomainError> for ServiceError {
    fn from(err: DomainError) -> Self {
        Self::Domain(err)
    }
}

impl From<AppError> for ServiceError {
    fn from(err: AppError) -> Self {
        match err {
            AppError::Domain(e) => Self::Domain(e),
            other => Self::App(other),
        }
    }
}

impl From<ServiceError> for AppError {
    fn from(err: ServiceError) -> Self {
        match err {
            ServiceError::Domain(e) => AppError::Domain(e),
            ServiceError::App(e) => e,
            ServiceError::MissingDependency(name) => {
                AppError::Config(format!("{name} is required"))
            }
        }
    }
}

/// Result type for service operations
pub type ServiceResult<T> = Result<T, ServiceError>;
