use crate::application::ports::{PaymentGatewayError, RepositoryError};
use crate::domain::{JobId, JobValidationError, TransitionError, UserRole};

#[derive(Debug, thiserror::Error)]
pub enum LifecycleError {
    #[error("validation failed: {0}")]
    Validation(#[from] JobValidationError),
    #[error("invalid request: {0}")]
    InvalidRequest(String),
    #[error("requires role {required}, caller is {actual}")]
    WrongRole { required: UserRole, actual: UserRole },
    #[error("forbidden: {0}")]
    Forbidden(String),
    #[error("job not found: {0}")]
    NotFound(JobId),
    #[error("job no longer available: {0}")]
    JobUnavailable(JobId),
    #[error("{0}")]
    Transition(#[from] TransitionError),
    #[error("payment not allowed: {0}")]
    PaymentNotAllowed(String),
    #[error("payment could not be verified for job {0}")]
    PaymentUnverified(JobId),
    #[error("repository: {0}")]
    Repository(#[from] RepositoryError),
    #[error("payment gateway: {0}")]
    Gateway(#[from] PaymentGatewayError),
}
