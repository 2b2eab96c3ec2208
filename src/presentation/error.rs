use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;

use crate::application::ports::{IdentityError, PaymentGatewayError};
use crate::application::services::{AuthError, LifecycleError};
use crate::domain::TransitionError;

#[derive(Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
}

/// A failed request: status code, stable machine-readable code, message.
#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub code: &'static str,
    pub message: String,
}

impl ApiError {
    pub fn new(status: StatusCode, code: &'static str, message: impl Into<String>) -> Self {
        Self {
            status,
            code,
            message: message.into(),
        }
    }

    pub fn unauthorized() -> Self {
        Self::new(
            StatusCode::UNAUTHORIZED,
            "unauthorized",
            "a valid session is required",
        )
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, "invalid_request", message)
    }

    pub fn validation(message: impl Into<String>) -> Self {
        Self::new(StatusCode::UNPROCESSABLE_ENTITY, "validation_failed", message)
    }

    fn internal(message: impl Into<String>) -> Self {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, "store_error", message)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (
            self.status,
            Json(ErrorResponse {
                error: self.code.to_string(),
                message: self.message,
            }),
        )
            .into_response()
    }
}

impl From<LifecycleError> for ApiError {
    fn from(err: LifecycleError) -> Self {
        let message = err.to_string();
        match err {
            LifecycleError::Validation(_) => Self::validation(message),
            LifecycleError::InvalidRequest(_) => Self::bad_request(message),
            LifecycleError::WrongRole { .. } => {
                Self::new(StatusCode::FORBIDDEN, "wrong_role", message)
            }
            LifecycleError::Forbidden(_) => Self::new(StatusCode::FORBIDDEN, "forbidden", message),
            LifecycleError::NotFound(_) => Self::new(StatusCode::NOT_FOUND, "not_found", message),
            LifecycleError::JobUnavailable(_) => Self::new(
                StatusCode::CONFLICT,
                "job_no_longer_available",
                "job no longer available",
            ),
            LifecycleError::Transition(TransitionError::NotAssignedProvider) => {
                Self::new(StatusCode::FORBIDDEN, "not_assigned_provider", message)
            }
            LifecycleError::Transition(_) => {
                Self::new(StatusCode::CONFLICT, "invalid_transition", message)
            }
            LifecycleError::PaymentNotAllowed(_) => {
                Self::new(StatusCode::CONFLICT, "payment_not_allowed", message)
            }
            LifecycleError::PaymentUnverified(_) => {
                Self::new(StatusCode::PAYMENT_REQUIRED, "payment_unverified", message)
            }
            LifecycleError::Gateway(e) => e.into(),
            LifecycleError::Repository(e) => {
                tracing::error!(error = %e, "Store failure");
                Self::internal("the job store is unavailable")
            }
        }
    }
}

impl From<PaymentGatewayError> for ApiError {
    fn from(err: PaymentGatewayError) -> Self {
        match err {
            PaymentGatewayError::InvalidSignature(_) | PaymentGatewayError::MalformedEvent(_) => {
                Self::bad_request(err.to_string())
            }
            PaymentGatewayError::ApiRequestFailed(_) | PaymentGatewayError::InvalidResponse(_) => {
                tracing::error!(error = %err, "Payment processor failure");
                Self::new(
                    StatusCode::BAD_GATEWAY,
                    "payment_gateway_error",
                    err.to_string(),
                )
            }
        }
    }
}

impl From<AuthError> for ApiError {
    fn from(err: AuthError) -> Self {
        let message = err.to_string();
        match err {
            AuthError::InvalidRequest(_) => Self::validation(message),
            AuthError::Identity(IdentityError::InvalidCredentials) => Self::new(
                StatusCode::UNAUTHORIZED,
                "invalid_credentials",
                "invalid email or password",
            ),
            AuthError::Identity(IdentityError::AlreadyRegistered(_)) => {
                Self::new(StatusCode::CONFLICT, "already_registered", message)
            }
            AuthError::Identity(e) => {
                tracing::error!(error = %e, "Identity provider failure");
                Self::new(StatusCode::BAD_GATEWAY, "identity_unavailable", message)
            }
            AuthError::Repository(e) => {
                tracing::error!(error = %e, "Profile store failure");
                Self::internal("the profile store is unavailable")
            }
        }
    }
}
