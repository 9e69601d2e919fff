use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use eventdesk_shared::{Error, ErrorKind};
use serde_json::json;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AppError {
    #[error(transparent)]
    Core(#[from] Error),

    #[error("authentication required")]
    Unauthenticated,
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        let err = match self {
            AppError::Unauthenticated => return StatusCode::UNAUTHORIZED,
            AppError::Core(err) => err,
        };

        match err.kind() {
            ErrorKind::NotFound => StatusCode::NOT_FOUND,
            ErrorKind::Validation => StatusCode::UNPROCESSABLE_ENTITY,
            ErrorKind::Conflict | ErrorKind::CapacityExceeded => StatusCode::CONFLICT,
            ErrorKind::DeadlineExpired => StatusCode::GONE,
            ErrorKind::Unauthorized if matches!(err, Error::InvalidCredentials) => {
                StatusCode::UNAUTHORIZED
            }
            ErrorKind::Unauthorized => StatusCode::FORBIDDEN,
            ErrorKind::NotPayable => StatusCode::BAD_REQUEST,
            ErrorKind::VerificationFailed => StatusCode::PAYMENT_REQUIRED,
            ErrorKind::Gateway if err.is_retryable() => StatusCode::SERVICE_UNAVAILABLE,
            ErrorKind::Gateway => StatusCode::BAD_GATEWAY,
            ErrorKind::Persistence => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn code(&self) -> &'static str {
        match self {
            AppError::Unauthenticated => "unauthenticated",
            AppError::Core(err) => err.kind().into(),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();

        let message = if status.is_server_error() && status != StatusCode::SERVICE_UNAVAILABLE {
            tracing::error!(error = ?self, "request failed");
            "An unexpected error occurred. Please try again later.".to_string()
        } else {
            self.to_string()
        };

        (
            status,
            Json(json!({
                "error": self.code(),
                "message": message,
            })),
        )
            .into_response()
    }
}

pub type AppResult<T> = Result<T, AppError>;
