use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use sea_orm::DbErr;
use serde::Serialize;

/// Structured error response returned by all endpoints on failure.
#[derive(Serialize, utoipa::ToSchema)]
pub struct ErrorBody {
    /// Machine-readable error code. One of: `VALIDATION_ERROR`, `USERNAME_TAKEN`,
    /// `INVALID_CREDENTIALS`, `INVALID_ADMIN_PASSWORD`, `LOGIN_REQUIRED`,
    /// `ADMIN_REQUIRED`, `NOT_FOUND`, `INTERNAL_ERROR`.
    #[schema(example = "VALIDATION_ERROR")]
    pub code: &'static str,
    /// Human-readable error description.
    #[schema(example = "Username must have at least 3 characters.")]
    pub error: String,
}

/// Application-level error type.
#[derive(Debug)]
pub enum AppError {
    Validation(String),
    UsernameTaken,
    InvalidCredentials,
    InvalidAdminPassword,
    /// No user is attached to the session.
    LoginRequired,
    /// The session does not carry the admin flag.
    AdminRequired,
    NotFound(String),
    Internal(String),
}

impl AppError {
    fn status_and_body(self) -> (StatusCode, ErrorBody) {
        match self {
            AppError::Validation(msg) => (
                StatusCode::BAD_REQUEST,
                ErrorBody {
                    code: "VALIDATION_ERROR",
                    error: msg,
                },
            ),
            AppError::UsernameTaken => (
                StatusCode::CONFLICT,
                ErrorBody {
                    code: "USERNAME_TAKEN",
                    error: "Username is already taken.".into(),
                },
            ),
            AppError::InvalidCredentials => (
                StatusCode::UNAUTHORIZED,
                ErrorBody {
                    code: "INVALID_CREDENTIALS",
                    error: "Invalid username or password.".into(),
                },
            ),
            AppError::InvalidAdminPassword => (
                StatusCode::UNAUTHORIZED,
                ErrorBody {
                    code: "INVALID_ADMIN_PASSWORD",
                    error: "Invalid admin password.".into(),
                },
            ),
            AppError::LoginRequired => (
                StatusCode::UNAUTHORIZED,
                ErrorBody {
                    code: "LOGIN_REQUIRED",
                    error: "Please log in before voting.".into(),
                },
            ),
            AppError::AdminRequired => (
                StatusCode::FORBIDDEN,
                ErrorBody {
                    code: "ADMIN_REQUIRED",
                    error: "Admin authentication required.".into(),
                },
            ),
            AppError::NotFound(msg) => (
                StatusCode::NOT_FOUND,
                ErrorBody {
                    code: "NOT_FOUND",
                    error: msg,
                },
            ),
            AppError::Internal(detail) => {
                tracing::error!("Internal error: {}", detail);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    ErrorBody {
                        code: "INTERNAL_ERROR",
                        error: "An unexpected error occurred".into(),
                    },
                )
            }
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, body) = self.status_and_body();
        (status, Json(body)).into_response()
    }
}

impl From<DbErr> for AppError {
    fn from(err: DbErr) -> Self {
        AppError::Internal(err.to_string())
    }
}
