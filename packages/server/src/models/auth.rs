use serde::{Deserialize, Serialize};

use crate::error::AppError;

pub const MIN_USERNAME_CHARS: usize = 3;
pub const MIN_PASSWORD_CHARS: usize = 6;

/// Request body for user registration.
///
/// Absent fields deserialize as empty strings and fail validation.
#[derive(Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    /// Unique, case-sensitive username (at least 3 characters after trimming).
    #[serde(default)]
    #[schema(example = "alice")]
    pub username: String,
    /// Password (at least 6 characters).
    #[serde(default)]
    #[schema(example = "secret1")]
    pub password: String,
    /// Must equal `password`.
    #[serde(default)]
    #[schema(example = "secret1")]
    pub confirm_password: String,
}

pub fn validate_register_request(payload: &RegisterRequest) -> Result<(), AppError> {
    if payload.username.trim().chars().count() < MIN_USERNAME_CHARS {
        return Err(AppError::Validation(
            "Username must have at least 3 characters.".into(),
        ));
    }
    if payload.password.chars().count() < MIN_PASSWORD_CHARS {
        return Err(AppError::Validation(
            "Password must have at least 6 characters.".into(),
        ));
    }
    if payload.password != payload.confirm_password {
        return Err(AppError::Validation("Passwords do not match.".into()));
    }
    Ok(())
}

/// Request body for user login.
#[derive(Deserialize, utoipa::ToSchema)]
pub struct LoginRequest {
    #[serde(default)]
    #[schema(example = "alice")]
    pub username: String,
    #[serde(default)]
    #[schema(example = "secret1")]
    pub password: String,
}

/// Request body for admin login.
#[derive(Deserialize, utoipa::ToSchema)]
pub struct AdminLoginRequest {
    #[serde(default)]
    #[schema(example = "admin123")]
    pub password: String,
}

/// Successful login response.
#[derive(Serialize, utoipa::ToSchema)]
pub struct LoginResponse {
    #[schema(example = "Logged in successfully.")]
    pub message: String,
    #[schema(example = "alice")]
    pub username: String,
}

/// Who the current session belongs to.
#[derive(Serialize, utoipa::ToSchema)]
pub struct MeResponse {
    pub authenticated: bool,
    /// Present only when `authenticated` is true.
    #[serde(skip_serializing_if = "Option::is_none")]
    #[schema(example = "alice")]
    pub username: Option<String>,
}
