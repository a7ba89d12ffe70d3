use axum::{Json, extract::State, http::StatusCode, response::IntoResponse};
use axum_extra::extract::cookie::CookieJar;
use sea_orm::*;
use tracing::instrument;

use crate::entity::user;
use crate::error::{AppError, ErrorBody};
use crate::extractors::auth::SessionContext;
use crate::extractors::json::AppJson;
use crate::models::auth::{
    AdminLoginRequest, LoginRequest, LoginResponse, MeResponse, RegisterRequest,
    validate_register_request,
};
use crate::models::shared::MessageResponse;
use crate::state::AppState;
use crate::utils::session as sessions;

#[utoipa::path(
    post,
    path = "/register",
    tag = "Auth",
    operation_id = "register",
    summary = "Register a new user",
    description = "Creates a user account. Does not log the user in.",
    request_body = RegisterRequest,
    responses(
        (status = 201, description = "User registered", body = MessageResponse),
        (status = 400, description = "Validation error (VALIDATION_ERROR)", body = ErrorBody),
        (status = 409, description = "Username taken (USERNAME_TAKEN)", body = ErrorBody),
    ),
)]
#[instrument(skip(state, payload), fields(username = %payload.username))]
pub async fn register(
    State(state): State<AppState>,
    AppJson(payload): AppJson<RegisterRequest>,
) -> Result<impl IntoResponse, AppError> {
    validate_register_request(&payload)?;

    let new_user = user::ActiveModel {
        username: Set(payload.username.trim().to_string()),
        password: Set(payload.password),
        created_at: Set(chrono::Utc::now()),
        ..Default::default()
    };

    let user = new_user.insert(&state.db).await.map_err(|e| match e.sql_err() {
        Some(SqlErr::UniqueConstraintViolation(_)) => {
            tracing::debug!("Username unique constraint hit on insert");
            AppError::UsernameTaken
        }
        _ => AppError::from(e),
    })?;

    tracing::info!(user_id = user.id, "User registered");

    Ok((
        StatusCode::CREATED,
        Json(MessageResponse::new("User registered successfully.")),
    ))
}

#[utoipa::path(
    post,
    path = "/login",
    tag = "Auth",
    operation_id = "login",
    summary = "Log in as a user",
    description = "Checks the username and password and attaches the user to the session, creating the session cookie if needed. An admin flag already on the session is kept.",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Logged in", body = LoginResponse),
        (status = 401, description = "Bad credentials (INVALID_CREDENTIALS)", body = ErrorBody),
    ),
)]
#[instrument(skip(state, ctx, jar, payload), fields(username = %payload.username))]
pub async fn login(
    State(state): State<AppState>,
    ctx: SessionContext,
    jar: CookieJar,
    AppJson(payload): AppJson<LoginRequest>,
) -> Result<(CookieJar, Json<LoginResponse>), AppError> {
    let user = user::Entity::find()
        .filter(user::Column::Username.eq(payload.username.trim()))
        .filter(user::Column::Password.eq(payload.password.as_str()))
        .one(&state.db)
        .await?
        .ok_or(AppError::InvalidCredentials)?;

    let session = sessions::attach_user(&state.db, ctx.token, &user, &state.config.auth).await?;
    tracing::info!(user_id = user.id, "User logged in");

    Ok((
        jar.add(sessions::cookie(&state.config.auth, session.id)),
        Json(LoginResponse {
            message: "Logged in successfully.".into(),
            username: user.username,
        }),
    ))
}

#[utoipa::path(
    post,
    path = "/logout",
    tag = "Auth",
    operation_id = "logout",
    summary = "End the session",
    description = "Deletes the server-side session, dropping both the user identity and the admin flag, and clears the cookie. Succeeds without a session.",
    responses(
        (status = 200, description = "Logged out", body = MessageResponse),
    ),
)]
#[instrument(skip(state, ctx, jar))]
pub async fn logout(
    State(state): State<AppState>,
    ctx: SessionContext,
    jar: CookieJar,
) -> Result<(CookieJar, Json<MessageResponse>), AppError> {
    if let Some(token) = ctx.token {
        sessions::destroy(&state.db, token).await?;
    }

    Ok((
        jar.remove(sessions::removal_cookie(&state.config.auth)),
        Json(MessageResponse::new("Logged out.")),
    ))
}

#[utoipa::path(
    get,
    path = "/me",
    tag = "Auth",
    operation_id = "me",
    summary = "Who am I",
    responses(
        (status = 200, description = "Session status", body = MeResponse),
    ),
)]
#[instrument(skip(ctx))]
pub async fn me(ctx: SessionContext) -> Json<MeResponse> {
    Json(match ctx.user {
        Some(user) => MeResponse {
            authenticated: true,
            username: Some(user.username),
        },
        None => MeResponse {
            authenticated: false,
            username: None,
        },
    })
}

#[utoipa::path(
    post,
    path = "/login",
    tag = "Admin",
    operation_id = "adminLogin",
    summary = "Authenticate as admin",
    description = "Compares the password with the configured admin secret and sets the admin flag on the session. Does not require a logged-in user.",
    request_body = AdminLoginRequest,
    responses(
        (status = 200, description = "Admin authenticated", body = MessageResponse),
        (status = 401, description = "Wrong password (INVALID_ADMIN_PASSWORD)", body = ErrorBody),
    ),
)]
#[instrument(skip(state, ctx, jar, payload))]
pub async fn admin_login(
    State(state): State<AppState>,
    ctx: SessionContext,
    jar: CookieJar,
    AppJson(payload): AppJson<AdminLoginRequest>,
) -> Result<(CookieJar, Json<MessageResponse>), AppError> {
    if payload.password.is_empty() || payload.password != state.config.auth.admin_password {
        tracing::warn!("Rejected admin login attempt");
        return Err(AppError::InvalidAdminPassword);
    }

    let session = sessions::grant_admin(&state.db, ctx.token, &state.config.auth).await?;
    tracing::info!("Admin authenticated");

    Ok((
        jar.add(sessions::cookie(&state.config.auth, session.id)),
        Json(MessageResponse::new("Admin authenticated.")),
    ))
}
