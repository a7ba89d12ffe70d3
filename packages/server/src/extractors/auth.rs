use axum::{extract::FromRequestParts, http::request::Parts};
use axum_extra::extract::cookie::CookieJar;
use uuid::Uuid;

use crate::entity::session;
use crate::error::AppError;
use crate::state::AppState;
use crate::utils::session as sessions;

/// User identity carried by a session.
#[derive(Debug, Clone)]
pub struct SessionUser {
    pub user_id: i32,
    pub username: String,
}

/// Request-scoped view of the caller's session.
///
/// Never rejects: a missing, malformed, unknown or expired cookie yields an
/// anonymous context.
#[derive(Debug, Clone, Default)]
pub struct SessionContext {
    pub token: Option<Uuid>,
    pub user: Option<SessionUser>,
    pub is_admin: bool,
}

impl From<session::Model> for SessionContext {
    fn from(model: session::Model) -> Self {
        let user = match (model.user_id, model.username) {
            (Some(user_id), Some(username)) => Some(SessionUser { user_id, username }),
            _ => None,
        };
        Self {
            token: Some(model.id),
            user,
            is_admin: model.is_admin,
        }
    }
}

impl FromRequestParts<AppState> for SessionContext {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let jar = CookieJar::from_headers(&parts.headers);
        let Some(token) = jar
            .get(&state.config.auth.cookie_name)
            .and_then(|c| Uuid::parse_str(c.value()).ok())
        else {
            return Ok(Self::default());
        };

        Ok(sessions::load(&state.db, token)
            .await?
            .map(SessionContext::from)
            .unwrap_or_default())
    }
}

/// Logged-in user. Rejects with `LoginRequired` when the session has no user.
pub struct AuthUser {
    pub user_id: i32,
    pub username: String,
}

impl FromRequestParts<AppState> for AuthUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let ctx = SessionContext::from_request_parts(parts, state).await?;
        let user = ctx.user.ok_or(AppError::LoginRequired)?;
        Ok(AuthUser {
            user_id: user.user_id,
            username: user.username,
        })
    }
}

/// Admin capability. Rejects with `AdminRequired` when the session lacks the
/// admin flag, whether or not a user is logged in.
pub struct AdminAccess {
    pub token: Uuid,
}

impl FromRequestParts<AppState> for AdminAccess {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let ctx = SessionContext::from_request_parts(parts, state).await?;
        match ctx.token {
            Some(token) if ctx.is_admin => Ok(AdminAccess { token }),
            _ => Err(AppError::AdminRequired),
        }
    }
}
