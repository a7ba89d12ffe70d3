use axum_extra::extract::cookie::{Cookie, SameSite};
use chrono::{Duration, Utc};
use sea_orm::*;
use uuid::Uuid;

use crate::config::AuthConfig;
use crate::entity::{session, user};

/// Load a live session by token. Expired rows are deleted on sight.
pub async fn load(db: &DatabaseConnection, token: Uuid) -> Result<Option<session::Model>, DbErr> {
    let Some(model) = session::Entity::find_by_id(token).one(db).await? else {
        return Ok(None);
    };

    if model.expires_at <= Utc::now() {
        tracing::debug!(session = %token, "Dropping expired session");
        session::Entity::delete_by_id(token).exec(db).await?;
        return Ok(None);
    }

    Ok(Some(model))
}

/// Attach `user` to the current session, opening a new one if there is none.
///
/// An admin flag already on the session is kept.
pub async fn attach_user(
    db: &DatabaseConnection,
    current: Option<Uuid>,
    user: &user::Model,
    config: &AuthConfig,
) -> Result<session::Model, DbErr> {
    let user_id = user.id;
    let username = user.username.clone();
    open_or_refresh(db, current, config, move |active| {
        active.user_id = Set(Some(user_id));
        active.username = Set(Some(username));
    })
    .await
}

/// Set the admin flag on the current session, opening a new one if there is none.
pub async fn grant_admin(
    db: &DatabaseConnection,
    current: Option<Uuid>,
    config: &AuthConfig,
) -> Result<session::Model, DbErr> {
    open_or_refresh(db, current, config, |active| {
        active.is_admin = Set(true);
    })
    .await
}

/// Remove a session together with everything it carried.
pub async fn destroy(db: &DatabaseConnection, token: Uuid) -> Result<(), DbErr> {
    session::Entity::delete_by_id(token).exec(db).await?;
    Ok(())
}

/// Delete every session past its expiry. Returns the number of rows removed.
pub async fn purge_expired(db: &DatabaseConnection) -> Result<u64, DbErr> {
    let result = session::Entity::delete_many()
        .filter(session::Column::ExpiresAt.lte(Utc::now()))
        .exec(db)
        .await?;
    Ok(result.rows_affected)
}

async fn open_or_refresh<F>(
    db: &DatabaseConnection,
    current: Option<Uuid>,
    config: &AuthConfig,
    apply: F,
) -> Result<session::Model, DbErr>
where
    F: FnOnce(&mut session::ActiveModel),
{
    let now = Utc::now();
    let expires_at = Duration::try_seconds(config.session_ttl_secs)
        .and_then(|ttl| now.checked_add_signed(ttl))
        .ok_or_else(|| {
            DbErr::Custom(format!(
                "session_ttl_secs {} puts the expiry out of range",
                config.session_ttl_secs
            ))
        })?;

    let existing = match current {
        Some(token) => load(db, token).await?,
        None => None,
    };

    match existing {
        Some(model) => {
            let mut active: session::ActiveModel = model.into();
            apply(&mut active);
            active.expires_at = Set(expires_at);
            active.update(db).await
        }
        None => {
            let mut active = session::ActiveModel {
                id: Set(Uuid::new_v4()),
                user_id: Set(None),
                username: Set(None),
                is_admin: Set(false),
                created_at: Set(now),
                expires_at: Set(expires_at),
                ..Default::default()
            };
            apply(&mut active);
            active.insert(db).await
        }
    }
}

/// Cookie carrying the session token.
pub fn cookie(config: &AuthConfig, token: Uuid) -> Cookie<'static> {
    Cookie::build((config.cookie_name.clone(), token.to_string()))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .secure(config.secure_cookie)
        .max_age(::time::Duration::seconds(config.session_ttl_secs))
        .build()
}

/// Cookie that makes the browser forget the session token.
pub fn removal_cookie(config: &AuthConfig) -> Cookie<'static> {
    Cookie::build((config.cookie_name.clone(), "")).path("/").build()
}
