use axum::{Json, extract::State};
use sea_orm::*;
use tracing::instrument;

use crate::entity::{candidate, user, vote};
use crate::error::{AppError, ErrorBody};
use crate::extractors::auth::AdminAccess;
use crate::models::vote::VoteRecord;
use crate::state::AppState;

#[utoipa::path(
    get,
    path = "/votes",
    tag = "Admin",
    operation_id = "listVotes",
    summary = "List every vote",
    description = "Returns who voted for whom and when, latest vote first. Requires an admin session.",
    responses(
        (status = 200, description = "Vote records", body = Vec<VoteRecord>),
        (status = 403, description = "Not an admin session (ADMIN_REQUIRED)", body = ErrorBody),
    ),
    security(("session_cookie" = [])),
)]
#[instrument(skip(_admin, state))]
pub async fn list_votes(
    _admin: AdminAccess,
    State(state): State<AppState>,
) -> Result<Json<Vec<VoteRecord>>, AppError> {
    let records = vote::Entity::find()
        .select_only()
        .column_as(user::Column::Username, "username")
        .column_as(candidate::Column::Name, "candidate")
        .column_as(vote::Column::CreatedAt, "voted_at")
        .inner_join(user::Entity)
        .inner_join(candidate::Entity)
        .order_by_desc(vote::Column::CreatedAt)
        .order_by_desc(vote::Column::Id)
        .into_model::<VoteRecord>()
        .all(&state.db)
        .await?;

    Ok(Json(records))
}
