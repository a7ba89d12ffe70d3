use axum::{Json, extract::State};
use sea_orm::sea_query::OnConflict;
use sea_orm::*;
use tracing::instrument;

use crate::entity::{candidate, vote};
use crate::error::{AppError, ErrorBody};
use crate::extractors::auth::AuthUser;
use crate::extractors::json::AppJson;
use crate::models::vote::{SubmitVoteRequest, SubmitVoteResponse};
use crate::state::AppState;

#[utoipa::path(
    post,
    path = "/vote",
    tag = "Votes",
    operation_id = "submitVote",
    summary = "Cast or change a vote",
    description = "Records the logged-in user's vote. A user holds at most one vote; voting again moves it to the new candidate and refreshes its timestamp.",
    request_body = SubmitVoteRequest,
    responses(
        (status = 200, description = "Vote saved", body = SubmitVoteResponse),
        (status = 401, description = "Not logged in (LOGIN_REQUIRED)", body = ErrorBody),
        (status = 404, description = "Candidate not found (NOT_FOUND)", body = ErrorBody),
    ),
    security(("session_cookie" = [])),
)]
#[instrument(skip(state, auth_user, payload), fields(user_id = auth_user.user_id))]
pub async fn submit_vote(
    auth_user: AuthUser,
    State(state): State<AppState>,
    AppJson(payload): AppJson<SubmitVoteRequest>,
) -> Result<Json<SubmitVoteResponse>, AppError> {
    let not_found = || AppError::NotFound("Candidate not found.".into());

    let candidate_id = payload.candidate_id().ok_or_else(not_found)?;
    let candidate = candidate::Entity::find_by_id(candidate_id)
        .one(&state.db)
        .await?
        .ok_or_else(not_found)?;

    upsert_vote(&state.db, auth_user.user_id, candidate.id).await?;

    tracing::info!(candidate_id = candidate.id, "Vote saved");

    Ok(Json(SubmitVoteResponse {
        message: "Vote saved successfully.".into(),
        candidate: candidate.name,
    }))
}

/// Point `user_id`'s vote at `candidate_id`, creating it if absent.
///
/// A single `INSERT .. ON CONFLICT (user_id) DO UPDATE`, so the unique
/// constraint on `vote.user_id` settles concurrent votes by the same user
/// (last writer wins).
pub async fn upsert_vote<C>(db: &C, user_id: i32, candidate_id: i32) -> Result<(), DbErr>
where
    C: ConnectionTrait,
{
    let ballot = vote::ActiveModel {
        user_id: Set(user_id),
        candidate_id: Set(candidate_id),
        created_at: Set(chrono::Utc::now()),
        ..Default::default()
    };

    vote::Entity::insert(ballot)
        .on_conflict(
            OnConflict::column(vote::Column::UserId)
                .update_columns([vote::Column::CandidateId, vote::Column::CreatedAt])
                .to_owned(),
        )
        .exec_without_returning(db)
        .await?;

    Ok(())
}
