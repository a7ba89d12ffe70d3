use axum::{Json, extract::State, http::StatusCode, response::IntoResponse};
use sea_orm::*;
use tracing::instrument;

use crate::entity::candidate;
use crate::error::{AppError, ErrorBody};
use crate::extractors::auth::AdminAccess;
use crate::extractors::json::AppJson;
use crate::models::candidate::{
    CandidateResponse, CreateCandidateRequest, CreateCandidateResponse,
    validate_create_candidate,
};
use crate::state::AppState;

#[utoipa::path(
    get,
    path = "/candidates",
    tag = "Candidates",
    operation_id = "listCandidates",
    summary = "List all candidates",
    description = "Returns every candidate, newest first. No authentication required.",
    responses(
        (status = 200, description = "Candidates", body = Vec<CandidateResponse>),
    ),
)]
#[instrument(skip(state))]
pub async fn list_candidates(
    State(state): State<AppState>,
) -> Result<Json<Vec<CandidateResponse>>, AppError> {
    let candidates = candidate::Entity::find()
        .order_by_desc(candidate::Column::CreatedAt)
        .order_by_desc(candidate::Column::Id)
        .all(&state.db)
        .await?
        .into_iter()
        .map(CandidateResponse::from)
        .collect();

    Ok(Json(candidates))
}

#[utoipa::path(
    post,
    path = "/candidates",
    tag = "Admin",
    operation_id = "createCandidate",
    summary = "Create a candidate",
    description = "Adds a candidate. Requires an admin session. All five fields are required; string fields are trimmed and `age` may be an integer or a numeric string.",
    request_body = CreateCandidateRequest,
    responses(
        (status = 201, description = "Candidate created", body = CreateCandidateResponse),
        (status = 400, description = "Validation error (VALIDATION_ERROR)", body = ErrorBody),
        (status = 403, description = "Not an admin session (ADMIN_REQUIRED)", body = ErrorBody),
    ),
    security(("session_cookie" = [])),
)]
#[instrument(skip(_admin, state, payload))]
pub async fn create_candidate(
    _admin: AdminAccess,
    State(state): State<AppState>,
    AppJson(payload): AppJson<CreateCandidateRequest>,
) -> Result<impl IntoResponse, AppError> {
    let new = validate_create_candidate(&payload)?;

    let model = candidate::ActiveModel {
        name: Set(new.name),
        photo_url: Set(new.photo_url),
        gender: Set(new.gender),
        age: Set(new.age),
        description: Set(new.description),
        created_at: Set(chrono::Utc::now()),
        ..Default::default()
    }
    .insert(&state.db)
    .await?;

    tracing::info!(candidate_id = model.id, name = %model.name, "Candidate created");

    Ok((
        StatusCode::CREATED,
        Json(CreateCandidateResponse {
            message: "Candidate created.".into(),
            id: model.id,
        }),
    ))
}
