use chrono::{DateTime, Utc};
use sea_orm::FromQueryResult;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Request body for casting or changing a vote.
#[derive(Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SubmitVoteRequest {
    /// Integer, or a string holding one.
    #[schema(value_type = Option<i32>, example = 1)]
    pub candidate_id: Option<Value>,
}

impl SubmitVoteRequest {
    /// The id to look up, or `None` when the value cannot name any candidate.
    pub fn candidate_id(&self) -> Option<i32> {
        let id = match self.candidate_id.as_ref()? {
            Value::Number(n) => match (n.as_i64(), n.as_f64()) {
                (Some(v), _) => v,
                (None, Some(f)) if f.fract() == 0.0 && f.abs() < 1e15 => f as i64,
                _ => return None,
            },
            Value::String(s) => s.trim().parse::<i64>().ok()?,
            _ => return None,
        };
        i32::try_from(id).ok()
    }
}

#[derive(Serialize, utoipa::ToSchema)]
pub struct SubmitVoteResponse {
    #[schema(example = "Vote saved successfully.")]
    pub message: String,
    /// Name of the candidate the vote now points to.
    #[schema(example = "Bob")]
    pub candidate: String,
}

/// One row of the admin vote report.
#[derive(Debug, Serialize, FromQueryResult, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct VoteRecord {
    #[schema(example = "alice")]
    pub username: String,
    /// Candidate name.
    #[schema(example = "Bob")]
    pub candidate: String,
    pub voted_at: DateTime<Utc>,
}
