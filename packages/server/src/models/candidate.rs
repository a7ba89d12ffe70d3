use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::entity::candidate;
use crate::error::AppError;

/// `age` as sent by the admin form: a JSON number or a numeric string.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum AgeInput {
    Number(serde_json::Number),
    Text(String),
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum AgeError {
    #[error("Age must be a whole number.")]
    NotAnInteger,
    #[error("Age is out of range.")]
    OutOfRange,
}

impl AgeInput {
    /// A blank string or a numeric zero counts as a missing age.
    fn is_blank(&self) -> bool {
        match self {
            AgeInput::Number(n) => n.as_f64() == Some(0.0),
            AgeInput::Text(s) => s.trim().is_empty(),
        }
    }

    pub fn to_age(&self) -> Result<i32, AgeError> {
        let value = match self {
            AgeInput::Number(n) => match (n.as_i64(), n.as_f64()) {
                (Some(v), _) => v,
                (None, Some(f)) if f.fract() == 0.0 && f.abs() < 1e15 => f as i64,
                _ => return Err(AgeError::NotAnInteger),
            },
            AgeInput::Text(s) => s.trim().parse::<i64>().map_err(|_| AgeError::NotAnInteger)?,
        };
        i32::try_from(value).map_err(|_| AgeError::OutOfRange)
    }
}

/// Request body for creating a candidate. Every field is required; `None`
/// lets validation report all missing fields at once.
#[derive(Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateCandidateRequest {
    #[schema(example = "Bob")]
    pub name: Option<String>,
    #[schema(example = "https://example.com/bob.jpg")]
    pub photo_url: Option<String>,
    #[schema(example = "M")]
    pub gender: Option<String>,
    /// Integer, or a string holding one.
    #[schema(value_type = Option<i32>, example = 30)]
    pub age: Option<AgeInput>,
    #[schema(example = "Ran the chess club for ten years.")]
    pub description: Option<String>,
}

/// A create request that passed validation, with strings trimmed.
#[derive(Debug, PartialEq, Eq)]
pub struct NewCandidate {
    pub name: String,
    pub photo_url: String,
    pub gender: String,
    pub age: i32,
    pub description: String,
}

pub fn validate_create_candidate(payload: &CreateCandidateRequest) -> Result<NewCandidate, AppError> {
    fn present(field: &Option<String>) -> Option<String> {
        field
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
    }

    let name = present(&payload.name);
    let photo_url = present(&payload.photo_url);
    let gender = present(&payload.gender);
    let age = payload.age.as_ref().filter(|a| !a.is_blank());
    let description = present(&payload.description);

    let missing: Vec<&str> = [
        ("name", name.is_none()),
        ("photoUrl", photo_url.is_none()),
        ("gender", gender.is_none()),
        ("age", age.is_none()),
        ("description", description.is_none()),
    ]
    .into_iter()
    .filter_map(|(field, absent)| absent.then_some(field))
    .collect();

    let (Some(name), Some(photo_url), Some(gender), Some(age), Some(description)) =
        (name, photo_url, gender, age, description)
    else {
        return Err(AppError::Validation(format!(
            "Missing fields: {}",
            missing.join(", ")
        )));
    };

    let age = age
        .to_age()
        .map_err(|e| AppError::Validation(e.to_string()))?;

    Ok(NewCandidate {
        name,
        photo_url,
        gender,
        age,
        description,
    })
}

/// Public candidate card.
#[derive(Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CandidateResponse {
    #[schema(example = 1)]
    pub id: i32,
    #[schema(example = "Bob")]
    pub name: String,
    #[schema(example = "https://example.com/bob.jpg")]
    pub photo_url: String,
    #[schema(example = "M")]
    pub gender: String,
    #[schema(example = 30)]
    pub age: i32,
    #[schema(example = "Ran the chess club for ten years.")]
    pub description: String,
}

impl From<candidate::Model> for CandidateResponse {
    fn from(model: candidate::Model) -> Self {
        Self {
            id: model.id,
            name: model.name,
            photo_url: model.photo_url,
            gender: model.gender,
            age: model.age,
            description: model.description,
        }
    }
}

/// Response after creating a candidate.
#[derive(Serialize, utoipa::ToSchema)]
pub struct CreateCandidateResponse {
    #[schema(example = "Candidate created.")]
    pub message: String,
    #[schema(example = 1)]
    pub id: i32,
}
