use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[sea_orm::model]
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "vote")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,

    /// One ballot per user. Re-voting rewrites `candidate_id` in place.
    #[sea_orm(unique)]
    pub user_id: i32,
    #[sea_orm(belongs_to, from = "user_id", to = "id")]
    pub user: HasOne<super::user::Entity>,

    pub candidate_id: i32,
    #[sea_orm(belongs_to, from = "candidate_id", to = "id")]
    pub candidate: HasOne<super::candidate::Entity>,

    /// Time of the most recent vote by this user.
    pub created_at: DateTimeUtc,
}

impl ActiveModelBehavior for ActiveModel {}
