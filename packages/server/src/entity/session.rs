use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Server-side session state. The cookie only carries `token`.
#[sea_orm::model]
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "session")]
pub struct Model {
    /// Random UUIDv4, never derived from user data.
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,

    /// NULL until a user logs in on this session.
    pub user_id: Option<i32>,
    #[sea_orm(belongs_to, from = "user_id", to = "id")]
    pub user: HasOne<super::user::Entity>,
    pub username: Option<String>,

    /// Granted by the admin password, independent of `user_id`.
    pub is_admin: bool,

    pub created_at: DateTimeUtc,
    pub expires_at: DateTimeUtc,
}

impl ActiveModelBehavior for ActiveModel {}
