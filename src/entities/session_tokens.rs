use sea_orm::entity::prelude::*;

/// One row per issued token pair. A refresh deletes the matched row and
/// inserts the replacement, so a rotated-away pair stops resolving
/// immediately rather than at natural expiry.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "session_tokens")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,

    #[sea_orm(indexed)]
    pub identity_id: i32,

    #[sea_orm(indexed)]
    pub access_token: String,

    pub refresh_token: String,

    /// Unix timestamps; each token expires on its own clock.
    pub access_expires_at: i64,

    pub refresh_expires_at: i64,

    pub created_at: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
