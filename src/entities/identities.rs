use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "identities")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,

    #[sea_orm(unique)]
    pub username: String,

    pub email: String,

    /// Argon2id PHC hash of `password || salt`; empty for external origins.
    pub password_hash: String,

    /// Hex-encoded per-identity salt; empty for external origins.
    pub salt: String,

    /// 0 = local password registration, 1+ = external provider.
    pub origin: i32,

    /// 0 = undefined, 1 = web, 2 = mobile, 3 = both (terminal).
    pub platform_reach: i32,

    pub best_score_solo: i32,

    pub best_score_duo: i32,

    pub total_flaps: i32,

    pub total_gates_cleared: i32,

    pub total_games: i32,

    /// JSON object of achievement flags.
    pub achievements: String,

    pub created_at: String,

    pub updated_at: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
