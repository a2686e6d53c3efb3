use sea_orm::entity::prelude::*;

/// Immutable score record. `user_id` carries no referential integrity; it
/// exists so account removal can scrub the board.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "leaderboard_entries")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,

    /// Game mode: "solo" or "duo".
    #[sea_orm(indexed)]
    pub mode: String,

    pub score: i32,

    pub user_name: String,

    pub user_id: i32,

    #[sea_orm(indexed)]
    pub timestamp: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
